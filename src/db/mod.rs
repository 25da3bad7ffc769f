//! Persistence layer
//!
//! Owns the SQLite connection pool and every query the service runs.
//! Each call borrows a pooled connection for the duration of one query
//! (or one short transaction) and returns it on every exit path.

pub mod models;

use crate::config::DatabaseConfig;
use crate::error::AppError;
use models::{
    LogEntry, Measurement, NewMeasurement, NewUser, User, DEFAULT_ROLES, UNKNOWN_PRODUCT,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info};

/// Database handle shared by all handlers
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if missing) the database file and ensure the schema exists
    ///
    /// # Arguments
    /// * `config` - Database path and pool size
    ///
    /// # Returns
    /// * `Ok(Database)` if successful
    /// * `Err(AppError)` if the file could not be opened or the schema could not be created
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        let db_path = config.path.as_str();

        // Ensure parent directory exists
        if let Some(parent) = PathBuf::from(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::Internal(anyhow::anyhow!("Failed to create db directory: {}", e))
                })?;
            }
        }

        let connection_string = if db_path.starts_with("sqlite:") {
            db_path.to_string()
        } else {
            format!("sqlite:{}", db_path)
        };

        let options = SqliteConnectOptions::from_str(&connection_string)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid database path: {}", e)))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .connect_with(options)
            .await
            .map_err(|e| {
                AppError::Internal(anyhow::anyhow!("Failed to connect to database: {}", e))
            })?;

        info!("Connected to SQLite database at: {}", db_path);

        let db = Self { pool };
        db.run_migrations().await?;

        Ok(db)
    }

    /// Private in-memory database with the schema applied.
    ///
    /// Uses a single connection that is never recycled, since every
    /// SQLite in-memory connection is its own database.
    pub async fn in_memory() -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid database path: {}", e)))?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| {
                AppError::Internal(anyhow::anyhow!("Failed to open in-memory database: {}", e))
            })?;

        let db = Self { pool };
        db.run_migrations().await?;

        Ok(db)
    }

    /// Create missing tables. Existing tables are left untouched.
    async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Ensuring database schema...");

        let migration_sql = include_str!("../../migrations/001_create_schema.sql");

        // Strip comments, then split into individual statements
        let mut cleaned_sql = String::new();
        for line in migration_sql.lines() {
            let without_comments = match line.find("--") {
                Some(comment_pos) => &line[..comment_pos],
                None => line,
            };
            let trimmed = without_comments.trim();
            if trimmed.is_empty() {
                continue;
            }
            cleaned_sql.push_str(trimmed);
            cleaned_sql.push(' ');
        }

        let statements = cleaned_sql
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty());

        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::Internal(anyhow::anyhow!(
                        "Migration failed: {} - Statement: {}",
                        e,
                        statement.chars().take(100).collect::<String>()
                    ))
                })?;
        }

        info!("Database schema ready");
        Ok(())
    }

    /// Insert the default roles if the `Role` table is empty.
    ///
    /// Returns the number of rows inserted (0 when roles already exist).
    pub async fn seed_roles(&self) -> Result<usize, AppError> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "Role""#)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to count roles: {}", e)))?;

        if count > 0 {
            debug!(count, "Roles already present, skipping seed");
            return Ok(0);
        }

        for role_name in DEFAULT_ROLES {
            sqlx::query(r#"INSERT INTO "Role" (role_name) VALUES (?)"#)
                .bind(role_name)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::Internal(anyhow::anyhow!("Failed to seed role {}: {}", role_name, e))
                })?;
        }

        tx.commit().await.map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Failed to commit role seed: {}", e))
        })?;

        info!(roles = ?DEFAULT_ROLES, "Seeded default roles");
        Ok(DEFAULT_ROLES.len())
    }

    /// Number of rows in the `Role` table
    pub async fn count_roles(&self) -> Result<i64, AppError> {
        sqlx::query_scalar(r#"SELECT COUNT(*) FROM "Role""#)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to count roles: {}", e)))
    }

    /// Look up a role id by name
    pub async fn role_id_by_name(&self, role_name: &str) -> Result<Option<i64>, AppError> {
        sqlx::query_scalar(r#"SELECT RID FROM "Role" WHERE role_name = ? ORDER BY RID LIMIT 1"#)
            .bind(role_name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to fetch role: {}", e)))
    }

    /// Get a user (with role name) by login id
    pub async fn find_user_by_login_id(&self, login_id: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>(
            r#"SELECT u.UID, u.name, u.id, u.pw, u.role_id, r.role_name
               FROM "User" u
               LEFT JOIN "Role" r ON r.RID = u.role_id
               WHERE u.id = ?"#,
        )
        .bind(login_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to fetch user: {}", e)))
    }

    /// Register a user and return its `UID`.
    ///
    /// A login id collision at insert time maps to [`AppError::LoginIdTaken`].
    pub async fn create_user(&self, user: &NewUser<'_>) -> Result<i64, AppError> {
        let result = sqlx::query(r#"INSERT INTO "User" (id, pw, name, role_id) VALUES (?, ?, ?, ?)"#)
            .bind(user.login_id)
            .bind(user.password_hash)
            .bind(user.name)
            .bind(user.role_id)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                    AppError::LoginIdTaken(user.login_id.to_string())
                }
                other => AppError::Internal(anyhow::anyhow!("Failed to create user: {}", other)),
            })?;

        let uid = result.last_insert_rowid();
        debug!(uid, login_id = %user.login_id, "Created user");
        Ok(uid)
    }

    /// Measurements whose `measured_at` starts with `prefix`, newest id first.
    ///
    /// The match is a literal, case-sensitive string prefix.
    pub async fn list_measurements_by_date_prefix(
        &self,
        prefix: &str,
    ) -> Result<Vec<LogEntry>, AppError> {
        let entries = sqlx::query_as::<_, LogEntry>(
            r#"SELECT m.MID AS mid,
                      COALESCE(m.measured_at, '') AS timestamp,
                      COALESCE(p.product_name, ?) AS product_name,
                      COALESCE(m.inspection_result, '') AS result
               FROM "MEASUREMENTS" m
               LEFT JOIN "PRODUCT" p ON p.product_id = m.product_id
               WHERE substr(m.measured_at, 1, length(?)) = ?
               ORDER BY m.MID DESC"#,
        )
        .bind(UNKNOWN_PRODUCT)
        .bind(prefix)
        .bind(prefix)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to fetch logs: {}", e)))?;

        debug!(prefix, count = entries.len(), "Listed measurements");
        Ok(entries)
    }

    /// Get a measurement by id
    pub async fn get_measurement(&self, mid: i64) -> Result<Option<Measurement>, AppError> {
        sqlx::query_as::<_, Measurement>(
            r#"SELECT MID, product_id, measured_at, inspection_result, cam1_path, cam2_path
               FROM "MEASUREMENTS" WHERE MID = ?"#,
        )
        .bind(mid)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to fetch measurement: {}", e)))
    }

    /// Add a product and return its id
    pub async fn insert_product(&self, product_name: &str) -> Result<i64, AppError> {
        let result = sqlx::query(r#"INSERT INTO "PRODUCT" (product_name) VALUES (?)"#)
            .bind(product_name)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to insert product: {}", e)))?;

        Ok(result.last_insert_rowid())
    }

    /// Add a measurement and return its `MID`
    pub async fn insert_measurement(&self, measurement: &NewMeasurement) -> Result<i64, AppError> {
        let result = sqlx::query(
            r#"INSERT INTO "MEASUREMENTS"
               (product_id, measured_at, inspection_result, cam1_path, cam2_path)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(measurement.product_id)
        .bind(measurement.measured_at.as_deref())
        .bind(measurement.inspection_result.as_deref())
        .bind(measurement.cam1_path.as_deref())
        .bind(measurement.cam2_path.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to insert measurement: {}", e)))?;

        Ok(result.last_insert_rowid())
    }

    /// Get the database pool (for advanced operations if needed)
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
