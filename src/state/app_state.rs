// Application state
// Built once in main and cloned into each handler through axum's `State`

use crate::auth::{PasswordHasher, TokenService};
use crate::config::Config;
use crate::db::Database;
use crate::error::AppError;
use std::sync::Arc;

/// Shared handles for request handlers.
///
/// Holds no mutable data: the database is the only state that outlives a request.
#[derive(Clone)]
pub struct AppState {
    /// Connection pool
    pub db: Database,
    /// Access token issuing and validation
    pub tokens: Arc<TokenService>,
    /// Password hashing
    pub passwords: PasswordHasher,
}

impl AppState {
    /// Assemble state from already-constructed parts
    pub fn new(db: Database, tokens: TokenService, passwords: PasswordHasher) -> Self {
        Self {
            db,
            tokens: Arc::new(tokens),
            passwords,
        }
    }

    /// Connect to the configured database, prepare it, and build the credential services
    pub async fn from_config(config: &Config) -> Result<Self, AppError> {
        let db = Database::connect(&config.database).await?;
        db.seed_roles().await?;

        Ok(Self::new(
            db,
            TokenService::new(&config.auth.jwt_secret, config.auth.token_ttl_minutes),
            PasswordHasher::new(config.auth.bcrypt_cost),
        ))
    }

    /// Seeded in-memory state with a cheap bcrypt cost
    #[cfg(test)]
    pub(crate) async fn for_tests() -> Self {
        let db = Database::in_memory().await.expect("in-memory database");
        db.seed_roles().await.expect("seed roles");
        Self::new(
            db,
            TokenService::new("test-secret", crate::auth::token::DEFAULT_TOKEN_TTL_MINUTES),
            PasswordHasher::new(4),
        )
    }
}
