//! Row types
//!
//! Field names follow the column names of the shared database file.

use serde::Serialize;
use sqlx::FromRow;

/// Role every signup receives
pub const STAFF_ROLE: &str = "staff";

/// Roles seeded into an empty `Role` table, in id order
pub const DEFAULT_ROLES: [&str; 2] = ["admin", STAFF_ROLE];

/// Shown when a measurement's product does not resolve
pub const UNKNOWN_PRODUCT: &str = "Unknown";

/// A registered user joined with its role name
#[derive(Debug, Clone, FromRow)]
pub struct User {
    /// Internal numeric key (`UID`)
    #[sqlx(rename = "UID")]
    pub uid: i64,
    /// Display name
    pub name: String,
    /// Login id chosen at signup (column `id`)
    #[sqlx(rename = "id")]
    pub login_id: String,
    /// bcrypt hash (column `pw`)
    #[sqlx(rename = "pw")]
    pub password_hash: String,
    /// Role reference
    pub role_id: Option<i64>,
    /// Name of the referenced role, if it resolves
    pub role_name: Option<String>,
}

/// Fields required to register a user
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    /// Login id
    pub login_id: &'a str,
    /// Already-hashed password
    pub password_hash: &'a str,
    /// Display name
    pub name: &'a str,
    /// Role reference
    pub role_id: i64,
}

/// A stored measurement row
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Measurement {
    /// Measurement id (`MID`)
    #[sqlx(rename = "MID")]
    pub mid: i64,
    /// Product reference
    pub product_id: Option<i64>,
    /// Measurement time as stored (ISO-8601-like text)
    pub measured_at: Option<String>,
    /// Inspection result, normally "OK" or "NG"
    pub inspection_result: Option<String>,
    /// Path to the first camera image
    pub cam1_path: Option<String>,
    /// Path to the second camera image
    pub cam2_path: Option<String>,
}

/// Fields for inserting a measurement. `None` values are stored as NULL;
/// the `'OK'` column default only applies to writers that omit the column.
#[derive(Debug, Clone, Default)]
pub struct NewMeasurement {
    /// Product reference
    pub product_id: Option<i64>,
    /// Measurement time
    pub measured_at: Option<String>,
    /// Inspection result
    pub inspection_result: Option<String>,
    /// First camera image path
    pub cam1_path: Option<String>,
    /// Second camera image path
    pub cam2_path: Option<String>,
}

/// One row of the log listing, already shaped for clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct LogEntry {
    /// Measurement id
    pub mid: i64,
    /// Stored timestamp, `""` when null
    pub timestamp: String,
    /// Product name, "Unknown" when the product does not resolve
    pub product_name: String,
    /// Inspection result, `""` when null
    pub result: String,
}
