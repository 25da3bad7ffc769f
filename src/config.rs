//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults.

use std::env;
use std::fmt;

/// Signing secret used when `JWT_SECRET` is not set. Only suitable for development.
pub const DEFAULT_JWT_SECRET: &str = "inspection-log-dev-secret";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Credential configuration
    pub auth: AuthConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    pub path: String,
    /// Upper bound on pooled connections
    pub max_connections: u32,
}

/// Credential configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret for signing access tokens
    pub jwt_secret: String,
    /// Access token lifetime (in minutes)
    pub token_ttl_minutes: i64,
    /// bcrypt work factor
    pub bcrypt_cost: u32,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

impl AuthConfig {
    /// Whether the built-in development secret is in use
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

/// Parse an environment variable, falling back to `default` when unset or invalid
fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env_in_range(key, default, |_| true)
}

/// Like [`env_or`], but a parsed value rejected by `valid` also falls back to `default`
fn env_in_range<T: std::str::FromStr>(key: &str, default: T, valid: impl Fn(&T) -> bool) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|v| valid(v))
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                port: env_or("PORT", 8000),
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            },
            database: DatabaseConfig {
                path: env::var("DATABASE_PATH").unwrap_or_else(|_| "data/factory.db".to_string()),
                max_connections: env_or("DB_MAX_CONNECTIONS", 5),
            },
            auth: AuthConfig {
                jwt_secret: env::var("JWT_SECRET")
                    .ok()
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string()),
                token_ttl_minutes: env_in_range("TOKEN_TTL_MINUTES", 60 * 24, |ttl| *ttl > 0),
                // bcrypt only accepts costs 4 through 31
                bcrypt_cost: env_in_range("BCRYPT_COST", bcrypt::DEFAULT_COST, |cost| {
                    (4..=31).contains(cost)
                }),
            },
        }
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
