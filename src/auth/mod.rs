//! Credential service
//!
//! Password hashing, access token issuing/validation, and the bearer
//! token extractor used by protected handlers.

pub mod extractor;
pub mod password;
pub mod token;

pub use extractor::AuthUser;
pub use password::{PasswordError, PasswordHasher};
pub use token::{Claims, TokenError, TokenService};
