//! Bearer token extractor
//!
//! Handlers that take an [`AuthUser`] only run for requests carrying a
//! valid `Authorization: Bearer <token>` header.

use crate::error::AppError;
use crate::state::AppState;
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

/// Identity of the caller, taken from a validated access token
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    /// Login id (`sub` claim)
    pub login_id: String,
    /// Display name
    pub name: Option<String>,
    /// Role name
    pub role: Option<String>,
}

/// Pull the token out of an `Authorization` header value
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token)
            .ok_or(AppError::InvalidCredentials)?;

        let claims = state
            .tokens
            .verify_token(token, || AppError::InvalidCredentials)?;

        let login_id = claims
            .get_str("sub")
            .ok_or(AppError::InvalidCredentials)?
            .to_string();

        Ok(AuthUser {
            login_id,
            name: claims.get_str("name").map(str::to_string),
            role: claims.get_str("role").map(str::to_string),
        })
    }
}
