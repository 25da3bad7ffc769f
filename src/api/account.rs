//! Account API handlers
//!
//! Signup, login, logout, and token status. Every credential failure is
//! reported as the same `401 Invalid credentials`.

use crate::api::extract::ApiJson;
use crate::auth::AuthUser;
use crate::db::models::{NewUser, STAFF_ROLE};
use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{info, warn};

/// Maximum length of any signup field, in characters
pub const MAX_FIELD_LENGTH: usize = 255;

/// Signup request
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    /// Login id
    pub id: String,
    /// Plaintext password
    pub pw: String,
    /// Display name
    pub name: String,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login id
    pub id: String,
    /// Plaintext password
    pub pw: String,
}

/// Generic status/message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// "success" on success
    pub status: String,
    /// Human-readable detail
    pub message: String,
}

impl MessageResponse {
    fn success(message: &str) -> Self {
        Self {
            status: "success".to_string(),
            message: message.to_string(),
        }
    }
}

/// Public view of a user
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// Login id
    pub id: String,
    /// Display name
    pub name: String,
    /// Role name
    pub role: Option<String>,
}

/// Successful login
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Signed access token
    pub access_token: String,
    /// Always "bearer"
    pub token_type: String,
    /// The authenticated user
    pub user: UserResponse,
}

/// Result of a token status check
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Always "ok"
    pub status: String,
    /// Login id
    pub id: String,
    /// Display name
    pub name: Option<String>,
    /// Role name
    pub role: Option<String>,
}

fn validate_field(field: &str, value: &str, trim: bool) -> Result<(), AppError> {
    let checked = if trim { value.trim() } else { value };
    if checked.is_empty() {
        return Err(AppError::InvalidRequest(format!("{} cannot be empty", field)));
    }
    if value.chars().count() > MAX_FIELD_LENGTH {
        return Err(AppError::InvalidRequest(format!(
            "{} exceeds maximum length of {} characters",
            field, MAX_FIELD_LENGTH
        )));
    }
    Ok(())
}

/// Validate a signup request
pub fn validate_signup(request: &SignupRequest) -> Result<(), AppError> {
    validate_field("id", &request.id, true)?;
    // Passwords are taken verbatim; only the empty string is rejected
    validate_field("pw", &request.pw, false)?;
    validate_field("name", &request.name, true)
}

/// POST /api/signup - Register a new staff user
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SignupRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    validate_signup(&request)?;

    if state.db.find_user_by_login_id(&request.id).await?.is_some() {
        return Err(AppError::LoginIdTaken(request.id));
    }

    let role_id = state
        .db
        .role_id_by_name(STAFF_ROLE)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Role '{}' is missing", STAFF_ROLE)))?;

    let password_hash = state.passwords.hash_blocking(request.pw).await?;

    // The UNIQUE constraint still catches a concurrent signup that slipped past the check above
    let uid = state
        .db
        .create_user(&NewUser {
            login_id: &request.id,
            password_hash: &password_hash,
            name: &request.name,
            role_id,
        })
        .await?;

    info!(uid, login_id = %request.id, "User signed up");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::success("Signup complete")),
    ))
}

/// POST /api/login - Verify credentials and issue an access token
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let Some(user) = state.db.find_user_by_login_id(&request.id).await? else {
        // Same bcrypt work as a real check, so response time does not reveal the id is unknown
        state.passwords.verify_unknown_blocking(request.pw).await;
        warn!(login_id = %request.id, "Login attempt for unknown id");
        return Err(AppError::InvalidCredentials);
    };

    if !state
        .passwords
        .verify_blocking(request.pw, user.password_hash.clone())
        .await
    {
        warn!(login_id = %user.login_id, "Login attempt with wrong password");
        return Err(AppError::InvalidCredentials);
    }

    let mut claims = Map::new();
    claims.insert("sub".to_string(), json!(user.login_id));
    claims.insert("name".to_string(), json!(user.name));
    if let Some(role) = &user.role_name {
        claims.insert("role".to_string(), Value::String(role.clone()));
    }
    let access_token = state.tokens.issue_token(claims)?;

    info!(login_id = %user.login_id, "User logged in");
    Ok(Json(LoginResponse {
        access_token,
        token_type: "bearer".to_string(),
        user: UserResponse {
            id: user.login_id,
            name: user.name,
            role: user.role_name,
        },
    }))
}

/// POST /api/logout - Acknowledge logout.
///
/// Tokens are stateless, so the client discarding its token is the logout.
pub async fn logout(user: AuthUser) -> Json<MessageResponse> {
    info!(login_id = %user.login_id, "User logged out");
    Json(MessageResponse::success("Logged out"))
}

/// GET /api/status - Report who the presented token belongs to
pub async fn status(user: AuthUser) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".to_string(),
        id: user.login_id,
        name: user.name,
        role: user.role,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup_request(id: &str, pw: &str, name: &str) -> SignupRequest {
        SignupRequest {
            id: id.to_string(),
            pw: pw.to_string(),
            name: name.to_string(),
        }
    }

    fn login_request(id: &str, pw: &str) -> LoginRequest {
        LoginRequest {
            id: id.to_string(),
            pw: pw.to_string(),
        }
    }

    #[tokio::test]
    async fn test_signup_then_duplicate() {
        let state = AppState::for_tests().await;

        let (status, response) = signup(
            State(state.clone()),
            ApiJson(signup_request("kim", "pw1234", "Kim")),
        )
        .await
        .expect("first signup should succeed");
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(response.status, "success");

        let result = signup(
            State(state.clone()),
            ApiJson(signup_request("kim", "other", "Someone Else")),
        )
        .await;
        match result {
            Err(AppError::LoginIdTaken(id)) => assert_eq!(id, "kim"),
            other => panic!("Expected LoginIdTaken error, got: {:?}", other),
        }

        // The original record is untouched
        let user = state.db.find_user_by_login_id("kim").await.unwrap().unwrap();
        assert_eq!(user.name, "Kim");
    }

    #[tokio::test]
    async fn test_signup_assigns_staff_and_hashes_password() {
        let state = AppState::for_tests().await;
        signup(State(state.clone()), ApiJson(signup_request("lee", "secret", "Lee")))
            .await
            .unwrap();
        signup(State(state.clone()), ApiJson(signup_request("park", "secret", "Park")))
            .await
            .unwrap();

        assert_eq!(state.db.count_roles().await.unwrap(), 2);

        let user = state.db.find_user_by_login_id("lee").await.unwrap().unwrap();
        assert_eq!(user.role_name.as_deref(), Some(STAFF_ROLE));
        assert_ne!(user.password_hash, "secret");
        assert!(state.passwords.verify("secret", &user.password_hash));
    }

    #[tokio::test]
    async fn test_signup_validation() {
        let state = AppState::for_tests().await;
        let cases = [
            signup_request("", "pw", "Name"),
            signup_request("id", "", "Name"),
            signup_request("   ", "pw", "Name"),
            signup_request("id", "pw", ""),
            signup_request(&"x".repeat(MAX_FIELD_LENGTH + 1), "pw", "Name"),
        ];

        for request in cases {
            let result = signup(State(state.clone()), ApiJson(request)).await;
            assert!(matches!(result, Err(AppError::InvalidRequest(_))));
        }
    }

    #[tokio::test]
    async fn test_whitespace_password_is_kept_verbatim() {
        let state = AppState::for_tests().await;
        signup(State(state.clone()), ApiJson(signup_request("kim", "   ", "Kim")))
            .await
            .expect("a whitespace password is still a password");

        login(State(state.clone()), ApiJson(login_request("kim", "   ")))
            .await
            .expect("login with the same whitespace password should succeed");
        let result = login(State(state.clone()), ApiJson(login_request("kim", " "))).await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_success_issues_valid_token() {
        let state = AppState::for_tests().await;
        signup(State(state.clone()), ApiJson(signup_request("kim", "pw1234", "Kim")))
            .await
            .unwrap();

        let response = login(State(state.clone()), ApiJson(login_request("kim", "pw1234")))
            .await
            .expect("login should succeed");
        assert_eq!(response.token_type, "bearer");
        assert_eq!(response.user.id, "kim");
        assert_eq!(response.user.role.as_deref(), Some(STAFF_ROLE));

        let claims = state
            .tokens
            .verify_token(&response.access_token, || AppError::InvalidCredentials)
            .unwrap();
        assert_eq!(claims.get_str("sub"), Some("kim"));
        assert_eq!(claims.get_str("name"), Some("Kim"));
    }

    #[tokio::test]
    async fn test_login_failures_are_uniform() {
        let state = AppState::for_tests().await;
        signup(State(state.clone()), ApiJson(signup_request("kim", "pw1234", "Kim")))
            .await
            .unwrap();

        let wrong_password = login(State(state.clone()), ApiJson(login_request("kim", "nope"))).await;
        let unknown_id = login(State(state.clone()), ApiJson(login_request("ghost", "pw1234"))).await;

        let wrong_password = wrong_password.unwrap_err();
        let unknown_id = unknown_id.unwrap_err();
        assert!(matches!(wrong_password, AppError::InvalidCredentials));
        assert!(matches!(unknown_id, AppError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_id.to_string());
    }

    #[tokio::test]
    async fn test_status_and_logout() {
        let user = AuthUser {
            login_id: "kim".to_string(),
            name: Some("Kim".to_string()),
            role: Some(STAFF_ROLE.to_string()),
        };

        let response = status(user.clone()).await;
        assert_eq!(response.status, "ok");
        assert_eq!(response.id, "kim");
        assert_eq!(response.role.as_deref(), Some(STAFF_ROLE));

        let response = logout(user).await;
        assert_eq!(response.status, "success");
    }
}
