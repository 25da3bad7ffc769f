//! API module
//!
//! HTTP request handlers and the route table under `/api`.

pub mod account;
pub mod extract;
pub mod logs;
pub mod system;

use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

/// Build the application routes. Middleware layers are added by the caller.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(system::health_check))
        // Accounts
        .route("/api/signup", post(account::signup))
        .route("/api/login", post(account::login))
        .route("/api/logout", post(account::logout))
        .route("/api/status", get(account::status))
        // Inspection logs
        .route("/api/logs", post(logs::list_logs))
        .route("/api/logs/:mid/images", get(logs::get_log_images))
        .with_state(state)
}
