// State management module
// Process-wide dependencies handed to every request handler

pub mod app_state;

pub use app_state::AppState;
