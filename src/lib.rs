//! Inspection Log Backend Library
//!
//! This library exposes modules for testing and external use.
//! The main binary is in `src/main.rs`.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod services;
/// Application state management
///
/// Explicitly constructed dependencies shared by request handlers.
pub mod state;
