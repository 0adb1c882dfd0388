//! HTTP handler definitions for the roster server.
//!
//! This module defines `AppState` (the shared state carried through axum
//! extractors) and re-exports all handler functions for convenient access
//! when building the router.

pub mod health;
pub mod users;

pub use health::{health_handler, liveness_handler, readiness_handler};
pub use users::{add_user_handler, fire_exception_handler, get_users_handler, remove_user_handler};

use std::sync::Arc;
use std::time::Instant;

use crate::service::UserRegistry;

use super::ShutdownController;

/// Shared application state passed to all axum handlers via `State` extraction.
///
/// Holds `Arc` references to shared resources so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// The user roster all request handlers operate on.
    pub users: Arc<UserRegistry>,
    /// Health state for the probe endpoints.
    pub shutdown: Arc<ShutdownController>,
    /// Server process start time, used for uptime calculation.
    pub start_time: Instant,
}

#[cfg(test)]
pub(crate) fn test_state() -> AppState {
    AppState {
        users: Arc::new(UserRegistry::new()),
        shutdown: Arc::new(ShutdownController::new()),
        start_time: Instant::now(),
    }
}
