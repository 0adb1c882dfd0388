//! Roster Server — user-roster HTTP service with request correlation and access logging.

pub mod error;
pub mod network;
pub mod observability;
pub mod service;

pub use error::AppError;
