//! Business services observed by the instrumentation pipeline.

pub mod users;

pub use users::{ServiceError, UserRegistry};
