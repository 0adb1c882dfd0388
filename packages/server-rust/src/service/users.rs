//! In-memory user roster.
//!
//! Backed by [`DashSet`] so handlers serving different requests mutate the
//! roster without external locking. State lives for the process lifetime;
//! nothing persists.

use dashmap::DashSet;
use thiserror::Error;

/// Errors raised by roster operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Deliberate failure exercising the error path end to end.
    #[error("Hello, Exception!!!")]
    Synthetic,
}

/// Concurrent set of registered user names.
#[derive(Debug, Default)]
pub struct UserRegistry {
    users: DashSet<String>,
}

impl UserRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            users: DashSet::new(),
        }
    }

    /// Adds a user. Returns `false` if the name was already present.
    pub fn add(&self, name: impl Into<String>) -> bool {
        self.users.insert(name.into())
    }

    /// Removes a user. Returns `false` if the name was not present.
    pub fn remove(&self, name: &str) -> bool {
        self.users.remove(name).is_some()
    }

    /// Sorted snapshot of all registered names.
    #[must_use]
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.users.iter().map(|name| name.key().clone()).collect();
        names.sort();
        names
    }

    /// Number of registered names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Returns `true` when no names are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Always fails. Exists to demonstrate how a raised business error
    /// travels through instrumentation to the transport boundary.
    ///
    /// # Errors
    ///
    /// Always returns [`ServiceError::Synthetic`].
    pub fn fire_exception(&self) -> Result<(), ServiceError> {
        Err(ServiceError::Synthetic)
    }
}
