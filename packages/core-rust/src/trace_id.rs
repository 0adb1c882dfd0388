//! Request correlation identifiers.
//!
//! A [`TraceId`] binds together every log record produced while handling one
//! inbound request. Identifiers are 128-bit random values (UUID v4), which is
//! collision-resistant at any realistic request volume.
//!
//! # Wire format
//!
//! Trace ids render as 32 lowercase hex characters with no hyphens (the UUID
//! "simple" format), matching the shape carried in `x-trace-id` headers.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque unique token correlating all log records of one request.
///
/// The nil value (all zeros) is reserved for the detached sentinel returned
/// when no request context is bound; see
/// [`RequestContext::detached`](crate::RequestContext::detached).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Generates a fresh random trace id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The nil trace id, used only by the detached context sentinel.
    #[must_use]
    pub const fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// Returns `true` for the nil (sentinel) trace id.
    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    /// Parses a trace id from its 32-hex-char rendering.
    ///
    /// Accepts any format `uuid` itself accepts (hyphenated included), since
    /// upstream proxies are not consistent about it.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}
