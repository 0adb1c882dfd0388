//! Per-request correlation context.

use serde::{Deserialize, Serialize};

use crate::trace_id::TraceId;

/// Actor recorded when no identity provider resolved one.
pub const DETACHED_ACTOR: &str = "-";

/// Correlation data scoped to the lifetime of one inbound request.
///
/// Carries the trace id and actor identity every log record of the request is
/// stamped with. The context is owned by the execution handling the request;
/// it is never shared across concurrent requests and never outlives one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Unique token correlating all log records of this request.
    pub trace_id: TraceId,
    /// Identity (user/principal) the request is attributed to.
    pub actor: String,
}

impl RequestContext {
    /// Creates a context with a freshly generated trace id.
    #[must_use]
    pub fn new(actor: impl Into<String>) -> Self {
        Self {
            trace_id: TraceId::new(),
            actor: actor.into(),
        }
    }

    /// The "no context" sentinel observed outside any request scope.
    ///
    /// Reading correlation data must never fail, so code running outside a
    /// request (startup, background tasks, tests) sees this value instead of
    /// an error. The nil trace id marks it as detached.
    #[must_use]
    pub fn detached() -> Self {
        Self {
            trace_id: TraceId::nil(),
            actor: DETACHED_ACTOR.to_string(),
        }
    }

    /// Returns `true` if this is the detached sentinel.
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.trace_id.is_nil()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_context_is_attached_with_fresh_id() {
        let ctx = RequestContext::new("alice");
        assert!(!ctx.is_detached());
        assert_eq!(ctx.actor, "alice");
    }

    #[test]
    fn contexts_get_distinct_trace_ids() {
        let a = RequestContext::new("svc");
        let b = RequestContext::new("svc");
        assert_ne!(a.trace_id, b.trace_id);
    }

    #[test]
    fn detached_sentinel_has_nil_id_and_placeholder_actor() {
        let ctx = RequestContext::detached();
        assert!(ctx.is_detached());
        assert_eq!(ctx.actor, DETACHED_ACTOR);
        assert!(ctx.trace_id.is_nil());
    }
}
