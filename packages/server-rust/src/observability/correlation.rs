//! Ambient correlation scope for request-handling code.
//!
//! Binds a [`RequestContext`] to the task executing one request so code at
//! any call depth can read it without threading it through every signature.
//! The binding is task-local: concurrent requests each observe their own
//! context, never each other's.
//!
//! Release is tied to the scoped future's lifetime — completion, error
//! return, and drop (cancellation) all clear the binding. There is no
//! explicit "end" call to forget.

use std::future::Future;

use roster_core::RequestContext;

tokio::task_local! {
    /// Context of the request the current task is handling.
    static CURRENT: RequestContext;
}

/// Runs `fut` with `ctx` bound as the current request context.
///
/// The binding covers exactly the lifetime of `fut`. Nested scopes are
/// possible but not expected; the innermost binding wins while it lives.
pub fn scope<F>(ctx: RequestContext, fut: F) -> impl Future<Output = F::Output>
where
    F: Future,
{
    CURRENT.scope(ctx, fut)
}

/// Returns the current request context, or the detached sentinel when the
/// calling task is not handling a request.
///
/// Never fails: logging code running outside any request scope degrades to
/// the sentinel instead of crashing.
#[must_use]
pub fn current() -> RequestContext {
    CURRENT
        .try_with(Clone::clone)
        .unwrap_or_else(|_| RequestContext::detached())
}
