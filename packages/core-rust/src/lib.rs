//! Roster Core — request correlation identifiers and context.

pub mod context;
pub mod trace_id;

pub use context::{RequestContext, DETACHED_ACTOR};
pub use trace_id::TraceId;
