//! Request/operation instrumentation pipeline.
//!
//! Every inbound request produces one access record, and every observed
//! business operation produces START/END (or START/ERROR) records, all
//! stamped with the request's correlation context. The pieces:
//!
//! - [`correlation`]: task-local binding of the per-request context
//! - [`access_log`]: transport-level timing, outcome classification, and
//!   access-record emission (outermost tower layer)
//! - [`instrument`]: method-level timing/outcome records around business
//!   operations, transparent to their results and errors
//! - [`logging`]: subscriber bootstrap for the process
//!
//! Instrumentation observes; it never alters a wrapped operation's value or
//! error, and a failure to emit a record never aborts request handling.

pub mod access_log;
pub mod correlation;
pub mod instrument;
pub mod logging;

pub use access_log::{AccessLogLayer, IdentityResolver, PlaceholderIdentity};
pub use instrument::instrumented;
