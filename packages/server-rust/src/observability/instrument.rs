//! Method-level timing and outcome records for business operations.
//!
//! [`instrumented`] wraps one operation invocation with `START`/`END`/`ERROR`
//! records and elapsed time. It is a pure observer: the wrapped operation's
//! value or error passes through unchanged, and the operation's author
//! writes no logging code.

use std::fmt;
use std::future::Future;
use std::time::Instant;

use tracing::{error, info};

use super::correlation;

/// Runs `op` with start/end/error records around it.
///
/// Record shapes, all stamped with the current trace id:
///
/// - `START <component>#<operation>` before the call (INFO)
/// - `END   <component>#<operation>, time=<ms>ms` on success (INFO)
/// - `ERROR <component>#<operation>, time=<ms>` plus the error detail on
///   failure (ERROR)
///
/// The returned result is exactly what `op` produced — errors are re-raised
/// untouched, never converted, wrapped, or suppressed.
pub async fn instrumented<F, T, E>(
    component: &'static str,
    operation: &'static str,
    op: F,
) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let trace_id = correlation::current().trace_id;

    info!(trace_id = %trace_id, "START {component}#{operation}");

    let start = Instant::now();
    match op.await {
        Ok(value) => {
            let time = elapsed_ms(start);
            info!(trace_id = %trace_id, "END   {component}#{operation}, time={time}ms");
            Ok(value)
        }
        Err(err) => {
            let time = elapsed_ms(start);
            error!(trace_id = %trace_id, error = %err, "ERROR {component}#{operation}, time={time}");
            Err(err)
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
