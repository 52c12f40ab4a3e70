//! Pluggable violation reporting
//!
//! Every failed contract check flows through exactly one [`ViolationHandler`],
//! taken from the method's [`ConfigHandle`](crate::ConfigHandle) at call
//! time. The handler decides the fate of the call: return an `Err` to fail it
//! (what [`FailFast`], the default, does) or `Ok(())` to let it continue.
//!
//! Violations are never swallowed inside the wrappers themselves; suppression
//! is always an explicit handler decision.

use crate::error::{Result, Violation};
use parking_lot::Mutex;
use std::sync::Arc;

/// Reaction to a failed contract check
///
/// Implementations must be `Send + Sync`: one handler instance may be shared
/// by every guarded method in the process.
pub trait ViolationHandler: Send + Sync {
    /// React to a violation; `Err` fails the guarded call, `Ok` lets it
    /// continue
    fn on_violation(&self, violation: Violation) -> Result<()>;
}

impl<T: ViolationHandler + ?Sized> ViolationHandler for Arc<T> {
    fn on_violation(&self, violation: Violation) -> Result<()> {
        (**self).on_violation(violation)
    }
}

/// Adapter turning a plain closure into a [`ViolationHandler`]
///
/// ```
/// use dbc::{HandlerFn, Result, Violation, ViolationHandler, ViolationKind};
///
/// let handler = HandlerFn(|v: Violation| -> Result<()> {
///     eprintln!("{}", v);
///     Ok(())
/// });
/// let v = Violation::new(ViolationKind::Precondition, "m", "msg");
/// assert!(handler.on_violation(v).is_ok());
/// ```
pub struct HandlerFn<F>(
    /// The wrapped callback
    pub F,
);

impl<F> ViolationHandler for HandlerFn<F>
where
    F: Fn(Violation) -> Result<()> + Send + Sync,
{
    fn on_violation(&self, violation: Violation) -> Result<()> {
        (self.0)(violation)
    }
}

/// Default handler: fail the call with [`Error::Violation`](crate::Error)
///
/// With this handler a failing precondition prevents the body from running,
/// a failing postcondition discards the result, and a failing before-check
/// of an invariant prevents the body's effects.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailFast;

impl ViolationHandler for FailFast {
    fn on_violation(&self, violation: Violation) -> Result<()> {
        Err(violation.into())
    }
}

/// Report the violation on the `tracing` warning level and continue
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAndContinue;

impl ViolationHandler for LogAndContinue {
    fn on_violation(&self, violation: Violation) -> Result<()> {
        tracing::warn!(
            kind = %violation.kind,
            subject = %violation.subject,
            detail = %violation.message,
            "contract violation",
        );
        Ok(())
    }
}

/// Collect violations and continue
///
/// Intended for tests and audit tooling: share one `Arc<Recording>` between
/// the configuration and the assertion site, trigger calls, then inspect
/// [`violations`](Recording::violations).
#[derive(Debug, Default)]
pub struct Recording {
    calls: Mutex<Vec<Violation>>,
}

impl Recording {
    /// Create an empty recorder
    pub fn new() -> Self {
        Recording::default()
    }

    /// Snapshot of everything recorded so far, in order
    pub fn violations(&self) -> Vec<Violation> {
        self.calls.lock().clone()
    }

    /// Drain the recorder, returning everything recorded so far
    pub fn take(&self) -> Vec<Violation> {
        std::mem::take(&mut *self.calls.lock())
    }

    /// Number of recorded violations
    pub fn len(&self) -> usize {
        self.calls.lock().len()
    }

    /// True if nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.calls.lock().is_empty()
    }
}

impl ViolationHandler for Recording {
    fn on_violation(&self, violation: Violation) -> Result<()> {
        self.calls.lock().push(violation);
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
