//! Violation taxonomy and error types
//!
//! Exactly three kinds of contract can fail: preconditions, postconditions,
//! and invariants. A failed check is described by a [`Violation`] and handed
//! to the configured handler; the default handler turns it into
//! [`Error::Violation`], which fails the call.
//!
//! There is no "predicate threw" kind: a panicking predicate unwinds through
//! the wrappers unmodified, distinguishable from a contract violation because
//! it never passes through the violation handler.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type alias for contract-guarded calls
pub type Result<T> = std::result::Result<T, Error>;

/// The kind of contract that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationKind {
    /// A condition on a method's inputs, checked before the body runs
    Precondition,
    /// A condition relating a method's result to its inputs, checked after
    /// the body runs
    Postcondition,
    /// A condition on the receiver's state, checked before and after every
    /// guarded method
    Invariant,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ViolationKind::Precondition => "Precondition",
            ViolationKind::Postcondition => "Postcondition",
            ViolationKind::Invariant => "Invariant",
        };
        write!(f, "{}", name)
    }
}

/// Structured description of a failed contract check
///
/// This is the value every [`ViolationHandler`](crate::ViolationHandler)
/// receives. `subject` is the declared name of the method whose call
/// triggered the check, fixed at wrap time regardless of how many contract
/// layers wrap the method.
///
/// The `Display` rendering is a compatibility surface: consumers match on
/// the exact text `[<Kind> failed] on <subject>: <message>`. Invariant
/// violations carry a `(before) ` or `(after) ` prefix inside `message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Which kind of contract failed
    pub kind: ViolationKind,
    /// Declared name of the method whose call triggered the check
    pub subject: String,
    /// The static message attached to the contract declaration
    pub message: String,
}

impl Violation {
    /// Create a violation record
    pub fn new(
        kind: ViolationKind,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Violation {
            kind,
            subject: subject.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} failed] on {}: {}",
            self.kind, self.subject, self.message
        )
    }
}

/// Error type for contract-guarded calls
///
/// The only way a wrapper itself fails a call is a handler refusing to
/// continue after a violation. Errors raised by the original method body are
/// the body's own concern and propagate through its return type (or by
/// unwinding), never through this enum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A contract predicate evaluated to false and the handler failed the call
    #[error("{0}")]
    Violation(Violation),
}

impl Error {
    /// The violation that failed the call
    pub fn violation(&self) -> &Violation {
        match self {
            Error::Violation(v) => v,
        }
    }
}

impl From<Violation> for Error {
    fn from(violation: Violation) -> Self {
        Error::Violation(violation)
    }
}

// ============================================================================
// Tests
// ============================================================================
