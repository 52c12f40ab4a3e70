//! Precondition wrapper
//!
//! A precondition is a condition on a method's inputs that must hold before
//! its body executes. The predicate sees the receiver and the call's actual
//! arguments; the message is static.
//!
//! Check order per call: read configuration, evaluate the predicate (exactly
//! once when enabled, never when disabled), report any violation through the
//! configured handler, then delegate to the wrapped layer. With a handler
//! that allows continuation the body still runs with the original arguments
//! and its result is returned unchanged.

use crate::error::{Result, Violation, ViolationKind};
use crate::handler::ViolationHandler;
use crate::method::Method;
use std::fmt;
use std::sync::Arc;

/// Declare a precondition to be attached with [`Precondition::wrap`]
///
/// Usually written through the [`Method::require`] shorthand; the standalone
/// declaration exists for sharing one condition across several methods.
pub fn require<S, A, P>(predicate: P, message: impl Into<String>) -> Precondition<S, A>
where
    P: Fn(&S, &A) -> bool + 'static,
{
    Precondition {
        predicate: Arc::new(predicate),
        message: message.into(),
    }
}

/// An immutable (predicate, message) pair guarding a method's inputs
pub struct Precondition<S, A> {
    predicate: Arc<dyn Fn(&S, &A) -> bool>,
    message: String,
}

impl<S, A> Precondition<S, A>
where
    S: 'static,
    A: 'static,
{
    /// The static message reported on violation
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Wrap a method so the condition is checked before its body
    pub fn wrap<R: 'static>(&self, method: Method<S, A, R>) -> Method<S, A, R> {
        let Method {
            name,
            config,
            call: mut inner,
        } = method;
        let predicate = Arc::clone(&self.predicate);
        let message = self.message.clone();
        let check = config.clone();

        let call: Box<dyn FnMut(&mut S, A) -> Result<R>> = Box::new(move |receiver, args| {
            let (enabled, handler) = check.snapshot();
            if enabled && !predicate(receiver, &args) {
                handler.on_violation(Violation::new(
                    ViolationKind::Precondition,
                    name,
                    message.clone(),
                ))?;
            }
            inner(receiver, args)
        });

        Method { name, config, call }
    }
}

impl<S, A> Clone for Precondition<S, A> {
    fn clone(&self) -> Self {
        Precondition {
            predicate: Arc::clone(&self.predicate),
            message: self.message.clone(),
        }
    }
}

impl<S, A> fmt::Debug for Precondition<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Precondition")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
