//! Postcondition wrapper
//!
//! A postcondition relates a method's result to its inputs. The body always
//! executes first, unconditionally; only then is configuration consulted and
//! the predicate evaluated with the receiver, the raw return value, and the
//! original arguments. An error from an inner layer propagates untouched and
//! the postcondition is never evaluated (there is no result to check).
//!
//! The predicate receives the result with no special-casing: unit, `None`,
//! and zero-sized values all flow through identically. Arguments are cloned
//! before the body consumes them so the predicate sees the originals, which
//! is why `A: Clone` is required here and nowhere else.

use crate::error::{Result, Violation, ViolationKind};
use crate::handler::ViolationHandler;
use crate::method::Method;
use std::fmt;
use std::sync::Arc;

/// Declare a postcondition to be attached with [`Postcondition::wrap`]
pub fn ensure<S, A, R, P>(predicate: P, message: impl Into<String>) -> Postcondition<S, A, R>
where
    P: Fn(&S, &R, &A) -> bool + 'static,
{
    Postcondition {
        predicate: Arc::new(predicate),
        message: message.into(),
    }
}

/// An immutable (predicate, message) pair guarding a method's result
pub struct Postcondition<S, A, R> {
    predicate: Arc<dyn Fn(&S, &R, &A) -> bool>,
    message: String,
}

impl<S, A, R> Postcondition<S, A, R>
where
    S: 'static,
    A: Clone + 'static,
    R: 'static,
{
    /// The static message reported on violation
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Wrap a method so the condition is checked after its body
    pub fn wrap(&self, method: Method<S, A, R>) -> Method<S, A, R> {
        let Method {
            name,
            config,
            call: mut inner,
        } = method;
        let predicate = Arc::clone(&self.predicate);
        let message = self.message.clone();
        let check = config.clone();

        let call: Box<dyn FnMut(&mut S, A) -> Result<R>> = Box::new(move |receiver, args| {
            let saved = args.clone();
            let result = inner(receiver, args)?;
            let (enabled, handler) = check.snapshot();
            if enabled && !predicate(receiver, &result, &saved) {
                handler.on_violation(Violation::new(
                    ViolationKind::Postcondition,
                    name,
                    message.clone(),
                ))?;
            }
            Ok(result)
        });

        Method { name, config, call }
    }
}

impl<S, A, R> Clone for Postcondition<S, A, R> {
    fn clone(&self) -> Self {
        Postcondition {
            predicate: Arc::clone(&self.predicate),
            message: self.message.clone(),
        }
    }
}

impl<S, A, R> fmt::Debug for Postcondition<S, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Postcondition")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
