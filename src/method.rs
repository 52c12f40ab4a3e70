//! Wrapped-method core
//!
//! Rust has no runtime method replacement, so a guarded method is an
//! explicit value: [`Method<S, A, R>`] owns the original body as a boxed
//! closure and forwards every call to it. Attaching a contract produces a
//! new `Method` whose closure captures the previous one; layers nest by
//! ordinary function composition, and the order of attachment determines
//! the nesting order and hence the check order.
//!
//! Two identities are fixed at wrap time and never change:
//! - the method's declared name, which is what violations report no matter
//!   how many layers wrap the method;
//! - the [`ConfigHandle`] the method consults, read fresh on every call.
//!
//! `S` is the receiver type, `A` the argument type (use a tuple for
//! multi-argument methods), `R` the return type. The receiver is passed
//! explicitly to every call and to every predicate, which is the Rust
//! rendering of `this`-binding: predicates can always see other receiver
//! state, not just the call arguments.

use crate::config::ConfigHandle;
use crate::error::Result;
use crate::invariant::Invariant;
use std::fmt;

/// A callable with a fixed name, a configuration handle, and zero or more
/// contract layers around its original body
///
/// ```
/// use dbc::{ConfigHandle, ContractConfig, Method};
///
/// struct Counter {
///     count: u32,
/// }
///
/// let config = ConfigHandle::new(ContractConfig::default());
/// let mut step = Method::with_config("step", config, |c: &mut Counter, by: u32| {
///     c.count += by;
///     c.count
/// })
/// .require(|_c: &Counter, by: &u32| *by > 0, "step size must be positive");
///
/// let mut counter = Counter { count: 0 };
/// assert_eq!(step.call(&mut counter, 3).unwrap(), 3);
/// assert!(step.call(&mut counter, 0).is_err());
/// ```
pub struct Method<S, A, R> {
    pub(crate) name: &'static str,
    pub(crate) config: ConfigHandle,
    pub(crate) call: Box<dyn FnMut(&mut S, A) -> Result<R>>,
}

impl<S, A, R> Method<S, A, R>
where
    S: 'static,
    A: 'static,
    R: 'static,
{
    /// Declare a method bound to the process-wide configuration
    pub fn new<F>(name: &'static str, body: F) -> Self
    where
        F: FnMut(&mut S, A) -> R + 'static,
    {
        Method::with_config(name, ConfigHandle::global(), body)
    }

    /// Declare a method bound to an explicit configuration handle
    pub fn with_config<F>(name: &'static str, config: ConfigHandle, mut body: F) -> Self
    where
        F: FnMut(&mut S, A) -> R + 'static,
    {
        Method {
            name,
            config,
            call: Box::new(move |receiver, args| Ok(body(receiver, args))),
        }
    }

    /// The declared name, as reported in violations
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The configuration handle this method consults on every call
    pub fn config(&self) -> &ConfigHandle {
        &self.config
    }

    /// Invoke the method through all of its contract layers
    ///
    /// With the default handler an `Err` means a contract failed; the body's
    /// own failures travel through `R` (or unwind), never through this
    /// `Result`.
    pub fn call(&mut self, receiver: &mut S, args: A) -> Result<R> {
        (self.call)(receiver, args)
    }

    /// Attach a precondition; shorthand for
    /// [`require(..).wrap(self)`](crate::require)
    pub fn require<P>(self, predicate: P, message: impl Into<String>) -> Self
    where
        P: Fn(&S, &A) -> bool + 'static,
    {
        crate::require(predicate, message).wrap(self)
    }

    /// Attach a postcondition; shorthand for
    /// [`ensure(..).wrap(self)`](crate::ensure)
    pub fn ensure<P>(self, predicate: P, message: impl Into<String>) -> Self
    where
        P: Fn(&S, &R, &A) -> bool + 'static,
        A: Clone,
    {
        crate::ensure(predicate, message).wrap(self)
    }

    /// Wrap this method in a class invariant
    ///
    /// Apply last: the invariant layer must be outermost for the canonical
    /// check order invariant-before, precondition, body, postcondition,
    /// invariant-after.
    pub fn guarded_by(self, invariant: &Invariant<S>) -> Self {
        invariant.wrap(self)
    }
}

impl<S, A, R> fmt::Debug for Method<S, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method").field("name", &self.name).finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContractConfig;
    use crate::error::ViolationKind;
    use crate::handler::Recording;
    use std::sync::Arc;

    struct Account {
        balance: i64,
    }

    #[test]
    fn test_call_forwards_args_and_result() {
        let config = ConfigHandle::new(ContractConfig::default());
        let mut sum =
            Method::with_config("sum", config, |_s: &mut (), (a, b): (i64, i64)| a + b);
        assert_eq!(sum.call(&mut (), (5, 3)).unwrap(), 8);
    }

    #[test]
    fn test_body_mutates_receiver() {
        let config = ConfigHandle::new(ContractConfig::default());
        let mut deposit =
            Method::with_config("deposit", config, |a: &mut Account, amount: i64| {
                a.balance += amount;
            });
        let mut account = Account { balance: 100 };
        deposit.call(&mut account, 50).unwrap();
        assert_eq!(account.balance, 150);
    }

    #[test]
    fn test_name_fixed_across_layers() {
        let config = ConfigHandle::new(ContractConfig::default());
        let method = Method::with_config("withdraw", config, |_a: &mut Account, _amt: i64| {})
            .require(|_a: &Account, amt: &i64| *amt > 0, "amount must be positive")
            .ensure(|_a: &Account, _r: &(), _amt: &i64| true, "always");
        assert_eq!(method.name(), "withdraw");
    }

    #[test]
    fn test_default_binding_uses_global_config() {
        let mut double = Method::new("double", |_s: &mut (), x: i64| x * 2);
        // No assertions about the global's enabled state here: a passing
        // predicate-free method behaves the same either way.
        assert_eq!(double.call(&mut (), 21).unwrap(), 42);
    }

    #[test]
    fn test_config_mutation_observed_on_next_call() {
        let config = ConfigHandle::new(ContractConfig::default());
        let recorder = Arc::new(Recording::new());
        config.set_handler(Arc::clone(&recorder));

        let mut noop = Method::with_config("noop", config.clone(), |_s: &mut (), _x: i64| {})
            .require(|_s: &(), _x: &i64| false, "never holds");

        noop.call(&mut (), 1).unwrap();
        assert_eq!(recorder.len(), 1);

        // Disable through the same live handle the method holds.
        config.set_enabled(false);
        noop.call(&mut (), 1).unwrap();
        assert_eq!(recorder.len(), 1);

        config.set_enabled(true);
        noop.call(&mut (), 1).unwrap();
        assert_eq!(recorder.len(), 2);
        assert!(recorder
            .violations()
            .iter()
            .all(|v| v.kind == ViolationKind::Precondition));
    }

    #[test]
    fn test_debug_shows_name() {
        let config = ConfigHandle::new(ContractConfig::default());
        let method = Method::with_config("probe", config, |_s: &mut (), _x: ()| {});
        assert!(format!("{:?}", method).contains("probe"));
    }
}
