//! Class invariant wrapper
//!
//! An invariant is a condition on a receiver's observable state that must
//! hold immediately before and immediately after every guarded method call.
//! One [`Invariant`] declaration is applied to each operation of a type at
//! the point the contracted type is assembled; the set of guarded methods is
//! explicit, which is the Rust rendering of "every method defined directly
//! on the class".
//!
//! Construction is never guarded. An object may be built in a state that
//! violates the invariant and no violation fires until the first guarded
//! call — invariants guard method-mediated state transitions, not
//! construction.
//!
//! Applied outermost over an already-wrapped method, the effective order for
//! one call is: invariant-before, precondition, body, postcondition,
//! invariant-after. An error from the inner layers propagates untouched and
//! skips the after-check.

use crate::error::{Result, Violation, ViolationKind};
use crate::handler::ViolationHandler;
use crate::method::Method;
use std::fmt;
use std::sync::Arc;

/// Declare a class invariant
///
/// Free-function form of [`Invariant::new`], mirroring [`require`](crate::require)
/// and [`ensure`](crate::ensure).
pub fn invariant<S: 'static, P>(predicate: P, message: impl Into<String>) -> Invariant<S>
where
    P: Fn(&S) -> bool + 'static,
{
    Invariant::new(predicate, message)
}

/// An immutable (predicate, message) pair guarding a type's state around
/// every one of its guarded methods
///
/// ```
/// use dbc::{ConfigHandle, ContractConfig, Invariant, Method};
///
/// struct Account {
///     balance: i64,
/// }
///
/// let config = ConfigHandle::new(ContractConfig::default());
/// let non_negative = Invariant::new(
///     |a: &Account| a.balance >= 0,
///     "Account balance cannot be negative",
/// );
///
/// let mut withdraw = Method::with_config("withdraw", config, |a: &mut Account, amount: i64| {
///     a.balance -= amount;
/// })
/// .guarded_by(&non_negative);
///
/// // Constructing a violating instance is fine; the first guarded call is not.
/// let mut account = Account { balance: 100 };
/// withdraw.call(&mut account, 30).unwrap();
/// let err = withdraw.call(&mut account, 100).unwrap_err();
/// assert_eq!(
///     err.to_string(),
///     "[Invariant failed] on withdraw: (after) Account balance cannot be negative"
/// );
/// ```
pub struct Invariant<S> {
    predicate: Arc<dyn Fn(&S) -> bool>,
    message: String,
}

impl<S: 'static> Invariant<S> {
    /// Declare an invariant from a state predicate and a static message
    pub fn new<P>(predicate: P, message: impl Into<String>) -> Self
    where
        P: Fn(&S) -> bool + 'static,
    {
        Invariant {
            predicate: Arc::new(predicate),
            message: message.into(),
        }
    }

    /// The static message reported on violation, without the
    /// `(before)`/`(after)` tag
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Evaluate the predicate directly against a receiver
    pub fn holds(&self, receiver: &S) -> bool {
        (self.predicate)(receiver)
    }

    /// Wrap one method in the dual-phase check
    ///
    /// Call once per guarded operation of the type, after any `require`/
    /// `ensure` layers so the invariant sits outermost.
    pub fn wrap<A, R>(&self, method: Method<S, A, R>) -> Method<S, A, R>
    where
        A: 'static,
        R: 'static,
    {
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
            if enabled && !predicate(receiver) {
                handler.on_violation(Violation::new(
                    ViolationKind::Invariant,
                    name,
                    format!("(before) {}", message),
                ))?;
            }

            let result = inner(receiver, args)?;

            // Re-read: configuration mutated by the body or another thread
            // must be observed by the after-check.
            let (enabled, handler) = check.snapshot();
            if enabled && !predicate(receiver) {
                handler.on_violation(Violation::new(
                    ViolationKind::Invariant,
                    name,
                    format!("(after) {}", message),
                ))?;
            }

            Ok(result)
        });

        Method { name, config, call }
    }
}

impl<S> Clone for Invariant<S> {
    fn clone(&self) -> Self {
        Invariant {
            predicate: Arc::clone(&self.predicate),
            message: self.message.clone(),
        }
    }
}

impl<S> fmt::Debug for Invariant<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invariant")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigHandle, ContractConfig};
    use crate::handler::Recording;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Account {
        balance: i64,
    }

    struct AccountOps {
        deposit: Method<Account, i64, ()>,
        withdraw: Method<Account, i64, ()>,
        buggy_withdraw: Method<Account, i64, ()>,
    }

    // The explicit operation set of the "class": every method is assembled
    // here and wrapped by the one shared invariant.
    fn account_ops(config: &ConfigHandle) -> AccountOps {
        let non_negative = Invariant::new(
            |a: &Account| a.balance >= 0,
            "Account balance cannot be negative",
        );

        AccountOps {
            deposit: Method::with_config("deposit", config.clone(), |a: &mut Account, amount: i64| {
                a.balance += amount;
            })
            .require(|_a: &Account, amount: &i64| *amount > 0, "Deposit amount must be positive")
            .guarded_by(&non_negative),
            withdraw: Method::with_config(
                "withdraw",
                config.clone(),
                |a: &mut Account, amount: i64| {
                    if a.balance >= amount {
                        a.balance -= amount;
                    }
                },
            )
            .require(|_a: &Account, amount: &i64| *amount > 0, "Withdrawal amount must be positive")
            .guarded_by(&non_negative),
            // Intentionally skips the balance check, so it can drive the
            // balance negative.
            buggy_withdraw: Method::with_config(
                "buggyWithdraw",
                config.clone(),
                |a: &mut Account, amount: i64| {
                    a.balance -= amount;
                },
            )
            .guarded_by(&non_negative),
        }
    }

    #[test]
    fn test_maintained_invariant_is_silent() {
        let config = ConfigHandle::new(ContractConfig::default());
        let mut ops = account_ops(&config);
        let mut account = Account { balance: 100 };

        ops.deposit.call(&mut account, 50).unwrap();
        assert_eq!(account.balance, 150);
        ops.withdraw.call(&mut account, 100).unwrap();
        assert_eq!(account.balance, 50);
    }

    #[test]
    fn test_after_violation_reports_with_after_tag() {
        let config = ConfigHandle::new(ContractConfig::default());
        let mut ops = account_ops(&config);
        let mut account = Account { balance: 100 };

        let err = ops.buggy_withdraw.call(&mut account, 150).unwrap_err();
        assert_eq!(
            err.to_string(),
            "[Invariant failed] on buggyWithdraw: (after) Account balance cannot be negative"
        );
    }

    #[test]
    fn test_before_violation_skips_body() {
        let config = ConfigHandle::new(ContractConfig::default());
        let mut ops = account_ops(&config);

        // Manually corrupt the state; the next call must fail before the
        // body runs.
        let mut account = Account { balance: -50 };
        let err = ops.deposit.call(&mut account, 10).unwrap_err();
        assert_eq!(
            err.to_string(),
            "[Invariant failed] on deposit: (before) Account balance cannot be negative"
        );
        assert_eq!(account.balance, -50);
    }

    #[test]
    fn test_construction_is_never_guarded() {
        let config = ConfigHandle::new(ContractConfig::default());
        let recorder = std::sync::Arc::new(Recording::new());
        config.set_handler(std::sync::Arc::clone(&recorder));
        let _ops = account_ops(&config);

        // Building the violating instance and its operations fires nothing.
        let account = Account { balance: -50 };
        assert!(recorder.is_empty());
        drop(account);
    }

    #[test]
    fn test_exactly_one_violation_per_failed_phase() {
        let config = ConfigHandle::new(ContractConfig::default());
        let recorder = std::sync::Arc::new(Recording::new());
        config.set_handler(std::sync::Arc::clone(&recorder));
        let mut ops = account_ops(&config);

        let mut account = Account { balance: 100 };
        ops.buggy_withdraw.call(&mut account, 150).unwrap();
        let calls = recorder.take();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].kind, ViolationKind::Invariant);
        assert_eq!(calls[0].subject, "buggyWithdraw");
        assert_eq!(calls[0].message, "(after) Account balance cannot be negative");

        // Balance is now negative: the next call reports a before-violation,
        // and with a continuing handler the body still runs. Depositing
        // enough restores the invariant, so the after-phase stays silent.
        ops.deposit.call(&mut account, 100).unwrap();
        assert_eq!(account.balance, 50);
        let calls = recorder.take();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].message, "(before) Account balance cannot be negative");
    }

    #[test]
    fn test_disabled_skips_both_phases() {
        let config = ConfigHandle::new(ContractConfig::disabled());
        let evaluations = Rc::new(Cell::new(0u32));
        let seen = Rc::clone(&evaluations);

        let guard = Invariant::new(
            move |_a: &Account| {
                seen.set(seen.get() + 1);
                false
            },
            "never holds",
        );
        let mut touch =
            Method::with_config("touch", config, |_a: &mut Account, _: ()| {}).guarded_by(&guard);

        touch.call(&mut Account { balance: 0 }, ()).unwrap();
        assert_eq!(evaluations.get(), 0);
    }

    #[test]
    fn test_inner_error_skips_after_check() {
        let config = ConfigHandle::new(ContractConfig::default());
        let evaluations = Rc::new(Cell::new(0u32));
        let seen = Rc::clone(&evaluations);

        let guard = Invariant::new(
            move |_a: &Account| {
                seen.set(seen.get() + 1);
                true
            },
            "always holds",
        );
        let mut method = Method::with_config("m", config, |_a: &mut Account, _: ()| {})
            .require(|_a: &Account, _: &()| false, "never holds")
            .guarded_by(&guard);

        let err = method.call(&mut Account { balance: 0 }, ()).unwrap_err();
        assert_eq!(err.violation().kind, ViolationKind::Precondition);
        // Only the before-phase ran.
        assert_eq!(evaluations.get(), 1);
    }

    #[test]
    fn test_holds_probe() {
        let guard: Invariant<Account> =
            invariant(|a: &Account| a.balance >= 0, "Account balance cannot be negative");
        assert!(guard.holds(&Account { balance: 0 }));
        assert!(!guard.holds(&Account { balance: -1 }));
        assert_eq!(guard.message(), "Account balance cannot be negative");
    }

    #[test]
    fn test_clone_shares_predicate() {
        let guard = Invariant::new(|a: &Account| a.balance >= 0, "msg");
        let copy = guard.clone();
        assert!(copy.holds(&Account { balance: 1 }));
        assert!(format!("{:?}", copy).contains("msg"));
    }
}
