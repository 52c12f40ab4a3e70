//! Runtime design-by-contract enforcement
//!
//! Declarative preconditions, postconditions, and class invariants attached
//! to methods, checked at runtime, with a process-wide (or injected)
//! enable/disable switch and a pluggable violation-reporting strategy:
//!
//! - [`require`]: a condition on a method's inputs, checked before the body
//! - [`ensure`]: a condition relating the result to the inputs, checked
//!   after the body
//! - [`invariant`]: a condition on the receiver's state, checked before and
//!   after every guarded method (never during construction)
//!
//! A guarded method is an explicit [`Method`] value wrapping the original
//! body; contracts compose by nesting wrappers, and every layer consults a
//! [`ConfigHandle`] freshly on every call. Violations flow through a single
//! configurable [`ViolationHandler`]; the default fails the call with an
//! error rendered as `[<Kind> failed] on <subject>: <message>`.
//!
//! # Example
//!
//! ```
//! use dbc::{ConfigHandle, ContractConfig, Invariant, Method};
//!
//! struct Account {
//!     balance: i64,
//! }
//!
//! let config = ConfigHandle::new(ContractConfig::default());
//! let non_negative = Invariant::new(
//!     |a: &Account| a.balance >= 0,
//!     "balance must stay non-negative",
//! );
//!
//! let mut deposit = Method::with_config("deposit", config.clone(), |a: &mut Account, amount: i64| {
//!     a.balance += amount;
//! })
//! .require(|_a: &Account, amount: &i64| *amount > 0, "deposit amount must be positive")
//! .guarded_by(&non_negative);
//!
//! let mut account = Account { balance: 100 };
//! deposit.call(&mut account, 50).unwrap();
//! assert_eq!(account.balance, 150);
//!
//! let err = deposit.call(&mut account, -1).unwrap_err();
//! assert_eq!(
//!     err.to_string(),
//!     "[Precondition failed] on deposit: deposit amount must be positive"
//! );
//! ```
//!
//! Contracts are a correctness and observability tool, not a hot-path
//! feature: predicates are assumed cheap, synchronous, and side-effect
//! free. Disabling a configuration makes every wrapper an inert
//! pass-through.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod ensure;
pub mod error;
pub mod handler;
pub mod invariant;
pub mod method;
pub mod require;

pub use config::{ConfigHandle, ContractConfig, DEPLOYMENT_ENV_VAR};
pub use ensure::{ensure, Postcondition};
pub use error::{Error, Result, Violation, ViolationKind};
pub use handler::{FailFast, HandlerFn, LogAndContinue, Recording, ViolationHandler};
pub use invariant::{invariant, Invariant};
pub use method::Method;
pub use require::{require, Precondition};

/// The process-wide configuration handle
///
/// Shorthand for [`ConfigHandle::global`]. Prefer injecting an isolated
/// handle via [`Method::with_config`] in tests.
pub fn config() -> ConfigHandle {
    ConfigHandle::global()
}
