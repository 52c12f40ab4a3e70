//! Contract configuration
//!
//! A [`ConfigHandle`] is the single source of truth for whether contracts
//! execute and how violations are reported. Every guarded method holds a
//! handle and reads it fresh on every invocation, so flipping `enabled` or
//! swapping the handler takes effect on the very next call through any
//! already-built method.
//!
//! Two usage patterns:
//! - [`ConfigHandle::global()`] — one process-wide configuration, the analog
//!   of an ambient on/off switch. Its initial state comes from
//!   [`ContractConfig::from_env`].
//! - [`ConfigHandle::new`] — an isolated configuration injected into methods
//!   at declaration time. Tests build one of these per case instead of
//!   mutating and restoring the global.
//!
//! The handle itself never fails; it is pure state. It provides no mutual
//! exclusion beyond the lock guarding its fields: mutating configuration
//! concurrently with an in-flight check is the caller's scheduling
//! responsibility (the intended pattern is test setup/teardown).

use crate::error::Violation;
use crate::handler::{FailFast, ViolationHandler};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Environment variable consulted by [`ContractConfig::from_env`]
///
/// When set to `production`, contracts default to disabled.
pub const DEPLOYMENT_ENV_VAR: &str = "DBC_ENV";

/// Whether the process looks like a production deployment
fn production_deployment() -> bool {
    std::env::var(DEPLOYMENT_ENV_VAR)
        .map(|value| value == "production")
        .unwrap_or(false)
}

/// A snapshot of contract configuration state
///
/// `enabled` gates all contract evaluation; `handler` is the sole
/// side-effecting reaction to a failed check.
#[derive(Clone)]
pub struct ContractConfig {
    /// Gate for all contract evaluation
    pub enabled: bool,
    /// Callback invoked with every [`Violation`]
    pub handler: Arc<dyn ViolationHandler>,
}

impl ContractConfig {
    /// Create a configuration from explicit parts
    pub fn new(enabled: bool, handler: Arc<dyn ViolationHandler>) -> Self {
        ContractConfig { enabled, handler }
    }

    /// Enabled unless the deployment environment signals production
    ///
    /// Contracts are a development and test aid first; a production process
    /// that has not opted in should not pay for them. Anything other than
    /// `DBC_ENV=production` (including the variable being unset) enables
    /// checking.
    pub fn from_env() -> Self {
        ContractConfig::new(!production_deployment(), Arc::new(FailFast))
    }

    /// Disabled configuration; all wrappers become inert pass-throughs
    pub fn disabled() -> Self {
        ContractConfig::new(false, Arc::new(FailFast))
    }
}

impl Default for ContractConfig {
    /// Enabled, failing fatally on violation
    fn default() -> Self {
        ContractConfig::new(true, Arc::new(FailFast))
    }
}

impl fmt::Debug for ContractConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractConfig")
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

static GLOBAL: Lazy<ConfigHandle> = Lazy::new(|| ConfigHandle::new(ContractConfig::from_env()));

/// Shared, mutable handle to a [`ContractConfig`]
///
/// Cloning is cheap and every clone refers to the same underlying state.
#[derive(Clone)]
pub struct ConfigHandle {
    inner: Arc<RwLock<ContractConfig>>,
}

impl ConfigHandle {
    /// Create an isolated handle over the given configuration
    pub fn new(config: ContractConfig) -> Self {
        ConfigHandle {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// The process-wide handle
    ///
    /// Initialized on first use from [`ContractConfig::from_env`]; the
    /// environment is read once, after which the handle is plain mutable
    /// state for the lifetime of the process.
    pub fn global() -> Self {
        GLOBAL.clone()
    }

    /// Current value of the enabled gate
    pub fn is_enabled(&self) -> bool {
        self.inner.read().enabled
    }

    /// Set the enabled gate; observed by the next call through any method
    /// holding this handle
    pub fn set_enabled(&self, enabled: bool) {
        self.inner.write().enabled = enabled;
    }

    /// Current violation handler
    pub fn handler(&self) -> Arc<dyn ViolationHandler> {
        Arc::clone(&self.inner.read().handler)
    }

    /// Swap the violation handler
    pub fn set_handler(&self, handler: impl ViolationHandler + 'static) {
        self.inner.write().handler = Arc::new(handler);
    }

    /// Replace the whole configuration, returning the previous one
    ///
    /// Lets tests swap in a scratch configuration and restore the original
    /// afterwards.
    pub fn replace(&self, config: ContractConfig) -> ContractConfig {
        std::mem::replace(&mut *self.inner.write(), config)
    }

    /// One consistent read of `(enabled, handler)` for a single check
    pub(crate) fn snapshot(&self) -> (bool, Arc<dyn ViolationHandler>) {
        let guard = self.inner.read();
        (guard.enabled, Arc::clone(&guard.handler))
    }

    /// Run the configured handler against a violation
    ///
    /// Exposed for handler implementations that decorate another handler.
    pub fn report(&self, violation: Violation) -> crate::error::Result<()> {
        self.handler().on_violation(violation)
    }
}

impl fmt::Debug for ConfigHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConfigHandle").field(&*self.inner.read()).finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
