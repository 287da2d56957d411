//! Form environment.

use crate::binder::Validators;
use crate::config::FormConfig;
use crate::guard::LeaveGuard;
use schemaform_core::environment::Clock;
use std::sync::Arc;

/// Capabilities a form reducer uses.
///
/// # Type Parameters
///
/// - `O`: Remote operation called on submit
/// - `H`: Submission hooks
pub struct FormEnvironment<O, H> {
    /// Operation called on submit
    pub operation: Arc<O>,
    /// Submission hooks
    pub hooks: Arc<H>,
    /// Clock for date defaults
    pub clock: Arc<dyn Clock>,
    /// Receives navigation-blocking decisions
    pub leave_guard: Arc<dyn LeaveGuard>,
    /// Client-side validators
    pub validators: Validators,
    /// Labels and prompt settings
    pub config: FormConfig,
}

impl<O, H> FormEnvironment<O, H> {
    /// Create an environment.
    pub fn new(
        operation: Arc<O>,
        hooks: Arc<H>,
        clock: Arc<dyn Clock>,
        leave_guard: Arc<dyn LeaveGuard>,
    ) -> Self {
        Self {
            operation,
            hooks,
            clock,
            leave_guard,
            validators: Validators::default(),
            config: FormConfig::default(),
        }
    }

    /// Set the validators.
    #[must_use]
    pub fn with_validators(mut self, validators: Validators) -> Self {
        self.validators = validators;
        self
    }

    /// Set the configuration.
    #[must_use]
    pub fn with_config(mut self, config: FormConfig) -> Self {
        self.config = config;
        self
    }
}

// Manual impl: derive would require `O: Clone` and `H: Clone`
impl<O, H> Clone for FormEnvironment<O, H> {
    fn clone(&self) -> Self {
        Self {
            operation: Arc::clone(&self.operation),
            hooks: Arc::clone(&self.hooks),
            clock: Arc::clone(&self.clock),
            leave_guard: Arc::clone(&self.leave_guard),
            validators: self.validators.clone(),
            config: self.config.clone(),
        }
    }
}
