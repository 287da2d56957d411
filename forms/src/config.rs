//! Form and query controller configuration.
//!
//! Values are supplied by the application; defaults match the conventions
//! of a Django REST Framework backend.

use crate::form::FormState;
use std::fmt;
use std::sync::Arc;

/// Message of the default leave prompt.
pub const DEFAULT_PROMPT_MESSAGE: &str =
    "You have unsubmitted changes, are you sure you want to leave?";

/// Decides whether leaving a form needs confirmation.
#[derive(Clone, Default)]
pub enum PromptPolicy {
    /// Block while any value differs from the baseline and no submission
    /// is in flight.
    #[default]
    WhenDirty,
    /// Never block.
    Never,
    /// Caller-defined predicate over the form state.
    Custom(Arc<dyn Fn(&FormState) -> bool + Send + Sync>),
}

impl PromptPolicy {
    /// Policy from a predicate.
    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn(&FormState) -> bool + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(predicate))
    }

    /// Evaluate the policy.
    #[must_use]
    pub fn should_block(&self, state: &FormState) -> bool {
        match self {
            Self::WhenDirty => state.is_dirty() && !state.submitting,
            Self::Never => false,
            Self::Custom(predicate) => predicate(state),
        }
    }
}

impl fmt::Debug for PromptPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WhenDirty => f.write_str("WhenDirty"),
            Self::Never => f.write_str("Never"),
            Self::Custom(_) => f.write_str("Custom(<predicate>)"),
        }
    }
}

/// Form controller configuration.
#[derive(Debug, Clone)]
pub struct FormConfig {
    /// Submit button text.
    ///
    /// Default: "Submit"
    pub submit_label: String,

    /// Leave prompt text.
    ///
    /// Default: [`DEFAULT_PROMPT_MESSAGE`]
    pub prompt_message: String,

    /// When the leave prompt is active.
    ///
    /// Default: [`PromptPolicy::WhenDirty`]
    pub prompt_policy: PromptPolicy,
}

impl FormConfig {
    /// Set the submit button text.
    #[must_use]
    pub fn with_submit_label(mut self, label: impl Into<String>) -> Self {
        self.submit_label = label.into();
        self
    }

    /// Set the leave prompt text.
    #[must_use]
    pub fn with_prompt_message(mut self, message: impl Into<String>) -> Self {
        self.prompt_message = message.into();
        self
    }

    /// Set the leave prompt policy.
    #[must_use]
    pub fn with_prompt_policy(mut self, policy: PromptPolicy) -> Self {
        self.prompt_policy = policy;
        self
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            submit_label: "Submit".to_string(),
            prompt_message: DEFAULT_PROMPT_MESSAGE.to_string(),
            prompt_policy: PromptPolicy::WhenDirty,
        }
    }
}

/// Query form controller configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFormConfig {
    /// Page mutations are enabled and `change` on the page fields applies
    /// immediately.
    ///
    /// Default: false
    pub paginated: bool,

    /// Query key of the page number.
    ///
    /// Default: "page"
    pub page_field: String,

    /// Query key of the page size.
    ///
    /// Default: "page_size"
    pub page_size_field: String,

    /// Ordering mutations are enabled and `change` on the ordering field
    /// applies immediately.
    ///
    /// Default: false
    pub orderable: bool,

    /// Query key of the ordering.
    ///
    /// Default: "ordering"
    pub ordering_field: String,
}

impl QueryFormConfig {
    /// Enable pagination.
    #[must_use]
    pub const fn paginated(mut self) -> Self {
        self.paginated = true;
        self
    }

    /// Enable ordering.
    #[must_use]
    pub const fn orderable(mut self) -> Self {
        self.orderable = true;
        self
    }

    /// Set the page number key.
    #[must_use]
    pub fn with_page_field(mut self, field: impl Into<String>) -> Self {
        self.page_field = field.into();
        self
    }

    /// Set the page size key.
    #[must_use]
    pub fn with_page_size_field(mut self, field: impl Into<String>) -> Self {
        self.page_size_field = field.into();
        self
    }

    /// Set the ordering key.
    #[must_use]
    pub fn with_ordering_field(mut self, field: impl Into<String>) -> Self {
        self.ordering_field = field.into();
        self
    }

    /// True for a key whose `change` applies immediately.
    #[must_use]
    pub fn applies_immediately(&self, field: &str) -> bool {
        (self.paginated && (field == self.page_field || field == self.page_size_field))
            || (self.orderable && field == self.ordering_field)
    }
}

impl Default for QueryFormConfig {
    fn default() -> Self {
        Self {
            paginated: false,
            page_field: "page".to_string(),
            page_size_field: "page_size".to_string(),
            orderable: false,
            ordering_field: "ordering".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_defaults() {
        let config = QueryFormConfig::default();
        assert_eq!(config.page_field, "page");
        assert_eq!(config.page_size_field, "page_size");
        assert_eq!(config.ordering_field, "ordering");
        assert!(!config.applies_immediately("page"));
    }

    #[test]
    fn applies_immediately_follows_flags() {
        let config = QueryFormConfig::default().paginated();
        assert!(config.applies_immediately("page"));
        assert!(config.applies_immediately("page_size"));
        assert!(!config.applies_immediately("ordering"));
        assert!(!config.applies_immediately("search"));

        let config = config.orderable().with_ordering_field("sort");
        assert!(config.applies_immediately("sort"));
        assert!(!config.applies_immediately("ordering"));
    }

    #[test]
    fn form_defaults() {
        let config = FormConfig::default();
        assert_eq!(config.prompt_message, DEFAULT_PROMPT_MESSAGE);
        assert_eq!(config.submit_label, "Submit");
        assert!(matches!(config.prompt_policy, PromptPolicy::WhenDirty));
    }
}
