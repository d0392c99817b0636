//! Validation report handed to `validate_input` hooks
//!
//! Hooks report business-rule failures through
//! [`ValidationReport::add_validation_error`]. Reporting never stops the hook;
//! the hook decides when to return. Any reported message rejects the
//! mutation before it reaches storage.

use crate::core::error::ValidationError;

/// Collects the messages reported while validating one mutation
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ValidationReport {
    messages: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a human-readable rejection message
    pub fn add_validation_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(%message, "validation error reported");
        self.messages.push(message);
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// `Ok` when nothing was reported, otherwise a `Rejected` error carrying
    /// every message in report order
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.messages.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Rejected {
                messages: self.messages,
            })
        }
    }
}
