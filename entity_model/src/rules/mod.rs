//! Field validation rules
//!
//! [`RuleEngine`] is the seam the entity model validates through: rules are
//! registered per field, then a single run checks them against an input
//! source. [`FormValidator`] is the bundled implementation.

mod form_validator;

pub use form_validator::FormValidator;

use crate::errors::ModelError;
use crate::input::InputSource;
use serde::{Deserialize, Serialize};

/// A failed rule for one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub label: String,
    pub rule: String,
    pub message: String,
}

pub trait RuleEngine {
    /// Register `expression` for `field`, replacing anything registered for it
    /// earlier. A malformed expression is a configuration error.
    fn set_rule(&mut self, field: &str, label: &str, expression: &str) -> Result<(), ModelError>;

    /// Check every registered rule against `input`.
    ///
    /// The registered rules are consumed; errors from this run replace those of
    /// the previous one. Empty input fails with no errors, as does a run with
    /// nothing registered.
    fn run(&mut self, input: &dyn InputSource) -> bool;

    /// Forget registered rules without running them
    fn clear_rules(&mut self);

    fn errors(&self) -> &[FieldError];

    fn error(&self, field: &str) -> Option<&FieldError> {
        self.errors().iter().find(|error| error.field == field)
    }
}
