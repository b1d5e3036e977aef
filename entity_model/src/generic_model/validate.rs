//! Field validation
//!
//! Validation reads from whatever input it is handed. To check data other than
//! the current request, pass that data instead; there is no shared input to
//! swap out and restore.

use super::core::EntityModel;
use crate::errors::ModelError;
use crate::executor::QueryExecutor;
use crate::input::InputSource;
use crate::rules::{FieldError, RuleEngine};

impl<X: QueryExecutor, R: RuleEngine> EntityModel<X, R> {
    /// Check every declared field against its rules.
    ///
    /// Fields missing from `input` are still checked, so `required` fields
    /// must be present.
    pub fn validate(&mut self, input: &dyn InputSource) -> Result<bool, ModelError> {
        let registered = self
            .schema
            .fields()
            .iter()
            .try_for_each(|field| self.rules.set_rule(&field.name, &field.label, &field.rules));

        self.finish_validation(input, registered)
    }

    /// Check only the declared fields present in `input`.
    ///
    /// Useful for partial updates and single field checks: a field that was
    /// not submitted is skipped entirely.
    pub fn validate_data(&mut self, input: &dyn InputSource) -> Result<bool, ModelError> {
        let registered = self
            .schema
            .fields()
            .iter()
            .filter(|field| input.has(&field.name))
            .try_for_each(|field| self.rules.set_rule(&field.name, &field.label, &field.rules));

        self.finish_validation(input, registered)
    }

    /// Outcome of the most recent validation; false until one has run
    pub fn last_validation_result(&self) -> bool {
        self.validated
    }

    /// Errors reported by the most recent validation
    pub fn validation_errors(&self) -> &[FieldError] {
        self.rules.errors()
    }

    fn finish_validation(
        &mut self,
        input: &dyn InputSource,
        registered: Result<(), ModelError>,
    ) -> Result<bool, ModelError> {
        if let Err(e) = registered {
            // Drop whatever was registered before the bad expression
            self.rules.clear_rules();
            self.validated = false;
            return Err(e);
        }

        self.validated = self.rules.run(input);

        if !self.validated {
            tracing::debug!(
                table = self.schema.table_name(),
                errors = self.rules.errors().len(),
                "validation failed"
            );
        }

        Ok(self.validated)
    }
}
