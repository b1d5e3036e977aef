//! Entity Model - generic table model for ModelHaus
//!
//! This crate provides the schema declarations, selector resolution, query
//! building, field validation and executors behind [`EntityModel`].

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod errors;
pub mod executor;
pub mod generic_model;
pub mod input;
pub mod prelude;
pub mod query_builder;
pub mod rules;
pub mod schema;
pub mod selector;
pub mod validation;

pub use errors::ModelError;
pub use executor::{MemoryExecutor, PgExecutor, QueryExecutor};
pub use generic_model::EntityModel;
pub use input::{is_empty_value, InputOverride, InputSource, RequestInput};
pub use query_builder::{QueryBuilder, SqlGenerator, Statement, WhereClause};
pub use rules::{FieldError, FormValidator, RuleEngine};
pub use schema::{EntityDefinition, FieldSpec, PrimaryKey, TableSchema};
pub use selector::{Selector, WhereClauseResolver};
pub use validation::{ValidatedFieldName, ValidatedTableName, ValidationError};

use sqlx::PgPool;

/// One row, or one set of column values, keyed by column name in insertion order
pub type Record = serde_json::Map<String, serde_json::Value>;

pub type DbPool = PgPool;
