//! Convenience re-exports for common entity-model usage

// Model and declarations
pub use crate::generic_model::EntityModel;
pub use crate::schema::{EntityDefinition, FieldSpec, PrimaryKey, TableSchema};

// Selecting rows
pub use crate::selector::Selector;

// Input and validation
pub use crate::input::{InputSource, RequestInput};
pub use crate::rules::{FieldError, FormValidator, RuleEngine};

// Executors
pub use crate::executor::{MemoryExecutor, PgExecutor, QueryExecutor};

// Error types
pub use crate::errors::ModelError;
pub use crate::validation::ValidationError;

pub use crate::Record;

// Common external dependencies that are frequently used
pub use async_trait::async_trait;
pub use serde_json::{json, Value};
pub use sqlx::PgPool;
