use crate::validation::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("Malformed selector for table {table}: {message}")]
    MalformedSelector { table: String, message: String },

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(#[from] ValidationError),

    #[error("Invalid rule '{rule}' for field {field}: {message}")]
    InvalidRule {
        field: String,
        rule: String,
        message: String,
    },

    #[error("Database error on {table} during {operation}: {source}")]
    Database {
        table: String,
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ModelError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    pub fn malformed_selector(table: &str, message: impl Into<String>) -> Self {
        Self::MalformedSelector {
            table: table.to_string(),
            message: message.into(),
        }
    }

    pub fn invalid_rule(field: &str, rule: &str, message: impl Into<String>) -> Self {
        Self::InvalidRule {
            field: field.to_string(),
            rule: rule.to_string(),
            message: message.into(),
        }
    }

    pub fn database(table: &str, operation: &'static str, source: sqlx::Error) -> Self {
        Self::Database {
            table: table.to_string(),
            operation,
            source,
        }
    }

    /// True for errors caused by how the model or selector was put together,
    /// as opposed to failures reported by the database.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, Self::Database { .. } | Self::Serialization(_))
    }
}
