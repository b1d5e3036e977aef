//! Error types for the ModelHaus crate
//!
//! This module contains all error types that can be returned by ModelHaus operations.

use config::ConfigError;
use entity_model::ModelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelHausError {
    #[error("Database connection error: {0}")]
    DatabaseConnection(#[from] sqlx::Error),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
