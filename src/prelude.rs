//! Convenience re-exports for common ModelHaus usage
//!
//! This prelude module re-exports the most commonly used items from the ModelHaus ecosystem,
//! making it easier to import everything you need with a single use statement.
//!
//! # Example
//!
//! ```rust
//! use modelhaus::prelude::*;
//!
//! let selector = Selector::map([("status", "active")]);
//! assert!(!selector.is_empty());
//! ```

// Core ModelHaus components
pub use crate::core::ModelHaus;
pub use crate::errors::ModelHausError;

// Re-export centralized config
pub use config::{AppConfig, DatabaseConfig};

// Re-export commonly used entity-model types for convenience
pub use entity_model::prelude::*;

// Common external dependencies
pub use async_trait;
pub use sqlx;
pub use tokio;
