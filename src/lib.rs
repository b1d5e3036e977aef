//! # ModelHaus
//!
//! Table-agnostic entity models for PostgreSQL: CRUD over any table, declarative
//! field validation and flexible row selectors.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use modelhaus::prelude::*;
//!
//! struct User;
//!
//! impl EntityDefinition for User {
//!     fn table_name() -> &'static str {
//!         "users"
//!     }
//!
//!     fn fields() -> Vec<FieldSpec> {
//!         vec![
//!             FieldSpec::new("username", "Username", "trim|required|min_length[3]"),
//!             FieldSpec::new("email", "Email", "required|valid_email"),
//!         ]
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::new(
//!         "localhost".to_string(), 5432, "modelhaus".to_string(),
//!         "postgres".to_string(), "password".to_string(),
//!         1, 5, 30, 600, 3600,
//!     );
//!
//!     let modelhaus = ModelHaus::new(config).await?;
//!     let mut users = modelhaus.model::<User>()?;
//!
//!     let input = RequestInput::from_pairs([
//!         ("username", "john"),
//!         ("email", "john@example.com"),
//!     ]);
//!
//!     if users.validate(&input)? {
//!         let id = users.create(Some(&input), None).await?;
//!         let rows = users.read(Some(&Selector::from_json(id)?), 0).await?;
//!         println!("Created user: {:?}", rows);
//!     } else {
//!         for error in users.validation_errors() {
//!             println!("{}", error.message);
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod errors;
pub mod prelude;

// Re-export the main public types for convenience
pub use crate::core::ModelHaus;
pub use errors::ModelHausError;

// Re-export centralized config
pub use config::{AppConfig, DatabaseConfig};

// Re-export internal crates used by the public API
pub use entity_model;

// Re-export external dependencies used in public API
pub use sqlx;
pub use async_trait;
