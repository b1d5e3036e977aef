//! Statement execution
//!
//! [`QueryExecutor`] runs one staged [`QueryBuilder`] against one table. The
//! builder is taken by value: whatever was staged is consumed by the call.

pub mod memory;
pub mod postgres;

pub use memory::MemoryExecutor;
pub use postgres::PgExecutor;

use crate::errors::ModelError;
use crate::query_builder::QueryBuilder;
use crate::Record;
use async_trait::async_trait;

#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Insert the staged assignments and return the stored row
    async fn insert(&self, table: &str, query: QueryBuilder) -> Result<Record, ModelError>;

    /// Return the rows matching the staged clauses, in storage order
    async fn select(&self, table: &str, query: QueryBuilder) -> Result<Vec<Record>, ModelError>;

    /// Apply the staged assignments to matching rows; returns the affected row count
    async fn update(&self, table: &str, query: QueryBuilder) -> Result<u64, ModelError>;

    /// Remove matching rows; returns the affected row count
    async fn delete(&self, table: &str, query: QueryBuilder) -> Result<u64, ModelError>;
}
