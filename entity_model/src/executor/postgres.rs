//! PostgreSQL executor
//!
//! Rows travel as `to_jsonb` objects so one executor serves every table
//! without per-entity row types. Parameters go the other way as `jsonb`; the
//! generated SQL converts them to each column's own type.

use super::QueryExecutor;
use crate::errors::ModelError;
use crate::query_builder::{QueryBuilder, SqlGenerator, Statement};
use crate::{DbPool, Record};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;

/// [`QueryExecutor`] over a sqlx PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgExecutor {
    pool: DbPool,
}

impl PgExecutor {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    async fn fetch_records(
        &self,
        table: &str,
        operation: &'static str,
        statement: Statement,
    ) -> Result<Vec<Record>, ModelError> {
        tracing::debug!(table, operation, sql = %statement.sql, params = statement.params.len(), "executing statement");

        let mut query = sqlx::query_scalar::<_, Json<Value>>(&statement.sql);
        for param in statement.params {
            query = query.bind(Json(param));
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ModelError::database(table, operation, e))?;

        rows.into_iter().map(|Json(row)| into_record(row)).collect()
    }

    async fn execute(
        &self,
        table: &str,
        operation: &'static str,
        statement: Statement,
    ) -> Result<u64, ModelError> {
        tracing::debug!(table, operation, sql = %statement.sql, params = statement.params.len(), "executing statement");

        let mut query = sqlx::query(&statement.sql);
        for param in statement.params {
            query = query.bind(Json(param));
        }

        let result = query
            .execute(&self.pool)
            .await
            .map_err(|e| ModelError::database(table, operation, e))?;

        Ok(result.rows_affected())
    }
}

fn into_record(row: Value) -> Result<Record, ModelError> {
    match row {
        Value::Object(record) => Ok(record),
        other => Err(ModelError::Serialization(format!(
            "expected a JSON object row, got {}",
            other
        ))),
    }
}

#[async_trait]
impl QueryExecutor for PgExecutor {
    async fn insert(&self, table: &str, query: QueryBuilder) -> Result<Record, ModelError> {
        let statement = SqlGenerator::build_insert(table, &query);
        self.fetch_records(table, "insert", statement)
            .await?
            .pop()
            .ok_or_else(|| ModelError::Serialization(format!("insert into {} returned no row", table)))
    }

    async fn select(&self, table: &str, query: QueryBuilder) -> Result<Vec<Record>, ModelError> {
        let statement = SqlGenerator::build_select(table, &query);
        self.fetch_records(table, "select", statement).await
    }

    async fn update(&self, table: &str, query: QueryBuilder) -> Result<u64, ModelError> {
        let statement = SqlGenerator::build_update(table, &query)?;
        self.execute(table, "update", statement).await
    }

    async fn delete(&self, table: &str, query: QueryBuilder) -> Result<u64, ModelError> {
        let statement = SqlGenerator::build_delete(table, &query);
        self.execute(table, "delete", statement).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_into_record_accepts_objects_only() {
        assert_eq!(into_record(json!({"id": 1})).unwrap().get("id"), Some(&json!(1)));
        assert!(matches!(
            into_record(json!([1])),
            Err(ModelError::Serialization(_))
        ));
    }
}
