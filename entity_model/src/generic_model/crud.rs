//! Create, read, update and delete
//!
//! Each operation stages one [`QueryBuilder`] and hands it to the executor,
//! so nothing staged here outlives the call.

use super::core::EntityModel;
use crate::errors::ModelError;
use crate::executor::QueryExecutor;
use crate::input::{is_empty_value, InputSource};
use crate::query_builder::QueryBuilder;
use crate::rules::RuleEngine;
use crate::schema::PrimaryKey;
use crate::selector::Selector;
use crate::validation::ValidatedFieldName;
use crate::Record;
use serde_json::Value;

impl<X: QueryExecutor, R: RuleEngine> EntityModel<X, R> {
    /// Insert one row and return its generated identifier.
    ///
    /// With `input`, every declared field holding a non-empty value there is
    /// written. Non-empty entries of `data` are written on top, overriding
    /// input values for the same column. Empty values are never written, so the
    /// column falls back to its database default.
    ///
    /// The identifier is the key column's value, or an array of the key
    /// columns' values for a compound key.
    pub async fn create(
        &self,
        input: Option<&dyn InputSource>,
        data: Option<&Record>,
    ) -> Result<Value, ModelError> {
        let mut query = QueryBuilder::new();

        if let Some(input) = input {
            for field in self.schema.fields() {
                match input.get(&field.name) {
                    Some(value) if !is_empty_value(value) => {
                        query = query.set(&field.name, value.clone());
                    }
                    _ => {}
                }
            }
        }

        if let Some(data) = data {
            for (column, value) in data {
                ValidatedFieldName::new(column)?;
                if !is_empty_value(value) {
                    query = query.set(column, value.clone());
                }
            }
        }

        crate::debug_log!(
            "create on {} with {} assignment(s)",
            self.table_name(),
            query.assignments().len()
        );

        let row = self.executor.insert(self.table_name(), query).await?;
        Ok(self.inserted_id(&row))
    }

    /// Rows matching `selector` (every row when `None`), at most `limit` of
    /// them when `limit > 0`, in whatever order the database returns them.
    pub async fn read(&self, selector: Option<&Selector>, limit: u64) -> Result<Vec<Record>, ModelError> {
        let mut query = QueryBuilder::new();
        if let Some(selector) = selector {
            query = self.resolver().apply(query, selector)?;
        }
        if limit > 0 {
            query = query.limit(limit);
        }

        self.executor.select(self.table_name(), query).await
    }

    /// First row matching `selector`, if any
    pub async fn fetch_one(&self, selector: &Selector) -> Result<Option<Record>, ModelError> {
        let query = self.resolver().apply(QueryBuilder::new(), selector)?.limit(1);
        let mut rows = self.executor.select(self.table_name(), query).await?;

        if rows.is_empty() {
            Ok(None)
        } else {
            Ok(Some(rows.swap_remove(0)))
        }
    }

    /// Update every row matching `selector`.
    ///
    /// Unlike [`create`](Self::create), empty values are written: a declared
    /// field submitted in `input` is written whatever its value, and every
    /// entry of `data` is written as given.
    pub async fn update(
        &self,
        selector: &Selector,
        input: Option<&dyn InputSource>,
        data: Option<&Record>,
    ) -> Result<(), ModelError> {
        let mut query = self.resolver().apply(QueryBuilder::new(), selector)?;

        if let Some(input) = input {
            for field in self.schema.fields() {
                if input.has(&field.name) {
                    let value = input.get(&field.name).cloned().unwrap_or(Value::Null);
                    query = query.set(&field.name, value);
                }
            }
        }

        if let Some(data) = data {
            for (column, value) in data {
                ValidatedFieldName::new(column)?;
                query = query.set(column, value.clone());
            }
        }

        let affected = self.executor.update(self.table_name(), query).await?;
        tracing::debug!(table = self.table_name(), affected, "update applied");
        Ok(())
    }

    /// Delete every row matching `selector`; returns how many were removed
    pub async fn delete(&self, selector: &Selector) -> Result<u64, ModelError> {
        let query = self.resolver().apply(QueryBuilder::new(), selector)?;
        self.executor.delete(self.table_name(), query).await
    }

    /// Delete the first row matching `selector`
    pub async fn delete_one(&self, selector: &Selector) -> Result<(), ModelError> {
        let query = self.resolver().apply(QueryBuilder::new(), selector)?.limit(1);
        self.executor.delete(self.table_name(), query).await?;
        Ok(())
    }

    fn inserted_id(&self, row: &Record) -> Value {
        let key_value = |column: &str| row.get(column).cloned().unwrap_or(Value::Null);

        match self.schema.primary_key() {
            PrimaryKey::Single(column) => key_value(column.as_str()),
            PrimaryKey::Compound(columns) => {
                Value::Array(columns.iter().map(|column| key_value(column.as_str())).collect())
            }
        }
    }
}
