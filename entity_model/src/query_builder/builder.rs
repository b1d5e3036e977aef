//! Query builder utilities
//!
//! A [`QueryBuilder`] is the staged state of exactly one statement. It is built
//! by value and moved into the executor, so nothing staged for one call can
//! leak into the next.

use crate::query_builder::filter::WhereClause;
use crate::query_builder::sql_generation::SqlGenerator;
use crate::Record;
use serde_json::Value;

#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    pub(crate) conditions: Vec<WhereClause>,
    pub(crate) assignments: Record,
    pub(crate) limit: Option<u64>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an AND-joined equality test
    pub fn where_eq(self, column: &str, value: Value) -> Self {
        self.clause(WhereClause::eq(column, value))
    }

    /// Add an OR-joined equality test
    pub fn or_where_eq(self, column: &str, value: Value) -> Self {
        self.clause(WhereClause::eq(column, value).or())
    }

    /// Add an AND-joined `IS NULL` test
    pub fn where_null(self, column: &str) -> Self {
        self.clause(WhereClause::is_null(column))
    }

    pub fn clause(mut self, clause: WhereClause) -> Self {
        self.conditions.push(clause);
        self
    }

    pub fn clauses(mut self, clauses: impl IntoIterator<Item = WhereClause>) -> Self {
        self.conditions.extend(clauses);
        self
    }

    /// Stage a column assignment; a later value for the same column wins
    pub fn set(mut self, column: &str, value: Value) -> Self {
        self.assignments.insert(column.to_string(), value);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn conditions(&self) -> &[WhereClause] {
        &self.conditions
    }

    pub fn assignments(&self) -> &Record {
        &self.assignments
    }

    pub fn limit_value(&self) -> Option<u64> {
        self.limit
    }

    /// Build the WHERE clause against `table` with parameters numbered from `$1`
    pub fn build_where_clause(&self, table: &str) -> (String, Vec<Value>) {
        SqlGenerator::build_where_clause(table, &self.conditions, 1)
    }
}
