//! In-memory executor
//!
//! Keeps rows in process and evaluates staged clauses the way PostgreSQL would
//! (AND binds tighter than OR). Every call also records the statement the
//! PostgreSQL executor would have sent, which makes it the backend of choice
//! for tests.

use super::QueryExecutor;
use crate::errors::ModelError;
use crate::query_builder::{LogicalOperator, Predicate, QueryBuilder, SqlGenerator, Statement, WhereClause};
use crate::Record;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MemoryTable {
    rows: Vec<Record>,
    auto_increment: Option<String>,
}

#[derive(Debug, Default)]
struct MemoryState {
    tables: HashMap<String, MemoryTable>,
    statements: Vec<Statement>,
}

#[derive(Debug, Default)]
pub struct MemoryExecutor {
    state: Mutex<MemoryState>,
}

impl MemoryExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill `column` of `table` with the next integer when an insert leaves it unset
    pub fn with_auto_increment(self, table: &str, column: &str) -> Self {
        self.lock().tables.entry(table.to_string()).or_default().auto_increment =
            Some(column.to_string());
        self
    }

    /// Append rows to `table` without recording a statement
    pub fn seed(&self, table: &str, rows: impl IntoIterator<Item = Record>) {
        self.lock()
            .tables
            .entry(table.to_string())
            .or_default()
            .rows
            .extend(rows);
    }

    pub fn rows(&self, table: &str) -> Vec<Record> {
        self.lock()
            .tables
            .get(table)
            .map(|t| t.rows.clone())
            .unwrap_or_default()
    }

    /// Statements executed so far, oldest first
    pub fn statements(&self) -> Vec<Statement> {
        self.lock().statements.clone()
    }

    pub fn last_statement(&self) -> Option<Statement> {
        self.lock().statements.last().cloned()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A panic while holding the lock leaves the rows usable
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn loose_eq(stored: &Value, wanted: &Value) -> bool {
    if stored == wanted {
        return true;
    }
    match (stored, wanted) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            s.parse::<f64>().ok() == n.as_f64()
        }
        _ => false,
    }
}

fn clause_matches(row: &Record, clause: &WhereClause) -> bool {
    let stored = row.get(&clause.column).unwrap_or(&Value::Null);
    match &clause.predicate {
        Predicate::IsNull | Predicate::Eq(Value::Null) => stored.is_null(),
        Predicate::Eq(wanted) => loose_eq(stored, wanted),
    }
}

fn row_matches(row: &Record, conditions: &[WhereClause]) -> bool {
    if conditions.is_empty() {
        return true;
    }

    // Split into OR-separated runs of AND-ed clauses
    let mut groups: Vec<Vec<&WhereClause>> = Vec::new();
    for (i, clause) in conditions.iter().enumerate() {
        if i == 0 || clause.join == LogicalOperator::Or {
            groups.push(Vec::new());
        }
        if let Some(group) = groups.last_mut() {
            group.push(clause);
        }
    }

    groups
        .iter()
        .any(|group| group.iter().all(|clause| clause_matches(row, clause)))
}

fn matching_indexes(rows: &[Record], query: &QueryBuilder) -> Vec<usize> {
    let matches = rows
        .iter()
        .enumerate()
        .filter(|(_, row)| row_matches(row, &query.conditions))
        .map(|(i, _)| i);

    match query.limit {
        Some(limit) => matches.take(limit as usize).collect(),
        None => matches.collect(),
    }
}

#[async_trait]
impl QueryExecutor for MemoryExecutor {
    async fn insert(&self, table: &str, query: QueryBuilder) -> Result<Record, ModelError> {
        let mut state = self.lock();
        state.statements.push(SqlGenerator::build_insert(table, &query));

        let table = state.tables.entry(table.to_string()).or_default();
        let mut row = query.assignments;

        if let Some(column) = &table.auto_increment {
            if row.get(column).map_or(true, Value::is_null) {
                let next = table
                    .rows
                    .iter()
                    .filter_map(|r| r.get(column).and_then(Value::as_i64))
                    .max()
                    .unwrap_or(0)
                    + 1;
                row.insert(column.clone(), Value::from(next));
            }
        }

        table.rows.push(row.clone());
        Ok(row)
    }

    async fn select(&self, table: &str, query: QueryBuilder) -> Result<Vec<Record>, ModelError> {
        let mut state = self.lock();
        state.statements.push(SqlGenerator::build_select(table, &query));

        let rows = match state.tables.get(table) {
            Some(t) => matching_indexes(&t.rows, &query)
                .into_iter()
                .map(|i| t.rows[i].clone())
                .collect(),
            None => Vec::new(),
        };
        Ok(rows)
    }

    async fn update(&self, table: &str, query: QueryBuilder) -> Result<u64, ModelError> {
        let mut state = self.lock();
        let statement = SqlGenerator::build_update(table, &query)?;
        state.statements.push(statement);

        let Some(t) = state.tables.get_mut(table) else {
            return Ok(0);
        };

        let targets = matching_indexes(&t.rows, &query);
        for &i in &targets {
            for (column, value) in &query.assignments {
                t.rows[i].insert(column.clone(), value.clone());
            }
        }
        Ok(targets.len() as u64)
    }

    async fn delete(&self, table: &str, query: QueryBuilder) -> Result<u64, ModelError> {
        let mut state = self.lock();
        state.statements.push(SqlGenerator::build_delete(table, &query));

        let Some(t) = state.tables.get_mut(table) else {
            return Ok(0);
        };

        let targets = matching_indexes(&t.rows, &query);
        let mut index = 0;
        t.rows.retain(|_| {
            let keep = !targets.contains(&index);
            index += 1;
            keep
        });
        Ok(targets.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    fn executor() -> MemoryExecutor {
        let executor = MemoryExecutor::new();
        executor.seed(
            "users",
            [
                record(json!({"id": 1, "status": "active", "role": "admin"})),
                record(json!({"id": 2, "status": "active", "role": "member"})),
                record(json!({"id": 3, "status": null, "role": "member"})),
            ],
        );
        executor
    }

    #[tokio::test]
    async fn test_and_binds_tighter_than_or() {
        let executor = executor();
        // id = 3 OR status = 'active' AND role = 'admin'
        let query = QueryBuilder::new()
            .where_eq("id", json!(3))
            .or_where_eq("status", json!("active"))
            .where_eq("role", json!("admin"));

        let rows = executor.select("users", query).await.unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r["id"].clone()).collect();
        assert_eq!(ids, vec![json!(1), json!(3)]);
    }

    #[tokio::test]
    async fn test_numeric_strings_match_numbers() {
        let executor = executor();
        let rows = executor
            .select("users", QueryBuilder::new().where_eq("id", json!("2")))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_null_tests() {
        let executor = executor();
        let rows = executor
            .select("users", QueryBuilder::new().where_null("status"))
            .await
            .unwrap();
        assert_eq!(rows[0]["id"], json!(3));
    }

    #[tokio::test]
    async fn test_auto_increment_and_statement_log() {
        let executor = executor().with_auto_increment("users", "id");
        let row = executor
            .insert("users", QueryBuilder::new().set("status", json!("new")))
            .await
            .unwrap();

        assert_eq!(row["id"], json!(4));
        let statement = executor.last_statement().unwrap();
        assert!(statement.sql.starts_with("INSERT INTO \"users\" AS t (\"status\") "));
        assert_eq!(statement.params, vec![json!({"status": "new"})]);
    }

    #[tokio::test]
    async fn test_limited_delete_removes_first_match_only() {
        let executor = executor();
        let removed = executor
            .delete(
                "users",
                QueryBuilder::new().where_eq("role", json!("member")).limit(1),
            )
            .await
            .unwrap();

        assert_eq!(removed, 1);
        let remaining: Vec<_> = executor.rows("users").iter().map(|r| r["id"].clone()).collect();
        assert_eq!(remaining, vec![json!(1), json!(3)]);
    }

    #[tokio::test]
    async fn test_unknown_table_is_empty() {
        let executor = MemoryExecutor::new();
        assert!(executor.select("nothing", QueryBuilder::new()).await.unwrap().is_empty());
        assert_eq!(executor.delete("nothing", QueryBuilder::new()).await.unwrap(), 0);
    }
}
