//! SQL generation
//!
//! Renders a [`QueryBuilder`] into PostgreSQL text with `$n` placeholders. Table
//! and column names are expected to be validated identifiers already; they are
//! written double quoted so their case survives.
//!
//! Values travel as `jsonb` and are converted to the target column's type by
//! `jsonb_populate_record` against the table's row type. A form string such as
//! `"42"` therefore reaches an integer column as `42`, and a column's own type
//! decides how its values compare.

use crate::errors::ModelError;
use crate::query_builder::builder::QueryBuilder;
use crate::query_builder::filter::{Predicate, WhereClause};
use serde_json::Value;

/// Alias every statement uses for its target table
const ROW_ALIAS: &str = "t";

/// Rendered statement and its bind parameters, in placeholder order.
///
/// Every parameter is bound as `jsonb`.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

pub struct SqlGenerator;

/// Double quote a validated identifier
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name)
}

impl SqlGenerator {
    /// Build a WHERE clause for `table` whose first placeholder is `$first_param`.
    ///
    /// Clauses chain left to right, each prefixed by its own join keyword; the
    /// join of the first clause is ignored.
    pub fn build_where_clause(
        table: &str,
        conditions: &[WhereClause],
        first_param: usize,
    ) -> (String, Vec<Value>) {
        if conditions.is_empty() {
            return (String::new(), Vec::new());
        }

        let mut values = Vec::new();
        let mut param_counter = first_param;
        let mut sql = String::from("WHERE ");

        for (i, clause) in conditions.iter().enumerate() {
            if i > 0 {
                sql.push(' ');
                sql.push_str(clause.join.to_sql());
                sql.push(' ');
            }
            sql.push_str(&Self::build_condition_sql(table, clause, &mut values, &mut param_counter));
        }

        (sql, values)
    }

    fn build_condition_sql(
        table: &str,
        clause: &WhereClause,
        values: &mut Vec<Value>,
        param_counter: &mut usize,
    ) -> String {
        let column = quote_ident(&clause.column);
        match &clause.predicate {
            Predicate::Eq(Value::Null) | Predicate::IsNull => format!("{} IS NULL", column),
            Predicate::Eq(value) => {
                values.push(value.clone());
                let sql = format!(
                    "{} = (jsonb_populate_record(NULL::{}, jsonb_build_object('{}', ${}::jsonb))).{}",
                    column,
                    quote_ident(table),
                    clause.column,
                    param_counter,
                    column
                );
                *param_counter += 1;
                sql
            }
        }
    }

    fn build_limit_clause(limit: Option<u64>) -> String {
        limit.map(|n| format!("LIMIT {}", n)).unwrap_or_default()
    }

    /// `WHERE` for UPDATE/DELETE, which PostgreSQL cannot limit directly; a
    /// limit is applied through a `ctid` sub-select instead.
    fn build_target_clause(table: &str, query: &QueryBuilder, first_param: usize) -> (String, Vec<Value>) {
        let (where_clause, values) = Self::build_where_clause(table, &query.conditions, first_param);

        match query.limit {
            Some(limit) => {
                let inner = join_parts(&[
                    format!("SELECT ctid FROM {}", quote_ident(table)).as_str(),
                    where_clause.as_str(),
                    Self::build_limit_clause(Some(limit)).as_str(),
                ]);
                (format!("WHERE ctid IN ({})", inner), values)
            }
            None => (where_clause, values),
        }
    }

    /// Quoted assigned columns, and the typed row holding their values as `$n`
    fn build_assignment_source(table: &str, query: &QueryBuilder, param: usize) -> (String, String) {
        let columns = query
            .assignments
            .keys()
            .map(|column| quote_ident(column))
            .collect::<Vec<_>>()
            .join(", ");
        let source = format!(
            "SELECT {} FROM jsonb_populate_record(NULL::{}, ${}::jsonb)",
            columns,
            quote_ident(table),
            param
        );

        (columns, source)
    }

    /// `INSERT ... RETURNING` the inserted row as a JSON object
    pub fn build_insert(table: &str, query: &QueryBuilder) -> Statement {
        if query.assignments.is_empty() {
            return Statement {
                sql: format!(
                    "INSERT INTO {} AS {} DEFAULT VALUES RETURNING to_jsonb({}) AS record",
                    quote_ident(table),
                    ROW_ALIAS,
                    ROW_ALIAS
                ),
                params: Vec::new(),
            };
        }

        let (columns, source) = Self::build_assignment_source(table, query, 1);

        Statement {
            sql: format!(
                "INSERT INTO {} AS {} ({}) {} RETURNING to_jsonb({}) AS record",
                quote_ident(table),
                ROW_ALIAS,
                columns,
                source,
                ROW_ALIAS
            ),
            params: vec![Value::Object(query.assignments.clone())],
        }
    }

    /// `SELECT` every matching row as a JSON object
    pub fn build_select(table: &str, query: &QueryBuilder) -> Statement {
        let (where_clause, params) = Self::build_where_clause(table, &query.conditions, 1);
        let sql = join_parts(&[
            format!(
                "SELECT to_jsonb({}) AS record FROM {} AS {}",
                ROW_ALIAS,
                quote_ident(table),
                ROW_ALIAS
            )
            .as_str(),
            where_clause.as_str(),
            Self::build_limit_clause(query.limit).as_str(),
        ]);

        Statement { sql, params }
    }

    /// `UPDATE` with the assignment object as `$1`, then WHERE parameters
    pub fn build_update(table: &str, query: &QueryBuilder) -> Result<Statement, ModelError> {
        if query.assignments.is_empty() {
            return Err(ModelError::configuration(format!(
                "update of {} has no column assignments",
                table
            )));
        }

        let (columns, source) = Self::build_assignment_source(table, query, 1);
        // A parenthesised target list needs at least two columns
        let set_clause = if query.assignments.len() == 1 {
            format!("{} = ({})", columns, source)
        } else {
            format!("({}) = ({})", columns, source)
        };

        let mut params = vec![Value::Object(query.assignments.clone())];
        let (target, where_params) = Self::build_target_clause(table, query, 2);
        params.extend(where_params);

        Ok(Statement {
            sql: join_parts(&[
                format!("UPDATE {} SET {}", quote_ident(table), set_clause).as_str(),
                target.as_str(),
            ]),
            params,
        })
    }

    pub fn build_delete(table: &str, query: &QueryBuilder) -> Statement {
        let (target, params) = Self::build_target_clause(table, query, 1);

        Statement {
            sql: join_parts(&[format!("DELETE FROM {}", quote_ident(table)).as_str(), target.as_str()]),
            params,
        }
    }
}

fn join_parts(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}
