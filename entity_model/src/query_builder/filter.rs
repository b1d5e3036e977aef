//! Where clause primitives

use serde_json::Value;

/// How a clause joins onto the clauses before it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    pub fn to_sql(&self) -> &'static str {
        match self {
            LogicalOperator::And => "AND",
            LogicalOperator::Or => "OR",
        }
    }
}

/// Test applied to a single column
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `column = value`; a JSON null renders as `IS NULL`
    Eq(Value),
    IsNull,
}

/// Single condition in a WHERE clause
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    pub column: String,
    pub predicate: Predicate,
    pub join: LogicalOperator,
}

impl WhereClause {
    pub fn eq(column: &str, value: Value) -> Self {
        Self {
            column: column.to_string(),
            predicate: Predicate::Eq(value),
            join: LogicalOperator::And,
        }
    }

    pub fn is_null(column: &str) -> Self {
        Self {
            column: column.to_string(),
            predicate: Predicate::IsNull,
            join: LogicalOperator::And,
        }
    }

    /// Join this clause with OR instead of AND
    pub fn or(mut self) -> Self {
        self.join = LogicalOperator::Or;
        self
    }
}
