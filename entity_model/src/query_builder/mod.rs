//! Query builder utilities
//!
//! Staged predicates, assignments and limits for one statement, plus the SQL
//! they render to.

pub mod builder;
pub mod filter;
pub mod sql_generation;


pub use builder::QueryBuilder;
pub use filter::{LogicalOperator, Predicate, WhereClause};
pub use sql_generation::{quote_ident, SqlGenerator, Statement};
