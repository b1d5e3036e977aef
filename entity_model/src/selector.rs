//! Row selectors
//!
//! A [`Selector`] names the rows an operation targets. It comes in three shapes:
//!
//! - `Scalar`: one primary key value, `id = 5`
//! - `List`: several primary key values (`id = 1 OR id = 2`) or, for a
//!   compound key of the same arity, one value per key column
//!   (`tenant_id = 7 AND user_id = 42`)
//! - `Map`: column filters ANDed together; an empty value means `IS NULL`
//!
//! [`WhereClauseResolver`] turns a selector into where clauses for one table.

use crate::errors::ModelError;
use crate::input::is_empty_value;
use crate::query_builder::{QueryBuilder, WhereClause};
use crate::schema::{PrimaryKey, TableSchema};
use crate::validation::ValidatedFieldName;
use crate::Record;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    Scalar(Value),
    List(Vec<Value>),
    Map(Record),
}

impl Selector {
    /// Infer the selector shape from a JSON value: arrays become lists, objects
    /// become maps and anything else is a scalar key. `null` is rejected since
    /// it does not name any rows.
    pub fn from_json(value: Value) -> Result<Self, ModelError> {
        match value {
            Value::Null => Err(ModelError::configuration(
                "selector cannot be null; use an empty list to target every row",
            )),
            Value::Array(items) => Ok(Self::List(items)),
            Value::Object(map) => Ok(Self::Map(map)),
            scalar => Ok(Self::Scalar(scalar)),
        }
    }

    /// Column filter from `(column, value)` pairs, in the given order
    pub fn map<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self::Map(
            pairs
                .into_iter()
                .map(|(column, value)| (column.into(), value.into()))
                .collect(),
        )
    }

    /// Selector matching every row
    pub fn all() -> Self {
        Self::List(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Selector::Scalar(_) => false,
            Selector::List(items) => items.is_empty(),
            Selector::Map(map) => map.is_empty(),
        }
    }
}

macro_rules! scalar_selector_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Selector {
                fn from(value: $ty) -> Self {
                    Self::Scalar(Value::from(value))
                }
            }
        )*
    };
}

scalar_selector_from!(i32, i64, u32, u64, &str, String);

impl From<uuid::Uuid> for Selector {
    fn from(value: uuid::Uuid) -> Self {
        Self::Scalar(Value::String(value.to_string()))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Selector {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<Record> for Selector {
    fn from(map: Record) -> Self {
        Self::Map(map)
    }
}

/// Resolves selectors against one table's primary key
#[derive(Debug, Clone, Copy)]
pub struct WhereClauseResolver<'a> {
    table: &'a str,
    primary_key: &'a PrimaryKey,
}

impl<'a> WhereClauseResolver<'a> {
    pub fn new(table: &'a str, primary_key: &'a PrimaryKey) -> Self {
        Self { table, primary_key }
    }

    pub fn for_schema(schema: &'a TableSchema) -> Self {
        Self::new(schema.table_name(), schema.primary_key())
    }

    /// Resolve `selector` into where clauses, in the order they must be applied.
    ///
    /// The shapes are tried in order: scalar, empty, map, compound key list,
    /// single key list. A list whose length differs from a compound key's
    /// arity matches none of them and is an error, never a wider statement.
    pub fn resolve(&self, selector: &Selector) -> Result<Vec<WhereClause>, ModelError> {
        let clauses = match selector {
            Selector::Scalar(value) => match self.primary_key {
                PrimaryKey::Single(column) => {
                    vec![WhereClause::eq(column, self.key_value(value)?)]
                }
                PrimaryKey::Compound(columns) => {
                    return Err(self.malformed(format!(
                        "a single key value cannot address the compound key ({})",
                        columns.join(", ")
                    )));
                }
            },
            _ if selector.is_empty() => Vec::new(),
            Selector::Map(filters) => filters
                .iter()
                .map(|(column, value)| self.filter_clause(column, value))
                .collect::<Result<_, _>>()?,
            Selector::List(values) => match self.primary_key {
                PrimaryKey::Compound(columns) if columns.len() == values.len() => columns
                    .iter()
                    .zip(values)
                    .map(|(column, value)| Ok(WhereClause::eq(column, self.key_value(value)?)))
                    .collect::<Result<_, ModelError>>()?,
                PrimaryKey::Compound(columns) => {
                    return Err(self.malformed(format!(
                        "{} values given for the {}-column key ({})",
                        values.len(),
                        columns.len(),
                        columns.join(", ")
                    )));
                }
                PrimaryKey::Single(column) => values
                    .iter()
                    .map(|value| Ok(WhereClause::eq(column, self.key_value(value)?).or()))
                    .collect::<Result<_, ModelError>>()?,
            },
        };

        crate::trace_log!(
            "resolved selector {:?} on {} into {} clause(s)",
            selector,
            self.table,
            clauses.len()
        );

        Ok(clauses)
    }

    /// Resolve `selector` and stage the clauses on `query`
    pub fn apply(&self, query: QueryBuilder, selector: &Selector) -> Result<QueryBuilder, ModelError> {
        Ok(query.clauses(self.resolve(selector)?))
    }

    fn filter_clause(&self, column: &str, value: &Value) -> Result<WhereClause, ModelError> {
        ValidatedFieldName::new(column)?;

        if is_empty_value(value) {
            Ok(WhereClause::is_null(column))
        } else {
            Ok(WhereClause::eq(column, self.key_value(value)?))
        }
    }

    fn key_value(&self, value: &Value) -> Result<Value, ModelError> {
        if value.is_array() || value.is_object() {
            return Err(self.malformed(format!("nested value {} cannot be matched against a column", value)));
        }
        Ok(value.clone())
    }

    fn malformed(&self, message: String) -> ModelError {
        ModelError::malformed_selector(self.table, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_builder::{LogicalOperator, Predicate};
    use serde_json::json;

    fn single() -> PrimaryKey {
        PrimaryKey::single("id")
    }

    fn compound() -> PrimaryKey {
        PrimaryKey::compound(["tenant_id", "user_id"])
    }

    fn resolve(selector: impl Into<Selector>, key: &PrimaryKey) -> Result<Vec<WhereClause>, ModelError> {
        WhereClauseResolver::new("users", key).resolve(&selector.into())
    }

    #[test]
    fn test_scalar_is_one_key_equality() {
        for value in [json!(5), json!("abc"), json!(0), json!(true)] {
            let clauses = resolve(Selector::Scalar(value.clone()), &single()).unwrap();
            assert_eq!(clauses, vec![WhereClause::eq("id", value)]);
        }
    }

    #[test]
    fn test_scalar_against_compound_key_is_rejected() {
        let err = resolve(7, &compound()).unwrap_err();
        assert!(matches!(err, ModelError::MalformedSelector { .. }));
    }

    #[test]
    fn test_empty_selectors_select_everything() {
        assert!(resolve(Selector::all(), &single()).unwrap().is_empty());
        assert!(resolve(Selector::Map(Record::new()), &single()).unwrap().is_empty());
        assert!(resolve(Selector::all(), &compound()).unwrap().is_empty());
    }

    #[test]
    fn test_map_is_and_filter_in_given_order() {
        let selector = Selector::map([("status", json!("active")), ("role", json!("admin"))]);
        let clauses = resolve(selector, &single()).unwrap();

        assert_eq!(
            clauses,
            vec![
                WhereClause::eq("status", json!("active")),
                WhereClause::eq("role", json!("admin")),
            ]
        );
        assert!(clauses.iter().all(|c| c.join == LogicalOperator::And));
    }

    #[test]
    fn test_map_empty_values_become_null_tests() {
        let selector = Selector::map([
            ("status", json!("")),
            ("parent_id", json!(null)),
            ("score", json!(0)),
            ("name", json!("x")),
        ]);
        let clauses = resolve(selector, &single()).unwrap();

        assert_eq!(clauses[0].predicate, Predicate::IsNull);
        assert_eq!(clauses[1].predicate, Predicate::IsNull);
        assert_eq!(clauses[2].predicate, Predicate::IsNull);
        assert_eq!(clauses[3].predicate, Predicate::Eq(json!("x")));
    }

    #[test]
    fn test_map_works_with_compound_key() {
        let selector = Selector::map([("tenant_id", json!(7))]);
        let clauses = resolve(selector, &compound()).unwrap();
        assert_eq!(clauses, vec![WhereClause::eq("tenant_id", json!(7))]);
    }

    #[test]
    fn test_map_rejects_unsafe_column_names() {
        let selector = Selector::map([("id = 1 OR 1", json!(1))]);
        assert!(matches!(
            resolve(selector, &single()),
            Err(ModelError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_list_on_compound_key_is_positional() {
        let clauses = resolve(vec![7, 42], &compound()).unwrap();
        assert_eq!(
            clauses,
            vec![
                WhereClause::eq("tenant_id", json!(7)),
                WhereClause::eq("user_id", json!(42)),
            ]
        );
    }

    #[test]
    fn test_list_arity_mismatch_is_rejected() {
        for values in [vec![7], vec![7, 42, 99]] {
            let err = resolve(values, &compound()).unwrap_err();
            assert!(matches!(err, ModelError::MalformedSelector { .. }));
        }
    }

    #[test]
    fn test_list_on_single_key_is_or_chain() {
        let clauses = resolve(vec![1, 2, 3], &single()).unwrap();

        assert_eq!(clauses.len(), 3);
        for (clause, expected) in clauses.iter().zip([1, 2, 3]) {
            assert_eq!(clause.column, "id");
            assert_eq!(clause.predicate, Predicate::Eq(json!(expected)));
            assert_eq!(clause.join, LogicalOperator::Or);
        }
    }

    #[test]
    fn test_single_element_list_on_single_key_is_still_or() {
        let clauses = resolve(vec![9], &single()).unwrap();
        assert_eq!(clauses, vec![WhereClause::eq("id", json!(9)).or()]);
    }

    #[test]
    fn test_nested_values_are_rejected() {
        assert!(resolve(Selector::List(vec![json!([1, 2])]), &single()).is_err());
        assert!(resolve(Selector::map([("tags", json!(["a"]))]), &single()).is_err());
        assert!(resolve(Selector::Scalar(json!({"a": 1})), &single()).is_err());
    }

    #[test]
    fn test_from_json_infers_shape() {
        assert_eq!(Selector::from_json(json!(5)).unwrap(), Selector::Scalar(json!(5)));
        assert_eq!(
            Selector::from_json(json!([1, 2])).unwrap(),
            Selector::List(vec![json!(1), json!(2)])
        );
        assert!(matches!(
            Selector::from_json(json!({"status": "active"})).unwrap(),
            Selector::Map(_)
        ));
        assert!(Selector::from_json(json!(null)).is_err());
    }

    #[test]
    fn test_apply_stages_clauses() {
        let key = single();
        let resolver = WhereClauseResolver::new("users", &key);
        let query = resolver
            .apply(QueryBuilder::new(), &Selector::from(vec![1, 2]))
            .unwrap();

        let (sql, params) = query.build_where_clause("users");
        assert_eq!(sql.matches(" OR ").count(), 1);
        assert!(sql.starts_with("WHERE \"id\" = "));
        assert_eq!(params, vec![json!(1), json!(2)]);
    }
}
