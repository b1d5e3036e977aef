//! Table schema declarations
//!
//! A concrete entity declares its table, primary key and writable fields once;
//! the resulting [`TableSchema`] is validated on construction and read-only after.

use crate::errors::ModelError;
use crate::validation::{ValidatedFieldName, ValidatedTableName};
use std::collections::HashSet;

/// Primary key used when an entity does not declare one
pub const DEFAULT_PRIMARY_KEY: &str = "id";

/// One validatable, writable column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Column name, also the input key the value is read from
    pub name: String,
    /// Human readable name used in validation messages
    pub label: String,
    /// Pipe separated rule expression, e.g. `required|max_length[32]`
    pub rules: String,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, label: impl Into<String>, rules: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            rules: rules.into(),
        }
    }
}

/// Single or compound primary key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimaryKey {
    Single(String),
    /// Columns compared positionally against list selectors
    Compound(Vec<String>),
}

impl PrimaryKey {
    pub fn single(column: impl Into<String>) -> Self {
        Self::Single(column.into())
    }

    pub fn compound<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Compound(columns.into_iter().map(Into::into).collect())
    }

    pub fn columns(&self) -> Vec<&str> {
        match self {
            PrimaryKey::Single(column) => vec![column.as_str()],
            PrimaryKey::Compound(columns) => columns.iter().map(String::as_str).collect(),
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            PrimaryKey::Single(_) => 1,
            PrimaryKey::Compound(columns) => columns.len(),
        }
    }

    pub fn is_compound(&self) -> bool {
        matches!(self, PrimaryKey::Compound(_))
    }
}

impl Default for PrimaryKey {
    fn default() -> Self {
        Self::single(DEFAULT_PRIMARY_KEY)
    }
}

/// Validated table layout shared by every operation of one entity model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    table: ValidatedTableName,
    primary_key: PrimaryKey,
    fields: Vec<FieldSpec>,
}

impl TableSchema {
    /// Start declaring a schema for `table`
    pub fn new(table: impl Into<String>) -> TableSchemaBuilder {
        TableSchemaBuilder {
            table: table.into(),
            primary_key: PrimaryKey::default(),
            fields: Vec::new(),
        }
    }

    pub fn table_name(&self) -> &str {
        self.table.as_str()
    }

    pub fn primary_key(&self) -> &PrimaryKey {
        &self.primary_key
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// Builder for [`TableSchema`]; nothing is checked until [`build`](Self::build)
#[derive(Debug, Clone)]
pub struct TableSchemaBuilder {
    table: String,
    primary_key: PrimaryKey,
    fields: Vec<FieldSpec>,
}

impl TableSchemaBuilder {
    pub fn primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key = PrimaryKey::single(column);
        self
    }

    pub fn compound_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = PrimaryKey::compound(columns);
        self
    }

    pub fn key(mut self, primary_key: PrimaryKey) -> Self {
        self.primary_key = primary_key;
        self
    }

    pub fn field(
        mut self,
        name: impl Into<String>,
        label: impl Into<String>,
        rules: impl Into<String>,
    ) -> Self {
        self.fields.push(FieldSpec::new(name, label, rules));
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = FieldSpec>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn build(self) -> Result<TableSchema, ModelError> {
        let table = ValidatedTableName::new(&self.table)?;

        if let PrimaryKey::Compound(columns) = &self.primary_key {
            if columns.len() < 2 {
                return Err(ModelError::configuration(format!(
                    "compound primary key of {} needs at least two columns, got {}",
                    table,
                    columns.len()
                )));
            }
        }

        let mut seen = HashSet::new();
        for column in self.primary_key.columns() {
            ValidatedFieldName::new(column)?;
            if !seen.insert(column) {
                return Err(ModelError::configuration(format!(
                    "primary key column {} is listed twice for {}",
                    column, table
                )));
            }
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            ValidatedFieldName::new(&field.name)?;
            if !seen.insert(field.name.as_str()) {
                return Err(ModelError::configuration(format!(
                    "field {} is declared twice for {}",
                    field.name, table
                )));
            }
        }

        Ok(TableSchema {
            table,
            primary_key: self.primary_key,
            fields: self.fields,
        })
    }
}

/// Declaration implemented by concrete entities
///
/// ```
/// use entity_model::schema::{EntityDefinition, FieldSpec};
///
/// struct Account;
///
/// impl EntityDefinition for Account {
///     fn table_name() -> &'static str {
///         "accounts"
///     }
///
///     fn fields() -> Vec<FieldSpec> {
///         vec![
///             FieldSpec::new("username", "Username", "required|alpha_dash|max_length[32]"),
///             FieldSpec::new("email", "Email", "required|valid_email"),
///         ]
///     }
/// }
///
/// let schema = Account::schema().unwrap();
/// assert_eq!(schema.primary_key().columns(), vec!["id"]);
/// ```
pub trait EntityDefinition {
    fn table_name() -> &'static str;

    fn primary_key() -> PrimaryKey {
        PrimaryKey::default()
    }

    fn fields() -> Vec<FieldSpec>;

    fn schema() -> Result<TableSchema, ModelError> {
        TableSchema::new(Self::table_name())
            .key(Self::primary_key())
            .fields(Self::fields())
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_primary_key_is_id() {
        let schema = TableSchema::new("users").build().unwrap();
        assert_eq!(schema.primary_key(), &PrimaryKey::single("id"));
        assert!(!schema.primary_key().is_compound());
    }

    #[test]
    fn test_compound_key_columns_keep_order() {
        let schema = TableSchema::new("memberships")
            .compound_key(["tenant_id", "user_id"])
            .build()
            .unwrap();

        assert_eq!(schema.primary_key().columns(), vec!["tenant_id", "user_id"]);
        assert_eq!(schema.primary_key().arity(), 2);
    }

    #[test]
    fn test_rejects_single_column_compound_key() {
        let err = TableSchema::new("memberships")
            .compound_key(["tenant_id"])
            .build()
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_rejects_bad_identifiers() {
        assert!(matches!(
            TableSchema::new("user accounts").build(),
            Err(ModelError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            TableSchema::new("users").primary_key("select").build(),
            Err(ModelError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            TableSchema::new("users").field("e-mail", "Email", "").build(),
            Err(ModelError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_rejects_duplicates() {
        let err = TableSchema::new("users")
            .field("email", "Email", "required")
            .field("email", "E-mail", "valid_email")
            .build()
            .unwrap_err();
        assert!(err.is_configuration());

        let err = TableSchema::new("memberships")
            .compound_key(["tenant_id", "tenant_id"])
            .build()
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_field_lookup() {
        let schema = TableSchema::new("users")
            .field("username", "Username", "required")
            .build()
            .unwrap();

        assert_eq!(schema.field("username").map(|f| f.label.as_str()), Some("Username"));
        assert!(schema.field("email").is_none());
    }
}
