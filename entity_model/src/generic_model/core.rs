use crate::errors::ModelError;
use crate::executor::QueryExecutor;
use crate::rules::{FormValidator, RuleEngine};
use crate::schema::{EntityDefinition, TableSchema};
use crate::selector::WhereClauseResolver;

/// CRUD and validation over one table
pub struct EntityModel<X: QueryExecutor, R: RuleEngine = FormValidator> {
    pub(crate) schema: TableSchema,
    pub(crate) executor: X,
    pub(crate) rules: R,
    pub(crate) validated: bool,
}

impl<X: QueryExecutor, R: RuleEngine> std::fmt::Debug for EntityModel<X, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityModel")
            .field("table", &self.schema.table_name())
            .field("primary_key", self.schema.primary_key())
            .field("fields", &self.schema.fields().len())
            .field("validated", &self.validated)
            .finish()
    }
}

impl<X: QueryExecutor> EntityModel<X> {
    pub fn new(schema: TableSchema, executor: X) -> Self {
        Self::with_rule_engine(schema, executor, FormValidator::new())
    }

    /// Model for a declared entity; fails when its schema does not validate
    pub fn for_entity<E: EntityDefinition>(executor: X) -> Result<Self, ModelError> {
        Ok(Self::new(E::schema()?, executor))
    }
}

impl<X: QueryExecutor, R: RuleEngine> EntityModel<X, R> {
    pub fn with_rule_engine(schema: TableSchema, executor: X, rules: R) -> Self {
        Self {
            schema,
            executor,
            rules,
            validated: false,
        }
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn table_name(&self) -> &str {
        self.schema.table_name()
    }

    pub fn executor(&self) -> &X {
        &self.executor
    }

    pub fn rule_engine(&self) -> &R {
        &self.rules
    }

    pub(crate) fn resolver(&self) -> WhereClauseResolver<'_> {
        WhereClauseResolver::for_schema(&self.schema)
    }
}
