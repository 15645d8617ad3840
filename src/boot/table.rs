use super::Column;

/// A secondary table joined to the entity's primary table by key columns.
#[derive(Debug, Clone)]
pub struct SecondaryTable {
    pub name: String,

    /// Columns joined 1:1 against the identifier's columns
    pub key_columns: Vec<Column>,

    /// The table is owned by the other side of a relationship; this side
    /// never inserts or updates it.
    pub inverse: bool,

    /// Rows may be absent; the join must be outer.
    pub optional: bool,

    pub custom_sql: CustomSql,
}

impl SecondaryTable {
    pub fn new(name: impl Into<String>, key_columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            key_columns,
            inverse: false,
            optional: false,
            custom_sql: CustomSql::default(),
        }
    }
}

/// Per-operation overrides replacing generated SQL.
#[derive(Debug, Default, Clone)]
pub struct CustomSql {
    pub insert: Option<MutationSql>,
    pub update: Option<MutationSql>,
    pub delete: Option<MutationSql>,
}

#[derive(Debug, Clone)]
pub struct MutationSql {
    pub sql: String,

    /// The override is a stored-procedure call
    pub callable: bool,

    pub expectation: Expectation,
}

impl MutationSql {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            callable: false,
            expectation: Expectation::RowCount,
        }
    }
}

/// How the affected-row count of a mutation is checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Expectation {
    /// Exactly one row must be affected; silent failures are detected.
    #[default]
    RowCount,

    /// The outcome is reported through an output parameter.
    Parameter,

    /// No verification.
    None,
}
