use super::{Expr, UnionSubquery};

/// An aliased table reference in a polymorphic query source.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRef {
    pub source: TableSource,
    pub alias: String,
}

/// What a table reference actually selects from.
#[derive(Debug, Clone, PartialEq)]
pub enum TableSource {
    /// A physical table from the schema
    Table(String),

    /// A physical table wrapped in a restricting sub-select; produced when
    /// pruning needs a discriminator condition beyond join shape.
    Filtered {
        table: String,
        restriction: Box<Expr>,
    },

    /// A union of per-concrete-type branches
    Union(UnionSubquery),
}

impl TableRef {
    pub fn table(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            source: TableSource::Table(name.into()),
            alias: alias.into(),
        }
    }

    /// The physical table name, if the source is (or wraps) one.
    pub fn table_name(&self) -> Option<&str> {
        match &self.source {
            TableSource::Table(name) => Some(name),
            TableSource::Filtered { table, .. } => Some(table),
            TableSource::Union(_) => None,
        }
    }

    pub fn references(&self, table: &str) -> bool {
        self.table_name() == Some(table)
    }
}
