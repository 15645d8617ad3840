use crate::{boot, Error, Result};
use indexmap::IndexMap;

/// One physical table in an entity's span, in insert order: supertype tables
/// first, then the entity's own table, then secondary tables.
#[derive(Debug, Clone)]
pub struct TableMapping {
    pub name: String,

    /// Position within the entity's span
    pub ordinal: usize,

    /// Columns joining this table to the identifier table, in identifier
    /// column order. The identifier table joins to itself.
    pub key_columns: Vec<boot::Column>,

    /// This is the table the identifier lives in.
    pub identifier_table: bool,

    /// Owned by the other side; this entity never writes it.
    pub inverse: bool,

    /// Rows may be absent; joins against it must be outer.
    pub optional: bool,

    /// State positions of the attributes stored (at least partially) in this
    /// table.
    pub attributes: Vec<usize>,

    pub insert: MutationDetails,
    pub update: MutationDetails,
    pub delete: MutationDetails,
}

impl TableMapping {
    pub fn is_writable(&self) -> bool {
        !self.inverse
    }
}

/// How one mutation against one table is executed.
#[derive(Debug, Clone, Default)]
pub struct MutationDetails {
    /// Custom SQL replacing the generated statement
    pub custom_sql: Option<String>,

    /// The custom SQL is a stored-procedure call
    pub callable: bool,

    pub expectation: boot::Expectation,
}

impl MutationDetails {
    fn from_decl(decl: Option<&boot::MutationSql>) -> Self {
        match decl {
            Some(sql) => Self {
                custom_sql: Some(sql.sql.clone()),
                callable: sql.callable,
                expectation: sql.expectation,
            },
            None => Self::default(),
        }
    }
}

/// Declared input for one table of the span, before coalescing.
pub(crate) struct TableDecl<'a> {
    pub name: &'a str,
    pub key_columns: Vec<boot::Column>,
    pub identifier_table: bool,
    pub inverse: bool,
    pub optional: bool,
    pub custom_sql: &'a boot::CustomSql,
}

/// Builds the table span, coalescing repeated names.
///
/// Single-table subtypes re-declare the root's table name; the builder folds
/// the repeats into one mapping rather than duplicating the table in the
/// span.
pub(crate) struct TableSpanBuilder {
    tables: IndexMap<String, TableMapping>,
}

impl TableSpanBuilder {
    pub(crate) fn new() -> Self {
        Self {
            tables: IndexMap::new(),
        }
    }

    pub(crate) fn push(&mut self, entity: &str, decl: TableDecl<'_>) -> Result<usize> {
        if let Some(existing) = self.tables.get(decl.name) {
            if existing.inverse != decl.inverse || existing.optional != decl.optional {
                return Err(Error::mapping(
                    entity,
                    format!("table `{}` declared twice with conflicting roles", decl.name),
                ));
            }
            return Ok(existing.ordinal);
        }

        let ordinal = self.tables.len();
        self.tables.insert(
            decl.name.to_string(),
            TableMapping {
                name: decl.name.to_string(),
                ordinal,
                key_columns: decl.key_columns,
                identifier_table: decl.identifier_table,
                inverse: decl.inverse,
                optional: decl.optional,
                attributes: vec![],
                insert: MutationDetails::from_decl(decl.custom_sql.insert.as_ref()),
                update: MutationDetails::from_decl(decl.custom_sql.update.as_ref()),
                delete: MutationDetails::from_decl(decl.custom_sql.delete.as_ref()),
            },
        );
        Ok(ordinal)
    }

    /// The ordinal of a named table, if it is part of the span.
    pub(crate) fn ordinal_of(&self, name: &str) -> Option<usize> {
        self.tables.get(name).map(|table| table.ordinal)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub(crate) fn record_attribute(&mut self, ordinal: usize, state_position: usize) {
        let table = &mut self.tables[ordinal];
        if !table.attributes.contains(&state_position) {
            table.attributes.push(state_position);
        }
    }

    pub(crate) fn finish(self) -> Vec<TableMapping> {
        self.tables.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decl<'a>(name: &'a str, custom_sql: &'a boot::CustomSql) -> TableDecl<'a> {
        TableDecl {
            name,
            key_columns: vec![boot::Column::new("id")],
            identifier_table: false,
            inverse: false,
            optional: false,
            custom_sql,
        }
    }

    #[test]
    fn repeated_names_coalesce() {
        let custom_sql = boot::CustomSql::default();
        let mut builder = TableSpanBuilder::new();

        assert_eq!(builder.push("Animal", decl("animals", &custom_sql)).unwrap(), 0);
        assert_eq!(builder.push("Dog", decl("animals", &custom_sql)).unwrap(), 0);
        assert_eq!(builder.push("Dog", decl("dog_details", &custom_sql)).unwrap(), 1);

        let span = builder.finish();
        assert_eq!(span.len(), 2);
        assert_eq!(span[0].name, "animals");
        assert_eq!(span[1].name, "dog_details");
    }

    #[test]
    fn conflicting_roles_rejected() {
        let custom_sql = boot::CustomSql::default();
        let mut builder = TableSpanBuilder::new();
        builder.push("Order", decl("order_notes", &custom_sql)).unwrap();

        let mut inverse = decl("order_notes", &custom_sql);
        inverse.inverse = true;
        let err = builder.push("Order", inverse).unwrap_err();
        assert!(err.to_string().contains("conflicting roles"));
    }
}
