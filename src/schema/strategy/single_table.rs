use crate::schema::strategy::value_predicate;
use crate::schema::DiscriminatorMapping;
use crate::{stmt, Result};

/// One table for the whole hierarchy; rows discriminated by value.
#[derive(Debug)]
pub struct SingleTable {
    pub table: String,

    /// Alias the hierarchy table carries in generated groups
    pub alias: String,
}

impl SingleTable {
    pub(crate) fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            alias: "t0".to_string(),
        }
    }

    pub(crate) fn table_group(&self) -> stmt::TableGroup {
        stmt::TableGroup::new(stmt::TableRef::table(&self.table, &self.alias))
    }

    pub(crate) fn discriminator_expr(&self, mapping: &DiscriminatorMapping) -> stmt::Expr {
        match &mapping.source {
            crate::schema::DiscriminatorSource::Column(column) => {
                stmt::Expr::column(&self.alias, column.read_fragment())
            }
            crate::schema::DiscriminatorSource::Formula(fragment) => {
                stmt::Expr::column(&self.alias, fragment)
            }
            // Implicit sources never survive single-table resolution.
            crate::schema::DiscriminatorSource::Synthetic => {
                stmt::Expr::column(&self.alias, "clazz_")
            }
        }
    }

    /// Restricting a single-table group is purely a matter of predicate: the
    /// shared table stays, the discriminator narrows the rows.
    pub(crate) fn prune(
        &self,
        group: &mut stmt::TableGroup,
        mapping: Option<&DiscriminatorMapping>,
        restricted: &[String],
    ) -> Result<()> {
        if restricted.is_empty() {
            return Ok(());
        }

        let Some(mapping) = mapping else {
            // No discriminator means a single-member hierarchy; nothing to
            // narrow.
            return Ok(());
        };

        let values: Vec<_> = mapping.values_for(restricted).collect();
        if let Some(predicate) = value_predicate(self.discriminator_expr(mapping), &values) {
            let restriction = match group.restriction.take() {
                Some(existing) => stmt::Expr::and(existing, predicate),
                None => predicate,
            };
            group.set_restriction(Some(restriction));
        }

        Ok(())
    }
}
