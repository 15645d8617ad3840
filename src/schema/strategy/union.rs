use crate::{stmt, Result};

/// Column name carrying the synthetic branch discriminator in union groups.
pub(crate) const UNION_DISCRIMINATOR: &str = "clazz_";

/// One table per concrete type, unioned for polymorphic reads.
#[derive(Debug)]
pub struct Union {
    /// Alias of the union subquery in generated groups
    pub alias: String,

    /// The full per-concrete-type union, built once at link time
    pub subquery: stmt::UnionSubquery,
}

impl Union {
    pub(crate) fn new(subquery: stmt::UnionSubquery) -> Self {
        Self {
            alias: "t0".to_string(),
            subquery,
        }
    }

    pub(crate) fn table_group(&self) -> stmt::TableGroup {
        stmt::TableGroup::new(stmt::TableRef {
            source: stmt::TableSource::Union(self.subquery.clone()),
            alias: self.alias.clone(),
        })
    }

    /// The synthetic discriminator is an ordinary output column of the
    /// union; each branch produced it as a literal.
    pub(crate) fn discriminator_expr(&self) -> stmt::Expr {
        stmt::Expr::column(&self.alias, UNION_DISCRIMINATOR)
    }

    /// Narrows a union group by dropping branches. A single surviving branch
    /// collapses to a plain table scan.
    pub(crate) fn prune(
        &self,
        group: &mut stmt::TableGroup,
        restricted: &[String],
    ) -> Result<()> {
        if restricted.is_empty() {
            return Ok(());
        }

        let stmt::TableSource::Union(subquery) = &mut group.root.source else {
            return Ok(());
        };

        subquery.retain_entities(|entity| restricted.iter().any(|name| name == entity));

        if subquery.branches.len() == 1 {
            let table = subquery.branches[0].table.clone();
            group.root.source = stmt::TableSource::Table(table);
        }

        Ok(())
    }
}
