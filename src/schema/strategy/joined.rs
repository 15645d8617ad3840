use crate::schema::strategy::value_predicate;
use crate::schema::{DiscriminatorMapping, DiscriminatorSource, DiscriminatorValue};
use crate::{boot, stmt, Result};

/// One table per type, joined root-to-leaf by primary key.
#[derive(Debug)]
pub struct Joined {
    pub root_entity: String,
    pub root_table: String,

    /// Alias of the root table in generated groups
    pub root_alias: String,

    pub root_key_columns: Vec<boot::Column>,

    /// Supertype tables between the root and this entity, plus this entity's
    /// own table when distinct from the root's; inner-joined in every group.
    pub chain: Vec<JoinedTable>,

    /// Strict-subtype tables, left-outer joined for polymorphic reads.
    pub branches: Vec<JoinedTable>,
}

/// One non-root table of a joined hierarchy, with its join predicate against
/// the root alias precomputed at link time.
#[derive(Debug, Clone)]
pub struct JoinedTable {
    pub entity: String,
    pub table: String,
    pub alias: String,
    pub key_columns: Vec<boot::Column>,
    pub predicate: stmt::Expr,
}

impl Joined {
    pub(crate) fn table_group(&self) -> stmt::TableGroup {
        let mut group =
            stmt::TableGroup::new(stmt::TableRef::table(&self.root_table, &self.root_alias));

        for link in &self.chain {
            group.joins.push(stmt::Join::inner(
                stmt::TableRef::table(&link.table, &link.alias),
                link.predicate.clone(),
            ));
        }

        for branch in &self.branches {
            group.joins.push(stmt::Join::left_outer(
                stmt::TableRef::table(&branch.table, &branch.alias),
                branch.predicate.clone(),
            ));
        }

        group
    }

    pub(crate) fn discriminator_expr(&self, mapping: &DiscriminatorMapping) -> stmt::Expr {
        match &mapping.source {
            DiscriminatorSource::Column(column) => {
                stmt::Expr::column(&self.root_alias, column.read_fragment())
            }
            DiscriminatorSource::Formula(fragment) => {
                stmt::Expr::column(&self.root_alias, fragment)
            }
            DiscriminatorSource::Synthetic => self.synthetic_case(mapping),
        }
    }

    /// The CASE expression standing in for a discriminator column: each
    /// subtype's key is tested for non-null, most-derived first, and the
    /// matching subtype's literal is produced.
    fn synthetic_case(&self, mapping: &DiscriminatorMapping) -> stmt::Expr {
        let arms = self
            .branches
            .iter()
            .rev()
            .filter_map(|branch| {
                let value = mapping.value_map.get(&branch.entity)?.as_literal()?;
                let key = branch.key_columns.first()?;

                Some(stmt::CaseArm {
                    when: stmt::Expr::is_not_null(stmt::Expr::column(&branch.alias, &key.name)),
                    then: stmt::Expr::Value(value.clone()),
                })
            })
            .collect();

        let else_expr = mapping
            .value_map
            .get(&self.root_entity)
            .and_then(DiscriminatorValue::as_literal)
            .map(|value| stmt::Expr::Value(value.clone()));

        stmt::Expr::case(arms, else_expr)
    }

    /// Narrows a joined group structurally: a restricted subtype's join
    /// switches from outer to inner, so unmatched rows fall out of the
    /// result.
    ///
    /// Restricting to a type stored in the root table itself has no join to
    /// tighten; those rows are filtered by discriminator instead, wrapping
    /// the root in a restricting sub-select when the mapping declares a
    /// physical source.
    pub(crate) fn prune(
        &self,
        group: &mut stmt::TableGroup,
        mapping: Option<&DiscriminatorMapping>,
        restricted: &[String],
    ) -> Result<()> {
        if restricted.is_empty() {
            return Ok(());
        }

        let mut root_level: Vec<String> = vec![];

        for entity in restricted {
            let table = self.table_of(entity);

            match table {
                Some(table) if table != self.root_table => {
                    if let Some(join) = group.join_for_table_mut(table) {
                        join.kind = stmt::JoinKind::Inner;
                    }
                }
                _ => root_level.push(entity.clone()),
            }
        }

        if root_level.is_empty() {
            return Ok(());
        }

        let Some(mapping) = mapping else {
            return Ok(());
        };

        let values: Vec<_> = mapping.values_for(&root_level).collect();
        let expr = match &mapping.source {
            DiscriminatorSource::Column(column) => {
                // The predicate lands inside a sub-select over the root
                // table; column references there are unqualified.
                stmt::Expr::column("", column.read_fragment())
            }
            DiscriminatorSource::Formula(fragment) => stmt::Expr::column("", fragment),
            DiscriminatorSource::Synthetic => {
                // No physical source to filter the root table by; fall back
                // to a group-level restriction on the synthetic CASE.
                if let Some(predicate) =
                    value_predicate(self.synthetic_case(mapping), &values)
                {
                    let restriction = match group.restriction.take() {
                        Some(existing) => stmt::Expr::and(existing, predicate),
                        None => predicate,
                    };
                    group.set_restriction(Some(restriction));
                }
                return Ok(());
            }
        };

        if let Some(predicate) = value_predicate(expr, &values) {
            group.root.source = stmt::TableSource::Filtered {
                table: self.root_table.clone(),
                restriction: Box::new(predicate),
            };
        }

        Ok(())
    }

    fn table_of(&self, entity: &str) -> Option<&str> {
        if entity == self.root_entity {
            return Some(&self.root_table);
        }

        self.chain
            .iter()
            .chain(&self.branches)
            .find(|link| link.entity == entity)
            .map(|link| link.table.as_str())
    }
}
