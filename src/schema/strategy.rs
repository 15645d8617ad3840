mod single_table;
pub use single_table::SingleTable;

mod joined;
pub use joined::{Joined, JoinedTable};

mod union;
pub use union::Union;

use super::{DiscriminatorMapping, DiscriminatorValue};
use crate::{boot, stmt, Error, Result};

/// How one entity's hierarchy maps onto tables, with the compiled structures
/// each mapping needs at query time.
#[derive(Debug)]
pub enum Strategy {
    SingleTable(SingleTable),
    Joined(Joined),
    Union(Union),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    SingleTable,
    Joined,
    Union,
}

impl Strategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::SingleTable(_) => StrategyKind::SingleTable,
            Self::Joined(_) => StrategyKind::Joined,
            Self::Union(_) => StrategyKind::Union,
        }
    }

    pub fn as_joined(&self) -> Option<&Joined> {
        match self {
            Self::Joined(joined) => Some(joined),
            _ => None,
        }
    }

    /// The table group a polymorphic query of this entity selects from,
    /// before pruning.
    pub fn polymorphic_table_group(&self) -> stmt::TableGroup {
        match self {
            Self::SingleTable(strategy) => strategy.table_group(),
            Self::Joined(strategy) => strategy.table_group(),
            Self::Union(strategy) => strategy.table_group(),
        }
    }

    /// The expression producing the discriminator value for a selected row.
    pub fn discriminator_expr(&self, mapping: &DiscriminatorMapping) -> stmt::Expr {
        match self {
            Self::SingleTable(strategy) => strategy.discriminator_expr(mapping),
            Self::Joined(strategy) => strategy.discriminator_expr(mapping),
            Self::Union(strategy) => strategy.discriminator_expr(),
        }
    }

    /// The predicate restricting rows to the named entities, or `None` when
    /// their values cover every row.
    pub fn discriminator_predicate(
        &self,
        mapping: &DiscriminatorMapping,
        entities: &[String],
    ) -> Option<stmt::Expr> {
        let expr = self.discriminator_expr(mapping);
        let values: Vec<&DiscriminatorValue> = mapping.values_for(entities).collect();
        value_predicate(expr, &values)
    }

    /// Narrows a polymorphic table group to the named entities.
    ///
    /// `restricted` must already be closure-expanded: restricting to a type
    /// includes its subtypes.
    pub fn prune(
        &self,
        group: &mut stmt::TableGroup,
        mapping: Option<&DiscriminatorMapping>,
        restricted: &[String],
    ) -> Result<()> {
        match self {
            Self::SingleTable(strategy) => strategy.prune(group, mapping, restricted),
            Self::Joined(strategy) => strategy.prune(group, mapping, restricted),
            Self::Union(strategy) => strategy.prune(group, restricted),
        }
    }
}

/// Builds the column-wise equality predicate joining two key column lists.
pub(crate) fn join_predicate(
    lhs_alias: &str,
    lhs_columns: &[boot::Column],
    rhs_alias: &str,
    rhs_columns: &[boot::Column],
) -> Result<stmt::Expr> {
    if lhs_columns.len() != rhs_columns.len() {
        return Err(Error::consistency(format!(
            "cannot join `{lhs_alias}` to `{rhs_alias}`: {} key columns vs {}",
            lhs_columns.len(),
            rhs_columns.len()
        )));
    }

    let parts = lhs_columns
        .iter()
        .zip(rhs_columns)
        .map(|(lhs, rhs)| {
            stmt::Expr::eq(
                stmt::Expr::column(lhs_alias, &lhs.name),
                stmt::Expr::column(rhs_alias, &rhs.name),
            )
        })
        .collect();

    Ok(stmt::Expr::and_from_vec(parts))
}

/// The predicate selecting rows whose discriminator matches one of `values`.
///
/// Sentinels turn into null tests; when the values cover every possible row
/// no predicate is needed and `None` is returned.
pub(crate) fn value_predicate(
    expr: stmt::Expr,
    values: &[&DiscriminatorValue],
) -> Option<stmt::Expr> {
    let has_null = values.iter().any(|v| matches!(v, DiscriminatorValue::Null));
    let has_not_null = values
        .iter()
        .any(|v| matches!(v, DiscriminatorValue::NotNull));

    let literals: Vec<stmt::Expr> = values
        .iter()
        .filter_map(|v| v.as_literal())
        .map(|literal| stmt::Expr::Value(literal.clone()))
        .collect();

    match (has_null, has_not_null) {
        // Null rows and all other non-null rows: everything matches.
        (true, true) => None,
        (false, true) => Some(stmt::Expr::is_not_null(expr)),
        (true, false) => {
            let null_test = stmt::Expr::is_null(expr.clone());
            if literals.is_empty() {
                Some(null_test)
            } else {
                Some(stmt::Expr::or(literal_predicate(expr, literals), null_test))
            }
        }
        (false, false) => {
            if literals.is_empty() {
                // Nothing can match; keep a contradiction rather than an
                // unrestricted group.
                Some(stmt::Expr::Value(stmt::Value::Bool(false)))
            } else {
                Some(literal_predicate(expr, literals))
            }
        }
    }
}

fn literal_predicate(expr: stmt::Expr, mut literals: Vec<stmt::Expr>) -> stmt::Expr {
    if literals.len() == 1 {
        stmt::Expr::eq(expr, literals.remove(0))
    } else {
        stmt::Expr::in_list(expr, literals)
    }
}
