use super::{Expr, Value};

/// A `UNION ALL` of per-concrete-type SELECT branches, standing in for a
/// physical table when a hierarchy maps one table per concrete type.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionSubquery {
    pub branches: Vec<UnionBranch>,
}

/// One SELECT branch of a union subquery.
///
/// Every branch projects the same column list; columns the branch's table
/// does not carry are padded with typed nulls.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionBranch {
    /// Entity the branch selects rows for
    pub entity: String,

    /// The concrete table the branch reads
    pub table: String,

    /// Projected columns, in hierarchy-wide order
    pub selections: Vec<UnionSelection>,

    /// Synthetic literal identifying which branch a row came from
    pub discriminator: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnionSelection {
    /// Output column name
    pub column: String,

    /// Either a real column reference or a typed null pad
    pub expr: Expr,
}

impl UnionSubquery {
    pub fn branch_for(&self, entity: &str) -> Option<&UnionBranch> {
        self.branches.iter().find(|branch| branch.entity == entity)
    }

    /// Rebuilds the subquery keeping only branches whose entity passes the
    /// filter.
    pub fn retain_entities(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.branches.retain(|branch| keep(&branch.entity));
    }
}
