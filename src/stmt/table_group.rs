use super::{Expr, Join, TableRef};

/// The joined set of table references backing one polymorphic entity
/// reference in a query.
///
/// Strategy pruning mutates a group in place: joins may switch kind, the
/// root source may be rewritten, and the restriction replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct TableGroup {
    pub root: TableRef,
    pub joins: Vec<Join>,
    pub restriction: Option<Expr>,
}

impl TableGroup {
    pub fn new(root: TableRef) -> Self {
        Self {
            root,
            joins: vec![],
            restriction: None,
        }
    }

    pub fn join_for_table(&self, table: &str) -> Option<&Join> {
        self.joins.iter().find(|join| join.table.references(table))
    }

    pub fn join_for_table_mut(&mut self, table: &str) -> Option<&mut Join> {
        self.joins
            .iter_mut()
            .find(|join| join.table.references(table))
    }

    pub fn set_restriction(&mut self, restriction: Option<Expr>) {
        self.restriction = restriction;
    }
}
