use super::{Expr, TableRef};

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    pub table: TableRef,
    pub predicate: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    LeftOuter,
}

impl Join {
    pub fn inner(table: TableRef, predicate: Expr) -> Self {
        Self {
            kind: JoinKind::Inner,
            table,
            predicate,
        }
    }

    pub fn left_outer(table: TableRef, predicate: Expr) -> Self {
        Self {
            kind: JoinKind::LeftOuter,
            table,
            predicate,
        }
    }

    pub fn is_inner(&self) -> bool {
        matches!(self.kind, JoinKind::Inner)
    }
}
