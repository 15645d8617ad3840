use super::*;

/// A searched CASE expression.
///
/// Used for the synthetic discriminator of joined hierarchies without an
/// explicit discriminator column: each arm tests a subtype key for non-null
/// and yields that subtype's literal.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprCase {
    pub arms: Vec<CaseArm>,
    pub else_expr: Option<Box<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseArm {
    pub when: Expr,
    pub then: Expr,
}

impl Expr {
    pub fn case(arms: Vec<CaseArm>, else_expr: Option<Expr>) -> Self {
        ExprCase {
            arms,
            else_expr: else_expr.map(Box::new),
        }
        .into()
    }
}

impl From<ExprCase> for Expr {
    fn from(value: ExprCase) -> Self {
        Self::Case(value)
    }
}
