use super::Expr;

/// References a column through the alias of the table reference that carries
/// it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprColumn {
    pub table_alias: String,
    pub column: String,
}

impl Expr {
    pub fn column(table_alias: impl Into<String>, column: impl Into<String>) -> Self {
        ExprColumn {
            table_alias: table_alias.into(),
            column: column.into(),
        }
        .into()
    }
}

impl From<ExprColumn> for Expr {
    fn from(value: ExprColumn) -> Self {
        Self::Column(value)
    }
}
