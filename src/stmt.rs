mod expr;
pub use expr::Expr;

mod expr_and;
pub use expr_and::ExprAnd;

mod expr_binary_op;
pub use expr_binary_op::{BinaryOp, ExprBinaryOp};

mod expr_case;
pub use expr_case::{CaseArm, ExprCase};

mod expr_cast;
pub use expr_cast::ExprCast;

mod expr_column;
pub use expr_column::ExprColumn;

mod expr_in_list;
pub use expr_in_list::ExprInList;

mod expr_is_null;
pub use expr_is_null::ExprIsNull;

mod expr_or;
pub use expr_or::ExprOr;

mod id;
pub use id::Id;

mod join;
pub use join::{Join, JoinKind};

mod table_group;
pub use table_group::TableGroup;

mod table_ref;
pub use table_ref::{TableRef, TableSource};

mod ty;
pub use ty::Type;

mod union;
pub use union::{UnionBranch, UnionSelection, UnionSubquery};

mod value;
pub use value::Value;

mod value_record;
pub use value_record::ValueRecord;
