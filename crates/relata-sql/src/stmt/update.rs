use super::{ColumnRef, Expr, Filter, Join, TableRef};

#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub table: TableRef,

    /// Only produced for flavors that support joined updates
    pub joins: Vec<Join>,

    pub assignments: Vec<(ColumnRef, Expr)>,

    pub filter: Filter,
}
