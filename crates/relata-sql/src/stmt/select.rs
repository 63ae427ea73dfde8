use super::{Expr, Filter, Join, TableRef};

use relata_core::stmt::Direction;

#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub fields: Vec<SelectItem>,

    pub source: Source,

    /// Anti-join keeping only the latest record per group. Rendered ahead of
    /// the other joins.
    pub latest: Option<Join>,

    pub joins: Vec<Join>,

    pub filter: Filter,

    pub group_by: Vec<Expr>,

    pub having: Filter,

    pub order_by: Vec<(Expr, Direction)>,

    pub limit: Option<u64>,

    pub offset: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    pub expr: Expr,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Table(TableRef),

    /// `(SELECT ..) AS alias`
    Subquery(Box<Select>, String),
}

impl Select {
    pub fn new(source: Source) -> Self {
        Self {
            fields: vec![],
            source,
            latest: None,
            joins: vec![],
            filter: Filter::new(),
            group_by: vec![],
            having: Filter::new(),
            order_by: vec![],
            limit: None,
            offset: None,
        }
    }
}
