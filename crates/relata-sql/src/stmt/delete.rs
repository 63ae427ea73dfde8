use super::{Filter, Join, TableRef};

#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    pub table: TableRef,

    /// Only produced for flavors that support joined deletes
    pub joins: Vec<Join>,

    pub filter: Filter,
}
