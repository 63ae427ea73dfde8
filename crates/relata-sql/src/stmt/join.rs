use super::{Condition, Filter};

use relata_core::stmt::JoinKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub name: String,

    /// Omitted when it equals the table name
    pub alias: Option<String>,
}

impl TableRef {
    pub fn new(name: impl Into<String>, alias: impl Into<String>) -> Self {
        let name = name.into();
        let alias = alias.into();

        Self {
            alias: (alias != name).then_some(alias),
            name,
        }
    }

    /// Name the table is referenced by in other clauses.
    pub fn reference(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub kind: JoinKind,

    pub table: TableRef,

    /// ANDed together
    pub on: Vec<Condition>,

    pub extra: Filter,
}
