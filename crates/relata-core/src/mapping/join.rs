use crate::stmt::{JoinKind, PropertyPath};

/// A join implied by the mapping: a relationship followed eagerly, a scalar
/// lookup, or a bridge table on the way to a many-to-many child.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinMapping {
    /// Relationship property the join serves
    pub path: PropertyPath,

    pub alias: String,

    pub table: String,

    pub kind: JoinKind,

    /// Column pairs ANDed together in the `ON` clause
    pub on: Vec<JoinColumns>,
}

/// `alias.target_column = source_alias.source_column`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinColumns {
    pub source_alias: String,
    pub source_column: String,
    pub target_column: String,
}
