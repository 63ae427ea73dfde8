use crate::{
    schema::RelationshipKind,
    stmt::{Direction, JoinKind},
};

/// Resolved relationship of a property.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipMapping {
    pub kind: RelationshipKind,

    pub child_class: String,

    pub mapped_by: Option<String>,

    /// Columns on this side of the join. The foreign key for the owning side
    /// of a to-one, otherwise this class's key.
    pub source_columns: Vec<String>,

    /// Matching columns on the child table
    pub target_columns: Vec<String>,

    pub child_table: Option<String>,

    pub bridge: Option<Bridge>,

    pub scalar: Option<ScalarJoin>,

    pub join_kind: JoinKind,

    /// The fetch policy asks for deferred loading
    pub lazy: bool,

    pub cascade_deletes: bool,

    pub orphan_removal: bool,

    pub embedded: bool,

    pub order_by: Vec<(String, Direction)>,

    /// Child properties identified by `target_columns`, used to build the
    /// filter of a deferred load
    pub target_key: Vec<KeyColumn>,

    /// A to-many collection that is loaded as soon as its parent is
    /// hydrated
    pub load_immediately: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bridge {
    pub table: String,

    /// Bridge column referencing this class
    pub source_column: String,

    /// Bridge column referencing the child class
    pub target_column: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarJoin {
    pub table: String,
    pub value_column: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyColumn {
    pub property: String,
    pub column: String,
}

impl RelationshipMapping {
    pub fn is_to_many(&self) -> bool {
        self.kind.is_to_many()
    }

    /// The foreign key lives on this side.
    pub fn is_owning(&self) -> bool {
        !self.is_to_many() && self.mapped_by.is_none() && !self.embedded && self.scalar.is_none()
    }

    pub fn is_scalar_join(&self) -> bool {
        self.scalar.is_some()
    }
}
