use super::{ColumnMapping, RelationshipMapping};
use crate::stmt::{PropertyPath, Type, Value};

/// Resolved metadata for one property at one position in the object graph.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyMapping {
    /// Class the property belongs to at this position
    pub class_name: String,

    /// Class in the hierarchy that declares the property
    pub declaring_class: String,

    pub name: String,

    /// Property path leading to the owning object
    pub parents: Vec<String>,

    /// Position in the owning class's property layout
    pub slot: usize,

    pub ty: Type,

    pub nullable: bool,

    pub default: Value,

    pub column: Option<ColumnMapping>,

    pub relationship: Option<RelationshipMapping>,

    /// Alias of the table holding `column`
    pub table_alias: String,

    pub groups: Vec<String>,

    /// The related value is loaded by a deferred query rather than from the
    /// same row
    pub late_bound: bool,

    /// Inverse of the relationship the owning object was reached through
    pub points_to_parent: bool,

    /// Key of a late-bound child, read from this side's foreign key
    pub key_only: bool,

    /// Selected by default
    pub fetchable: bool,
}

impl PropertyMapping {
    pub fn path(&self) -> PropertyPath {
        PropertyPath::from_parts(self.parents.iter().cloned().chain([self.name.clone()]))
    }

    /// Result column alias, e.g. `parent__name`.
    pub fn column_alias(&self) -> String {
        let mut parts = self.parents.clone();
        parts.push(self.name.clone());
        super::column_alias(&parts)
    }

    pub fn column_name(&self) -> Option<&str> {
        self.column.as_ref().map(|column| column.name.as_str())
    }

    pub fn is_primary_key(&self) -> bool {
        self.column.as_ref().is_some_and(|column| column.primary_key)
    }

    /// The database owns the value.
    pub fn is_read_only(&self) -> bool {
        self.column.as_ref().is_some_and(|column| column.read_only)
            || self
                .relationship
                .as_ref()
                .is_some_and(RelationshipMapping::is_scalar_join)
    }

    /// A plain value stored in a column of the owning object's table.
    pub fn is_scalar(&self) -> bool {
        self.relationship.is_none() && self.column.is_some() && !self.key_only
    }

    /// Hydrated as a plain value: a scalar or the value of a scalar join.
    pub fn holds_value(&self) -> bool {
        self.column.is_some()
            && !self.key_only
            && self
                .relationship
                .as_ref()
                .map_or(true, RelationshipMapping::is_scalar_join)
    }

    pub fn depth(&self) -> usize {
        self.parents.len()
    }
}
