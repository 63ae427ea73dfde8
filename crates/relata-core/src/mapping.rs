//! Resolved mapping metadata: the provider's raw facts merged with
//! configuration overrides and walked across the whole reachable object
//! graph.

mod collection;
pub use collection::MappingCollection;

mod column;
pub use column::ColumnMapping;

mod join;
pub use join::{JoinColumns, JoinMapping};

mod property;
pub use property::PropertyMapping;

mod relationship;
pub use relationship::{Bridge, KeyColumn, RelationshipMapping, ScalarJoin};

mod resolver;
pub use resolver::MappingResolver;

mod table;
pub use table::TableMapping;

/// Prefix of the alias given to every joined table.
pub const JOIN_ALIAS_PREFIX: &str = "obj_alias_";

/// Alias of the table reached through the relationship at `path`.
pub fn join_alias(path: &[String]) -> String {
    format!("{JOIN_ALIAS_PREFIX}{}", path.join("_"))
}

/// Result column alias of the property at `path`.
pub fn column_alias(path: &[String]) -> String {
    path.join("__")
}
