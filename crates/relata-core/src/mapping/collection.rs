use super::{JoinMapping, PropertyMapping, TableMapping};
use crate::stmt::PropertyPath;

use indexmap::IndexMap;

/// Every property mapping reachable from one class under one configuration.
///
/// Owned by the resolver's cache; consumers only borrow it.
#[derive(Debug, Clone)]
pub struct MappingCollection {
    pub(super) class_name: String,

    pub(super) table: TableMapping,

    /// Keyed by the dotted property path
    pub(super) properties: IndexMap<String, PropertyMapping>,

    pub(super) joins: Vec<JoinMapping>,

    /// Class at each mapped object path, keyed by the dotted path of the
    /// owning object (empty for the root)
    pub(super) classes: IndexMap<String, String>,

    pub(super) config_hash: u64,
}

impl MappingCollection {
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn table(&self) -> &TableMapping {
        &self.table
    }

    pub fn config_hash(&self) -> u64 {
        self.config_hash
    }

    pub fn property(&self, path: &PropertyPath) -> Option<&PropertyMapping> {
        self.properties.get(&path.to_string())
    }

    pub fn property_by_name(&self, path: &str) -> Option<&PropertyMapping> {
        self.properties.get(path)
    }

    pub fn properties(&self) -> impl Iterator<Item = &PropertyMapping> {
        self.properties.values()
    }

    /// Properties of the object reached at `parents`, in slot order.
    pub fn properties_of<'a>(
        &'a self,
        parents: &'a [String],
    ) -> impl Iterator<Item = &'a PropertyMapping> + 'a {
        self.properties
            .values()
            .filter(move |prop| prop.parents == parents && !prop.key_only)
    }

    /// Primary key properties of the object reached at `parents`.
    pub fn primary_key_of<'a>(&'a self, parents: &'a [String]) -> Vec<&'a PropertyMapping> {
        self.properties_of(parents)
            .filter(|prop| prop.is_primary_key())
            .collect()
    }

    pub fn primary_key(&self) -> Vec<&PropertyMapping> {
        self.primary_key_of(&[])
    }

    pub fn primary_key_paths(&self) -> Vec<PropertyPath> {
        self.primary_key().iter().map(|prop| prop.path()).collect()
    }

    /// Paths selected when a query names no fields.
    pub fn fetchable_paths(&self) -> Vec<PropertyPath> {
        self.properties
            .values()
            .filter(|prop| prop.fetchable)
            .map(PropertyMapping::path)
            .collect()
    }

    /// Joins in dependency order: a join never references an alias
    /// introduced after it.
    pub fn joins(&self) -> &[JoinMapping] {
        &self.joins
    }

    pub fn join_by_alias(&self, alias: &str) -> Option<&JoinMapping> {
        self.joins.iter().find(|join| join.alias == alias)
    }

    /// Class of the object reached at `parents`.
    pub fn class_at(&self, parents: &[String]) -> Option<&str> {
        self.classes.get(&parents.join(".")).map(String::as_str)
    }

    /// Returns `true` if the object at `parents` was walked. Late-bound
    /// children only appear through their key properties.
    pub fn is_mapped(&self, parents: &[String]) -> bool {
        self.classes.contains_key(&parents.join("."))
    }

    /// Properties with a relationship, at any depth.
    pub fn relationships(&self) -> impl Iterator<Item = &PropertyMapping> {
        self.properties
            .values()
            .filter(|prop| prop.relationship.is_some())
    }

    /// Longest chain of relationship hops below the root.
    pub fn max_depth(&self) -> usize {
        self.properties
            .values()
            .filter(|prop| !prop.key_only)
            .map(PropertyMapping::depth)
            .max()
            .unwrap_or(0)
    }
}
