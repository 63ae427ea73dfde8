//! Dehydration: from an entity back to column assignments.

use crate::{Entity, EntityRef, PropertyValue};

use indexmap::IndexMap;
use relata_core::{
    mapping::MappingCollection,
    stmt::{PropertyPath, Value},
};

/// Computes the assignments needed to persist an entity of one class.
#[derive(Debug)]
pub struct Unbinder<'a> {
    mapping: &'a MappingCollection,
}

impl<'a> Unbinder<'a> {
    /// `mapping` must be the mapping of the entity's own class.
    pub fn new(mapping: &'a MappingCollection) -> Self {
        Self { mapping }
    }

    /// Writable values that differ from `snapshot`.
    ///
    /// With no snapshot the entity is unknown and every writable value is
    /// returned. When `known_primary_key` is given, the row is identified by
    /// it and primary key properties are left out.
    pub fn changed_columns(
        &self,
        entity: &Entity,
        snapshot: Option<&Entity>,
        known_primary_key: Option<&[Value]>,
    ) -> IndexMap<PropertyPath, Value> {
        let mut current = self.columns(entity);

        if let Some(snapshot) = snapshot {
            let previous = self.columns(snapshot);
            current.retain(|path, value| previous.get(path) != Some(&*value));
        }

        if known_primary_key.is_some() {
            let keys = self.mapping.primary_key_paths();
            current.retain(|path, _| !keys.contains(path));
        }

        current
    }

    /// Every writable value of `entity`, by property path.
    pub fn columns(&self, entity: &Entity) -> IndexMap<PropertyPath, Value> {
        let mut ret = IndexMap::new();
        self.collect(entity, &[], &mut ret);
        ret
    }

    /// Current primary key values, in key order.
    pub fn primary_key(&self, entity: &Entity) -> Vec<Value> {
        self.mapping
            .primary_key()
            .iter()
            .map(|prop| entity.value(&prop.name).cloned().unwrap_or_default())
            .collect()
    }

    fn collect(&self, entity: &Entity, parents: &[String], dst: &mut IndexMap<PropertyPath, Value>) {
        for prop in self.mapping.properties_of(parents) {
            if prop.is_read_only() {
                continue;
            }

            let path = prop.path();
            let slot = entity.get(&prop.name);

            let Some(relationship) = &prop.relationship else {
                if prop.column.is_some() {
                    if let Some(PropertyValue::Value(value)) = slot {
                        dst.insert(path, value.clone());
                    }
                }
                continue;
            };

            if relationship.embedded {
                if let Some(PropertyValue::Entity(Some(embedded))) = slot {
                    let mut nested = parents.to_vec();
                    nested.push(prop.name.clone());
                    self.collect(&embedded.borrow(), &nested, dst);
                }
                continue;
            }

            if !relationship.is_owning() {
                continue;
            }

            let keys: Vec<Value> = match slot {
                Some(PropertyValue::Entity(Some(child))) => {
                    let child = child.borrow();
                    relationship
                        .target_key
                        .iter()
                        .map(|key| child.value(&key.property).cloned().unwrap_or_default())
                        .collect()
                }
                Some(PropertyValue::Entity(None)) => vec![Value::Null; relationship.target_key.len()],
                Some(PropertyValue::Deferred(deferred)) => deferred.keys().to_vec(),
                _ => continue,
            };

            for (key, value) in relationship.target_key.iter().zip(keys) {
                if !key.property.is_empty() {
                    dst.insert(path.child(&key.property), value);
                }
            }
        }
    }
}

/// Copy of `entity` to diff later changes against. Related entities are
/// shared with the original, except embedded values which are copied since
/// they are stored in the entity's own row.
pub(crate) fn snapshot(entity: &Entity, mapping: &MappingCollection, parents: &[String]) -> Entity {
    let mut ret = entity.clone();

    for prop in mapping.properties_of(parents) {
        let embedded = prop.relationship.as_ref().is_some_and(|r| r.embedded);
        if !embedded {
            continue;
        }

        if let Some(PropertyValue::Entity(Some(value))) = entity.get(&prop.name) {
            let mut nested = parents.to_vec();
            nested.push(prop.name.clone());

            let copy = snapshot(&value.borrow(), mapping, &nested);
            ret.set_entity(&prop.name, Some(EntityRef::new(copy)));
        }
    }

    ret
}
