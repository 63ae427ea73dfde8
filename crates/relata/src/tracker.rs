//! Session-level identity map.
//!
//! Every entity hydrated with a primary key is recorded once per
//! `(class, key)`. The binder consults it to hand out the same instance for
//! repeated rows and to break cycles; the unbinder diffs against the
//! snapshot taken when hydration finished.

use crate::{Entity, EntityRef};

use indexmap::IndexMap;
use relata_core::stmt::Value;
use std::{
    collections::{hash_map::DefaultHasher, HashMap},
    hash::{Hash, Hasher},
};

/// Key indexes longer than this are hashed.
const MAX_INDEX_LEN: usize = 64;

/// Identity of a tracked entity: its class and the JSON encoding of its
/// primary key tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityKey {
    pub class_name: String,
    pub index: String,
}

impl EntityKey {
    pub fn new(class_name: impl Into<String>, primary_key: &[Value]) -> Self {
        let json = serde_json::Value::Array(primary_key.iter().map(Value::to_json).collect());
        let mut index = json.to_string();

        if index.len() > MAX_INDEX_LEN {
            let mut hasher = DefaultHasher::new();
            index.hash(&mut hasher);
            index = format!("#{:016x}", hasher.finish());
        }

        Self {
            class_name: class_name.into(),
            index,
        }
    }
}

#[derive(Debug)]
struct Tracked {
    entity: EntityRef,

    /// Shallow copy taken once hydration or a save completed. Missing while
    /// the entity is still being hydrated.
    snapshot: Option<Entity>,

    /// Members of loaded collections, for orphan removal
    collections: IndexMap<String, Vec<EntityRef>>,
}

#[derive(Debug, Default)]
pub struct EntityTracker {
    entries: IndexMap<EntityKey, Tracked>,

    /// Entity address to key
    addresses: HashMap<usize, EntityKey>,

    /// Bumped by every clear
    generation: u64,
}

impl EntityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get(&self, key: &EntityKey) -> Option<EntityRef> {
        self.entries.get(key).map(|tracked| tracked.entity.clone())
    }

    pub fn is_tracked(&self, entity: &EntityRef) -> bool {
        self.addresses.contains_key(&entity.address())
    }

    /// Returns `true` once the entity's snapshot has been taken.
    pub fn is_complete(&self, entity: &EntityRef) -> bool {
        self.entry(entity).is_some_and(|tracked| tracked.snapshot.is_some())
    }

    pub fn key_of(&self, entity: &EntityRef) -> Option<&EntityKey> {
        self.addresses.get(&entity.address())
    }

    /// Start tracking `entity`. An entity tracked under another key (its
    /// primary key changed) moves to the new one.
    pub fn track(&mut self, key: EntityKey, entity: EntityRef) {
        if let Some(previous) = self.addresses.get(&entity.address()).cloned() {
            if previous == key {
                return;
            }

            if let Some(tracked) = self.entries.shift_remove(&previous) {
                self.addresses.insert(entity.address(), key.clone());
                self.entries.insert(key, tracked);
                return;
            }
        }

        if let Some(replaced) = self.entries.get(&key) {
            self.addresses.remove(&replaced.entity.address());
        }

        self.addresses.insert(entity.address(), key.clone());
        self.entries.insert(
            key,
            Tracked {
                entity,
                snapshot: None,
                collections: IndexMap::new(),
            },
        );
    }

    /// Record the state the entity's changes are measured against.
    pub fn set_snapshot(&mut self, entity: &EntityRef, snapshot: Entity) {
        if let Some(tracked) = self.entry_mut(entity) {
            tracked.snapshot = Some(snapshot);
        }
    }

    pub fn snapshot(&self, entity: &EntityRef) -> Option<&Entity> {
        self.entry(entity).and_then(|tracked| tracked.snapshot.as_ref())
    }

    pub fn remember_collection(&mut self, entity: &EntityRef, property: &str, members: Vec<EntityRef>) {
        if let Some(tracked) = self.entry_mut(entity) {
            tracked.collections.insert(property.to_string(), members);
        }
    }

    /// Members of `property` when it was loaded or last saved.
    pub fn collection(&self, entity: &EntityRef, property: &str) -> Option<&[EntityRef]> {
        self.entry(entity)
            .and_then(|tracked| tracked.collections.get(property))
            .map(Vec::as_slice)
    }

    /// Stop tracking one entity.
    pub fn forget(&mut self, entity: &EntityRef) {
        if let Some(key) = self.addresses.remove(&entity.address()) {
            self.entries.shift_remove(&key);
        }
    }

    /// Forget every entity, or every entity of one class.
    pub fn clear(&mut self, class_name: Option<&str>) {
        match class_name {
            None => {
                self.entries.clear();
                self.addresses.clear();
            }
            Some(class_name) => {
                self.entries.retain(|key, _| key.class_name != class_name);
                self.addresses.retain(|_, key| key.class_name != class_name);
            }
        }

        self.generation += 1;
        tracing::trace!(class = ?class_name, generation = self.generation, "entity cache cleared");
    }

    fn entry(&self, entity: &EntityRef) -> Option<&Tracked> {
        let key = self.addresses.get(&entity.address())?;
        self.entries.get(key)
    }

    fn entry_mut(&mut self, entity: &EntityRef) -> Option<&mut Tracked> {
        let key = self.addresses.get(&entity.address())?;
        self.entries.get_mut(key)
    }
}
