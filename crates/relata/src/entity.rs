//! Hydrated objects.
//!
//! An [`Entity`] is a class name plus one slot per mapped property. Entities
//! are shared through [`EntityRef`] so that the same row always hydrates to
//! the same instance within a session.

mod deferred;
pub use deferred::Deferred;

use indexmap::IndexMap;
use relata_core::stmt::Value;
use std::{
    cell::{Ref, RefCell, RefMut},
    fmt,
    rc::{Rc, Weak},
};

/// State of one property slot.
#[derive(Clone, Default)]
pub enum PropertyValue {
    /// Never populated
    #[default]
    Unset,

    /// A scalar value, or the value of a scalar join
    Value(Value),

    /// A loaded to-one relationship. `None` when there is no related object.
    Entity(Option<EntityRef>),

    /// A loaded to-many relationship
    Collection(Vec<EntityRef>),

    /// A relationship that loads on first access
    Deferred(Deferred),
}

impl PropertyValue {
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }

    /// Returns `true` unless the slot is unset or still deferred.
    pub fn is_loaded(&self) -> bool {
        !self.is_unset() && !self.is_deferred()
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<&EntityRef> {
        match self {
            Self::Entity(entity) => entity.as_ref(),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&[EntityRef]> {
        match self {
            Self::Collection(items) => Some(items),
            _ => None,
        }
    }
}

impl From<Value> for PropertyValue {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<EntityRef> for PropertyValue {
    fn from(entity: EntityRef) -> Self {
        Self::Entity(Some(entity))
    }
}

impl From<Vec<EntityRef>> for PropertyValue {
    fn from(items: Vec<EntityRef>) -> Self {
        Self::Collection(items)
    }
}

impl fmt::Debug for PropertyValue {
    // Related entities print by identity only; the graph may be cyclic.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => f.write_str("Unset"),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Entity(None) => f.write_str("Entity(None)"),
            Self::Entity(Some(entity)) => write!(f, "Entity({entity:?})"),
            Self::Collection(items) => f.debug_tuple("Collection").field(items).finish(),
            Self::Deferred(deferred) => fmt::Debug::fmt(deferred, f),
        }
    }
}

/// An object of a mapped class.
#[derive(Debug, Clone)]
pub struct Entity {
    class_name: String,
    properties: IndexMap<String, PropertyValue>,
}

impl Entity {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            properties: IndexMap::new(),
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// Scalar value of `name`, if it holds one.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.get(name).and_then(PropertyValue::as_value)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.properties
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Set a scalar property.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        self.set_property(name, PropertyValue::Value(value.into()));
    }

    pub fn set_property(&mut self, name: &str, value: PropertyValue) {
        self.properties.insert(name.to_string(), value);
    }

    /// Point a to-one relationship at `entity`, or clear it.
    pub fn set_entity(&mut self, name: &str, entity: Option<EntityRef>) {
        self.set_property(name, PropertyValue::Entity(entity));
    }

    /// Append to a to-many relationship. A slot that does not hold a loaded
    /// collection yet starts an empty one.
    pub fn push(&mut self, name: &str, entity: EntityRef) {
        match self.properties.get_mut(name) {
            Some(PropertyValue::Collection(items)) => items.push(entity),
            _ => self.set_property(name, PropertyValue::Collection(vec![entity])),
        }
    }

    /// Remove `entity` from a loaded to-many relationship.
    pub fn remove(&mut self, name: &str, entity: &EntityRef) -> bool {
        let Some(PropertyValue::Collection(items)) = self.properties.get_mut(name) else {
            return false;
        };

        let len = items.len();
        items.retain(|item| item != entity);
        items.len() != len
    }
}

/// Shared handle to an [`Entity`]. Equality is identity.
#[derive(Clone)]
pub struct EntityRef(Rc<RefCell<Entity>>);

/// Non-owning handle, held by deferred loads that point back at their parent.
#[derive(Clone)]
pub struct WeakEntityRef(Weak<RefCell<Entity>>);

impl EntityRef {
    pub fn new(entity: Entity) -> Self {
        Self(Rc::new(RefCell::new(entity)))
    }

    pub fn borrow(&self) -> Ref<'_, Entity> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, Entity> {
        self.0.borrow_mut()
    }

    pub fn class_name(&self) -> String {
        self.borrow().class_name.clone()
    }

    pub fn value(&self, name: &str) -> Option<Value> {
        self.borrow().value(name).cloned()
    }

    pub fn set(&self, name: &str, value: impl Into<Value>) {
        self.borrow_mut().set(name, value);
    }

    pub fn downgrade(&self) -> WeakEntityRef {
        WeakEntityRef(Rc::downgrade(&self.0))
    }

    /// Address of the shared instance; stable for as long as any handle
    /// lives.
    pub fn address(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

impl WeakEntityRef {
    pub fn upgrade(&self) -> Option<EntityRef> {
        self.0.upgrade().map(EntityRef)
    }
}

impl From<Entity> for EntityRef {
    fn from(entity: Entity) -> Self {
        Self::new(entity)
    }
}

impl PartialEq for EntityRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for EntityRef {}

impl fmt::Debug for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(entity) => write!(f, "{}@{:#x}", entity.class_name, self.address()),
            Err(_) => write!(f, "<borrowed>@{:#x}", self.address()),
        }
    }
}

impl fmt::Debug for WeakEntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(entity) => write!(f, "Weak({entity:?})"),
            None => f.write_str("Weak(<dropped>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_equality() {
        let a = EntityRef::new(Entity::new("Contact"));
        let b = EntityRef::new(Entity::new("Contact"));

        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn push_starts_a_collection() {
        let mut contact = Entity::new("Contact");
        let order = EntityRef::new(Entity::new("Order"));

        contact.push("orders", order.clone());
        assert_eq!(contact.get("orders").and_then(PropertyValue::as_collection), Some(&[order.clone()][..]));

        assert!(contact.remove("orders", &order));
        assert!(!contact.remove("orders", &order));
    }

    #[test]
    fn debug_does_not_follow_cycles() {
        let parent = EntityRef::new(Entity::new("Contact"));
        let child = EntityRef::new(Entity::new("Order"));
        child.borrow_mut().set_entity("contact", Some(parent.clone()));
        parent.borrow_mut().push("orders", child.clone());

        let out = format!("{:?}", parent.borrow());
        assert!(out.contains("Order@"), "{out}");
    }

    #[test]
    fn weak_handles_do_not_keep_entities_alive() {
        let entity = EntityRef::new(Entity::new("Contact"));
        let weak = entity.downgrade();
        assert_eq!(weak.upgrade(), Some(entity.clone()));

        drop(entity);
        assert!(weak.upgrade().is_none());
    }
}
