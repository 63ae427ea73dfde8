//! Writes entities and the entities they hold, in foreign key order.

use crate::{unbinder, EntityKey, EntityRef, Orm, PropertyValue, Result, Unbinder};

use indexmap::IndexMap;
use relata_core::{
    mapping::{MappingCollection, PropertyMapping},
    stmt::{
        Assignments, CriteriaExpression, CriteriaList, CriteriaValue, DeleteQuery, InsertQuery,
        PropertyPath, Query, UpdateQuery, Value,
    },
    Config, Error,
};

pub(crate) struct Persister<'a> {
    orm: &'a Orm,
    config: &'a Config,

    /// Entities already written or deleted by this persister
    visited: Vec<usize>,
}

impl<'a> Persister<'a> {
    pub(crate) fn new(orm: &'a Orm, config: &'a Config) -> Self {
        Self {
            orm,
            config,
            visited: vec![],
        }
    }

    /// Save `entity`. Entities it points at through a foreign key are saved
    /// before it, entities pointing back at it after. Returns the number of
    /// rows written.
    pub(crate) fn save(&mut self, entity: &EntityRef) -> Result<u64> {
        if !self.visit(entity) {
            return Ok(0);
        }

        let mapping = self
            .orm
            .resolver()
            .resolve(&entity.class_name(), self.config)?;
        let mut affected = 0;

        for prop in relationships(&mapping) {
            let Some(relationship) = &prop.relationship else { continue };
            if !relationship.is_owning() {
                continue;
            }

            let child = entity.borrow().get(&prop.name).and_then(|value| value.as_entity().cloned());
            if let Some(child) = child {
                affected += self.save(&child)?;
            }
        }

        affected += self.write(entity, &mapping)?;

        for prop in relationships(&mapping) {
            let Some(relationship) = &prop.relationship else { continue };
            if relationship.is_owning() {
                continue;
            }

            let slot = entity.borrow().get(&prop.name).cloned();
            let members = match slot {
                Some(PropertyValue::Collection(members)) => members,
                Some(PropertyValue::Entity(Some(child))) => vec![child],
                Some(PropertyValue::Entity(None)) => vec![],
                _ => continue,
            };

            for member in &members {
                if let Some(mapped_by) = &relationship.mapped_by {
                    point_at(member, mapped_by, entity);
                }
                affected += self.save(member)?;
            }

            if relationship.orphan_removal {
                affected += self.remove_orphans(entity, &prop.name, &members)?;
            }

            if relationship.is_to_many() {
                self.orm
                    .tracker_mut()
                    .remember_collection(entity, &prop.name, members);
            }
        }

        Ok(affected)
    }

    /// Delete `entity`. Children of cascading relationships that point back
    /// at it go first; a cascading foreign key target goes after it.
    pub(crate) fn delete(&mut self, entity: &EntityRef) -> Result<u64> {
        if !self.visit(entity) {
            return Ok(0);
        }

        let class_name = entity.class_name();
        let mapping = self.orm.resolver().resolve(&class_name, self.config)?;

        let mut affected = 0;
        let mut after = vec![];

        for prop in relationships(&mapping) {
            let Some(relationship) = &prop.relationship else { continue };
            if !relationship.cascade_deletes {
                continue;
            }

            let children = self.children(entity, &prop.name)?;

            if relationship.is_owning() {
                after.extend(children);
            } else {
                for child in &children {
                    affected += self.delete(child)?;
                }
            }
        }

        let primary_key = Unbinder::new(&mapping).primary_key(&entity.borrow());
        if primary_key.is_empty() || primary_key.iter().any(Value::is_null) {
            return Err(Error::query(format!(
                "`{class_name}` cannot be deleted without a primary key"
            )));
        }

        let mut query = DeleteQuery::new(&class_name);
        query.base.criteria = key_criteria(&mapping, &primary_key)?;
        affected += self.run(query.into())?;

        self.orm.tracker_mut().forget(entity);
        tracing::trace!(class = %class_name, "entity deleted");

        for child in &after {
            affected += self.delete(child)?;
        }

        Ok(affected)
    }

    /// Insert or update the entity's own row, then track it.
    fn write(&self, entity: &EntityRef, mapping: &MappingCollection) -> Result<u64> {
        let class_name = entity.class_name();
        let unbinder = Unbinder::new(mapping);

        let primary_key = unbinder.primary_key(&entity.borrow());
        let has_key = !primary_key.is_empty() && primary_key.iter().all(|value| !value.is_null());

        let (tracked, snapshot) = {
            let tracker = self.orm.tracker();
            (tracker.is_tracked(entity), tracker.snapshot(entity).cloned())
        };

        let affected = if tracked && has_key {
            let changes =
                unbinder.changed_columns(&entity.borrow(), snapshot.as_ref(), Some(&primary_key));

            if changes.is_empty() {
                tracing::trace!(class = %class_name, "entity unchanged; nothing to update");
                return Ok(0);
            }

            let mut query = UpdateQuery::new(&class_name);
            query.assignments = self.assignments(mapping, changes);
            query.base.criteria = key_criteria(mapping, &primary_key)?;
            self.run(query.into())?
        } else {
            let key_paths = mapping.primary_key_paths();
            let mut columns = unbinder.changed_columns(&entity.borrow(), None, None);
            columns.retain(|path, value| !(value.is_null() && key_paths.contains(path)));

            let mut query = InsertQuery::new(&class_name);
            query.assignments = self.assignments(mapping, columns);
            query.on_duplicate_key_update = has_key;
            let affected = self.run(query.into())?;

            if !has_key {
                self.assign_generated_key(entity, mapping);
            }
            affected
        };

        self.track(entity, mapping);
        Ok(affected)
    }

    /// Set a single generated primary key from the storage's last insert id.
    fn assign_generated_key(&self, entity: &EntityRef, mapping: &MappingCollection) {
        let [prop] = &mapping.primary_key()[..] else {
            return;
        };

        let Some(id) = self.orm.storage().last_insert_id() else {
            tracing::trace!(class = %prop.class_name, "no generated key after insert");
            return;
        };

        let id = self
            .orm
            .type_handler()
            .to_object_value(&id, &prop.ty, None, false)
            .unwrap_or(id);

        entity.borrow_mut().set(&prop.name, id);
    }

    fn track(&self, entity: &EntityRef, mapping: &MappingCollection) {
        if self.config.disable_entity_cache {
            return;
        }

        let primary_key = Unbinder::new(mapping).primary_key(&entity.borrow());
        if primary_key.is_empty() || primary_key.iter().any(Value::is_null) {
            return;
        }

        let snapshot = unbinder::snapshot(&entity.borrow(), mapping, &[]);

        let mut tracker = self.orm.tracker_mut();
        tracker.track(EntityKey::new(mapping.class_name(), &primary_key), entity.clone());
        tracker.set_snapshot(entity, snapshot);
    }

    /// Delete tracked members of `property` that are no longer held.
    fn remove_orphans(
        &mut self,
        entity: &EntityRef,
        property: &str,
        members: &[EntityRef],
    ) -> Result<u64> {
        let previous = self
            .orm
            .tracker()
            .collection(entity, property)
            .map(<[EntityRef]>::to_vec)
            .unwrap_or_default();

        let mut affected = 0;
        for orphan in previous.iter().filter(|member| !members.contains(member)) {
            tracing::trace!(class = %orphan.class_name(), property, "removing orphan");
            affected += self.delete(orphan)?;
        }
        Ok(affected)
    }

    /// Entities held by `property`, loading them when still deferred.
    fn children(&self, entity: &EntityRef, property: &str) -> Result<Vec<EntityRef>> {
        let slot = entity.borrow().get(property).cloned();

        let value = match slot {
            Some(PropertyValue::Deferred(_)) => self.orm.load(entity, property)?,
            Some(value) => value,
            None => return Ok(vec![]),
        };

        Ok(match value {
            PropertyValue::Collection(members) => members,
            PropertyValue::Entity(Some(child)) => vec![child],
            _ => vec![],
        })
    }

    fn assignments(&self, mapping: &MappingCollection, values: IndexMap<PropertyPath, Value>) -> Assignments {
        let handler = self.orm.type_handler();

        values
            .into_iter()
            .map(|(path, value)| {
                let column = mapping.property(&path).and_then(|prop| prop.column.as_ref());

                let value = match column {
                    Some(column) => match handler.to_persistence_value(&value, &column.ty, column.format.as_deref()) {
                        Some(converted) => converted,
                        None => {
                            tracing::trace!(property = %path, value = %value, "value not converted for storage");
                            value
                        }
                    },
                    None => value,
                };

                (path, CriteriaValue::Value(value))
            })
            .collect()
    }

    fn run(&self, mut query: Query) -> Result<u64> {
        let renderer = self.orm.renderer(self.config);
        renderer.finalise(&mut query)?;
        let sql = renderer.render(&query)?;
        self.orm.execute(&sql)
    }

    /// Returns `false` if the entity was already handled.
    fn visit(&mut self, entity: &EntityRef) -> bool {
        let address = entity.address();
        if self.visited.contains(&address) {
            return false;
        }
        self.visited.push(address);
        true
    }
}

/// Root relationships stored outside the entity's own columns.
fn relationships(mapping: &MappingCollection) -> Vec<&PropertyMapping> {
    mapping
        .properties_of(&[])
        .filter(|prop| {
            prop.relationship
                .as_ref()
                .is_some_and(|relationship| !relationship.embedded && !relationship.is_scalar_join())
        })
        .collect()
}

/// Point the inverse property of `member` at `parent`.
fn point_at(member: &EntityRef, property: &str, parent: &EntityRef) {
    let current = member.borrow().get(property).and_then(|value| value.as_entity().cloned());
    if current.as_ref() != Some(parent) {
        member.borrow_mut().set_entity(property, Some(parent.clone()));
    }
}

fn key_criteria(mapping: &MappingCollection, primary_key: &[Value]) -> Result<CriteriaList> {
    let mut criteria = CriteriaList::new();

    for (prop, value) in mapping.primary_key().iter().zip(primary_key) {
        criteria.and(CriteriaExpression::eq(&prop.name, CriteriaValue::Value(value.clone()))?);
    }

    Ok(criteria)
}
