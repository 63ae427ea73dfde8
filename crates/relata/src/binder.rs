use crate::{
    entity::Deferred, unbinder, EntityKey, EntityRef, Orm, PropertyValue, Result, Row,
};

use indexmap::IndexMap;
use relata_core::{
    mapping::{MappingCollection, PropertyMapping, RelationshipMapping},
    stmt::{
        CriteriaExpression, CriteriaList, FieldExpression, JoinExpression, JoinKind, Operator,
        OrderByExpr, PropertyPath, Value,
    },
    Config, Error,
};

/// Alias of the bridge table joined by a many-to-many load.
const BRIDGE_ALIAS: &str = "bridge";

/// Hydrates result rows into entities.
pub(crate) struct Binder<'a> {
    orm: &'a Orm,
    mapping: &'a MappingCollection,
    config: &'a Config,

    /// Values of root properties the caller already holds
    known: &'a IndexMap<String, PropertyValue>,
}

impl<'a> Binder<'a> {
    pub(crate) fn new(
        orm: &'a Orm,
        mapping: &'a MappingCollection,
        config: &'a Config,
        known: &'a IndexMap<String, PropertyValue>,
    ) -> Self {
        Self {
            orm,
            mapping,
            config,
            known,
        }
    }

    /// One root entity per distinct row identity, in row order.
    pub(crate) fn bind_rows(&self, rows: &[Row]) -> Result<Vec<EntityRef>> {
        let mut ret: Vec<EntityRef> = vec![];

        for row in rows {
            if let Some(entity) = self.bind(row, &[], None)? {
                if !ret.contains(&entity) {
                    ret.push(entity);
                }
            }
        }

        Ok(ret)
    }

    /// Hydrate the object at `parents` from `row`. Returns `None` when the
    /// row carries no key for it (an unmatched outer join).
    pub(crate) fn bind(
        &self,
        row: &Row,
        parents: &[String],
        parent: Option<&EntityRef>,
    ) -> Result<Option<EntityRef>> {
        let Some(class_name) = self.mapping.class_at(parents) else {
            return Err(Error::mapping(
                self.mapping.class_name(),
                Some(&parents.join(".")),
                "no mapping for the object at this path",
            ));
        };

        let primary_key: Vec<Value> = self
            .mapping
            .primary_key_of(parents)
            .iter()
            .map(|prop| self.key_value(row, prop))
            .collect();

        let has_key = !primary_key.is_empty() && primary_key.iter().all(|value| !value.is_null());

        if !has_key && !parents.is_empty() && !primary_key.is_empty() {
            return Ok(None);
        }

        let key = (has_key && !self.config.disable_entity_cache)
            .then(|| EntityKey::new(class_name, &primary_key));

        if let Some(key) = &key {
            let existing = self.orm.tracker().get(key);
            if let Some(existing) = existing {
                tracing::trace!(class = class_name, key = %key.index, "entity cache hit");
                return Ok(Some(existing));
            }
        }

        let entity = EntityRef::new(self.orm.create_entity(class_name)?);
        self.populate_scalars(row, parents, &entity);

        // Children that point back at this row must find it
        if let Some(key) = &key {
            self.orm.tracker_mut().track(key.clone(), entity.clone());
        }

        self.populate_relationships(row, parents, &entity, parent)?;

        if key.is_some() {
            let snapshot = unbinder::snapshot(&entity.borrow(), self.mapping, parents);
            self.orm.tracker_mut().set_snapshot(&entity, snapshot);
        }

        Ok(Some(entity))
    }

    fn populate_scalars(&self, row: &Row, parents: &[String], entity: &EntityRef) {
        let handler = self.orm.type_handler();

        for prop in self.mapping.properties_of(parents) {
            if !prop.holds_value() {
                continue;
            }

            let Some(column) = &prop.column else { continue };
            let Some(raw) = row.get(&prop.column_alias()) else {
                continue;
            };

            let stored = column.map_stored(raw).unwrap_or(raw);

            match handler.to_object_value(stored, &prop.ty, column.format.as_deref(), prop.nullable) {
                Some(value) => entity.borrow_mut().set(&prop.name, value),
                None => tracing::trace!(
                    class = %prop.class_name,
                    property = %prop.name,
                    value = %stored,
                    ty = %prop.ty,
                    "value not converted; keeping the default"
                ),
            }
        }
    }

    fn populate_relationships(
        &self,
        row: &Row,
        parents: &[String],
        entity: &EntityRef,
        parent: Option<&EntityRef>,
    ) -> Result<()> {
        for prop in self.mapping.properties_of(parents) {
            let Some(relationship) = &prop.relationship else {
                continue;
            };

            if relationship.is_scalar_join() {
                continue;
            }

            let mut path = parents.to_vec();
            path.push(prop.name.clone());

            let known = parents
                .is_empty()
                .then(|| self.known.get(&prop.name))
                .flatten();

            let value = match known {
                Some(value) => value.clone(),
                None if prop.points_to_parent => match parent {
                    Some(parent) => PropertyValue::Entity(Some(parent.clone())),
                    None => continue,
                },
                None if prop.late_bound => self.deferred(row, parents, prop, relationship, entity)?,
                None if self.mapping.is_mapped(&path) => {
                    PropertyValue::Entity(self.bind(row, &path, Some(entity))?)
                }
                None => continue,
            };

            if let PropertyValue::Collection(members) = &value {
                self.orm
                    .tracker_mut()
                    .remember_collection(entity, &prop.name, members.clone());
            }

            entity.borrow_mut().set_property(&prop.name, value);
        }

        Ok(())
    }

    /// The deferred load of a late-bound relationship, run straight away
    /// when the relationship asks to be loaded with its parent.
    fn deferred(
        &self,
        row: &Row,
        parents: &[String],
        prop: &PropertyMapping,
        relationship: &RelationshipMapping,
        entity: &EntityRef,
    ) -> Result<PropertyValue> {
        let mut deferred = Deferred {
            class_name: relationship.child_class.clone(),
            criteria: CriteriaList::new(),
            joins: vec![],
            order_by: vec![],
            to_many: relationship.is_to_many(),
            keys: vec![],
            inverse: None,
            config: self.config.clone(),
            generation: self.orm.tracker().generation(),
        };

        for (property, direction) in &relationship.order_by {
            let field = FieldExpression::Property(PropertyPath::parse(property)?);
            deferred.order_by.push(OrderByExpr::new(field, *direction));
        }

        if relationship.is_owning() {
            let keys = self.foreign_key(row, prop);
            if keys.iter().all(Value::is_null) {
                return Ok(PropertyValue::Entity(None));
            }

            for (key, value) in relationship.target_key.iter().zip(&keys) {
                if key.property.is_empty() {
                    continue;
                }
                deferred
                    .criteria
                    .and(CriteriaExpression::eq(&key.property, value.clone())?);
            }
            deferred.keys = keys;
        } else {
            let Some(own_key) = self.own_key(row, parents, relationship) else {
                return Ok(PropertyValue::Unset);
            };

            if let Some(bridge) = &relationship.bridge {
                let Some(child_key) = relationship.target_key.first() else {
                    return Err(Error::mapping(
                        &prop.class_name,
                        Some(&prop.name),
                        "many-to-many child has no key property",
                    ));
                };

                deferred.joins.push(
                    JoinExpression::table(&bridge.table, BRIDGE_ALIAS, JoinKind::Inner).on(
                        PropertyPath::parse(&child_key.property)?,
                        Operator::Eq,
                        PropertyPath::from_parts([BRIDGE_ALIAS, bridge.target_column.as_str()]),
                    ),
                );

                let source = format!("{BRIDGE_ALIAS}.{}", bridge.source_column);
                for (_, value) in &own_key {
                    deferred
                        .criteria
                        .and(CriteriaExpression::eq(&source, value.clone())?);
                }
            } else if let Some(mapped_by) = &relationship.mapped_by {
                if let [(_, value)] = &own_key[..] {
                    deferred
                        .criteria
                        .and(CriteriaExpression::eq(mapped_by, value.clone())?);
                } else {
                    for (name, value) in &own_key {
                        deferred
                            .criteria
                            .and(CriteriaExpression::eq(&format!("{mapped_by}.{name}"), value.clone())?);
                    }
                }

                deferred.inverse = Some((mapped_by.clone(), entity.downgrade()));
            }
        }

        if relationship.load_immediately {
            return deferred.load(self.orm);
        }

        Ok(PropertyValue::Deferred(deferred))
    }

    /// A key column of `row` in the property's own type, so keys read from
    /// storage compare equal to keys assigned in memory.
    fn key_value(&self, row: &Row, prop: &PropertyMapping) -> Value {
        let Some(raw) = row.get(&prop.column_alias()) else {
            return Value::Null;
        };

        let stored = prop
            .column
            .as_ref()
            .and_then(|column| column.map_stored(raw))
            .unwrap_or(raw);
        let format = prop.column.as_ref().and_then(|column| column.format.as_deref());

        match self
            .orm
            .type_handler()
            .to_object_value(stored, &prop.ty, format, prop.nullable)
        {
            Some(value) => value,
            None => {
                tracing::trace!(class = %prop.class_name, property = %prop.name, value = %stored, "key not converted");
                stored.clone()
            }
        }
    }

    /// Foreign key of an owning relationship, as carried by this row.
    fn foreign_key(&self, row: &Row, prop: &PropertyMapping) -> Vec<Value> {
        let path = prop.path();

        self.mapping
            .properties()
            .filter(|key| key.key_only && key.parents == path.parts())
            .map(|key| self.key_value(row, key))
            .collect()
    }

    /// This object's side of an inverse or many-to-many relationship: the
    /// properties stored in the relationship's source columns with their
    /// values in `row`.
    fn own_key(
        &self,
        row: &Row,
        parents: &[String],
        relationship: &RelationshipMapping,
    ) -> Option<Vec<(String, Value)>> {
        let mut ret = vec![];

        for column in &relationship.source_columns {
            let prop = self
                .mapping
                .properties_of(parents)
                .find(|prop| prop.holds_value() && prop.column_name() == Some(column.as_str()))?;

            let value = self.key_value(row, prop);
            if value.is_null() {
                return None;
            }
            ret.push((prop.name.clone(), value));
        }

        (!ret.is_empty()).then_some(ret)
    }
}
