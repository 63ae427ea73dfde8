use super::{PropertyValue, WeakEntityRef};
use crate::{Orm, Result};

use indexmap::IndexMap;
use relata_core::{
    stmt::{CriteriaList, JoinExpression, OrderByExpr, SelectQuery, Value},
    Config,
};
use std::fmt;

/// A relationship waiting to be loaded.
///
/// Holds everything the load needs by value: the child class, the filter
/// built from the parent row, and the configuration the parent was loaded
/// with. It never holds a connection or a reference to the entity tracker,
/// so it can run at any later point against whichever [`Orm`] is passed in.
#[derive(Clone)]
pub struct Deferred {
    pub(crate) class_name: String,

    pub(crate) criteria: CriteriaList,

    /// Bridge table join of a many-to-many relationship
    pub(crate) joins: Vec<JoinExpression>,

    pub(crate) order_by: Vec<OrderByExpr>,

    pub(crate) to_many: bool,

    /// Foreign key values read from the parent row, for an owning to-one
    pub(crate) keys: Vec<Value>,

    /// Child property that points back at the parent, and the parent
    pub(crate) inverse: Option<(String, WeakEntityRef)>,

    pub(crate) config: Config,

    /// Tracker generation the load was created in
    pub(crate) generation: u64,
}

impl Deferred {
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn is_to_many(&self) -> bool {
        self.to_many
    }

    /// Foreign key values the load filters on, for an owning to-one.
    pub fn keys(&self) -> &[Value] {
        &self.keys
    }

    pub fn criteria(&self) -> &CriteriaList {
        &self.criteria
    }

    /// Run the load and return the loaded value.
    pub fn load(&self, orm: &Orm) -> Result<PropertyValue> {
        if self.generation != orm.tracker().generation() {
            tracing::trace!(
                class = %self.class_name,
                "deferred load created before the entity cache was cleared"
            );
        }

        let mut known = IndexMap::new();
        if let Some((property, parent)) = &self.inverse {
            if let Some(parent) = parent.upgrade() {
                known.insert(property.clone(), PropertyValue::Entity(Some(parent)));
            }
        }

        let mut query = SelectQuery::new(&self.class_name);
        query.base.criteria = self.criteria.clone();
        query.base.joins = self.joins.clone();
        query.order_by = self.order_by.clone();
        if !self.to_many {
            query.limit = Some(1);
        }

        let repository = orm.repository_with_config(&self.class_name, self.config.clone())?;
        let found = repository.fetch(query.into(), &known)?;

        tracing::trace!(class = %self.class_name, found = found.len(), "deferred load");

        Ok(if self.to_many {
            PropertyValue::Collection(found)
        } else {
            PropertyValue::Entity(found.into_iter().next())
        })
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("class_name", &self.class_name)
            .field("to_many", &self.to_many)
            .field("conditions", &self.criteria.condition_count())
            .finish()
    }
}
