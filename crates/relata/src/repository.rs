use crate::{
    binder::Binder, persister::Persister, unbinder::Unbinder, EntityRef, Orm, Pagination,
    PropertyValue, Result,
};

use indexmap::IndexMap;
use relata_core::{
    stmt::{
        CriteriaExpression, CriteriaList, Direction, FieldExpression, IntoCriteria, LatestRecord,
        NormalizeOptions, OrderByExpr, PropertyPath, Query, SelectQuery, Value,
    },
    Config, Error, MappingCollection,
};
use std::sync::Arc;

/// Finds, saves and deletes entities of one class.
///
/// Repositories are cheap. They borrow the [`Orm`] session, so every
/// repository created from the same session shares its entity cache.
pub struct ObjectRepository<'a> {
    orm: &'a Orm,
    class_name: String,
    config: Config,
    pagination: Option<Box<dyn Pagination>>,
}

impl<'a> ObjectRepository<'a> {
    pub(crate) fn new(orm: &'a Orm, class_name: &str, config: Config) -> Self {
        Self {
            orm,
            class_name: class_name.to_string(),
            config,
            pagination: None,
        }
    }

    pub fn orm(&self) -> &'a Orm {
        self.orm
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Change one option of this repository's configuration.
    pub fn set_config_option(&mut self, name: &str, value: serde_json::Value) -> Result<()> {
        self.config.set_option(name, value)
    }

    /// Page every following `find_by` through `pagination`.
    pub fn set_pagination(&mut self, pagination: impl Pagination + 'static) {
        self.pagination = Some(Box::new(pagination));
    }

    pub fn pagination(&self) -> Option<&dyn Pagination> {
        self.pagination.as_deref()
    }

    /// Stop paging, returning the pagination that was set.
    pub fn take_pagination(&mut self) -> Option<Box<dyn Pagination>> {
        self.pagination.take()
    }

    /// The entity with primary key `id`.
    pub fn find(&self, id: impl Into<Value>) -> Result<Option<EntityRef>> {
        let mapping = self.mapping()?;

        let [primary_key] = &mapping.primary_key()[..] else {
            return Err(Error::query(format!(
                "`{}` has no single primary key to find by",
                self.class_name
            )));
        };

        let id: Value = id.into();
        self.find_one_by(CriteriaExpression::eq(&primary_key.name, id)?)
    }

    /// First entity matching `criteria`.
    pub fn find_one_by(&self, criteria: impl IntoCriteria) -> Result<Option<EntityRef>> {
        let mut query = self.select(criteria, &[])?;
        query.limit = Some(1);

        Ok(self.fetch(query.into(), &IndexMap::new())?.into_iter().next())
    }

    /// Entities matching `criteria`.
    ///
    /// When a pagination is set, the matching records are counted first and
    /// the page it points at is returned. `limit` and `offset` are only
    /// honoured without one.
    pub fn find_by(
        &mut self,
        criteria: impl IntoCriteria,
        order_by: &[(&str, Direction)],
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<Vec<EntityRef>> {
        let mut query = self.select(criteria, order_by)?;

        if self.pagination.is_some() {
            let total = self.count(query.clone())?;

            if let Some(pagination) = &mut self.pagination {
                pagination.set_total_records(total);
                query.limit = Some(pagination.page_size());
                query.offset = Some(pagination.offset());
            }
        } else {
            query.limit = limit;
            query.offset = offset;
        }

        self.fetch(query.into(), &IndexMap::new())
    }

    pub fn find_all(&mut self) -> Result<Vec<EntityRef>> {
        self.find_by(CriteriaList::new(), &[], None, None)
    }

    /// Like [`find_by`](Self::find_by), keyed by the value of `key_property`.
    /// A later entity with the same key replaces an earlier one.
    pub fn find_by_keyed(
        &mut self,
        criteria: impl IntoCriteria,
        key_property: &str,
        order_by: &[(&str, Direction)],
    ) -> Result<IndexMap<String, EntityRef>> {
        let mut ret = IndexMap::new();

        for entity in self.find_by(criteria, order_by, None, None)? {
            let Some(key) = entity
                .value(key_property)
                .and_then(|value| value.to_scalar_string())
            else {
                return Err(Error::query(format!(
                    "`{}::{key_property}` holds no value to key results by",
                    self.class_name
                )));
            };

            ret.insert(key, entity);
        }

        Ok(ret)
    }

    /// The most recent entity, by `recency_property`, of each group of
    /// entities sharing `group_property`.
    pub fn find_latest_by(
        &self,
        criteria: impl IntoCriteria,
        group_property: &str,
        recency_property: &str,
    ) -> Result<Vec<EntityRef>> {
        let mut query = self.select(criteria, &[])?;
        query.latest = Some(LatestRecord {
            group_property: PropertyPath::parse(group_property)?,
            recency_property: PropertyPath::parse(recency_property)?,
        });

        self.fetch(query.into(), &IndexMap::new())
    }

    /// Number of entities matching `criteria`.
    pub fn count_by(&self, criteria: impl IntoCriteria) -> Result<u64> {
        let query = self.select(criteria, &[])?;
        self.count(query)
    }

    /// Run a select built elsewhere, usually by a
    /// [`QueryBuilder`](relata_core::stmt::QueryBuilder).
    pub fn find_by_query(&self, query: SelectQuery) -> Result<Vec<EntityRef>> {
        self.fetch(query.into(), &IndexMap::new())
    }

    /// Run an insert, update or delete built elsewhere and return the
    /// number of rows it touched.
    pub fn execute(&self, query: impl Into<Query>) -> Result<u64> {
        let mut query = query.into();

        if let Query::Select(_) = query {
            return Err(Error::query(format!(
                "selects on `{}` are run with `find_by_query`",
                query.class_name()
            )));
        }

        let renderer = self.orm.renderer(&self.config);
        renderer.finalise(&mut query)?;
        let sql = renderer.render(&query)?;

        self.orm.execute(&sql)
    }

    /// Values of `entity` that differ from when it was loaded or last saved.
    /// Every writable value is returned for an entity that is not tracked.
    pub fn changed_columns(&self, entity: &EntityRef) -> Result<IndexMap<PropertyPath, Value>> {
        let mapping = self
            .orm
            .resolver()
            .resolve(&entity.class_name(), &self.config)?;
        let unbinder = Unbinder::new(&mapping);

        let tracker = self.orm.tracker();
        let snapshot = tracker.snapshot(entity);
        let entity = entity.borrow();

        let primary_key = snapshot.is_some().then(|| unbinder.primary_key(&entity));
        Ok(unbinder.changed_columns(&entity, snapshot, primary_key.as_deref()))
    }

    /// Insert or update `entity` and the related entities it holds.
    pub fn save_entity(&self, entity: &EntityRef) -> Result<u64> {
        Persister::new(self.orm, &self.config).save(entity)
    }

    /// Save every entity in one transaction. Rolls back and returns the
    /// error when any save fails.
    pub fn save_entities(&self, entities: &[EntityRef]) -> Result<u64> {
        self.orm.begin_transaction()?;

        let mut persister = Persister::new(self.orm, &self.config);
        let mut affected = 0;

        for entity in entities {
            match persister.save(entity) {
                Ok(count) => affected += count,
                Err(err) => {
                    if let Err(rollback) = self.orm.rollback() {
                        tracing::debug!(error = %rollback, "rollback failed");
                    }
                    return Err(err);
                }
            }
        }

        self.orm.commit()?;
        Ok(affected)
    }

    /// Delete `entity`, after the children its cascading relationships hold.
    pub fn delete_entity(&self, entity: &EntityRef) -> Result<u64> {
        Persister::new(self.orm, &self.config).delete(entity)
    }

    /// A new, untracked entity of this repository's class.
    pub fn create_entity(&self) -> Result<EntityRef> {
        Ok(EntityRef::new(self.orm.create_entity(&self.class_name)?))
    }

    /// Resolve a deferred property of `entity`.
    pub fn load(&self, entity: &EntityRef, property: &str) -> Result<PropertyValue> {
        self.orm.load(entity, property)
    }

    pub fn clear_cache(&self, class_name: Option<&str>) {
        self.orm.clear_cache(class_name);
    }

    pub fn begin_transaction(&self) -> Result<()> {
        self.orm.begin_transaction()
    }

    pub fn commit(&self) -> Result<()> {
        self.orm.commit()
    }

    pub fn rollback(&self) -> Result<()> {
        self.orm.rollback()
    }

    /// Finalise, render and run `query`, hydrating the rows it returns.
    /// `known` supplies root properties the caller already holds.
    pub(crate) fn fetch(
        &self,
        mut query: Query,
        known: &IndexMap<String, PropertyValue>,
    ) -> Result<Vec<EntityRef>> {
        if !matches!(query, Query::Select(_)) {
            return Err(Error::query(format!(
                "only selects on `{}` return entities",
                query.class_name()
            )));
        }

        let renderer = self.orm.renderer(&self.config);
        let mapping = renderer.finalise(&mut query)?;
        let sql = renderer.render(&query)?;

        let rows = self.orm.query_rows(&sql)?;
        tracing::trace!(class = %self.class_name, rows = rows.len(), "binding rows");

        Binder::new(self.orm, &mapping, &self.config, known).bind_rows(&rows)
    }

    fn count(&self, query: SelectQuery) -> Result<u64> {
        let mut query = Query::from(query);

        let renderer = self.orm.renderer(&self.config);
        renderer.finalise(&mut query)?;
        let sql = renderer.render_count(&query)?;

        Ok(match self.orm.query_value(&sql)? {
            Some(Value::I64(count)) => count.max(0) as u64,
            Some(value) => value
                .to_scalar_string()
                .and_then(|count| count.trim().parse().ok())
                .unwrap_or_default(),
            None => 0,
        })
    }

    fn select(&self, criteria: impl IntoCriteria, order_by: &[(&str, Direction)]) -> Result<SelectQuery> {
        let mut query = SelectQuery::new(&self.class_name);
        query.base.criteria = criteria.into_criteria(&self.normalize_options()?)?;

        for (field, direction) in order_by {
            query
                .order_by
                .push(OrderByExpr::new(FieldExpression::new(field)?, *direction));
        }

        Ok(query)
    }

    fn normalize_options(&self) -> Result<NormalizeOptions> {
        let mapping = self.mapping()?;

        let primary_key = match &mapping.primary_key()[..] {
            [prop] => Some(prop.name.clone()),
            _ => None,
        };

        Ok(NormalizeOptions {
            primary_key,
            convert_null_to_empty: self.config.convert_null_to_empty,
        })
    }

    fn mapping(&self) -> Result<Arc<MappingCollection>> {
        self.orm.resolver().resolve(&self.class_name, &self.config)
    }
}

impl std::fmt::Debug for ObjectRepository<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectRepository")
            .field("class_name", &self.class_name)
            .field("paginated", &self.pagination.is_some())
            .finish()
    }
}
