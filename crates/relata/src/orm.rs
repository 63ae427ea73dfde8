mod builder;
pub use builder::Builder;

use crate::{
    Entity, EntityFactory, EntityRef, EntityTracker, ObjectRepository, PropertyValue, Result, Row,
    Storage, TypeHandler,
};

use indexmap::IndexMap;
use relata_core::{schema::MetadataProvider, stmt::Value, Config, Error, MappingResolver};
use relata_sql::{Renderer, Serializer, Sql};
use std::cell::{Ref, RefCell, RefMut};

/// Adjusts a repository as it is created for a class whose table names a
/// custom repository.
pub type RepositoryHook = Box<dyn Fn(&mut ObjectRepository<'_>) -> Result<()>>;

/// A session: metadata, storage and the entity cache shared by every
/// repository created from it.
///
/// An `Orm` is single-threaded. Lazy loads run on the caller's thread when
/// they are first accessed.
pub struct Orm {
    resolver: MappingResolver,
    storage: Box<dyn Storage>,
    serializer: Serializer,
    config: Config,
    factory: Box<dyn EntityFactory>,
    type_handler: Box<dyn TypeHandler>,
    tracker: RefCell<EntityTracker>,
    repositories: IndexMap<String, RepositoryHook>,
}

impl Orm {
    pub fn builder(
        provider: impl MetadataProvider + 'static,
        storage: impl Storage + 'static,
    ) -> Builder {
        Builder::new(provider, storage)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn resolver(&self) -> &MappingResolver {
        &self.resolver
    }

    pub fn storage(&self) -> &dyn Storage {
        &*self.storage
    }

    pub fn serializer(&self) -> &Serializer {
        &self.serializer
    }

    pub fn type_handler(&self) -> &dyn TypeHandler {
        &*self.type_handler
    }

    pub fn tracker(&self) -> Ref<'_, EntityTracker> {
        self.tracker.borrow()
    }

    pub(crate) fn tracker_mut(&self) -> RefMut<'_, EntityTracker> {
        self.tracker.borrow_mut()
    }

    /// Repository for `class_name` using the session configuration.
    pub fn repository(&self, class_name: &str) -> Result<ObjectRepository<'_>> {
        self.repository_with_config(class_name, self.config.clone())
    }

    pub fn repository_with_config(
        &self,
        class_name: &str,
        config: Config,
    ) -> Result<ObjectRepository<'_>> {
        let mapping = self.resolver.resolve(class_name, &config)?;
        let mut repository = ObjectRepository::new(self, class_name, config);

        if let Some(name) = &mapping.table().repository {
            let Some(hook) = self.repositories.get(name) else {
                return Err(Error::mapping(
                    class_name,
                    None,
                    format!("custom repository `{name}` is not registered"),
                ));
            };

            hook(&mut repository)?;
        }

        Ok(repository)
    }

    /// An empty instance of `class_name`.
    pub fn create_entity(&self, class_name: &str) -> Result<Entity> {
        self.factory.create(class_name, self.resolver.provider())
    }

    /// Resolve a deferred property of `entity`, storing and returning the
    /// loaded value. Loaded properties are returned as they are.
    pub fn load(&self, entity: &EntityRef, property: &str) -> Result<PropertyValue> {
        let deferred = match entity.borrow().get(property) {
            Some(PropertyValue::Deferred(deferred)) => deferred.clone(),
            Some(value) => return Ok(value.clone()),
            None => {
                return Err(Error::mapping(
                    &entity.class_name(),
                    Some(property),
                    "entity has no such property",
                ))
            }
        };

        let value = deferred.load(self)?;

        if let PropertyValue::Collection(members) = &value {
            self.tracker_mut()
                .remember_collection(entity, property, members.clone());
        }

        entity.borrow_mut().set_property(property, value.clone());
        Ok(value)
    }

    /// The related entity of a to-one property, loading it if needed.
    pub fn related(&self, entity: &EntityRef, property: &str) -> Result<Option<EntityRef>> {
        Ok(self.load(entity, property)?.as_entity().cloned())
    }

    /// Members of a to-many property, loading them if needed. An unset
    /// collection is empty.
    pub fn collection(&self, entity: &EntityRef, property: &str) -> Result<Vec<EntityRef>> {
        Ok(match self.load(entity, property)? {
            PropertyValue::Collection(members) => members,
            _ => vec![],
        })
    }

    /// Forget tracked entities, of one class or all of them.
    pub fn clear_cache(&self, class_name: Option<&str>) {
        self.tracker_mut().clear(class_name);
    }

    pub fn begin_transaction(&self) -> Result<()> {
        tracing::debug!("begin transaction");
        self.storage.begin_transaction()
    }

    pub fn commit(&self) -> Result<()> {
        tracing::debug!("commit");
        self.storage.commit()
    }

    pub fn rollback(&self) -> Result<()> {
        tracing::debug!("rollback");
        self.storage.rollback()
    }

    pub(crate) fn renderer<'a>(&'a self, config: &'a Config) -> Renderer<'a> {
        Renderer::new(&self.resolver, config, self.serializer.clone())
    }

    /// Run a select and fetch every row.
    pub(crate) fn query_rows(&self, sql: &Sql) -> Result<Vec<Row>> {
        if !self.storage.execute_query(&sql.text, &sql.params)? {
            tracing::debug!(sql = %sql.text, "query failed; no rows");
            return Ok(vec![]);
        }
        self.storage.fetch_results()
    }

    /// Run a select returning one value.
    pub(crate) fn query_value(&self, sql: &Sql) -> Result<Option<Value>> {
        if !self.storage.execute_query(&sql.text, &sql.params)? {
            tracing::debug!(sql = %sql.text, "query failed; no value");
            return Ok(None);
        }
        self.storage.fetch_value()
    }

    /// Run a write and return the number of rows it touched.
    pub(crate) fn execute(&self, sql: &Sql) -> Result<u64> {
        if !self.storage.execute_query(&sql.text, &sql.params)? {
            tracing::debug!(sql = %sql.text, "statement failed; no rows affected");
            return Ok(0);
        }
        Ok(self.storage.affected_record_count())
    }
}

impl std::fmt::Debug for Orm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orm")
            .field("resolver", &self.resolver)
            .field("serializer", &self.serializer)
            .field("tracked", &self.tracker.borrow().len())
            .field("repositories", &self.repositories.keys().collect::<Vec<_>>())
            .finish()
    }
}
