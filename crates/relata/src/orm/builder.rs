use super::{Orm, RepositoryHook};
use crate::{
    DefaultEntityFactory, DefaultTypeHandler, EntityFactory, EntityTracker, ObjectRepository,
    Result, Storage, TypeHandler,
};

use indexmap::IndexMap;
use relata_core::{schema::MetadataProvider, Config, MappingResolver};
use relata_sql::Serializer;
use std::cell::RefCell;

pub struct Builder {
    resolver: MappingResolver,
    storage: Box<dyn Storage>,

    /// Defaults to MySQL
    serializer: Option<Serializer>,

    config: Config,
    factory: Box<dyn EntityFactory>,
    type_handler: Box<dyn TypeHandler>,
    repositories: IndexMap<String, RepositoryHook>,
}

impl Builder {
    pub fn new(provider: impl MetadataProvider + 'static, storage: impl Storage + 'static) -> Self {
        Self {
            resolver: MappingResolver::new(provider),
            storage: Box::new(storage),
            serializer: None,
            config: Config::default(),
            factory: Box::new(DefaultEntityFactory::new()),
            type_handler: Box::new(DefaultTypeHandler),
            repositories: IndexMap::new(),
        }
    }

    /// SQL flavor to render for.
    pub fn serializer(mut self, serializer: Serializer) -> Self {
        self.serializer = Some(serializer);
        self
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn entity_factory(mut self, factory: impl EntityFactory + 'static) -> Self {
        self.factory = Box::new(factory);
        self
    }

    pub fn type_handler(mut self, handler: impl TypeHandler + 'static) -> Self {
        self.type_handler = Box::new(handler);
        self
    }

    /// Register the custom repository `name`. Classes whose table names it
    /// get their repositories passed through `hook` as they are created.
    pub fn repository(
        mut self,
        name: impl Into<String>,
        hook: impl Fn(&mut ObjectRepository<'_>) -> Result<()> + 'static,
    ) -> Self {
        self.repositories.insert(name.into(), Box::new(hook));
        self
    }

    pub fn build(self) -> Orm {
        Orm {
            resolver: self.resolver,
            storage: self.storage,
            serializer: self.serializer.unwrap_or_else(Serializer::mysql),
            config: self.config,
            factory: self.factory,
            type_handler: self.type_handler,
            tracker: RefCell::new(EntityTracker::new()),
            repositories: self.repositories,
        }
    }
}
