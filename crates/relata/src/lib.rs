mod binder;

pub mod entity;
pub use entity::{Deferred, Entity, EntityRef, PropertyValue, WeakEntityRef};

pub mod factory;
pub use factory::{DefaultEntityFactory, EntityFactory};

pub mod orm;
pub use orm::Orm;

pub mod page;
pub use page::{Pagination, Paginator};

mod persister;

pub mod repository;
pub use repository::ObjectRepository;

pub mod storage;
pub use storage::{Row, Storage};

pub mod tracker;
pub use tracker::{EntityKey, EntityTracker};

pub mod type_handler;
pub use type_handler::{DefaultTypeHandler, TypeHandler};

pub mod unbinder;
pub use unbinder::Unbinder;

pub use relata_core::{
    config::Config,
    schema::{self, MetadataProvider, Registry},
    stmt::{self, Direction, Operator, QueryBuilder, Value},
    Error, Result,
};
pub use relata_sql::Serializer;
