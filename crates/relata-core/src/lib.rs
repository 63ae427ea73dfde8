pub mod config;
pub use config::Config;

mod error;
pub use error::{Error, IntoError};

pub mod mapping;
pub use mapping::{MappingCollection, MappingResolver};

pub mod schema;
pub use schema::{MetadataProvider, Registry};

pub mod stmt;

/// A Result type alias that uses Relata's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;
