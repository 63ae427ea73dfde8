pub mod lower;

mod renderer;
pub use renderer::{Renderer, Sql};

pub mod serializer;
pub use serializer::{NamedParams, Params, Serializer};

pub mod stmt;
pub use stmt::Statement;
