use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared type of an entity property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Type {
    Bool,
    Date,
    DateTime,
    Float,
    Int,
    String,

    /// Free-form value; stored and hydrated as-is
    Mixed,

    /// A single related entity of the named class
    Entity(String),

    /// A collection of related entities of the named class
    Collection(String),
}

impl Type {
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Self::Entity(_) | Self::Collection(_))
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Self::Collection(_))
    }

    /// The related class, for entity and collection types.
    pub fn class_name(&self) -> Option<&str> {
        match self {
            Self::Entity(class) | Self::Collection(class) => Some(class),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Date => f.write_str("date"),
            Self::DateTime => f.write_str("datetime"),
            Self::Float => f.write_str("float"),
            Self::Int => f.write_str("int"),
            Self::String => f.write_str("string"),
            Self::Mixed => f.write_str("mixed"),
            Self::Entity(class) => write!(f, "{class}"),
            Self::Collection(class) => write!(f, "{class}[]"),
        }
    }
}
