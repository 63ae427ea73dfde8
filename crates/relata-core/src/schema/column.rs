use crate::stmt::{Type, Value};

use indexmap::IndexMap;

/// Raw column metadata for a property.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnDef {
    /// Column name. When unset, the naming strategy decides.
    pub name: Option<String>,

    /// Storage type, when it differs from the property's declared type
    pub ty: Option<Type>,

    /// Format string used by the type handler (e.g. a date format)
    pub format: Option<String>,

    /// The database owns this column; it is never written
    pub read_only: bool,

    pub primary_key: bool,

    pub auto_increment: bool,

    /// Static substitution from stored value to object value
    pub value_map: IndexMap<String, Value>,
}

impl ColumnDef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}
