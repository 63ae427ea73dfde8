use crate::stmt::{Type, Value};

use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMapping {
    /// Column name, including any embedded prefix
    pub name: String,

    /// Storage type handed to the type handler
    pub ty: Type,

    pub format: Option<String>,

    pub read_only: bool,

    pub primary_key: bool,

    pub auto_increment: bool,

    /// Stored value to object value substitutions
    pub value_map: IndexMap<String, Value>,
}

impl ColumnMapping {
    /// Map a stored value through the value map, if it has an entry.
    pub fn map_stored(&self, value: &Value) -> Option<&Value> {
        let key = value.to_scalar_string()?;
        self.value_map.get(&key)
    }

    /// Reverse lookup through the value map.
    pub fn unmap_object(&self, value: &Value) -> Option<Value> {
        self.value_map
            .iter()
            .find(|(_, mapped)| *mapped == value)
            .map(|(stored, _)| Value::String(stored.clone()))
    }
}
