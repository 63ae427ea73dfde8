use super::{ColumnDef, RelationshipDef};
use crate::stmt::{Type, Value};

/// Raw metadata for one property of a class.
#[derive(Debug, Clone)]
pub struct PropertyDef {
    pub name: String,

    pub ty: Type,

    pub nullable: bool,

    /// Value a freshly constructed instance holds
    pub default: Value,

    pub column: Option<ColumnDef>,

    pub relationship: Option<RelationshipDef>,

    /// Serialization groups the property belongs to
    pub groups: Vec<String>,

    /// Not persisted at all
    pub transient: bool,
}

impl PropertyDef {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            nullable: false,
            default: Value::Null,
            column: None,
            relationship: None,
            groups: vec![],
            transient: false,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = value.into();
        self
    }

    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.column_mut().name = Some(name.into());
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.column_mut().primary_key = true;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        let column = self.column_mut();
        column.primary_key = true;
        column.auto_increment = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.column_mut().read_only = true;
        self
    }

    pub fn storage_type(mut self, ty: Type) -> Self {
        self.column_mut().ty = Some(ty);
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.column_mut().format = Some(format.into());
        self
    }

    pub fn value_map<K, V>(mut self, from: K, to: V) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.column_mut().value_map.insert(from.into(), to.into());
        self
    }

    pub fn relationship(mut self, relationship: RelationshipDef) -> Self {
        self.relationship = Some(relationship);
        self
    }

    pub fn groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    pub fn transient(mut self) -> Self {
        self.transient = true;
        self
    }

    pub fn is_primary_key(&self) -> bool {
        self.column.as_ref().is_some_and(|column| column.primary_key)
    }

    fn column_mut(&mut self) -> &mut ColumnDef {
        self.column.get_or_insert_with(ColumnDef::default)
    }
}
