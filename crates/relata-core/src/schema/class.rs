use super::{PropertyDef, TableDef};

/// Raw metadata for one class.
#[derive(Debug, Clone, Default)]
pub struct ClassDef {
    pub name: String,

    /// Class this one extends
    pub parent: Option<String>,

    /// Table the class is stored in. Embedded value classes have none.
    pub table: Option<TableDef>,

    pub properties: Vec<PropertyDef>,

    /// Entity-typed properties an instance cannot be constructed without.
    pub constructor_args: Vec<String>,
}

impl ClassDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn table(mut self, name: impl Into<String>) -> Self {
        self.table = Some(TableDef::new(name));
        self
    }

    pub fn table_def(mut self, table: TableDef) -> Self {
        self.table = Some(table);
        self
    }

    pub fn property(mut self, property: PropertyDef) -> Self {
        self.properties.push(property);
        self
    }

    pub fn constructor_arg(mut self, property: impl Into<String>) -> Self {
        self.constructor_args.push(property.into());
        self
    }

    pub fn property_def(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.iter().find(|p| p.name == name)
    }
}
