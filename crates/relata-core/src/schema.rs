//! Raw mapping metadata, as supplied by a [`MetadataProvider`] before
//! configuration overrides are merged in.

mod class;
pub use class::ClassDef;

mod column;
pub use column::ColumnDef;

mod property;
pub use property::PropertyDef;

mod registry;
pub use registry::Registry;

mod relationship;
pub use relationship::{RelationshipDef, RelationshipKind};

mod table;
pub use table::TableDef;

use crate::{Error, Result};

/// Supplies raw table/column/relationship facts for a class.
pub trait MetadataProvider {
    /// Returns the definition of the named class, if known.
    fn class(&self, name: &str) -> Option<&ClassDef>;
}

/// A property as seen through a class hierarchy.
#[derive(Debug, Clone, Copy)]
pub struct HierarchyProperty<'a> {
    /// The class that declares the property
    pub declaring_class: &'a str,

    /// Position of the property in the flattened layout
    pub slot: usize,

    pub def: &'a PropertyDef,
}

/// Flatten the properties of `class` and all of its parent classes, the
/// top-most parent first. A property redeclared by a subclass replaces the
/// inherited one in place.
pub fn hierarchy<'a>(
    provider: &'a dyn MetadataProvider,
    class: &str,
) -> Result<Vec<HierarchyProperty<'a>>> {
    let mut chain = vec![];
    let mut next = Some(class.to_string());

    while let Some(name) = next {
        let Some(def) = provider.class(&name) else {
            return Err(Error::mapping(&name, None, "class is not registered"));
        };

        if chain.iter().any(|c: &&ClassDef| c.name == def.name) {
            return Err(Error::mapping(&name, None, "class hierarchy is cyclic"));
        }

        next = def.parent.clone();
        chain.push(def);
    }

    let mut props: Vec<HierarchyProperty<'a>> = vec![];

    for def in chain.into_iter().rev() {
        for property in &def.properties {
            match props.iter_mut().find(|p| p.def.name == property.name) {
                Some(existing) => {
                    existing.declaring_class = &def.name;
                    existing.def = property;
                }
                None => props.push(HierarchyProperty {
                    declaring_class: &def.name,
                    slot: props.len(),
                    def: property,
                }),
            }
        }
    }

    Ok(props)
}

/// Find the table of `class`, walking up the class hierarchy.
pub fn table_of<'a>(provider: &'a dyn MetadataProvider, class: &str) -> Option<&'a TableDef> {
    let mut next = provider.class(class);
    let mut guard = 0;

    while let Some(def) = next {
        if let Some(table) = &def.table {
            return Some(table);
        }
        guard += 1;
        if guard > 64 {
            return None;
        }
        next = def.parent.as_deref().and_then(|parent| provider.class(parent));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stmt::Type;

    fn registry() -> Registry {
        Registry::new()
            .with(
                ClassDef::new("Person")
                    .table("person")
                    .property(PropertyDef::new("id", Type::Int).primary_key())
                    .property(PropertyDef::new("name", Type::String)),
            )
            .with(
                ClassDef::new("Employee")
                    .extends("Person")
                    .property(PropertyDef::new("salary", Type::Float))
                    .property(PropertyDef::new("name", Type::String).column("full_name")),
            )
    }

    #[test]
    fn hierarchy_puts_parent_properties_first() {
        let registry = registry();
        let props = hierarchy(&registry, "Employee").unwrap();

        let names: Vec<_> = props.iter().map(|p| p.def.name.as_str()).collect();
        assert_eq!(names, ["id", "name", "salary"]);
        assert_eq!(props[1].declaring_class, "Employee");
        assert_eq!(props[1].slot, 1);
    }

    #[test]
    fn table_is_inherited() {
        let registry = registry();
        assert_eq!(table_of(&registry, "Employee").unwrap().name, "person");
    }

    #[test]
    fn unknown_class() {
        let registry = registry();
        let err = hierarchy(&registry, "Robot").unwrap_err();
        assert!(err.is_mapping());
        assert!(err.to_string().contains("Robot"));
    }
}
