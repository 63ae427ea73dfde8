//! Creating empty entities for the binder to populate.

use crate::{Entity, EntityRef, PropertyValue};

use indexmap::IndexMap;
use relata_core::{
    schema::{self, ClassDef, MetadataProvider},
    stmt::{Type, Value},
    Error, Result,
};

/// Constructor arguments that are themselves entities are created
/// recursively, up to this depth.
const MAX_ARGUMENT_DEPTH: usize = 8;

pub trait EntityFactory {
    /// Create a fresh instance of `class_name` with every scalar set to its
    /// default.
    fn create(&self, class_name: &str, provider: &dyn MetadataProvider) -> Result<Entity>;
}

type Constructor = Box<dyn Fn(&ClassDef) -> anyhow::Result<Entity>>;

type Strategy = fn(&DefaultEntityFactory, &str, &dyn MetadataProvider, usize) -> Result<Entity>;

/// Tries, in order: a constructor registered for the class, plain
/// construction, then construction with every required argument created
/// recursively. When every strategy fails, the first failure is returned.
#[derive(Default)]
pub struct DefaultEntityFactory {
    constructors: IndexMap<String, Constructor>,
}

impl DefaultEntityFactory {
    const STRATEGIES: &'static [Strategy] = &[Self::plain, Self::with_arguments];

    pub fn new() -> Self {
        Self::default()
    }

    /// Use `constructor` for every instance of `class_name`.
    pub fn register(
        mut self,
        class_name: impl Into<String>,
        constructor: impl Fn(&ClassDef) -> anyhow::Result<Entity> + 'static,
    ) -> Self {
        self.constructors
            .insert(class_name.into(), Box::new(constructor));
        self
    }

    fn build(&self, class_name: &str, provider: &dyn MetadataProvider, depth: usize) -> Result<Entity> {
        if let Some(constructor) = self.constructors.get(class_name) {
            let def = class_def(class_name, provider)?;
            return constructor(def).map_err(|err| {
                Error::from(err).context(Error::mapping(class_name, None, "constructor failed"))
            });
        }

        let mut first = None;

        for strategy in Self::STRATEGIES {
            match strategy(self, class_name, provider, depth) {
                Ok(entity) => return Ok(entity),
                Err(err) => {
                    tracing::trace!(class = class_name, error = %err, "construction strategy failed");
                    first.get_or_insert(err);
                }
            }
        }

        Err(first.unwrap_or_else(|| Error::mapping(class_name, None, "cannot be constructed")))
    }

    /// An instance with no constructor arguments.
    fn plain(&self, class_name: &str, provider: &dyn MetadataProvider, _depth: usize) -> Result<Entity> {
        let def = class_def(class_name, provider)?;

        if !def.constructor_args.is_empty() {
            return Err(Error::mapping(
                class_name,
                None,
                format!(
                    "construction requires arguments: {}",
                    def.constructor_args.join(", ")
                ),
            ));
        }

        defaults(class_name, provider)
    }

    /// An instance whose required arguments are created first.
    fn with_arguments(
        &self,
        class_name: &str,
        provider: &dyn MetadataProvider,
        depth: usize,
    ) -> Result<Entity> {
        if depth >= MAX_ARGUMENT_DEPTH {
            return Err(Error::mapping(
                class_name,
                None,
                "constructor arguments nest too deeply",
            ));
        }

        let def = class_def(class_name, provider)?;
        let mut entity = defaults(class_name, provider)?;

        for name in &def.constructor_args {
            let Some(arg) = def.property_def(name) else {
                return Err(Error::mapping(
                    class_name,
                    Some(name),
                    "constructor argument is not a property",
                ));
            };

            let value = match &arg.ty {
                Type::Entity(child) => {
                    let child = self.build(child, provider, depth + 1).map_err(|err| {
                        err.context(Error::mapping(class_name, Some(name), "cannot create argument"))
                    })?;
                    PropertyValue::Entity(Some(EntityRef::new(child)))
                }
                Type::Collection(_) => PropertyValue::Collection(vec![]),
                _ if !arg.default.is_null() || arg.nullable => {
                    PropertyValue::Value(arg.default.clone())
                }
                ty => {
                    return Err(Error::mapping(
                        class_name,
                        Some(name),
                        format!("no value available for required `{ty}` argument"),
                    ))
                }
            };

            entity.set_property(name, value);
        }

        Ok(entity)
    }
}

impl EntityFactory for DefaultEntityFactory {
    fn create(&self, class_name: &str, provider: &dyn MetadataProvider) -> Result<Entity> {
        self.build(class_name, provider, 0)
    }
}

impl std::fmt::Debug for DefaultEntityFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultEntityFactory")
            .field("constructors", &self.constructors.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn class_def<'a>(class_name: &str, provider: &'a dyn MetadataProvider) -> Result<&'a ClassDef> {
    provider
        .class(class_name)
        .ok_or_else(|| Error::mapping(class_name, None, "class is not registered"))
}

/// Every property of the class hierarchy in its initial state.
fn defaults(class_name: &str, provider: &dyn MetadataProvider) -> Result<Entity> {
    let mut entity = Entity::new(class_name);

    for prop in schema::hierarchy(provider, class_name)? {
        let def = prop.def;
        let value = match &def.relationship {
            Some(relationship) if !relationship.is_scalar_join() => PropertyValue::Unset,
            _ if def.ty.is_scalar() => PropertyValue::Value(def.default.clone()),
            _ => PropertyValue::Unset,
        };

        entity.set_property(&def.name, value);
    }

    Ok(entity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use relata_core::schema::{PropertyDef, Registry};

    fn registry() -> Registry {
        Registry::new()
            .with(
                ClassDef::new("Contact")
                    .table("contact")
                    .property(PropertyDef::new("id", Type::Int).primary_key())
                    .property(PropertyDef::new("status", Type::String).default_value("new")),
            )
            .with(
                ClassDef::new("Invoice")
                    .table("invoice")
                    .property(PropertyDef::new("id", Type::Int).primary_key())
                    .property(PropertyDef::new("contact", Type::Entity("Contact".into())))
                    .constructor_arg("contact"),
            )
            .with(
                ClassDef::new("Receipt")
                    .table("receipt")
                    .property(PropertyDef::new("total", Type::Float))
                    .constructor_arg("total"),
            )
    }

    #[test]
    fn defaults_are_applied() {
        let entity = DefaultEntityFactory::new()
            .create("Contact", &registry())
            .unwrap();

        assert_eq!(entity.value("status"), Some(&Value::from("new")));
        assert_eq!(entity.value("id"), Some(&Value::Null));
    }

    #[test]
    fn entity_arguments_are_created() {
        let entity = DefaultEntityFactory::new()
            .create("Invoice", &registry())
            .unwrap();

        let contact = entity.get("contact").and_then(PropertyValue::as_entity).unwrap();
        assert_eq!(contact.class_name(), "Contact");
    }

    #[test]
    fn first_failure_is_reported() {
        let err = DefaultEntityFactory::new()
            .create("Receipt", &registry())
            .unwrap_err();

        assert!(err.is_mapping());
        assert_eq!(
            err.to_string(),
            "mapping error on Receipt: construction requires arguments: total"
        );
    }

    #[test]
    fn registered_constructor_wins() {
        let factory = DefaultEntityFactory::new().register("Receipt", |def| {
            let mut entity = Entity::new(&def.name);
            entity.set("total", 0.0);
            Ok(entity)
        });

        let entity = factory.create("Receipt", &registry()).unwrap();
        assert_eq!(entity.value("total"), Some(&Value::F64(0.0)));
    }

    #[test]
    fn unknown_class() {
        let err = DefaultEntityFactory::new()
            .create("Nope", &registry())
            .unwrap_err();
        assert!(err.is_mapping());
    }
}
