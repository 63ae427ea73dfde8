#![allow(dead_code)]

use relata_core::{
    schema::{ClassDef, PropertyDef, Registry, RelationshipDef},
    stmt::{Query, Type},
    Config, MappingResolver,
};
use relata_sql::{Renderer, Serializer, Sql};

/// `FROM` clause of every `Contact` select, which always joins the eager
/// department.
pub const CONTACT_FROM: &str = "FROM contact LEFT JOIN department obj_alias_department \
     ON obj_alias_department.id = contact.department_id";

pub fn registry() -> Registry {
    Registry::new()
        .with(
            ClassDef::new("Contact")
                .table("contact")
                .property(PropertyDef::new("id", Type::Int).primary_key())
                .property(PropertyDef::new("lastName", Type::String))
                .property(PropertyDef::new("status", Type::String))
                .property(PropertyDef::new("date", Type::Date))
                .property(PropertyDef::new("createdAt", Type::DateTime))
                .property(
                    PropertyDef::new("department", Type::Entity("Department".into()))
                        .relationship(RelationshipDef::many_to_one("Department")),
                ),
        )
        .with(
            ClassDef::new("Department")
                .table("department")
                .property(PropertyDef::new("id", Type::Int).primary_key())
                .property(PropertyDef::new("name", Type::String)),
        )
        .with(
            ClassDef::new("Order")
                .table("orders")
                .property(PropertyDef::new("id", Type::Int).primary_key())
                .property(PropertyDef::new("contactId", Type::Int))
                .property(PropertyDef::new("total", Type::Float)),
        )
        .with(
            ClassDef::new("Line")
                .table("line")
                .property(PropertyDef::new("orderId", Type::Int).primary_key())
                .property(PropertyDef::new("lineNo", Type::Int).primary_key())
                .property(PropertyDef::new("sku", Type::String)),
        )
        .with(
            ClassDef::new("Shipment")
                .table("shipment")
                .property(PropertyDef::new("id", Type::Int).primary_key())
                .property(
                    PropertyDef::new("line", Type::Entity("Line".into())).relationship(
                        RelationshipDef::many_to_one("Line")
                            .join_column("line_order_id, line_line_no"),
                    ),
                ),
        )
}

pub fn resolver() -> MappingResolver {
    MappingResolver::new(registry())
}

pub fn config() -> Config {
    Config::default().quote_identifiers(false)
}

/// Finalise and render `query` with unquoted identifiers.
pub fn render(serializer: Serializer, query: impl Into<Query>) -> Sql {
    let resolver = resolver();
    let config = config();
    let renderer = Renderer::new(&resolver, &config, serializer);

    let mut query = query.into();
    renderer.finalise(&mut query).unwrap();
    renderer.render(&query).unwrap()
}

pub fn render_count(serializer: Serializer, query: impl Into<Query>) -> Sql {
    let resolver = resolver();
    let config = config();
    let renderer = Renderer::new(&resolver, &config, serializer);

    let mut query = query.into();
    renderer.finalise(&mut query).unwrap();
    renderer.render_count(&query).unwrap()
}
