use relata_core::{
    config::{ColumnOverride, RelationshipOverride},
    schema::{ClassDef, PropertyDef, Registry, RelationshipDef},
    stmt::{JoinKind, PropertyPath, Type},
    Config, MappingResolver,
};

use pretty_assertions::assert_eq;
use std::sync::Arc;

fn id() -> PropertyDef {
    PropertyDef::new("id", Type::Int).primary_key().auto_increment()
}

fn registry() -> Registry {
    Registry::new()
        .with(
            ClassDef::new("Contact")
                .table("contact")
                .property(id())
                .property(PropertyDef::new("firstName", Type::String))
                .property(PropertyDef::new("lastName", Type::String))
                .property(
                    PropertyDef::new("department", Type::Entity("Department".into()))
                        .relationship(RelationshipDef::many_to_one("Department")),
                )
                .property(
                    PropertyDef::new("orders", Type::Collection("Order".into()))
                        .relationship(RelationshipDef::one_to_many("Order").mapped_by("contact")),
                )
                .property(
                    PropertyDef::new("address", Type::Entity("Address".into()))
                        .relationship(RelationshipDef::embedded("Address", "addr_")),
                )
                .property(
                    PropertyDef::new("statusName", Type::String)
                        .column("status_code")
                        .relationship(RelationshipDef::scalar("status", "code", "name")),
                ),
        )
        .with(
            ClassDef::new("Department")
                .table("department")
                .property(id())
                .property(PropertyDef::new("name", Type::String)),
        )
        .with(
            ClassDef::new("Order")
                .table("orders")
                .property(id())
                .property(PropertyDef::new("total", Type::Float))
                .property(
                    PropertyDef::new("contact", Type::Entity("Contact".into()))
                        .relationship(RelationshipDef::many_to_one("Contact")),
                ),
        )
        .with(
            ClassDef::new("Address")
                .property(PropertyDef::new("street", Type::String))
                .property(PropertyDef::new("town", Type::String)),
        )
        .with(
            ClassDef::new("Person")
                .table("person")
                .property(id())
                .property(PropertyDef::new("name", Type::String))
                .property(
                    PropertyDef::new("parent", Type::Entity("Person".into()))
                        .nullable()
                        .relationship(RelationshipDef::many_to_one("Person")),
                ),
        )
}

fn path(src: &str) -> PropertyPath {
    PropertyPath::parse(src).unwrap()
}

#[test]
fn scalar_columns_use_naming_strategy() {
    let resolver = MappingResolver::new(registry());
    let mapping = resolver.resolve("Contact", &Config::default()).unwrap();

    assert_eq!(mapping.table().name, "contact");
    assert_eq!(mapping.table().alias, "contact");

    let last_name = mapping.property(&path("lastName")).unwrap();
    assert_eq!(last_name.column_name(), Some("last_name"));
    assert_eq!(last_name.table_alias, "contact");
    assert!(last_name.fetchable);

    assert_eq!(mapping.primary_key_paths(), vec![path("id")]);
}

#[test]
fn eager_to_one_is_joined() {
    let resolver = MappingResolver::new(registry());
    let mapping = resolver.resolve("Contact", &Config::default()).unwrap();

    let department = mapping.join_by_alias("obj_alias_department").unwrap();
    assert_eq!(department.table, "department");
    assert_eq!(department.on[0].source_column, "department_id");
    assert_eq!(department.on[0].target_column, "id");

    let name = mapping.property(&path("department.name")).unwrap();
    assert_eq!(name.table_alias, "obj_alias_department");
    assert_eq!(name.column_alias(), "department__name");
}

#[test]
fn to_many_is_late_bound() {
    let resolver = MappingResolver::new(registry());
    let mapping = resolver.resolve("Contact", &Config::default()).unwrap();

    let orders = mapping.property(&path("orders")).unwrap();
    assert!(orders.late_bound);

    let relationship = orders.relationship.as_ref().unwrap();
    assert_eq!(relationship.source_columns, ["id"]);
    assert_eq!(relationship.target_columns, ["contact_id"]);
    assert!(!relationship.load_immediately);

    assert!(mapping.property(&path("orders.total")).is_none());
}

#[test]
fn required_path_forces_a_join() {
    let resolver = MappingResolver::new(registry());
    let mapping = resolver
        .resolve_with("Contact", &Config::default(), &[path("orders.total")])
        .unwrap();

    let total = mapping.property(&path("orders.total")).unwrap();
    assert_eq!(total.table_alias, "obj_alias_orders");
    assert!(!total.fetchable);
    assert!(mapping.property(&path("orders")).unwrap().late_bound);
}

#[test]
fn self_reference_stops_at_max_depth() {
    let resolver = MappingResolver::new(registry());
    let config = Config::default().max_depth(3);
    let mapping = resolver.resolve("Person", &config).unwrap();

    assert!(mapping.property(&path("parent.parent.parent.name")).is_some());
    assert!(!mapping.property(&path("parent.parent")).unwrap().late_bound);

    let deepest = mapping.property(&path("parent.parent.parent.parent")).unwrap();
    assert!(deepest.late_bound);
    assert!(mapping.property(&path("parent.parent.parent.parent.name")).is_none());

    // The late-bound parent's key is read from the foreign key
    let key = mapping.property(&path("parent.parent.parent.parent.id")).unwrap();
    assert!(key.key_only);
    assert_eq!(key.column_name(), Some("parent_id"));
    assert_eq!(key.table_alias, "obj_alias_parent_parent_parent");

    assert_eq!(mapping.max_depth(), 3);
}

#[test]
fn lazy_to_one_keeps_only_the_key() {
    let resolver = MappingResolver::new(registry());
    let config = Config::default().eager_load_to_one(false);
    let mapping = resolver.resolve("Contact", &config).unwrap();

    assert!(mapping.property(&path("department")).unwrap().late_bound);
    assert!(mapping.join_by_alias("obj_alias_department").is_none());

    let key = mapping.property(&path("department.id")).unwrap();
    assert_eq!(key.column_name(), Some("department_id"));
    assert_eq!(key.table_alias, "contact");
}

#[test]
fn embedded_shares_the_parent_table() {
    let resolver = MappingResolver::new(registry());
    let mapping = resolver.resolve("Contact", &Config::default()).unwrap();

    let street = mapping.property(&path("address.street")).unwrap();
    assert_eq!(street.column_name(), Some("addr_street"));
    assert_eq!(street.table_alias, "contact");
}

#[test]
fn scalar_join_is_read_only() {
    let resolver = MappingResolver::new(registry());
    let mapping = resolver.resolve("Contact", &Config::default()).unwrap();

    let status = mapping.property(&path("statusName")).unwrap();
    assert!(status.is_read_only());
    assert!(status.holds_value());
    assert_eq!(status.column_name(), Some("name"));

    let join = mapping.join_by_alias("obj_alias_statusName").unwrap();
    assert_eq!(join.table, "status");
    assert_eq!(join.on[0].source_column, "status_code");
    assert_eq!(join.on[0].target_column, "code");
}

#[test]
fn mapping_is_cached_per_configuration() {
    let resolver = MappingResolver::new(registry());
    let config = Config::default();

    let first = resolver.resolve("Contact", &config).unwrap();
    let second = resolver.resolve("Contact", &config).unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let other = resolver
        .resolve("Contact", &Config::default().max_depth(1))
        .unwrap();
    assert!(!Arc::ptr_eq(&first, &other));
    assert_eq!(resolver.cached_len(), 2);

    resolver.clear_class("Contact");
    assert_eq!(resolver.cached_len(), 0);
}

#[test]
fn serialization_groups_limit_fetchable() {
    let registry = Registry::new().with(
        ClassDef::new("Contact")
            .table("contact")
            .property(id())
            .property(PropertyDef::new("name", Type::String).groups(["summary"]))
            .property(PropertyDef::new("notes", Type::String)),
    );

    let resolver = MappingResolver::new(registry);
    let config = Config::default().serialization_groups(["summary"]);
    let mapping = resolver.resolve("Contact", &config).unwrap();

    assert_eq!(mapping.fetchable_paths(), vec![path("id"), path("name")]);
}

#[test]
fn table_override() {
    let resolver = MappingResolver::new(registry());
    let config = Config::default().table_override("Contact", "people");
    let mapping = resolver.resolve("Contact", &config).unwrap();

    assert_eq!(mapping.table().name, "people");
    assert_eq!(
        mapping.property(&path("lastName")).unwrap().table_alias,
        "people"
    );
}

#[test]
fn column_override_replaces_provider_facts() {
    let resolver = MappingResolver::new(registry());
    let config = Config::default().column_override(
        "Contact",
        "lastName",
        ColumnOverride {
            name: Some("surname".to_string()),
            read_only: Some(true),
            ty: Some(Type::Mixed),
            format: Some("upper".to_string()),
        },
    );
    let mapping = resolver.resolve("Contact", &config).unwrap();

    let last_name = mapping.property(&path("lastName")).unwrap();
    let column = last_name.column.as_ref().unwrap();
    assert_eq!(column.name, "surname");
    assert_eq!(column.ty, Type::Mixed);
    assert_eq!(column.format.as_deref(), Some("upper"));
    assert!(column.read_only);

    // Untouched properties keep what the provider declared
    let first_name = mapping.property(&path("firstName")).unwrap();
    let column = first_name.column.as_ref().unwrap();
    assert_eq!(column.name, "first_name");
    assert_eq!(column.ty, Type::String);
    assert!(!column.read_only);
}

#[test]
fn column_override_reads_from_json() {
    let config = Config::from_json(
        r#"{"columnOverrides": {"Contact.lastName": {"name": "surname", "type": "int"}}}"#,
    )
    .unwrap();

    let resolver = MappingResolver::new(registry());
    let mapping = resolver.resolve("Contact", &config).unwrap();

    let column = mapping.property(&path("lastName")).unwrap().column.clone().unwrap();
    assert_eq!(column.name, "surname");
    assert_eq!(column.ty, Type::Int);
}

#[test]
fn relationship_override_changes_join_and_cascade() {
    let resolver = MappingResolver::new(registry());
    let config = Config::default()
        .relationship_override(
            "Contact",
            "department",
            RelationshipOverride {
                join_type: Some(JoinKind::Inner),
                ..Default::default()
            },
        )
        .relationship_override(
            "Contact",
            "orders",
            RelationshipOverride {
                cascade_deletes: Some(true),
                ..Default::default()
            },
        );
    let mapping = resolver.resolve("Contact", &config).unwrap();

    let department = mapping.join_by_alias("obj_alias_department").unwrap();
    assert_eq!(department.kind, JoinKind::Inner);

    let orders = mapping.property(&path("orders")).unwrap();
    assert!(orders.relationship.as_ref().unwrap().cascade_deletes);
}

#[test]
fn relationship_override_makes_to_one_lazy() {
    let resolver = MappingResolver::new(registry());
    let config = Config::default().relationship_override(
        "Contact",
        "department",
        RelationshipOverride {
            lazy: Some(true),
            ..Default::default()
        },
    );
    let mapping = resolver.resolve("Contact", &config).unwrap();

    assert!(mapping.property(&path("department")).unwrap().late_bound);
    assert!(mapping.join_by_alias("obj_alias_department").is_none());

    let key = mapping.property(&path("department.id")).unwrap();
    assert_eq!(key.column_name(), Some("department_id"));
}

#[test]
fn eager_to_many_loads_immediately() {
    let resolver = MappingResolver::new(registry());
    let config = Config::default().eager_load_to_many(true);
    let mapping = resolver.resolve("Contact", &config).unwrap();

    let orders = mapping.property(&path("orders")).unwrap();
    assert!(orders.late_bound);
    assert!(orders.relationship.as_ref().unwrap().load_immediately);
}
