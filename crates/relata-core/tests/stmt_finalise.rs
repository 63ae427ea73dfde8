use relata_core::{
    schema::{ClassDef, PropertyDef, Registry, RelationshipDef},
    stmt::{Direction, Operator, PropertyPath, Query, QueryBuilder, Type},
    Config, MappingResolver,
};

use pretty_assertions::assert_eq;

fn resolver() -> MappingResolver {
    MappingResolver::new(
        Registry::new()
            .with(
                ClassDef::new("Contact")
                    .table("contact")
                    .property(PropertyDef::new("id", Type::Int).primary_key())
                    .property(PropertyDef::new("lastName", Type::String))
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
            ),
    )
}

fn select() -> Query {
    QueryBuilder::new()
        .from("Contact")
        .where_("lastName", Operator::Eq, "Skywalker")
        .build_select_query()
        .unwrap()
        .into()
}

#[test]
fn fills_defaults() {
    let resolver = resolver();
    let mapping = resolver.resolve("Contact", &Config::default()).unwrap();

    let mut query = select();
    query.finalise(&mapping).unwrap();

    let Query::Select(select) = &query else {
        panic!("expected a select");
    };

    let fields: Vec<_> = select.base.fields.iter().map(|f| f.to_string()).collect();
    assert_eq!(fields, ["id", "lastName", "department.id", "department.name"]);

    assert_eq!(select.order_by.len(), 1);
    assert_eq!(select.order_by[0].field.to_string(), "id");
    assert_eq!(select.order_by[0].direction, Direction::Asc);

    assert_eq!(select.base.joins.len(), 1);
    assert_eq!(select.base.joins[0].alias, "obj_alias_department");
    assert_eq!(
        select.base.joins[0].relationship,
        Some(PropertyPath::parse("department").unwrap())
    );
}

#[test]
fn finalise_is_idempotent() {
    let resolver = resolver();
    let mapping = resolver.resolve("Contact", &Config::default()).unwrap();

    let mut once = select();
    once.finalise(&mapping).unwrap();

    let mut twice = once.clone();
    twice.finalise(&mapping).unwrap();

    assert_eq!(once, twice);
    assert!(twice.is_finalised());
}

#[test]
fn finalise_checks_the_class() {
    let resolver = resolver();
    let mapping = resolver.resolve("Department", &Config::default()).unwrap();

    let err = select().finalise(&mapping).unwrap_err();
    assert!(err.is_query());
}

#[test]
fn explicit_order_is_kept() {
    let resolver = resolver();
    let mapping = resolver.resolve("Contact", &Config::default()).unwrap();

    let mut query: Query = QueryBuilder::new()
        .from("Contact")
        .order_by("lastName", Direction::Desc)
        .build_select_query()
        .unwrap()
        .into();
    query.finalise(&mapping).unwrap();

    let Query::Select(select) = query else {
        panic!("expected a select");
    };
    assert_eq!(select.order_by.len(), 1);
    assert_eq!(select.order_by[0].direction, Direction::Desc);
}

#[test]
fn required_paths_skip_explicit_aliases() {
    let query: Query = QueryBuilder::new()
        .from("Contact")
        .left_join("Order", "o")
        .on("id", Operator::Eq, "o.contactId")
        .where_("department.name", Operator::Eq, "Sales")
        .and("o.total", Operator::Gt, 10)
        .build_select_query()
        .unwrap()
        .into();

    let paths: Vec<_> = query.required_paths().iter().map(|p| p.to_string()).collect();
    assert_eq!(paths, ["department.name", "id"]);
}

#[test]
fn update_without_assignments() {
    let resolver = resolver();
    let mapping = resolver.resolve("Contact", &Config::default()).unwrap();

    let mut query: Query = QueryBuilder::new()
        .update("Contact")
        .where_("id", Operator::Eq, 1)
        .build_update_query()
        .unwrap()
        .into();

    assert!(query.finalise(&mapping).unwrap_err().is_query());
}
