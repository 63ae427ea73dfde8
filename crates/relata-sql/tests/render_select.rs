mod support;

use support::CONTACT_FROM;

use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use relata_core::{
    schema::{ClassDef, PropertyDef, Registry},
    stmt::{
        normalize, CriteriaExpression, Direction, NormalizeOptions, Operator, Query, QueryBuilder,
        Type, Value,
    },
    MappingResolver,
};
use relata_sql::{Renderer, Serializer};
use serde_json::json;

fn criteria(json: serde_json::Value) -> relata_core::stmt::CriteriaList {
    normalize(&json, &NormalizeOptions::default().primary_key("id")).unwrap()
}

#[test]
fn simple_filter() {
    let resolver = MappingResolver::new(
        Registry::new().with(
            ClassDef::new("Contact")
                .table("contact")
                .property(PropertyDef::new("id", Type::Int).primary_key())
                .property(PropertyDef::new("lastName", Type::String)),
        ),
    );
    let config = support::config();
    let renderer = Renderer::new(&resolver, &config, Serializer::mysql());

    let mut query: Query = QueryBuilder::new()
        .from("Contact")
        .where_criteria(criteria(json!({ "lastName": "Skywalker" })))
        .build_select_query()
        .unwrap()
        .into();

    renderer.finalise(&mut query).unwrap();
    let sql = renderer.render(&query).unwrap();

    assert_eq!(
        sql.text,
        "SELECT contact.id AS id, contact.last_name AS lastName FROM contact \
         WHERE 1 AND contact.last_name = :param_1 ORDER BY contact.id ASC"
    );
    assert_eq!(
        sql.params,
        IndexMap::from([("param_1".to_string(), Value::from("Skywalker"))])
    );
}

#[test]
fn default_fields_follow_eager_joins() {
    let query = QueryBuilder::new().from("Contact").build_select_query().unwrap();
    let sql = support::render(Serializer::mysql(), query);

    assert_eq!(
        sql.text,
        format!(
            "SELECT contact.id AS id, contact.last_name AS lastName, contact.status AS status, \
             contact.date AS date, contact.created_at AS createdAt, \
             obj_alias_department.id AS department__id, \
             obj_alias_department.name AS department__name \
             {CONTACT_FROM} ORDER BY contact.id ASC"
        )
    );
    assert!(sql.params.is_empty());
}

#[test]
fn between() {
    let query = QueryBuilder::new()
        .from("Contact")
        .select(["id"])
        .where_criteria(criteria(json!({
            "date": { "operator": "BETWEEN", "value": "2018-12-01", "value2": "2018-12-31" }
        })))
        .build_select_query()
        .unwrap();

    let sql = support::render(Serializer::mysql(), query);

    assert_eq!(
        sql.text,
        format!(
            "SELECT contact.id AS id {CONTACT_FROM} \
             WHERE 1 AND contact.date BETWEEN :param_1 AND :param_2 ORDER BY contact.id ASC"
        )
    );
    assert_eq!(sql.params["param_1"], Value::from("2018-12-01"));
    assert_eq!(sql.params["param_2"], Value::from("2018-12-31"));
}

#[test]
fn between_without_upper_bound() {
    let err = normalize(
        &json!({ "date": { "operator": "BETWEEN", "value": "2018-12-01" } }),
        &NormalizeOptions::default(),
    )
    .unwrap_err();

    assert!(err.is_query());
}

#[test]
fn empty_in_list() {
    let query = QueryBuilder::new()
        .from("Contact")
        .select(["id"])
        .where_criteria(criteria(json!({ "status": { "operator": "IN", "value": [] } })))
        .and_expression(CriteriaExpression::compare("lastName", Operator::NotIn, Vec::<String>::new()).unwrap())
        .build_select_query()
        .unwrap();

    let sql = support::render(Serializer::mysql(), query);

    assert_eq!(
        sql.text,
        format!("SELECT contact.id AS id {CONTACT_FROM} WHERE 1 AND 1 = 0 AND 1 = 1 ORDER BY contact.id ASC")
    );
    assert!(sql.params.is_empty());
}

#[test]
fn integer_list_filters_primary_key() {
    let query = QueryBuilder::new()
        .from("Contact")
        .select(["id"])
        .where_criteria(criteria(json!([3, 5])))
        .build_select_query()
        .unwrap();

    let sql = support::render(Serializer::mysql(), query);

    assert!(sql
        .text
        .contains("WHERE 1 AND contact.id IN (:param_1, :param_2) ORDER BY"));
    assert_eq!(sql.params["param_2"], Value::I64(5));
}

#[test]
fn unbound_aliases_are_pruned() {
    let mut query: Query = QueryBuilder::new()
        .from("Contact")
        .select(["id"])
        .where_("lastName", Operator::Eq, ":name")
        .and_expression(
            CriteriaExpression::eq("status", ":status")
                .unwrap()
                .and(CriteriaExpression::eq("date", "2018-12-01").unwrap()),
        )
        .and("id", Operator::Gt, 3)
        .build_select_query()
        .unwrap()
        .into();

    let params = IndexMap::from([("name".to_string(), Value::from("Skywalker"))]);
    query.apply_values(&params, true).unwrap();

    let sql = support::render(Serializer::mysql(), query);

    assert_eq!(
        sql.text,
        format!(
            "SELECT contact.id AS id {CONTACT_FROM} \
             WHERE 1 AND contact.last_name = :param_1 AND contact.id > :param_2 \
             ORDER BY contact.id ASC"
        )
    );
    assert_eq!(sql.params.len(), 2);
}

#[test]
fn unbound_alias_fails_rendering() {
    let resolver = support::resolver();
    let config = support::config();
    let renderer = Renderer::new(&resolver, &config, Serializer::mysql());

    let mut query: Query = QueryBuilder::new()
        .from("Contact")
        .where_("lastName", Operator::Eq, ":name")
        .build_select_query()
        .unwrap()
        .into();

    query.apply_values(&IndexMap::new(), false).unwrap();
    renderer.finalise(&mut query).unwrap();

    let err = renderer.render(&query).unwrap_err();
    assert!(err.is_query());
    assert!(err.to_string().contains(":name"));
}

#[test]
fn null_turns_equality_into_null_check() {
    let mut query: Query = QueryBuilder::new()
        .from("Contact")
        .select(["id"])
        .where_("status", Operator::Eq, ":status")
        .build_select_query()
        .unwrap()
        .into();

    let params = IndexMap::from([("status".to_string(), Value::Null)]);
    query.apply_values(&params, true).unwrap();

    let sql = support::render(Serializer::mysql(), query);
    assert!(sql.text.contains("WHERE 1 AND contact.status IS NULL ORDER BY"));
}

#[test]
fn rendering_requires_finalise() {
    let resolver = support::resolver();
    let config = support::config();
    let renderer = Renderer::new(&resolver, &config, Serializer::mysql());

    let query: Query = QueryBuilder::new()
        .from("Contact")
        .build_select_query()
        .unwrap()
        .into();

    let err = renderer.render(&query).unwrap_err();
    assert!(err.is_query());
}

#[test]
fn finalise_twice_renders_the_same() {
    let resolver = support::resolver();
    let config = support::config();
    let renderer = Renderer::new(&resolver, &config, Serializer::mysql());

    let mut query: Query = QueryBuilder::new()
        .from("Contact")
        .where_("department.name", Operator::Eq, "Sales")
        .build_select_query()
        .unwrap()
        .into();

    renderer.finalise(&mut query).unwrap();
    let once = renderer.render(&query).unwrap();

    renderer.finalise(&mut query).unwrap();
    let twice = renderer.render(&query).unwrap();

    assert_eq!(once, twice);
}

#[test]
fn groups_and_nested_conditions() {
    let query = QueryBuilder::new()
        .from("Contact")
        .select(["id"])
        .where_("lastName", Operator::Eq, "Skywalker")
        .and_start()
        .and("status", Operator::Eq, "active")
        .or("status", Operator::Eq, "pending")
        .end()
        .and_expression(
            CriteriaExpression::compare("date", Operator::Ge, "2018-01-01")
                .unwrap()
                .or(CriteriaExpression::is_null("date").unwrap()),
        )
        .build_select_query()
        .unwrap();

    let sql = support::render(Serializer::mysql(), query);

    assert_eq!(
        sql.text,
        format!(
            "SELECT contact.id AS id {CONTACT_FROM} \
             WHERE 1 AND contact.last_name = :param_1 \
             AND (contact.status = :param_2 OR contact.status = :param_3) \
             AND (contact.date >= :param_4 OR contact.date IS NULL) \
             ORDER BY contact.id ASC"
        )
    );
}

#[test]
fn pattern_operators_add_wildcards() {
    let query = QueryBuilder::new()
        .from("Contact")
        .select(["id"])
        .where_("lastName", Operator::BeginsWith, "Sky")
        .and("status", Operator::Contains, "ct")
        .and("id", Operator::EndsWith, 7)
        .build_select_query()
        .unwrap();

    let sql = support::render(Serializer::mysql(), query);

    assert!(sql.text.contains(
        "WHERE 1 AND contact.last_name LIKE :param_1 AND contact.status LIKE :param_2 \
         AND contact.id LIKE :param_3"
    ));
    assert_eq!(sql.params["param_1"], Value::from("Sky%"));
    assert_eq!(sql.params["param_2"], Value::from("%ct%"));
    assert_eq!(sql.params["param_3"], Value::from("%7"));
}

#[test]
fn composite_key_join() {
    let query = QueryBuilder::new()
        .from("Shipment")
        .select(["id"])
        .build_select_query()
        .unwrap();

    let sql = support::render(Serializer::mysql(), query);

    assert_eq!(
        sql.text,
        "SELECT shipment.id AS id FROM shipment \
         LEFT JOIN line obj_alias_line ON obj_alias_line.order_id = shipment.line_order_id \
         AND obj_alias_line.line_no = shipment.line_line_no \
         ORDER BY shipment.id ASC"
    );
}

#[test]
fn explicit_join() {
    let query = QueryBuilder::new()
        .from("Contact")
        .select(["id", "o.total"])
        .left_join("Order", "o")
        .on("id", Operator::Eq, "o.contactId")
        .and("o.total", Operator::Gt, 10)
        .where_("lastName", Operator::Eq, "Skywalker")
        .build_select_query()
        .unwrap();

    let sql = support::render(Serializer::mysql(), query);

    assert_eq!(
        sql.text,
        format!(
            "SELECT contact.id AS id, o.total AS o__total {CONTACT_FROM} \
             LEFT JOIN orders o ON contact.id = o.contact_id AND o.total > :param_1 \
             WHERE 1 AND contact.last_name = :param_2 ORDER BY contact.id ASC"
        )
    );
    assert_eq!(sql.params["param_1"], Value::I64(10));
}

#[test]
fn aliases_in_join_conditions_are_bound() {
    let query = || -> Query {
        QueryBuilder::new()
            .from("Contact")
            .select(["id"])
            .left_join("Order", "o")
            .on("id", Operator::Eq, "o.contactId")
            .and("o.total", Operator::Gt, ":minimum")
            .build_select_query()
            .unwrap()
            .into()
    };

    let mut bound = query();
    let params = IndexMap::from([("minimum".to_string(), Value::I64(10))]);
    bound.apply_values(&params, true).unwrap();

    let sql = support::render(Serializer::mysql(), bound);
    assert!(
        sql.text.contains("LEFT JOIN orders o ON contact.id = o.contact_id AND o.total > :param_1"),
        "{}",
        sql.text
    );
    assert_eq!(sql.params["param_1"], Value::I64(10));

    let mut pruned = query();
    pruned.apply_values(&IndexMap::new(), true).unwrap();

    let sql = support::render(Serializer::mysql(), pruned);
    assert!(sql.text.contains("LEFT JOIN orders o ON contact.id = o.contact_id"), "{}", sql.text);
    assert!(!sql.text.contains("o.total"), "{}", sql.text);
    assert!(sql.params.is_empty());
}

#[test]
fn latest_record_join() {
    let query = QueryBuilder::new()
        .from("Contact")
        .select(["id"])
        .where_("lastName", Operator::Eq, "Skywalker")
        .or("lastName", Operator::Eq, "Solo")
        .latest("status", "createdAt")
        .build_select_query()
        .unwrap();

    let sql = support::render(Serializer::mysql(), query);

    assert_eq!(
        sql.text,
        "SELECT contact.id AS id FROM contact \
         LEFT JOIN contact latest ON latest.status = contact.status \
         AND latest.created_at > contact.created_at \
         LEFT JOIN department obj_alias_department \
         ON obj_alias_department.id = contact.department_id \
         WHERE 1 AND (contact.last_name = :param_1 OR contact.last_name = :param_2) \
         AND latest.id IS NULL ORDER BY contact.id ASC"
    );
}

#[test]
fn group_by_and_having() {
    let query = QueryBuilder::new()
        .from("Contact")
        .select(["status", "COUNT(%id%)"])
        .group_by(["status"])
        .having("COUNT(%id%)", Operator::Gt, 1)
        .build_select_query()
        .unwrap();

    let sql = support::render(Serializer::mysql(), query);

    assert_eq!(
        sql.text,
        format!(
            "SELECT contact.status AS status, COUNT(contact.id) {CONTACT_FROM} \
             GROUP BY contact.status HAVING 1 AND COUNT(contact.id) > :param_1"
        )
    );
}

#[test]
fn order_limit_offset() {
    let query = QueryBuilder::new()
        .from("Contact")
        .select(["id"])
        .order_by("lastName", Direction::Desc)
        .limit(10)
        .offset(20)
        .build_select_query()
        .unwrap();

    let sql = support::render(Serializer::mysql(), query);

    assert_eq!(
        sql.text,
        format!("SELECT contact.id AS id {CONTACT_FROM} ORDER BY contact.last_name DESC LIMIT 10 OFFSET 20")
    );
}

#[test]
fn offset_without_limit() {
    let query = || {
        QueryBuilder::new()
            .from("Contact")
            .select(["id"])
            .offset(5)
            .build_select_query()
            .unwrap()
    };

    let mysql = support::render(Serializer::mysql(), query());
    assert!(mysql.text.ends_with("ASC LIMIT 18446744073709551615 OFFSET 5"));

    let sqlite = support::render(Serializer::sqlite(), query());
    assert!(sqlite.text.ends_with("ASC LIMIT -1 OFFSET 5"));

    let postgresql = support::render(Serializer::postgresql(), query());
    assert!(postgresql.text.ends_with("ASC OFFSET 5"));
}

#[test]
fn unknown_property() {
    let resolver = support::resolver();
    let config = support::config();
    let renderer = Renderer::new(&resolver, &config, Serializer::mysql());

    let mut query: Query = QueryBuilder::new()
        .from("Contact")
        .where_("nickname", Operator::Eq, "Luke")
        .build_select_query()
        .unwrap()
        .into();

    renderer.finalise(&mut query).unwrap();

    let err = renderer.render(&query).unwrap_err();
    assert!(err.is_query());
    assert!(err.to_string().contains("nickname"));
}
