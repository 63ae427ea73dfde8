mod support;

use support::CONTACT_FROM;

use pretty_assertions::assert_eq;
use relata_core::stmt::{Operator, Query, QueryBuilder};
use relata_sql::{Renderer, Serializer};

#[test]
fn plain_count() {
    let query = QueryBuilder::new()
        .from("Contact")
        .where_("lastName", Operator::Eq, "Skywalker")
        .limit(10)
        .build_select_query()
        .unwrap();

    let sql = support::render_count(Serializer::mysql(), query);

    assert_eq!(
        sql.text,
        format!(
            "SELECT COUNT(*) AS record_count {CONTACT_FROM} \
             WHERE 1 AND contact.last_name = :param_1"
        )
    );
}

#[test]
fn grouped_count_uses_distinct() {
    let query = QueryBuilder::new()
        .from("Contact")
        .select(["status"])
        .group_by(["status"])
        .build_select_query()
        .unwrap();

    let sql = support::render_count(Serializer::mysql(), query);

    assert_eq!(
        sql.text,
        format!("SELECT COUNT(DISTINCT contact.status) AS record_count {CONTACT_FROM}")
    );
}

#[test]
fn aggregate_count_wraps_query() {
    let query = QueryBuilder::new()
        .from("Contact")
        .select(["status", "MAX(%createdAt%)"])
        .group_by(["status"])
        .build_select_query()
        .unwrap();

    let sql = support::render_count(Serializer::mysql(), query);

    assert_eq!(
        sql.text,
        format!(
            "SELECT COUNT(*) AS record_count FROM (SELECT contact.status AS status, \
             MAX(contact.created_at) {CONTACT_FROM} GROUP BY contact.status) counted"
        )
    );
}

#[test]
fn explicit_join_counts_distinct_keys() {
    let query = QueryBuilder::new()
        .from("Contact")
        .inner_join("Order", "o")
        .on("id", Operator::Eq, "contactId")
        .build_select_query()
        .unwrap();

    let sql = support::render_count(Serializer::mysql(), query);

    assert_eq!(
        sql.text,
        format!(
            "SELECT COUNT(DISTINCT contact.id) AS record_count {CONTACT_FROM} \
             INNER JOIN orders o ON contact.id = o.contact_id"
        )
    );
}

#[test]
fn only_selects_are_counted() {
    let resolver = support::resolver();
    let config = support::config();
    let renderer = Renderer::new(&resolver, &config, Serializer::mysql());

    let mut query: Query = QueryBuilder::new()
        .from("Contact")
        .where_("id", Operator::Eq, 1)
        .build_delete_query()
        .unwrap()
        .into();

    renderer.finalise(&mut query).unwrap();
    assert!(renderer.render_count(&query).unwrap_err().is_query());
}
