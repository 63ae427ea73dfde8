mod support;

use support::{contact_row, row, MemoryStorage};

use pretty_assertions::assert_eq;
use relata::{
    stmt::{Operator, QueryBuilder},
    Direction, Orm, Paginator, Value,
};
use serde_json::json;

#[test]
fn pagination_counts_then_pages() {
    let storage = MemoryStorage::new();
    storage.respond("COUNT(", vec![row([("record_count", Value::I64(25))])]);
    storage.respond("FROM contact", vec![contact_row(11, "Skywalker", None)]);

    let orm = support::orm(&storage);
    let mut repo = orm.repository("Contact").unwrap();
    repo.set_pagination(Paginator::new(10, 2));

    let page = repo
        .find_by(json!({"status": "active"}), &[("lastName", Direction::Asc)], Some(3), None)
        .unwrap();
    assert_eq!(page.len(), 1);

    let selects = storage.selects();
    assert_eq!(selects.len(), 2);
    assert!(selects[0].starts_with("SELECT COUNT(*) AS record_count"), "{}", selects[0]);
    assert!(!selects[0].contains("LIMIT"), "{}", selects[0]);
    assert!(selects[1].ends_with("ORDER BY contact.last_name ASC LIMIT 10 OFFSET 10"), "{}", selects[1]);

    assert_eq!(repo.pagination().unwrap().total_records(), Some(25));
}

#[test]
fn explicit_bounds_without_pagination() {
    let storage = MemoryStorage::new();
    let orm = support::orm(&storage);
    let mut repo = orm.repository("Contact").unwrap();

    repo.find_by(json!({"status": "active"}), &[], Some(5), Some(20))
        .unwrap();

    assert!(storage.last().sql.ends_with("LIMIT 5 OFFSET 20"), "{}", storage.last().sql);
}

#[test]
fn count_by_reads_the_record_count() {
    let storage = MemoryStorage::new();
    storage.respond("COUNT(", vec![row([("record_count", Value::from("42"))])]);

    let orm = support::orm(&storage);
    let repo = orm.repository("Contact").unwrap();

    assert_eq!(repo.count_by(json!({"lastName": "Solo"})).unwrap(), 42);

    let count = storage.last();
    assert!(count.sql.contains("WHERE 1 AND contact.last_name = :param_1"), "{}", count.sql);
    assert_eq!(count.params["param_1"], Value::from("Solo"));
}

#[test]
fn keyed_results() {
    let storage = MemoryStorage::new();
    storage.respond(
        "FROM contact",
        vec![contact_row(1, "Skywalker", None), contact_row(2, "Organa", None)],
    );

    let orm = support::orm(&storage);
    let mut repo = orm.repository("Contact").unwrap();

    let keyed = repo
        .find_by_keyed(json!(null), "lastName", &[("id", Direction::Asc)])
        .unwrap();

    let keys: Vec<_> = keyed.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["Skywalker", "Organa"]);
    assert_eq!(keyed["Organa"].value("id"), Some(Value::I64(2)));
}

#[test]
fn keyed_results_need_a_key() {
    let storage = MemoryStorage::new();
    storage.respond("FROM contact", vec![contact_row(1, "Skywalker", None)]);

    let orm = support::orm(&storage);
    let mut repo = orm.repository("Contact").unwrap();

    let err = repo.find_by_keyed(json!(null), "department", &[]).unwrap_err();
    assert!(err.is_query(), "{err}");
}

#[test]
fn latest_record_per_group() {
    let storage = MemoryStorage::new();
    let orm = support::orm(&storage);
    let repo = orm.repository("Contact").unwrap();

    repo.find_latest_by(json!({"lastName": "Skywalker"}), "status", "createdAt")
        .unwrap();

    let sql = storage.last().sql;
    assert!(
        sql.contains(
            "LEFT JOIN contact latest ON latest.status = contact.status \
             AND latest.created_at > contact.created_at"
        ),
        "{sql}"
    );
    assert!(sql.contains("latest.id IS NULL"), "{sql}");
}

#[test]
fn list_of_keys_filters_the_primary_key() {
    let storage = MemoryStorage::new();
    let orm = support::orm(&storage);
    let mut repo = orm.repository("Contact").unwrap();

    repo.find_by(json!([1, 2, 3]), &[], None, None).unwrap();

    let select = storage.last();
    assert!(
        select.sql.contains("contact.id IN (:param_1, :param_2, :param_3)"),
        "{}",
        select.sql
    );
}

#[test]
fn built_select_is_hydrated() {
    let storage = MemoryStorage::new();
    storage.respond("FROM contact", vec![contact_row(1, "Skywalker", None)]);

    let orm = support::orm(&storage);
    let repo = orm.repository("Contact").unwrap();

    let query = QueryBuilder::new()
        .from("Contact")
        .where_("lastName", Operator::Like, "Sky%")
        .order_by("createdAt", Direction::Desc)
        .limit(1)
        .build_select_query()
        .unwrap();

    let found = repo.find_by_query(query).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].value("lastName"), Some(Value::from("Skywalker")));
    assert!(storage.last().sql.contains("contact.last_name LIKE :param_1"));
}

#[test]
fn execute_runs_writes_only() {
    let storage = MemoryStorage::new();
    let orm = support::orm(&storage);
    let repo = orm.repository("Contact").unwrap();

    let update = QueryBuilder::new()
        .update("Contact")
        .set("status", "archived")
        .where_("status", Operator::Eq, "inactive")
        .build_update_query()
        .unwrap();

    assert_eq!(repo.execute(update).unwrap(), 1);
    assert_eq!(
        storage.last().sql,
        "UPDATE contact SET status = :param_1 WHERE 1 AND contact.status = :param_2"
    );

    let select = QueryBuilder::new()
        .from("Contact")
        .build_select_query()
        .unwrap();
    assert!(repo.execute(select).unwrap_err().is_query());
}

#[test]
fn null_with_a_comparison_is_rejected() {
    let storage = MemoryStorage::new();
    let orm = support::orm(&storage);
    let repo = orm.repository("Contact").unwrap();

    let criteria = json!({"lastName": {"operator": ">", "value": null}});
    assert!(repo.count_by(&criteria).unwrap_err().is_query());
    assert!(storage.log().is_empty());
}

#[test]
fn registered_repository_hook_runs() {
    let storage = MemoryStorage::new();
    let orm = Orm::builder(support::registry(), storage.clone())
        .config(support::config())
        .repository("invoices", |repo| repo.set_config_option("maxDepth", json!(1)))
        .build();

    let repo = orm.repository("Invoice").unwrap();
    assert_eq!(repo.config().max_depth, 1);

    // Classes without a custom repository keep the session configuration
    let contacts = orm.repository("Contact").unwrap();
    assert_eq!(contacts.config().max_depth, support::config().max_depth);
}

#[test]
fn unregistered_repository_is_a_mapping_error() {
    let storage = MemoryStorage::new();
    let orm = support::orm(&storage);

    let err = orm.repository("Invoice").unwrap_err();
    assert!(err.is_mapping(), "{err}");
    assert!(err.to_string().contains("invoices"), "{err}");
}

#[test]
fn transaction_passthrough() {
    let storage = MemoryStorage::new();
    let orm = support::orm(&storage);
    let repo = orm.repository("Contact").unwrap();

    repo.begin_transaction().unwrap();
    repo.rollback().unwrap();
    repo.begin_transaction().unwrap();
    repo.commit().unwrap();

    assert_eq!(storage.statements(), vec!["BEGIN", "ROLLBACK", "BEGIN", "COMMIT"]);
}
