#![allow(dead_code)]

use indexmap::IndexMap;
use relata::{
    schema::{ClassDef, PropertyDef, RelationshipDef, TableDef},
    stmt::Type,
    Config, Direction, Error, Orm, Registry, Result, Row, Storage, Value,
};
use std::{
    cell::RefCell,
    collections::VecDeque,
    rc::Rc,
};

/// A statement as the storage received it.
#[derive(Debug, Clone, PartialEq)]
pub struct Executed {
    pub sql: String,
    pub params: IndexMap<String, Value>,
}

/// Storage that records every statement and answers selects from canned
/// rows.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    state: RefCell<State>,
}

#[derive(Debug, Default)]
struct State {
    log: Vec<Executed>,
    responses: Vec<(String, Vec<Row>)>,
    pending: VecDeque<Row>,
    affected: u64,
    next_id: i64,
    last_insert_id: Option<Value>,
    fail_on: Option<String>,
}

impl MemoryStorage {
    pub fn new() -> Rc<Self> {
        let storage = Self::default();
        storage.state.borrow_mut().next_id = 100;
        Rc::new(storage)
    }

    /// Answer selects containing `pattern` with `rows`. Earlier patterns win.
    pub fn respond(&self, pattern: &str, rows: Vec<Row>) {
        self.state
            .borrow_mut()
            .responses
            .push((pattern.to_string(), rows));
    }

    /// Fail statements containing `pattern`.
    pub fn fail_on(&self, pattern: &str) {
        self.state.borrow_mut().fail_on = Some(pattern.to_string());
    }

    pub fn log(&self) -> Vec<Executed> {
        self.state.borrow().log.clone()
    }

    pub fn statements(&self) -> Vec<String> {
        self.state.borrow().log.iter().map(|e| e.sql.clone()).collect()
    }

    /// Every statement except selects.
    pub fn writes(&self) -> Vec<String> {
        self.statements()
            .into_iter()
            .filter(|sql| !sql.starts_with("SELECT"))
            .collect()
    }

    pub fn selects(&self) -> Vec<String> {
        self.statements()
            .into_iter()
            .filter(|sql| sql.starts_with("SELECT"))
            .collect()
    }

    pub fn last(&self) -> Executed {
        self.state.borrow().log.last().cloned().unwrap()
    }

    pub fn clear_log(&self) {
        self.state.borrow_mut().log.clear();
    }
}

impl Storage for MemoryStorage {
    fn execute_query(&self, sql: &str, params: &IndexMap<String, Value>) -> Result<bool> {
        let mut state = self.state.borrow_mut();

        state.log.push(Executed {
            sql: sql.to_string(),
            params: params.clone(),
        });

        if let Some(pattern) = &state.fail_on {
            if sql.contains(pattern.as_str()) {
                return Err(Error::storage(std::io::Error::other(format!(
                    "statement failed: {sql}"
                ))));
            }
        }

        if sql.starts_with("SELECT") {
            let rows = state
                .responses
                .iter()
                .find(|(pattern, _)| sql.contains(pattern.as_str()))
                .map(|(_, rows)| rows.clone())
                .unwrap_or_default();

            state.affected = rows.len() as u64;
            state.pending = rows.into();
            return Ok(true);
        }

        state.affected = 1;
        state.pending.clear();

        if sql.starts_with("INSERT") {
            let id = state.next_id;
            state.next_id += 1;
            state.last_insert_id = Some(Value::I64(id));
        }

        Ok(true)
    }

    fn fetch_result(&self) -> Result<Option<Row>> {
        Ok(self.state.borrow_mut().pending.pop_front())
    }

    fn fetch_results(&self) -> Result<Vec<Row>> {
        Ok(self.state.borrow_mut().pending.drain(..).collect())
    }

    fn affected_record_count(&self) -> u64 {
        self.state.borrow().affected
    }

    fn last_insert_id(&self) -> Option<Value> {
        self.state.borrow().last_insert_id.clone()
    }

    fn begin_transaction(&self) -> Result<()> {
        self.record("BEGIN");
        Ok(())
    }

    fn commit(&self) -> Result<()> {
        self.record("COMMIT");
        Ok(())
    }

    fn rollback(&self) -> Result<()> {
        self.record("ROLLBACK");
        Ok(())
    }
}

impl MemoryStorage {
    fn record(&self, sql: &str) {
        self.state.borrow_mut().log.push(Executed {
            sql: sql.to_string(),
            params: IndexMap::new(),
        });
    }
}

/// Build a row from `(alias, value)` pairs.
pub fn row<const N: usize>(columns: [(&str, Value); N]) -> Row {
    columns
        .into_iter()
        .map(|(alias, value)| (alias.to_string(), value))
        .collect()
}

pub fn contact_row(id: i64, last_name: &str, department: Option<(i64, &str)>) -> Row {
    let mut row = row([
        ("id", Value::I64(id)),
        ("firstName", Value::from("Luke")),
        ("lastName", Value::from(last_name)),
        ("status", Value::from("active")),
        ("createdAt", Value::from("2018-12-01 10:30:00")),
        ("score", Value::I64(7)),
        ("address__street", Value::from("1 Moisture Farm")),
        ("address__town", Value::from("Anchorhead")),
    ]);

    match department {
        Some((id, name)) => {
            row.insert("department__id".to_string(), Value::I64(id));
            row.insert("department__name".to_string(), Value::from(name));
        }
        None => {
            row.insert("department__id".to_string(), Value::Null);
            row.insert("department__name".to_string(), Value::Null);
        }
    }

    row
}

pub fn order_row(id: i64, total: f64, contact_id: i64) -> Row {
    row([
        ("id", Value::I64(id)),
        ("total", Value::F64(total)),
        ("contact__id", Value::I64(contact_id)),
    ])
}

pub fn registry() -> Registry {
    Registry::new()
        .with(
            ClassDef::new("Contact")
                .table("contact")
                .property(PropertyDef::new("id", Type::Int).auto_increment())
                .property(PropertyDef::new("firstName", Type::String))
                .property(PropertyDef::new("lastName", Type::String))
                .property(PropertyDef::new("status", Type::String).default_value("new"))
                .property(PropertyDef::new("createdAt", Type::DateTime).nullable())
                .property(PropertyDef::new("score", Type::Int).read_only())
                .property(
                    PropertyDef::new("department", Type::Entity("Department".into()))
                        .nullable()
                        .relationship(RelationshipDef::many_to_one("Department")),
                )
                .property(
                    PropertyDef::new("address", Type::Entity("Address".into()))
                        .relationship(RelationshipDef::embedded("Address", "address_")),
                )
                .property(
                    PropertyDef::new("orders", Type::Collection("Order".into())).relationship(
                        RelationshipDef::one_to_many("Order")
                            .mapped_by("contact")
                            .order_by("id", Direction::Asc)
                            .cascade_deletes()
                            .orphan_removal(),
                    ),
                )
                .property(
                    PropertyDef::new("tags", Type::Collection("Tag".into())).relationship(
                        RelationshipDef::many_to_many("Tag").bridge("contact_tag", "contact_id", "tag_id"),
                    ),
                ),
        )
        .with(
            ClassDef::new("Department")
                .table("department")
                .property(PropertyDef::new("id", Type::Int).auto_increment())
                .property(PropertyDef::new("name", Type::String)),
        )
        .with(
            ClassDef::new("Address")
                .property(PropertyDef::new("street", Type::String))
                .property(PropertyDef::new("town", Type::String)),
        )
        .with(
            ClassDef::new("Order")
                .table("orders")
                .property(PropertyDef::new("id", Type::Int).auto_increment())
                .property(PropertyDef::new("total", Type::Float))
                .property(
                    PropertyDef::new("contact", Type::Entity("Contact".into()))
                        .relationship(RelationshipDef::many_to_one("Contact").lazy(true)),
                ),
        )
        .with(
            ClassDef::new("Tag")
                .table("tag")
                .property(PropertyDef::new("id", Type::Int).auto_increment())
                .property(PropertyDef::new("label", Type::String)),
        )
        .with(
            ClassDef::new("Invoice")
                .table_def(TableDef::new("invoice").repository("invoices"))
                .property(PropertyDef::new("id", Type::Int).auto_increment())
                .property(PropertyDef::new("total", Type::Float)),
        )
}

pub fn config() -> Config {
    Config::default().quote_identifiers(false)
}

/// A session over `storage` with unquoted identifiers.
pub fn orm(storage: &Rc<MemoryStorage>) -> Orm {
    Orm::builder(registry(), storage.clone()).config(config()).build()
}
