use super::{Flavor, Formatter, ToSql};

use indexmap::IndexMap;
use relata_core::stmt::Value;

pub trait Params {
    fn push(&mut self, param: &Value) -> Placeholder;
}

pub enum Placeholder {
    /// 1-based position
    Positional(usize),

    Named(String),
}

impl Params for Vec<Value> {
    fn push(&mut self, value: &Value) -> Placeholder {
        self.push(value.clone());
        Placeholder::Positional(self.len())
    }
}

/// Parameters bound by name: `:param_1`, `:param_2`, ...
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedParams {
    values: IndexMap<String, Value>,
}

impl NamedParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn into_inner(self) -> IndexMap<String, Value> {
        self.values
    }
}

impl Params for NamedParams {
    fn push(&mut self, value: &Value) -> Placeholder {
        let name = format!("param_{}", self.values.len() + 1);
        self.values.insert(name.clone(), value.clone());
        Placeholder::Named(name)
    }
}

impl ToSql for Placeholder {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        use std::fmt::Write;

        let _ = match (self, f.serializer.flavor) {
            (Placeholder::Named(name), _) => write!(f.dst, ":{name}"),
            (Placeholder::Positional(_), Flavor::Mysql) => write!(f.dst, "?"),
            (Placeholder::Positional(n), Flavor::Postgresql) => write!(f.dst, "${n}"),
            (Placeholder::Positional(n), Flavor::Sqlite) => write!(f.dst, "?{n}"),
        };
    }
}
