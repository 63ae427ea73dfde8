//! The storage collaborator: whatever actually runs SQL.
//!
//! Relata never opens connections itself. Implementations are handed rendered
//! SQL with named `:param_N` placeholders and keep the result of the last
//! statement around for the `fetch_*` calls that follow it.

use crate::Result;

use indexmap::IndexMap;
use relata_core::stmt::Value;
use std::rc::Rc;

/// One result row, keyed by column alias.
pub type Row = IndexMap<String, Value>;

pub trait Storage {
    /// Run a statement. `Ok(false)` means the statement did not succeed and
    /// is treated as having touched no rows.
    fn execute_query(&self, sql: &str, params: &IndexMap<String, Value>) -> Result<bool>;

    /// Next row of the last result, if any.
    fn fetch_result(&self) -> Result<Option<Row>>;

    /// Every remaining row of the last result.
    fn fetch_results(&self) -> Result<Vec<Row>>;

    /// First column of the next row.
    fn fetch_value(&self) -> Result<Option<Value>> {
        Ok(self
            .fetch_result()?
            .and_then(|row| row.into_iter().next().map(|(_, value)| value)))
    }

    /// First column of every remaining row.
    fn fetch_values(&self) -> Result<Vec<Value>> {
        Ok(self
            .fetch_results()?
            .into_iter()
            .filter_map(|row| row.into_iter().next().map(|(_, value)| value))
            .collect())
    }

    /// Rows touched by the last write.
    fn affected_record_count(&self) -> u64;

    /// Key generated by the last insert.
    fn last_insert_id(&self) -> Option<Value>;

    fn begin_transaction(&self) -> Result<()>;

    fn commit(&self) -> Result<()>;

    fn rollback(&self) -> Result<()>;
}

impl<T: Storage + ?Sized> Storage for Rc<T> {
    fn execute_query(&self, sql: &str, params: &IndexMap<String, Value>) -> Result<bool> {
        (**self).execute_query(sql, params)
    }

    fn fetch_result(&self) -> Result<Option<Row>> {
        (**self).fetch_result()
    }

    fn fetch_results(&self) -> Result<Vec<Row>> {
        (**self).fetch_results()
    }

    fn fetch_value(&self) -> Result<Option<Value>> {
        (**self).fetch_value()
    }

    fn fetch_values(&self) -> Result<Vec<Value>> {
        (**self).fetch_values()
    }

    fn affected_record_count(&self) -> u64 {
        (**self).affected_record_count()
    }

    fn last_insert_id(&self) -> Option<Value> {
        (**self).last_insert_id()
    }

    fn begin_transaction(&self) -> Result<()> {
        (**self).begin_transaction()
    }

    fn commit(&self) -> Result<()> {
        (**self).commit()
    }

    fn rollback(&self) -> Result<()> {
        (**self).rollback()
    }
}
