//! SQL-level statements. Every property path has already been resolved to a
//! table alias and column, so serializing never consults the mapping.

mod delete;
pub use delete::Delete;

mod expr;
pub use expr::{ColumnRef, Expr, RawPart};

mod filter;
pub use filter::{Condition, Filter, FilterItem};

mod insert;
pub use insert::{Insert, Upsert};

mod join;
pub use join::{Join, TableRef};

mod select;
pub use select::{Select, SelectItem, Source};

mod update;
pub use update::Update;

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(Select),
    Insert(Insert),
    Update(Update),
    Delete(Delete),
}

impl From<Select> for Statement {
    fn from(value: Select) -> Self {
        Self::Select(value)
    }
}

impl From<Insert> for Statement {
    fn from(value: Insert) -> Self {
        Self::Insert(value)
    }
}

impl From<Update> for Statement {
    fn from(value: Update) -> Self {
        Self::Update(value)
    }
}

impl From<Delete> for Statement {
    fn from(value: Delete) -> Self {
        Self::Delete(value)
    }
}
