#[macro_use]
mod fmt;
use fmt::ToSql;

mod delim;
use delim::{Comma, Delimited};

mod flavor;
use flavor::Flavor;

mod ident;
use ident::Ident;

mod params;
pub use params::{NamedParams, Params, Placeholder};

// Fragment serializers
mod expr;
mod filter;
mod statement;

use crate::stmt::Statement;

/// Serialize a statement to a SQL string
#[derive(Debug, Clone)]
pub struct Serializer {
    /// The database flavor handles the differences between SQL dialects and
    /// supported features.
    flavor: Flavor,

    /// Wrap table and column names in the flavor's identifier quotes
    quote_identifiers: bool,
}

struct Formatter<'a, T> {
    /// Handle to the serializer
    serializer: &'a Serializer,

    /// Where to write the serialized SQL
    dst: &'a mut String,

    /// Where to store parameters
    params: &'a mut T,
}

/// Zero-argument functions emitted inline by every flavor.
const PASSTHROUGH_FUNCTIONS: &[&str] = &["NOW()", "CURRENT_TIMESTAMP", "CURRENT_DATE"];

impl Serializer {
    pub fn serialize(&self, stmt: &Statement, params: &mut impl Params) -> String {
        let mut ret = String::new();

        let mut fmt = Formatter {
            serializer: self,
            dst: &mut ret,
            params,
        };

        stmt.to_sql(&mut fmt);
        ret
    }

    pub fn quote_identifiers(mut self, quote: bool) -> Self {
        self.quote_identifiers = quote;
        self
    }

    /// Returns `true` if a string value is a zero-argument function call
    /// that should be emitted as-is rather than bound.
    pub fn is_passthrough_function(&self, value: &str) -> bool {
        let value = value.trim().to_ascii_uppercase();

        PASSTHROUGH_FUNCTIONS.contains(&value.as_str())
            || (self.is_mysql() && value == "UUID()")
    }

    /// Joined `UPDATE` and `DELETE` statements are MySQL syntax.
    pub fn supports_joined_writes(&self) -> bool {
        self.is_mysql()
    }

    pub fn is_mysql(&self) -> bool {
        matches!(self.flavor, Flavor::Mysql)
    }

    pub fn is_postgresql(&self) -> bool {
        matches!(self.flavor, Flavor::Postgresql)
    }

    pub fn is_sqlite(&self) -> bool {
        matches!(self.flavor, Flavor::Sqlite)
    }
}
