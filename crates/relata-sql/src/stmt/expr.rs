use relata_core::stmt::Value;

/// `table.column`, or a bare column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub table: Option<String>,
    pub column: String,
}

impl ColumnRef {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            column: column.into(),
        }
    }

    pub fn bare(column: impl Into<String>) -> Self {
        Self {
            table: None,
            column: column.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Column(ColumnRef),

    /// Bound as a parameter
    Value(Value),

    /// Emitted verbatim, e.g. `NOW()`
    Inline(String),

    /// A raw expression with resolved column references
    Raw(Vec<RawPart>),

    /// `COUNT(*)`
    CountAll,

    /// `COUNT(DISTINCT ..)`
    CountDistinct(Vec<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RawPart {
    Sql(String),
    Column(ColumnRef),
}

impl From<ColumnRef> for Expr {
    fn from(value: ColumnRef) -> Self {
        Self::Column(value)
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}
