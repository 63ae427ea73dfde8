use super::Expr;

#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub table: String,

    pub columns: Vec<String>,

    pub values: Vec<Expr>,

    pub upsert: Option<Upsert>,
}

/// Update instead of failing when a key already exists.
#[derive(Debug, Clone, PartialEq)]
pub struct Upsert {
    /// Key columns the conflict is detected on
    pub conflict_columns: Vec<String>,

    /// Columns overwritten with the inserted values
    pub update_columns: Vec<String>,
}
