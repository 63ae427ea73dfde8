use super::{FieldExpression, Value};

/// Right-hand side of a condition or an assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum CriteriaValue {
    /// A literal value, bound as a parameter
    Value(Value),

    /// A named placeholder filled later by `apply_values`
    Alias(String),

    /// Another property or expression
    Field(FieldExpression),
}

impl CriteriaValue {
    /// Marker that introduces an alias in string input.
    pub const ALIAS_MARKER: char = ':';

    pub fn alias(name: impl Into<String>) -> Self {
        Self::Alias(name.into())
    }

    /// A string value that is never read as an alias.
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Value(value.into())
    }

    /// Read a string, treating `:name` as an alias.
    pub fn parse_str(src: &str) -> Self {
        match src.strip_prefix(Self::ALIAS_MARKER) {
            Some(name)
                if !name.is_empty()
                    && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') =>
            {
                Self::Alias(name.to_string())
            }
            _ => Self::Value(Value::String(src.to_string())),
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_alias(&self) -> Option<&str> {
        match self {
            Self::Alias(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Value(Value::Null))
    }
}

impl From<Value> for CriteriaValue {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<FieldExpression> for CriteriaValue {
    fn from(value: FieldExpression) -> Self {
        Self::Field(value)
    }
}

impl From<&str> for CriteriaValue {
    fn from(value: &str) -> Self {
        Self::parse_str(value)
    }
}

impl From<String> for CriteriaValue {
    fn from(value: String) -> Self {
        Self::parse_str(&value)
    }
}

macro_rules! impl_from_value {
    ( $($t:ty),+ ) => {
        $(
            impl From<$t> for CriteriaValue {
                fn from(value: $t) -> Self {
                    Self::Value(value.into())
                }
            }
        )+
    };
}

impl_from_value!(
    bool,
    i32,
    i64,
    u32,
    f64,
    chrono::NaiveDate,
    chrono::NaiveDateTime
);

impl<T: Into<Value>> From<Vec<T>> for CriteriaValue {
    fn from(value: Vec<T>) -> Self {
        Self::Value(value.into())
    }
}

impl<T: Into<Value>> From<Option<T>> for CriteriaValue {
    fn from(value: Option<T>) -> Self {
        Self::Value(value.into())
    }
}
