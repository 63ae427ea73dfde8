use crate::{Error, Result};

use std::{fmt, str::FromStr};

/// Comparison operator of a single criteria condition.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Between,
    In,
    NotIn,
    Is,
    IsNot,
    Like,
    BeginsWith,
    EndsWith,
    Contains,
}

impl Operator {
    /// Operators that compare against NULL.
    pub fn is_null_check(self) -> bool {
        matches!(self, Self::Is | Self::IsNot)
    }

    pub fn is_list(self) -> bool {
        matches!(self, Self::In | Self::NotIn)
    }

    /// Operators that lower to `LIKE` with wildcards.
    pub fn is_pattern(self) -> bool {
        matches!(self, Self::BeginsWith | Self::EndsWith | Self::Contains)
    }

    /// Wrap an already scalar-coerced operand with the pattern wildcards.
    pub fn apply_wildcards(self, operand: &str) -> String {
        match self {
            Self::BeginsWith => format!("{operand}%"),
            Self::EndsWith => format!("%{operand}"),
            Self::Contains => format!("%{operand}%"),
            _ => operand.to_string(),
        }
    }

    /// SQL spelling of the operator.
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Between => "BETWEEN",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
            Self::Is => "IS",
            Self::IsNot => "IS NOT",
            Self::Like | Self::BeginsWith | Self::EndsWith | Self::Contains => "LIKE",
        }
    }
}

impl FromStr for Operator {
    type Err = Error;

    fn from_str(src: &str) -> Result<Self> {
        let normalized = src.trim().to_ascii_uppercase().replace(' ', "_");

        Ok(match normalized.as_str() {
            "=" | "==" => Self::Eq,
            "!=" | "<>" => Self::Ne,
            ">" => Self::Gt,
            ">=" => Self::Ge,
            "<" => Self::Lt,
            "<=" => Self::Le,
            "BETWEEN" => Self::Between,
            "IN" => Self::In,
            "NOT_IN" => Self::NotIn,
            "IS" => Self::Is,
            "IS_NOT" => Self::IsNot,
            "LIKE" => Self::Like,
            "BEGINS_WITH" => Self::BeginsWith,
            "ENDS_WITH" => Self::EndsWith,
            "CONTAINS" => Self::Contains,
            _ => return Err(Error::query(format!("unsupported operator `{src}`"))),
        })
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BeginsWith => "BEGINS_WITH",
            Self::EndsWith => "ENDS_WITH",
            Self::Contains => "CONTAINS",
            op => op.as_sql(),
        })
    }
}

impl fmt::Debug for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_spellings() {
        assert_eq!("=".parse::<Operator>().unwrap(), Operator::Eq);
        assert_eq!("not in".parse::<Operator>().unwrap(), Operator::NotIn);
        assert_eq!("IS NOT".parse::<Operator>().unwrap(), Operator::IsNot);
        assert_eq!("begins_with".parse::<Operator>().unwrap(), Operator::BeginsWith);
        assert!("~".parse::<Operator>().unwrap_err().is_query());
    }

    #[test]
    fn wildcards() {
        assert_eq!(Operator::BeginsWith.apply_wildcards("Sky"), "Sky%");
        assert_eq!(Operator::EndsWith.apply_wildcards("walker"), "%walker");
        assert_eq!(Operator::Contains.apply_wildcards("yw"), "%yw%");
        assert_eq!(Operator::Contains.as_sql(), "LIKE");
    }
}
