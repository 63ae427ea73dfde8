use super::PropertyPath;
use crate::{Error, Result};

use std::fmt;

const AGGREGATE_FUNCTIONS: &[&str] = &["COUNT(", "SUM(", "AVG(", "MIN(", "MAX(", "GROUP_CONCAT("];

/// A reference to either a property path or a raw computed expression.
///
/// A bare identifier path (`child.parent.name`) is a property reference.
/// Anything else is a raw expression in which property paths are delimited by
/// `%`, e.g. `CONCAT(%firstName%, ' ', %lastName%)`. Text inside single
/// quotes is never scanned for delimiters.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum FieldExpression {
    Property(PropertyPath),
    Raw(Vec<ExprPart>),
}

/// A segment of a raw expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExprPart {
    Literal(String),
    Property(PropertyPath),
}

impl FieldExpression {
    /// Parse `src`, detecting property-path mode automatically.
    pub fn new(src: &str) -> Result<Self> {
        let src = src.trim();

        if PropertyPath::is_path(src) {
            return Ok(Self::Property(PropertyPath::parse(src)?));
        }

        Self::raw(src)
    }

    pub fn property(path: PropertyPath) -> Self {
        Self::Property(path)
    }

    /// Parse a raw expression, extracting `%`-delimited property paths.
    pub fn raw(src: &str) -> Result<Self> {
        let mut parts = vec![];
        let mut literal = String::new();
        let mut chars = src.chars();
        let mut in_quote = false;

        while let Some(c) = chars.next() {
            match c {
                '\'' => {
                    in_quote = !in_quote;
                    literal.push(c);
                }
                '%' if !in_quote => {
                    let mut name = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == '%' {
                            closed = true;
                            break;
                        }
                        name.push(c);
                    }

                    if !closed {
                        return Err(Error::query(format!(
                            "unterminated property reference in expression `{src}`"
                        )));
                    }

                    if !literal.is_empty() {
                        parts.push(ExprPart::Literal(std::mem::take(&mut literal)));
                    }
                    parts.push(ExprPart::Property(PropertyPath::parse(name.trim())?));
                }
                c => literal.push(c),
            }
        }

        if !literal.is_empty() {
            parts.push(ExprPart::Literal(literal));
        }

        Ok(Self::Raw(parts))
    }

    pub fn as_property(&self) -> Option<&PropertyPath> {
        match self {
            Self::Property(path) => Some(path),
            Self::Raw(_) => None,
        }
    }

    pub fn is_property(&self) -> bool {
        matches!(self, Self::Property(_))
    }

    /// Every property path referenced by the expression.
    pub fn property_paths(&self) -> Vec<&PropertyPath> {
        match self {
            Self::Property(path) => vec![path],
            Self::Raw(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    ExprPart::Property(path) => Some(path),
                    ExprPart::Literal(_) => None,
                })
                .collect(),
        }
    }

    /// Returns `true` if the expression calls an aggregate function.
    pub fn is_aggregate(&self) -> bool {
        let Self::Raw(parts) = self else {
            return false;
        };

        parts.iter().any(|part| match part {
            ExprPart::Literal(text) => {
                let upper = text.to_ascii_uppercase().replace(' ', "");
                AGGREGATE_FUNCTIONS.iter().any(|func| upper.contains(func))
            }
            ExprPart::Property(_) => false,
        })
    }
}

impl From<PropertyPath> for FieldExpression {
    fn from(value: PropertyPath) -> Self {
        Self::Property(value)
    }
}

impl fmt::Display for FieldExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Property(path) => fmt::Display::fmt(path, f),
            Self::Raw(parts) => {
                for part in parts {
                    match part {
                        ExprPart::Literal(text) => f.write_str(text)?,
                        ExprPart::Property(path) => write!(f, "%{path}%")?,
                    }
                }
                Ok(())
            }
        }
    }
}

impl fmt::Debug for FieldExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Property(path) => write!(f, "Property({path})"),
            Self::Raw(_) => write!(f, "Raw({self})"),
        }
    }
}
