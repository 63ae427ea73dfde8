use super::{CriteriaList, Operator, PropertyPath};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JoinKind {
    #[default]
    Left,
    Inner,
}

impl JoinKind {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Left => "LEFT JOIN",
            Self::Inner => "INNER JOIN",
        }
    }
}

/// What a join brings into scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinTarget {
    /// A mapped class; `target_property` names one of its properties
    Class(String),

    /// A bare table; `target_property` names one of its columns
    Table(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinExpression {
    pub target: JoinTarget,

    /// Name under which the joined class is referenced in property paths
    pub alias: String,

    pub kind: JoinKind,

    /// Property path (or, with an alias prefix, a path through another
    /// join) on the left of the `ON` condition
    pub source_property: Option<PropertyPath>,

    pub operator: Operator,

    pub target_property: Option<PropertyPath>,

    /// Extra conditions ANDed onto the `ON` clause
    pub extra_criteria: CriteriaList,

    /// Set when the join is derived from a relationship mapping. Its columns
    /// come from the mapping rather than the source and target properties.
    pub relationship: Option<PropertyPath>,
}

impl JoinExpression {
    /// An explicitly authored join to another class.
    pub fn new(target_class: impl Into<String>, alias: impl Into<String>, kind: JoinKind) -> Self {
        Self {
            target: JoinTarget::Class(target_class.into()),
            alias: alias.into(),
            kind,
            source_property: None,
            operator: Operator::Eq,
            target_property: None,
            extra_criteria: CriteriaList::new(),
            relationship: None,
        }
    }

    /// A join to a bare table.
    pub fn table(table: impl Into<String>, alias: impl Into<String>, kind: JoinKind) -> Self {
        Self {
            target: JoinTarget::Table(table.into()),
            ..Self::new(String::new(), alias, kind)
        }
    }

    /// Join derived from the relationship at `path`.
    pub fn relationship(path: PropertyPath, alias: impl Into<String>, kind: JoinKind) -> Self {
        Self {
            relationship: Some(path),
            ..Self::new(String::new(), alias, kind)
        }
    }

    pub fn on(mut self, source: PropertyPath, operator: Operator, target: PropertyPath) -> Self {
        self.source_property = Some(source);
        self.operator = operator;
        self.target_property = Some(target);
        self
    }

    pub fn is_relationship(&self) -> bool {
        self.relationship.is_some()
    }

    pub fn target_class(&self) -> Option<&str> {
        match &self.target {
            JoinTarget::Class(class) if !self.is_relationship() => Some(class),
            _ => None,
        }
    }
}
