use super::Expr;

use relata_core::stmt::Joiner;

/// A linear, bracket-annotated condition list, rendered after a leading
/// tautology.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub items: Vec<FilterItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterItem {
    Condition(Joiner, Condition),
    Open(Joiner),
    Close,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Binary {
        lhs: Expr,
        op: &'static str,
        rhs: Expr,
    },

    Between {
        lhs: Expr,
        low: Expr,
        high: Expr,
    },

    InList {
        lhs: Expr,
        negated: bool,
        list: Vec<Expr>,
    },

    IsNull {
        lhs: Expr,
        negated: bool,
    },

    /// `1 = 1` or `1 = 0`
    Constant(bool),

    /// A condition with the nested conditions that share its parentheses
    Nested {
        base: Box<Condition>,
        and: Vec<Condition>,
        or: Vec<Condition>,
    },
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, joiner: Joiner, condition: Condition) {
        self.items.push(FilterItem::Condition(joiner, condition));
    }

    /// Number of conditions, not counting nested ones.
    pub fn condition_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| matches!(item, FilterItem::Condition(..)))
            .count()
    }

    /// Wrap the current items in a group so a condition ANDed after them
    /// keeps its precedence.
    pub fn group(&mut self) {
        if self.items.len() > 1 {
            self.items.insert(0, FilterItem::Open(Joiner::And));
            self.items.push(FilterItem::Close);
        }
    }
}
