use super::{CriteriaExpression, CriteriaGroup, PropertyPath, Value};
use crate::{Error, Result};

use indexmap::IndexMap;

/// How an item links to the item before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Joiner {
    #[default]
    And,
    Or,
}

impl Joiner {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CriteriaItem {
    Condition(Joiner, CriteriaExpression),
    Group(CriteriaGroup),
}

/// A flat, bracket-annotated sequence of conditions.
///
/// Rendered after a leading tautology so that every item, including the
/// first, can be emitted with its joiner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CriteriaList {
    pub items: Vec<CriteriaItem>,
}

impl CriteriaList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn push(&mut self, joiner: Joiner, expr: CriteriaExpression) {
        self.items.push(CriteriaItem::Condition(joiner, expr));
    }

    pub fn and(&mut self, expr: CriteriaExpression) {
        self.push(Joiner::And, expr);
    }

    pub fn or(&mut self, expr: CriteriaExpression) {
        self.push(Joiner::Or, expr);
    }

    pub fn start_group(&mut self, joiner: Joiner) {
        self.items.push(CriteriaItem::Group(CriteriaGroup::start(joiner)));
    }

    pub fn end_group(&mut self) {
        self.items.push(CriteriaItem::Group(CriteriaGroup::End));
    }

    /// Append every item of `other`, wrapped in a group when it holds more
    /// than one item.
    pub fn extend_grouped(&mut self, joiner: Joiner, other: CriteriaList) {
        match other.items.len() {
            0 => {}
            1 => {
                let item = other.items.into_iter().next();
                if let Some(CriteriaItem::Condition(_, expr)) = item {
                    self.push(joiner, expr);
                }
            }
            _ => {
                self.start_group(joiner);
                self.items.extend(other.items);
                self.end_group();
            }
        }
    }

    pub fn conditions(&self) -> impl Iterator<Item = &CriteriaExpression> {
        self.items.iter().filter_map(|item| match item {
            CriteriaItem::Condition(_, expr) => Some(expr),
            CriteriaItem::Group(_) => None,
        })
    }

    /// Number of top-level and grouped conditions, not counting nested
    /// and/or children.
    pub fn condition_count(&self) -> usize {
        self.conditions().count()
    }

    /// Check that every group opened is closed, in order.
    pub fn verify_balanced(&self) -> Result<()> {
        let mut depth = 0usize;

        for item in &self.items {
            match item {
                CriteriaItem::Group(group) if group.is_start() => depth += 1,
                CriteriaItem::Group(_) => {
                    depth = depth.checked_sub(1).ok_or_else(|| {
                        Error::query("criteria group closed without a matching start")
                    })?;
                }
                CriteriaItem::Condition(..) => {}
            }
        }

        if depth != 0 {
            return Err(Error::query(format!(
                "{depth} criteria group(s) started but never ended"
            )));
        }

        Ok(())
    }

    /// Fill aliases from `params` everywhere in the list. With
    /// `remove_unbound`, conditions referencing an unbound alias are removed
    /// together with their nested conditions, then groups left empty are
    /// dropped.
    pub fn apply_values(
        &mut self,
        params: &IndexMap<String, Value>,
        remove_unbound: bool,
    ) -> Result<()> {
        let mut kept = Vec::with_capacity(self.items.len());

        for item in self.items.drain(..) {
            match item {
                CriteriaItem::Condition(joiner, mut expr) => {
                    if expr.apply_values(params, remove_unbound)? {
                        kept.push(CriteriaItem::Condition(joiner, expr));
                    }
                }
                group => kept.push(group),
            }
        }

        self.items = kept;
        self.remove_empty_groups();
        Ok(())
    }

    fn remove_empty_groups(&mut self) {
        loop {
            let position = self.items.windows(2).position(|pair| {
                matches!(
                    pair,
                    [CriteriaItem::Group(open), CriteriaItem::Group(CriteriaGroup::End)]
                        if open.is_start()
                )
            });

            match position {
                Some(i) => {
                    self.items.drain(i..i + 2);
                }
                None => return,
            }
        }
    }

    pub fn unbound_aliases(&self) -> Vec<&str> {
        self.conditions()
            .flat_map(CriteriaExpression::unbound_aliases)
            .collect()
    }

    pub fn property_paths(&self) -> Vec<&PropertyPath> {
        self.conditions()
            .flat_map(CriteriaExpression::property_paths)
            .collect()
    }
}

impl From<Vec<CriteriaExpression>> for CriteriaList {
    fn from(exprs: Vec<CriteriaExpression>) -> Self {
        Self {
            items: exprs
                .into_iter()
                .map(|expr| CriteriaItem::Condition(Joiner::And, expr))
                .collect(),
        }
    }
}

impl From<CriteriaExpression> for CriteriaList {
    fn from(expr: CriteriaExpression) -> Self {
        Self::from(vec![expr])
    }
}

impl FromIterator<CriteriaExpression> for CriteriaList {
    fn from_iter<T: IntoIterator<Item = CriteriaExpression>>(iter: T) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}
