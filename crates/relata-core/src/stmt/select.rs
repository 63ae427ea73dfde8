use super::{CriteriaList, FieldExpression, OrderByExpr, PropertyPath, QueryBase};
use crate::{mapping::MappingCollection, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    pub base: QueryBase,

    pub group_by: Vec<FieldExpression>,

    pub having: CriteriaList,

    pub order_by: Vec<OrderByExpr>,

    pub limit: Option<u64>,

    pub offset: Option<u64>,

    /// Restrict results to the most recent record of each group
    pub latest: Option<LatestRecord>,
}

/// Keeps only the row with the highest `recency_property` among rows
/// sharing `group_property`.
#[derive(Debug, Clone, PartialEq)]
pub struct LatestRecord {
    pub group_property: PropertyPath,
    pub recency_property: PropertyPath,
}

impl SelectQuery {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            base: QueryBase::new(class_name),
            group_by: vec![],
            having: CriteriaList::new(),
            order_by: vec![],
            limit: None,
            offset: None,
            latest: None,
        }
    }

    pub fn is_aggregate(&self) -> bool {
        !self.group_by.is_empty() || self.base.fields.iter().any(FieldExpression::is_aggregate)
    }

    pub(crate) fn finalise(&mut self, mapping: &MappingCollection) -> Result<()> {
        if self.base.is_finalised() {
            return Ok(());
        }

        self.base.verify(mapping)?;
        self.having.verify_balanced()?;

        if self.base.fields.is_empty() {
            self.base.fields = mapping
                .fetchable_paths()
                .into_iter()
                .map(FieldExpression::Property)
                .collect();
        }

        if self.order_by.is_empty() && !self.is_aggregate() {
            self.order_by = mapping
                .primary_key_paths()
                .into_iter()
                .map(|path| OrderByExpr::new(FieldExpression::Property(path), Default::default()))
                .collect();
        }

        self.base.add_relationship_joins(mapping, None);
        self.base.latch();

        tracing::trace!(class = %self.base.class_name, joins = self.base.joins.len(), "select finalised");
        Ok(())
    }

    pub(super) fn collect_paths<'a>(&'a self, dst: &mut Vec<&'a PropertyPath>) {
        for field in &self.group_by {
            dst.extend(field.property_paths());
        }

        dst.extend(self.having.property_paths());

        for order_by in &self.order_by {
            dst.extend(order_by.field.property_paths());
        }

        if let Some(latest) = &self.latest {
            dst.push(&latest.group_property);
            dst.push(&latest.recency_property);
        }
    }
}
