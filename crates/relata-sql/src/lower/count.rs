use super::Lower;
use crate::stmt::{Expr, Select, SelectItem, Source};

use relata_core::{stmt::SelectQuery, Result};

/// Alias of the wrapped query when counting through a subquery.
const COUNTED_ALIAS: &str = "counted";

/// Alias of the count column.
pub const COUNT_ALIAS: &str = "record_count";

impl Lower<'_> {
    /// Lower a query counting the records `query` would return, ignoring its
    /// ordering and bounds.
    pub fn lower_count(&mut self, query: &SelectQuery) -> Result<Select> {
        let mut inner = self.lower_select(query)?;
        inner.order_by.clear();
        inner.limit = None;
        inner.offset = None;

        let has_aggregate_field = query.base.fields.iter().any(|field| field.is_aggregate());

        // Grouped or aggregated results can only be counted by running them
        if has_aggregate_field || !query.having.is_empty() || query.group_by.len() > 1 {
            let mut outer = Select::new(Source::Subquery(Box::new(inner), COUNTED_ALIAS.to_string()));
            outer.fields = vec![count_item(Expr::CountAll)];
            return Ok(outer);
        }

        let count = if let [group_by] = &inner.group_by[..] {
            Expr::CountDistinct(vec![group_by.clone()])
        } else if self.multiplies_rows(query) {
            let pk = self
                .mapping
                .primary_key_paths()
                .iter()
                .map(|path| Ok(Expr::Column(self.column(path)?)))
                .collect::<Result<Vec<_>>>()?;

            if pk.is_empty() {
                Expr::CountAll
            } else {
                Expr::CountDistinct(pk)
            }
        } else {
            Expr::CountAll
        };

        inner.group_by.clear();
        inner.fields = vec![count_item(count)];
        Ok(inner)
    }

    /// Returns `true` if a join may repeat root rows.
    fn multiplies_rows(&self, query: &SelectQuery) -> bool {
        query.base.joins.iter().any(|join| match &join.relationship {
            Some(path) => self
                .mapping
                .property(path)
                .and_then(|prop| prop.relationship.as_ref())
                .is_some_and(|relationship| relationship.is_to_many()),
            None => true,
        })
    }
}

fn count_item(expr: Expr) -> SelectItem {
    SelectItem {
        expr,
        alias: Some(COUNT_ALIAS.to_string()),
    }
}
