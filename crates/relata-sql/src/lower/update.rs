use super::Lower;
use crate::stmt::{ColumnRef, Update};

use relata_core::{stmt::UpdateQuery, Error, Result};

impl Lower<'_> {
    pub(crate) fn lower_update(&mut self, query: &UpdateQuery) -> Result<Update> {
        let joins = self.joins(&query.base)?;

        if !joins.is_empty() && !self.serializer.supports_joined_writes() {
            return Err(Error::query(format!(
                "update of `{}` filters through a join, which this database does not support",
                query.base.class_name
            )));
        }

        let mut assignments: Vec<(ColumnRef, _)> = vec![];

        for (path, value) in query.assignments.iter() {
            let column = self.assigned_column(path)?;

            if assignments.iter().any(|(existing, _)| existing.column == column) {
                continue;
            }

            let column = if joins.is_empty() {
                ColumnRef::bare(column)
            } else {
                ColumnRef::new(self.root_alias(), column)
            };

            assignments.push((column, self.assigned_value(path, value)?));
        }

        Ok(Update {
            table: self.root(),
            joins,
            assignments,
            filter: self.filter(&query.base.criteria)?,
        })
    }
}
