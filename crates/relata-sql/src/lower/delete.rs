use super::Lower;
use crate::stmt::Delete;

use relata_core::{stmt::DeleteQuery, Error, Result};

impl Lower<'_> {
    pub(crate) fn lower_delete(&mut self, query: &DeleteQuery) -> Result<Delete> {
        let joins = self.joins(&query.base)?;

        if !joins.is_empty() && !self.serializer.supports_joined_writes() {
            return Err(Error::query(format!(
                "delete from `{}` filters through a join, which this database does not support",
                query.base.class_name
            )));
        }

        Ok(Delete {
            table: self.root(),
            joins,
            filter: self.filter(&query.base.criteria)?,
        })
    }
}
