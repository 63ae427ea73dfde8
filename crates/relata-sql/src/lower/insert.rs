use super::Lower;
use crate::stmt::{Expr, Insert, Upsert};

use relata_core::{
    stmt::{CriteriaValue, InsertQuery, PropertyPath, Value},
    Error, Result,
};

impl Lower<'_> {
    pub(crate) fn lower_insert(&mut self, query: &InsertQuery) -> Result<Insert> {
        let mut columns = vec![];
        let mut values = vec![];

        for (path, value) in query.assignments.iter() {
            let column = self.assigned_column(path)?;

            // A path and its foreign key shorthand may name the same column
            if columns.contains(&column) {
                continue;
            }

            values.push(self.assigned_value(path, value)?);
            columns.push(column);
        }

        let upsert = query.on_duplicate_key_update.then(|| {
            let conflict_columns: Vec<String> = self
                .mapping
                .primary_key()
                .iter()
                .filter_map(|prop| prop.column_name().map(String::from))
                .collect();

            Upsert {
                update_columns: columns
                    .iter()
                    .filter(|column| !conflict_columns.contains(column))
                    .cloned()
                    .collect(),
                conflict_columns,
            }
        });

        Ok(Insert {
            table: self.mapping.table().name.clone(),
            columns,
            values,
            upsert,
        })
    }

    /// Column of the root table written for `path`: a scalar of the root
    /// object (or an embedded value), the foreign key behind an owning
    /// to-one, or that foreign key addressed through the child's key
    /// property (`department.id`).
    pub(crate) fn assigned_column(&self, path: &PropertyPath) -> Result<String> {
        let root = self.root_alias();

        if let Some(prop) = self.mapping.property(path) {
            if prop.table_alias == root {
                if let Some(column) = prop.column_name() {
                    return Ok(column.to_string());
                }

                if let Some(relationship) = prop.relationship.as_ref().filter(|r| r.is_owning()) {
                    if let [column] = &relationship.source_columns[..] {
                        return Ok(column.clone());
                    }
                }
            }
        }

        if let Some(parent) = path.parent() {
            let owner = self
                .mapping
                .property(&parent)
                .filter(|prop| prop.table_alias == root);

            if let Some(relationship) = owner
                .and_then(|prop| prop.relationship.as_ref())
                .filter(|relationship| relationship.is_owning())
            {
                let index = relationship
                    .target_key
                    .iter()
                    .position(|key| path.last() == Some(key.property.as_str()));

                if let Some(column) = index.and_then(|i| relationship.source_columns.get(i)) {
                    return Ok(column.clone());
                }
            }
        }

        Err(Error::query(format!(
            "`{path}` is not a column of the `{}` table",
            self.mapping.table().name
        )))
    }

    /// Value written for `path`. Zero-argument functions such as `NOW()`
    /// are emitted inline.
    pub(crate) fn assigned_value(&self, path: &PropertyPath, value: &CriteriaValue) -> Result<Expr> {
        match value {
            CriteriaValue::Value(Value::String(text))
                if self.serializer.is_passthrough_function(text) =>
            {
                Ok(Expr::Inline(text.trim().to_string()))
            }
            CriteriaValue::Value(value) => {
                let stored = self
                    .mapping
                    .property(path)
                    .and_then(|prop| prop.column.as_ref())
                    .and_then(|column| column.unmap_object(value))
                    .unwrap_or_else(|| value.clone());

                Ok(Expr::Value(stored))
            }
            CriteriaValue::Field(field) => self.field(field),
            CriteriaValue::Alias(alias) => Err(Error::query(format!(
                "alias `{}{alias}` assigned to `{path}` has no value",
                CriteriaValue::ALIAS_MARKER
            ))),
        }
    }
}
