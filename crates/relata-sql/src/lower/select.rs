use super::Lower;
use crate::stmt::{ColumnRef, Condition, Join, Select, SelectItem, Source, TableRef};

use relata_core::{
    mapping::column_alias,
    stmt::{FieldExpression, JoinKind, Joiner, LatestRecord, PropertyPath, SelectQuery},
    Error, Result,
};

/// Alias of the table joined to find newer records.
const LATEST_ALIAS: &str = "latest";

impl Lower<'_> {
    pub(crate) fn lower_select(&mut self, query: &SelectQuery) -> Result<Select> {
        let mut select = Select::new(Source::Table(self.root()));

        // Explicit join aliases must be in scope before any field refers to
        // them
        select.joins = self.joins(&query.base)?;

        select.fields = query
            .base
            .fields
            .iter()
            .map(|field| self.select_item(field))
            .collect::<Result<_>>()?;

        select.filter = self.filter(&query.base.criteria)?;

        if let Some(latest) = &query.latest {
            let (join, newest) = self.latest(latest)?;
            select.latest = Some(join);
            select.filter.group();
            select.filter.push(Joiner::And, newest);
        }

        select.group_by = query
            .group_by
            .iter()
            .map(|field| self.field(field))
            .collect::<Result<_>>()?;

        select.having = self.filter(&query.having)?;

        select.order_by = query
            .order_by
            .iter()
            .map(|order_by| Ok((self.field(&order_by.field)?, order_by.direction)))
            .collect::<Result<_>>()?;

        select.limit = query.limit;
        select.offset = query.offset;

        Ok(select)
    }

    fn select_item(&self, field: &FieldExpression) -> Result<SelectItem> {
        Ok(SelectItem {
            expr: self.field(field)?,
            alias: field.as_property().map(|path| column_alias(path.parts())),
        })
    }

    /// The anti-join keeping only the newest record of each group and the
    /// condition that rejects rows with a newer sibling.
    fn latest(&self, latest: &LatestRecord) -> Result<(Join, Condition)> {
        let group = self.root_column(&latest.group_property)?;
        let recency = self.root_column(&latest.recency_property)?;

        let Some(pk) = self.mapping.primary_key().first().and_then(|prop| prop.column_name()) else {
            return Err(Error::mapping(
                self.mapping.class_name(),
                None,
                "latest record lookup needs a primary key",
            ));
        };

        let table = self.mapping.table();
        let join = Join {
            kind: JoinKind::Left,
            table: TableRef {
                name: table.name.clone(),
                alias: Some(LATEST_ALIAS.to_string()),
            },
            on: vec![
                Condition::Binary {
                    lhs: ColumnRef::new(LATEST_ALIAS, &group.column).into(),
                    op: "=",
                    rhs: group.clone().into(),
                },
                Condition::Binary {
                    lhs: ColumnRef::new(LATEST_ALIAS, &recency.column).into(),
                    op: ">",
                    rhs: recency.into(),
                },
            ],
            extra: Default::default(),
        };

        let newest = Condition::IsNull {
            lhs: ColumnRef::new(LATEST_ALIAS, pk).into(),
            negated: false,
        };

        Ok((join, newest))
    }

    /// Column of a property stored in the root table.
    pub(crate) fn root_column(&self, path: &PropertyPath) -> Result<ColumnRef> {
        let column = self.column(path)?;

        if column.table.as_deref() != Some(self.root_alias()) {
            return Err(Error::query(format!(
                "`{path}` is not stored in the `{}` table",
                self.mapping.table().name
            )));
        }

        Ok(column)
    }
}
