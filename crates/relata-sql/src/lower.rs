//! Resolve a finalised query against its mapping.
//!
//! Every property path is replaced by a structured column reference before
//! anything is serialized, so rendering never does textual substitution.

mod count;
pub use count::COUNT_ALIAS;

mod criteria;
mod delete;
mod insert;
mod select;
mod update;

use crate::serializer::Serializer;
use crate::stmt::{ColumnRef, Condition, Expr, Join, RawPart, Statement, TableRef};

use indexmap::IndexMap;
use relata_core::{
    mapping::{MappingCollection, PropertyMapping},
    stmt::{
        ExprPart, FieldExpression, JoinExpression, JoinTarget, PropertyPath, Query, QueryBase,
    },
    Config, Error, MappingResolver, Result,
};
use std::sync::Arc;

/// Lowering context of one query.
pub struct Lower<'a> {
    mapping: &'a MappingCollection,
    resolver: &'a MappingResolver,
    config: &'a Config,
    serializer: &'a Serializer,

    /// Explicit joins, by alias
    scopes: IndexMap<String, Scope>,
}

enum Scope {
    Class(Arc<MappingCollection>),
    Table,
}

impl<'a> Lower<'a> {
    pub fn new(
        mapping: &'a MappingCollection,
        resolver: &'a MappingResolver,
        config: &'a Config,
        serializer: &'a Serializer,
    ) -> Self {
        Self {
            mapping,
            resolver,
            config,
            serializer,
            scopes: IndexMap::new(),
        }
    }

    pub fn lower(&mut self, query: &Query) -> Result<Statement> {
        Ok(match query {
            Query::Select(query) => self.lower_select(query)?.into(),
            Query::Insert(query) => self.lower_insert(query)?.into(),
            Query::Update(query) => self.lower_update(query)?.into(),
            Query::Delete(query) => self.lower_delete(query)?.into(),
        })
    }

    fn root(&self) -> TableRef {
        let table = self.mapping.table();
        TableRef::new(&table.name, &table.alias)
    }

    fn root_alias(&self) -> &str {
        &self.mapping.table().alias
    }

    /// Column holding the value at `path`.
    pub fn column(&self, path: &PropertyPath) -> Result<ColumnRef> {
        let scoped = path.first().and_then(|first| self.scopes.get_key_value(first));
        if let Some((alias, scope)) = scoped {
            return self.scoped_column(alias, path, scope);
        }

        let Some(prop) = self.mapping.property(path) else {
            return Err(self.unknown(path));
        };

        mapped_column(prop, &prop.table_alias).ok_or_else(|| {
            Error::query(format!(
                "`{}::{}` is not stored in a column",
                prop.class_name, prop.name
            ))
        })
    }

    fn scoped_column(&self, alias: &str, path: &PropertyPath, scope: &Scope) -> Result<ColumnRef> {
        let Some(tail) = path.tail() else {
            return Err(Error::query(format!("join alias `{alias}` used without a property")));
        };

        match scope {
            Scope::Table => Ok(ColumnRef::new(alias, tail.to_string())),
            Scope::Class(mapping) => {
                let prop = mapping
                    .property(&tail)
                    .filter(|prop| prop.parents.is_empty())
                    .ok_or_else(|| self.unknown(path))?;

                mapped_column(prop, alias).ok_or_else(|| {
                    Error::query(format!(
                        "`{}::{}` is not stored in a column",
                        prop.class_name, prop.name
                    ))
                })
            }
        }
    }

    fn unknown(&self, path: &PropertyPath) -> Error {
        Error::query(format!(
            "unknown property `{path}` on `{}`",
            self.mapping.class_name()
        ))
    }

    pub(crate) fn property(&self, path: &PropertyPath) -> Option<&PropertyMapping> {
        if let Some(Scope::Class(mapping)) = path.first().and_then(|first| self.scopes.get(first)) {
            return mapping.property(&path.tail()?);
        }

        self.mapping.property(path)
    }

    /// Lower a field reference or raw expression.
    pub fn field(&self, field: &FieldExpression) -> Result<Expr> {
        match field {
            FieldExpression::Property(path) => Ok(Expr::Column(self.column(path)?)),
            FieldExpression::Raw(parts) => {
                let parts = parts
                    .iter()
                    .map(|part| {
                        Ok(match part {
                            ExprPart::Literal(sql) => RawPart::Sql(sql.clone()),
                            ExprPart::Property(path) => RawPart::Column(self.column(path)?),
                        })
                    })
                    .collect::<Result<_>>()?;

                Ok(Expr::Raw(parts))
            }
        }
    }

    /// Lower the joins of `base`, registering explicit join aliases as they
    /// are reached.
    fn joins(&mut self, base: &QueryBase) -> Result<Vec<Join>> {
        let mut ret = vec![];

        for join in &base.joins {
            let lowered = match &join.relationship {
                Some(path) => self.relationship_join(join, path)?,
                None => self.explicit_join(join)?,
            };
            ret.push(lowered);
        }

        Ok(ret)
    }

    fn relationship_join(&self, join: &JoinExpression, path: &PropertyPath) -> Result<Join> {
        let Some(mapping) = self.mapping.join_by_alias(&join.alias) else {
            return Err(Error::query(format!(
                "`{path}` is not joined in the mapping of `{}`",
                self.mapping.class_name()
            )));
        };

        let on = mapping
            .on
            .iter()
            .map(|pair| Condition::Binary {
                lhs: ColumnRef::new(&mapping.alias, &pair.target_column).into(),
                op: "=",
                rhs: ColumnRef::new(&pair.source_alias, &pair.source_column).into(),
            })
            .collect();

        Ok(Join {
            kind: join.kind,
            table: TableRef::new(&mapping.table, &mapping.alias),
            on,
            extra: self.filter(&join.extra_criteria)?,
        })
    }

    fn explicit_join(&mut self, join: &JoinExpression) -> Result<Join> {
        let (table, scope) = match &join.target {
            JoinTarget::Table(table) => (table.clone(), Scope::Table),
            JoinTarget::Class(class) => {
                let mapping = self.resolver.resolve(class, self.config)?;
                (mapping.table().name.clone(), Scope::Class(mapping))
            }
        };

        // The target side resolves against the join's own alias
        self.scopes.insert(join.alias.clone(), scope);

        let mut on = vec![];
        if let (Some(source), Some(target)) = (&join.source_property, &join.target_property) {
            // The target may omit the alias it belongs to
            let target = if target.first() == Some(join.alias.as_str()) {
                target.clone()
            } else {
                PropertyPath::from_parts(
                    std::iter::once(join.alias.clone()).chain(target.parts().iter().cloned()),
                )
            };

            on.push(Condition::Binary {
                lhs: self.column(source)?.into(),
                op: join.operator.as_sql(),
                rhs: self.column(&target)?.into(),
            });
        }

        Ok(Join {
            kind: join.kind,
            table: TableRef {
                name: table,
                alias: Some(join.alias.clone()),
            },
            on,
            extra: self.filter(&join.extra_criteria)?,
        })
    }
}

/// Column of `prop` on the table aliased `alias`. An owning to-one is stored
/// in its foreign key.
fn mapped_column(prop: &PropertyMapping, alias: &str) -> Option<ColumnRef> {
    if let Some(column) = prop.column_name() {
        return Some(ColumnRef::new(alias, column));
    }

    match &prop.relationship {
        Some(relationship) if relationship.is_owning() => match &relationship.source_columns[..] {
            [column] => Some(ColumnRef::new(alias, column)),
            _ => None,
        },
        _ => None,
    }
}
