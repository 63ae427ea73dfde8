use super::filter::{And, Clause, Trailing};
use super::{Comma, Flavor, Formatter, Ident, Params, ToSql};

use crate::stmt::{
    Delete, Expr, Insert, Join, Select, SelectItem, Source, Statement, TableRef, Update, Upsert,
};

use relata_core::stmt::Direction;

impl ToSql for &Statement {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match self {
            Statement::Select(stmt) => stmt.to_sql(f),
            Statement::Insert(stmt) => stmt.to_sql(f),
            Statement::Update(stmt) => stmt.to_sql(f),
            Statement::Delete(stmt) => stmt.to_sql(f),
        }
    }
}

impl ToSql for &Select {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let filter = Clause {
            keyword: "WHERE",
            items: &self.filter.items,
        };
        let having = Clause {
            keyword: "HAVING",
            items: &self.having.items,
        };

        let source = &self.source;

        fmt!(f, "SELECT " Comma(&self.fields) " FROM " source);

        if let Some(latest) = &self.latest {
            fmt!(f, " " latest);
        }

        for join in &self.joins {
            fmt!(f, " " join);
        }

        fmt!(f, filter);

        if !self.group_by.is_empty() {
            fmt!(f, " GROUP BY " Comma(&self.group_by));
        }

        fmt!(f, having);

        if !self.order_by.is_empty() {
            let order_by = self.order_by.iter().map(|(expr, direction)| Ordered(expr, *direction));
            fmt!(f, " ORDER BY " Comma(order_by));
        }

        Bounds(self.limit, self.offset).to_sql(f);
    }
}

impl ToSql for &SelectItem {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let expr = &self.expr;
        fmt!(f, expr);

        if let Some(alias) = &self.alias {
            fmt!(f, " AS " Ident(alias));
        }
    }
}

impl ToSql for &Source {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match self {
            Source::Table(table) => table.to_sql(f),
            Source::Subquery(select, alias) => {
                let select: &Select = select;
                fmt!(f, "(" select ") " Ident(alias));
            }
        }
    }
}

impl ToSql for &TableRef {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, Ident(&self.name));

        if let Some(alias) = &self.alias {
            fmt!(f, " " Ident(alias));
        }
    }
}

impl ToSql for &Join {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let table = &self.table;
        fmt!(f, self.kind.as_sql() " " table);

        if !self.on.is_empty() {
            fmt!(f, " ON " And(&self.on) Trailing(&self.extra.items));
        }
    }
}

struct Ordered<'a>(&'a Expr, Direction);

impl ToSql for Ordered<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, self.0 " " self.1.as_sql());
    }
}

struct Bounds(Option<u64>, Option<u64>);

impl ToSql for Bounds {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match (self.0, self.1) {
            (Some(limit), _) => fmt!(f, " LIMIT " limit),
            // An offset needs a limit on these flavors
            (None, Some(_)) => match f.serializer.flavor {
                Flavor::Mysql => fmt!(f, " LIMIT 18446744073709551615"),
                Flavor::Sqlite => fmt!(f, " LIMIT -1"),
                Flavor::Postgresql => {}
            },
            (None, None) => {}
        }

        if let Some(offset) = self.1 {
            fmt!(f, " OFFSET " offset);
        }
    }
}

impl ToSql for &Insert {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let columns = self.columns.iter().map(Ident);

        fmt!(f, "INSERT INTO " Ident(&self.table) " (" Comma(columns) ") VALUES (" Comma(&self.values) ")");
        self.upsert.as_ref().to_sql(f);
    }
}

impl ToSql for &Upsert {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        if let Flavor::Mysql = f.serializer.flavor {
            // MySQL has no DO NOTHING; assigning a key column to itself keeps the row
            let columns = if self.update_columns.is_empty() {
                &self.conflict_columns
            } else {
                &self.update_columns
            };
            let assignments = columns.iter().map(|column| MysqlUpsert(column));

            fmt!(f, " ON DUPLICATE KEY UPDATE " Comma(assignments));
            return;
        }

        let conflict = self.conflict_columns.iter().map(Ident);
        fmt!(f, " ON CONFLICT (" Comma(conflict) ")");

        if self.update_columns.is_empty() {
            fmt!(f, " DO NOTHING");
        } else {
            let assignments = self.update_columns.iter().map(|column| Excluded(column));
            fmt!(f, " DO UPDATE SET " Comma(assignments));
        }
    }
}

struct MysqlUpsert<'a>(&'a str);

impl ToSql for MysqlUpsert<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, Ident(self.0) " = VALUES(" Ident(self.0) ")");
    }
}

struct Excluded<'a>(&'a str);

impl ToSql for Excluded<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, Ident(self.0) " = excluded." Ident(self.0));
    }
}

impl ToSql for &Update {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let filter = Clause {
            keyword: "WHERE",
            items: &self.filter.items,
        };
        let assignments = self
            .assignments
            .iter()
            .map(|(column, value)| Assignment(column, value));

        let table = &self.table;
        fmt!(f, "UPDATE " table);

        for join in &self.joins {
            fmt!(f, " " join);
        }

        fmt!(f, " SET " Comma(assignments) filter);
    }
}

struct Assignment<'a>(&'a crate::stmt::ColumnRef, &'a Expr);

impl ToSql for Assignment<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, self.0 " = " self.1);
    }
}

impl ToSql for &Delete {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let filter = Clause {
            keyword: "WHERE",
            items: &self.filter.items,
        };

        let table = &self.table;

        if self.joins.is_empty() {
            fmt!(f, "DELETE FROM " table filter);
            return;
        }

        fmt!(f, "DELETE " Ident(table.reference()) " FROM " table);

        for join in &self.joins {
            fmt!(f, " " join);
        }

        fmt!(f, filter);
    }
}
