use super::{Comma, Formatter, Ident, Params, ToSql};

use crate::stmt::{ColumnRef, Expr, RawPart};

impl ToSql for &ColumnRef {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        if let Some(table) = &self.table {
            fmt!(f, Ident(table) ".");
        }
        fmt!(f, Ident(&self.column));
    }
}

impl ToSql for &Expr {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match self {
            Expr::Column(column) => column.to_sql(f),
            Expr::Value(value) => {
                let placeholder = f.params.push(value);
                placeholder.to_sql(f);
            }
            Expr::Inline(sql) => fmt!(f, sql),
            Expr::Raw(parts) => {
                for part in parts {
                    match part {
                        RawPart::Sql(sql) => fmt!(f, sql),
                        RawPart::Column(column) => column.to_sql(f),
                    }
                }
            }
            Expr::CountAll => fmt!(f, "COUNT(*)"),
            Expr::CountDistinct(exprs) => fmt!(f, "COUNT(DISTINCT " Comma(exprs) ")"),
        }
    }
}
