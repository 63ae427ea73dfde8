use super::{Comma, Delimited, Flavor, Formatter, Params, ToSql};

use crate::stmt::{Condition, FilterItem};

/// A keyword followed by the leading tautology and every filter item, e.g.
/// `WHERE 1 AND a = ? AND (b = ? OR c = ?)`.
pub(super) struct Clause<'a> {
    pub(super) keyword: &'static str,
    pub(super) items: &'a [FilterItem],
}

/// Items appended after an existing condition, e.g. extra `ON` criteria.
pub(super) struct Trailing<'a>(pub(super) &'a [FilterItem]);

impl ToSql for Clause<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        if self.items.is_empty() {
            return;
        }

        let tautology = match f.serializer.flavor {
            Flavor::Postgresql => "TRUE",
            Flavor::Mysql | Flavor::Sqlite => "1",
        };

        fmt!(f, " " self.keyword " " tautology Trailing(self.items));
    }
}

impl ToSql for Trailing<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        // No joiner is written right after an opening bracket
        let mut after_open = false;

        for (i, item) in self.0.iter().enumerate() {
            // The first item follows a condition the caller already wrote and
            // is always ANDed so it cannot widen the filter
            let joiner = match item {
                FilterItem::Condition(joiner, _) | FilterItem::Open(joiner) if i > 0 => {
                    joiner.as_sql()
                }
                _ => "AND",
            };

            match item {
                FilterItem::Condition(_, condition) => {
                    if !after_open {
                        fmt!(f, " " joiner " ");
                    }
                    fmt!(f, condition);
                    after_open = false;
                }
                FilterItem::Open(_) => {
                    if !after_open {
                        fmt!(f, " " joiner " ");
                    }
                    fmt!(f, "(");
                    after_open = true;
                }
                FilterItem::Close => {
                    fmt!(f, ")");
                    after_open = false;
                }
            }
        }
    }
}

impl ToSql for &Condition {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match self {
            Condition::Binary { lhs, op, rhs } => {
                let op: &str = op;
                fmt!(f, lhs " " op " " rhs)
            }
            Condition::Between { lhs, low, high } => {
                fmt!(f, lhs " BETWEEN " low " AND " high)
            }
            Condition::InList { lhs, negated, list } => {
                let op = if *negated { " NOT IN (" } else { " IN (" };
                fmt!(f, lhs op Comma(list) ")")
            }
            Condition::IsNull { lhs, negated } => {
                let op = if *negated { " IS NOT NULL" } else { " IS NULL" };
                fmt!(f, lhs op)
            }
            Condition::Constant(true) => fmt!(f, "1 = 1"),
            Condition::Constant(false) => fmt!(f, "1 = 0"),
            Condition::Nested { base, and, or } => {
                fmt!(f, "(" base.as_ref());
                for condition in and {
                    fmt!(f, " AND " condition);
                }
                for condition in or {
                    fmt!(f, " OR " condition);
                }
                fmt!(f, ")");
            }
        }
    }
}

/// Conditions ANDed together.
pub(super) struct And<'a>(pub(super) &'a [Condition]);

impl ToSql for And<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        Delimited(self.0, " AND ").to_sql(f);
    }
}
