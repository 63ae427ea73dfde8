use super::Lower;
use crate::stmt::{Condition, Expr, Filter, FilterItem};

use relata_core::{
    mapping::PropertyMapping,
    stmt::{
        CriteriaExpression, CriteriaItem, CriteriaList, CriteriaValue, Operator,
        Value,
    },
    Error, Result,
};

impl Lower<'_> {
    pub(crate) fn filter(&self, criteria: &CriteriaList) -> Result<Filter> {
        let mut filter = Filter::new();

        for item in &criteria.items {
            filter.items.push(match item {
                CriteriaItem::Condition(joiner, expr) => {
                    FilterItem::Condition(*joiner, self.condition(expr)?)
                }
                CriteriaItem::Group(group) => match group.joiner() {
                    Some(joiner) => FilterItem::Open(joiner),
                    None => FilterItem::Close,
                },
            });
        }

        Ok(filter)
    }

    pub(crate) fn condition(&self, expr: &CriteriaExpression) -> Result<Condition> {
        let lhs = self.field(&expr.property)?;
        let prop = expr.property.as_property().and_then(|path| self.property(path));

        let base = match expr.operator {
            Operator::Is | Operator::IsNot => {
                self.bound(expr, &expr.value)?;
                Condition::IsNull {
                    lhs,
                    negated: expr.operator == Operator::IsNot,
                }
            }
            Operator::Between => {
                let Some(value2) = &expr.value2 else {
                    return Err(Error::query(format!(
                        "BETWEEN on `{}` requires two values",
                        expr.property
                    )));
                };

                Condition::Between {
                    lhs,
                    low: self.operand(expr, &expr.value, prop)?,
                    high: self.operand(expr, value2, prop)?,
                }
            }
            Operator::In | Operator::NotIn => {
                let negated = expr.operator == Operator::NotIn;
                let list = match &expr.value {
                    CriteriaValue::Value(Value::List(items)) => items
                        .iter()
                        .map(|item| Expr::Value(stored(item, prop)))
                        .collect(),
                    value => vec![self.operand(expr, value, prop)?],
                };

                if list.is_empty() {
                    // Nothing is in an empty list
                    Condition::Constant(negated)
                } else {
                    Condition::InList { lhs, negated, list }
                }
            }
            operator if operator.is_pattern() => {
                let value = self.bound(expr, &expr.value)?;
                let Some(operand) = value.and_then(|value| stored(value, prop).to_scalar_string())
                else {
                    return Err(Error::query(format!(
                        "{operator} on `{}` needs a scalar value",
                        expr.property
                    )));
                };

                Condition::Binary {
                    lhs,
                    op: operator.as_sql(),
                    rhs: Expr::Value(Value::String(operator.apply_wildcards(&operand))),
                }
            }
            operator => match &expr.value {
                // A NULL that reached this far compares as a null check
                CriteriaValue::Value(Value::Null) if matches!(operator, Operator::Eq | Operator::Ne) => {
                    Condition::IsNull {
                        lhs,
                        negated: operator == Operator::Ne,
                    }
                }
                value => Condition::Binary {
                    lhs,
                    op: operator.as_sql(),
                    rhs: self.operand(expr, value, prop)?,
                },
            },
        };

        if !expr.has_children() {
            return Ok(base);
        }

        Ok(Condition::Nested {
            base: Box::new(base),
            and: expr
                .and_expressions
                .iter()
                .map(|child| self.condition(child))
                .collect::<Result<_>>()?,
            or: expr
                .or_expressions
                .iter()
                .map(|child| self.condition(child))
                .collect::<Result<_>>()?,
        })
    }

    fn operand(
        &self,
        expr: &CriteriaExpression,
        value: &CriteriaValue,
        prop: Option<&PropertyMapping>,
    ) -> Result<Expr> {
        match value {
            CriteriaValue::Field(field) => self.field(field),
            value => {
                let value = self.bound(expr, value)?.unwrap_or(&Value::Null);
                Ok(Expr::Value(stored(value, prop)))
            }
        }
    }

    /// The literal behind `value`. Fields have none; an unbound alias is an
    /// error.
    fn bound<'v>(
        &self,
        expr: &CriteriaExpression,
        value: &'v CriteriaValue,
    ) -> Result<Option<&'v Value>> {
        match value {
            CriteriaValue::Value(value) => Ok(Some(value)),
            CriteriaValue::Field(_) => Ok(None),
            CriteriaValue::Alias(alias) => Err(Error::query(format!(
                "alias `{}{alias}` on `{}` has no value",
                CriteriaValue::ALIAS_MARKER,
                expr.property
            ))),
        }
    }
}

/// Translate an object value to its stored form through the column's value
/// map.
fn stored(value: &Value, prop: Option<&PropertyMapping>) -> Value {
    prop.and_then(|prop| prop.column.as_ref())
        .and_then(|column| column.unmap_object(value))
        .unwrap_or_else(|| value.clone())
}
