use super::{CriteriaValue, FieldExpression, Operator, PropertyPath, Value};
use crate::{Error, Result};

use indexmap::IndexMap;

/// One filter condition, optionally carrying nested conditions.
///
/// The nested `and_expressions` and `or_expressions` render inside the same
/// parentheses as the condition itself:
/// `(property op value AND <and...> OR <or...>)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CriteriaExpression {
    pub property: FieldExpression,

    pub operator: Operator,

    pub value: CriteriaValue,

    /// Upper bound for `BETWEEN`
    pub value2: Option<CriteriaValue>,

    pub and_expressions: Vec<CriteriaExpression>,

    pub or_expressions: Vec<CriteriaExpression>,
}

impl CriteriaExpression {
    /// Build a validated condition.
    pub fn new(
        property: FieldExpression,
        operator: Operator,
        value: impl Into<CriteriaValue>,
        value2: Option<CriteriaValue>,
    ) -> Result<Self> {
        let mut expr = Self {
            property,
            operator,
            value: value.into(),
            value2,
            and_expressions: vec![],
            or_expressions: vec![],
        };

        expr.verify()?;
        Ok(expr)
    }

    /// Parse `property` and build a condition with a single value.
    pub fn compare(property: &str, operator: Operator, value: impl Into<CriteriaValue>) -> Result<Self> {
        Self::new(FieldExpression::new(property)?, operator, value, None)
    }

    pub fn eq(property: &str, value: impl Into<CriteriaValue>) -> Result<Self> {
        Self::compare(property, Operator::Eq, value)
    }

    pub fn between(
        property: &str,
        low: impl Into<CriteriaValue>,
        high: impl Into<CriteriaValue>,
    ) -> Result<Self> {
        Self::new(
            FieldExpression::new(property)?,
            Operator::Between,
            low,
            Some(high.into()),
        )
    }

    pub fn is_null(property: &str) -> Result<Self> {
        Self::compare(property, Operator::Is, Value::Null)
    }

    pub fn is_not_null(property: &str) -> Result<Self> {
        Self::compare(property, Operator::IsNot, Value::Null)
    }

    /// Build a condition, replacing a NULL used with a non-`IS` operator
    /// by an empty string when `convert_null_to_empty` is set.
    #[deprecated(note = "NULL with a comparison operator masks a wrong filter; use IS / IS NOT")]
    pub fn new_coercing(
        property: FieldExpression,
        operator: Operator,
        value: impl Into<CriteriaValue>,
        value2: Option<CriteriaValue>,
        convert_null_to_empty: bool,
    ) -> Result<Self> {
        let mut value = value.into();

        if convert_null_to_empty && value.is_null() && !operator.is_null_check() {
            tracing::warn!(
                property = %property,
                operator = %operator,
                "coercing NULL to an empty string; use IS / IS NOT instead"
            );
            value = CriteriaValue::Value(Value::String(String::new()));
        }

        Self::new(property, operator, value, value2)
    }

    pub fn and(mut self, expr: CriteriaExpression) -> Self {
        self.and_expressions.push(expr);
        self
    }

    pub fn or(mut self, expr: CriteriaExpression) -> Self {
        self.or_expressions.push(expr);
        self
    }

    pub fn has_children(&self) -> bool {
        !self.and_expressions.is_empty() || !self.or_expressions.is_empty()
    }

    fn verify(&mut self) -> Result<()> {
        match self.operator {
            Operator::Between => {
                if self.value2.is_none() {
                    // A two element list carries both bounds
                    if let CriteriaValue::Value(Value::List(items)) = &self.value {
                        if let [low, high] = &items[..] {
                            let (low, high) = (low.clone(), high.clone());
                            self.value = CriteriaValue::Value(low);
                            self.value2 = Some(CriteriaValue::Value(high));
                            return Ok(());
                        }
                    }

                    return Err(Error::query(format!(
                        "BETWEEN on `{}` requires two values",
                        self.property
                    )));
                }
            }
            Operator::Is | Operator::IsNot => {
                if !self.value.is_null() && self.value.as_alias().is_none() {
                    return Err(Error::query(format!(
                        "{} on `{}` only accepts NULL",
                        self.operator, self.property
                    )));
                }

                if self.value2.is_some() {
                    return Err(Error::query(format!(
                        "{} on `{}` takes no second value",
                        self.operator, self.property
                    )));
                }
            }
            operator => {
                if self.value.is_null() {
                    return Err(Error::query(format!(
                        "NULL compared with {operator} on `{}`; use IS or IS NOT",
                        self.property
                    )));
                }

                if operator.is_list() {
                    // A scalar becomes a list of one
                    if let CriteriaValue::Value(value) = &self.value {
                        if !value.is_list() {
                            self.value = CriteriaValue::Value(Value::List(vec![value.clone()]));
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Fill alias values from `params`.
    ///
    /// Returns `false` when the condition references an unbound alias and
    /// `remove_unbound` is set: the caller drops it along with every nested
    /// condition. Nested conditions with unbound aliases are pruned
    /// individually.
    pub fn apply_values(
        &mut self,
        params: &IndexMap<String, Value>,
        remove_unbound: bool,
    ) -> Result<bool> {
        let bound_value = bind_alias(&mut self.value, params);
        let bound_value2 = match &mut self.value2 {
            Some(value2) => bind_alias(value2, params),
            None => true,
        };

        if !(bound_value && bound_value2) {
            if remove_unbound {
                return Ok(false);
            }
        } else if let CriteriaValue::Value(Value::Null) = self.value {
            // A NULL arriving through an alias turns an equality into a
            // null check
            match self.operator {
                Operator::Eq => self.operator = Operator::Is,
                Operator::Ne => self.operator = Operator::IsNot,
                _ => {}
            }
        }

        self.verify()?;

        prune(&mut self.and_expressions, params, remove_unbound)?;
        prune(&mut self.or_expressions, params, remove_unbound)?;

        Ok(true)
    }

    /// Aliases still waiting for a value, in tree order.
    pub fn unbound_aliases(&self) -> Vec<&str> {
        let mut ret = vec![];
        self.collect_aliases(&mut ret);
        ret
    }

    fn collect_aliases<'a>(&'a self, dst: &mut Vec<&'a str>) {
        dst.extend(self.value.as_alias());
        if let Some(alias) = self.value2.as_ref().and_then(CriteriaValue::as_alias) {
            dst.push(alias);
        }

        for child in self.and_expressions.iter().chain(&self.or_expressions) {
            child.collect_aliases(dst);
        }
    }

    /// Property paths referenced by the condition and its nested conditions.
    pub fn property_paths(&self) -> Vec<&PropertyPath> {
        let mut ret = self.property.property_paths();

        for value in std::iter::once(&self.value).chain(&self.value2) {
            if let CriteriaValue::Field(field) = value {
                ret.extend(field.property_paths());
            }
        }

        for child in self.and_expressions.iter().chain(&self.or_expressions) {
            ret.extend(child.property_paths());
        }

        ret
    }
}

pub(crate) fn bind_alias(value: &mut CriteriaValue, params: &IndexMap<String, Value>) -> bool {
    let CriteriaValue::Alias(name) = value else {
        return true;
    };

    match params.get(name.as_str()) {
        Some(bound) => {
            *value = CriteriaValue::Value(bound.clone());
            true
        }
        None => false,
    }
}

fn prune(
    exprs: &mut Vec<CriteriaExpression>,
    params: &IndexMap<String, Value>,
    remove_unbound: bool,
) -> Result<()> {
    let mut kept = Vec::with_capacity(exprs.len());

    for mut expr in exprs.drain(..) {
        if expr.apply_values(params, remove_unbound)? {
            kept.push(expr);
        }
    }

    *exprs = kept;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, Value)]) -> IndexMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn between_requires_two_values() {
        let err = CriteriaExpression::compare("date", Operator::Between, "2018-12-01").unwrap_err();
        assert!(err.is_query());

        let expr = CriteriaExpression::between("date", "2018-12-01", ":end").unwrap();
        assert_eq!(expr.value2, Some(CriteriaValue::alias("end")));
    }

    #[test]
    fn between_accepts_pair_list() {
        let expr = CriteriaExpression::compare(
            "date",
            Operator::Between,
            vec!["2018-12-01", "2018-12-31"],
        )
        .unwrap();
        assert_eq!(expr.value, CriteriaValue::literal("2018-12-01"));
        assert_eq!(expr.value2, Some(CriteriaValue::literal("2018-12-31")));
    }

    #[test]
    fn null_checks() {
        assert!(CriteriaExpression::is_null("deletedAt").is_ok());
        assert!(CriteriaExpression::compare("deletedAt", Operator::Is, 5)
            .unwrap_err()
            .is_query());
        assert!(CriteriaExpression::eq("name", Value::Null)
            .unwrap_err()
            .is_query());
    }

    #[test]
    #[allow(deprecated)]
    fn coercing_null() {
        let expr = CriteriaExpression::new_coercing(
            FieldExpression::new("name").unwrap(),
            Operator::Eq,
            Value::Null,
            None,
            true,
        )
        .unwrap();
        assert_eq!(expr.value, CriteriaValue::literal(""));
    }

    #[test]
    fn scalar_in_becomes_list() {
        let expr = CriteriaExpression::compare("id", Operator::In, 3).unwrap();
        assert_eq!(expr.value, CriteriaValue::Value(Value::List(vec![Value::I64(3)])));
    }

    #[test]
    fn apply_values_prunes_unbound_children() {
        let mut expr = CriteriaExpression::eq("name", ":name")
            .unwrap()
            .and(CriteriaExpression::eq("age", ":age").unwrap())
            .or(CriteriaExpression::eq("city", "Leeds").unwrap());

        let keep = expr
            .apply_values(&params(&[("name", "Luke".into())]), true)
            .unwrap();

        assert!(keep);
        assert_eq!(expr.value, CriteriaValue::literal("Luke"));
        assert!(expr.and_expressions.is_empty());
        assert_eq!(expr.or_expressions.len(), 1);
    }

    #[test]
    fn apply_values_drops_unbound_root() {
        let mut expr = CriteriaExpression::eq("name", ":name")
            .unwrap()
            .and(CriteriaExpression::eq("age", 3).unwrap());

        assert!(!expr.apply_values(&IndexMap::new(), true).unwrap());
    }

    #[test]
    fn apply_values_keeps_unbound_alias() {
        let mut expr = CriteriaExpression::eq("name", ":name").unwrap();
        assert!(expr.apply_values(&IndexMap::new(), false).unwrap());
        assert_eq!(expr.unbound_aliases(), ["name"]);
    }

    #[test]
    fn null_alias_becomes_is() {
        let mut expr = CriteriaExpression::eq("name", ":name").unwrap();
        expr.apply_values(&params(&[("name", Value::Null)]), true)
            .unwrap();
        assert_eq!(expr.operator, Operator::Is);
    }
}
