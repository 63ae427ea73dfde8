use super::{
    CriteriaExpression, CriteriaList, CriteriaValue, FieldExpression, Joiner, Operator, Value,
};
use crate::{Error, Result};

use serde_json::Value as Json;

/// Context needed to read the convenience criteria forms.
#[derive(Debug, Clone, Default)]
pub struct NormalizeOptions {
    /// Property that a bare list of integers filters on
    pub primary_key: Option<String>,

    /// Deprecated: a NULL with a comparison operator becomes `''`
    pub convert_null_to_empty: bool,
}

impl NormalizeOptions {
    pub fn primary_key(mut self, property: impl Into<String>) -> Self {
        self.primary_key = Some(property.into());
        self
    }
}

/// Anything accepted as query criteria.
pub trait IntoCriteria {
    fn into_criteria(self, options: &NormalizeOptions) -> Result<CriteriaList>;
}

impl IntoCriteria for CriteriaList {
    fn into_criteria(self, _options: &NormalizeOptions) -> Result<CriteriaList> {
        Ok(self)
    }
}

impl IntoCriteria for CriteriaExpression {
    fn into_criteria(self, _options: &NormalizeOptions) -> Result<CriteriaList> {
        Ok(CriteriaList::from(self))
    }
}

impl IntoCriteria for Vec<CriteriaExpression> {
    fn into_criteria(self, _options: &NormalizeOptions) -> Result<CriteriaList> {
        Ok(CriteriaList::from(self))
    }
}

impl IntoCriteria for Json {
    fn into_criteria(self, options: &NormalizeOptions) -> Result<CriteriaList> {
        normalize(&self, options)
    }
}

impl IntoCriteria for &Json {
    fn into_criteria(self, options: &NormalizeOptions) -> Result<CriteriaList> {
        normalize(self, options)
    }
}

/// Convert the convenience map form into a criteria list.
///
/// * `{"prop": scalar}` is an equality, `{"prop": null}` a null check and
///   `{"prop": [..]}` an `IN` list.
/// * `{"prop": {"operator": "..", "value": .., "value2": ..}}` names the
///   operator explicitly.
/// * `[1, 2, 3]` filters the primary key with `IN`.
/// * `[{..}, {..}]` ANDs together each normalized map.
///
/// Strings of the form `:name` are aliases bound later.
pub fn normalize(criteria: &Json, options: &NormalizeOptions) -> Result<CriteriaList> {
    match criteria {
        Json::Null => Ok(CriteriaList::new()),
        Json::Array(items)
            if !items.is_empty() && items.iter().all(|item| item.is_i64() || item.is_u64()) =>
        {
            let Some(primary_key) = &options.primary_key else {
                return Err(Error::query(
                    "a list of keys needs a primary key property to filter on",
                ));
            };

            let keys = items.iter().map(Value::from_json).collect::<Result<Vec<_>>>()?;
            Ok(CriteriaExpression::compare(primary_key, Operator::In, Value::List(keys))?.into())
        }
        Json::Array(items) => {
            let mut list = CriteriaList::new();
            for item in items {
                list.extend_grouped(Joiner::And, normalize(item, options)?);
            }
            Ok(list)
        }
        Json::Object(map) => {
            let mut list = CriteriaList::new();
            for (property, value) in map {
                list.and(normalize_entry(property, value, options)?);
            }
            Ok(list)
        }
        other => Err(Error::query(format!("unsupported criteria `{other}`"))),
    }
}

fn normalize_entry(
    property: &str,
    value: &Json,
    options: &NormalizeOptions,
) -> Result<CriteriaExpression> {
    let field = FieldExpression::new(property)?;

    match value {
        Json::Null => CriteriaExpression::new(field, Operator::Is, Value::Null, None),
        Json::Array(_) => CriteriaExpression::new(field, Operator::In, criteria_value(value)?, None),
        Json::Object(entry) => {
            let Some(operator) = entry.get("operator") else {
                return Err(Error::query(format!(
                    "criteria for `{property}` is a map without an operator"
                )));
            };

            let operator: Operator = match operator {
                Json::String(operator) => operator.parse()?,
                other => {
                    return Err(Error::query(format!(
                        "operator for `{property}` must be a string, got `{other}`"
                    )))
                }
            };

            let value = match entry.get("value") {
                Some(value) => criteria_value(value)?,
                None => CriteriaValue::Value(Value::Null),
            };

            let value2 = match entry.get("value2") {
                Some(Json::Null) | None => None,
                Some(value2) => Some(criteria_value(value2)?),
            };

            build(field, operator, value, value2, options)
        }
        scalar => CriteriaExpression::new(field, Operator::Eq, criteria_value(scalar)?, None),
    }
}

#[allow(deprecated)]
fn build(
    field: FieldExpression,
    operator: Operator,
    value: CriteriaValue,
    value2: Option<CriteriaValue>,
    options: &NormalizeOptions,
) -> Result<CriteriaExpression> {
    if options.convert_null_to_empty {
        CriteriaExpression::new_coercing(field, operator, value, value2, true)
    } else {
        CriteriaExpression::new(field, operator, value, value2)
    }
}

fn criteria_value(json: &Json) -> Result<CriteriaValue> {
    match json {
        Json::String(value) => Ok(CriteriaValue::parse_str(value)),
        other => Ok(CriteriaValue::Value(Value::from_json(other)?)),
    }
}
