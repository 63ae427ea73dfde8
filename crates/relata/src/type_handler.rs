//! Conversion between stored and object representations of scalar values.

use chrono::{NaiveDate, NaiveDateTime};
use relata_core::stmt::{Type, Value};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Date-time layouts tried when no format is configured.
const DATE_TIME_FORMATS: &[&str] = &[
    DATE_TIME_FORMAT,
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Converts scalar values on their way to and from storage.
///
/// Both directions return `None` when the value cannot be converted with
/// confidence. Callers treat that as "leave the value alone", never as an
/// error.
pub trait TypeHandler {
    /// Stored value to the value held by an entity of declared type `ty`.
    fn to_object_value(
        &self,
        value: &Value,
        ty: &Type,
        format: Option<&str>,
        nullable: bool,
    ) -> Option<Value>;

    /// Entity value to the value written to a column of storage type `ty`.
    fn to_persistence_value(&self, value: &Value, ty: &Type, format: Option<&str>) -> Option<Value>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTypeHandler;

impl TypeHandler for DefaultTypeHandler {
    fn to_object_value(
        &self,
        value: &Value,
        ty: &Type,
        format: Option<&str>,
        nullable: bool,
    ) -> Option<Value> {
        if value.is_null() {
            return nullable.then_some(Value::Null);
        }

        match ty {
            Type::Bool => to_bool(value).map(Value::Bool),
            Type::Int => to_int(value).map(Value::I64),
            Type::Float => to_float(value).map(Value::F64),
            Type::String => value.to_scalar_string().map(Value::String),
            Type::Date => to_date(value, format).map(Value::Date),
            Type::DateTime => to_date_time(value, format).map(Value::DateTime),
            Type::Mixed => Some(value.clone()),
            Type::Entity(_) | Type::Collection(_) => None,
        }
    }

    fn to_persistence_value(&self, value: &Value, ty: &Type, format: Option<&str>) -> Option<Value> {
        match (value, ty) {
            (Value::Null, _) => Some(Value::Null),
            (Value::Bool(v), Type::Int | Type::Bool) => Some(Value::I64(*v as i64)),
            (Value::Date(v), Type::String) => {
                Some(Value::String(v.format(format.unwrap_or(DATE_FORMAT)).to_string()))
            }
            (Value::DateTime(v), Type::String) => Some(Value::String(
                v.format(format.unwrap_or(DATE_TIME_FORMAT)).to_string(),
            )),
            (Value::DateTime(v), Type::Date) => Some(Value::Date(v.date())),
            (Value::String(_), Type::Date | Type::DateTime) => {
                self.to_object_value(value, ty, format, false)
            }
            _ => Some(value.clone()),
        }
    }
}

fn to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(v) => Some(*v),
        Value::I64(0) => Some(false),
        Value::I64(1) => Some(true),
        Value::String(v) => match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" => Some(true),
            "0" | "false" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn to_int(value: &Value) -> Option<i64> {
    match value {
        Value::I64(v) => Some(*v),
        Value::Bool(v) => Some(*v as i64),
        Value::F64(v) if v.fract() == 0.0 => Some(*v as i64),
        Value::String(v) => v.trim().parse().ok(),
        _ => None,
    }
}

fn to_float(value: &Value) -> Option<f64> {
    match value {
        Value::F64(v) => Some(*v),
        Value::I64(v) => Some(*v as f64),
        Value::String(v) => v.trim().parse().ok(),
        _ => None,
    }
}

fn to_date(value: &Value, format: Option<&str>) -> Option<NaiveDate> {
    match value {
        Value::Date(v) => Some(*v),
        Value::DateTime(v) => Some(v.date()),
        Value::String(v) => {
            let v = v.trim();
            match format {
                Some(format) => NaiveDate::parse_from_str(v, format).ok(),
                None => NaiveDate::parse_from_str(v, DATE_FORMAT)
                    .ok()
                    .or_else(|| parse_date_time(v).map(|dt| dt.date())),
            }
        }
        _ => None,
    }
}

fn to_date_time(value: &Value, format: Option<&str>) -> Option<NaiveDateTime> {
    match value {
        Value::DateTime(v) => Some(*v),
        Value::Date(v) => v.and_hms_opt(0, 0, 0),
        Value::I64(v) => chrono::DateTime::from_timestamp(*v, 0).map(|dt| dt.naive_utc()),
        Value::String(v) => {
            let v = v.trim();
            match format {
                Some(format) => NaiveDateTime::parse_from_str(v, format).ok(),
                None => parse_date_time(v).or_else(|| {
                    NaiveDate::parse_from_str(v, DATE_FORMAT)
                        .ok()
                        .and_then(|date| date.and_hms_opt(0, 0, 0))
                }),
            }
        }
        _ => None,
    }
}

fn parse_date_time(src: &str) -> Option<NaiveDateTime> {
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(src, format).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(value: impl Into<Value>, ty: Type) -> Option<Value> {
        DefaultTypeHandler.to_object_value(&value.into(), &ty, None, false)
    }

    #[test]
    fn strings_become_dates() {
        let expected = NaiveDate::from_ymd_opt(2018, 12, 1)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();

        assert_eq!(
            object("2018-12-01 10:30:00", Type::DateTime),
            Some(Value::DateTime(expected))
        );
        assert_eq!(
            object("2018-12-01", Type::Date),
            Some(Value::Date(expected.date()))
        );
        assert_eq!(object("not a date", Type::DateTime), None);
    }

    #[test]
    fn configured_format() {
        let value = DefaultTypeHandler.to_object_value(
            &Value::from("01/12/2018"),
            &Type::Date,
            Some("%d/%m/%Y"),
            false,
        );
        assert_eq!(value, Some(Value::Date(NaiveDate::from_ymd_opt(2018, 12, 1).unwrap())));
    }

    #[test]
    fn flags_and_numbers() {
        assert_eq!(object(1, Type::Bool), Some(Value::Bool(true)));
        assert_eq!(object("0", Type::Bool), Some(Value::Bool(false)));
        assert_eq!(object(2, Type::Bool), None);
        assert_eq!(object("42", Type::Int), Some(Value::I64(42)));
        assert_eq!(object("4.5", Type::Float), Some(Value::F64(4.5)));
        assert_eq!(object("4.5", Type::Int), None);
        assert_eq!(object(7, Type::String), Some(Value::from("7")));
    }

    #[test]
    fn null_needs_a_nullable_property() {
        assert_eq!(object(Value::Null, Type::Int), None);
        assert_eq!(
            DefaultTypeHandler.to_object_value(&Value::Null, &Type::Int, None, true),
            Some(Value::Null)
        );
    }

    #[test]
    fn persistence_values() {
        let handler = DefaultTypeHandler;
        assert_eq!(
            handler.to_persistence_value(&Value::Bool(true), &Type::Bool, None),
            Some(Value::I64(1))
        );

        let date = NaiveDate::from_ymd_opt(2018, 12, 1).unwrap();
        assert_eq!(
            handler.to_persistence_value(&Value::Date(date), &Type::String, Some("%d.%m.%Y")),
            Some(Value::from("01.12.2018"))
        );
        assert_eq!(
            handler.to_persistence_value(&Value::from("x"), &Type::String, None),
            Some(Value::from("x"))
        );
    }
}
