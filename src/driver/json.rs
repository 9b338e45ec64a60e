//! Conversion between JSON documents and `ExprValue`.
//!
//! Inbound conversion is driven by the declared field type. Nested objects
//! and arrays carry no schema, so their members are typed from the JSON
//! value itself.

use crate::data::{ExprType, ExprValue, Row};
use crate::error::{QueryError, QueryResult};
use indexmap::IndexMap;
use serde_json::{Map, Number, Value};

fn mismatch(json: &Value, ty: ExprType) -> QueryError {
    QueryError::evaluation(format!("can't convert {} to {}", json, ty))
}

/// Build a row from a JSON object. Fields absent from the object are left
/// out of the row so they read as MISSING; fields outside the schema are
/// ignored.
pub fn row_from_json(json: &Value, schema: &IndexMap<String, ExprType>) -> QueryResult<ExprValue> {
    let Value::Object(object) = json else {
        return Err(mismatch(json, ExprType::Struct));
    };
    let mut row = Row::new();
    for (name, ty) in schema {
        if let Some(value) = object.get(name) {
            row.insert(name.clone(), value_from_json(value, *ty)?);
        }
    }
    Ok(ExprValue::Tuple(row))
}

pub fn value_from_json(json: &Value, ty: ExprType) -> QueryResult<ExprValue> {
    if json.is_null() {
        return Ok(ExprValue::Null);
    }
    let integral = || json.as_i64().ok_or_else(|| mismatch(json, ty));
    let text = || json.as_str().ok_or_else(|| mismatch(json, ty));
    let value = match ty {
        ExprType::Boolean => ExprValue::Boolean(json.as_bool().ok_or_else(|| mismatch(json, ty))?),
        ExprType::Byte => ExprValue::Byte(i8::try_from(integral()?).map_err(|_| mismatch(json, ty))?),
        ExprType::Short => {
            ExprValue::Short(i16::try_from(integral()?).map_err(|_| mismatch(json, ty))?)
        }
        ExprType::Integer => {
            ExprValue::Integer(i32::try_from(integral()?).map_err(|_| mismatch(json, ty))?)
        }
        ExprType::Long => ExprValue::Long(integral()?),
        ExprType::Float => {
            ExprValue::Float(json.as_f64().ok_or_else(|| mismatch(json, ty))? as f32)
        }
        ExprType::Double => ExprValue::Double(json.as_f64().ok_or_else(|| mismatch(json, ty))?),
        ExprType::String => ExprValue::from(text()?),
        ExprType::Date => ExprValue::Date(ExprValue::parse_date(text()?)?),
        ExprType::Time => ExprValue::Time(ExprValue::parse_time(text()?)?),
        ExprType::Datetime => ExprValue::Datetime(ExprValue::parse_datetime(text()?)?),
        ExprType::Timestamp => ExprValue::Timestamp(ExprValue::parse_datetime(text()?)?),
        ExprType::Struct => match json {
            Value::Object(object) => ExprValue::Tuple(
                object
                    .iter()
                    .map(|(name, value)| (name.clone(), infer(value)))
                    .collect(),
            ),
            _ => return Err(mismatch(json, ty)),
        },
        ExprType::Array => match json {
            Value::Array(values) => ExprValue::Collection(values.iter().map(infer).collect()),
            _ => return Err(mismatch(json, ty)),
        },
        ExprType::Unknown | ExprType::Undefined => return Err(mismatch(json, ty)),
    };
    Ok(value)
}

fn infer(json: &Value) -> ExprValue {
    match json {
        Value::Null => ExprValue::Null,
        Value::Bool(b) => ExprValue::Boolean(*b),
        Value::Number(n) => match n.as_i64() {
            Some(v) => match i32::try_from(v) {
                Ok(v) => ExprValue::Integer(v),
                Err(_) => ExprValue::Long(v),
            },
            None => ExprValue::Double(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => ExprValue::from(s.as_str()),
        Value::Array(values) => ExprValue::Collection(values.iter().map(infer).collect()),
        Value::Object(object) => ExprValue::Tuple(
            object
                .iter()
                .map(|(name, value)| (name.clone(), infer(value)))
                .collect(),
        ),
    }
}

/// JSON rendering of a value. MISSING fields are dropped from objects and
/// otherwise render as null, like NULL.
pub fn value_to_json(value: &ExprValue) -> Value {
    match value {
        ExprValue::Null | ExprValue::Missing => Value::Null,
        ExprValue::Boolean(b) => Value::Bool(*b),
        ExprValue::Byte(v) => Value::from(*v),
        ExprValue::Short(v) => Value::from(*v),
        ExprValue::Integer(v) => Value::from(*v),
        ExprValue::Long(v) => Value::from(*v),
        ExprValue::Float(v) => float(*v as f64),
        ExprValue::Double(v) => float(*v),
        ExprValue::String(s) => Value::String(s.clone()),
        ExprValue::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
        ExprValue::Time(t) => Value::String(t.format("%H:%M:%S%.f").to_string()),
        ExprValue::Datetime(dt) | ExprValue::Timestamp(dt) => {
            Value::String(dt.format("%Y-%m-%d %H:%M:%S%.f").to_string())
        }
        ExprValue::Tuple(row) => {
            let mut object = Map::new();
            for (name, value) in row {
                if !value.is_missing() {
                    object.insert(name.clone(), value_to_json(value));
                }
            }
            Value::Object(object)
        }
        ExprValue::Collection(values) => Value::Array(values.iter().map(value_to_json).collect()),
    }
}

// NaN and infinities have no JSON form
fn float(v: f64) -> Value {
    Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null)
}
