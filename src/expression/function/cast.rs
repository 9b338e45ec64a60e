//! Conversion functions, one per target type.
//!
//! Each `cast_to_<type>` declares one signature per accepted source type.
//! Numeric sources come narrowest first and STRING comes before the types
//! it converts into, so the first signature that matches is always the
//! exact source type and no further cast is inserted.

use crate::data::{ExprType, ExprValue};
use crate::error::{QueryError, QueryResult};
use crate::expression::function::{FunctionRepository, ScalarFn};

use ExprType::{Boolean, Date, Datetime, Time, Timestamp};

/// Name of the function converting into `target`, if there is one.
pub fn cast_function_name(target: ExprType) -> Option<&'static str> {
    match target {
        ExprType::String => Some("cast_to_string"),
        ExprType::Byte => Some("cast_to_byte"),
        ExprType::Short => Some("cast_to_short"),
        ExprType::Integer => Some("cast_to_int"),
        ExprType::Long => Some("cast_to_long"),
        ExprType::Float => Some("cast_to_float"),
        ExprType::Double => Some("cast_to_double"),
        ExprType::Boolean => Some("cast_to_boolean"),
        ExprType::Date => Some("cast_to_date"),
        ExprType::Time => Some("cast_to_time"),
        ExprType::Datetime => Some("cast_to_datetime"),
        ExprType::Timestamp => Some("cast_to_timestamp"),
        _ => None,
    }
}

pub(super) fn register(repository: &mut FunctionRepository) {
    let numeric_sources: Vec<ExprType> = ExprType::numeric_types()
        .iter()
        .copied()
        .chain([ExprType::String, Boolean])
        .collect();

    let numeric_targets: [(ExprType, ScalarFn); 7] = [
        (ExprType::Byte, to_byte),
        (ExprType::Short, to_short),
        (ExprType::Integer, to_int),
        (ExprType::Long, to_long),
        (ExprType::Float, to_float),
        (ExprType::Double, to_double),
        (Boolean, to_boolean),
    ];
    for (target, body) in numeric_targets {
        if let Some(name) = cast_function_name(target) {
            for source in &numeric_sources {
                repository.register_scalar(name, vec![*source], target, body);
            }
        }
    }

    for source in crate::expression::function::operators::ordered_types() {
        repository.register_scalar("cast_to_string", vec![source], ExprType::String, to_string);
    }

    let temporal_targets: [(ExprType, [ExprType; 4], ScalarFn); 4] = [
        (Date, [ExprType::String, Date, Datetime, Timestamp], to_date),
        (Time, [ExprType::String, Time, Datetime, Timestamp], to_time),
        (Datetime, [ExprType::String, Date, Datetime, Timestamp], to_datetime),
        (Timestamp, [ExprType::String, Date, Datetime, Timestamp], to_timestamp),
    ];
    for (target, sources, body) in temporal_targets {
        if let Some(name) = cast_function_name(target) {
            for source in sources {
                repository.register_scalar(name, vec![source], target, body);
            }
        }
    }
}

fn invalid(value: &ExprValue, target: ExprType) -> QueryError {
    QueryError::evaluation(format!("invalid to cast {} to {}", value, target))
}

fn integral(value: &ExprValue, target: ExprType) -> QueryResult<i64> {
    match value {
        ExprValue::String(text) => text.trim().parse::<i64>().map_err(|_| invalid(value, target)),
        ExprValue::Boolean(b) => Ok(*b as i64),
        other => other.long_value(),
    }
}

fn floating(value: &ExprValue, target: ExprType) -> QueryResult<f64> {
    match value {
        ExprValue::String(text) => text.trim().parse::<f64>().map_err(|_| invalid(value, target)),
        ExprValue::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
        other => other.double_value(),
    }
}

pub fn to_byte(args: &[ExprValue]) -> QueryResult<ExprValue> {
    Ok(ExprValue::Byte(integral(&args[0], ExprType::Byte)? as i8))
}

pub fn to_short(args: &[ExprValue]) -> QueryResult<ExprValue> {
    Ok(ExprValue::Short(integral(&args[0], ExprType::Short)? as i16))
}

pub fn to_int(args: &[ExprValue]) -> QueryResult<ExprValue> {
    Ok(ExprValue::Integer(integral(&args[0], ExprType::Integer)? as i32))
}

pub fn to_long(args: &[ExprValue]) -> QueryResult<ExprValue> {
    Ok(ExprValue::Long(integral(&args[0], ExprType::Long)?))
}

pub fn to_float(args: &[ExprValue]) -> QueryResult<ExprValue> {
    Ok(ExprValue::Float(floating(&args[0], ExprType::Float)? as f32))
}

pub fn to_double(args: &[ExprValue]) -> QueryResult<ExprValue> {
    Ok(ExprValue::Double(floating(&args[0], ExprType::Double)?))
}

pub fn to_boolean(args: &[ExprValue]) -> QueryResult<ExprValue> {
    match &args[0] {
        ExprValue::Boolean(b) => Ok(ExprValue::Boolean(*b)),
        ExprValue::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(ExprValue::Boolean(true)),
            "false" => Ok(ExprValue::Boolean(false)),
            _ => Err(invalid(&args[0], Boolean)),
        },
        other => Ok(ExprValue::Boolean(other.double_value()? != 0.0)),
    }
}

pub fn to_string(args: &[ExprValue]) -> QueryResult<ExprValue> {
    let text = match &args[0] {
        ExprValue::String(text) => text.clone(),
        ExprValue::Date(date) => date.format("%Y-%m-%d").to_string(),
        ExprValue::Time(time) => time.format("%H:%M:%S%.f").to_string(),
        ExprValue::Datetime(datetime) | ExprValue::Timestamp(datetime) => {
            datetime.format("%Y-%m-%d %H:%M:%S%.f").to_string()
        }
        other => other.to_string(),
    };
    Ok(ExprValue::String(text))
}

pub fn to_date(args: &[ExprValue]) -> QueryResult<ExprValue> {
    match &args[0] {
        ExprValue::String(text) => Ok(ExprValue::Date(ExprValue::parse_date(text)?)),
        other => Ok(ExprValue::Date(other.date_value()?)),
    }
}

pub fn to_time(args: &[ExprValue]) -> QueryResult<ExprValue> {
    match &args[0] {
        ExprValue::String(text) => Ok(ExprValue::Time(ExprValue::parse_time(text)?)),
        other => Ok(ExprValue::Time(other.time_value()?)),
    }
}

// Date-only text is accepted as midnight.
fn datetime_from(value: &ExprValue) -> QueryResult<chrono::NaiveDateTime> {
    match value {
        ExprValue::String(text) => ExprValue::parse_datetime(text).or_else(|err| {
            ExprValue::parse_date(text)
                .map(|date| date.and_time(chrono::NaiveTime::MIN))
                .map_err(|_| err)
        }),
        other => other.datetime_value(),
    }
}

pub fn to_datetime(args: &[ExprValue]) -> QueryResult<ExprValue> {
    Ok(ExprValue::Datetime(datetime_from(&args[0])?))
}

pub fn to_timestamp(args: &[ExprValue]) -> QueryResult<ExprValue> {
    Ok(ExprValue::Timestamp(datetime_from(&args[0])?))
}
