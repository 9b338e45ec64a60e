//! Date and time field extraction.

use crate::data::{ExprType, ExprValue};
use crate::expression::function::{FunctionRepository, ScalarFn};
use chrono::{Datelike, Timelike};

use ExprType::{Date, Datetime, Integer, Time, Timestamp};

pub(super) fn register(repository: &mut FunctionRepository) {
    let date_parts: [(&str, ScalarFn); 6] = [
        ("year", |args| Ok(ExprValue::Integer(args[0].date_value()?.year()))),
        ("month", |args| Ok(ExprValue::Integer(args[0].date_value()?.month() as i32))),
        ("dayofmonth", |args| Ok(ExprValue::Integer(args[0].date_value()?.day() as i32))),
        ("day", |args| Ok(ExprValue::Integer(args[0].date_value()?.day() as i32))),
        // 1 = Sunday .. 7 = Saturday
        ("dayofweek", |args| {
            let weekday = args[0].date_value()?.weekday();
            Ok(ExprValue::Integer(weekday.num_days_from_sunday() as i32 + 1))
        }),
        ("dayofyear", |args| Ok(ExprValue::Integer(args[0].date_value()?.ordinal() as i32))),
    ];
    for (name, body) in date_parts {
        for ty in [Date, Datetime, Timestamp] {
            repository.register_scalar(name, vec![ty], Integer, body);
        }
    }

    let time_parts: [(&str, ScalarFn); 3] = [
        ("hour", |args| Ok(ExprValue::Integer(args[0].time_value()?.hour() as i32))),
        ("minute", |args| Ok(ExprValue::Integer(args[0].time_value()?.minute() as i32))),
        ("second", |args| Ok(ExprValue::Integer(args[0].time_value()?.second() as i32))),
    ];
    for (name, body) in time_parts {
        for ty in [Time, Datetime, Timestamp] {
            repository.register_scalar(name, vec![ty], Integer, body);
        }
    }

    for ty in [Date, Datetime, Timestamp] {
        repository.register_scalar("date", vec![ty], Date, |args| {
            Ok(ExprValue::Date(args[0].date_value()?))
        });
    }
    for ty in [Time, Datetime, Timestamp] {
        repository.register_scalar("time", vec![ty], Time, |args| {
            Ok(ExprValue::Time(args[0].time_value()?))
        });
    }
}
