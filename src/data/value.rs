//! Runtime value representation.
//!
//! `ExprValue` is a tagged value over the core types plus two sentinels:
//! `Null` (field present but empty) and `Missing` (field absent from the
//! source row). Both propagate through operations and are kept distinct.

use crate::data::ExprType;
use crate::error::{QueryError, QueryResult};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// An ordered field name -> value mapping. Used for STRUCT values and rows.
pub type Row = IndexMap<String, ExprValue>;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S%.f";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Values produced and consumed by expressions
#[derive(Debug, Clone)]
pub enum ExprValue {
    Null,
    Missing,
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Date(NaiveDate),
    Time(NaiveTime),
    Datetime(NaiveDateTime),
    /// Point in time, always UTC.
    Timestamp(NaiveDateTime),
    Tuple(Row),
    Collection(Vec<ExprValue>),
}

impl ExprValue {
    /// Build a tuple value from field/value pairs, preserving order.
    pub fn tuple<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ExprValue)>,
    {
        ExprValue::Tuple(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Static type of this value. NULL and MISSING are UNDEFINED.
    pub fn expr_type(&self) -> ExprType {
        match self {
            ExprValue::Null | ExprValue::Missing => ExprType::Undefined,
            ExprValue::Boolean(_) => ExprType::Boolean,
            ExprValue::Byte(_) => ExprType::Byte,
            ExprValue::Short(_) => ExprType::Short,
            ExprValue::Integer(_) => ExprType::Integer,
            ExprValue::Long(_) => ExprType::Long,
            ExprValue::Float(_) => ExprType::Float,
            ExprValue::Double(_) => ExprType::Double,
            ExprValue::String(_) => ExprType::String,
            ExprValue::Date(_) => ExprType::Date,
            ExprValue::Time(_) => ExprType::Time,
            ExprValue::Datetime(_) => ExprType::Datetime,
            ExprValue::Timestamp(_) => ExprType::Timestamp,
            ExprValue::Tuple(_) => ExprType::Struct,
            ExprValue::Collection(_) => ExprType::Array,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ExprValue::Null)
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, ExprValue::Missing)
    }

    pub fn is_null_or_missing(&self) -> bool {
        matches!(self, ExprValue::Null | ExprValue::Missing)
    }

    pub fn is_true(&self) -> bool {
        matches!(self, ExprValue::Boolean(true))
    }

    pub fn is_numeric(&self) -> bool {
        self.expr_type().is_numeric()
    }

    fn unexpected(&self, wanted: &str) -> QueryError {
        QueryError::evaluation(format!(
            "invalid to get {} from value of type {}",
            wanted,
            self.expr_type()
        ))
    }

    pub fn boolean_value(&self) -> QueryResult<bool> {
        match self {
            ExprValue::Boolean(b) => Ok(*b),
            _ => Err(self.unexpected("booleanValue")),
        }
    }

    pub fn integer_value(&self) -> QueryResult<i32> {
        match self {
            ExprValue::Byte(v) => Ok(*v as i32),
            ExprValue::Short(v) => Ok(*v as i32),
            ExprValue::Integer(v) => Ok(*v),
            ExprValue::Long(v) => Ok(*v as i32),
            ExprValue::Float(v) => Ok(*v as i32),
            ExprValue::Double(v) => Ok(*v as i32),
            _ => Err(self.unexpected("integerValue")),
        }
    }

    pub fn long_value(&self) -> QueryResult<i64> {
        match self {
            ExprValue::Byte(v) => Ok(*v as i64),
            ExprValue::Short(v) => Ok(*v as i64),
            ExprValue::Integer(v) => Ok(*v as i64),
            ExprValue::Long(v) => Ok(*v),
            ExprValue::Float(v) => Ok(*v as i64),
            ExprValue::Double(v) => Ok(*v as i64),
            _ => Err(self.unexpected("longValue")),
        }
    }

    pub fn double_value(&self) -> QueryResult<f64> {
        match self {
            ExprValue::Byte(v) => Ok(*v as f64),
            ExprValue::Short(v) => Ok(*v as f64),
            ExprValue::Integer(v) => Ok(*v as f64),
            ExprValue::Long(v) => Ok(*v as f64),
            ExprValue::Float(v) => Ok(*v as f64),
            ExprValue::Double(v) => Ok(*v),
            _ => Err(self.unexpected("doubleValue")),
        }
    }

    pub fn string_value(&self) -> QueryResult<&str> {
        match self {
            ExprValue::String(s) => Ok(s),
            _ => Err(self.unexpected("stringValue")),
        }
    }

    pub fn tuple_value(&self) -> QueryResult<&Row> {
        match self {
            ExprValue::Tuple(row) => Ok(row),
            _ => Err(self.unexpected("tupleValue")),
        }
    }

    pub fn date_value(&self) -> QueryResult<NaiveDate> {
        match self {
            ExprValue::Date(d) => Ok(*d),
            ExprValue::Datetime(dt) | ExprValue::Timestamp(dt) => Ok(dt.date()),
            _ => Err(self.unexpected("dateValue")),
        }
    }

    pub fn time_value(&self) -> QueryResult<NaiveTime> {
        match self {
            ExprValue::Time(t) => Ok(*t),
            ExprValue::Datetime(dt) | ExprValue::Timestamp(dt) => Ok(dt.time()),
            _ => Err(self.unexpected("timeValue")),
        }
    }

    pub fn datetime_value(&self) -> QueryResult<NaiveDateTime> {
        match self {
            ExprValue::Datetime(dt) | ExprValue::Timestamp(dt) => Ok(*dt),
            ExprValue::Date(d) => Ok(d.and_time(NaiveTime::MIN)),
            _ => Err(self.unexpected("datetimeValue")),
        }
    }

    pub fn parse_date(text: &str) -> QueryResult<NaiveDate> {
        NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).map_err(|_| {
            QueryError::semantic(format!(
                "date:{} in unsupported format, please use yyyy-MM-dd",
                text
            ))
        })
    }

    pub fn parse_time(text: &str) -> QueryResult<NaiveTime> {
        NaiveTime::parse_from_str(text.trim(), TIME_FORMAT).map_err(|_| {
            QueryError::semantic(format!(
                "time:{} in unsupported format, please use HH:mm:ss[.SSSSSS]",
                text
            ))
        })
    }

    pub fn parse_datetime(text: &str) -> QueryResult<NaiveDateTime> {
        NaiveDateTime::parse_from_str(text.trim(), DATETIME_FORMAT).map_err(|_| {
            QueryError::semantic(format!(
                "datetime:{} in unsupported format, please use yyyy-MM-dd HH:mm:ss[.SSSSSS]",
                text
            ))
        })
    }

    /// Compare two non-sentinel values. Numbers compare across widths;
    /// everything else only compares with its own kind.
    pub fn compare(&self, other: &ExprValue) -> QueryResult<Ordering> {
        use ExprValue::*;
        match (self, other) {
            (Null | Missing, _) | (_, Null | Missing) => Err(QueryError::evaluation(format!(
                "invalid to compare {} with {}",
                self, other
            ))),
            (Boolean(a), Boolean(b)) => Ok(a.cmp(b)),
            (String(a), String(b)) => Ok(a.cmp(b)),
            (Date(a), Date(b)) => Ok(a.cmp(b)),
            (Time(a), Time(b)) => Ok(a.cmp(b)),
            (Datetime(a), Datetime(b)) | (Timestamp(a), Timestamp(b)) => Ok(a.cmp(b)),
            (a, b) if a.is_numeric() && b.is_numeric() => {
                if a.is_integral() && b.is_integral() {
                    Ok(a.long_value()?.cmp(&b.long_value()?))
                } else {
                    Ok(a.double_value()?.total_cmp(&b.double_value()?))
                }
            }
            _ => Err(QueryError::evaluation(format!(
                "compare expected value have same type, but got {} and {}",
                self.expr_type(),
                other.expr_type()
            ))),
        }
    }

    fn is_integral(&self) -> bool {
        matches!(
            self,
            ExprValue::Byte(_) | ExprValue::Short(_) | ExprValue::Integer(_) | ExprValue::Long(_)
        )
    }
}

impl PartialEq for ExprValue {
    fn eq(&self, other: &Self) -> bool {
        use ExprValue::*;
        match (self, other) {
            (Null, Null) | (Missing, Missing) => true,
            (Boolean(a), Boolean(b)) => a == b,
            (Byte(a), Byte(b)) => a == b,
            (Short(a), Short(b)) => a == b,
            (Integer(a), Integer(b)) => a == b,
            (Long(a), Long(b)) => a == b,
            (Float(a), Float(b)) => a.to_bits() == b.to_bits(),
            (Double(a), Double(b)) => a.to_bits() == b.to_bits(),
            (String(a), String(b)) => a == b,
            (Date(a), Date(b)) => a == b,
            (Time(a), Time(b)) => a == b,
            (Datetime(a), Datetime(b)) => a == b,
            (Timestamp(a), Timestamp(b)) => a == b,
            (Tuple(a), Tuple(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y)
            }
            (Collection(a), Collection(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ExprValue {}

impl Hash for ExprValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            ExprValue::Null | ExprValue::Missing => {}
            ExprValue::Boolean(v) => v.hash(state),
            ExprValue::Byte(v) => v.hash(state),
            ExprValue::Short(v) => v.hash(state),
            ExprValue::Integer(v) => v.hash(state),
            ExprValue::Long(v) => v.hash(state),
            ExprValue::Float(v) => v.to_bits().hash(state),
            ExprValue::Double(v) => v.to_bits().hash(state),
            ExprValue::String(v) => v.hash(state),
            ExprValue::Date(v) => v.hash(state),
            ExprValue::Time(v) => v.hash(state),
            ExprValue::Datetime(v) | ExprValue::Timestamp(v) => v.hash(state),
            ExprValue::Tuple(row) => {
                for (name, value) in row {
                    name.hash(state);
                    value.hash(state);
                }
            }
            ExprValue::Collection(values) => values.hash(state),
        }
    }
}

impl fmt::Display for ExprValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprValue::Null => write!(f, "NULL"),
            ExprValue::Missing => write!(f, "MISSING"),
            ExprValue::Boolean(v) => write!(f, "{}", v),
            ExprValue::Byte(v) => write!(f, "{}", v),
            ExprValue::Short(v) => write!(f, "{}", v),
            ExprValue::Integer(v) => write!(f, "{}", v),
            ExprValue::Long(v) => write!(f, "{}", v),
            ExprValue::Float(v) => write!(f, "{}", v),
            ExprValue::Double(v) => write!(f, "{}", v),
            ExprValue::String(v) => write!(f, "\"{}\"", v),
            ExprValue::Date(v) => write!(f, "DATE '{}'", v.format(DATE_FORMAT)),
            ExprValue::Time(v) => write!(f, "TIME '{}'", v.format(TIME_FORMAT)),
            ExprValue::Datetime(v) => write!(f, "DATETIME '{}'", v.format(DATETIME_FORMAT)),
            ExprValue::Timestamp(v) => write!(f, "TIMESTAMP '{}'", v.format(DATETIME_FORMAT)),
            ExprValue::Tuple(row) => {
                write!(f, "{{")?;
                for (i, (name, value)) in row.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}:{}", name, value)?;
                }
                write!(f, "}}")
            }
            ExprValue::Collection(values) => {
                write!(f, "[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for ExprValue {
    fn from(v: bool) -> Self {
        ExprValue::Boolean(v)
    }
}

impl From<i8> for ExprValue {
    fn from(v: i8) -> Self {
        ExprValue::Byte(v)
    }
}

impl From<i16> for ExprValue {
    fn from(v: i16) -> Self {
        ExprValue::Short(v)
    }
}

impl From<i32> for ExprValue {
    fn from(v: i32) -> Self {
        ExprValue::Integer(v)
    }
}

impl From<i64> for ExprValue {
    fn from(v: i64) -> Self {
        ExprValue::Long(v)
    }
}

impl From<f32> for ExprValue {
    fn from(v: f32) -> Self {
        ExprValue::Float(v)
    }
}

impl From<f64> for ExprValue {
    fn from(v: f64) -> Self {
        ExprValue::Double(v)
    }
}

impl From<&str> for ExprValue {
    fn from(v: &str) -> Self {
        ExprValue::String(v.to_string())
    }
}

impl From<String> for ExprValue {
    fn from(v: String) -> Self {
        ExprValue::String(v)
    }
}
