//! Static expression types and the widening lattice between them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Core types known to the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExprType {
    /// Root of nothing; never compatible with anything but itself.
    Unknown,
    /// Type of untyped NULL literals. Every core type accepts it.
    Undefined,
    Byte,
    Short,
    Integer,
    Long,
    Float,
    Double,
    String,
    Boolean,
    Date,
    Time,
    Datetime,
    Timestamp,
    Struct,
    Array,
}

impl ExprType {
    /// All core types, excluding the UNKNOWN and UNDEFINED sentinels.
    pub fn core_types() -> &'static [ExprType] {
        &[
            ExprType::Byte,
            ExprType::Short,
            ExprType::Integer,
            ExprType::Long,
            ExprType::Float,
            ExprType::Double,
            ExprType::String,
            ExprType::Boolean,
            ExprType::Date,
            ExprType::Time,
            ExprType::Datetime,
            ExprType::Timestamp,
            ExprType::Struct,
            ExprType::Array,
        ]
    }

    /// Numeric types, narrowest first.
    pub fn numeric_types() -> &'static [ExprType] {
        &[
            ExprType::Byte,
            ExprType::Short,
            ExprType::Integer,
            ExprType::Long,
            ExprType::Float,
            ExprType::Double,
        ]
    }

    /// The type that may be implicitly converted into this one.
    pub fn parent(&self) -> Option<ExprType> {
        match self {
            ExprType::Unknown | ExprType::Undefined => None,
            ExprType::Byte | ExprType::String | ExprType::Struct | ExprType::Array => {
                Some(ExprType::Undefined)
            }
            ExprType::Short => Some(ExprType::Byte),
            ExprType::Integer => Some(ExprType::Short),
            ExprType::Long => Some(ExprType::Integer),
            ExprType::Float => Some(ExprType::Long),
            ExprType::Double => Some(ExprType::Float),
            ExprType::Boolean
            | ExprType::Date
            | ExprType::Time
            | ExprType::Datetime
            | ExprType::Timestamp => Some(ExprType::String),
        }
    }

    /// True if a value of type `other` may stand in where `self` is expected,
    /// e.g. `DOUBLE.is_compatible(INTEGER)`. Not symmetric.
    pub fn is_compatible(&self, other: ExprType) -> bool {
        if *self == other {
            return true;
        }
        if other == ExprType::Unknown {
            return false;
        }
        match self.parent() {
            Some(parent) => parent.is_compatible(other),
            None => false,
        }
    }

    /// True when converting a value of this type into `target` requires an
    /// explicit conversion step.
    pub fn should_cast(&self, target: ExprType) -> bool {
        if *self == target {
            return false;
        }
        *self == ExprType::Undefined || target.is_compatible(*self)
    }

    pub fn is_numeric(&self) -> bool {
        Self::numeric_types().contains(self)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ExprType::Unknown => "UNKNOWN",
            ExprType::Undefined => "UNDEFINED",
            ExprType::Byte => "BYTE",
            ExprType::Short => "SHORT",
            ExprType::Integer => "INTEGER",
            ExprType::Long => "LONG",
            ExprType::Float => "FLOAT",
            ExprType::Double => "DOUBLE",
            ExprType::String => "STRING",
            ExprType::Boolean => "BOOLEAN",
            ExprType::Date => "DATE",
            ExprType::Time => "TIME",
            ExprType::Datetime => "DATETIME",
            ExprType::Timestamp => "TIMESTAMP",
            ExprType::Struct => "STRUCT",
            ExprType::Array => "ARRAY",
        }
    }

    /// Type name used by the external schema interchange format.
    pub fn legacy_type_name(&self) -> &'static str {
        match self {
            ExprType::String => "keyword",
            ExprType::Struct => "object",
            ExprType::Array => "nested",
            other => other.type_name(),
        }
    }

    /// Parse a cast target name such as `INT` or `varchar`.
    pub fn from_cast_target(name: &str) -> Option<ExprType> {
        match name.to_ascii_uppercase().as_str() {
            "STRING" | "VARCHAR" | "TEXT" => Some(ExprType::String),
            "BYTE" => Some(ExprType::Byte),
            "SHORT" => Some(ExprType::Short),
            "INT" | "INTEGER" => Some(ExprType::Integer),
            "LONG" => Some(ExprType::Long),
            "FLOAT" => Some(ExprType::Float),
            "DOUBLE" => Some(ExprType::Double),
            "BOOLEAN" => Some(ExprType::Boolean),
            "DATE" => Some(ExprType::Date),
            "TIME" => Some(ExprType::Time),
            "DATETIME" => Some(ExprType::Datetime),
            "TIMESTAMP" => Some(ExprType::Timestamp),
            _ => None,
        }
    }
}

impl fmt::Display for ExprType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}
