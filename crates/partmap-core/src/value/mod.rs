mod format;


use serde::{Deserialize, Serialize};
use std::fmt;
use time::Date;

///
/// CONSTANTS
///

const MICROS_PER_SECOND: i64 = 1_000_000;

///
/// ValueType
///
/// Closed set of partitioning key types.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum ValueType {
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Text,
    Date,
    Timestamp,
    Bool,
}

impl ValueType {
    /// Stable human-readable type label for diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Text => "text",
            Self::Date => "date",
            Self::Timestamp => "timestamp",
            Self::Bool => "bool",
        }
    }

    /// Whether values of this type are fixed-width and passed by value.
    #[must_use]
    pub const fn is_by_value(self) -> bool {
        !matches!(self, Self::Text)
    }

    /// Ordering family this type shares comparators with.
    #[must_use]
    pub const fn order_family(self) -> OrderFamily {
        match self {
            Self::Int16 | Self::Int32 | Self::Int64 => OrderFamily::Integer,
            Self::Float32 | Self::Float64 => OrderFamily::Float,
            Self::Text => OrderFamily::Text,
            Self::Date | Self::Timestamp => OrderFamily::DateTime,
            Self::Bool => OrderFamily::Bool,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

///
/// OrderFamily
///
/// Group of types that share one total ordering. Comparators only exist
/// between members of the same family.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum OrderFamily {
    Integer,
    Float,
    Text,
    DateTime,
    Bool,
}

///
/// Timestamp
///
/// Microseconds since the Unix epoch, UTC.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Timestamp(i64);

impl Timestamp {
    #[must_use]
    pub const fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    #[must_use]
    pub const fn as_micros(self) -> i64 {
        self.0
    }
}

///
/// Value
///
/// Type-tagged scalar of a partitioning key domain. The index never looks
/// inside a value; ordering always goes through a resolved comparator.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Text(String),
    Date(Date),
    Timestamp(Timestamp),
    Bool(bool),
}

impl Value {
    /// Type tag of this value.
    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        match self {
            Self::Int16(_) => ValueType::Int16,
            Self::Int32(_) => ValueType::Int32,
            Self::Int64(_) => ValueType::Int64,
            Self::Float32(_) => ValueType::Float32,
            Self::Float64(_) => ValueType::Float64,
            Self::Text(_) => ValueType::Text,
            Self::Date(_) => ValueType::Date,
            Self::Timestamp(_) => ValueType::Timestamp,
            Self::Bool(_) => ValueType::Bool,
        }
    }

    /// Widened integer payload for integer-family values.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int16(v) => Some(i64::from(*v)),
            Self::Int32(v) => Some(i64::from(*v)),
            Self::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Widened float payload for float-family values.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float32(v) => Some(f64::from(*v)),
            Self::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// Microseconds since the epoch for date/time values; dates map to
    /// midnight UTC.
    #[must_use]
    pub fn datetime_micros(&self) -> Option<i64> {
        match self {
            Self::Date(date) => {
                let seconds = date.midnight().assume_utc().unix_timestamp();
                Some(seconds * MICROS_PER_SECOND)
            }
            Self::Timestamp(ts) => Some(ts.as_micros()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Self::Int16(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<Date> for Value {
    fn from(v: Date) -> Self {
        Self::Date(v)
    }
}

impl From<Timestamp> for Value {
    fn from(v: Timestamp) -> Self {
        Self::Timestamp(v)
    }
}
