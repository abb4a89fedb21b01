use crate::{
    error::{ErrorOrigin, InternalError, PartitionError},
    range::RangeEntry,
    value::{Value, ValueType},
};
use std::{fmt, str::FromStr};

///
/// RangeInterval
///
/// Presentation form of `[min, max)`, rendered as `"[min: max)"`.
/// Parsing the rendered text back is not supported.
///

#[derive(Clone, Debug, PartialEq)]
pub struct RangeInterval {
    value_type: ValueType,
    min: Value,
    max: Value,
}

impl RangeInterval {
    /// Pair two bounds of the same value type.
    pub fn new(min: Value, max: Value) -> Result<Self, InternalError> {
        let value_type = min.value_type();
        if max.value_type() != value_type {
            return Err(InternalError::partition(
                ErrorOrigin::Interface,
                PartitionError::TypeMismatch {
                    left: value_type,
                    right: max.value_type(),
                },
            ));
        }

        Ok(Self {
            value_type,
            min,
            max,
        })
    }

    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        self.value_type
    }

    #[must_use]
    pub const fn min(&self) -> &Value {
        &self.min
    }

    #[must_use]
    pub const fn max(&self) -> &Value {
        &self.max
    }
}

impl From<&RangeEntry> for RangeInterval {
    fn from(entry: &RangeEntry) -> Self {
        Self {
            value_type: entry.min.value_type(),
            min: entry.min.clone(),
            max: entry.max.clone(),
        }
    }
}

impl fmt::Display for RangeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}: {})", self.min, self.max)
    }
}

impl FromStr for RangeInterval {
    type Err = InternalError;

    fn from_str(_: &str) -> Result<Self, Self::Err> {
        Err(InternalError::partition(
            ErrorOrigin::Interface,
            PartitionError::NotImplemented {
                operation: "range interval parsing",
            },
        ))
    }
}
