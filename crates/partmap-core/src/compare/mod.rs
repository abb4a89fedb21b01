//! Comparator resolution for partition key values.
//!
//! A comparator is resolved once per `(left, right)` type pair and cached for
//! the registry's lifetime. Callers only see the `Comparator` capability and
//! never dispatch on concrete value types themselves.


use crate::{
    error::{ErrorOrigin, InternalError, PartitionError},
    value::{OrderFamily, Value, ValueType},
};
use parking_lot::RwLock;
use std::{cmp::Ordering, collections::HashMap};

///
/// Comparator
///
/// Three-way ordering between a value of `left` type and a value of `right`
/// type. Both types belong to the same `OrderFamily`.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Comparator {
    left: ValueType,
    right: ValueType,
    family: OrderFamily,
}

impl Comparator {
    #[must_use]
    pub const fn left(&self) -> ValueType {
        self.left
    }

    #[must_use]
    pub const fn right(&self) -> ValueType {
        self.right
    }

    /// Compare `left` against `right`.
    ///
    /// Fails with `TypeMismatch` when either value is not of the type this
    /// comparator was resolved for.
    pub fn compare(&self, left: &Value, right: &Value) -> Result<Ordering, InternalError> {
        if left.value_type() != self.left || right.value_type() != self.right {
            return Err(type_mismatch(left.value_type(), right.value_type()));
        }

        family_order(self.family, left, right)
            .ok_or_else(|| type_mismatch(left.value_type(), right.value_type()))
    }

    /// `left < right`
    pub fn lt(&self, left: &Value, right: &Value) -> Result<bool, InternalError> {
        Ok(self.compare(left, right)? == Ordering::Less)
    }

    /// `left > right`
    pub fn gt(&self, left: &Value, right: &Value) -> Result<bool, InternalError> {
        Ok(self.compare(left, right)? == Ordering::Greater)
    }
}

///
/// ComparatorRegistry
///
/// Process-lifetime cache of resolved comparators, safe to share between
/// threads.
///

#[derive(Debug, Default)]
pub struct ComparatorRegistry {
    cache: RwLock<HashMap<(ValueType, ValueType), Comparator>>,
}

impl ComparatorRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the comparator for `(left, right)`.
    pub fn resolve(&self, left: ValueType, right: ValueType) -> Result<Comparator, InternalError> {
        if let Some(found) = self.cache.read().get(&(left, right)) {
            return Ok(*found);
        }

        let comparator = resolve_uncached(left, right)?;
        self.cache.write().insert((left, right), comparator);

        Ok(comparator)
    }

    /// Number of cached type pairs.
    #[must_use]
    pub fn cached_pairs(&self) -> usize {
        self.cache.read().len()
    }
}

/// Resolve a comparator without touching any cache.
pub fn resolve_uncached(left: ValueType, right: ValueType) -> Result<Comparator, InternalError> {
    let family = left.order_family();
    if family != right.order_family() {
        return Err(type_mismatch(left, right));
    }

    Ok(Comparator {
        left,
        right,
        family,
    })
}

fn type_mismatch(left: ValueType, right: ValueType) -> InternalError {
    InternalError::partition(
        ErrorOrigin::Compare,
        PartitionError::TypeMismatch { left, right },
    )
}

fn family_order(family: OrderFamily, left: &Value, right: &Value) -> Option<Ordering> {
    match family {
        OrderFamily::Integer => Some(left.as_i64()?.cmp(&right.as_i64()?)),
        OrderFamily::Float => Some(float_order(left.as_f64()?, right.as_f64()?)),
        OrderFamily::Text => Some(left.as_text()?.cmp(right.as_text()?)),
        OrderFamily::DateTime => Some(left.datetime_micros()?.cmp(&right.datetime_micros()?)),
        OrderFamily::Bool => Some(left.as_bool()?.cmp(&right.as_bool()?)),
    }
}

// NaN sorts above every other float and equal to itself; -0.0 equals 0.0.
fn float_order(left: f64, right: f64) -> Ordering {
    left.partial_cmp(&right)
        .unwrap_or_else(|| left.is_nan().cmp(&right.is_nan()))
}
