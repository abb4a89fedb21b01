//! Hash partition indexing.
//!
//! Each key type has one canonical hash function. A hash is routed to a
//! bucket by plain unsigned modulo, so the same `(hash, count)` pair lands
//! in the same bucket on every process and across restarts.


use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError, PartitionError},
    types::{PartitionId, RelationId},
    value::{Value, ValueType},
};
use derive_more::Display;
use std::sync::Arc;
use xxhash_rust::xxh3::xxh3_64;

///
/// HashFunctionId
///
/// Stable identifier of a canonical hash function.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[display("hashfn#{_0}")]
pub struct HashFunctionId(u32);

impl HashFunctionId {
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

///
/// HashFunction
///
/// Canonical hash function of one key family. Integers of every width share
/// a function so equal values hash equally regardless of width.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum HashFunction {
    Integer,
    Float,
    Text,
    Date,
    Timestamp,
    Bool,
}

impl HashFunction {
    /// Canonical function for `value_type`.
    #[must_use]
    pub const fn for_type(value_type: ValueType) -> Self {
        match value_type {
            ValueType::Int16 | ValueType::Int32 | ValueType::Int64 => Self::Integer,
            ValueType::Float32 | ValueType::Float64 => Self::Float,
            ValueType::Text => Self::Text,
            ValueType::Date => Self::Date,
            ValueType::Timestamp => Self::Timestamp,
            ValueType::Bool => Self::Bool,
        }
    }

    /// Stable id; part of the routing contract and must never change.
    #[must_use]
    pub const fn id(self) -> HashFunctionId {
        HashFunctionId(match self {
            Self::Integer => 1,
            Self::Float => 2,
            Self::Text => 3,
            Self::Date => 4,
            Self::Timestamp => 5,
            Self::Bool => 6,
        })
    }

    /// Hash `value`, which must be of a type this function serves.
    pub fn hash(self, value: &Value) -> Result<u32, InternalError> {
        if Self::for_type(value.value_type()) != self {
            return Err(InternalError::new(
                ErrorClass::InvalidInput,
                ErrorOrigin::Hash,
                format!(
                    "{} cannot hash a value of type {}",
                    self.id(),
                    value.value_type()
                ),
            ));
        }

        let digest = match value {
            Value::Int16(v) => hash_integer(i64::from(*v)),
            Value::Int32(v) => hash_integer(i64::from(*v)),
            Value::Int64(v) => hash_integer(*v),
            Value::Float32(v) => hash_float(f64::from(*v)),
            Value::Float64(v) => hash_float(*v),
            Value::Text(text) => xxh3_64(text.as_bytes()),
            Value::Date(date) => xxh3_64(&date.to_julian_day().to_le_bytes()),
            Value::Timestamp(ts) => xxh3_64(&ts.as_micros().to_le_bytes()),
            Value::Bool(flag) => xxh3_64(&[u8::from(*flag)]),
        };

        Ok(fold_digest(digest))
    }
}

/// Canonical hash function id for `value_type`.
#[must_use]
pub const fn hash_function_for(value_type: ValueType) -> HashFunctionId {
    HashFunction::for_type(value_type).id()
}

/// Bucket of `hash` among `count` buckets: `hash % count`, unsigned.
pub fn bucket_index(hash: u32, count: u32) -> Result<u32, InternalError> {
    hash.checked_rem(count).ok_or_else(|| {
        InternalError::partition(
            ErrorOrigin::Hash,
            PartitionError::InvalidBucketCount { count },
        )
    })
}

///
/// HashPartitions
///
/// Hash layout of one relation: bucket `i` is owned by `partitions[i]`.
///

#[derive(Clone, Debug)]
pub struct HashPartitions {
    relation: RelationId,
    value_type: ValueType,
    partitions: Arc<[PartitionId]>,
}

impl HashPartitions {
    pub fn new(
        relation: RelationId,
        value_type: ValueType,
        partitions: Vec<PartitionId>,
    ) -> Result<Self, InternalError> {
        if u32::try_from(partitions.len()).is_err() {
            return Err(InternalError::catalog_invariant(format!(
                "{relation}: {} hash partitions exceed the bucket range",
                partitions.len()
            )));
        }

        Ok(Self {
            relation,
            value_type,
            partitions: partitions.into(),
        })
    }

    #[must_use]
    pub const fn relation(&self) -> RelationId {
        self.relation
    }

    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        self.value_type
    }

    #[must_use]
    pub fn partitions(&self) -> &[PartitionId] {
        &self.partitions
    }

    /// Number of buckets.
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub fn bucket_count(&self) -> u32 {
        // Length is bounded by `new`.
        self.partitions.len() as u32
    }

    /// Partition owning `value`.
    pub fn route(&self, value: &Value) -> Result<PartitionId, InternalError> {
        let function = HashFunction::for_type(self.value_type);
        if HashFunction::for_type(value.value_type()) != function {
            return Err(InternalError::partition(
                ErrorOrigin::Hash,
                PartitionError::TypeMismatch {
                    left: value.value_type(),
                    right: self.value_type,
                },
            ));
        }

        let bucket = bucket_index(function.hash(value)?, self.bucket_count())?;
        let slot = usize::try_from(bucket).map_err(|_| {
            InternalError::catalog_invariant(format!("{}: bucket {bucket} overflows", self.relation))
        })?;

        Ok(self.partitions[slot])
    }
}

fn hash_integer(value: i64) -> u64 {
    xxh3_64(&value.to_le_bytes())
}

// -0.0 hashes like 0.0 and every NaN like the canonical NaN.
fn hash_float(value: f64) -> u64 {
    let bits = if value == 0.0 {
        0.0f64.to_bits()
    } else if value.is_nan() {
        f64::NAN.to_bits()
    } else {
        value.to_bits()
    };

    xxh3_64(&bits.to_le_bytes())
}

#[expect(clippy::cast_possible_truncation)]
const fn fold_digest(digest: u64) -> u32 {
    (digest ^ (digest >> 32)) as u32
}
