mod overlap;
mod property;

use crate::{
    compare::{Comparator, resolve_uncached},
    range::{RangeDirectory, RangeEntry},
    types::{PartitionId, RelationId},
    value::{Value, ValueType},
};

pub(super) const RELATION: RelationId = RelationId::new(100);

/// Int64 directory from `(min, max, partition)` triples.
pub(super) fn int_directory(ranges: &[(i64, i64, u32)]) -> RangeDirectory {
    RangeDirectory::new(RELATION, ValueType::Int64, int_entries(ranges))
        .expect("fixture directory must be valid")
}

pub(super) fn int_entries(ranges: &[(i64, i64, u32)]) -> Vec<RangeEntry> {
    ranges
        .iter()
        .map(|&(min, max, id)| RangeEntry::new(PartitionId::new(id), Value::Int64(min), Value::Int64(max)))
        .collect()
}

pub(super) fn int_cmp() -> Comparator {
    resolve_uncached(ValueType::Int64, ValueType::Int64).expect("integer comparator")
}
