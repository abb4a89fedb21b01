use crate::{
    compare::{Comparator, resolve_uncached},
    error::{ErrorOrigin, InternalError, PartitionError},
    lock::EditGuard,
    range::{RangeEntry, RangeSearch, overlaps, search},
    types::{PartitionId, RelationId},
    value::{Value, ValueType},
};
use parking_lot::RwLock;
use std::{cmp::Ordering, collections::HashSet, sync::Arc};

///
/// RangeDirectory
///
/// Authoritative interval index of one range-partitioned relation.
///
/// The entry sequence is an immutable `Arc<[RangeEntry]>` replaced
/// wholesale on extension, so a reader either sees the old sequence or the
/// new one and never anything in between.
///

#[derive(Debug)]
pub struct RangeDirectory {
    relation: RelationId,
    value_type: ValueType,
    comparator: Comparator,
    entries: RwLock<Arc<[RangeEntry]>>,
}

impl RangeDirectory {
    /// Build a directory from loaded metadata.
    ///
    /// Entries are sorted by `min`; bounds must match `value_type`, every
    /// entry must be non-empty, and neighbours must not overlap.
    pub fn new(
        relation: RelationId,
        value_type: ValueType,
        entries: Vec<RangeEntry>,
    ) -> Result<Self, InternalError> {
        let comparator = resolve_uncached(value_type, value_type)?;
        let entries = normalize_entries(relation, value_type, &comparator, entries)?;

        Ok(Self {
            relation,
            value_type,
            comparator,
            entries: RwLock::new(entries.into()),
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

    /// Current immutable view of the entries.
    #[must_use]
    pub fn snapshot(&self) -> RangeSnapshot {
        RangeSnapshot {
            relation: self.relation,
            value_type: self.value_type,
            comparator: self.comparator,
            entries: Arc::clone(&*self.entries.read()),
        }
    }

    /// Merge `added` into the directory and publish the result atomically.
    ///
    /// Nothing is published unless the merged sequence satisfies every
    /// directory invariant; on error the previous sequence stays in place.
    pub fn extend(
        &self,
        guard: &EditGuard,
        added: Vec<RangeEntry>,
    ) -> Result<RangeSnapshot, InternalError> {
        let merged = self.merge(guard, added)?;

        Ok(self.publish(merged))
    }

    /// Like [`extend`](Self::extend), but additionally requires the merged
    /// sequence to cover `value`. Returns the covering partition together
    /// with the published snapshot.
    pub fn extend_to_cover(
        &self,
        guard: &EditGuard,
        added: Vec<RangeEntry>,
        value: &Value,
        comparator: &Comparator,
    ) -> Result<(PartitionId, RangeSnapshot), InternalError> {
        let merged = self.merge(guard, added)?;
        let RangeSearch::Found(idx) = search(&merged, value, comparator)? else {
            return Err(InternalError::creator_invariant(format!(
                "{}: new partitions do not cover {value}",
                self.relation
            )));
        };
        let partition = merged[idx].partition;

        Ok((partition, self.publish(merged)))
    }

    fn merge(
        &self,
        guard: &EditGuard,
        added: Vec<RangeEntry>,
    ) -> Result<Arc<[RangeEntry]>, InternalError> {
        if guard.relation() != self.relation {
            return Err(InternalError::directory_invariant(format!(
                "edit guard for {} cannot extend directory of {}",
                guard.relation(),
                self.relation
            )));
        }

        let current = self.snapshot();
        let mut merged = Vec::with_capacity(current.len() + added.len());
        merged.extend(current.entries().iter().cloned());
        merged.extend(added);

        Ok(normalize_entries(self.relation, self.value_type, &self.comparator, merged)?.into())
    }

    fn publish(&self, entries: Arc<[RangeEntry]>) -> RangeSnapshot {
        *self.entries.write() = Arc::clone(&entries);

        RangeSnapshot {
            relation: self.relation,
            value_type: self.value_type,
            comparator: self.comparator,
            entries,
        }
    }
}

///
/// RangeSnapshot
///
/// Point-in-time view of a directory. Cheap to clone; stays valid after the
/// directory moves on.
///

#[derive(Clone, Debug)]
pub struct RangeSnapshot {
    relation: RelationId,
    value_type: ValueType,
    comparator: Comparator,
    entries: Arc<[RangeEntry]>,
}

impl RangeSnapshot {
    #[must_use]
    pub const fn relation(&self) -> RelationId {
        self.relation
    }

    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Comparator between two values of the directory's key type.
    #[must_use]
    pub const fn comparator(&self) -> &Comparator {
        &self.comparator
    }

    #[must_use]
    pub fn entries(&self) -> &[RangeEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve `value` with a comparator of `(value type, directory type)`.
    pub fn search(
        &self,
        value: &Value,
        comparator: &Comparator,
    ) -> Result<RangeSearch, InternalError> {
        search(&self.entries, value, comparator)
    }

    /// Partition owning `value`, if any.
    pub fn find(
        &self,
        value: &Value,
        comparator: &Comparator,
    ) -> Result<Option<PartitionId>, InternalError> {
        Ok(match self.search(value, comparator)? {
            RangeSearch::Found(idx) => Some(self.entries[idx].partition),
            RangeSearch::Gap | RangeSearch::OutOfBounds => None,
        })
    }

    pub fn overlaps(
        &self,
        lo: &Value,
        hi: &Value,
        cmp_lo: &Comparator,
        cmp_hi: &Comparator,
    ) -> Result<bool, InternalError> {
        overlaps(&self.entries, lo, hi, cmp_lo, cmp_hi)
    }

    /// Lower bound of the first entry.
    pub fn min_bound(&self) -> Result<&Value, InternalError> {
        self.entries
            .first()
            .map(|entry| &entry.min)
            .ok_or_else(|| self.not_range_partitioned())
    }

    /// Upper bound of the last entry.
    pub fn max_bound(&self) -> Result<&Value, InternalError> {
        self.entries
            .last()
            .map(|entry| &entry.max)
            .ok_or_else(|| self.not_range_partitioned())
    }

    /// Entry at `idx`; `-1` addresses the last entry.
    ///
    /// `-1` is resolved before the range check so that it works for every
    /// non-empty directory; other negative indices are out of range when
    /// `abs(idx) >= count` and invalid otherwise.
    pub fn by_position(&self, idx: i64) -> Result<&RangeEntry, InternalError> {
        let count = self.entries.len();
        if idx == -1 {
            return self.entries.last().ok_or_else(|| self.out_of_range(idx));
        }

        let in_range = usize::try_from(idx.unsigned_abs()).is_ok_and(|abs| abs < count);
        if !in_range {
            return Err(self.out_of_range(idx));
        }

        let Ok(position) = usize::try_from(idx) else {
            return Err(InternalError::partition(
                ErrorOrigin::Directory,
                PartitionError::InvalidIndex {
                    relation: self.relation,
                    index: idx,
                },
            ));
        };

        Ok(&self.entries[position])
    }

    /// Entry owned by `partition`.
    pub fn by_partition(&self, partition: PartitionId) -> Result<&RangeEntry, InternalError> {
        self.entries
            .iter()
            .find(|entry| entry.partition == partition)
            .ok_or_else(|| {
                InternalError::partition(
                    ErrorOrigin::Directory,
                    PartitionError::PartitionNotFound {
                        relation: self.relation,
                        partition,
                    },
                )
            })
    }

    fn out_of_range(&self, idx: i64) -> InternalError {
        InternalError::partition(
            ErrorOrigin::Directory,
            PartitionError::IndexOutOfRange {
                relation: self.relation,
                index: idx,
                count: self.entries.len(),
            },
        )
    }

    fn not_range_partitioned(&self) -> InternalError {
        InternalError::partition(
            ErrorOrigin::Directory,
            PartitionError::NotRangePartitioned {
                relation: self.relation,
            },
        )
    }
}

// Sort by `min` and check every directory invariant.
fn normalize_entries(
    relation: RelationId,
    value_type: ValueType,
    comparator: &Comparator,
    mut entries: Vec<RangeEntry>,
) -> Result<Vec<RangeEntry>, InternalError> {
    for entry in &entries {
        if entry.min.value_type() != value_type || entry.max.value_type() != value_type {
            return Err(InternalError::directory_invariant(format!(
                "{relation}: bounds of {} must be {value_type}, found [{}: {})",
                entry.partition,
                entry.min.value_type(),
                entry.max.value_type(),
            )));
        }
    }

    // Bound types were checked above, so comparisons cannot fail here.
    entries.sort_by(|a, b| {
        comparator
            .compare(&a.min, &b.min)
            .unwrap_or(Ordering::Equal)
    });

    let mut seen = HashSet::with_capacity(entries.len());
    for entry in &entries {
        if !comparator.lt(&entry.min, &entry.max)? {
            return Err(InternalError::directory_invariant(format!(
                "{relation}: {} has empty range [{}: {})",
                entry.partition, entry.min, entry.max
            )));
        }
        if !seen.insert(entry.partition) {
            return Err(InternalError::directory_invariant(format!(
                "{relation}: {} appears more than once",
                entry.partition
            )));
        }
    }

    for pair in entries.windows(2) {
        if comparator.gt(&pair[0].max, &pair[1].min)? {
            return Err(InternalError::directory_invariant(format!(
                "{relation}: {} [{}: {}) overlaps {} [{}: {})",
                pair[0].partition,
                pair[0].min,
                pair[0].max,
                pair[1].partition,
                pair[1].min,
                pair[1].max,
            )));
        }
    }

    Ok(entries)
}
