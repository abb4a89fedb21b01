//! On-demand range partition creation.
//!
//! `find_or_create` resolves without locks first. Only a value outside the
//! directory span takes the relation's edit locks, re-resolves against the
//! current cached directory, and asks the materializer for new partitions.
//! The merged directory is validated and checked for coverage before it is
//! published; the edit guard releases both locks on every exit path. The
//! cache is told about every publish so that loads which read the provider
//! before the materializer ran cannot refill it.


use crate::{
    catalog::{PartitionMaterializer, RelationCache},
    compare::{Comparator, ComparatorRegistry},
    error::InternalError,
    lock::{EditGuard, LockManager},
    obs::{LookupOutcome, MetricsEvent, MetricsSink},
    range::{RangeDirectory, RangeSearch, RangeSnapshot},
    types::{PartitionId, RelationId},
    value::Value,
};
use std::sync::Arc;

///
/// FindOrCreate
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FindOrCreate {
    /// Already covered, or created by a concurrent caller.
    Found(PartitionId),

    /// Created by this call.
    Created(PartitionId),

    /// Inside the directory span but uncovered; never filled automatically.
    Gap,
}

impl FindOrCreate {
    #[must_use]
    pub const fn partition_id(self) -> Option<PartitionId> {
        match self {
            Self::Found(id) | Self::Created(id) => Some(id),
            Self::Gap => None,
        }
    }
}

///
/// PartitionCreator
///

pub struct PartitionCreator {
    cache: Arc<RelationCache>,
    locks: Arc<LockManager>,
    comparators: Arc<ComparatorRegistry>,
    materializer: Arc<dyn PartitionMaterializer>,
    sink: Arc<dyn MetricsSink>,
    max_partitions_per_create: usize,
}

impl PartitionCreator {
    #[must_use]
    pub const fn new(
        cache: Arc<RelationCache>,
        locks: Arc<LockManager>,
        comparators: Arc<ComparatorRegistry>,
        materializer: Arc<dyn PartitionMaterializer>,
        sink: Arc<dyn MetricsSink>,
        max_partitions_per_create: usize,
    ) -> Self {
        Self {
            cache,
            locks,
            comparators,
            materializer,
            sink,
            max_partitions_per_create,
        }
    }

    /// Partition owning `value` in `relation`, creating one when `value`
    /// lies outside the directory span.
    pub fn find_or_create(
        &self,
        relation: RelationId,
        value: &Value,
    ) -> Result<FindOrCreate, InternalError> {
        let directory = self.cache.range(relation)?;
        let comparator = self
            .comparators
            .resolve(value.value_type(), directory.value_type())?;

        let snapshot = directory.snapshot();
        let outcome = snapshot.search(value, &comparator)?;
        self.sink.record(MetricsEvent::Lookup {
            relation,
            outcome: lookup_outcome(outcome),
        });
        match outcome {
            RangeSearch::Found(idx) => {
                return Ok(FindOrCreate::Found(snapshot.entries()[idx].partition));
            }
            RangeSearch::Gap => return Ok(FindOrCreate::Gap),
            RangeSearch::OutOfBounds => {}
        }

        let guard = self.locks.lock_for_edit(relation);

        // The cache entry may have been replaced while we waited.
        let directory = self.cache.range(relation)?;
        let comparator = self
            .comparators
            .resolve(value.value_type(), directory.value_type())?;
        let current = directory.snapshot();
        match current.search(value, &comparator)? {
            RangeSearch::Found(idx) => {
                let partition = current.entries()[idx].partition;
                tracing::debug!(
                    relation = %relation,
                    partition = %partition,
                    "partition created concurrently"
                );
                self.sink.record(MetricsEvent::CreateRaceLost { relation });

                Ok(FindOrCreate::Found(partition))
            }
            RangeSearch::Gap => Ok(FindOrCreate::Gap),
            RangeSearch::OutOfBounds => self
                .create(&guard, &directory, &current, value, &comparator)
                .map(FindOrCreate::Created)
                .inspect_err(|err| {
                    tracing::warn!(
                        relation = %relation,
                        value = %value,
                        error = %err.display_with_class(),
                        "partition creation failed"
                    );
                    self.sink.record(MetricsEvent::CreateFailed { relation });
                }),
        }
    }

    // Runs with both edit locks held.
    fn create(
        &self,
        guard: &EditGuard,
        directory: &Arc<RangeDirectory>,
        current: &RangeSnapshot,
        value: &Value,
        comparator: &Comparator,
    ) -> Result<PartitionId, InternalError> {
        let relation = guard.relation();
        let added = self
            .materializer
            .create_partitions(relation, value, current)?;

        let count = added.len();
        if count == 0 {
            return Err(InternalError::creator_invariant(format!(
                "{relation}: materializer returned no partitions for {value}"
            )));
        }
        if count > self.max_partitions_per_create {
            return Err(InternalError::creator_invalid(format!(
                "{relation}: covering {value} needs {count} partitions, limit is {}",
                self.max_partitions_per_create
            )));
        }

        let (partition, published) =
            directory.extend_to_cover(guard, added, value, comparator)?;
        self.cache.note_extended(relation, directory);
        tracing::info!(
            relation = %relation,
            partition = %partition,
            added = count,
            entries = published.len(),
            "created range partitions"
        );
        self.sink.record(MetricsEvent::PartitionsCreated {
            relation,
            count: u64::try_from(count).unwrap_or(u64::MAX),
        });

        Ok(partition)
    }
}

const fn lookup_outcome(search: RangeSearch) -> LookupOutcome {
    match search {
        RangeSearch::Found(_) => LookupOutcome::Found,
        RangeSearch::Gap => LookupOutcome::Gap,
        RangeSearch::OutOfBounds => LookupOutcome::OutOfBounds,
    }
}
