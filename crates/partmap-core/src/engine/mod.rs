//! Public entry points of the partition engine.
//!
//! `PartitionEngine` owns the relation cache, the lock manager and the type
//! registries, and exposes the range, hash and interval operations on top of
//! them. It is `Send + Sync` and meant to be shared behind an `Arc`.


use crate::{
    catalog::{MetadataProvider, PartitionMaterializer, RelationCache},
    compare::ComparatorRegistry,
    config::EngineConfig,
    creator::{FindOrCreate, PartitionCreator},
    error::{ErrorOrigin, InternalError, PartitionError},
    hash::{HashFunction, HashFunctionId, bucket_index, hash_function_for},
    lock::LockManager,
    obs::{GlobalMetricsSink, MetricsEvent, MetricsSink, NoopMetricsSink},
    range::{RangeInterval, RangeSnapshot},
    types::{PartitionId, RelationId},
    value::{Value, ValueType},
};
use std::{fmt, sync::Arc};

///
/// PartitionEngine
///

pub struct PartitionEngine {
    config: EngineConfig,
    cache: Arc<RelationCache>,
    locks: Arc<LockManager>,
    comparators: Arc<ComparatorRegistry>,
    creator: PartitionCreator,
    sink: Arc<dyn MetricsSink>,
}

impl PartitionEngine {
    /// Engine reporting into the process-wide metrics state.
    pub fn new(
        provider: Arc<dyn MetadataProvider>,
        materializer: Arc<dyn PartitionMaterializer>,
        config: EngineConfig,
    ) -> Result<Self, InternalError> {
        Self::with_sink(provider, materializer, config, Arc::new(GlobalMetricsSink))
    }

    /// Engine reporting into `sink`; the sink is ignored when
    /// `config.metrics` is off.
    pub fn with_sink(
        provider: Arc<dyn MetadataProvider>,
        materializer: Arc<dyn PartitionMaterializer>,
        config: EngineConfig,
        sink: Arc<dyn MetricsSink>,
    ) -> Result<Self, InternalError> {
        config.validate()?;

        let sink: Arc<dyn MetricsSink> = if config.metrics {
            sink
        } else {
            Arc::new(NoopMetricsSink)
        };
        let cache = Arc::new(RelationCache::new(provider, Arc::clone(&sink)));
        let locks = Arc::new(LockManager::new());
        let comparators = Arc::new(ComparatorRegistry::new());
        let creator = PartitionCreator::new(
            Arc::clone(&cache),
            Arc::clone(&locks),
            Arc::clone(&comparators),
            materializer,
            Arc::clone(&sink),
            config.max_partitions_per_create,
        );

        tracing::debug!(
            max_partitions_per_create = config.max_partitions_per_create,
            metrics = config.metrics,
            "partition engine started"
        );

        Ok(Self {
            config,
            cache,
            locks,
            comparators,
            creator,
            sink,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn cache(&self) -> &RelationCache {
        &self.cache
    }

    // ------------------------------------------------------------------
    // range partitions
    // ------------------------------------------------------------------

    /// Partition owning `value`, creating one when `value` lies outside the
    /// directory span. Uncovered values inside the span yield `Gap`.
    pub fn create_or_find_range_partition(
        &self,
        parent: RelationId,
        value: &Value,
    ) -> Result<FindOrCreate, InternalError> {
        self.creator.find_or_create(parent, value)
    }

    /// Bounds of the entry at `idx`; `-1` addresses the last entry.
    pub fn range_by_position(
        &self,
        parent: RelationId,
        idx: i64,
    ) -> Result<(Value, Value), InternalError> {
        Ok(self.range_snapshot(parent)?.by_position(idx)?.bounds())
    }

    /// Bounds of the entry owned by `partition`.
    pub fn range_by_partition(
        &self,
        parent: RelationId,
        partition: PartitionId,
    ) -> Result<(Value, Value), InternalError> {
        Ok(self.range_snapshot(parent)?.by_partition(partition)?.bounds())
    }

    pub fn min_range_bound(&self, parent: RelationId) -> Result<Value, InternalError> {
        self.range_snapshot(parent)?.min_bound().cloned()
    }

    pub fn max_range_bound(&self, parent: RelationId) -> Result<Value, InternalError> {
        self.range_snapshot(parent)?.max_bound().cloned()
    }

    /// Whether `[lo, hi)` intersects any existing entry of `parent`.
    pub fn intervals_overlap(
        &self,
        parent: RelationId,
        lo: &Value,
        hi: &Value,
    ) -> Result<bool, InternalError> {
        let snapshot = self.range_snapshot(parent)?;
        let key = snapshot.value_type();
        let cmp_lo = self.comparators.resolve(lo.value_type(), key)?;
        let cmp_hi = self.comparators.resolve(hi.value_type(), key)?;

        snapshot.overlaps(lo, hi, &cmp_lo, &cmp_hi)
    }

    /// Current snapshot of the range directory of `parent`.
    pub fn range_snapshot(&self, parent: RelationId) -> Result<RangeSnapshot, InternalError> {
        Ok(self.cache.range(parent)?.snapshot())
    }

    // ------------------------------------------------------------------
    // parents
    // ------------------------------------------------------------------

    /// Partitioned relation that owns `partition`.
    ///
    /// Cached layouts answer first; otherwise the provider is asked.
    pub fn parent_of_partition(&self, partition: PartitionId) -> Result<RelationId, InternalError> {
        if let Some(parent) = self.cache.cached_parent_of(partition) {
            return Ok(parent);
        }

        self.cache.provider_parent_of(partition)?.ok_or_else(|| {
            InternalError::partition(
                ErrorOrigin::Catalog,
                PartitionError::UnknownPartition { partition },
            )
        })
    }

    // ------------------------------------------------------------------
    // hash partitions
    // ------------------------------------------------------------------

    #[must_use]
    pub const fn canonical_hash_function(&self, value_type: ValueType) -> HashFunctionId {
        hash_function_for(value_type)
    }

    /// Hash of `value` under its type's canonical hash function.
    pub fn hash_value(&self, value: &Value) -> Result<u32, InternalError> {
        HashFunction::for_type(value.value_type()).hash(value)
    }

    pub fn hash_partition_index(&self, hash: u32, count: u32) -> Result<u32, InternalError> {
        bucket_index(hash, count)
    }

    /// Partition of hash-partitioned `parent` that owns `value`.
    pub fn route_hash_partition(
        &self,
        parent: RelationId,
        value: &Value,
    ) -> Result<PartitionId, InternalError> {
        let partition = self.cache.hash(parent)?.route(value)?;
        self.sink.record(MetricsEvent::HashRoute { relation: parent });

        Ok(partition)
    }

    // ------------------------------------------------------------------
    // intervals
    // ------------------------------------------------------------------

    /// Render `[min: max)`.
    pub fn format_interval(&self, min: &Value, max: &Value) -> Result<String, InternalError> {
        Ok(RangeInterval::new(min.clone(), max.clone())?.to_string())
    }

    /// Parsing interval literals is not supported; always fails with
    /// `NotImplemented`.
    pub fn parse_interval(&self, source: &str) -> Result<RangeInterval, InternalError> {
        source.parse()
    }

    // ------------------------------------------------------------------
    // change notifications
    // ------------------------------------------------------------------

    pub fn on_partitions_created(&self, parent: RelationId) {
        self.cache.invalidate(parent);
    }

    pub fn on_partitions_updated(&self, parent: RelationId) {
        self.cache.invalidate(parent);
    }

    /// `parent` was dropped or un-partitioned.
    pub fn on_partitions_removed(&self, parent: RelationId) {
        self.cache.invalidate(parent);
        self.locks.forget(parent);
    }
}

impl fmt::Debug for PartitionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartitionEngine")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
