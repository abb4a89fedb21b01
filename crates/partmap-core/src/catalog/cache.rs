use crate::{
    catalog::{MetadataProvider, PartitionMetadata},
    error::{ErrorOrigin, InternalError, PartitionError},
    hash::HashPartitions,
    obs::{MetricsEvent, MetricsSink},
    range::RangeDirectory,
    types::{PartitionId, RelationId},
};
use parking_lot::RwLock;
use std::{collections::HashMap, fmt, sync::Arc};

///
/// PartitionScheme
///
/// Loaded layout of one partitioned relation.
///

#[derive(Clone, Debug)]
pub enum PartitionScheme {
    Range(Arc<RangeDirectory>),
    Hash(Arc<HashPartitions>),
}

impl PartitionScheme {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Range(_) => "range",
            Self::Hash(_) => "hash",
        }
    }

    /// Whether `partition` is one of this layout's children.
    #[must_use]
    pub fn owns(&self, partition: PartitionId) -> bool {
        match self {
            Self::Range(directory) => directory
                .snapshot()
                .entries()
                .iter()
                .any(|entry| entry.partition == partition),
            Self::Hash(partitions) => partitions.partitions().contains(&partition),
        }
    }
}

///
/// CacheState
///
/// Cached layouts plus the generation stamps that guard refills. A load
/// may only be inserted if no invalidation happened while it ran.
///

#[derive(Default)]
struct CacheState {
    relations: HashMap<RelationId, PartitionScheme>,
    generations: HashMap<RelationId, u64>,
    epoch: u64,
}

impl CacheState {
    fn stamp(&self, relation: RelationId) -> (u64, u64) {
        (
            self.epoch,
            self.generations.get(&relation).copied().unwrap_or_default(),
        )
    }

    fn bump(&mut self, relation: RelationId) {
        *self.generations.entry(relation).or_default() += 1;
    }
}

///
/// RelationCache
///
/// Process-wide cache of partition layouts keyed by relation.
///

pub struct RelationCache {
    provider: Arc<dyn MetadataProvider>,
    sink: Arc<dyn MetricsSink>,
    state: RwLock<CacheState>,
}

impl RelationCache {
    #[must_use]
    pub fn new(provider: Arc<dyn MetadataProvider>, sink: Arc<dyn MetricsSink>) -> Self {
        Self {
            provider,
            sink,
            state: RwLock::new(CacheState::default()),
        }
    }

    /// Cached layout of `relation`, loading it from the provider on a miss.
    ///
    /// A load that overlaps an invalidation of the same relation is thrown
    /// away and repeated, so the cache never holds metadata older than the
    /// last `invalidate` or `clear`.
    pub fn get(&self, relation: RelationId) -> Result<PartitionScheme, InternalError> {
        loop {
            let stamp = {
                let state = self.state.read();
                if let Some(scheme) = state.relations.get(&relation) {
                    return Ok(scheme.clone());
                }
                state.stamp(relation)
            };

            let loaded = self.load(relation)?;

            let mut state = self.state.write();
            // A concurrent load may have won; its copy may already carry
            // in-place extensions.
            if let Some(scheme) = state.relations.get(&relation) {
                return Ok(scheme.clone());
            }
            if state.stamp(relation) == stamp {
                state.relations.insert(relation, loaded.clone());
                return Ok(loaded);
            }
            drop(state);

            tracing::debug!(relation = %relation, "relation invalidated during load, reloading");
        }
    }

    /// Range directory of `relation`.
    pub fn range(&self, relation: RelationId) -> Result<Arc<RangeDirectory>, InternalError> {
        match self.get(relation)? {
            PartitionScheme::Range(directory) => Ok(directory),
            PartitionScheme::Hash(_) => Err(InternalError::partition(
                ErrorOrigin::Catalog,
                PartitionError::NotRangePartitioned { relation },
            )),
        }
    }

    /// Hash layout of `relation`.
    pub fn hash(&self, relation: RelationId) -> Result<Arc<HashPartitions>, InternalError> {
        match self.get(relation)? {
            PartitionScheme::Hash(partitions) => Ok(partitions),
            PartitionScheme::Range(_) => Err(InternalError::partition(
                ErrorOrigin::Catalog,
                PartitionError::NotHashPartitioned { relation },
            )),
        }
    }

    /// Forget `relation`; the next access reloads it. Returns whether an
    /// entry was cached.
    pub fn invalidate(&self, relation: RelationId) -> bool {
        let removed = {
            let mut state = self.state.write();
            state.bump(relation);
            state.relations.remove(&relation).is_some()
        };
        if removed {
            tracing::debug!(relation = %relation, "partition cache entry invalidated");
            self.sink.record(MetricsEvent::CacheInvalidate { relation });
        }

        removed
    }

    /// Drop every cached relation.
    pub fn clear(&self) {
        let mut state = self.state.write();
        tracing::debug!(cached = state.relations.len(), "partition cache cleared");
        state.epoch += 1;
        state.relations.clear();
    }

    /// Relation whose layout lists `partition` as a child, among the
    /// cached relations.
    #[must_use]
    pub fn cached_parent_of(&self, partition: PartitionId) -> Option<RelationId> {
        self.state
            .read()
            .relations
            .iter()
            .find(|(_, scheme)| scheme.owns(partition))
            .map(|(relation, _)| *relation)
    }

    /// Ask the provider which relation owns `partition`.
    pub fn provider_parent_of(
        &self,
        partition: PartitionId,
    ) -> Result<Option<RelationId>, InternalError> {
        self.provider.parent_of_partition(partition)
    }

    /// Record that `directory` was extended after the provider was updated.
    ///
    /// Loads still in flight read the provider before the update and must
    /// not be inserted. A cached entry other than `directory` predates the
    /// update as far as the cache can tell and is dropped.
    pub(crate) fn note_extended(&self, relation: RelationId, directory: &Arc<RangeDirectory>) {
        let mut state = self.state.write();
        state.bump(relation);

        let current = matches!(
            state.relations.get(&relation),
            Some(PartitionScheme::Range(cached)) if Arc::ptr_eq(cached, directory)
        );
        if !current && state.relations.remove(&relation).is_some() {
            tracing::debug!(relation = %relation, "dropped cache entry superseded by a creation");
        }
    }

    #[must_use]
    pub fn is_cached(&self, relation: RelationId) -> bool {
        self.state.read().relations.contains_key(&relation)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().relations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.read().relations.is_empty()
    }

    fn load(&self, relation: RelationId) -> Result<PartitionScheme, InternalError> {
        let scheme = match self.provider.load_partition_metadata(relation)? {
            PartitionMetadata::Range {
                value_type,
                entries,
            } => {
                let count = entries.len();
                let directory = RangeDirectory::new(relation, value_type, entries)?;
                tracing::debug!(
                    relation = %relation,
                    value_type = %value_type,
                    entries = count,
                    "loaded range directory"
                );
                PartitionScheme::Range(Arc::new(directory))
            }
            PartitionMetadata::Hash {
                value_type,
                partitions,
            } => {
                let count = partitions.len();
                let partitions = HashPartitions::new(relation, value_type, partitions)?;
                tracing::debug!(
                    relation = %relation,
                    value_type = %value_type,
                    buckets = count,
                    "loaded hash layout"
                );
                PartitionScheme::Hash(Arc::new(partitions))
            }
            PartitionMetadata::NotPartitioned => {
                return Err(InternalError::partition(
                    ErrorOrigin::Catalog,
                    PartitionError::NotPartitioned { relation },
                ));
            }
        };
        self.sink.record(MetricsEvent::CacheLoad { relation });

        Ok(scheme)
    }
}

impl fmt::Debug for RelationCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationCache")
            .field("cached", &self.len())
            .finish_non_exhaustive()
    }
}
