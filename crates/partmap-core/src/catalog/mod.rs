//! Partition metadata collaborators and the per-relation cache over them.
//!
//! The cache is an explicit service object: it is created with a provider,
//! loads a relation on first use, and forgets it on `invalidate` or `clear`.
//! Directories held by the cache are rebuildable from the provider at any
//! time.

mod cache;
mod memory;

#[cfg(test)]
mod tests;

use crate::{
    error::InternalError,
    range::{RangeEntry, RangeSnapshot},
    types::{PartitionId, RelationId},
    value::{Value, ValueType},
};

// re-exports
pub use cache::{PartitionScheme, RelationCache};
pub use memory::MemoryCatalog;

///
/// PartitionMetadata
///
/// What the metadata store knows about one relation.
///

#[derive(Clone, Debug, PartialEq)]
pub enum PartitionMetadata {
    Range {
        value_type: ValueType,
        entries: Vec<RangeEntry>,
    },
    Hash {
        value_type: ValueType,
        partitions: Vec<PartitionId>,
    },
    NotPartitioned,
}

///
/// MetadataProvider
///
/// Source of truth for partition layouts.
///

pub trait MetadataProvider: Send + Sync {
    fn load_partition_metadata(
        &self,
        relation: RelationId,
    ) -> Result<PartitionMetadata, InternalError>;

    /// Partitioned relation that lists `partition` as a child, if any.
    fn parent_of_partition(
        &self,
        partition: PartitionId,
    ) -> Result<Option<RelationId>, InternalError>;
}

///
/// PartitionMaterializer
///
/// Physically creates child partitions so that `value` becomes covered.
///
/// Called with both edit locks of `relation` held. Returned entries must
/// extend `directory` without overlapping it, and one of them must cover
/// `value`; several entries may be returned when the policy extends in
/// fixed-size steps.
///

pub trait PartitionMaterializer: Send + Sync {
    fn create_partitions(
        &self,
        relation: RelationId,
        value: &Value,
        directory: &RangeSnapshot,
    ) -> Result<Vec<RangeEntry>, InternalError>;
}
