use crate::{
    catalog::{MetadataProvider, PartitionMetadata},
    error::InternalError,
    range::RangeEntry,
    types::{PartitionId, RelationId},
    value::ValueType,
};
use parking_lot::RwLock;
use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
};

///
/// MemoryCatalog
///
/// In-memory metadata store. Serves embedded use and tests; every load is
/// counted so callers can observe cache behaviour.
///

#[derive(Debug, Default)]
pub struct MemoryCatalog {
    relations: RwLock<HashMap<RelationId, PartitionMetadata>>,
    loads: AtomicU64,
}

impl MemoryCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_range(&self, relation: RelationId, value_type: ValueType, entries: Vec<RangeEntry>) {
        self.relations.write().insert(
            relation,
            PartitionMetadata::Range {
                value_type,
                entries,
            },
        );
    }

    pub fn set_hash(&self, relation: RelationId, value_type: ValueType, partitions: Vec<PartitionId>) {
        self.relations.write().insert(
            relation,
            PartitionMetadata::Hash {
                value_type,
                partitions,
            },
        );
    }

    /// Record newly created range entries for `relation`.
    pub fn append_range_entries(
        &self,
        relation: RelationId,
        added: &[RangeEntry],
    ) -> Result<(), InternalError> {
        match self.relations.write().get_mut(&relation) {
            Some(PartitionMetadata::Range { entries, .. }) => {
                entries.extend_from_slice(added);
                Ok(())
            }
            _ => Err(InternalError::catalog_invariant(format!(
                "{relation} has no range metadata to extend"
            ))),
        }
    }

    pub fn remove(&self, relation: RelationId) -> bool {
        self.relations.write().remove(&relation).is_some()
    }

    /// Number of metadata loads served so far.
    #[must_use]
    pub fn loads(&self) -> u64 {
        self.loads.load(Ordering::Relaxed)
    }
}

impl MetadataProvider for MemoryCatalog {
    fn load_partition_metadata(
        &self,
        relation: RelationId,
    ) -> Result<PartitionMetadata, InternalError> {
        self.loads.fetch_add(1, Ordering::Relaxed);

        Ok(self
            .relations
            .read()
            .get(&relation)
            .cloned()
            .unwrap_or(PartitionMetadata::NotPartitioned))
    }

    fn parent_of_partition(
        &self,
        partition: PartitionId,
    ) -> Result<Option<RelationId>, InternalError> {
        let relations = self.relations.read();
        let parent = relations.iter().find_map(|(relation, metadata)| {
            let owns = match metadata {
                PartitionMetadata::Range { entries, .. } => {
                    entries.iter().any(|entry| entry.partition == partition)
                }
                PartitionMetadata::Hash { partitions, .. } => partitions.contains(&partition),
                PartitionMetadata::NotPartitioned => false,
            };
            owns.then_some(*relation)
        });

        Ok(parent)
    }
}
