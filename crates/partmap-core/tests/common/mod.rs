#![allow(dead_code)]

use partmap_core::{
    catalog::{MemoryCatalog, PartitionMaterializer},
    error::InternalError,
    range::{RangeEntry, RangeSnapshot, plan_step_ranges},
    types::{PartitionId, RelationId},
    value::Value,
};
use std::{
    sync::{
        Arc,
        atomic::{AtomicU32, AtomicUsize, Ordering},
    },
    thread,
    time::Duration,
};

///
/// StepCreator
///
/// Materializer that extends a relation in fixed steps and records the new
/// partitions in the catalog, optionally stalling to widen race windows.
///

pub struct StepCreator {
    catalog: Arc<MemoryCatalog>,
    step: Value,
    next_id: AtomicU32,
    calls: AtomicUsize,
    stall: Option<Duration>,
}

impl StepCreator {
    pub const fn new(catalog: Arc<MemoryCatalog>, step: Value, first_id: u32) -> Self {
        Self {
            catalog,
            step,
            next_id: AtomicU32::new(first_id),
            calls: AtomicUsize::new(0),
            stall: None,
        }
    }

    #[must_use]
    pub fn stalling(mut self, stall: Duration) -> Self {
        self.stall = Some(stall);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PartitionMaterializer for StepCreator {
    fn create_partitions(
        &self,
        relation: RelationId,
        value: &Value,
        directory: &RangeSnapshot,
    ) -> Result<Vec<RangeEntry>, InternalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(stall) = self.stall {
            thread::sleep(stall);
        }

        let entries: Vec<_> = plan_step_ranges(directory, value, &self.step, 64)?
            .into_iter()
            .map(|(min, max)| {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                RangeEntry::new(PartitionId::new(id), min, max)
            })
            .collect();
        self.catalog.append_range_entries(relation, &entries)?;

        Ok(entries)
    }
}
