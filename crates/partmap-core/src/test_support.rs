//! Shared fixtures for unit tests.

use crate::{
    catalog::{MemoryCatalog, MetadataProvider, PartitionMaterializer, PartitionMetadata},
    error::InternalError,
    obs::{MetricsEvent, MetricsSink},
    range::{RangeEntry, RangeSnapshot, plan_step_ranges},
    types::{PartitionId, RelationId},
    value::{Value, ValueType},
};
use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering},
    mpsc::{self, Receiver, Sender},
};

///
/// StepMaterializer
///
/// Creates `step`-sized partitions from the directory edge and records them
/// in the backing catalog.
///

pub(crate) struct StepMaterializer {
    catalog: Arc<MemoryCatalog>,
    step: Value,
    next_id: AtomicU32,
    calls: AtomicUsize,
    fail: AtomicBool,
}

impl StepMaterializer {
    pub(crate) const fn new(catalog: Arc<MemoryCatalog>, step: Value, first_id: u32) -> Self {
        Self {
            catalog,
            step,
            next_id: AtomicU32::new(first_id),
            calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_next(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

impl PartitionMaterializer for StepMaterializer {
    fn create_partitions(
        &self,
        relation: RelationId,
        value: &Value,
        directory: &RangeSnapshot,
    ) -> Result<Vec<RangeEntry>, InternalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.swap(false, Ordering::SeqCst) {
            return Err(InternalError::materializer("injected failure"));
        }

        let entries: Vec<_> = plan_step_ranges(directory, value, &self.step, usize::MAX)?
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

///
/// FixedMaterializer
///
/// Always returns the same entries, whatever the value.
///

pub(crate) struct FixedMaterializer(pub(crate) Vec<RangeEntry>);

impl PartitionMaterializer for FixedMaterializer {
    fn create_partitions(
        &self,
        _: RelationId,
        _: &Value,
        _: &RangeSnapshot,
    ) -> Result<Vec<RangeEntry>, InternalError> {
        Ok(self.0.clone())
    }
}

///
/// GatedProvider
///
/// Serves a `MemoryCatalog` and can hold one load after it has read the
/// metadata, until the test releases it.
///

pub(crate) struct GatedProvider {
    catalog: Arc<MemoryCatalog>,
    gate: Mutex<Option<(Sender<()>, Receiver<()>)>>,
}

impl GatedProvider {
    pub(crate) const fn new(catalog: Arc<MemoryCatalog>) -> Self {
        Self {
            catalog,
            gate: Mutex::new(None),
        }
    }

    /// Hold the next load. The first receiver fires once that load has read
    /// the catalog; sending on the returned sender lets it finish.
    pub(crate) fn hold_next_load(&self) -> (Receiver<()>, Sender<()>) {
        let (loaded_tx, loaded_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        *self.gate.lock() = Some((loaded_tx, release_rx));

        (loaded_rx, release_tx)
    }
}

impl MetadataProvider for GatedProvider {
    fn load_partition_metadata(
        &self,
        relation: RelationId,
    ) -> Result<PartitionMetadata, InternalError> {
        let metadata = self.catalog.load_partition_metadata(relation)?;

        let gate = self.gate.lock().take();
        if let Some((loaded, release)) = gate {
            loaded.send(()).expect("test waits for the held load");
            release.recv().expect("test releases the held load");
        }

        Ok(metadata)
    }

    fn parent_of_partition(
        &self,
        partition: PartitionId,
    ) -> Result<Option<RelationId>, InternalError> {
        self.catalog.parent_of_partition(partition)
    }
}

///
/// RecordingSink
///

#[derive(Default)]
pub(crate) struct RecordingSink {
    events: Mutex<Vec<MetricsEvent>>,
}

impl RecordingSink {
    pub(crate) fn events(&self) -> Vec<MetricsEvent> {
        self.events.lock().clone()
    }

    pub(crate) fn count(&self, matches: impl Fn(&MetricsEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|event| matches(event)).count()
    }
}

impl MetricsSink for RecordingSink {
    fn record(&self, event: MetricsEvent) {
        self.events.lock().push(event);
    }
}

/// Int64 range entries from `(min, max, partition)` triples.
pub(crate) fn int_ranges(ranges: &[(i64, i64, u32)]) -> Vec<RangeEntry> {
    ranges
        .iter()
        .map(|&(min, max, id)| {
            RangeEntry::new(PartitionId::new(id), Value::Int64(min), Value::Int64(max))
        })
        .collect()
}

/// Catalog with one Int64 range relation.
pub(crate) fn int_catalog(relation: RelationId, ranges: &[(i64, i64, u32)]) -> Arc<MemoryCatalog> {
    let catalog = Arc::new(MemoryCatalog::new());
    catalog.set_range(relation, ValueType::Int64, int_ranges(ranges));

    catalog
}
