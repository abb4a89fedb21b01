use crate::{
    catalog::{MemoryCatalog, MetadataProvider, PartitionScheme, RelationCache},
    error::{ErrorClass, PartitionError},
    obs::MetricsEvent,
    test_support::{GatedProvider, RecordingSink, int_catalog, int_ranges},
    types::{PartitionId, RelationId},
    value::ValueType,
};
use std::{sync::Arc, thread};

const RANGE: RelationId = RelationId::new(10);
const HASHED: RelationId = RelationId::new(11);
const PLAIN: RelationId = RelationId::new(12);

fn cache() -> (Arc<MemoryCatalog>, Arc<RecordingSink>, RelationCache) {
    let catalog = int_catalog(RANGE, &[(0, 10, 1), (10, 20, 2)]);
    catalog.set_hash(
        HASHED,
        ValueType::Text,
        vec![PartitionId::new(5), PartitionId::new(6)],
    );
    let sink = Arc::new(RecordingSink::default());
    let cache = RelationCache::new(catalog.clone(), sink.clone());

    (catalog, sink, cache)
}

#[test]
fn loads_once_and_serves_from_cache() {
    let (catalog, sink, cache) = cache();

    let first = cache.range(RANGE).expect("range directory");
    let second = cache.range(RANGE).expect("range directory");

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(catalog.loads(), 1);
    assert_eq!(
        sink.count(|e| matches!(e, MetricsEvent::CacheLoad { .. })),
        1
    );
    assert_eq!(first.snapshot().len(), 2);
}

#[test]
fn invalidate_forces_a_reload() {
    let (catalog, sink, cache) = cache();
    let before = cache.range(RANGE).expect("range directory");

    catalog.set_range(RANGE, ValueType::Int64, int_ranges(&[(0, 50, 9)]));
    assert!(cache.invalidate(RANGE));
    assert!(!cache.invalidate(RANGE), "already gone");

    let after = cache.range(RANGE).expect("reloaded directory");
    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(after.snapshot().entries()[0].partition, PartitionId::new(9));
    assert_eq!(catalog.loads(), 2);
    assert_eq!(
        sink.count(|e| matches!(e, MetricsEvent::CacheInvalidate { .. })),
        1
    );
}

#[test]
fn clear_empties_the_cache() {
    let (_, _, cache) = cache();
    cache.get(RANGE).expect("range");
    cache.get(HASHED).expect("hash");
    assert_eq!(cache.len(), 2);

    cache.clear();

    assert!(cache.is_empty());
    assert!(!cache.is_cached(RANGE));
}

#[test]
fn unpartitioned_relation_is_an_error_and_not_cached() {
    let (_, _, cache) = cache();

    let err = cache.get(PLAIN).expect_err("not partitioned");

    assert_eq!(
        err.partition_error(),
        Some(&PartitionError::NotPartitioned { relation: PLAIN })
    );
    assert!(!cache.is_cached(PLAIN));
}

#[test]
fn scheme_kind_is_checked() {
    let (_, _, cache) = cache();

    assert_eq!(cache.get(HASHED).expect("hash").label(), "hash");
    let err = cache.range(HASHED).expect_err("hash relation has no ranges");
    assert_eq!(
        err.partition_error(),
        Some(&PartitionError::NotRangePartitioned { relation: HASHED })
    );

    let err = cache.hash(RANGE).expect_err("range relation has no buckets");
    assert_eq!(err.class, ErrorClass::Unsupported);
    assert_eq!(
        err.partition_error(),
        Some(&PartitionError::NotHashPartitioned { relation: RANGE })
    );

    let PartitionScheme::Hash(layout) = cache.get(HASHED).expect("hash") else {
        panic!("expected a hash layout");
    };
    assert_eq!(layout.bucket_count(), 2);
}

#[test]
fn invalid_metadata_is_rejected_on_load() {
    let (catalog, _, cache) = cache();
    catalog.set_range(RANGE, ValueType::Int64, int_ranges(&[(0, 10, 1), (5, 15, 2)]));

    let err = cache.range(RANGE).expect_err("overlapping metadata");

    assert_eq!(err.class, ErrorClass::InvariantViolation);
    assert!(!cache.is_cached(RANGE));
}

#[test]
fn memory_catalog_appends_only_to_range_relations() {
    let (catalog, _, _) = cache();

    catalog
        .append_range_entries(RANGE, &int_ranges(&[(20, 30, 3)]))
        .expect("append");
    assert!(catalog.append_range_entries(HASHED, &[]).is_err());
    assert!(catalog.append_range_entries(PLAIN, &[]).is_err());

    assert!(catalog.remove(HASHED));
    assert!(!catalog.remove(HASHED));
}

fn gated_cache() -> (Arc<MemoryCatalog>, Arc<GatedProvider>, RelationCache) {
    let catalog = int_catalog(RANGE, &[(0, 10, 1)]);
    let provider = Arc::new(GatedProvider::new(catalog.clone()));
    let cache = RelationCache::new(provider.clone(), Arc::new(RecordingSink::default()));

    (catalog, provider, cache)
}

#[test]
fn load_overlapping_an_invalidation_is_not_cached() {
    let (catalog, provider, cache) = gated_cache();
    let (loaded, release) = provider.hold_next_load();

    let directory = thread::scope(|scope| {
        let reader = scope.spawn(|| cache.range(RANGE));
        loaded.recv().expect("load reached the gate");

        catalog
            .append_range_entries(RANGE, &int_ranges(&[(10, 20, 2)]))
            .expect("append");
        cache.invalidate(RANGE);
        release.send(()).expect("release");

        reader.join().expect("reader thread").expect("directory")
    });

    assert_eq!(directory.snapshot().len(), 2);
    assert_eq!(catalog.loads(), 2);
    assert_eq!(cache.range(RANGE).expect("cached").snapshot().len(), 2);
}

#[test]
fn load_overlapping_a_clear_is_not_cached() {
    let (catalog, provider, cache) = gated_cache();
    let (loaded, release) = provider.hold_next_load();

    let directory = thread::scope(|scope| {
        let reader = scope.spawn(|| cache.range(RANGE));
        loaded.recv().expect("load reached the gate");

        catalog.set_range(RANGE, ValueType::Int64, int_ranges(&[(0, 50, 9)]));
        cache.clear();
        release.send(()).expect("release");

        reader.join().expect("reader thread").expect("directory")
    });

    assert_eq!(directory.snapshot().entries()[0].partition, PartitionId::new(9));
    assert_eq!(catalog.loads(), 2);
}

#[test]
fn extension_of_a_superseded_directory_drops_the_cached_entry() {
    let (_, _, cache) = cache();
    let superseded = cache.range(RANGE).expect("first load");
    cache.invalidate(RANGE);
    let current = cache.range(RANGE).expect("second load");

    cache.note_extended(RANGE, &current);
    assert!(cache.is_cached(RANGE), "extended entry stays");

    cache.note_extended(RANGE, &superseded);
    assert!(!cache.is_cached(RANGE));
}

#[test]
fn parents_are_found_in_cached_layouts_and_the_catalog() {
    let (catalog, _, cache) = cache();

    assert_eq!(cache.cached_parent_of(PartitionId::new(2)), None);
    cache.get(RANGE).expect("range");
    cache.get(HASHED).expect("hash");
    assert_eq!(cache.cached_parent_of(PartitionId::new(2)), Some(RANGE));
    assert_eq!(cache.cached_parent_of(PartitionId::new(6)), Some(HASHED));
    assert_eq!(cache.cached_parent_of(PartitionId::new(99)), None);

    assert_eq!(
        catalog
            .parent_of_partition(PartitionId::new(5))
            .expect("catalog lookup"),
        Some(HASHED)
    );
    assert_eq!(
        cache
            .provider_parent_of(PartitionId::new(1))
            .expect("provider lookup"),
        Some(RANGE)
    );
    assert_eq!(
        catalog
            .parent_of_partition(PartitionId::new(99))
            .expect("catalog lookup"),
        None
    );
}
