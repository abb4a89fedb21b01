use super::{int_cmp, int_directory};
use crate::{
    compare::resolve_uncached,
    value::{Value, ValueType},
};

#[test]
fn touching_boundary_does_not_overlap() {
    let snapshot = int_directory(&[(0, 10, 1)]).snapshot();
    let cmp = int_cmp();

    assert!(
        snapshot
            .overlaps(&Value::Int64(5), &Value::Int64(15), &cmp, &cmp)
            .expect("overlap")
    );
    assert!(
        !snapshot
            .overlaps(&Value::Int64(10), &Value::Int64(20), &cmp, &cmp)
            .expect("overlap")
    );
    assert!(
        !snapshot
            .overlaps(&Value::Int64(-5), &Value::Int64(0), &cmp, &cmp)
            .expect("overlap")
    );
}

#[test]
fn candidate_spanning_a_gap_only_overlaps_when_it_reaches_an_entry() {
    let snapshot = int_directory(&[(0, 10, 1), (20, 30, 2)]).snapshot();
    let cmp = int_cmp();

    assert!(
        !snapshot
            .overlaps(&Value::Int64(10), &Value::Int64(20), &cmp, &cmp)
            .expect("overlap")
    );
    assert!(
        snapshot
            .overlaps(&Value::Int64(10), &Value::Int64(21), &cmp, &cmp)
            .expect("overlap")
    );
}

#[test]
fn bounds_may_use_their_own_types() {
    let snapshot = int_directory(&[(0, 10, 1)]).snapshot();
    let cmp_lo = resolve_uncached(ValueType::Int16, ValueType::Int64).expect("integer family");
    let cmp_hi = resolve_uncached(ValueType::Int32, ValueType::Int64).expect("integer family");

    assert!(
        snapshot
            .overlaps(&Value::Int16(9), &Value::Int32(40), &cmp_lo, &cmp_hi)
            .expect("overlap")
    );
}
