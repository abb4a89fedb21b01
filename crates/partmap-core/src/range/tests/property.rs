use super::{int_cmp, int_directory};
use crate::{range::RangeSearch, value::Value};
use proptest::prelude::*;

// Build non-overlapping `(min, max, id)` triples from `(gap, len)` pairs.
fn layout(shape: &[(i64, i64)]) -> Vec<(i64, i64, u32)> {
    let mut cursor = 0;
    shape
        .iter()
        .zip(1u32..)
        .map(|(&(gap, len), id)| {
            let min = cursor + gap;
            cursor = min + len;
            (min, cursor, id)
        })
        .collect()
}

fn linear_expectation(ranges: &[(i64, i64, u32)], value: i64) -> RangeSearch {
    if let Some(idx) = ranges
        .iter()
        .position(|&(min, max, _)| min <= value && value < max)
    {
        return RangeSearch::Found(idx);
    }

    match (ranges.first(), ranges.last()) {
        (Some(first), Some(last)) if first.0 <= value && value < last.1 => RangeSearch::Gap,
        _ => RangeSearch::OutOfBounds,
    }
}

fn shape_strategy() -> impl Strategy<Value = Vec<(i64, i64)>> {
    prop::collection::vec((0i64..5, 1i64..10), 0..24)
}

proptest! {
    #[test]
    fn search_matches_linear_scan(shape in shape_strategy(), probe in -20i64..300) {
        let ranges = layout(&shape);
        let snapshot = int_directory(&ranges).snapshot();

        let found = snapshot.search(&Value::Int64(probe), &int_cmp()).expect("search");
        prop_assert_eq!(found, linear_expectation(&ranges, probe));
    }

    #[test]
    fn overlap_matches_interval_predicate(
        shape in shape_strategy(),
        lo in -20i64..300,
        width in 1i64..40,
    ) {
        let ranges = layout(&shape);
        let snapshot = int_directory(&ranges).snapshot();
        let hi = lo + width;
        let cmp = int_cmp();

        let expected = ranges.iter().any(|&(min, max, _)| lo < max && hi > min);
        let actual = snapshot
            .overlaps(&Value::Int64(lo), &Value::Int64(hi), &cmp, &cmp)
            .expect("overlap");
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn directory_invariant_holds_for_loaded_layouts(shape in shape_strategy()) {
        let snapshot = int_directory(&layout(&shape)).snapshot();
        let cmp = int_cmp();

        for entry in snapshot.entries() {
            prop_assert!(cmp.lt(&entry.min, &entry.max).expect("compare"));
        }
        for pair in snapshot.entries().windows(2) {
            prop_assert!(!cmp.gt(&pair[0].max, &pair[1].min).expect("compare"));
        }
        if !snapshot.is_empty() {
            prop_assert_eq!(
                snapshot.by_position(-1).expect("last"),
                snapshot.by_position(i64::try_from(snapshot.len() - 1).expect("fits")).expect("index")
            );
        }
    }
}
