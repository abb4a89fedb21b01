use crate::{compare::Comparator, error::InternalError, range::RangeEntry, value::Value};

///
/// RangeSearch
///
/// Outcome of resolving one value against a sorted directory.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RangeSearch {
    /// `entries[i].min <= value < entries[i].max`
    Found(usize),

    /// Uncovered, but inside the directory's overall span.
    Gap,

    /// Below the first `min` or at/after the last `max`; always the outcome
    /// for an empty directory.
    OutOfBounds,
}

/// Binary search `value` over `entries`, which must be sorted by `min` and
/// non-overlapping.
///
/// `comparator` orders the lookup value (left) against directory bounds
/// (right).
pub fn search(
    entries: &[RangeEntry],
    value: &Value,
    comparator: &Comparator,
) -> Result<RangeSearch, InternalError> {
    let (Some(first), Some(last)) = (entries.first(), entries.last()) else {
        return Ok(RangeSearch::OutOfBounds);
    };

    if comparator.lt(value, &first.min)? || !comparator.lt(value, &last.max)? {
        return Ok(RangeSearch::OutOfBounds);
    }

    let (mut lo, mut hi) = (0, entries.len());
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        let entry = &entries[mid];

        if comparator.lt(value, &entry.min)? {
            hi = mid;
        } else if comparator.lt(value, &entry.max)? {
            return Ok(RangeSearch::Found(mid));
        } else {
            lo = mid + 1;
        }
    }

    Ok(RangeSearch::Gap)
}
