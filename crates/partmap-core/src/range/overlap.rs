use crate::{compare::Comparator, error::InternalError, range::RangeEntry, value::Value};

/// Whether the candidate `[lo, hi)` intersects any entry.
///
/// The bounds may carry a different type than the directory, so each gets
/// its own comparator. Linear scan; stops at the first intersection.
pub fn overlaps(
    entries: &[RangeEntry],
    lo: &Value,
    hi: &Value,
    cmp_lo: &Comparator,
    cmp_hi: &Comparator,
) -> Result<bool, InternalError> {
    for entry in entries {
        if cmp_lo.lt(lo, &entry.max)? && cmp_hi.gt(hi, &entry.min)? {
            return Ok(true);
        }
    }

    Ok(false)
}
