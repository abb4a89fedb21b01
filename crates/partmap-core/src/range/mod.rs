//! Range directory: ordered half-open intervals mapped to child partitions.
//!
//! Readers work on immutable snapshots. Mutation goes through
//! `RangeDirectory::extend` or `extend_to_cover`, which require the
//! relation's edit guard and swap in a fully validated copy of the entry
//! sequence.

mod directory;
mod extend;
mod interval;
mod overlap;
mod search;

#[cfg(test)]
mod tests;

use crate::{types::PartitionId, value::Value};

// re-exports
pub use directory::{RangeDirectory, RangeSnapshot};
pub use extend::plan_step_ranges;
pub use interval::RangeInterval;
pub use overlap::overlaps;
pub use search::{RangeSearch, search};

///
/// RangeEntry
///
/// One child partition owning the half-open interval `[min, max)`.
///

#[derive(Clone, Debug, PartialEq)]
pub struct RangeEntry {
    pub partition: PartitionId,
    pub min: Value,
    pub max: Value,
}

impl RangeEntry {
    #[must_use]
    pub const fn new(partition: PartitionId, min: Value, max: Value) -> Self {
        Self {
            partition,
            min,
            max,
        }
    }

    /// Bounds as an owned `(min, max)` pair.
    #[must_use]
    pub fn bounds(&self) -> (Value, Value) {
        (self.min.clone(), self.max.clone())
    }
}
