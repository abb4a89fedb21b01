//! Core runtime for partmap: range directories, comparator and hash
//! registries, the edit-lock protocol, and race-safe partition creation.
//!
//! `engine::PartitionEngine` is the entry point; everything else is exported
//! for callers that embed individual pieces.

// public exports are one module level down
pub mod catalog;
pub mod compare;
pub mod config;
pub mod creator;
pub mod engine;
pub mod error;
pub mod hash;
pub mod lock;
pub mod obs;
pub mod range;
pub mod types;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// Prelude
///
/// Domain vocabulary only. Errors, registries and sinks stay in their
/// modules.
///

pub mod prelude {
    pub use crate::{
        catalog::{MetadataProvider, PartitionMaterializer, PartitionMetadata},
        creator::FindOrCreate,
        engine::PartitionEngine,
        range::{RangeEntry, RangeInterval},
        types::{PartitionId, RelationId},
        value::{Timestamp, Value, ValueType},
    };
}
