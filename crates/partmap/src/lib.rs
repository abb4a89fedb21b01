//! ## Crate layout
//! - `core`: the partition engine, range directories, hash routing, locks
//!   and observability.
//!
//! The `prelude` module carries the types needed to wire an engine to a
//! metadata store and a partition materializer.

pub use partmap_core as core;

pub use partmap_core::{config::EngineConfig, error::InternalError as Error};

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
///

pub mod prelude {
    pub use crate::core::prelude::*;
    pub use crate::{EngineConfig, Error};
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn version_is_set() {
        assert!(!super::VERSION.is_empty());
    }

    #[test]
    fn prelude_names_the_engine_surface() {
        let entry = RangeEntry::new(PartitionId::new(1), Value::Int64(0), Value::Int64(10));

        assert_eq!(RangeInterval::from(&entry).to_string(), "[0: 10)");
        assert_eq!(EngineConfig::default().max_partitions_per_create, 1024);
    }
}
