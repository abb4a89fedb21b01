use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// RelationId
///
/// Identifier of a partitioned (parent) relation.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[display("rel#{_0}")]
pub struct RelationId(u32);

impl RelationId {
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

///
/// PartitionId
///
/// Identifier of one child partition, unique within its parent's directory.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[display("part#{_0}")]
pub struct PartitionId(u32);

impl PartitionId {
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}
