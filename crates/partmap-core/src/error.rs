use crate::{
    config::ConfigError,
    types::{PartitionId, RelationId},
    value::ValueType,
};
use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// Callers match on `partition_error()` for the taxonomy; `class` and
/// `origin` exist for diagnostics and metrics labels.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Optional structured error detail.
    pub detail: Option<ErrorDetail>,
}

impl InternalError {
    /// Construct an InternalError without a detail payload.
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            detail: None,
        }
    }

    /// Construct a classified partition error for one origin.
    pub(crate) fn partition(origin: ErrorOrigin, err: PartitionError) -> Self {
        Self {
            class: err.class(),
            origin,
            message: err.to_string(),
            detail: Some(ErrorDetail::Partition(err)),
        }
    }

    /// Construct a directory-origin invariant violation.
    pub(crate) fn directory_invariant(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Directory,
            message.into(),
        )
    }

    /// Construct a creator-origin invariant violation.
    pub(crate) fn creator_invariant(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Creator,
            message.into(),
        )
    }

    /// Construct a catalog-origin invariant violation.
    pub(crate) fn catalog_invariant(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Catalog,
            message.into(),
        )
    }

    /// Construct a creator-origin invalid-input error.
    pub(crate) fn creator_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::InvalidInput, ErrorOrigin::Creator, message.into())
    }

    /// Construct a materializer failure surfaced through the creator.
    pub fn materializer(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Internal, ErrorOrigin::Materializer, message.into())
    }

    /// Partition taxonomy kind, when this error carries one.
    #[must_use]
    pub const fn partition_error(&self) -> Option<&PartitionError> {
        match &self.detail {
            Some(ErrorDetail::Partition(err)) => Some(err),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.class, ErrorClass::NotFound)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorDetail
///
/// Structured, origin-specific error detail carried by [`InternalError`].
///

#[derive(Debug, ThisError)]
pub enum ErrorDetail {
    #[error("{0}")]
    Partition(PartitionError),

    #[error("{0}")]
    Config(ConfigError),
}

impl From<ConfigError> for InternalError {
    fn from(err: ConfigError) -> Self {
        Self {
            class: ErrorClass::InvalidInput,
            origin: ErrorOrigin::Config,
            message: err.to_string(),
            detail: Some(ErrorDetail::Config(err)),
        }
    }
}

///
/// PartitionError
///
/// Failure taxonomy of the partition resolution surface.
/// Always wrapped in [`ErrorDetail::Partition`].
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum PartitionError {
    #[error("relation {relation} is not partitioned")]
    NotPartitioned { relation: RelationId },

    #[error("relation {relation} is not partitioned by range")]
    NotRangePartitioned { relation: RelationId },

    #[error("relation {relation} is not partitioned by hash")]
    NotHashPartitioned { relation: RelationId },

    #[error("relation {relation} has no partition {partition}")]
    PartitionNotFound {
        relation: RelationId,
        partition: PartitionId,
    },

    #[error("{partition} is not a partition of any partitioned relation")]
    UnknownPartition { partition: PartitionId },

    #[error("partition #{index} of relation {relation} does not exist (total amount is {count})")]
    IndexOutOfRange {
        relation: RelationId,
        index: i64,
        count: usize,
    },

    #[error(
        "partition index {index} of relation {relation} is invalid: negative indices other than -1 (last partition) are not allowed"
    )]
    InvalidIndex { relation: RelationId, index: i64 },

    #[error("no shared ordering between value types {left} and {right}")]
    TypeMismatch { left: ValueType, right: ValueType },

    #[error("{operation} is not implemented")]
    NotImplemented { operation: &'static str },

    #[error("hash bucket count must be positive, got {count}")]
    InvalidBucketCount { count: u32 },
}

impl PartitionError {
    pub(crate) const fn class(&self) -> ErrorClass {
        match self {
            Self::NotPartitioned { .. }
            | Self::PartitionNotFound { .. }
            | Self::UnknownPartition { .. } => ErrorClass::NotFound,
            Self::NotRangePartitioned { .. }
            | Self::NotHashPartitioned { .. }
            | Self::NotImplemented { .. } => ErrorClass::Unsupported,
            Self::IndexOutOfRange { .. }
            | Self::InvalidIndex { .. }
            | Self::TypeMismatch { .. }
            | Self::InvalidBucketCount { .. } => ErrorClass::InvalidInput,
        }
    }
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    NotFound,
    Internal,
    InvalidInput,
    Unsupported,
    InvariantViolation,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotFound => "not_found",
            Self::Internal => "internal",
            Self::InvalidInput => "invalid_input",
            Self::Unsupported => "unsupported",
            Self::InvariantViolation => "invariant_violation",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Compare,
    Directory,
    Creator,
    Materializer,
    Catalog,
    Hash,
    Config,
    Interface,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Compare => "compare",
            Self::Directory => "directory",
            Self::Creator => "creator",
            Self::Materializer => "materializer",
            Self::Catalog => "catalog",
            Self::Hash => "hash",
            Self::Config => "config",
            Self::Interface => "interface",
        };
        write!(f, "{label}")
    }
}

///
/// TESTS
///
