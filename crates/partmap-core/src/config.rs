use serde::Deserialize;
use thiserror::Error as ThisError;

///
/// CONSTANTS
///

/// Default upper bound on entries one creation may add.
pub const DEFAULT_MAX_PARTITIONS_PER_CREATE: usize = 1024;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("invalid engine config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("max_partitions_per_create must be at least 1")]
    ZeroPartitionLimit,
}

///
/// EngineConfig
///
/// Runtime knobs of the partition engine. Every field has a default, so an
/// empty TOML document is a valid config.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Upper bound on entries a single creation may add to a directory.
    pub max_partitions_per_create: usize,

    /// Whether engine events are forwarded to the metrics sink.
    pub metrics: bool,
}

impl EngineConfig {
    /// Parse and validate a TOML config document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.max_partitions_per_create == 0 {
            return Err(ConfigError::ZeroPartitionLimit);
        }

        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_partitions_per_create: DEFAULT_MAX_PARTITIONS_PER_CREATE,
            metrics: true,
        }
    }
}

///
/// TESTS
///
