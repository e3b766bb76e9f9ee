//! Pipeline configuration types.

use std::path::{Path, PathBuf};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::digest::DigestAlgorithm;
use crate::error::ConfigError;

/// Default number of hashing workers.
pub const DEFAULT_WORKER_COUNT: usize = 5;

/// Default capacity of the work and result queues.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

/// Configuration for one hashing run.
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct PipelineConfig {
    /// Root directory to hash.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Number of concurrent hashing workers.
    #[builder(default = "DEFAULT_WORKER_COUNT")]
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Digest algorithm, fixed for the whole run.
    #[builder(default)]
    #[serde(default)]
    pub digest_algorithm: DigestAlgorithm,

    /// Capacity of the bounded work and result queues.
    #[builder(default = "DEFAULT_QUEUE_CAPACITY")]
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Follow symbolic links while walking.
    #[builder(default = "false")]
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Include hidden files (starting with .).
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub include_hidden: bool,

    /// Maximum depth to traverse (None = unlimited).
    #[builder(default)]
    #[serde(default)]
    pub max_depth: Option<usize>,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_worker_count() -> usize {
    DEFAULT_WORKER_COUNT
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

fn default_true() -> bool {
    true
}

impl PipelineConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.root {
            Some(ref root) if root.as_os_str().is_empty() => {
                return Err("Root path cannot be empty".to_string());
            }
            Some(_) => {}
            None => return Err("Root path is required".to_string()),
        }
        if self.worker_count == Some(0) {
            return Err("Worker count must be at least 1".to_string());
        }
        if self.queue_capacity == Some(0) {
            return Err("Queue capacity must be at least 1".to_string());
        }
        Ok(())
    }
}

impl PipelineConfig {
    /// Create a new pipeline config builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Create a config with defaults for hashing a path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            worker_count: DEFAULT_WORKER_COUNT,
            digest_algorithm: DigestAlgorithm::default(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            follow_symlinks: false,
            include_hidden: true,
            max_depth: None,
        }
    }

    /// Parse a config from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check the invariants the builder enforces, for configs built by hand
    /// or deserialized.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.root.as_os_str().is_empty() {
            return Err(ConfigError::invalid("Root path cannot be empty"));
        }
        if self.worker_count == 0 {
            return Err(ConfigError::invalid("Worker count must be at least 1"));
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::invalid("Queue capacity must be at least 1"));
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = PipelineConfig::builder()
            .root("/home/user")
            .worker_count(8usize)
            .digest_algorithm(DigestAlgorithm::Sha256)
            .follow_symlinks(true)
            .build()
            .unwrap();

        assert_eq!(config.root, PathBuf::from("/home/user"));
        assert_eq!(config.worker_count, 8);
        assert_eq!(config.digest_algorithm, DigestAlgorithm::Sha256);
        assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert!(config.follow_symlinks);
        assert!(config.include_hidden);
    }

    #[test]
    fn test_builder_rejects_zero_workers() {
        let err = PipelineConfig::builder()
            .root("/test")
            .worker_count(0usize)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Worker count"));
    }

    #[test]
    fn test_builder_rejects_zero_capacity() {
        let result = PipelineConfig::builder()
            .root("/test")
            .queue_capacity(0usize)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_requires_root() {
        assert!(PipelineConfig::builder().build().is_err());
        assert!(PipelineConfig::builder().root("").build().is_err());
    }

    #[test]
    fn test_config_simple() {
        let config = PipelineConfig::new("/home/user");
        assert_eq!(config.worker_count, 5);
        assert_eq!(config.queue_capacity, 10);
        assert_eq!(config.digest_algorithm, DigestAlgorithm::Sha512);
        assert!(config.validate().is_ok());
    }
}
