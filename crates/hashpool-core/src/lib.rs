//! Core types for hashpool.
//!
//! This crate provides the data structures shared by the walker, the
//! hashing pool and the CLI: digest algorithms and values, per-file
//! outcomes, pipeline configuration and the error taxonomy.

mod config;
mod digest;
mod error;
mod outcome;

pub use config::{
    DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKER_COUNT, PipelineConfig, PipelineConfigBuilder,
    PipelineConfigBuilderError,
};
pub use digest::{ContentDigest, DigestAlgorithm};
pub use error::{ConfigError, EntryError, HashError, WalkError, WalkWarning, WarningKind};
pub use outcome::{DigestResult, FailureKind, HashFailure, HashOutcome};
