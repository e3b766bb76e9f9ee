//! Errors that stop a run before or while it starts.

use thiserror::Error;

use hashpool_core::{ConfigError, WalkError};

/// Errors returned by the dispatcher.
///
/// Per-file problems never show up here; they travel through the result
/// queue as failed outcomes.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The walk root is unusable.
    #[error(transparent)]
    Walk(#[from] WalkError),

    /// The configuration is invalid.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A pipeline thread could not be spawned.
    #[error("Failed to spawn {name}: {source}")]
    Spawn {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// A pipeline thread panicked.
    #[error("{name} thread panicked")]
    Panicked { name: &'static str },
}
