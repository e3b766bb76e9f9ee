//! Error types for walking, hashing and configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fatal errors about the walk root. Returned before any worker starts.
#[derive(Debug, Error)]
pub enum WalkError {
    /// Permission denied for the root.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Root path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Root path is not a directory.
    #[error("Root path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WalkError {
    /// Create a walk error with path context from an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }
}

/// A single directory entry could not be read. The walk continues.
#[derive(Debug, Clone, Error)]
#[error("Unreadable entry {path}: {message}")]
pub struct EntryError {
    /// Path of the entry, if known.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Classification carried into the walk warning.
    pub kind: WarningKind,
}

impl EntryError {
    /// Create a new entry error of kind [`WarningKind::ReadError`].
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind: WarningKind::ReadError,
        }
    }

    /// Create an entry error, classifying it by the underlying I/O error
    /// kind when there is one.
    pub fn with_io_kind(
        path: impl Into<PathBuf>,
        message: impl Into<String>,
        io_kind: Option<std::io::ErrorKind>,
    ) -> Self {
        let kind = match io_kind {
            Some(std::io::ErrorKind::PermissionDenied) => WarningKind::PermissionDenied,
            _ => WarningKind::ReadError,
        };
        Self {
            kind,
            ..Self::new(path, message)
        }
    }
}

/// A single file could not be hashed.
#[derive(Debug, Error)]
pub enum HashError {
    /// The file could not be opened.
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading failed partway through the file.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// Path of the file that failed.
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Open { path, .. } | Self::Read { path, .. } => path,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value failed validation.
    #[error("{message}")]
    Invalid { message: String },

    /// Config file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ConfigError {
    /// Create a validation error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

/// Kind of walk warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Permission was denied.
    PermissionDenied,
    /// Error reading a directory or entry.
    ReadError,
}

/// Non-fatal warning encountered during a walk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl WalkWarning {
    /// Create a new walk warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }
}

impl From<EntryError> for WalkWarning {
    fn from(err: EntryError) -> Self {
        Self::new(err.path, err.message, err.kind)
    }
}
