//! Per-file hashing outcomes.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::digest::ContentDigest;
use crate::error::HashError;

/// Why a file was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// The file could not be opened.
    Open,
    /// Reading failed partway.
    Read,
}

/// Recorded failure for a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashFailure {
    /// Kind of failure.
    pub kind: FailureKind,
    /// Human-readable reason.
    pub message: String,
}

impl From<&HashError> for HashFailure {
    fn from(err: &HashError) -> Self {
        let (kind, source) = match err {
            HashError::Open { source, .. } => (FailureKind::Open, source),
            HashError::Read { source, .. } => (FailureKind::Read, source),
        };
        Self {
            kind,
            message: source.to_string(),
        }
    }
}

impl std::fmt::Display for HashFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            FailureKind::Open => write!(f, "open failed: {}", self.message),
            FailureKind::Read => write!(f, "read failed: {}", self.message),
        }
    }
}

/// Outcome of hashing one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashOutcome {
    /// The file was hashed.
    Hashed(ContentDigest),
    /// The file was skipped.
    Failed(HashFailure),
}

impl HashOutcome {
    /// Check if this outcome carries a digest.
    pub fn is_hashed(&self) -> bool {
        matches!(self, Self::Hashed(_))
    }

    /// Get the digest, if hashed.
    pub fn digest(&self) -> Option<&ContentDigest> {
        match self {
            Self::Hashed(digest) => Some(digest),
            Self::Failed(_) => None,
        }
    }
}

impl From<Result<ContentDigest, HashError>> for HashOutcome {
    fn from(result: Result<ContentDigest, HashError>) -> Self {
        match result {
            Ok(digest) => Self::Hashed(digest),
            Err(err) => Self::Failed(HashFailure::from(&err)),
        }
    }
}

/// One entry of the result queue: a path and what happened to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestResult {
    /// File that was processed.
    pub path: PathBuf,
    /// Digest or failure.
    pub outcome: HashOutcome,
    /// Bytes read while hashing. Zero for failed files.
    #[serde(default)]
    pub bytes: u64,
}

impl DigestResult {
    /// Create a result for a hashed file that yielded `bytes` bytes.
    pub fn hashed(path: impl Into<PathBuf>, digest: ContentDigest, bytes: u64) -> Self {
        Self {
            path: path.into(),
            outcome: HashOutcome::Hashed(digest),
            bytes,
        }
    }

    /// Create a result for a skipped file.
    pub fn failed(path: impl Into<PathBuf>, failure: HashFailure) -> Self {
        Self {
            path: path.into(),
            outcome: HashOutcome::Failed(failure),
            bytes: 0,
        }
    }

    /// Check if the file was hashed.
    pub fn is_hashed(&self) -> bool {
        self.outcome.is_hashed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::DigestAlgorithm;

    #[test]
    fn test_outcome_from_error() {
        let err = HashError::Open {
            path: PathBuf::from("/missing"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        let outcome = HashOutcome::from(Err(err));
        assert!(!outcome.is_hashed());
        match outcome {
            HashOutcome::Failed(failure) => {
                assert_eq!(failure.kind, FailureKind::Open);
                assert!(failure.to_string().starts_with("open failed"));
            }
            HashOutcome::Hashed(_) => panic!("expected failure"),
        }
    }

    #[test]
    fn test_hashed_result() {
        let digest = ContentDigest::new(DigestAlgorithm::Sha256, vec![1u8; 32]);
        let result = DigestResult::hashed("/a.txt", digest.clone(), 12);
        assert!(result.is_hashed());
        assert_eq!(result.bytes, 12);
        assert_eq!(result.outcome.digest(), Some(&digest));
    }
}
