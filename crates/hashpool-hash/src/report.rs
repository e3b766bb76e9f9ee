//! Aggregated results of a hashing run.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use hashpool_core::{ContentDigest, DigestAlgorithm, HashFailure, HashOutcome, WalkWarning};

/// Files sharing the same content digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Digest shared by all files in this group.
    pub digest: ContentDigest,

    /// Paths to all files with this digest, sorted.
    pub paths: Vec<PathBuf>,
}

impl DuplicateGroup {
    /// Get the number of files in the group.
    pub fn count(&self) -> usize {
        self.paths.len()
    }

    /// If keeping one file, how many could be deleted.
    pub fn deletable_count(&self) -> usize {
        self.paths.len().saturating_sub(1)
    }
}

/// Every outcome of one run, keyed by path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashReport {
    /// Canonical root that was walked.
    pub root: PathBuf,

    /// Algorithm used for every digest.
    pub algorithm: DigestAlgorithm,

    /// Number of workers (1 for the sequential baseline).
    pub worker_count: usize,

    /// Outcome per discovered file.
    pub results: BTreeMap<PathBuf, HashOutcome>,

    /// Total bytes read from hashed files.
    pub bytes_hashed: u64,

    /// Entry errors encountered while walking.
    pub warnings: Vec<WalkWarning>,

    /// Wall-clock duration of the run.
    pub duration: Duration,
}

impl HashReport {
    /// Total number of outcomes.
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Number of files hashed successfully.
    pub fn hashed_count(&self) -> usize {
        self.results.values().filter(|o| o.is_hashed()).count()
    }

    /// Number of files skipped because of errors.
    pub fn failed_count(&self) -> usize {
        self.total() - self.hashed_count()
    }

    /// Hashing rate in files per second, counting failed files.
    pub fn files_per_second(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.total() as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Hashing rate in bytes per second.
    pub fn bytes_per_second(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.bytes_hashed as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Check if there were any walk warnings.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Get the digest recorded for a path, if it was hashed.
    pub fn digest_of(&self, path: &Path) -> Option<&ContentDigest> {
        self.results.get(path).and_then(HashOutcome::digest)
    }

    /// Iterate over skipped files and why they were skipped.
    pub fn failures(&self) -> impl Iterator<Item = (&PathBuf, &HashFailure)> {
        self.results.iter().filter_map(|(path, outcome)| match outcome {
            HashOutcome::Failed(failure) => Some((path, failure)),
            HashOutcome::Hashed(_) => None,
        })
    }

    /// Groups of two or more files with identical content, largest first.
    pub fn duplicate_groups(&self) -> Vec<DuplicateGroup> {
        let mut by_digest: HashMap<&ContentDigest, Vec<PathBuf>> = HashMap::new();
        for (path, outcome) in &self.results {
            if let HashOutcome::Hashed(digest) = outcome {
                by_digest.entry(digest).or_default().push(path.clone());
            }
        }

        let mut groups: Vec<DuplicateGroup> = by_digest
            .into_iter()
            .filter(|(_, paths)| paths.len() >= 2)
            .map(|(digest, paths)| DuplicateGroup {
                digest: digest.clone(),
                paths,
            })
            .collect();

        groups.sort_by(|a, b| b.count().cmp(&a.count()).then_with(|| a.paths.cmp(&b.paths)));
        groups
    }

    /// Check whether two reports hold the same set of outcomes.
    pub fn same_outcomes(&self, other: &HashReport) -> bool {
        self.results == other.results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashpool_core::FailureKind;

    fn digest(byte: u8) -> ContentDigest {
        ContentDigest::new(DigestAlgorithm::Sha256, vec![byte; 32])
    }

    fn report(results: Vec<(&str, HashOutcome)>) -> HashReport {
        HashReport {
            root: PathBuf::from("/root"),
            algorithm: DigestAlgorithm::Sha256,
            worker_count: 2,
            results: results
                .into_iter()
                .map(|(p, o)| (PathBuf::from(p), o))
                .collect(),
            bytes_hashed: 0,
            warnings: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    #[test]
    fn test_counts() {
        let report = report(vec![
            ("/root/a", HashOutcome::Hashed(digest(1))),
            ("/root/b", HashOutcome::Hashed(digest(2))),
            (
                "/root/c",
                HashOutcome::Failed(HashFailure {
                    kind: FailureKind::Open,
                    message: "denied".to_string(),
                }),
            ),
        ]);

        assert_eq!(report.total(), 3);
        assert_eq!(report.hashed_count(), 2);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.failures().count(), 1);
        assert_eq!(report.digest_of(Path::new("/root/a")), Some(&digest(1)));
        assert!(report.digest_of(Path::new("/root/c")).is_none());
    }

    #[test]
    fn test_duplicate_groups() {
        let report = report(vec![
            ("/root/a", HashOutcome::Hashed(digest(1))),
            ("/root/b", HashOutcome::Hashed(digest(2))),
            ("/root/c", HashOutcome::Hashed(digest(1))),
            ("/root/d", HashOutcome::Hashed(digest(1))),
            ("/root/e", HashOutcome::Hashed(digest(2))),
            ("/root/f", HashOutcome::Hashed(digest(3))),
        ]);

        let groups = report.duplicate_groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].count(), 3);
        assert_eq!(groups[0].deletable_count(), 2);
        assert_eq!(groups[0].digest, digest(1));
        assert_eq!(
            groups[1].paths,
            vec![PathBuf::from("/root/b"), PathBuf::from("/root/e")]
        );
    }

    #[test]
    fn test_empty_report() {
        let report = report(Vec::new());
        assert_eq!(report.total(), 0);
        assert!(report.duplicate_groups().is_empty());
        assert!(!report.has_warnings());
        assert_eq!(report.files_per_second(), 0.0);
        assert_eq!(report.bytes_per_second(), 0.0);
    }

    #[test]
    fn test_rates() {
        let mut report = report(vec![
            ("/root/a", HashOutcome::Hashed(digest(1))),
            ("/root/b", HashOutcome::Hashed(digest(2))),
        ]);
        report.bytes_hashed = 4096;
        report.duration = Duration::from_secs(2);

        assert_eq!(report.files_per_second(), 1.0);
        assert_eq!(report.bytes_per_second(), 2048.0);
    }
}
