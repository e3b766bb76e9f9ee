//! Hashing progress reporting.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::broadcast;

/// Capacity of the progress broadcast channel.
pub const PROGRESS_CHANNEL_SIZE: usize = 100;

/// Progress information during a hashing run.
#[derive(Debug, Clone)]
pub struct HashProgress {
    /// Number of files hashed so far.
    pub files_hashed: u64,
    /// Number of files skipped because of errors.
    pub files_failed: u64,
    /// Total bytes hashed so far.
    pub bytes_hashed: u64,
    /// File that was just processed.
    pub current_file: PathBuf,
    /// Time elapsed since the run started.
    pub elapsed: Duration,
}

impl HashProgress {
    /// Create initial progress state.
    pub fn new() -> Self {
        Self {
            files_hashed: 0,
            files_failed: 0,
            bytes_hashed: 0,
            current_file: PathBuf::new(),
            elapsed: Duration::ZERO,
        }
    }

    /// Get total files processed (hashed + failed).
    pub fn files_processed(&self) -> u64 {
        self.files_hashed + self.files_failed
    }
}

impl Default for HashProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// Progress counters shared by all workers of one run.
#[derive(Debug)]
pub(crate) struct ProgressTracker {
    start_time: Instant,
    files_hashed: AtomicU64,
    files_failed: AtomicU64,
    bytes_hashed: AtomicU64,
    tx: broadcast::Sender<HashProgress>,
}

impl ProgressTracker {
    pub fn new(tx: broadcast::Sender<HashProgress>) -> Self {
        Self {
            start_time: Instant::now(),
            files_hashed: AtomicU64::new(0),
            files_failed: AtomicU64::new(0),
            bytes_hashed: AtomicU64::new(0),
            tx,
        }
    }

    pub fn record_hashed(&self, path: PathBuf, bytes: u64) {
        self.files_hashed.fetch_add(1, Ordering::Relaxed);
        self.bytes_hashed.fetch_add(bytes, Ordering::Relaxed);
        self.publish(path);
    }

    pub fn record_failed(&self, path: PathBuf) {
        self.files_failed.fetch_add(1, Ordering::Relaxed);
        self.publish(path);
    }

    pub fn snapshot(&self, current_file: PathBuf) -> HashProgress {
        HashProgress {
            files_hashed: self.files_hashed.load(Ordering::Relaxed),
            files_failed: self.files_failed.load(Ordering::Relaxed),
            bytes_hashed: self.bytes_hashed.load(Ordering::Relaxed),
            current_file,
            elapsed: self.start_time.elapsed(),
        }
    }

    fn publish(&self, path: PathBuf) {
        // No subscribers is fine
        if self.tx.receiver_count() > 0 {
            let _ = self.tx.send(self.snapshot(path));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_progress() {
        let progress = HashProgress::new();
        assert_eq!(progress.files_processed(), 0);
        assert_eq!(progress.bytes_hashed, 0);
    }

    #[test]
    fn test_tracker_publishes_snapshots() {
        let (tx, mut rx) = broadcast::channel(PROGRESS_CHANNEL_SIZE);
        let tracker = ProgressTracker::new(tx);

        tracker.record_hashed(PathBuf::from("/a"), 10);
        tracker.record_failed(PathBuf::from("/b"));

        let first = rx.try_recv().unwrap();
        assert_eq!(first.files_hashed, 1);
        assert_eq!(first.bytes_hashed, 10);

        let second = rx.try_recv().unwrap();
        assert_eq!(second.files_failed, 1);
        assert_eq!(second.files_processed(), 2);
        assert_eq!(second.current_file, PathBuf::from("/b"));
    }
}
