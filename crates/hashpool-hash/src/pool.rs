//! Fixed-size pool of hashing workers.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{Receiver, Sender};
use tracing::{debug, warn};

use hashpool_core::{ConfigError, DigestAlgorithm, DigestResult, HashFailure};

use crate::barrier::{BarrierToken, CompletionBarrier};
use crate::hasher::hash_file_counted;
use crate::progress::ProgressTracker;

/// A fixed number of worker threads hashing paths from a shared work queue.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    worker_count: usize,
}

impl WorkerPool {
    /// Create a pool of `worker_count` workers (must be at least 1).
    pub fn new(worker_count: usize) -> Result<Self, ConfigError> {
        if worker_count == 0 {
            return Err(ConfigError::invalid("Worker count must be at least 1"));
        }
        Ok(Self { worker_count })
    }

    /// Number of workers this pool spawns.
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Spawn the workers.
    ///
    /// Every worker registers with `barrier` before it starts and releases
    /// its registration when it exits. Workers exit once `work_rx` is closed
    /// and drained, or when nobody is receiving results anymore.
    pub(crate) fn spawn(
        &self,
        work_rx: Receiver<PathBuf>,
        result_tx: Sender<DigestResult>,
        algorithm: DigestAlgorithm,
        barrier: &CompletionBarrier,
        progress: Arc<ProgressTracker>,
    ) -> std::io::Result<Vec<JoinHandle<()>>> {
        let mut handles = Vec::with_capacity(self.worker_count);

        for id in 0..self.worker_count {
            let worker = Worker {
                id,
                work_rx: work_rx.clone(),
                result_tx: result_tx.clone(),
                algorithm,
                progress: Arc::clone(&progress),
                _token: barrier.register(),
            };

            let handle = thread::Builder::new()
                .name(format!("hashpool-worker-{id}"))
                .spawn(move || worker.run())?;
            handles.push(handle);
        }

        Ok(handles)
    }
}

/// State owned by a single worker thread.
struct Worker {
    id: usize,
    work_rx: Receiver<PathBuf>,
    result_tx: Sender<DigestResult>,
    algorithm: DigestAlgorithm,
    progress: Arc<ProgressTracker>,
    // Released when the worker is dropped, on every exit path
    _token: BarrierToken,
}

impl Worker {
    fn run(self) {
        debug!(worker = self.id, "worker started");
        let mut processed = 0u64;

        for path in self.work_rx.iter() {
            let result = match hash_file_counted(&path, self.algorithm) {
                Ok((digest, bytes)) => {
                    self.progress.record_hashed(path.clone(), bytes);
                    DigestResult::hashed(path, digest, bytes)
                }
                Err(err) => {
                    warn!(worker = self.id, "Failed to hash file: {err}");
                    self.progress.record_failed(path.clone());
                    DigestResult::failed(path, HashFailure::from(&err))
                }
            };

            processed += 1;
            if self.result_tx.send(result).is_err() {
                warn!(worker = self.id, "result queue closed, stopping worker");
                break;
            }
        }

        debug!(worker = self.id, processed, "worker finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam::channel::bounded;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::TempDir;
    use tokio::sync::broadcast;

    use crate::progress::PROGRESS_CHANNEL_SIZE;

    fn tracker() -> Arc<ProgressTracker> {
        let (tx, _) = broadcast::channel(PROGRESS_CHANNEL_SIZE);
        Arc::new(ProgressTracker::new(tx))
    }

    #[test]
    fn test_zero_workers_rejected() {
        assert!(WorkerPool::new(0).is_err());
        assert_eq!(WorkerPool::new(3).unwrap().worker_count(), 3);
    }

    #[test]
    fn test_each_path_hashed_exactly_once() {
        let temp = TempDir::new().unwrap();
        let mut paths = Vec::new();
        for i in 0..20 {
            let path = temp.path().join(format!("file{i}.txt"));
            fs::write(&path, format!("content {i}")).unwrap();
            paths.push(path);
        }
        // One path that cannot be opened
        paths.push(temp.path().join("missing.txt"));

        let (work_tx, work_rx) = bounded(4);
        let (result_tx, result_rx) = bounded(4);
        let barrier = CompletionBarrier::new();

        let pool = WorkerPool::new(4).unwrap();
        let handles = pool
            .spawn(work_rx, result_tx, DigestAlgorithm::Sha256, &barrier, tracker())
            .unwrap();
        assert_eq!(barrier.outstanding(), 4);

        let producer = {
            let paths = paths.clone();
            thread::spawn(move || {
                for path in paths {
                    work_tx.send(path).unwrap();
                }
            })
        };

        let results: Vec<DigestResult> = result_rx.iter().collect();
        producer.join().unwrap();
        for handle in handles {
            handle.join().unwrap();
        }
        barrier.wait();

        assert_eq!(results.len(), paths.len());
        let seen: HashSet<PathBuf> = results.iter().map(|r| r.path.clone()).collect();
        assert_eq!(seen.len(), paths.len());

        let failed: Vec<&DigestResult> = results.iter().filter(|r| !r.is_hashed()).collect();
        assert_eq!(failed.len(), 1);
        assert!(failed[0].path.ends_with("missing.txt"));
        assert_eq!(failed[0].bytes, 0);

        let expected: u64 = (0..20).map(|i| format!("content {i}").len() as u64).sum();
        assert_eq!(results.iter().map(|r| r.bytes).sum::<u64>(), expected);
    }
}
