//! Dispatcher: wires the walker, the worker pool and the collector together.
//!
//! ```text
//! walker ──► work queue ──► N workers ──► result queue ──► collector
//!                              │
//!                              └──► completion barrier ──► closes result queue
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam::channel::{self, Receiver};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use hashpool_core::{DigestResult, HashOutcome, PipelineConfig};
use hashpool_scan::{WalkSummary, Walker};

use crate::barrier::CompletionBarrier;
use crate::error::PipelineError;
use crate::pool::WorkerPool;
use crate::progress::{HashProgress, PROGRESS_CHANNEL_SIZE, ProgressTracker};
use crate::report::HashReport;

/// Owns the queue lifetimes of a hashing run.
pub struct Dispatcher {
    config: PipelineConfig,
    progress_tx: broadcast::Sender<HashProgress>,
}

impl Dispatcher {
    /// Create a dispatcher for a config.
    pub fn new(config: PipelineConfig) -> Self {
        let (progress_tx, _) = broadcast::channel(PROGRESS_CHANNEL_SIZE);
        Self {
            config,
            progress_tx,
        }
    }

    /// Config this dispatcher runs with.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Subscribe to progress updates for subsequent runs.
    pub fn subscribe(&self) -> broadcast::Receiver<HashProgress> {
        self.progress_tx.subscribe()
    }

    /// Start a run and return the stream of results.
    ///
    /// Root and configuration errors are returned here, before any worker
    /// thread exists.
    pub fn start(&self) -> Result<ResultStream, PipelineError> {
        let started = Instant::now();
        self.config.validate()?;
        let pool = WorkerPool::new(self.config.worker_count)?;
        let walker = Walker::new(&self.config)?;
        let root = walker.root().to_path_buf();

        let (work_tx, work_rx) = channel::bounded(self.config.queue_capacity);
        let (result_tx, result_rx) = channel::bounded(self.config.queue_capacity);
        let barrier = CompletionBarrier::new();
        let progress = Arc::new(ProgressTracker::new(self.progress_tx.clone()));

        let workers = pool
            .spawn(
                work_rx,
                result_tx.clone(),
                self.config.digest_algorithm,
                &barrier,
                progress,
            )
            .map_err(|source| PipelineError::Spawn {
                name: "worker",
                source,
            })?;

        let walker_handle = thread::Builder::new()
            .name("hashpool-walker".to_string())
            .spawn(move || walker.feed(work_tx))
            .map_err(|source| PipelineError::Spawn {
                name: "walker",
                source,
            })?;

        // The watcher holds the last result sender; the result queue closes
        // only after every worker has released the barrier.
        let watcher_handle = thread::Builder::new()
            .name("hashpool-barrier".to_string())
            .spawn(move || {
                debug!(outstanding = barrier.outstanding(), "waiting for workers");
                barrier.wait();
                for worker in workers {
                    if worker.join().is_err() {
                        error!("hashing worker panicked");
                    }
                }
                drop(result_tx);
            })
            .map_err(|source| PipelineError::Spawn {
                name: "barrier watcher",
                source,
            })?;

        Ok(ResultStream {
            results: result_rx,
            walker: Some(walker_handle),
            watcher: Some(watcher_handle),
            root,
            started,
        })
    }

    /// Run to completion and collect every outcome.
    pub fn run(&self) -> Result<HashReport, PipelineError> {
        self.run_with(|_| {})
    }

    /// Run to completion, handing each result to `sink` as it arrives.
    pub fn run_with<F>(&self, mut sink: F) -> Result<HashReport, PipelineError>
    where
        F: FnMut(&DigestResult),
    {
        let mut stream = self.start()?;
        let mut results = BTreeMap::new();
        let mut bytes_hashed = 0;

        for result in stream.by_ref() {
            sink(&result);
            bytes_hashed += collect(&mut results, result);
        }

        let root = stream.root.clone();
        let started = stream.started;
        let (walk, leftover) = stream.finish()?;
        for result in leftover {
            sink(&result);
            bytes_hashed += collect(&mut results, result);
        }

        let report = HashReport {
            root,
            algorithm: self.config.digest_algorithm,
            worker_count: self.config.worker_count,
            results,
            bytes_hashed,
            warnings: walk.warnings,
            duration: started.elapsed(),
        };

        info!(
            root = %report.root.display(),
            hashed = report.hashed_count(),
            failed = report.failed_count(),
            warnings = report.warnings.len(),
            elapsed_ms = report.duration.as_millis() as u64,
            "hashing run complete"
        );

        Ok(report)
    }
}

/// Record a result and return the bytes it adds to the run total.
fn collect(results: &mut BTreeMap<PathBuf, HashOutcome>, result: DigestResult) -> u64 {
    if results.insert(result.path.clone(), result.outcome).is_some() {
        warn!(path = %result.path.display(), "duplicate result for path");
        return 0;
    }
    result.bytes
}

/// Streaming view of the result queue.
///
/// Iterating yields results as workers publish them and ends once the
/// result queue is closed. Dropping the stream early makes the workers and
/// the walker stop at their next send.
pub struct ResultStream {
    results: Receiver<DigestResult>,
    walker: Option<JoinHandle<WalkSummary>>,
    watcher: Option<JoinHandle<()>>,
    root: PathBuf,
    started: Instant,
}

impl ResultStream {
    /// Canonical root being walked.
    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// Drain the queue and wait for the walker and the barrier watcher.
    ///
    /// Returns the walk summary and any results not yet taken from the
    /// stream.
    pub fn finish(mut self) -> Result<(WalkSummary, Vec<DigestResult>), PipelineError> {
        let leftover: Vec<DigestResult> = self.results.iter().collect();

        let summary = match self.walker.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| PipelineError::Panicked { name: "walker" })?,
            None => WalkSummary::default(),
        };

        if let Some(handle) = self.watcher.take() {
            handle
                .join()
                .map_err(|_| PipelineError::Panicked {
                    name: "barrier watcher",
                })?;
        }

        Ok((summary, leftover))
    }
}

impl Iterator for ResultStream {
    type Item = DigestResult;

    fn next(&mut self) -> Option<Self::Item> {
        self.results.recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    use hashpool_core::WalkError;

    fn create_test_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::write(root.join("a.txt"), "x").unwrap();
        fs::write(root.join("b.txt"), "y").unwrap();
        fs::create_dir(root.join("sub")).unwrap();
        fs::write(root.join("sub/c.txt"), "x").unwrap();

        temp
    }

    #[test]
    fn test_stream_yields_every_file() {
        let temp = create_test_tree();
        let dispatcher = Dispatcher::new(PipelineConfig::new(temp.path()));

        let mut stream = dispatcher.start().unwrap();
        let streamed: Vec<DigestResult> = stream.by_ref().collect();
        let (summary, leftover) = stream.finish().unwrap();

        assert_eq!(streamed.len(), 3);
        assert!(leftover.is_empty());
        assert_eq!(summary.files_discovered, 3);
        assert!(streamed.iter().all(DigestResult::is_hashed));
    }

    #[test]
    fn test_finish_returns_unread_results() {
        let temp = create_test_tree();
        let dispatcher = Dispatcher::new(PipelineConfig::new(temp.path()));

        let stream = dispatcher.start().unwrap();
        let (summary, leftover) = stream.finish().unwrap();

        assert_eq!(summary.files_discovered, 3);
        assert_eq!(leftover.len(), 3);
    }

    #[test]
    fn test_missing_root_fails_before_start() {
        let temp = TempDir::new().unwrap();
        let dispatcher = Dispatcher::new(PipelineConfig::new(temp.path().join("absent")));

        let err = dispatcher.start().err().unwrap();
        assert!(matches!(err, PipelineError::Walk(WalkError::NotFound { .. })));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let temp = create_test_tree();
        let mut config = PipelineConfig::new(temp.path());
        config.worker_count = 0;

        let err = Dispatcher::new(config).run().unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn test_run_with_sink_sees_each_result() {
        let temp = create_test_tree();
        let dispatcher = Dispatcher::new(PipelineConfig::new(temp.path()));

        let mut seen = Vec::new();
        let report = dispatcher.run_with(|r| seen.push(r.path.clone())).unwrap();

        assert_eq!(seen.len(), 3);
        assert_eq!(report.total(), 3);
    }

    #[test]
    fn test_progress_subscription() {
        let temp = create_test_tree();
        let dispatcher = Dispatcher::new(PipelineConfig::new(temp.path()));
        let mut progress_rx = dispatcher.subscribe();

        dispatcher.run().unwrap();

        // Snapshots from different workers can arrive out of order
        let mut updates = Vec::new();
        while let Ok(progress) = progress_rx.try_recv() {
            updates.push(progress);
        }
        assert_eq!(updates.len(), 3);
        assert_eq!(updates.iter().map(|p| p.files_processed()).max(), Some(3));
        assert_eq!(updates.iter().map(|p| p.bytes_hashed).max(), Some(3));
    }
}
