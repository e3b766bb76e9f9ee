//! Completion barrier for the worker pool.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam::sync::WaitGroup;

/// Counts outstanding workers and blocks until all of them have exited.
///
/// Each worker holds a [`BarrierToken`]. Dropping the token (including while
/// unwinding) signals that the worker is done.
#[derive(Debug)]
pub struct CompletionBarrier {
    group: WaitGroup,
    outstanding: Arc<AtomicUsize>,
}

/// A single worker's registration with a [`CompletionBarrier`].
#[derive(Debug)]
pub struct BarrierToken {
    _group: WaitGroup,
    outstanding: Arc<AtomicUsize>,
}

impl CompletionBarrier {
    /// Create a barrier with no registered workers.
    pub fn new() -> Self {
        Self {
            group: WaitGroup::new(),
            outstanding: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Register one more worker.
    pub fn register(&self) -> BarrierToken {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        BarrierToken {
            _group: self.group.clone(),
            outstanding: Arc::clone(&self.outstanding),
        }
    }

    /// Number of workers that have not yet released their token.
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    /// Block until every registered token has been dropped.
    pub fn wait(self) {
        self.group.wait();
    }
}

impl Default for CompletionBarrier {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for BarrierToken {
    fn drop(&mut self) {
        self.outstanding.fetch_sub(1, Ordering::SeqCst);
    }
}
