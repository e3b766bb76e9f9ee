//! Concurrent file hashing for hashpool.
//!
//! This crate hashes every regular file under a directory with a fixed-size
//! pool of worker threads:
//!
//! - **Hash function** - streaming SHA-256, SHA-512 or BLAKE3 over a fixed buffer
//! - **Worker pool** - N workers pulling paths from a bounded work queue
//! - **Dispatcher** - owns both queues and the completion barrier that
//!   closes the result queue once every worker has exited
//! - **Collector** - the caller drains results as a stream, or gets a
//!   [`HashReport`] keyed by path
//!
//! Files that cannot be opened or read are not dropped: they come back as
//! [`HashOutcome::Failed`] entries.
//!
//! # Example
//!
//! ```rust,no_run
//! use hashpool_hash::{DigestAlgorithm, Dispatcher, PipelineConfig};
//!
//! let config = PipelineConfig::builder()
//!     .root("/path/to/hash")
//!     .worker_count(8usize)
//!     .digest_algorithm(DigestAlgorithm::Sha256)
//!     .build()
//!     .unwrap();
//!
//! let report = Dispatcher::new(config)
//!     .run_with(|result| println!("{}", result.path.display()))
//!     .unwrap();
//!
//! println!("{} hashed, {} failed", report.hashed_count(), report.failed_count());
//! ```

mod barrier;
mod dispatcher;
mod error;
mod hasher;
mod pool;
mod progress;
mod report;
mod sequential;

pub use barrier::{BarrierToken, CompletionBarrier};
pub use dispatcher::{Dispatcher, ResultStream};
pub use error::PipelineError;
pub use hasher::{
    READ_BUFFER_SIZE, hash_bytes, hash_file, hash_file_counted, hash_reader, hash_reader_counted,
};
pub use pool::WorkerPool;
pub use progress::{HashProgress, PROGRESS_CHANNEL_SIZE};
pub use report::{DuplicateGroup, HashReport};
pub use sequential::hash_sequential;

// Re-export core types
pub use hashpool_core::{
    ContentDigest, DigestAlgorithm, DigestResult, FailureKind, HashError, HashFailure,
    HashOutcome, PipelineConfig, WalkError, WalkWarning, WarningKind,
};
pub use hashpool_scan::WalkSummary;
