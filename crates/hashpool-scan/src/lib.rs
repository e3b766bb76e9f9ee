//! Directory walker for hashpool.
//!
//! This crate enumerates the regular files under a root directory and
//! feeds them into the bounded work queue consumed by the hashing pool.
//!
//! # Overview
//!
//! - **Root validation** up front: a missing or unreadable root is a fatal
//!   [`WalkError`], reported before any worker starts
//! - **Deterministic, serial traversal** via jwalk, sorted by file name
//! - **Per-entry errors** are logged and recorded, never fatal
//!
//! # Example
//!
//! ```rust,no_run
//! use crossbeam::channel::bounded;
//! use hashpool_scan::{PipelineConfig, Walker};
//!
//! let walker = Walker::new(&PipelineConfig::new("/path/to/hash")).unwrap();
//! let (work_tx, work_rx) = bounded(10);
//!
//! let handle = std::thread::spawn(move || walker.feed(work_tx));
//! for path in work_rx {
//!     println!("{}", path.display());
//! }
//! let summary = handle.join().unwrap();
//! println!("{} files", summary.files_discovered);
//! ```

mod walker;

pub use walker::{WalkSummary, Walker};

// Re-export core types for convenience
pub use hashpool_core::{EntryError, PipelineConfig, WalkError, WalkWarning, WarningKind};
