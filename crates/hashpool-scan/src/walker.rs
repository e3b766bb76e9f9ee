//! JWalk-based directory walker that feeds the work queue.

use std::path::{Path, PathBuf};

use crossbeam::channel::Sender;
use jwalk::{Parallelism, WalkDir};
use tracing::{debug, warn};

use hashpool_core::{EntryError, PipelineConfig, WalkError, WalkWarning};

/// Summary of a finished walk.
#[derive(Debug, Clone, Default)]
pub struct WalkSummary {
    /// Number of regular files discovered and enqueued.
    pub files_discovered: u64,
    /// Non-fatal entry errors encountered while walking.
    pub warnings: Vec<WalkWarning>,
    /// The walk stopped early because nobody was receiving work.
    pub aborted: bool,
}

/// Serial, deterministic walker over the regular files under a root.
#[derive(Debug, Clone)]
pub struct Walker {
    root: PathBuf,
    follow_symlinks: bool,
    include_hidden: bool,
    max_depth: Option<usize>,
}

impl Walker {
    /// Create a walker for the config's root.
    ///
    /// Fails if the root is missing, not a directory, or cannot be listed.
    pub fn new(config: &PipelineConfig) -> Result<Self, WalkError> {
        let root = Self::validate_root(&config.root)?;
        Ok(Self {
            root,
            follow_symlinks: config.follow_symlinks,
            include_hidden: config.include_hidden,
            max_depth: config.max_depth,
        })
    }

    /// Canonicalize the root and check that it is a traversable directory.
    pub fn validate_root(root: &Path) -> Result<PathBuf, WalkError> {
        let root_path = root.canonicalize().map_err(|e| WalkError::io(root, e))?;

        if !root_path.is_dir() {
            return Err(WalkError::NotADirectory { path: root_path });
        }

        // Listing the root up front turns an unreadable root into a fatal error
        std::fs::read_dir(&root_path).map_err(|e| WalkError::io(&root_path, e))?;

        Ok(root_path)
    }

    /// Canonical root this walker traverses.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lazily enumerate regular files, depth-first and sorted by name.
    ///
    /// Directories are skipped. Unreadable entries are yielded as
    /// `EntryError` and do not end the walk.
    pub fn entries(&self) -> impl Iterator<Item = Result<PathBuf, EntryError>> + use<> {
        let walker = WalkDir::new(&self.root)
            .parallelism(Parallelism::Serial)
            .sort(true)
            .skip_hidden(!self.include_hidden)
            .follow_links(self.follow_symlinks)
            .min_depth(0)
            .max_depth(self.max_depth.unwrap_or(usize::MAX));

        walker.into_iter().filter_map(|entry_result| match entry_result {
            Ok(entry) => {
                // A directory that could not be listed still arrives as Ok
                if let Some(err) = &entry.read_children_error {
                    Some(Err(entry_error(entry.path(), err)))
                } else if entry.file_type().is_file() {
                    Some(Ok(entry.path()))
                } else {
                    None
                }
            }
            Err(err) => {
                let path = err.path().map(|p| p.to_path_buf()).unwrap_or_default();
                Some(Err(entry_error(path, &err)))
            }
        })
    }

    /// Send every discovered file into the work queue.
    ///
    /// Consumes `work_tx`; the queue closes once this returns and no other
    /// sender is alive.
    pub fn feed(self, work_tx: Sender<PathBuf>) -> WalkSummary {
        let mut summary = WalkSummary::default();

        for entry in self.entries() {
            match entry {
                Ok(path) => {
                    if work_tx.send(path).is_err() {
                        warn!(root = %self.root.display(), "work queue closed, stopping walk");
                        summary.aborted = true;
                        break;
                    }
                    summary.files_discovered += 1;
                }
                Err(err) => {
                    warn!(path = %err.path.display(), "{}", err.message);
                    summary.warnings.push(err.into());
                }
            }
        }

        drop(work_tx);
        debug!(
            files = summary.files_discovered,
            warnings = summary.warnings.len(),
            "walk finished"
        );
        summary
    }

    /// Collect all files eagerly, discarding entry errors into warnings.
    pub fn collect_files(&self) -> (Vec<PathBuf>, Vec<WalkWarning>) {
        let mut files = Vec::new();
        let mut warnings = Vec::new();
        for entry in self.entries() {
            match entry {
                Ok(path) => files.push(path),
                Err(err) => {
                    warn!(path = %err.path.display(), "{}", err.message);
                    warnings.push(err.into());
                }
            }
        }
        (files, warnings)
    }
}

fn entry_error(path: PathBuf, err: &jwalk::Error) -> EntryError {
    EntryError::with_io_kind(path, err.to_string(), err.io_error().map(|e| e.kind()))
}
