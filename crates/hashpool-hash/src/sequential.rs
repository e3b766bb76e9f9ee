//! Single-threaded baseline: walk first, then hash each file in turn.

use std::collections::BTreeMap;
use std::time::Instant;

use tracing::{info, warn};

use hashpool_core::{HashFailure, HashOutcome, PipelineConfig};
use hashpool_scan::Walker;

use crate::error::PipelineError;
use crate::hasher::hash_file_counted;
use crate::report::HashReport;

/// Hash every file under the root in the calling thread.
///
/// Produces the same kind of report as a pooled run, for timing
/// comparisons.
pub fn hash_sequential(config: &PipelineConfig) -> Result<HashReport, PipelineError> {
    let started = Instant::now();
    config.validate()?;
    let walker = Walker::new(config)?;
    let (files, warnings) = walker.collect_files();

    let mut results = BTreeMap::new();
    let mut bytes_hashed = 0;
    for path in files {
        let outcome = match hash_file_counted(&path, config.digest_algorithm) {
            Ok((digest, bytes)) => {
                bytes_hashed += bytes;
                HashOutcome::Hashed(digest)
            }
            Err(err) => {
                warn!("Failed to hash file: {err}");
                HashOutcome::Failed(HashFailure::from(&err))
            }
        };
        results.insert(path, outcome);
    }

    let report = HashReport {
        root: walker.root().to_path_buf(),
        algorithm: config.digest_algorithm,
        worker_count: 1,
        results,
        bytes_hashed,
        warnings,
        duration: started.elapsed(),
    };

    info!(
        root = %report.root.display(),
        hashed = report.hashed_count(),
        failed = report.failed_count(),
        elapsed_ms = report.duration.as_millis() as u64,
        "sequential run complete"
    );

    Ok(report)
}
