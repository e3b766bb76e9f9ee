//! Concurrent guestbook signing.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::task::JoinSet;
use tracing::{debug, error};

use crate::ledger::{LedgerSnapshot, SharedLedger};

/// Options for a signing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SigningOptions {
    /// Number of concurrent signers.
    pub signers: usize,
    /// Upper bound (exclusive) of each signer's random delay.
    pub max_delay: Duration,
}

impl Default for SigningOptions {
    fn default() -> Self {
        Self {
            signers: 100,
            max_delay: Duration::from_millis(1000),
        }
    }
}

impl SigningOptions {
    /// Set the number of signers.
    pub fn with_signers(mut self, signers: usize) -> Self {
        self.signers = signers;
        self
    }

    /// Set the maximum random delay.
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }
}

/// Signature written by signer `id`.
pub fn signature(id: usize) -> String {
    format!("Hello from worker #{id}")
}

/// Have `options.signers` tasks each sleep a random delay and sign the
/// ledger once, then read it out after all of them have finished.
pub async fn sign_concurrently(ledger: Arc<SharedLedger>, options: SigningOptions) -> LedgerSnapshot {
    let mut tasks = JoinSet::new();
    let max_delay_ms = options.max_delay.as_millis() as u64;

    for id in 0..options.signers {
        let ledger = Arc::clone(&ledger);
        let delay = if max_delay_ms == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(rand::thread_rng().gen_range(0..max_delay_ms))
        };

        tasks.spawn(async move {
            tokio::time::sleep(delay).await;
            ledger.update(signature(id));
            debug!(signer = id, delay_ms = delay.as_millis() as u64, "signed");
        });
    }

    // Completion barrier: every signer has finished before the read-out
    while let Some(joined) = tasks.join_next().await {
        if let Err(err) = joined {
            error!("signer task failed: {err}");
        }
    }

    ledger.snapshot()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_zero_signers() {
        let ledger = Arc::new(SharedLedger::new());
        let snapshot = sign_concurrently(ledger, SigningOptions::default().with_signers(0)).await;
        assert_eq!(snapshot.update_count, 0);
        assert!(snapshot.is_consistent());
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_signers_recorded() {
        let ledger = Arc::new(SharedLedger::new());
        let options = SigningOptions::default().with_signers(100);

        let snapshot = sign_concurrently(Arc::clone(&ledger), options).await;

        assert_eq!(snapshot.update_count, 100);
        assert_eq!(snapshot.entries.len(), 100);
        for id in 0..100 {
            assert!(snapshot.entries.contains(&signature(id)));
        }
        assert_eq!(ledger.snapshot(), snapshot);
    }
}
