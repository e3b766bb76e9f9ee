//! Mutex-guarded shared ledger.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Fields guarded by the ledger's lock. Never handed out directly.
#[derive(Debug, Default)]
struct LedgerState {
    entries: Vec<String>,
    last_update: Option<DateTime<Utc>>,
    update_count: u64,
}

/// Shared ledger updated by many concurrent writers.
///
/// The state is only reachable through [`update`](Self::update) and
/// [`snapshot`](Self::snapshot), each of which holds the lock for its whole
/// critical section. No method holds the lock across an `.await`.
#[derive(Debug, Default)]
pub struct SharedLedger {
    state: Mutex<LedgerState>,
}

/// Consistent copy of a ledger's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Entries in the order they were appended.
    pub entries: Vec<String>,
    /// Time of the most recent update.
    pub last_update: Option<DateTime<Utc>>,
    /// Number of updates applied.
    pub update_count: u64,
}

impl SharedLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, stamp the update time and bump the counter as one
    /// atomic step.
    pub fn update(&self, entry: impl Into<String>) {
        let entry = entry.into();
        let mut state = self.state.lock();
        state.entries.push(entry);
        state.last_update = Some(Utc::now());
        state.update_count += 1;
    }

    /// Copy all fields under a single lock acquisition.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let state = self.state.lock();
        LedgerSnapshot {
            entries: state.entries.clone(),
            last_update: state.last_update,
            update_count: state.update_count,
        }
    }
}

impl LedgerSnapshot {
    /// Render the ledger as text, one entry per line, each preceded by a
    /// newline.
    pub fn render(&self) -> String {
        self.entries.iter().map(|e| format!("\n{e}")).collect()
    }

    /// Check that the counter matches the number of entries.
    pub fn is_consistent(&self) -> bool {
        self.entries.len() as u64 == self.update_count
            && (self.update_count == 0) == self.last_update.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_empty_ledger() {
        let ledger = SharedLedger::new();
        let snapshot = ledger.snapshot();
        assert_eq!(snapshot.update_count, 0);
        assert!(snapshot.entries.is_empty());
        assert!(snapshot.last_update.is_none());
        assert!(snapshot.is_consistent());
        assert_eq!(snapshot.render(), "");
    }

    #[test]
    fn test_update_sets_all_fields() {
        let ledger = SharedLedger::new();
        let before = Utc::now();
        ledger.update("first");
        ledger.update(String::from("second"));

        let snapshot = ledger.snapshot();
        assert_eq!(snapshot.update_count, 2);
        assert_eq!(snapshot.entries, vec!["first", "second"]);
        assert!(snapshot.last_update.unwrap() >= before);
        assert_eq!(snapshot.render(), "\nfirst\nsecond");
    }

    #[test]
    fn test_concurrent_threads() {
        let ledger = Arc::new(SharedLedger::new());
        let writers = 32;

        let handles: Vec<_> = (0..writers)
            .map(|i| {
                let ledger = Arc::clone(&ledger);
                thread::spawn(move || ledger.update(format!("writer {i}")))
            })
            .collect();

        // Snapshots taken mid-flight must still be consistent
        for _ in 0..100 {
            assert!(ledger.snapshot().is_consistent());
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = ledger.snapshot();
        assert_eq!(snapshot.update_count, writers);
        let unique: HashSet<&String> = snapshot.entries.iter().collect();
        assert_eq!(unique.len(), writers as usize);
    }
}
