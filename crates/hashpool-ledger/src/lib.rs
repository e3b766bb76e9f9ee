//! Shared guestbook ledger for hashpool.
//!
//! A [`SharedLedger`] is a mutex-guarded record that many concurrent
//! writers append to. [`sign_concurrently`] spawns a batch of tokio tasks
//! that each sign once after a random delay, waits for all of them, and
//! returns a consistent [`LedgerSnapshot`].

mod ledger;
mod signing;

pub use ledger::{LedgerSnapshot, SharedLedger};
pub use signing::{SigningOptions, sign_concurrently, signature};
