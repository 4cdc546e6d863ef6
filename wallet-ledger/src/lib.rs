//! Wallet Ledger
//!
//! Append-only transaction log for wallets, with balance and history queries
//! and optional whole-document JSON persistence.
//!
//! # Architecture
//!
//! - **Arena + index**: one ordered log, per-wallet and per-aggregate buckets of log positions
//! - **Single Writer**: one actor task owns the ledger; handles are cheap clones
//! - **Stage, persist, commit**: a failed store write never reaches the in-memory log
//!
//! # Invariants
//!
//! - Append-only: entries are never modified or deleted
//! - Buckets partition the log by wallet and by aggregate
//! - Balance is a fold over the wallet bucket, never stored
//! - Unknown wallets and aggregates are errors, not empty results

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod types;
pub mod book;
pub mod storage;
pub mod ledger;
pub mod funds;
pub mod error;
pub mod actor;
pub mod config;
pub mod metrics;

// Re-exports
pub use actor::{spawn_ledger_actor, LedgerHandle};
pub use book::{Book, Bucket};
pub use config::Config;
pub use error::{Error, ErrorClass, Result};
pub use ledger::Ledger;
pub use metrics::Metrics;
pub use storage::{FileSink, JsonStore, Persist, Sink};
pub use types::{AggregateId, Direction, Transaction, TransactionKind, WalletId};
