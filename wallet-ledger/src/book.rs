//! In-memory transaction book
//!
//! The log is an append-only `Vec`; the wallet and aggregate indexes store
//! positions into it, so buckets never alias or copy records.
//!
//! # Invariants
//!
//! - Every position in every bucket points at an entry whose key matches
//! - Each entry appears in exactly one wallet bucket and one aggregate bucket
//! - Buckets exist only for keys that have at least one entry

use crate::{
    types::{AggregateId, Direction, Transaction, WalletId},
    Error, Result,
};
use std::collections::HashMap;

/// Append-only log with derived wallet and aggregate indexes
#[derive(Debug, Clone, Default)]
pub struct Book {
    log: Vec<Transaction>,
    by_wallet: HashMap<WalletId, Vec<usize>>,
    by_aggregate: HashMap<AggregateId, Vec<usize>>,
}

impl Book {
    /// Create an empty book
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a book by replaying entries in order
    pub fn from_transactions(transactions: impl IntoIterator<Item = Transaction>) -> Self {
        let mut book = Self::new();
        for transaction in transactions {
            book.push(transaction);
        }
        book
    }

    /// Append an entry and index it; returns its log position
    pub fn push(&mut self, transaction: Transaction) -> usize {
        let position = self.log.len();

        self.by_wallet
            .entry(transaction.wallet.clone())
            .or_default()
            .push(position);
        self.by_aggregate
            .entry(transaction.aggregate.clone())
            .or_default()
            .push(position);
        self.log.push(transaction);

        position
    }

    /// Whole log in append order
    pub fn transactions(&self) -> &[Transaction] {
        &self.log
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.log.len()
    }

    /// True if nothing was ever appended
    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    /// Number of wallets with at least one entry
    pub fn wallet_count(&self) -> usize {
        self.by_wallet.len()
    }

    /// Number of aggregates with at least one entry
    pub fn aggregate_count(&self) -> usize {
        self.by_aggregate.len()
    }

    /// Entries for a wallet, in append order
    pub fn wallet_transactions(&self, wallet: &str) -> Result<Bucket<'_>> {
        self.by_wallet
            .get(wallet)
            .map(|positions| Bucket::new(&self.log, positions))
            .ok_or_else(|| Error::NoSuchWallet(wallet.to_string()))
    }

    /// Entries for an aggregate, in append order
    pub fn aggregate_transactions(&self, aggregate: &str) -> Result<Bucket<'_>> {
        self.by_aggregate
            .get(aggregate)
            .map(|positions| Bucket::new(&self.log, positions))
            .ok_or_else(|| Error::NoSuchAggregate(aggregate.to_string()))
    }

    /// Fold a wallet's bucket into its balance
    ///
    /// All-or-nothing: the first unrecognized kind or overflow aborts the
    /// fold.
    pub fn balance(&self, wallet: &str) -> Result<i64> {
        let overflow = || Error::BalanceOverflow(wallet.to_string());

        self.wallet_transactions(wallet)?
            .iter()
            .try_fold(0i64, |balance, transaction| {
                let direction = transaction.kind.direction()?;
                let amount = i64::try_from(transaction.amount).map_err(|_| overflow())?;
                let next = match direction {
                    Direction::Increase => balance.checked_add(amount),
                    Direction::Decrease => balance.checked_sub(amount),
                };
                next.ok_or_else(overflow)
            })
    }
}

/// Ordered view over the log entries of one wallet or aggregate
#[derive(Debug, Clone, Copy)]
pub struct Bucket<'a> {
    log: &'a [Transaction],
    positions: &'a [usize],
}

impl<'a> Bucket<'a> {
    fn new(log: &'a [Transaction], positions: &'a [usize]) -> Self {
        Self { log, positions }
    }

    /// Iterate entries in append order
    pub fn iter(&self) -> impl Iterator<Item = &'a Transaction> + 'a {
        let (log, positions) = (self.log, self.positions);
        positions.iter().map(move |&position| &log[position])
    }

    /// Log positions of the entries
    pub fn positions(&self) -> &'a [usize] {
        self.positions
    }

    /// Number of entries (never zero for a bucket obtained from a book)
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Always false for buckets obtained from a book
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Owned copies of the entries
    pub fn to_vec(&self) -> Vec<Transaction> {
        self.iter().cloned().collect()
    }
}
