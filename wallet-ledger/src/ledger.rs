//! Ledger engine
//!
//! Ties the in-memory [`Book`] to an optional durable store. Mutations are
//! staged, persisted together with the existing log, and only then committed
//! to the book, so a failed write leaves the engine untouched.
//!
//! # Example
//!
//! ```
//! use wallet_ledger::{Ledger, TransactionKind};
//!
//! let mut ledger = Ledger::in_memory();
//! ledger.append(TransactionKind::CashIn, "1", 100_000, "1111")?;
//! ledger.append(TransactionKind::CashOut, "1", 30_000, "1112")?;
//!
//! assert_eq!(ledger.balance("1")?, 70_000);
//! # Ok::<(), wallet_ledger::Error>(())
//! ```

use crate::{
    book::Book,
    storage::{FileSink, JsonStore, Persist, Sink},
    types::{AggregateId, Transaction, TransactionKind, WalletId},
    Config, Result,
};
use std::fmt;
use std::path::Path;

/// Main ledger interface
pub struct Ledger {
    /// Log and indexes
    book: Book,

    /// Durable store (absent for the in-memory variant)
    store: Option<Box<dyn Persist>>,
}

impl Ledger {
    /// Create an empty, non-persistent ledger
    pub fn in_memory() -> Self {
        Self {
            book: Book::new(),
            store: None,
        }
    }

    /// Open a ledger backed by `sink`, hydrating the log from it
    pub fn open<S>(sink: S) -> Result<Self>
    where
        S: Sink + fmt::Debug + Send + 'static,
    {
        let (store, transactions) = JsonStore::open(sink)?;
        Ok(Self::with_store(Box::new(store), transactions))
    }

    /// Open a ledger backed by the file at `path`
    pub fn open_file(path: impl AsRef<Path>, sync_on_write: bool) -> Result<Self> {
        let path = path.as_ref();
        let ledger = Self::open(FileSink::open(path, sync_on_write)?)?;

        tracing::info!(
            path = %path.display(),
            transactions = ledger.len(),
            wallets = ledger.wallet_count(),
            "Opened ledger file"
        );

        Ok(ledger)
    }

    /// Build the variant selected by configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        if config.persistence.enabled {
            Self::open_file(&config.data_file, config.persistence.sync_on_write)
        } else {
            tracing::info!("Persistence disabled, using in-memory ledger");
            Ok(Self::in_memory())
        }
    }

    /// Attach an already opened store and replay its log
    pub fn with_store(store: Box<dyn Persist>, transactions: Vec<Transaction>) -> Self {
        Self {
            book: Book::from_transactions(transactions),
            store: Some(store),
        }
    }

    /// Append a raw transaction
    ///
    /// Nothing about wallet, amount or aggregate is validated and an
    /// unrecognized kind is accepted; it only surfaces when a balance fold
    /// reaches it.
    pub fn append(
        &mut self,
        kind: TransactionKind,
        wallet: impl Into<WalletId>,
        amount: u64,
        aggregate: impl Into<AggregateId>,
    ) -> Result<()> {
        self.commit(vec![Transaction::new(kind, wallet, amount, aggregate)])
    }

    /// Persist `log + staged`, then apply `staged` to the book
    pub(crate) fn commit(&mut self, staged: Vec<Transaction>) -> Result<()> {
        if let Some(store) = self.store.as_mut() {
            let document: Vec<&Transaction> =
                self.book.transactions().iter().chain(staged.iter()).collect();

            if let Err(e) = store.persist(&document) {
                tracing::error!(error = %e, staged = staged.len(), "Failed to persist ledger");
                return Err(e);
            }
        }

        for transaction in staged {
            tracing::debug!(
                kind = %transaction.kind,
                wallet = %transaction.wallet,
                amount = transaction.amount,
                aggregate = %transaction.aggregate,
                "Transaction appended"
            );
            self.book.push(transaction);
        }

        Ok(())
    }

    /// Current balance of a wallet
    pub fn balance(&self, wallet: &str) -> Result<i64> {
        self.book.balance(wallet)
    }

    /// Wallet history in append order
    pub fn wallet_transactions(&self, wallet: &str) -> Result<Vec<&Transaction>> {
        Ok(self.book.wallet_transactions(wallet)?.iter().collect())
    }

    /// Aggregate history in append order
    pub fn aggregate_transactions(&self, aggregate: &str) -> Result<Vec<&Transaction>> {
        Ok(self.book.aggregate_transactions(aggregate)?.iter().collect())
    }

    /// Whole log in append order
    pub fn transactions(&self) -> &[Transaction] {
        self.book.transactions()
    }

    /// Number of logged transactions
    pub fn len(&self) -> usize {
        self.book.len()
    }

    /// True if nothing was ever appended
    pub fn is_empty(&self) -> bool {
        self.book.is_empty()
    }

    /// Number of wallets with history
    pub fn wallet_count(&self) -> usize {
        self.book.wallet_count()
    }

    /// Number of aggregates with history
    pub fn aggregate_count(&self) -> usize {
        self.book.aggregate_count()
    }

    /// Whether writes are persisted
    pub fn is_persistent(&self) -> bool {
        self.store.is_some()
    }

    /// Size of the persisted document, if any
    pub fn document_len(&self) -> Option<u64> {
        self.store.as_ref().map(|store| store.document_len())
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl fmt::Debug for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("transactions", &self.book.len())
            .field("wallets", &self.book.wallet_count())
            .field("aggregates", &self.book.aggregate_count())
            .field("store", &self.store)
            .finish()
    }
}
