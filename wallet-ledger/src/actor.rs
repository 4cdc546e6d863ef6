//! Actor-based concurrency for the ledger
//!
//! This module implements the single-writer pattern using Tokio actors:
//! - One task owns the [`Ledger`]; every request runs to completion before
//!   the next one is taken from the mailbox
//! - Check-then-act helpers (transfer) are atomic from the caller's view
//! - Store rewrites happen inside the request, so an acknowledged mutation
//!   is already durable
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │           Command / query handlers                    │
//! └─────────────────────┬────────────────────────────────┘
//!                       │
//!                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │               LedgerHandle (Clone)                    │
//! │         Sends messages to actor mailbox              │
//! └─────────────────────┬────────────────────────────────┘
//!                       │
//!                       │ mpsc::channel (bounded)
//!                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │              LedgerActor (Single Task)                │
//! │     Ledger: Book (log + indexes) + JsonStore          │
//! └───────────────────────────────────────────────────────┘
//! ```

use crate::{
    metrics::Metrics,
    types::{AggregateId, Transaction},
    Error, Ledger, Result,
};
use std::time::Instant;
use tokio::sync::{mpsc, oneshot};

/// Message sent to the ledger actor
pub enum LedgerMessage {
    /// Append a raw transaction
    Append {
        transaction: Transaction,
        response: oneshot::Sender<Result<()>>,
    },

    /// Deposit funds into a wallet
    Deposit {
        wallet: String,
        amount: u64,
        response: oneshot::Sender<Result<AggregateId>>,
    },

    /// Withdraw funds from a wallet
    Withdraw {
        wallet: String,
        amount: u64,
        response: oneshot::Sender<Result<AggregateId>>,
    },

    /// Transfer funds between wallets
    Transfer {
        source: String,
        destination: String,
        amount: u64,
        response: oneshot::Sender<Result<AggregateId>>,
    },

    /// Get wallet balance
    Balance {
        wallet: String,
        response: oneshot::Sender<Result<i64>>,
    },

    /// Get wallet history
    WalletTransactions {
        wallet: String,
        response: oneshot::Sender<Result<Vec<Transaction>>>,
    },

    /// Get aggregate history
    AggregateTransactions {
        aggregate: String,
        response: oneshot::Sender<Result<Vec<Transaction>>>,
    },

    /// Snapshot of the whole log
    Transactions {
        response: oneshot::Sender<Vec<Transaction>>,
    },

    /// Stop the actor and hand the ledger back
    Shutdown {
        response: oneshot::Sender<Ledger>,
    },
}

/// Actor that processes ledger messages
pub struct LedgerActor {
    /// Engine owned by this task
    ledger: Ledger,

    /// Mailbox for incoming messages
    mailbox: mpsc::Receiver<LedgerMessage>,

    /// Metrics sink
    metrics: Metrics,
}

impl LedgerActor {
    /// Create new actor
    pub fn new(ledger: Ledger, mailbox: mpsc::Receiver<LedgerMessage>, metrics: Metrics) -> Self {
        metrics.log_length.set(ledger.len() as i64);
        Self {
            ledger,
            mailbox,
            metrics,
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.mailbox.recv().await {
            if let LedgerMessage::Shutdown { response } = msg {
                tracing::info!(transactions = self.ledger.len(), "Ledger actor shutting down");
                let _ = response.send(self.ledger);
                return;
            }
            self.handle_message(msg);
        }

        tracing::info!("Ledger mailbox closed, actor stopped");
    }

    /// Handle a single message
    fn handle_message(&mut self, msg: LedgerMessage) {
        match msg {
            LedgerMessage::Append {
                transaction,
                response,
            } => {
                let result = self.mutate(|ledger| {
                    ledger.append(
                        transaction.kind,
                        transaction.wallet,
                        transaction.amount,
                        transaction.aggregate,
                    )
                });
                let _ = response.send(result);
            }

            LedgerMessage::Deposit {
                wallet,
                amount,
                response,
            } => {
                let result = self.mutate(|ledger| ledger.deposit(&wallet, amount));
                let _ = response.send(result);
            }

            LedgerMessage::Withdraw {
                wallet,
                amount,
                response,
            } => {
                let result = self.mutate(|ledger| ledger.withdraw(&wallet, amount));
                let _ = response.send(result);
            }

            LedgerMessage::Transfer {
                source,
                destination,
                amount,
                response,
            } => {
                let result = self.mutate(|ledger| ledger.transfer(&source, &destination, amount));
                if let Err(Error::InsufficientFunds { .. }) = result {
                    self.metrics.record_rejected_transfer();
                }
                let _ = response.send(result);
            }

            LedgerMessage::Balance { wallet, response } => {
                let _ = response.send(self.ledger.balance(&wallet));
            }

            LedgerMessage::WalletTransactions { wallet, response } => {
                let result = self
                    .ledger
                    .wallet_transactions(&wallet)
                    .map(|history| history.into_iter().cloned().collect());
                let _ = response.send(result);
            }

            LedgerMessage::AggregateTransactions {
                aggregate,
                response,
            } => {
                let result = self
                    .ledger
                    .aggregate_transactions(&aggregate)
                    .map(|history| history.into_iter().cloned().collect());
                let _ = response.send(result);
            }

            LedgerMessage::Transactions { response } => {
                let _ = response.send(self.ledger.transactions().to_vec());
            }

            LedgerMessage::Shutdown { .. } => {
                // Handled in run loop
            }
        }
    }

    /// Run a mutation and record its metrics
    fn mutate<T>(&mut self, op: impl FnOnce(&mut Ledger) -> Result<T>) -> Result<T> {
        let before = self.ledger.len();
        let started = Instant::now();

        let result = op(&mut self.ledger);

        self.metrics
            .record_append_duration(started.elapsed().as_secs_f64());
        let appended = self.ledger.len() - before;
        if appended > 0 {
            self.metrics.record_appended(appended, self.ledger.len());
        }

        result
    }
}

/// Handle for sending messages to the actor
#[derive(Clone, Debug)]
pub struct LedgerHandle {
    sender: mpsc::Sender<LedgerMessage>,
}

impl LedgerHandle {
    /// Create new handle
    pub fn new(sender: mpsc::Sender<LedgerMessage>) -> Self {
        Self { sender }
    }

    async fn request<T>(
        &self,
        message: impl FnOnce(oneshot::Sender<T>) -> LedgerMessage,
    ) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(message(tx))
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))
    }

    /// Append a raw transaction
    pub async fn append(&self, transaction: Transaction) -> Result<()> {
        self.request(|response| LedgerMessage::Append {
            transaction,
            response,
        })
        .await?
    }

    /// Deposit funds into a wallet
    pub async fn deposit(&self, wallet: impl Into<String>, amount: u64) -> Result<AggregateId> {
        let wallet = wallet.into();
        self.request(|response| LedgerMessage::Deposit {
            wallet,
            amount,
            response,
        })
        .await?
    }

    /// Withdraw funds from a wallet
    pub async fn withdraw(&self, wallet: impl Into<String>, amount: u64) -> Result<AggregateId> {
        let wallet = wallet.into();
        self.request(|response| LedgerMessage::Withdraw {
            wallet,
            amount,
            response,
        })
        .await?
    }

    /// Transfer funds between wallets
    pub async fn transfer(
        &self,
        source: impl Into<String>,
        destination: impl Into<String>,
        amount: u64,
    ) -> Result<AggregateId> {
        let (source, destination) = (source.into(), destination.into());
        self.request(|response| LedgerMessage::Transfer {
            source,
            destination,
            amount,
            response,
        })
        .await?
    }

    /// Get wallet balance
    pub async fn balance(&self, wallet: impl Into<String>) -> Result<i64> {
        let wallet = wallet.into();
        self.request(|response| LedgerMessage::Balance { wallet, response })
            .await?
    }

    /// Get wallet history
    pub async fn wallet_transactions(&self, wallet: impl Into<String>) -> Result<Vec<Transaction>> {
        let wallet = wallet.into();
        self.request(|response| LedgerMessage::WalletTransactions { wallet, response })
            .await?
    }

    /// Get aggregate history
    pub async fn aggregate_transactions(
        &self,
        aggregate: impl Into<String>,
    ) -> Result<Vec<Transaction>> {
        let aggregate = aggregate.into();
        self.request(|response| LedgerMessage::AggregateTransactions {
            aggregate,
            response,
        })
        .await?
    }

    /// Snapshot of the whole log
    pub async fn transactions(&self) -> Result<Vec<Transaction>> {
        self.request(|response| LedgerMessage::Transactions { response })
            .await
    }

    /// Shutdown actor, returning the ledger it owned
    pub async fn shutdown(&self) -> Result<Ledger> {
        self.request(|response| LedgerMessage::Shutdown { response })
            .await
    }
}

/// Spawn the ledger actor
pub fn spawn_ledger_actor(ledger: Ledger, mailbox_capacity: usize, metrics: Metrics) -> LedgerHandle {
    let (tx, rx) = mpsc::channel(mailbox_capacity); // Bounded channel for backpressure
    let actor = LedgerActor::new(ledger, rx, metrics);

    tokio::spawn(async move {
        actor.run().await;
    });

    LedgerHandle::new(tx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransactionKind;

    fn spawn(ledger: Ledger) -> (LedgerHandle, Metrics) {
        let metrics = Metrics::new().unwrap();
        (spawn_ledger_actor(ledger, 16, metrics.clone()), metrics)
    }

    #[tokio::test]
    async fn test_actor_spawn_and_shutdown() {
        let (handle, _) = spawn(Ledger::in_memory());
        let ledger = handle.shutdown().await.unwrap();
        assert!(ledger.is_empty());

        // mailbox is gone once the actor returned
        assert!(matches!(
            handle.balance("1").await,
            Err(Error::Concurrency(_))
        ));
    }

    #[tokio::test]
    async fn test_actor_funds_movements() {
        let (handle, metrics) = spawn(Ledger::in_memory());

        handle.deposit("1", 100000).await.unwrap();
        handle.withdraw("1", 30000).await.unwrap();
        assert_eq!(handle.balance("1").await.unwrap(), 70000);

        let aggregate = handle.transfer("1", "2", 20000).await.unwrap();
        let legs = handle.aggregate_transactions(aggregate.as_str()).await.unwrap();
        assert_eq!(legs.len(), 2);
        assert_eq!(legs[0].kind, TransactionKind::Debit);
        assert_eq!(legs[1].kind, TransactionKind::Credit);

        let rejected = handle.transfer("2", "1", 20001).await;
        assert!(matches!(rejected, Err(Error::InsufficientFunds { .. })));

        assert_eq!(handle.transactions().await.unwrap().len(), 4);
        assert_eq!(metrics.transactions_total.get(), 4);
        assert_eq!(metrics.rejected_transfers.get(), 1);
        assert_eq!(metrics.log_length.get(), 4);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_actor_raw_append_and_lookup_errors() {
        let (handle, _) = spawn(Ledger::in_memory());

        handle
            .append(Transaction::new(TransactionKind::Credit, "9", 5, "agg"))
            .await
            .unwrap();
        assert_eq!(handle.wallet_transactions("9").await.unwrap().len(), 1);

        let missing = handle.wallet_transactions("10").await.unwrap_err();
        assert!(missing.is_not_found());
        let missing = handle.aggregate_transactions("nope").await.unwrap_err();
        assert!(missing.is_not_found());

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_transfers_never_overdraw() {
        let mut ledger = Ledger::in_memory();
        ledger.deposit("src", 1000).unwrap();
        let (handle, _) = spawn(ledger);

        let mut tasks = Vec::new();
        for i in 0..20 {
            let handle = handle.clone();
            tasks.push(tokio::spawn(async move {
                handle.transfer("src", format!("dst-{i}"), 100).await
            }));
        }

        let mut succeeded = 0;
        for task in tasks {
            if task.await.unwrap().is_ok() {
                succeeded += 1;
            }
        }

        assert_eq!(succeeded, 10);
        assert_eq!(handle.balance("src").await.unwrap(), 0);

        let ledger = handle.shutdown().await.unwrap();
        assert_eq!(ledger.len(), 21);
    }
}
