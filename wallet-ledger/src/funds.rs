//! Funds-movement helpers
//!
//! Each helper generates a fresh aggregate id, appends its legs under it in
//! one commit, and returns the id so callers can correlate the legs.

use crate::{
    types::{AggregateId, Transaction, TransactionKind},
    Error, Ledger, Result,
};

impl Ledger {
    /// Move `amount` from `source` to `destination`
    ///
    /// Fails with `InsufficientFunds` (appending nothing) if the source
    /// balance is below `amount`. Otherwise appends a debit on the source
    /// followed by a credit on the destination.
    pub fn transfer(&mut self, source: &str, destination: &str, amount: u64) -> Result<AggregateId> {
        let balance = self.balance(source)?;

        if i128::from(balance) < i128::from(amount) {
            tracing::warn!(
                wallet = source,
                balance,
                requested = amount,
                "Transfer rejected for insufficient funds"
            );
            return Err(Error::InsufficientFunds {
                wallet: source.to_string(),
                balance,
                requested: amount,
            });
        }

        let aggregate = AggregateId::generate()?;

        self.commit(vec![
            Transaction::new(TransactionKind::Debit, source, amount, aggregate.clone()),
            Transaction::new(TransactionKind::Credit, destination, amount, aggregate.clone()),
        ])?;

        Ok(aggregate)
    }

    /// Put `amount` into `wallet` from outside the ledger
    pub fn deposit(&mut self, wallet: &str, amount: u64) -> Result<AggregateId> {
        self.single_leg(TransactionKind::CashIn, wallet, amount)
    }

    /// Take `amount` out of `wallet`; no balance check is made
    pub fn withdraw(&mut self, wallet: &str, amount: u64) -> Result<AggregateId> {
        self.single_leg(TransactionKind::CashOut, wallet, amount)
    }

    fn single_leg(&mut self, kind: TransactionKind, wallet: &str, amount: u64) -> Result<AggregateId> {
        let aggregate = AggregateId::generate()?;
        self.append(kind, wallet, amount, aggregate.clone())?;
        Ok(aggregate)
    }
}
