//! Core types for the ledger
//!
//! All types are designed for:
//! - Stable JSON serialization (the persisted document format)
//! - Exact arithmetic (integer amounts in the smallest currency unit)
//! - Cheap keyed lookup (`Borrow<str>` on identifiers)

use crate::{Error, Result};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use uuid::Uuid;

/// Wallet identifier (opaque, not validated)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletId(String);

impl WalletId {
    /// Create new wallet ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for WalletId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WalletId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for WalletId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for WalletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Aggregate identifier grouping related transactions
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateId(String);

impl AggregateId {
    /// Create new aggregate ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random aggregate ID
    ///
    /// 128 bits from the OS entropy source, rendered as upper-case grouped
    /// hex (`8-4-4-4-12`). Collisions are not detected.
    pub fn generate() -> Result<Self> {
        let mut bytes = [0u8; 16];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| Error::Entropy(e.to_string()))?;

        Ok(Self(format!("{:X}", Uuid::from_bytes(bytes).hyphenated())))
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for AggregateId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AggregateId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for AggregateId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for AggregateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transaction kind
///
/// The four known kinds form a closed set. Anything else read from a store
/// (or appended through the raw API) is kept verbatim as `Unrecognized` and
/// rejected when a balance fold reaches it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransactionKind {
    /// Funds received from another wallet
    Credit,
    /// Funds sent to another wallet
    Debit,
    /// Funds entering the ledger
    CashIn,
    /// Funds leaving the ledger
    CashOut,
    /// Kind outside the closed enumeration
    Unrecognized(String),
}

/// Effect of a transaction on its wallet's balance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Adds the amount
    Increase,
    /// Subtracts the amount
    Decrease,
}

impl TransactionKind {
    /// Persisted literal
    pub fn as_str(&self) -> &str {
        match self {
            TransactionKind::Credit => "credit",
            TransactionKind::Debit => "debit",
            TransactionKind::CashIn => "cash in",
            TransactionKind::CashOut => "cash out",
            TransactionKind::Unrecognized(other) => other,
        }
    }

    /// Balance direction, or `InvalidTransactionKind` for unrecognized kinds
    pub fn direction(&self) -> Result<Direction> {
        match self {
            TransactionKind::Credit | TransactionKind::CashIn => Ok(Direction::Increase),
            TransactionKind::Debit | TransactionKind::CashOut => Ok(Direction::Decrease),
            TransactionKind::Unrecognized(other) => {
                Err(Error::InvalidTransactionKind(other.clone()))
            }
        }
    }

    /// Whether this is one of the four known kinds
    pub fn is_recognized(&self) -> bool {
        !matches!(self, TransactionKind::Unrecognized(_))
    }
}

impl From<&str> for TransactionKind {
    fn from(s: &str) -> Self {
        match s {
            "credit" => TransactionKind::Credit,
            "debit" => TransactionKind::Debit,
            "cash in" => TransactionKind::CashIn,
            "cash out" => TransactionKind::CashOut,
            other => TransactionKind::Unrecognized(other.to_string()),
        }
    }
}

impl From<String> for TransactionKind {
    fn from(s: String) -> Self {
        match TransactionKind::from(s.as_str()) {
            TransactionKind::Unrecognized(_) => TransactionKind::Unrecognized(s),
            known => known,
        }
    }
}

impl From<TransactionKind> for String {
    fn from(kind: TransactionKind) -> Self {
        match kind {
            TransactionKind::Unrecognized(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ledger entry (immutable once appended)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Kind of movement
    #[serde(rename = "type")]
    pub kind: TransactionKind,

    /// Wallet the movement applies to
    pub wallet: WalletId,

    /// Amount in the smallest currency unit
    pub amount: u64,

    /// Group this entry belongs to
    pub aggregate: AggregateId,
}

impl Transaction {
    /// Create new transaction
    pub fn new(
        kind: TransactionKind,
        wallet: impl Into<WalletId>,
        amount: u64,
        aggregate: impl Into<AggregateId>,
    ) -> Self {
        Self {
            kind,
            wallet: wallet.into(),
            amount,
            aggregate: aggregate.into(),
        }
    }
}
