//! Error types for the ledger

use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
#[derive(Error, Debug)]
pub enum Error {
    /// Wallet has no transactions
    #[error("No transactions for wallet ({0})")]
    NoSuchWallet(String),

    /// Aggregate has no transactions
    #[error("No transactions for aggregate ({0})")]
    NoSuchAggregate(String),

    /// A logged transaction carries a kind outside the closed enumeration
    #[error("Invalid transaction type: {0}")]
    InvalidTransactionKind(String),

    /// Transfer source cannot cover the amount
    #[error("Wallet '{wallet}' has insufficient balance of {balance} to fill transfer of {requested}")]
    InsufficientFunds {
        /// Source wallet
        wallet: String,
        /// Balance at the time of the check
        balance: i64,
        /// Requested transfer amount
        requested: u64,
    },

    /// Balance fold left the signed 64-bit range
    #[error("Balance overflow for wallet ({0})")]
    BalanceOverflow(String),

    /// Persisted content could not be parsed at open time
    #[error("Corrupt store: {0}")]
    CorruptStore(#[source] serde_json::Error),

    /// Serialization error while writing the store
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Storage error (backing sink)
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Entropy source unavailable for aggregate id generation
    #[error("Entropy source unavailable: {0}")]
    Entropy(String),

    /// Concurrency error (actor mailbox closed, etc.)
    #[error("Concurrency error: {0}")]
    Concurrency(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// How a boundary layer should report an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The wallet or aggregate was never seen
    NotFound,
    /// The request was refused because of ledger content or state
    Rejected,
    /// Infrastructure failure
    Internal,
}

impl Error {
    /// Classify for translation into transport responses
    pub fn class(&self) -> ErrorClass {
        match self {
            Error::NoSuchWallet(_) | Error::NoSuchAggregate(_) => ErrorClass::NotFound,
            Error::InvalidTransactionKind(_)
            | Error::InsufficientFunds { .. }
            | Error::BalanceOverflow(_)
            | Error::CorruptStore(_) => ErrorClass::Rejected,
            Error::Serialization(_)
            | Error::Storage(_)
            | Error::Entropy(_)
            | Error::Concurrency(_)
            | Error::Config(_) => ErrorClass::Internal,
        }
    }

    /// Shorthand for `class() == ErrorClass::NotFound`
    pub fn is_not_found(&self) -> bool {
        self.class() == ErrorClass::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_misses_are_not_found() {
        assert!(Error::NoSuchWallet("1".to_string()).is_not_found());
        assert!(Error::NoSuchAggregate("1111".to_string()).is_not_found());
    }

    #[test]
    fn test_content_errors_are_rejected() {
        let err = Error::InsufficientFunds {
            wallet: "1".to_string(),
            balance: 10,
            requested: 20,
        };
        assert_eq!(err.class(), ErrorClass::Rejected);
        assert_eq!(
            err.to_string(),
            "Wallet '1' has insufficient balance of 10 to fill transfer of 20"
        );

        let corrupt = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        assert_eq!(Error::CorruptStore(corrupt).class(), ErrorClass::Rejected);
        assert_eq!(
            Error::InvalidTransactionKind("invalid".to_string()).class(),
            ErrorClass::Rejected
        );
    }

    #[test]
    fn test_io_is_internal() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::Other, "disk full").into();
        assert_eq!(err.class(), ErrorClass::Internal);
    }
}
