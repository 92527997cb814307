//! Error types for the ledger

use crate::types::{StatementId, UserId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
///
/// Every failure is terminal for the triggering request: no partial commits,
/// no automatic retry. `LockTimeout` is the one kind a caller may retry.
#[derive(Error, Debug)]
pub enum Error {
    /// Storage error (RocksDB)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Amount was zero or negative
    #[error("Invalid amount: {0}")]
    InvalidAmount(Decimal),

    /// Referenced user does not resolve
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    /// Transfer sender does not resolve
    #[error("Transfer sender not found: {0}")]
    SenderNotFound(UserId),

    /// Transfer receiver does not resolve
    #[error("Transfer receiver not found: {0}")]
    ReceiverNotFound(UserId),

    /// Payer and payee are the same user
    #[error("Transfer to self: {0}")]
    SelfTransfer(UserId),

    /// Requested amount exceeds the pre-operation balance
    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        /// Amount the operation asked for
        requested: Decimal,
        /// Balance at the time of the check
        available: Decimal,
    },

    /// Statement id does not resolve (or belongs to a different owner)
    #[error("Statement not found: {0}")]
    StatementNotFound(StatementId),

    /// Email is already registered
    #[error("Email already registered: {0}")]
    EmailTaken(String),

    /// Exclusion scope could not be acquired within the bounded wait
    #[error("Lock acquisition timed out for user {0}")]
    LockTimeout(UserId),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// True for failures the caller may safely retry
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::LockTimeout(_))
    }
}

impl From<rocksdb::Error> for Error {
    fn from(err: rocksdb::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}
