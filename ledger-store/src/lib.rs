//! FinLedger Statement Store
//!
//! Append-only statement ledger for a small banking API.
//!
//! # Architecture
//!
//! - **Statements**: All balance state is derived from immutable statements
//! - **Append-only**: Statements are never modified or deleted
//! - **Atomic pairs**: The two legs of a transfer commit as one unit
//! - **Exact arithmetic**: Decimal amounts, never binary floating point

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod config;
pub mod error;
pub mod storage;
pub mod store;
pub mod types;

// Re-exports
pub use config::{Config, RocksDbConfig};
pub use error::{Error, Result};
pub use storage::Storage;
pub use store::{StatementIter, StatementStore, UserDirectory};
pub use types::{NewUser, OperationType, Statement, StatementId, User, UserId};
