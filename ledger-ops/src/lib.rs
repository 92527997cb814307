//! FinLedger Operations
//!
//! The operation layer of the ledger: balance derivation, per-user exclusion
//! scopes, and the deposit / withdraw / transfer / statement-query operations.
//!
//! # Invariants
//!
//! - Balance is the signed sum of a user's statement history
//! - No operation commits if it would drive the payer's balance negative
//! - Check-and-append is serialized per user; transfers take both users'
//!   scopes in canonical order
//! - A transfer pair commits atomically or not at all
//!
//! # Example
//!
//! ```no_run
//! use ledger_ops::{Config, Ledger};
//! use ledger_store::Storage;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> ledger_store::Result<()> {
//!     let config = Config::default();
//!     let storage = Arc::new(Storage::open(&config.store)?);
//!     let ledger = Ledger::new(storage.clone(), storage, config.exclusion)?;
//!
//!     // let statement = ledger.deposit(user_id, amount, "salary").await?;
//!
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod balance;
pub mod config;
pub mod ledger;
pub mod locks;
pub mod metrics;

// Re-exports
pub use config::{Config, ExclusionConfig};
pub use ledger::Ledger;
pub use ledger_store::{Error, Result};
pub use metrics::Metrics;
