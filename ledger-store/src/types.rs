//! Core types for the statement ledger
//!
//! All types are designed for:
//! - Deterministic serialization (bincode)
//! - Memory safety (no unsafe code)
//! - Exact arithmetic (Decimal for money)

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// User identifier (UUIDv7 for time-ordering)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct UserId(Uuid);

impl UserId {
    /// Generate a new time-ordered ID
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// Wrap an existing UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Raw UUID bytes (used as storage keys)
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Statement identifier (UUIDv7 for time-ordering)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct StatementId(Uuid);

impl StatementId {
    /// Generate a new time-ordered ID
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// Wrap an existing UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Rebuild from raw bytes (index keys)
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Raw UUID bytes (used as storage keys)
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl fmt::Display for StatementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of money movement a statement records
///
/// The set is closed: every ledger entry is exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum OperationType {
    /// Funds added by the owner
    Deposit = 1,
    /// Funds removed by the owner
    Withdraw = 2,
    /// Debit leg of a transfer (owned by the payer)
    SentTransfer = 3,
    /// Credit leg of a transfer (owned by the payee)
    ReceivedTransfer = 4,
}

impl OperationType {
    /// True if this operation adds to the owner's balance
    pub fn is_credit(&self) -> bool {
        matches!(self, OperationType::Deposit | OperationType::ReceivedTransfer)
    }

    /// Persisted tag name
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Deposit => "deposit",
            OperationType::Withdraw => "withdraw",
            OperationType::SentTransfer => "sent_transfer",
            OperationType::ReceivedTransfer => "received_transfer",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An immutable ledger entry representing one money movement
///
/// Statements are append-only: `updated_at` exists for schema symmetry with
/// the rest of the API but always equals `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    /// Unique statement ID
    pub id: StatementId,

    /// Owning user
    pub user_id: UserId,

    /// Amount moved (always strictly positive; direction comes from the type)
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,

    /// Free-text description
    pub description: String,

    /// Movement kind
    #[serde(rename = "type")]
    pub operation: OperationType,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Update timestamp (statements are never mutated post-creation)
    pub updated_at: DateTime<Utc>,
}

impl Statement {
    /// Create a new statement stamped with the current time
    pub fn new(
        user_id: UserId,
        operation: OperationType,
        amount: Decimal,
        description: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: StatementId::generate(),
            user_id,
            amount,
            description: description.into(),
            operation,
            created_at: now,
            updated_at: now,
        }
    }

    /// Amount with the sign its operation contributes to the balance
    pub fn signed_amount(&self) -> Decimal {
        if self.operation.is_credit() {
            self.amount
        } else {
            -self.amount
        }
    }
}

/// A registered account holder
///
/// Immutable once created; credential rotation is handled outside this core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID
    pub id: UserId,

    /// Display name
    pub name: String,

    /// Email address (unique across the directory)
    pub email: String,

    /// Opaque credential hash (hashing is the caller's concern)
    pub credential_hash: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Registration input for a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Opaque credential hash
    pub credential_hash: String,
}

impl User {
    /// Materialize a registration into a stored user
    pub fn from_new(new_user: NewUser) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::generate(),
            name: new_user.name,
            email: new_user.email,
            credential_hash: new_user.credential_hash,
            created_at: now,
            updated_at: now,
        }
    }
}
