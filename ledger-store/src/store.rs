//! Collaborator contracts consumed by the operation layer
//!
//! The operation layer takes these as explicit constructor parameters; there
//! is no process-wide registry. `Storage` implements both, and a test double
//! can stand in for either.

use crate::error::Result;
use crate::types::{NewUser, Statement, StatementId, User, UserId};

/// Lazy, restartable statement sequence in insertion order (oldest first)
pub type StatementIter<'a> = Box<dyn Iterator<Item = Result<Statement>> + 'a>;

/// User lookup and registration
pub trait UserDirectory: Send + Sync {
    /// Register a new user, rejecting duplicate emails with `EmailTaken`
    fn create_user(&self, new_user: NewUser) -> Result<User>;

    /// Resolve a user by id
    fn find_by_id(&self, id: UserId) -> Result<Option<User>>;

    /// Resolve a user by email
    fn find_by_email(&self, email: &str) -> Result<Option<User>>;
}

/// Persistence for immutable statement records
pub trait StatementStore: Send + Sync {
    /// Persist a new statement; it becomes visible to subsequent queries
    fn append(&self, statement: &Statement) -> Result<StatementId>;

    /// Persist a transfer pair as one atomic unit
    ///
    /// No observer may ever see exactly one of the pair: both statements are
    /// durable or neither is.
    fn append_pair(&self, debit: &Statement, credit: &Statement) -> Result<()>;

    /// Look up a statement by id
    fn get_by_id(&self, id: StatementId) -> Result<Option<Statement>>;

    /// All statements owned by a user, oldest first
    ///
    /// Calling again yields a fresh iterator over a consistent snapshot.
    fn list_by_user(&self, user_id: UserId) -> Result<StatementIter<'_>>;
}
