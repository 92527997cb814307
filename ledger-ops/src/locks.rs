//! Per-user exclusion scopes
//!
//! The balance invariant is only safe under concurrency if check-and-append
//! runs as one unit per user. Each user gets a mutex handed out through a
//! shared map; acquisition waits a bounded time and surfaces `LockTimeout`
//! (retryable) instead of hanging. Transfers need both parties' scopes and
//! always take them in canonical id order, so two opposing transfers cannot
//! deadlock.

use dashmap::DashMap;
use ledger_store::{Error, Result, UserId};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// An acquired exclusion scope, released on drop
pub type ScopeGuard = OwnedMutexGuard<()>;

/// Map of per-user exclusion scopes
pub struct AccountLocks {
    locks: DashMap<UserId, Arc<Mutex<()>>>,
    timeout: Duration,
}

impl AccountLocks {
    /// Create a lock map with the given bounded wait
    pub fn new(timeout: Duration) -> Self {
        Self {
            locks: DashMap::new(),
            timeout,
        }
    }

    /// Acquire one user's scope, waiting at most the configured timeout
    pub async fn acquire(&self, user_id: UserId) -> Result<ScopeGuard> {
        let lock = self
            .locks
            .entry(user_id)
            .or_default()
            .value()
            .clone();

        tokio::time::timeout(self.timeout, lock.lock_owned())
            .await
            .map_err(|_| Error::LockTimeout(user_id))
    }

    /// Acquire two users' scopes in canonical id order
    ///
    /// Callers must have rejected self-transfers already; the pair must be
    /// two distinct users.
    pub async fn acquire_pair(
        &self,
        a: UserId,
        b: UserId,
    ) -> Result<(ScopeGuard, ScopeGuard)> {
        debug_assert_ne!(a, b);

        let (first, second) = if a <= b { (a, b) } else { (b, a) };

        let first_guard = self.acquire(first).await?;
        let second_guard = self.acquire(second).await?;

        Ok((first_guard, second_guard))
    }
}
