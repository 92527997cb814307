//! Main ledger operation layer
//!
//! Ties the user directory, statement store, exclusion scopes, and metrics
//! into the four business operations plus the read surface. Collaborators
//! arrive through the constructor; there is no process-wide registry.
//!
//! Every operation is all-or-nothing: it either commits its statement(s) and
//! returns them, or returns a typed failure and leaves no state behind.

use crate::{
    balance::signed_sum,
    config::ExclusionConfig,
    locks::{AccountLocks, ScopeGuard},
    metrics::Metrics,
};
use ledger_store::{
    Error, NewUser, OperationType, Result, Statement, StatementId, StatementStore, User,
    UserDirectory, UserId,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Instant;

/// Ledger operation layer
pub struct Ledger<U, S> {
    /// User directory collaborator
    users: Arc<U>,

    /// Statement store collaborator
    statements: Arc<S>,

    /// Per-user exclusion scopes
    locks: AccountLocks,

    /// Operation metrics
    metrics: Metrics,
}

impl<U: UserDirectory, S: StatementStore> Ledger<U, S> {
    /// Build the operation layer from its collaborators
    pub fn new(users: Arc<U>, statements: Arc<S>, exclusion: ExclusionConfig) -> Result<Self> {
        let metrics = Metrics::new()
            .map_err(|e| Error::Other(format!("Metrics registration failed: {}", e)))?;

        Ok(Self {
            users,
            statements,
            locks: AccountLocks::new(exclusion.timeout()),
            metrics,
        })
    }

    /// Operation metrics (scrape endpoint lives with the embedding service)
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Register a new user
    ///
    /// The credential hash is opaque here; hashing belongs to the caller.
    pub fn register_user(
        &self,
        name: impl Into<String>,
        email: impl Into<String>,
        credential_hash: impl Into<String>,
    ) -> Result<User> {
        self.users.create_user(NewUser {
            name: name.into(),
            email: email.into(),
            credential_hash: credential_hash.into(),
        })
    }

    /// Resolve a user's profile
    pub fn profile(&self, user_id: UserId) -> Result<User> {
        self.resolve_user(user_id)
    }

    /// Add funds to a user's balance
    ///
    /// Deposits never check the balance.
    pub async fn deposit(
        &self,
        user_id: UserId,
        amount: Decimal,
        description: impl Into<String>,
    ) -> Result<Statement> {
        let started = Instant::now();
        Self::ensure_positive(amount)?;
        self.resolve_user(user_id)?;

        let _scope = self.acquire(user_id).await?;
        let statement = Statement::new(user_id, OperationType::Deposit, amount, description);
        self.statements.append(&statement)?;

        self.record_commit(started, 1);
        tracing::info!(
            user_id = %user_id,
            statement_id = %statement.id,
            amount = %amount,
            "Deposit committed"
        );

        Ok(statement)
    }

    /// Remove funds from a user's balance
    ///
    /// The funds check and the append run under the user's exclusion scope,
    /// so concurrent withdrawals cannot both pass on the same balance.
    pub async fn withdraw(
        &self,
        user_id: UserId,
        amount: Decimal,
        description: impl Into<String>,
    ) -> Result<Statement> {
        let started = Instant::now();
        Self::ensure_positive(amount)?;
        self.resolve_user(user_id)?;

        let _scope = self.acquire(user_id).await?;
        let available = self.balance_in_scope(user_id)?;
        if amount > available {
            self.metrics.insufficient_funds_total.inc();
            tracing::warn!(
                user_id = %user_id,
                requested = %amount,
                available = %available,
                "Withdrawal rejected"
            );
            return Err(Error::InsufficientFunds {
                requested: amount,
                available,
            });
        }

        let statement = Statement::new(user_id, OperationType::Withdraw, amount, description);
        self.statements.append(&statement)?;

        self.record_commit(started, 1);
        tracing::info!(
            user_id = %user_id,
            statement_id = %statement.id,
            amount = %amount,
            "Withdrawal committed"
        );

        Ok(statement)
    }

    /// Move funds between two users
    ///
    /// Creates the pair atomically: a `received_transfer` owned by the payee
    /// and a `sent_transfer` owned by the payer. Returns the payer's
    /// statement; the payee's is independently queryable afterwards.
    pub async fn transfer(
        &self,
        payer_id: UserId,
        payee_id: UserId,
        amount: Decimal,
        description: impl Into<String>,
    ) -> Result<Statement> {
        let started = Instant::now();
        Self::ensure_positive(amount)?;
        if payer_id == payee_id {
            return Err(Error::SelfTransfer(payer_id));
        }
        self.users
            .find_by_id(payer_id)?
            .ok_or(Error::SenderNotFound(payer_id))?;
        self.users
            .find_by_id(payee_id)?
            .ok_or(Error::ReceiverNotFound(payee_id))?;

        let _scopes = self.acquire_pair(payer_id, payee_id).await?;
        let available = self.balance_in_scope(payer_id)?;
        if amount > available {
            self.metrics.insufficient_funds_total.inc();
            tracing::warn!(
                payer_id = %payer_id,
                payee_id = %payee_id,
                requested = %amount,
                available = %available,
                "Transfer rejected"
            );
            return Err(Error::InsufficientFunds {
                requested: amount,
                available,
            });
        }

        let description = description.into();
        let credit = Statement::new(
            payee_id,
            OperationType::ReceivedTransfer,
            amount,
            description.clone(),
        );
        let debit = Statement::new(payer_id, OperationType::SentTransfer, amount, description);
        self.statements.append_pair(&debit, &credit)?;

        self.record_commit(started, 2);
        tracing::info!(
            payer_id = %payer_id,
            payee_id = %payee_id,
            debit_id = %debit.id,
            credit_id = %credit.id,
            amount = %amount,
            "Transfer committed"
        );

        Ok(debit)
    }

    /// Look up one statement, scoped to its owner
    ///
    /// A statement owned by someone else answers exactly like a missing one,
    /// so ids cannot be probed for existence.
    pub fn statement(&self, requester_id: UserId, statement_id: StatementId) -> Result<Statement> {
        self.resolve_user(requester_id)?;

        let statement = self
            .statements
            .get_by_id(statement_id)?
            .ok_or(Error::StatementNotFound(statement_id))?;

        if statement.user_id != requester_id {
            return Err(Error::StatementNotFound(statement_id));
        }

        Ok(statement)
    }

    /// Current balance derived from the statement history
    pub fn balance_of(&self, user_id: UserId) -> Result<Decimal> {
        self.resolve_user(user_id)?;
        signed_sum(self.statements.list_by_user(user_id)?)
    }

    /// Full statement history, oldest first
    pub fn history(&self, user_id: UserId) -> Result<Vec<Statement>> {
        self.resolve_user(user_id)?;
        self.statements.list_by_user(user_id)?.collect()
    }

    // Internal helpers

    fn resolve_user(&self, user_id: UserId) -> Result<User> {
        self.users
            .find_by_id(user_id)?
            .ok_or(Error::UserNotFound(user_id))
    }

    fn ensure_positive(amount: Decimal) -> Result<()> {
        if amount <= Decimal::ZERO {
            return Err(Error::InvalidAmount(amount));
        }
        Ok(())
    }

    /// Balance for a check-and-append sequence; the caller holds the scope
    fn balance_in_scope(&self, user_id: UserId) -> Result<Decimal> {
        signed_sum(self.statements.list_by_user(user_id)?)
    }

    async fn acquire(&self, user_id: UserId) -> Result<ScopeGuard> {
        match self.locks.acquire(user_id).await {
            Err(err @ Error::LockTimeout(_)) => {
                self.metrics.lock_timeouts_total.inc();
                Err(err)
            }
            other => other,
        }
    }

    async fn acquire_pair(&self, a: UserId, b: UserId) -> Result<(ScopeGuard, ScopeGuard)> {
        match self.locks.acquire_pair(a, b).await {
            Err(err @ Error::LockTimeout(_)) => {
                self.metrics.lock_timeouts_total.inc();
                Err(err)
            }
            other => other,
        }
    }

    fn record_commit(&self, started: Instant, statements: u64) {
        self.metrics.statements_total.inc_by(statements);
        self.metrics
            .operation_duration
            .observe(started.elapsed().as_secs_f64());
    }
}
