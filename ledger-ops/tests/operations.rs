//! End-to-end operation tests against RocksDB-backed storage

use ledger_ops::{ExclusionConfig, Ledger};
use ledger_store::{Error, OperationType, Storage, User};
use rust_decimal_macros::dec;
use std::sync::Arc;
use tempfile::TempDir;

fn open_ledger() -> (Ledger<Storage, Storage>, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let mut config = ledger_store::Config::default();
    config.data_dir = temp_dir.path().to_path_buf();

    let storage = Arc::new(Storage::open(&config).unwrap());
    let ledger = Ledger::new(storage.clone(), storage, ExclusionConfig::default()).unwrap();
    (ledger, temp_dir)
}

fn register(ledger: &Ledger<Storage, Storage>, email: &str) -> User {
    ledger.register_user("Test User", email, "credential-hash").unwrap()
}

#[tokio::test]
async fn test_deposit_then_overdraw_rejected() {
    let (ledger, _temp) = open_ledger();
    let user = register(&ledger, "user@example.com");

    ledger.deposit(user.id, dec!(15.29), "salary").await.unwrap();
    assert_eq!(ledger.balance_of(user.id).unwrap(), dec!(15.29));

    let result = ledger.withdraw(user.id, dec!(20.29), "groceries").await;
    match result {
        Err(Error::InsufficientFunds {
            requested,
            available,
        }) => {
            assert_eq!(requested, dec!(20.29));
            assert_eq!(available, dec!(15.29));
        }
        other => panic!("expected InsufficientFunds, got {:?}", other),
    }

    // Rejection leaves no state behind
    assert_eq!(ledger.balance_of(user.id).unwrap(), dec!(15.29));
    assert_eq!(ledger.history(user.id).unwrap().len(), 1);
}

#[tokio::test]
async fn test_withdraw_within_funds() {
    let (ledger, _temp) = open_ledger();
    let user = register(&ledger, "user@example.com");

    ledger.deposit(user.id, dec!(50.00), "salary").await.unwrap();
    let statement = ledger.withdraw(user.id, dec!(20.00), "rent").await.unwrap();

    assert_eq!(statement.operation, OperationType::Withdraw);
    assert_eq!(statement.amount, dec!(20.00));
    assert_eq!(ledger.balance_of(user.id).unwrap(), dec!(30.00));

    // Withdrawing the exact remaining balance is allowed
    ledger.withdraw(user.id, dec!(30.00), "rest").await.unwrap();
    assert_eq!(ledger.balance_of(user.id).unwrap(), dec!(0.00));
}

#[tokio::test]
async fn test_unknown_user_rejected() {
    let (ledger, _temp) = open_ledger();
    let ghost = ledger_store::UserId::generate();

    assert!(matches!(
        ledger.deposit(ghost, dec!(1.00), "x").await,
        Err(Error::UserNotFound(_))
    ));
    assert!(matches!(
        ledger.withdraw(ghost, dec!(1.00), "x").await,
        Err(Error::UserNotFound(_))
    ));
    assert!(matches!(ledger.balance_of(ghost), Err(Error::UserNotFound(_))));
    assert!(matches!(ledger.profile(ghost), Err(Error::UserNotFound(_))));
}

#[tokio::test]
async fn test_non_positive_amounts_rejected() {
    let (ledger, _temp) = open_ledger();
    let user = register(&ledger, "user@example.com");
    let other = register(&ledger, "other@example.com");

    assert!(matches!(
        ledger.deposit(user.id, dec!(0.00), "x").await,
        Err(Error::InvalidAmount(_))
    ));
    assert!(matches!(
        ledger.withdraw(user.id, dec!(-3.00), "x").await,
        Err(Error::InvalidAmount(_))
    ));
    assert!(matches!(
        ledger.transfer(user.id, other.id, dec!(0.00), "x").await,
        Err(Error::InvalidAmount(_))
    ));

    assert!(ledger.history(user.id).unwrap().is_empty());
}

#[tokio::test]
async fn test_transfer_creates_pair() {
    let (ledger, _temp) = open_ledger();
    let payer = register(&ledger, "payer@example.com");
    let payee = register(&ledger, "payee@example.com");

    ledger.deposit(payer.id, dec!(15.29), "salary").await.unwrap();
    let sent = ledger
        .transfer(payer.id, payee.id, dec!(5.29), "rent split")
        .await
        .unwrap();

    assert_eq!(sent.user_id, payer.id);
    assert_eq!(sent.operation, OperationType::SentTransfer);
    assert_eq!(sent.amount, dec!(5.29));
    assert_eq!(sent.description, "rent split");

    assert_eq!(ledger.balance_of(payer.id).unwrap(), dec!(10.00));
    assert_eq!(ledger.balance_of(payee.id).unwrap(), dec!(5.29));

    // The payer's statement is queryable by its owner
    let queried = ledger.statement(payer.id, sent.id).unwrap();
    assert_eq!(queried, sent);

    // The payee's leg exists independently with matching amount/description
    let payee_history = ledger.history(payee.id).unwrap();
    assert_eq!(payee_history.len(), 1);
    assert_eq!(payee_history[0].operation, OperationType::ReceivedTransfer);
    assert_eq!(payee_history[0].amount, dec!(5.29));
    assert_eq!(payee_history[0].description, "rent split");
    assert_ne!(payee_history[0].id, sent.id);
}

#[tokio::test]
async fn test_transfer_party_resolution() {
    let (ledger, _temp) = open_ledger();
    let payer = register(&ledger, "payer@example.com");
    let ghost = ledger_store::UserId::generate();

    ledger.deposit(payer.id, dec!(10.00), "salary").await.unwrap();

    assert!(matches!(
        ledger.transfer(ghost, payer.id, dec!(1.00), "x").await,
        Err(Error::SenderNotFound(_))
    ));
    assert!(matches!(
        ledger.transfer(payer.id, ghost, dec!(1.00), "x").await,
        Err(Error::ReceiverNotFound(_))
    ));

    // No leg of either failed transfer was committed
    assert_eq!(ledger.history(payer.id).unwrap().len(), 1);
}

#[tokio::test]
async fn test_failed_transfer_commits_nothing() {
    let (ledger, _temp) = open_ledger();
    let payer = register(&ledger, "payer@example.com");
    let payee = register(&ledger, "payee@example.com");

    ledger.deposit(payer.id, dec!(1.00), "pocket money").await.unwrap();

    let result = ledger.transfer(payer.id, payee.id, dec!(5.00), "too much").await;
    assert!(matches!(result, Err(Error::InsufficientFunds { .. })));

    assert_eq!(ledger.history(payer.id).unwrap().len(), 1);
    assert!(ledger.history(payee.id).unwrap().is_empty());
    assert_eq!(ledger.balance_of(payer.id).unwrap(), dec!(1.00));
    assert_eq!(ledger.balance_of(payee.id).unwrap(), dec!(0.00));
}

#[tokio::test]
async fn test_self_transfer_rejected() {
    let (ledger, _temp) = open_ledger();
    let user = register(&ledger, "user@example.com");

    ledger.deposit(user.id, dec!(10.00), "salary").await.unwrap();

    let result = ledger.transfer(user.id, user.id, dec!(1.00), "loop").await;
    assert!(matches!(result, Err(Error::SelfTransfer(_))));
    assert_eq!(ledger.history(user.id).unwrap().len(), 1);
}

#[tokio::test]
async fn test_statement_query_scoping() {
    let (ledger, _temp) = open_ledger();
    let owner = register(&ledger, "owner@example.com");
    let stranger = register(&ledger, "stranger@example.com");

    let statement = ledger.deposit(owner.id, dec!(3.00), "visible").await.unwrap();

    // Owner sees it
    assert_eq!(ledger.statement(owner.id, statement.id).unwrap(), statement);

    // A different owner gets the same answer as for a missing id
    assert!(matches!(
        ledger.statement(stranger.id, statement.id),
        Err(Error::StatementNotFound(_))
    ));

    // Never-created ids do not resolve
    let ghost_statement = ledger_store::StatementId::generate();
    assert!(matches!(
        ledger.statement(owner.id, ghost_statement),
        Err(Error::StatementNotFound(_))
    ));

    // Unknown requester fails before the lookup
    let ghost_user = ledger_store::UserId::generate();
    assert!(matches!(
        ledger.statement(ghost_user, statement.id),
        Err(Error::UserNotFound(_))
    ));
}

#[tokio::test]
async fn test_register_and_profile() {
    let (ledger, _temp) = open_ledger();

    let user = ledger
        .register_user("Ada", "ada@example.com", "credential-hash")
        .unwrap();
    let profile = ledger.profile(user.id).unwrap();
    assert_eq!(profile.name, "Ada");
    assert_eq!(profile.email, "ada@example.com");

    let duplicate = ledger.register_user("Ada Again", "ada@example.com", "other-hash");
    assert!(matches!(duplicate, Err(Error::EmailTaken(_))));
}

#[tokio::test]
async fn test_reads_are_idempotent() {
    let (ledger, _temp) = open_ledger();
    let user = register(&ledger, "user@example.com");

    ledger.deposit(user.id, dec!(7.77), "a").await.unwrap();
    ledger.withdraw(user.id, dec!(2.77), "b").await.unwrap();

    assert_eq!(ledger.balance_of(user.id).unwrap(), ledger.balance_of(user.id).unwrap());
    assert_eq!(ledger.history(user.id).unwrap(), ledger.history(user.id).unwrap());
}

#[tokio::test]
async fn test_operation_metrics() {
    let (ledger, _temp) = open_ledger();
    let user = register(&ledger, "user@example.com");

    ledger.deposit(user.id, dec!(5.00), "a").await.unwrap();
    let _ = ledger.withdraw(user.id, dec!(9.00), "b").await;

    assert_eq!(ledger.metrics().statements_total.get(), 1);
    assert_eq!(ledger.metrics().insufficient_funds_total.get(), 1);
}
