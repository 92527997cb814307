//! Property-based tests for ledger invariants
//!
//! These tests use proptest to verify critical invariants:
//! - Balance equals the signed sum of the accepted statement history
//! - Balance never goes negative as an observed post-state
//! - Withdrawals are rejected exactly when they would overdraw
//! - Reads are idempotent

use ledger_ops::{ExclusionConfig, Ledger};
use ledger_store::{Error, Storage};
use proptest::prelude::*;
use rust_decimal::Decimal;
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

/// An operation drawn for a sequence: deposit or withdraw of some cents
fn op_strategy() -> impl Strategy<Value = (bool, u64)> {
    (any::<bool>(), 1u64..10_000u64)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_balance_matches_signed_sum(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let (ledger, _temp) = open_ledger();
            let user = ledger
                .register_user("Prop User", "prop@example.com", "credential-hash")
                .unwrap();

            let mut expected_cents: i64 = 0;
            for (is_deposit, cents) in ops {
                let amount = Decimal::new(cents as i64, 2);
                if is_deposit {
                    ledger.deposit(user.id, amount, "deposit").await.unwrap();
                    expected_cents += cents as i64;
                } else if (cents as i64) <= expected_cents {
                    prop_assert!(ledger.withdraw(user.id, amount, "withdraw").await.is_ok());
                    expected_cents -= cents as i64;
                } else {
                    let result = ledger.withdraw(user.id, amount, "withdraw").await;
                    prop_assert!(matches!(result, Err(Error::InsufficientFunds { .. })));
                }

                // Never negative as an observed post-state
                prop_assert!(ledger.balance_of(user.id).unwrap() >= Decimal::ZERO);
            }

            let balance = ledger.balance_of(user.id).unwrap();
            prop_assert_eq!(balance, Decimal::new(expected_cents, 2));

            // Idempotent reads
            prop_assert_eq!(ledger.balance_of(user.id).unwrap(), balance);
            prop_assert_eq!(ledger.history(user.id).unwrap(), ledger.history(user.id).unwrap());

            Ok(())
        })?;
    }

    #[test]
    fn prop_transfer_conserves_money(transfers in prop::collection::vec(1u64..500u64, 1..20)) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let (ledger, _temp) = open_ledger();
            let payer = ledger
                .register_user("Payer", "payer@example.com", "credential-hash")
                .unwrap();
            let payee = ledger
                .register_user("Payee", "payee@example.com", "credential-hash")
                .unwrap();

            let stake = Decimal::new(100_00, 2);
            ledger.deposit(payer.id, stake, "stake").await.unwrap();

            for cents in transfers {
                let amount = Decimal::new(cents as i64, 2);
                let available = ledger.balance_of(payer.id).unwrap();
                let result = ledger.transfer(payer.id, payee.id, amount, "swap").await;
                if amount <= available {
                    prop_assert!(result.is_ok());
                } else {
                    prop_assert!(matches!(result, Err(Error::InsufficientFunds { .. })));
                }
            }

            // Money moves between the pair but the total never changes
            let total = ledger.balance_of(payer.id).unwrap() + ledger.balance_of(payee.id).unwrap();
            prop_assert_eq!(total, stake);

            Ok(())
        })?;
    }
}
