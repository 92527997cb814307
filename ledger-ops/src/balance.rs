//! Balance derivation
//!
//! Balance is a pure function of the statement history: deposits and received
//! transfers count positive, withdrawals and sent transfers count negative.
//! Consistency with a mutating operation comes from folding while that user's
//! exclusion scope is held.

use ledger_store::{Result, Statement};
use rust_decimal::Decimal;

/// Fold a statement sequence into its signed sum
pub fn signed_sum<I>(statements: I) -> Result<Decimal>
where
    I: IntoIterator<Item = Result<Statement>>,
{
    let mut balance = Decimal::ZERO;
    for statement in statements {
        balance += statement?.signed_amount();
    }
    Ok(balance)
}
