//! Transfers as two legs committed under both ledger locks.
//!
//! Locks are always taken in ascending [`AccountId`](crate::domain::AccountId)
//! order, so opposite transfers between the same pair of accounts cannot
//! deadlock. Both legs are prepared before either is finalized: if either
//! one is rejected, both records and the TRANSFER entry end FAILED and no
//! balance moves.

use tokio::sync::MutexGuard;
use tracing::{debug, info};

use crate::domain::{
    Account, Error, Ledger, Money, Transaction, TransactionKind, TransactionStatus,
    WithdrawalPolicy,
};
use crate::engine::{finalize, prepare};

pub(crate) async fn execute<P>(
    source: &Account,
    destination: &Account,
    amount: Money,
    policy: &P,
) -> Result<Transaction, Error>
where
    P: WithdrawalPolicy + ?Sized,
{
    let (mut from, mut to) = lock_both(source, destination).await;

    from.ensure_opening_balance();
    to.ensure_opening_balance();

    let record = from.append(Transaction::pending(
        TransactionKind::Transfer {
            to: destination.downgrade(),
        },
        amount,
    ));

    let debit = prepare(&mut from, source, TransactionKind::Withdrawal, -amount, policy);
    let credit = prepare(&mut to, destination, TransactionKind::Deposit, amount, policy);

    let status = if debit.is_accepted() && credit.is_accepted() {
        TransactionStatus::Complete
    } else {
        if debit.is_accepted() || credit.is_accepted() {
            debug!(
                source = %source.id(),
                destination = %destination.id(),
                "one leg rejected, failing both"
            );
        }
        TransactionStatus::Failed
    };

    finalize(&mut from, source, debit, status)?;
    finalize(&mut to, destination, credit, status)?;
    let outcome = from.finalize(record, status)?.clone();

    info!(
        source = %source.id(),
        destination = %destination.id(),
        %amount,
        status = ?status,
        "transfer settled"
    );

    Ok(outcome)
}

/// Reads both balances at one instant with respect to transfers between them.
pub async fn observe(a: &Account, b: &Account) -> (Money, Money) {
    if a.id() == b.id() {
        let balance = a.balance().await;
        return (balance, balance);
    }

    let (a, b) = lock_both(a, b).await;
    (a.balance(), b.balance())
}

/// Locks two distinct ledgers in id order, returning the guards in argument order.
async fn lock_both<'a>(
    a: &'a Account,
    b: &'a Account,
) -> (MutexGuard<'a, Ledger>, MutexGuard<'a, Ledger>) {
    debug_assert_ne!(a.id(), b.id());

    if a.id() < b.id() {
        let first = a.lock().await;
        let second = b.lock().await;
        (first, second)
    } else {
        let second = b.lock().await;
        let first = a.lock().await;
        (first, second)
    }
}
