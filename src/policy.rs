use crate::domain::{Account, Money, Rejection, TransactionKind, WithdrawalPolicy};

/// Allows every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unlimited;

impl WithdrawalPolicy for Unlimited {
    fn check(&self, _: &Account, _: &TransactionKind, _: Money) -> Result<(), Rejection> {
        Ok(())
    }
}

/// Enforces each account's own withdrawal limit, if it has one.
#[derive(Debug, Default, Clone, Copy)]
pub struct AccountLimits;

impl WithdrawalPolicy for AccountLimits {
    fn check(&self, account: &Account, kind: &TransactionKind, amount: Money) -> Result<(), Rejection> {
        let TransactionKind::Withdrawal = kind else {
            return Ok(());
        };

        match account.withdrawal_limit() {
            Some(limit) if amount.abs() > limit => Err(Rejection::LimitExceeded {
                requested: amount.abs(),
                limit,
            }),
            _ => Ok(()),
        }
    }
}
