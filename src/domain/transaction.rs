use chrono::{DateTime, Utc};

use crate::domain::{Account, AccountRef, Error, Money};

#[derive(Debug, Clone, PartialEq)]
pub enum TransactionKind {
    /// Baseline entry explaining the balance an account was opened with.
    OpeningBalance,
    Deposit,
    Withdrawal,
    /// Informational record on the source ledger. The balance effect is
    /// carried by the withdrawal/deposit legs.
    Transfer { to: AccountRef },
}

impl TransactionKind {
    /// Whether a COMPLETE record of this kind counts toward the reconciled balance.
    pub fn affects_balance(&self) -> bool {
        !matches!(self, TransactionKind::Transfer { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Complete,
    Failed,
}

impl TransactionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }
}

/// What a caller asks the engine to do. Amount signs are the caller's:
/// withdrawals are expected to carry a negative amount.
#[derive(Debug, Clone)]
pub struct TransactionRequest {
    pub kind: TransactionKind,
    pub amount: Money,
}

impl TransactionRequest {
    pub fn deposit(amount: Money) -> Self {
        Self {
            kind: TransactionKind::Deposit,
            amount,
        }
    }

    pub fn withdrawal(amount: Money) -> Self {
        Self {
            kind: TransactionKind::Withdrawal,
            amount,
        }
    }

    pub fn transfer(amount: Money, to: &Account) -> Self {
        Self {
            kind: TransactionKind::Transfer { to: to.downgrade() },
            amount,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Transaction {
    pub kind: TransactionKind,
    pub amount: Money,
    pub created_at: DateTime<Utc>,
    status: TransactionStatus,
}

impl Transaction {
    pub(crate) fn pending(kind: TransactionKind, amount: Money) -> Self {
        Self {
            kind,
            amount,
            created_at: Utc::now(),
            status: TransactionStatus::Pending,
        }
    }

    pub(crate) fn opening_balance(amount: Money) -> Self {
        Self {
            kind: TransactionKind::OpeningBalance,
            amount,
            created_at: Utc::now(),
            status: TransactionStatus::Complete,
        }
    }

    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    /// Moves a PENDING record to a terminal status. Terminal records never change again.
    pub(crate) fn settle(&mut self, status: TransactionStatus) -> Result<(), Error> {
        if self.status.is_terminal() || !status.is_terminal() {
            return Err(Error::Engine(format!(
                "illegal status transition {:?} -> {:?}",
                self.status, status
            )));
        }
        self.status = status;
        Ok(())
    }

    pub fn counts_toward_balance(&self) -> bool {
        self.status == TransactionStatus::Complete && self.kind.affects_balance()
    }
}

impl core::fmt::Display for Transaction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self.kind {
            TransactionKind::Transfer { to } => write!(
                f,
                "Transfer,to={},amount={},status={:?}",
                to.id(),
                self.amount,
                self.status
            ),
            kind => write!(f, "{:?},amount={},status={:?}", kind, self.amount, self.status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_settles_exactly_once() {
        let mut tx = Transaction::pending(TransactionKind::Deposit, Money::from(10));
        assert!(tx.settle(TransactionStatus::Pending).is_err());
        tx.settle(TransactionStatus::Complete).unwrap();
        assert_eq!(tx.status(), TransactionStatus::Complete);
        assert!(tx.settle(TransactionStatus::Failed).is_err());
        assert_eq!(tx.status(), TransactionStatus::Complete);
    }

    #[test]
    fn transfer_records_do_not_count() {
        let account = Account::open("Alice", Money::from(1), Default::default());
        let mut tx = Transaction::pending(
            TransactionKind::Transfer {
                to: account.downgrade(),
            },
            Money::from(5),
        );
        tx.settle(TransactionStatus::Complete).unwrap();
        assert!(!tx.counts_toward_balance());

        let opening = Transaction::opening_balance(Money::from(5));
        assert!(opening.counts_toward_balance());
    }
}
