use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use tokio::sync::{Mutex, MutexGuard};

use crate::domain::{Error, Ledger, Money, Transaction, reconcile};

static NEXT_ACCOUNT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique account identity. Also the global lock order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountId(u64);

impl AccountId {
    fn next() -> Self {
        Self(NEXT_ACCOUNT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl core::fmt::Display for AccountId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvestmentKind {
    Individual,
    Corporate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Classification {
    #[default]
    Checking,
    Investment(InvestmentKind),
}

impl std::str::FromStr for Classification {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "checking" => Ok(Classification::Checking),
            "individual" => Ok(Classification::Investment(InvestmentKind::Individual)),
            "corporate" => Ok(Classification::Investment(InvestmentKind::Corporate)),
            other => Err(Error::InvalidRequest(format!(
                "unknown account classification: {}",
                other
            ))),
        }
    }
}

#[derive(Debug)]
struct AccountInner {
    id: AccountId,
    owner: String,
    classification: Classification,
    withdrawal_limit: Option<Money>,
    ledger: Mutex<Ledger>,
}

/// Shared handle to one account. Clones refer to the same ledger.
#[derive(Debug, Clone)]
pub struct Account {
    inner: Arc<AccountInner>,
}

impl Account {
    pub fn open(owner: impl Into<String>, balance: Money, classification: Classification) -> Self {
        Self::build(owner.into(), balance, classification, None)
    }

    pub fn with_withdrawal_limit(
        owner: impl Into<String>,
        balance: Money,
        classification: Classification,
        limit: Money,
    ) -> Self {
        Self::build(owner.into(), balance, classification, Some(limit))
    }

    fn build(
        owner: String,
        balance: Money,
        classification: Classification,
        withdrawal_limit: Option<Money>,
    ) -> Self {
        Self {
            inner: Arc::new(AccountInner {
                id: AccountId::next(),
                owner,
                classification,
                withdrawal_limit,
                ledger: Mutex::new(Ledger::new(balance)),
            }),
        }
    }

    pub fn id(&self) -> AccountId {
        self.inner.id
    }

    pub fn owner(&self) -> &str {
        &self.inner.owner
    }

    pub fn classification(&self) -> Classification {
        self.inner.classification
    }

    pub fn withdrawal_limit(&self) -> Option<Money> {
        self.inner.withdrawal_limit
    }

    pub fn downgrade(&self) -> AccountRef {
        AccountRef {
            id: self.inner.id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub async fn balance(&self) -> Money {
        self.inner.ledger.lock().await.balance()
    }

    /// Ordered copy of the history as of now.
    pub async fn transactions(&self) -> Vec<Transaction> {
        self.inner.ledger.lock().await.transactions().to_vec()
    }

    pub async fn is_reconciled(&self) -> bool {
        reconcile(&*self.inner.ledger.lock().await).is_ok()
    }

    /// Overwrites the stored balance without recording anything.
    /// The next commit on this account will see the drift and fail.
    pub async fn adjust_balance(&self, balance: Money) {
        self.inner.ledger.lock().await.overwrite_balance(balance);
    }

    pub(crate) async fn lock(&self) -> MutexGuard<'_, Ledger> {
        self.inner.ledger.lock().await
    }
}

/// Non-owning reference to an account, as carried by transfers.
#[derive(Debug, Clone)]
pub struct AccountRef {
    id: AccountId,
    inner: Weak<AccountInner>,
}

impl AccountRef {
    pub fn id(&self) -> AccountId {
        self.id
    }

    pub fn upgrade(&self) -> Option<Account> {
        self.inner.upgrade().map(|inner| Account { inner })
    }
}

impl PartialEq for AccountRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_ordered() {
        let a = Account::open("a", Money::zero(), Classification::Checking);
        let b = Account::open("b", Money::zero(), Classification::Checking);
        assert!(a.id() < b.id());
        assert_eq!(a.clone().id(), a.id());
    }

    #[test]
    fn reference_does_not_keep_account_alive() {
        let account = Account::open("gone", Money::from(1), Classification::Checking);
        let reference = account.downgrade();
        assert!(reference.upgrade().is_some());

        drop(account);
        assert!(reference.upgrade().is_none());
    }

    #[test]
    fn parses_classification() {
        assert_eq!("checking".parse::<Classification>().unwrap(), Classification::Checking);
        assert_eq!(
            " Corporate ".parse::<Classification>().unwrap(),
            Classification::Investment(InvestmentKind::Corporate)
        );
        assert!("savings".parse::<Classification>().is_err());
    }
}
