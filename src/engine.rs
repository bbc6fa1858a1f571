use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::{
    Account, Error, Ledger, Money, Rejection, Transaction, TransactionKind, TransactionRequest,
    TransactionStatus, WithdrawalPolicy, reconcile,
};
use crate::policy::Unlimited;
use crate::transfer;

/// Applies transaction requests to accounts.
///
/// Every commit runs on its own tokio task while holding the target
/// account's ledger lock, so the reconcile-then-write sequence is atomic per
/// account and a caller that stops waiting cannot strand a PENDING record.
#[derive(Debug)]
pub struct Engine<P = Unlimited>
where
    P: WithdrawalPolicy,
{
    policy: Arc<P>,
}

impl<P: WithdrawalPolicy> Clone for Engine<P> {
    fn clone(&self) -> Self {
        Self {
            policy: Arc::clone(&self.policy),
        }
    }
}

impl Default for Engine<Unlimited> {
    fn default() -> Self {
        Self::new(Unlimited)
    }
}

impl<P> Engine<P>
where
    P: WithdrawalPolicy + 'static,
{
    pub fn new(policy: P) -> Self {
        Self {
            policy: Arc::new(policy),
        }
    }

    /// Takes `request` to a terminal status on `account` and returns the settled record.
    ///
    /// A FAILED record is a normal outcome. `Err` is returned only for requests
    /// that are rejected before anything is recorded. For a transfer, the
    /// returned record is the informational TRANSFER entry on the source
    /// ledger, whose status is the joint outcome of both legs.
    pub async fn apply_transaction(
        &self,
        account: &Account,
        request: TransactionRequest,
    ) -> Result<Transaction, Error> {
        let TransactionRequest { kind, amount } = request;
        let account = account.clone();
        let policy = Arc::clone(&self.policy);

        let task = match kind {
            TransactionKind::OpeningBalance => {
                return Err(Error::InvalidRequest(
                    "opening balances are recorded by the engine only".to_string(),
                ));
            }
            TransactionKind::Transfer { to } => {
                let destination = to.upgrade().ok_or_else(|| {
                    Error::InvalidRequest(format!("transfer destination {} no longer exists", to.id()))
                })?;
                if destination.id() == account.id() {
                    return Err(Error::InvalidRequest(format!(
                        "cannot transfer from account {} to itself",
                        account.id()
                    )));
                }
                tokio::spawn(async move {
                    transfer::execute(&account, &destination, amount, policy.as_ref()).await
                })
            }
            kind @ (TransactionKind::Deposit | TransactionKind::Withdrawal) => {
                tokio::spawn(async move { commit(&account, kind, amount, policy.as_ref()).await })
            }
        };

        task.await
            .map_err(|e| Error::Engine(format!("commit task did not finish: {}", e)))?
    }
}

async fn commit<P>(
    account: &Account,
    kind: TransactionKind,
    amount: Money,
    policy: &P,
) -> Result<Transaction, Error>
where
    P: WithdrawalPolicy + ?Sized,
{
    let mut ledger = account.lock().await;
    let leg = prepare(&mut ledger, account, kind, amount, policy);
    let status = if leg.is_accepted() {
        TransactionStatus::Complete
    } else {
        TransactionStatus::Failed
    };
    finalize(&mut ledger, account, leg, status)
}

/// A PENDING record on one ledger together with the decision reached for it.
#[derive(Debug)]
pub(crate) struct PreparedLeg {
    index: usize,
    verdict: Result<(), Rejection>,
}

impl PreparedLeg {
    pub(crate) fn is_accepted(&self) -> bool {
        self.verdict.is_ok()
    }
}

/// Synthesizes the opening balance if needed, appends the PENDING record and
/// decides it. The caller must hold the ledger lock through `finalize`.
pub(crate) fn prepare<P>(
    ledger: &mut Ledger,
    account: &Account,
    kind: TransactionKind,
    amount: Money,
    policy: &P,
) -> PreparedLeg
where
    P: WithdrawalPolicy + ?Sized,
{
    if ledger.ensure_opening_balance() {
        debug!(account = %account.id(), balance = %ledger.balance(), "opening balance recorded");
    }

    let index = ledger.append(Transaction::pending(kind, amount));
    let record = &ledger.transactions()[index];
    debug!(account = %account.id(), transaction = %record, "pending");

    let verdict = policy
        .check(account, &record.kind, record.amount)
        .and_then(|()| reconcile(&*ledger))
        .and_then(|()| match ledger.balance().checked_add(record.amount) {
            Some(_) => Ok(()),
            None => Err(Rejection::Overflow),
        });

    PreparedLeg { index, verdict }
}

pub(crate) fn finalize(
    ledger: &mut Ledger,
    account: &Account,
    leg: PreparedLeg,
    status: TransactionStatus,
) -> Result<Transaction, Error> {
    let record = ledger.finalize(leg.index, status)?.clone();

    match (record.status(), leg.verdict) {
        (TransactionStatus::Complete, _) => info!(
            account = %account.id(),
            owner = account.owner(),
            transaction = %record,
            balance = %ledger.balance(),
            "committed"
        ),
        (_, Err(reason)) => warn!(
            account = %account.id(),
            owner = account.owner(),
            transaction = %record,
            %reason,
            "rejected"
        ),
        (_, Ok(())) => warn!(
            account = %account.id(),
            owner = account.owner(),
            transaction = %record,
            "failed with its counterpart leg"
        ),
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Classification;
    use crate::policy::AccountLimits;

    #[tokio::test]
    async fn deposit_synthesizes_opening_balance() {
        let engine: Engine = Engine::default();
        let account = Account::open("Alice", Money::from(1000), Classification::Checking);

        let tx = engine
            .apply_transaction(&account, TransactionRequest::deposit(Money::from(200)))
            .await
            .unwrap();

        assert_eq!(tx.status(), TransactionStatus::Complete);
        assert_eq!(tx.kind, TransactionKind::Deposit);
        assert_eq!(account.balance().await, Money::from(1200));

        let history = account.transactions().await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].kind, TransactionKind::OpeningBalance);
        assert_eq!(history[0].amount, Money::from(1000));
    }

    #[tokio::test]
    async fn opening_balance_request_is_refused() {
        let engine: Engine = Engine::default();
        let account = Account::open("Alice", Money::from(1000), Classification::Checking);
        let request = TransactionRequest {
            kind: TransactionKind::OpeningBalance,
            amount: Money::from(5),
        };

        assert!(matches!(
            engine.apply_transaction(&account, request).await,
            Err(Error::InvalidRequest(_))
        ));
        assert!(account.transactions().await.is_empty());
    }

    #[tokio::test]
    async fn limit_rejection_is_recorded_as_failed() {
        let engine = Engine::new(AccountLimits);
        let account = Account::with_withdrawal_limit(
            "Bob",
            Money::from(2000),
            Classification::Checking,
            Money::from(500),
        );

        let tx = engine
            .apply_transaction(&account, TransactionRequest::withdrawal(Money::from(-700)))
            .await
            .unwrap();

        assert_eq!(tx.status(), TransactionStatus::Failed);
        assert_eq!(account.balance().await, Money::from(2000));
        assert!(account.is_reconciled().await);
    }
}
