use async_trait::async_trait;
use futures::Stream;

use crate::domain::{Account, Error, Instruction, Money, Rejection, TransactionKind};

pub trait TransactionStream {
    type TxStream: Stream<Item = Result<Instruction, Error>> + Send + Unpin + 'static;
    fn stream(&mut self) -> Self::TxStream;
}

pub trait DeadLetterQueue {
    fn report(&self, error: &Error);
}

#[async_trait]
pub trait AccountRepository {
    fn open_account(&mut self, account: Account) -> Result<&Account, Error>;

    fn get_account(&self, owner: &str) -> Option<&Account>;

    async fn flush(&mut self) -> Result<(), Error>;
}

/// Consulted by the commit protocol after a record is appended and before
/// the ledger is reconciled. A rejection fails the record; it is not a fault.
pub trait WithdrawalPolicy: Send + Sync {
    fn check(&self, account: &Account, kind: &TransactionKind, amount: Money) -> Result<(), Rejection>;
}
