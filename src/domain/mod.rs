pub mod account;
pub mod error;
pub mod instruction;
pub mod ledger;
pub mod money;
pub mod reconcile;
pub mod traits;
pub mod transaction;

pub use account::{Account, AccountId, AccountRef, Classification, InvestmentKind};
pub use error::{Error, Rejection};
pub use instruction::Instruction;
pub use ledger::Ledger;
pub use money::Money;
pub use reconcile::reconcile;
pub use traits::{AccountRepository, DeadLetterQueue, TransactionStream, WithdrawalPolicy};
pub use transaction::{Transaction, TransactionKind, TransactionRequest, TransactionStatus};
