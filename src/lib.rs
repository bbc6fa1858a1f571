//! In-memory bank ledger.
//!
//! Accounts hold a balance and an append-only history. Every request is
//! recorded PENDING, checked against the completed history and settled
//! COMPLETE or FAILED under the account's lock; transfers settle both legs
//! together under both locks.

pub mod dlq;
pub mod domain;
pub mod engine;
pub mod ingestion;
pub mod output_repository;
pub mod policy;
pub mod runner;
pub mod transfer;

pub use domain::{
    Account, AccountId, AccountRef, Classification, Error, InvestmentKind, Money, Rejection,
    Transaction, TransactionKind, TransactionRequest, TransactionStatus,
};
pub use engine::Engine;
pub use policy::{AccountLimits, Unlimited};
