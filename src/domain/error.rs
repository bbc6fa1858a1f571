use crate::domain::Money;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error("Ingestion failed with: {0}")]
    Ingestion(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Engine failed with: {0}")]
    Engine(String),
}

/// Why a recorded transaction ended FAILED. Never surfaced as a fault.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("ledger sums to {expected} but stored balance is {actual}")]
    Conflict { expected: Money, actual: Money },

    #[error("withdrawal of {requested} exceeds limit of {limit}")]
    LimitExceeded { requested: Money, limit: Money },

    #[error("amount leaves the representable range")]
    Overflow,
}
