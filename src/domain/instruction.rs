use crate::domain::{Classification, Money};

/// One line of a replay script, with accounts still named by owner.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Open {
        owner: String,
        balance: Money,
        classification: Classification,
        withdrawal_limit: Option<Money>,
    },
    Deposit {
        owner: String,
        amount: Money,
    },
    Withdrawal {
        owner: String,
        amount: Money,
    },
    Transfer {
        owner: String,
        to: String,
        amount: Money,
    },
}
