use futures::StreamExt;
use tracing::info;

use crate::domain::{
    Account, AccountRepository, DeadLetterQueue, Error, Instruction, TransactionRequest,
    TransactionStream, WithdrawalPolicy,
};
use crate::engine::Engine;

/// Replays a stream of instructions against a bank, one at a time.
#[derive(Debug)]
pub struct Runner<I, O, D, P>
where
    I: TransactionStream,
    O: AccountRepository,
    D: DeadLetterQueue,
    P: WithdrawalPolicy,
{
    ingestion: I,
    bank: O,
    dlq: D,
    engine: Engine<P>,
}

impl<I, O, D, P> Runner<I, O, D, P>
where
    I: TransactionStream,
    O: AccountRepository,
    D: DeadLetterQueue,
    P: WithdrawalPolicy + 'static,
{
    pub fn new(ingestion: I, bank: O, dlq: D, engine: Engine<P>) -> Self {
        Self {
            ingestion,
            bank,
            dlq,
            engine,
        }
    }

    pub async fn process(&mut self) -> Result<(), Error> {
        let mut res = self.ingestion.stream();

        while let Some(instruction) = res.next().await {
            match instruction {
                Ok(instruction) => match self.apply(instruction).await {
                    Ok(()) => {}
                    Err(e) => self.dlq.report(&e),
                },
                Err(e) => self.dlq.report(&e),
            }
        }

        Ok(())
    }

    async fn apply(&mut self, instruction: Instruction) -> Result<(), Error> {
        let (account, request) = match instruction {
            Instruction::Open {
                owner,
                balance,
                classification,
                withdrawal_limit,
            } => {
                let account = match withdrawal_limit {
                    Some(limit) => Account::with_withdrawal_limit(owner, balance, classification, limit),
                    None => Account::open(owner, balance, classification),
                };
                let account = self.bank.open_account(account)?;
                info!(account = %account.id(), owner = account.owner(), "opened");
                return Ok(());
            }
            Instruction::Deposit { owner, amount } => {
                (self.resolve(&owner)?, TransactionRequest::deposit(amount))
            }
            Instruction::Withdrawal { owner, amount } => {
                (self.resolve(&owner)?, TransactionRequest::withdrawal(amount))
            }
            Instruction::Transfer { owner, to, amount } => {
                let destination = self.resolve(&to)?;
                (
                    self.resolve(&owner)?,
                    TransactionRequest::transfer(amount, &destination),
                )
            }
        };

        self.engine.apply_transaction(&account, request).await?;
        Ok(())
    }

    fn resolve(&self, owner: &str) -> Result<Account, Error> {
        self.bank
            .get_account(owner)
            .cloned()
            .ok_or_else(|| Error::InvalidRequest(format!("no account for {}", owner)))
    }

    pub async fn flush(&mut self) -> Result<(), Error> {
        self.bank.flush().await
    }
}
