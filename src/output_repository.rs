use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::io::Write;

use async_trait::async_trait;

use crate::domain::{Account, AccountRepository, Error, TransactionStatus, reconcile};

/// In-memory bank that prints its account table to stdout on flush.
#[derive(Debug, Default)]
pub struct StdOutBank {
    name: String,
    accounts: Vec<Account>,
    by_owner: HashMap<String, usize>,
}

impl StdOutBank {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            accounts: Vec::new(),
            by_owner: HashMap::new(),
        }
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    /// Renders `owner,balance,complete,failed,reconciled` rows in opening order.
    pub async fn render<W: Write>(&self, out: &mut W) -> Result<(), Error> {
        writeln!(out, "owner,balance,complete,failed,reconciled")?;
        for account in &self.accounts {
            let ledger = account.lock().await;
            writeln!(
                out,
                "{},{},{},{},{}",
                account.owner(),
                ledger.balance(),
                ledger.with_status(TransactionStatus::Complete).count(),
                ledger.with_status(TransactionStatus::Failed).count(),
                reconcile(&ledger).is_ok()
            )?;
        }
        Ok(())
    }
}

#[async_trait]
impl AccountRepository for StdOutBank {
    fn open_account(&mut self, account: Account) -> Result<&Account, Error> {
        match self.by_owner.entry(account.owner().to_string()) {
            Entry::Vacant(e) => {
                e.insert(self.accounts.len());
                self.accounts.push(account);
                Ok(&self.accounts[self.accounts.len() - 1])
            }
            Entry::Occupied(_) => Err(Error::InvalidRequest(format!(
                "Account for {} already exists in {}",
                account.owner(),
                self.name
            ))),
        }
    }

    fn get_account(&self, owner: &str) -> Option<&Account> {
        self.by_owner.get(owner).map(|&i| &self.accounts[i])
    }

    async fn flush(&mut self) -> Result<(), Error> {
        let mut buf = Vec::new();
        self.render(&mut buf).await?;
        std::io::stdout().lock().write_all(&buf)?;
        Ok(())
    }
}
