use crate::domain::{Error, Money, Transaction, TransactionStatus};

/// An account's stored balance together with its append-only history.
///
/// Records are only ever appended (or, once, prefixed with the opening
/// balance) by the commit protocol; nothing is reordered or removed.
#[derive(Debug)]
pub struct Ledger {
    balance: Money,
    transactions: Vec<Transaction>,
}

impl Ledger {
    pub fn new(balance: Money) -> Self {
        Self {
            balance,
            transactions: Vec::new(),
        }
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn with_status(&self, status: TransactionStatus) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter().filter(move |t| t.status() == status)
    }

    /// Sum of every COMPLETE, non-transfer record, or `None` if it leaves the `Money` range.
    pub fn reconciled_sum(&self) -> Option<Money> {
        Money::checked_sum(
            self.transactions
                .iter()
                .filter(|t| t.counts_toward_balance())
                .map(|t| t.amount),
        )
    }

    /// Inserts the OPENING_BALANCE baseline unless a settled record already exists.
    /// Returns whether a record was inserted.
    pub(crate) fn ensure_opening_balance(&mut self) -> bool {
        if self.transactions.iter().any(|t| t.status().is_terminal()) {
            return false;
        }

        self.transactions
            .insert(0, Transaction::opening_balance(self.balance));
        true
    }

    /// Appends a record and returns its position.
    pub(crate) fn append(&mut self, transaction: Transaction) -> usize {
        self.transactions.push(transaction);
        self.transactions.len() - 1
    }

    /// Settles the record at `index`, applying its amount to the balance
    /// only when it completes and counts toward the balance. A completion
    /// whose new balance would leave the `Money` range settles FAILED instead.
    pub(crate) fn finalize(
        &mut self,
        index: usize,
        status: TransactionStatus,
    ) -> Result<&Transaction, Error> {
        let record = self
            .transactions
            .get_mut(index)
            .ok_or_else(|| Error::Engine(format!("no ledger record at position {}", index)))?;

        let (status, balance) = match status {
            TransactionStatus::Complete if record.kind.affects_balance() => {
                match self.balance.checked_add(record.amount) {
                    Some(balance) => (status, balance),
                    None => (TransactionStatus::Failed, self.balance),
                }
            }
            _ => (status, self.balance),
        };

        record.settle(status)?;
        self.balance = balance;

        Ok(&self.transactions[index])
    }

    /// Out-of-band write that bypasses the ledger entirely.
    pub(crate) fn overwrite_balance(&mut self, balance: Money) {
        self.balance = balance;
    }
}
