use std::io::Read;
use std::pin::Pin;

use futures::stream::{self, Stream};
use serde::Deserialize;

use crate::domain::traits::TransactionStream;
use crate::domain::{Classification, Error, Instruction, Money};

pub struct CsvReader<R: Read> {
    reader: Option<csv::Reader<R>>,
}

impl<R: Read> CsvReader<R> {
    pub fn new(reader: R) -> Self {
        let rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        Self { reader: Some(rdr) }
    }
}

/// Internal shape used only for CSV deserialization.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "type")]
    kind: String,
    owner: String,
    #[serde(default)]
    amount: Option<Money>,
    #[serde(default)]
    to: Option<String>,
    #[serde(default)]
    class: Option<String>,
    #[serde(default)]
    limit: Option<Money>,
}

impl TryFrom<CsvRow> for Instruction {
    type Error = Error;

    fn try_from(row: CsvRow) -> Result<Self, Self::Error> {
        let owner = row.owner;
        if owner.is_empty() {
            return Err(Error::Ingestion("missing owner".to_string()));
        }

        let instruction = match (row.kind.to_ascii_lowercase().as_str(), row.amount) {
            ("open", Some(balance)) => Instruction::Open {
                owner,
                balance,
                classification: row
                    .class
                    .as_deref()
                    .unwrap_or_default()
                    .parse::<Classification>()?,
                withdrawal_limit: row.limit,
            },
            ("deposit", Some(amount)) => Instruction::Deposit { owner, amount },
            ("withdrawal", Some(amount)) => Instruction::Withdrawal { owner, amount },
            ("transfer", Some(amount)) => match row.to.filter(|to| !to.is_empty()) {
                Some(to) => Instruction::Transfer { owner, to, amount },
                None => {
                    return Err(Error::InvalidRequest(format!(
                        "transfer from {} has no destination",
                        owner
                    )));
                }
            },
            (kind @ ("open" | "deposit" | "withdrawal" | "transfer"), None) => {
                return Err(Error::Ingestion(format!("{} for {} has no amount", kind, owner)));
            }
            (other, _) => {
                return Err(Error::Ingestion(format!(
                    "Invalid transaction type: {}",
                    other
                )));
            }
        };

        Ok(instruction)
    }
}

impl<R: Read + Send + 'static> TransactionStream for CsvReader<R> {
    type TxStream = Pin<Box<dyn Stream<Item = Result<Instruction, Error>> + Send>>;

    fn stream(&mut self) -> Self::TxStream {
        let reader = match self.reader.take() {
            Some(r) => r,
            None => {
                // Already consumed; return an empty stream.
                return Box::pin(stream::iter(Vec::<Result<Instruction, Error>>::new()));
            }
        };

        let iter = reader
            .into_deserialize::<CsvRow>()
            .map(|row_res| match row_res {
                Ok(row) => Instruction::try_from(row),
                Err(e) => Err(Error::Ingestion(format!(
                    "CSV deserialization error: {}",
                    e
                ))),
            });

        Box::pin(stream::iter(iter))
    }
}
