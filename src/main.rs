use std::{env, fs::File, path::Path};

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use bank_ledger::dlq::LogDLQ;
use bank_ledger::ingestion::CsvReader;
use bank_ledger::output_repository::StdOutBank;
use bank_ledger::runner::Runner;
use bank_ledger::{AccountLimits, Engine};

#[tokio::main] // using Tokio runtime for async
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let file_path = env::args()
        .nth(1)
        .ok_or("usage: bank_ledger <instructions.csv>")?;
    let file = File::open(Path::new(&file_path))?;

    let mut runner = Runner::new(
        CsvReader::new(file),
        StdOutBank::new(file_path),
        LogDLQ::default(),
        Engine::new(AccountLimits),
    );

    runner.process().await?;
    runner.flush().await?;

    Ok(())
}
