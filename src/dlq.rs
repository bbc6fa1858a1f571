use tracing::warn;

use crate::domain::{DeadLetterQueue, Error};

#[derive(Default, Debug)]
pub struct LogDLQ {}

impl DeadLetterQueue for LogDLQ {
    fn report(&self, error: &Error) {
        warn!(%error, "dead letter");
    }
}
