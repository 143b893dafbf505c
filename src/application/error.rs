use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::domain::{format_cents, Cents, TransactionError};

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid amount: {} (amounts must not be negative)", format_cents(.0.to_owned()))]
    InvalidAmount(Cents),

    #[error("Cannot open {} for writing: {source}", path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed writing to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<TransactionError> for LedgerError {
    fn from(err: TransactionError) -> Self {
        match err {
            TransactionError::InvalidAmount(amount) => LedgerError::InvalidAmount(amount),
        }
    }
}
