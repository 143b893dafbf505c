use std::fmt;

use chrono::{NaiveDateTime, SubsecRound};
use serde::Serialize;
use thiserror::Error;

use super::{format_cents, Cents};

/// Layout of the timestamp part of a formatted transaction, e.g. "Tue Jan 02 2024 at 10:00:00".
pub const TIMESTAMP_FORMAT: &str = "%a %b %d %Y at %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money coming in
    Deposit,
    /// Money going out
    Withdrawal,
}

impl TransactionKind {
    /// Name used in formatted lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "Deposit",
            TransactionKind::Withdrawal => "Withdrawal",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("Invalid amount: {} (amounts must not be negative)", format_cents(.0.to_owned()))]
    InvalidAmount(Cents),
}

/// A single deposit or withdrawal.
///
/// Transactions are immutable: every field is fixed when the value is built and
/// only exposed through accessors. The sign of a movement is carried by `kind`,
/// so `amount` is never negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    /// Local wall-clock time of the event, whole seconds
    timestamp: NaiveDateTime,
    amount: Cents,
    kind: TransactionKind,
}

impl Transaction {
    /// Build a transaction. Sub-second precision in `timestamp` is dropped.
    pub fn new(
        timestamp: NaiveDateTime,
        amount: Cents,
        kind: TransactionKind,
    ) -> Result<Self, TransactionError> {
        if amount < 0 {
            return Err(TransactionError::InvalidAmount(amount));
        }
        Ok(Self {
            timestamp: timestamp.trunc_subsecs(0),
            amount,
            kind,
        })
    }

    pub fn deposit(timestamp: NaiveDateTime, amount: Cents) -> Result<Self, TransactionError> {
        Self::new(timestamp, amount, TransactionKind::Deposit)
    }

    pub fn withdrawal(timestamp: NaiveDateTime, amount: Cents) -> Result<Self, TransactionError> {
        Self::new(timestamp, amount, TransactionKind::Withdrawal)
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub fn amount(&self) -> Cents {
        self.amount
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    /// Render the transaction as a single log line:
    /// `Deposit: R100.50 on Tue Jan 02 2024 at 10:00:00`
    pub fn format(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: R{} on {}",
            self.kind,
            format_cents(self.amount),
            self.timestamp.format(TIMESTAMP_FORMAT)
        )
    }
}
