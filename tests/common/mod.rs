// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDateTime;
use tally::Ledger;
use tempfile::TempDir;

/// Helper to create an empty ledger plus a scratch directory for exports
pub fn test_ledger() -> Result<(Ledger, TempDir)> {
    Ok((Ledger::new(), TempDir::new()?))
}

/// Helper to parse a `YYYY-MM-DDTHH:MM:SS` string
pub fn parse_timestamp(input: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S").unwrap()
}

/// Records the deposit of 100.50 and the withdrawal of 50 used across tests.
pub fn record_sample(ledger: &Ledger) -> Result<()> {
    ledger.record_deposit(10050, parse_timestamp("2024-01-02T10:00:00"))?;
    ledger.record_withdrawal(5000, parse_timestamp("2024-01-02T10:05:00"))?;
    Ok(())
}

pub const SAMPLE_LINES: [&str; 2] = [
    "Deposit: R100.50 on Tue Jan 02 2024 at 10:00:00",
    "Withdrawal: R50.00 on Tue Jan 02 2024 at 10:05:00",
];
