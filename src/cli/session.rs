use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::error::ErrorKind;
use clap::{ColorChoice, Parser, Subcommand};
use thiserror::Error;

use crate::application::{Ledger, LedgerError};
use crate::domain::{parse_cents, Cents, Transaction};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Unbalanced quotes in '{0}'")]
    UnbalancedQuotes(String),

    #[error(transparent)]
    Usage(#[from] clap::Error),
}

impl SessionError {
    /// True when the line asked for help rather than being malformed.
    pub fn is_help(&self) -> bool {
        matches!(self, SessionError::Usage(err) if err.kind() == ErrorKind::DisplayHelp)
    }
}

/// One line of session input, parsed with the same clap machinery as the command line.
#[derive(Parser, Debug)]
#[command(
    name = "tally",
    no_binary_name = true,
    disable_version_flag = true,
    color = ColorChoice::Never,
    after_help = "Amounts look like 50, 50.5 or 50.50. Timestamps are YYYY-MM-DDTHH:MM:SS or\n\
                  YYYY-MM-DD and default to the current local time. Quote paths containing spaces."
)]
struct SessionLine {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Record a deposit
    Deposit {
        /// Amount (e.g., "50.00" or "50")
        #[arg(value_parser = parse_cents, allow_negative_numbers = true)]
        amount: Cents,

        /// When it happened (defaults to now)
        #[arg(value_parser = parse_timestamp)]
        timestamp: Option<NaiveDateTime>,
    },

    /// Record a withdrawal
    #[command(alias = "withdraw")]
    Withdrawal {
        /// Amount (e.g., "50.00" or "50")
        #[arg(value_parser = parse_cents, allow_negative_numbers = true)]
        amount: Cents,

        /// When it happened (defaults to now)
        #[arg(value_parser = parse_timestamp)]
        timestamp: Option<NaiveDateTime>,
    },

    /// Show recorded transactions
    List,

    /// Write the text log
    Export {
        /// Destination (the configured output file if omitted)
        path: Option<PathBuf>,
    },

    /// Write a JSON snapshot
    ExportJson {
        /// Destination file
        path: PathBuf,
    },

    /// End the session
    #[command(alias = "exit")]
    Quit,
}

impl FromStr for Command {
    type Err = SessionError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words =
            shlex::split(line).ok_or_else(|| SessionError::UnbalancedQuotes(line.to_string()))?;
        Ok(SessionLine::try_parse_from(words)?.command)
    }
}

/// Parse `YYYY-MM-DDTHH:MM:SS`, or `YYYY-MM-DD` as midnight.
fn parse_timestamp(input: &str) -> Result<NaiveDateTime, String> {
    if let Ok(ts) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S") {
        return Ok(ts);
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| "use YYYY-MM-DDTHH:MM:SS or YYYY-MM-DD".to_string())
}

/// Result of executing a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Recorded(Transaction),
    Listed(Vec<Transaction>),
    Exported { path: PathBuf, count: usize },
    Quit,
}

/// Counters reported when a session ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub executed: usize,
    pub failed: usize,
}

/// Drives a ledger from textual commands.
pub struct Session<'a> {
    ledger: &'a Ledger,
    default_output: PathBuf,
}

impl<'a> Session<'a> {
    pub fn new(ledger: &'a Ledger, default_output: impl Into<PathBuf>) -> Self {
        Self {
            ledger,
            default_output: default_output.into(),
        }
    }

    pub fn execute(&self, command: Command) -> Result<Outcome, LedgerError> {
        match command {
            Command::Deposit { amount, timestamp } => {
                let timestamp = timestamp.unwrap_or_else(now);
                Ok(Outcome::Recorded(
                    self.ledger.record_deposit(amount, timestamp)?,
                ))
            }
            Command::Withdrawal { amount, timestamp } => {
                let timestamp = timestamp.unwrap_or_else(now);
                Ok(Outcome::Recorded(
                    self.ledger.record_withdrawal(amount, timestamp)?,
                ))
            }
            Command::List => Ok(Outcome::Listed(self.ledger.list())),
            Command::Export { path } => {
                let path = path.unwrap_or_else(|| self.default_output.clone());
                let count = self.ledger.export_to(&path)?;
                Ok(Outcome::Exported { path, count })
            }
            Command::ExportJson { path } => {
                let count = self.ledger.export_json_to(&path)?;
                Ok(Outcome::Exported { path, count })
            }
            Command::Quit => Ok(Outcome::Quit),
        }
    }

    /// Read commands from `input` until it ends or a `quit` command.
    /// Bad commands are reported on `errors` and do not stop the session.
    pub fn run<R, W, E>(&self, input: R, mut out: W, mut errors: E) -> io::Result<SessionSummary>
    where
        R: BufRead,
        W: Write,
        E: Write,
    {
        let mut summary = SessionSummary::default();

        for (index, line) in input.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let result = match line.parse::<Command>() {
                Ok(command) => self.execute(command).map_err(|e| e.to_string()),
                Err(err) if err.is_help() => {
                    summary.executed += 1;
                    write!(out, "{}", err)?;
                    continue;
                }
                Err(err) => Err(err.to_string()),
            };

            match result {
                Ok(outcome) => {
                    summary.executed += 1;
                    if !print_outcome(&mut out, &outcome)? {
                        break;
                    }
                }
                Err(message) => {
                    summary.failed += 1;
                    // clap appends usage lines; the first line carries the error
                    let message = message.lines().next().unwrap_or_default();
                    writeln!(errors, "line {}: {}", index + 1, message)?;
                }
            }
        }

        out.flush()?;
        Ok(summary)
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Returns false once the session should stop.
fn print_outcome<W: Write>(out: &mut W, outcome: &Outcome) -> io::Result<bool> {
    match outcome {
        Outcome::Recorded(transaction) => writeln!(out, "Recorded {}", transaction)?,
        Outcome::Listed(transactions) if transactions.is_empty() => {
            writeln!(out, "No transactions recorded.")?
        }
        Outcome::Listed(transactions) => {
            for transaction in transactions {
                writeln!(out, "{}", transaction)?;
            }
        }
        Outcome::Exported { path, count } => {
            writeln!(out, "Exported {} transactions to {}", count, path.display())?
        }
        Outcome::Quit => return Ok(false),
    }
    Ok(true)
}
