use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::application::Ledger;

mod session;

pub use session::*;

/// Tally - deposit and withdrawal log
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Record deposits and withdrawals and export them as a plain-text log")]
#[command(version)]
pub struct Cli {
    /// Default destination for `export` without a path
    #[arg(short, long, default_value = "transactions.txt")]
    pub output: PathBuf,

    /// Read commands from a file instead of stdin
    #[arg(short, long)]
    pub script: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let ledger = Ledger::new();
        let session = Session::new(&ledger, self.output);

        match self.script {
            Some(path) => {
                let file = File::open(&path)
                    .with_context(|| format!("Failed to open script: {}", path.display()))?;
                let summary = session.run(BufReader::new(file), io::stdout(), io::stderr())?;
                if summary.failed > 0 {
                    anyhow::bail!(
                        "{} of {} commands failed in {}",
                        summary.failed,
                        summary.executed + summary.failed,
                        path.display()
                    );
                }
            }
            None => {
                session.run(io::stdin().lock(), io::stdout(), io::stderr())?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["tally"]);
        assert_eq!(cli.output, PathBuf::from("transactions.txt"));
        assert_eq!(cli.script, None);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from(["tally", "-vv", "--output", "log.txt", "--script", "in.txt"]);
        assert_eq!(cli.output, PathBuf::from("log.txt"));
        assert_eq!(cli.script, Some(PathBuf::from("in.txt")));
        assert_eq!(cli.verbose, 2);
    }
}
