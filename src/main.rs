use anyhow::Result;
use clap::Parser;
use tally::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    tally::telemetry::init(cli.verbose);
    cli.run()
}
