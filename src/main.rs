use anyhow::Result;
use clap::Parser;

use pbup::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    pbup::cli::run(cli)?;
    Ok(())
}
