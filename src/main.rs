use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = secretfile::cli::Cli::parse();
    cli.run()
}
