//! CLI entry point for Poisson image blending

use clap::Parser;
use poissonblend::io::cli::Cli;

fn main() -> poissonblend::Result<()> {
    let cli = Cli::parse();
    cli.execute()
}
