//! InsolvencyCheck CLI: one company name in, one evidence report out.
//!
//! Resolves the name against the corporate registry, gathers insolvency
//! cases, filings, and legal notices, and writes a PDF report.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
