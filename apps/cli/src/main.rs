//! docrender CLI: render compiled documentation pages to HTML.
//!
//! Resolves every content tag through a configurable component mapping and
//! writes a static HTML site with a manifest and per-page TOCs.

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
