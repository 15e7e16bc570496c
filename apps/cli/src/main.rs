//! classfetch CLI: find and plan downloads of classroom attachments.
//!
//! Scans a saved coursework page for document attachments and turns a
//! selection of them into concrete download requests.

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
