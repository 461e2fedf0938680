//! instructgen CLI: browse a remote catalog of Copilot instruction
//! templates and merge a selection into one `copilot-instructions.md`.

mod commands;
mod format;

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
