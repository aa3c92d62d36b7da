//! Infinite Heroes CLI binary.
//!
//! - Start a story from a hero portrait
//! - Make the decision and generate the rest of the issue
//! - Share, replay and export finished stories

use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, run_command};

    // Load .env before anything reads GEMINI_API_KEY
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    infinite_heroes::init_tracing(cli.verbose, cli.json_logs)?;

    run_command(cli.command).await?;
    Ok(())
}
