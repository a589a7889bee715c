//! Binary crate for the `weather-bot` Telegram bot.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - The file log sink
//! - Wiring the core handlers to Telegram

use clap::Parser;

mod cli;
mod logging;
mod telegram;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    cmd.run().await
}
