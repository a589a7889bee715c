use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use inquire::{Confirm, Password, PasswordDisplayMode, Text};
use weather_core::Config;

use crate::{logging, telegram};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-bot", version, about = "Weather telegram bot")]
pub struct Cli {
    /// Logging level.
    #[arg(short = 'l', long = "loglevel", value_enum, default_value_t = LogLevel::Debug)]
    pub loglevel: LogLevel,

    /// Config file; defaults to the platform config directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log file; overrides `log_file` from the config.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Start long polling (the default).
    Run,

    /// Store the bot token and OpenWeather API key in the config file.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config_path = match &self.config {
            Some(path) => path.clone(),
            None => Config::config_file_path()?,
        };

        match self.command.unwrap_or(Command::Run) {
            Command::Configure => configure(&config_path),
            Command::Run => {
                let mut config = Config::load_from(&config_path)?;
                config.apply_env();

                let log_file = match self.log_file {
                    Some(path) => path,
                    None => config.log_file_path()?,
                };
                logging::init(self.loglevel, &log_file)?;

                telegram::run(config).await
            }
        }
    }
}

fn configure(path: &Path) -> anyhow::Result<()> {
    let mut config = Config::load_from(path)?;

    let token = Password::new("Telegram bot token (empty keeps current):")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read bot token")?;
    if !token.trim().is_empty() {
        config.telegram.bot_token = Some(token.trim().to_string());
    }

    let api_key = Password::new("OpenWeather API key (empty keeps current):")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read API key")?;
    if !api_key.trim().is_empty() {
        config.openweather.api_key = Some(api_key.trim().to_string());
    }

    config.openweather.lang = Text::new("Description language:")
        .with_default(&config.openweather.lang)
        .prompt()
        .context("Failed to read language")?;

    config.telegram.location_requests = Confirm::new("Offer weather by location for a bare /weather?")
        .with_default(config.telegram.location_requests)
        .prompt()
        .context("Failed to read location setting")?;

    config.save_to(path)?;
    println!("Configuration saved to {}", path.display());

    Ok(())
}
