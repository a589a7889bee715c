//! Core library for the weather Telegram bot.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather client behind a provider abstraction
//! - Command parsing, callback payloads and keyboard descriptions
//! - Platform-agnostic chat handlers
//!
//! It is used by `weather-bot`, which plugs in the Telegram transport.

pub mod bot;
pub mod callback;
pub mod command;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod keyboard;
pub mod model;
pub mod provider;

pub use bot::{BotOptions, CallbackOutcome, Messenger, WeatherBot};
pub use config::Config;
pub use error::{PayloadError, WeatherError};
pub use fetcher::WeatherFetcher;
pub use keyboard::{InlineButton, Keyboard};
pub use model::{
    CallbackQuery, Coordinates, InboundMessage, MessageContent, Observation, Period, WeatherQuery,
};
pub use provider::WeatherProvider;
