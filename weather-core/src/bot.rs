//! Chat handlers, independent of the messaging platform.
//!
//! [`WeatherBot`] receives already-converted inbound events and answers them
//! through an injected [`Messenger`]. Each event is handled on its own: at
//! most one weather lookup, then at most one reply.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::{
    callback,
    command::{self, Command},
    fetcher::WeatherFetcher,
    keyboard::{self, Keyboard},
    model::{CallbackQuery, Coordinates, InboundMessage, MessageContent, Period},
};

pub const INVALID_COMMAND: &str = "Invalid command";
pub const LOCATION_PROMPT: &str = "get your location";
pub const PERIOD_PROMPT: &str = "Please, select period";
pub const UNSUPPORTED_PERIOD: &str = "Sorry, this request is unsupported now. Current weather:";

/// Outbound side of the chat platform.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send(&self, chat_id: i64, text: &str, keyboard: Option<Keyboard>)
    -> anyhow::Result<()>;
}

#[derive(Debug, Clone)]
pub struct BotOptions {
    /// When off, a bare command is rejected and location messages are ignored.
    pub location_requests: bool,
    /// The bot's own username. Commands mentioning another bot are ignored;
    /// with `None` every mention is accepted.
    pub username: Option<String>,
}

impl Default for BotOptions {
    fn default() -> Self {
        Self {
            location_requests: true,
            username: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackOutcome {
    Replied,
    /// Nothing was sent; the reason has been logged.
    Dropped,
}

pub struct WeatherBot {
    fetcher: WeatherFetcher,
    messenger: Arc<dyn Messenger>,
    options: BotOptions,
}

impl WeatherBot {
    pub fn new(fetcher: WeatherFetcher, messenger: Arc<dyn Messenger>, options: BotOptions) -> Self {
        Self {
            fetcher,
            messenger,
            options,
        }
    }

    pub async fn handle_message(&self, msg: &InboundMessage) -> anyhow::Result<()> {
        debug!(
            user_id = msg.sender_id,
            chat_id = msg.chat_id,
            received_at = %msg.received_at,
            "message received"
        );

        match &msg.content {
            MessageContent::Text(text) => self.handle_text(msg, text).await,
            MessageContent::Location(coords) => self.handle_location(msg, *coords).await,
        }
    }

    async fn handle_text(&self, msg: &InboundMessage, text: &str) -> anyhow::Result<()> {
        match command::parse(text, self.options.username.as_deref()) {
            Command::RequestLocation if self.options.location_requests => {
                self.request_location(msg).await
            }
            Command::City(city) => self.request_period(msg, &city).await,
            Command::OtherBot => {
                debug!(user_id = msg.sender_id, text, "command addressed to another bot");
                Ok(())
            }
            Command::RequestLocation | Command::Invalid => {
                debug!(user_id = msg.sender_id, text, "invalid command");
                self.messenger.send(msg.chat_id, INVALID_COMMAND, None).await
            }
        }
    }

    async fn request_location(&self, msg: &InboundMessage) -> anyhow::Result<()> {
        info!(user_id = msg.sender_id, "Request weather by location");

        self.messenger
            .send(msg.chat_id, LOCATION_PROMPT, Some(keyboard::location_request()))
            .await
    }

    async fn request_period(&self, msg: &InboundMessage, city: &str) -> anyhow::Result<()> {
        info!(user_id = msg.sender_id, city, "Request weather for city");

        self.messenger
            .send(msg.chat_id, PERIOD_PROMPT, Some(keyboard::period_choice(city)))
            .await
    }

    async fn handle_location(
        &self,
        msg: &InboundMessage,
        coords: Option<Coordinates>,
    ) -> anyhow::Result<()> {
        if !self.options.location_requests {
            debug!(user_id = msg.sender_id, "location requests disabled, ignoring location");
            return Ok(());
        }

        let Some(coords) = coords else {
            return Ok(());
        };

        info!(
            user_id = msg.sender_id,
            latitude = coords.latitude,
            longitude = coords.longitude,
            "Request weather by coordinates"
        );

        let weather = self
            .fetcher
            .fetch_by_coordinates(coords.latitude, coords.longitude)
            .await;
        self.messenger.send(msg.chat_id, &weather, None).await
    }

    /// Answers an inline-keyboard press.
    ///
    /// Malformed payloads and failed sends are logged and dropped; the user
    /// gets no reply in that case.
    pub async fn handle_callback(&self, query: &CallbackQuery) -> CallbackOutcome {
        let data = query.data.as_deref().unwrap_or_default();
        info!(user_id = query.sender_id, chat_id = query.chat_id, data, "callback received");

        let (period, city) = match callback::decode(data) {
            Ok(decoded) => decoded,
            Err(err) => {
                error!(chat_id = query.chat_id, data, error = %err, "malformed callback payload");
                return CallbackOutcome::Dropped;
            }
        };

        let weather = self.fetcher.fetch_by_city(&city).await;
        let text = match period {
            Period::Current => weather,
            Period::Today | Period::Tomorrow => format!("{UNSUPPORTED_PERIOD}\n{weather}"),
        };

        match self.messenger.send(query.chat_id, &text, None).await {
            Ok(()) => CallbackOutcome::Replied,
            Err(err) => {
                error!(chat_id = query.chat_id, data, error = %err, "failed to answer callback");
                CallbackOutcome::Dropped
            }
        }
    }
}
