use chrono::{DateTime, Utc};
use std::fmt;

use crate::error::PayloadError;

/// Geographic position reported by a chat client.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// What the user asked the weather provider about.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherQuery {
    City(String),
    Coordinates(Coordinates),
}

/// Current conditions as reported by a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Place name resolved by the provider, if it sent one.
    pub place: Option<String>,
    pub temperature_c: f64,
    pub description: String,
}

/// Forecast horizon offered on the inline keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Current,
    Today,
    Tomorrow,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Current => "current",
            Period::Today => "today",
            Period::Tomorrow => "tomorrow",
        }
    }

    pub const fn all() -> &'static [Period] {
        &[Period::Current, Period::Today, Period::Tomorrow]
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Period {
    type Error = PayloadError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "current" => Ok(Period::Current),
            "today" => Ok(Period::Today),
            "tomorrow" => Ok(Period::Tomorrow),
            other => Err(PayloadError::UnknownPeriod(other.to_string())),
        }
    }
}

/// A message delivered by the chat platform.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub sender_id: u64,
    /// Conversation the reply goes to.
    pub chat_id: i64,
    pub received_at: DateTime<Utc>,
    pub content: MessageContent,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MessageContent {
    Text(String),
    /// A location-typed message. The platform may deliver one without a payload.
    Location(Option<Coordinates>),
}

/// A press on an inline-keyboard button.
#[derive(Debug, Clone)]
pub struct CallbackQuery {
    pub sender_id: u64,
    pub chat_id: i64,
    pub data: Option<String>,
}
