use thiserror::Error;

/// Failure of a single weather lookup.
///
/// The `Display` form is the exact text shown to the chat user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherError {
    /// The provider answered with a non-200 `cod`.
    #[error("Invalid request. Reason: {message}")]
    Provider { code: String, message: String },

    /// Network failure, timeout or unreadable body.
    #[error("Exception (weather): {0}")]
    Transport(String),

    /// Body was not the JSON we expected.
    #[error("Exception (weather): {0}")]
    Decode(String),
}

impl WeatherError {
    pub fn kind(&self) -> &'static str {
        match self {
            WeatherError::Provider { .. } => "provider",
            WeatherError::Transport(_) => "transport",
            WeatherError::Decode(_) => "decode",
        }
    }
}

impl From<reqwest::Error> for WeatherError {
    /// The request URL carries `appid`, so it never reaches the message text.
    fn from(err: reqwest::Error) -> Self {
        WeatherError::Transport(err.without_url().to_string())
    }
}

impl From<serde_json::Error> for WeatherError {
    fn from(err: serde_json::Error) -> Self {
        WeatherError::Decode(err.to_string())
    }
}

/// Malformed inline-keyboard callback payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("callback payload is empty")]
    Empty,

    #[error("callback payload has no period separator")]
    MissingSeparator,

    #[error("unknown period '{0}'")]
    UnknownPeriod(String),

    #[error("callback payload has no city")]
    EmptyCity,
}
