use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::{
    error::WeatherError,
    model::{Observation, WeatherQuery},
};

use super::WeatherProvider;

const CURRENT_WEATHER_PATH: &str = "/data/2.5/weather";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    lang: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, lang: String, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_key,
            lang,
            base_url: "https://api.openweathermap.org".to_string(),
            http,
        })
    }

    /// Overrides the API host (for testing with wiremock).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn fetch(&self, location: &[(&str, String)]) -> Result<OwResponse, WeatherError> {
        let url = format!("{}{CURRENT_WEATHER_PATH}", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(location)
            .query(&[
                ("units", "metric"),
                ("lang", self.lang.as_str()),
                ("appid", self.api_key.as_str()),
            ])
            .send()
            .await?;

        // Errors are reported in-band through `cod`, so the HTTP status is
        // only logged and the body is always parsed.
        let status = res.status();
        let body = res.text().await?;
        debug!(%status, bytes = body.len(), "OpenWeather responded");

        Ok(serde_json::from_str(&body)?)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OwCode {
    Number(i64),
    Text(String),
}

impl OwCode {
    fn is_ok(&self) -> bool {
        match self {
            OwCode::Number(n) => *n == 200,
            OwCode::Text(s) => s == "200",
        }
    }

    fn as_string(&self) -> String {
        match self {
            OwCode::Number(n) => n.to_string(),
            OwCode::Text(s) => s.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwResponse {
    cod: OwCode,
    message: Option<serde_json::Value>,
    main: Option<OwMain>,
    #[serde(default)]
    weather: Vec<OwWeather>,
    name: Option<String>,
}

impl OwResponse {
    fn into_observation(self, require_place: bool) -> Result<Observation, WeatherError> {
        if !self.cod.is_ok() {
            let message = match self.message {
                Some(serde_json::Value::String(s)) => s,
                Some(other) => other.to_string(),
                None => return Err(missing("message")),
            };
            return Err(WeatherError::Provider {
                code: self.cod.as_string(),
                message,
            });
        }

        let main = self.main.ok_or_else(|| missing("main"))?;
        let description = self
            .weather
            .into_iter()
            .next()
            .map(|w| w.description)
            .ok_or_else(|| missing("weather[0]"))?;

        if require_place && self.name.is_none() {
            return Err(missing("name"));
        }

        Ok(Observation {
            place: self.name,
            temperature_c: main.temp,
            description,
        })
    }
}

fn missing(field: &str) -> WeatherError {
    WeatherError::Decode(format!("missing field `{field}`"))
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(&self, query: &WeatherQuery) -> Result<Observation, WeatherError> {
        match query {
            WeatherQuery::City(city) => {
                let parsed = self.fetch(&[("q", city.clone())]).await?;
                parsed.into_observation(false)
            }
            WeatherQuery::Coordinates(coords) => {
                let parsed = self
                    .fetch(&[
                        ("lat", coords.latitude.to_string()),
                        ("lon", coords.longitude.to_string()),
                    ])
                    .await?;
                parsed.into_observation(true)
            }
        }
    }
}
