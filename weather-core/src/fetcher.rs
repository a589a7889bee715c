//! Turns weather lookups into reply text.
//!
//! [`WeatherFetcher::lookup`] returns the structured result; the `fetch_*`
//! helpers render it so every outcome, failures included, is a string that
//! can go straight back to the user.

use std::sync::Arc;

use tracing::warn;

use crate::{
    error::WeatherError,
    model::{Coordinates, Observation, WeatherQuery},
    provider::WeatherProvider,
};

#[derive(Debug, Clone)]
pub struct WeatherFetcher {
    provider: Arc<dyn WeatherProvider>,
}

impl WeatherFetcher {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    pub async fn lookup(&self, query: &WeatherQuery) -> Result<Observation, WeatherError> {
        let result = self.provider.current(query).await;

        if let Err(err) = &result {
            warn!(kind = err.kind(), error = %err, ?query, "weather lookup failed");
        }

        result
    }

    pub async fn fetch_by_city(&self, city: &str) -> String {
        self.fetch(WeatherQuery::City(city.to_string())).await
    }

    pub async fn fetch_by_coordinates(&self, latitude: f64, longitude: f64) -> String {
        self.fetch(WeatherQuery::Coordinates(Coordinates::new(latitude, longitude)))
            .await
    }

    async fn fetch(&self, query: WeatherQuery) -> String {
        let result = self.lookup(&query).await;
        render(&query, &result)
    }
}

/// Two-line reply for a successful lookup, the error text otherwise.
///
/// City lookups echo the city as the user typed it; coordinate lookups use
/// the place name resolved by the provider.
pub fn render(query: &WeatherQuery, result: &Result<Observation, WeatherError>) -> String {
    let obs = match result {
        Ok(obs) => obs,
        Err(err) => return err.to_string(),
    };

    let headline = match query {
        WeatherQuery::City(city) => format!("City: {city}"),
        WeatherQuery::Coordinates(_) => {
            format!("Location: {}", obs.place.as_deref().unwrap_or_default())
        }
    };

    format!(
        "{headline}\nWeather: {}°, {}",
        obs.temperature_c, obs.description
    )
}
