use crate::{
    Config, Observation, WeatherError, WeatherQuery, provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current conditions for `query`. Exactly one upstream call, no retry.
    async fn current(&self, query: &WeatherQuery) -> Result<Observation, WeatherError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.require_api_key()?;
    let ow = &config.openweather;

    let provider = OpenWeatherProvider::new(api_key.to_owned(), ow.lang.clone(), ow.timeout())?
        .with_base_url(ow.base_url.clone());

    Ok(Box::new(provider))
}
