use crate::{
    Config,
    model::{Observation, WeatherQuery},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current conditions for `query`. One request, no retry.
    async fn current(&self, query: &WeatherQuery) -> anyhow::Result<Observation>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.api_key()?;

    let provider = OpenWeatherProvider::with_base_url(api_key.to_owned(), config.base_url());
    Ok(Box::new(provider))
}
