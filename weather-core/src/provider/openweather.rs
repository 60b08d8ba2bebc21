use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{
    config::DEFAULT_BASE_URL,
    model::{Observation, WeatherQuery},
};

use super::WeatherProvider;

/// Client for the OpenWeather current-weather endpoint. Temperatures come back in Kelvin.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    fn query_params(&self, query: &WeatherQuery) -> Vec<(&'static str, String)> {
        let mut params = match query {
            WeatherQuery::City(city) => vec![("q", city.clone())],
            WeatherQuery::Coordinates(c) => vec![
                ("lat", c.lat.to_string()),
                ("lon", c.lon.to_string()),
            ],
        };
        params.push(("appid", self.api_key.clone()));
        params
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    visibility: f64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    timezone: i32,
}

impl From<OwCurrentResponse> for Observation {
    fn from(parsed: OwCurrentResponse) -> Self {
        Observation {
            name: parsed.name,
            visibility_m: parsed.visibility,
            wind_speed_mps: parsed.wind.speed,
            humidity_pct: parsed.main.humidity,
            temp_kelvin: parsed.main.temp,
            condition: parsed.weather.into_iter().next().map(|w| w.main),
            utc_offset_secs: parsed.timezone,
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(&self, query: &WeatherQuery) -> Result<Observation> {
        let url = format!("{}/weather", self.base_url);
        debug!(%query, %url, "requesting current weather");

        let res = self
            .http
            .get(&url)
            .query(&self.query_params(query))
            .send()
            .await
            .context("Failed to send request to OpenWeather (current weather)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read OpenWeather current response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather current request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: OwCurrentResponse =
            serde_json::from_str(&body).context("Failed to parse OpenWeather current JSON")?;

        Ok(parsed.into())
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
