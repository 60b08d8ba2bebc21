//! Where am I? One-shot position lookup used by the startup flow.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;
use tracing::debug;

use crate::{
    config::{Config, GeolocationMode},
    error::LocationError,
    model::Coordinates,
};

pub const IP_API_BASE_URL: &str = "http://ip-api.com";

#[async_trait]
pub trait Locator: Send + Sync + Debug {
    async fn current_position(&self) -> Result<Coordinates, LocationError>;
}

/// A position known up front. `None` behaves like a denied permission.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedLocator(pub Option<Coordinates>);

#[async_trait]
impl Locator for FixedLocator {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        self.0.ok_or(LocationError::Denied)
    }
}

/// Approximate position from the caller's public IP via ip-api.com.
#[derive(Debug, Clone)]
pub struct IpLocator {
    base_url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl IpLocator {
    pub fn new() -> Self {
        Self::with_base_url(IP_API_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }
}

impl Default for IpLocator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Locator for IpLocator {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        let url = format!("{}/json", self.base_url);
        debug!(%url, "locating by IP address");

        let res = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| {
                debug!(error = %e, "ip-api request failed");
                LocationError::Unavailable
            })?;

        let status = res.status();
        if !status.is_success() {
            let reason = format!("ip-api returned status {status}");
            return Err(LocationError::Other(reason));
        }

        let parsed: IpApiResponse = res
            .json()
            .await
            .map_err(|e| LocationError::Other(format!("bad ip-api JSON: {e}")))?;

        match (parsed.status.as_str(), parsed.lat, parsed.lon) {
            ("success", Some(lat), Some(lon)) => Ok(Coordinates { lat, lon }),
            _ => {
                debug!(message = ?parsed.message, "ip-api could not locate this address");
                Err(LocationError::Unavailable)
            }
        }
    }
}

/// Pick a locator for the startup lookup. A configured position always wins.
pub fn locator_from_config(config: &Config) -> Box<dyn Locator> {
    match (config.fixed_position(), config.geolocation) {
        (Some(coords), _) => Box::new(FixedLocator(Some(coords))),
        (None, GeolocationMode::Ip) => Box::new(IpLocator::new()),
        (None, GeolocationMode::Off) => Box::new(FixedLocator(None)),
    }
}
