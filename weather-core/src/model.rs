use anyhow::{Result, anyhow};
use chrono::{DateTime, FixedOffset, Utc};

const KELVIN_OFFSET: f64 = 273.15;
const LOCAL_TIME_FORMAT: &str = "%d/%m/%Y, %-I:%M:%S %p";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// What a single lookup asks the provider for.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherQuery {
    City(String),
    Coordinates(Coordinates),
}

impl WeatherQuery {
    /// Query for a free-text city; `None` when the input is blank.
    pub fn city(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self::City(trimmed.to_string()))
        }
    }

    /// Pick between coordinates and a city name. The city wins when both are present.
    pub fn resolve(coords: Option<Coordinates>, city: Option<&str>) -> Option<Self> {
        match city.and_then(Self::city) {
            Some(query) => Some(query),
            None => coords.map(Self::Coordinates),
        }
    }
}

impl std::fmt::Display for WeatherQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeatherQuery::City(city) => write!(f, "city '{city}'"),
            WeatherQuery::Coordinates(c) => write!(f, "lat {}, lon {}", c.lat, c.lon),
        }
    }
}

/// Provider-neutral fields extracted from one current-weather response.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub name: String,
    pub visibility_m: f64,
    pub wind_speed_mps: f64,
    pub humidity_pct: f64,
    pub temp_kelvin: f64,
    pub condition: Option<String>,
    pub utc_offset_secs: i32,
}

/// Display-ready snapshot of the last successful lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayWeather {
    pub name: String,
    pub visibility_km: String,
    pub wind_speed: String,
    pub humidity: String,
    pub temperature_c: i64,
    pub short_description: Option<String>,
    pub local_time: String,
}

impl DisplayWeather {
    /// Fails only when the observation carries a UTC offset chrono cannot represent.
    pub fn from_observation(obs: &Observation, now: DateTime<Utc>) -> Result<Self> {
        Ok(Self {
            name: obs.name.clone(),
            visibility_km: format!("{} km", obs.visibility_m / 1000.0),
            wind_speed: format!("{} m/s", obs.wind_speed_mps),
            humidity: format!("{}%", obs.humidity_pct),
            temperature_c: kelvin_to_celsius(obs.temp_kelvin),
            short_description: obs.condition.clone(),
            local_time: local_time(now, obs.utc_offset_secs)?,
        })
    }
}

/// Rounds half up, so 0.5 becomes 1 and -0.5 becomes 0.
pub fn kelvin_to_celsius(kelvin: f64) -> i64 {
    (kelvin - KELVIN_OFFSET + 0.5).floor() as i64
}

/// Wall-clock time at `offset_secs` east of UTC, e.g. `19/10/2026, 3:04:05 PM`.
pub fn local_time(now: DateTime<Utc>, offset_secs: i32) -> Result<String> {
    let offset = FixedOffset::east_opt(offset_secs)
        .ok_or_else(|| anyhow!("UTC offset out of range: {offset_secs}s"))?;

    let local = now.with_timezone(&offset);
    Ok(local.format(LOCAL_TIME_FORMAT).to_string())
}
