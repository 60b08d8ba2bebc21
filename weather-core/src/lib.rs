//! Core library for the `weather` lookup CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather provider and the position locators
//! - The lookup flow with its explicit view state
//! - Text rendering of the weather card
//!
//! It is used by `weather-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod locate;
pub mod lookup;
pub mod model;
pub mod provider;
pub mod render;

pub use config::{Config, GeolocationMode};
pub use error::{LocationError, LookupError};
pub use locate::{FixedLocator, IpLocator, Locator, locator_from_config};
pub use lookup::{LookupToken, WeatherLookup, WeatherView};
pub use model::{Coordinates, DisplayWeather, Observation, WeatherQuery};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider, provider_from_config};
pub use render::Card;
