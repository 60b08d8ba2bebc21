use thiserror::Error;

/// User-facing failures of a lookup. The text is what the card shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("Could not get your current location, showing default weather for London.")]
    LocationUnavailable,

    #[error("Could not fetch weather data, please try again.")]
    FetchFailed,
}

/// Why a locator could not produce a position.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    Denied,
    #[error("Location service unavailable")]
    Unavailable,
    #[error("Location error: {0}")]
    Other(String),
}
