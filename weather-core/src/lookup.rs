//! The lookup flow: query the provider, transform the response and update the view.
//!
//! Lookups may overlap. Each one takes a [`LookupToken`] when it begins and its
//! result is only applied if no newer lookup has begun since, so the most
//! recently issued lookup always owns the view.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::{fmt, sync::Arc};
use tracing::{debug, info, warn};

use crate::{
    config::DEFAULT_CITY,
    error::LookupError,
    locate::Locator,
    model::{DisplayWeather, WeatherQuery},
    provider::WeatherProvider,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LookupToken(u64);

/// Everything the card renders from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherView {
    pub display: Option<DisplayWeather>,
    pub loading: bool,
    pub error: Option<LookupError>,
    pub(crate) latest: u64,
}

impl WeatherView {
    /// Mark a lookup in flight and clear the previous error.
    pub fn begin(&mut self) -> LookupToken {
        self.latest += 1;
        self.loading = true;
        self.error = None;
        LookupToken(self.latest)
    }

    pub fn is_latest(&self, token: LookupToken) -> bool {
        token.0 == self.latest
    }

    /// Apply a settled lookup. Returns `false` and leaves the view alone when a newer
    /// lookup has begun since `token` was issued.
    pub fn finish(
        &mut self,
        token: LookupToken,
        outcome: Result<DisplayWeather, LookupError>,
    ) -> bool {
        if !self.is_latest(token) {
            debug!(stale = token.0, "discarding lookup result");
            return false;
        }

        self.loading = false;
        match outcome {
            Ok(display) => self.display = Some(display),
            // The previous display stays visible under the error.
            Err(err) => self.error = Some(err),
        }
        true
    }

    /// Show a message without touching the display or loading state.
    pub fn notify(&mut self, error: LookupError) {
        self.error = Some(error);
    }
}

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Runs lookups against one provider and keeps the shared [`WeatherView`] current.
#[derive(Clone)]
pub struct WeatherLookup {
    provider: Arc<dyn WeatherProvider>,
    view: Arc<Mutex<WeatherView>>,
    clock: Clock,
}

impl fmt::Debug for WeatherLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherLookup")
            .field("provider", &self.provider)
            .field("view", &self.view)
            .finish_non_exhaustive()
    }
}

impl WeatherLookup {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self {
            provider,
            view: Arc::default(),
            clock: Arc::new(Utc::now),
        }
    }

    /// Replace the wall clock used for the local-time field.
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    pub fn view(&self) -> WeatherView {
        self.view.lock().clone()
    }

    /// One lookup. Returns whether its result made it into the view.
    pub async fn search(&self, query: WeatherQuery) -> bool {
        let token = self.view.lock().begin();
        self.settle(token, &query).await
    }

    /// User-triggered lookup by city name. Blank input issues nothing and yields `None`.
    pub async fn submit(&self, input: &str) -> Option<bool> {
        let query = WeatherQuery::city(input)?;
        Some(self.search(query).await)
    }

    /// Startup lookup: current position if the locator gives one, London otherwise.
    ///
    /// The lookup is marked in flight before the locator is asked, so a search
    /// submitted while locating supersedes it.
    pub async fn start(&self, locator: &dyn Locator) -> bool {
        let token = self.view.lock().begin();

        let query = match locator.current_position().await {
            Ok(coords) => WeatherQuery::Coordinates(coords),
            Err(err) => {
                info!(error = %err, city = DEFAULT_CITY, "current location unavailable");
                {
                    let mut view = self.view.lock();
                    if view.is_latest(token) {
                        view.notify(LookupError::LocationUnavailable);
                    }
                }
                WeatherQuery::City(DEFAULT_CITY.to_string())
            }
        };

        self.settle(token, &query).await
    }

    async fn settle(&self, token: LookupToken, query: &WeatherQuery) -> bool {
        let outcome = self.fetch(query).await;
        self.view.lock().finish(token, outcome)
    }

    async fn fetch(&self, query: &WeatherQuery) -> Result<DisplayWeather, LookupError> {
        let result = async {
            let obs = self.provider.current(query).await?;
            DisplayWeather::from_observation(&obs, (self.clock)())
        }
        .await;

        result.map_err(|err| {
            let cause = format!("{err:#}");
            warn!(%query, error = %cause, "weather lookup failed");
            LookupError::FetchFailed
        })
    }
}
