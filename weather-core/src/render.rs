use std::fmt;

use crate::lookup::WeatherView;

/// Text rendering of a [`WeatherView`]: loading line, error line, then the card.
///
/// The card only shows once something has been fetched and nothing is loading.
#[derive(Debug, Clone, Copy)]
pub struct Card<'a>(pub &'a WeatherView);

impl fmt::Display for Card<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = self.0;

        if view.loading {
            writeln!(f, "Loading...")?;
        }
        if let Some(err) = &view.error {
            writeln!(f, "{err}")?;
        }

        let Some(w) = view.display.as_ref().filter(|_| !view.loading) else {
            return Ok(());
        };

        writeln!(f)?;
        writeln!(f, "  {}", w.name)?;
        writeln!(f, "  {}", w.local_time)?;
        writeln!(f)?;
        writeln!(f, "  {} °C", w.temperature_c)?;
        if let Some(desc) = &w.short_description {
            writeln!(f, "  {desc}")?;
        }
        writeln!(f)?;
        writeln!(f, "  Visibility  {}", w.visibility_km)?;
        writeln!(f, "  Wind        {}", w.wind_speed)?;
        writeln!(f, "  Humidity    {}", w.humidity)
    }
}
