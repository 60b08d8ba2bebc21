use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode};
use std::io::Write;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, BufReader},
    task::JoinSet,
};
use tracing::debug;
use weather_core::{
    Card, Config, Coordinates, Locator, WeatherLookup, WeatherQuery, locator_from_config,
    provider_from_config,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "weather",
    version,
    about = "Current weather for your location or any city"
)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key.
    Configure,

    /// Show the weather once, for a city, coordinates, or the current location.
    Show {
        /// City name. Takes precedence over --lat/--lon.
        city: Option<String>,

        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
    },

    /// Look up the current location, then read city names from stdin, one per line.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, lat, lon } => {
                let coords = lat.zip(lon).map(|(lat, lon)| Coordinates { lat, lon });
                show(city.as_deref(), coords).await
            }
            Command::Interactive => interactive().await,
        }
    }
}

fn build_lookup(config: &Config) -> anyhow::Result<WeatherLookup> {
    let provider = provider_from_config(config)?;
    Ok(WeatherLookup::new(Arc::from(provider)))
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("API key prompt cancelled")?;

    config.api_key = Some(api_key.trim().to_string());

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}

async fn show(city: Option<&str>, coords: Option<Coordinates>) -> anyhow::Result<()> {
    let config = Config::load_with_env()?;
    let lookup = build_lookup(&config)?;

    match WeatherQuery::resolve(coords, city) {
        Some(query) => {
            lookup.search(query).await;
        }
        None => {
            let locator = locator_from_config(&config);
            lookup.start(locator.as_ref()).await;
        }
    }

    let view = lookup.view();
    print!("{}", Card(&view));

    if view.display.is_none() {
        bail!("no weather data to show");
    }
    Ok(())
}

async fn interactive() -> anyhow::Result<()> {
    let config = Config::load_with_env()?;
    let lookup = build_lookup(&config)?;
    let locator: Arc<dyn Locator> = Arc::from(locator_from_config(&config));

    let input = BufReader::new(tokio::io::stdin());
    prompt_loop(&lookup, locator, input, &mut std::io::stdout()).await
}

/// Run the startup lookup, then one search per non-blank input line.
///
/// Returns once input is exhausted and every lookup in flight has settled.
async fn prompt_loop<R, W>(
    lookup: &WeatherLookup,
    locator: Arc<dyn Locator>,
    input: R,
    out: &mut W,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut tasks = JoinSet::new();
    {
        let lookup = lookup.clone();
        tasks.spawn(async move { lookup.start(locator.as_ref()).await });
    }

    writeln!(out, "{}", Card(&lookup.view()))?;
    writeln!(out, "Type a city and press Enter to search; Ctrl-D to quit.")?;

    let mut lines = input.lines();
    let mut reading = true;
    while reading || !tasks.is_empty() {
        tokio::select! {
            line = lines.next_line(), if reading => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    debug!(pending = tasks.len(), "input closed");
                    reading = false;
                    continue;
                };
                let Some(query) = WeatherQuery::city(&line) else {
                    continue;
                };
                debug!(%query, "search submitted");

                let lookup = lookup.clone();
                tasks.spawn(async move { lookup.search(query).await });
                writeln!(out, "Searching...")?;
            }
            Some(joined) = tasks.join_next() => {
                if joined.context("lookup task panicked")? {
                    write!(out, "{}", Card(&lookup.view()))?;
                }
            }
            else => break,
        }
    }

    out.flush()?;
    Ok(())
}
