use anyhow::{Context, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use weather_core::{Config, Resolver, Units, WeatherReport, provider_from_config};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Today's weather and temperature range")]
pub struct Cli {
    /// Log upstream requests and tier decisions to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and preferences.
    Configure {
        /// API key; prompted for when absent.
        #[arg(long)]
        api_key: Option<String>,

        /// metric, imperial or standard.
        #[arg(long)]
        units: Option<Units>,

        /// Per-request timeout in seconds.
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Show current conditions and today's min/max for a place.
    Show {
        /// City name, e.g. "London" or "Paris,FR".
        place: String,

        /// Override the configured units for this lookup.
        #[arg(long)]
        units: Option<Units>,
    },

    /// Print only today's "min max" for a place.
    Range {
        place: String,

        #[arg(long)]
        units: Option<Units>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { api_key, units, timeout_secs } => {
                configure(api_key, units, timeout_secs)
            }
            Command::Show { place, units } => {
                let cfg = load_config(units)?;
                let report = lookup(&cfg, &place).await?;
                print!("{}", render_report(&report, cfg.units));
                Ok(())
            }
            Command::Range { place, units } => {
                let cfg = load_config(units)?;
                let report = lookup(&cfg, &place).await?;
                println!("{:.1} {:.1}", report.range.min(), report.range.max());
                Ok(())
            }
        }
    }
}

fn configure(
    api_key: Option<String>,
    units: Option<Units>,
    timeout_secs: Option<u64>,
) -> anyhow::Result<()> {
    // Read the file directly so an env override is not persisted.
    let path = Config::config_file_path()?;
    let mut cfg = Config::load_from(&path)?;

    let api_key = match api_key {
        Some(key) => key,
        None => inquire::Password::new("OpenWeather API key:")
            .without_confirmation()
            .prompt()
            .context("Failed to read API key")?,
    };

    let api_key = api_key.trim();
    if api_key.is_empty() {
        bail!("API key must not be empty");
    }
    cfg.set_api_key(api_key.to_string());

    if let Some(units) = units {
        cfg.units = units;
    }
    if let Some(secs) = timeout_secs {
        cfg.set_timeout_secs(secs)?;
    }

    cfg.save_to(&path)?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

fn load_config(units: Option<Units>) -> anyhow::Result<Config> {
    let mut cfg = Config::load()?;
    if let Some(units) = units {
        cfg.units = units;
    }
    Ok(cfg)
}

async fn lookup(cfg: &Config, place: &str) -> anyhow::Result<WeatherReport> {
    let resolver = Resolver::new(provider_from_config(cfg)?);

    match resolver.lookup(place).await {
        Ok(report) => Ok(report),
        Err(err) => {
            tracing::debug!(error = %err, "lookup failed");
            bail!(err.user_message())
        }
    }
}

fn render_report(report: &WeatherReport, units: Units) -> String {
    let loc = &report.location;
    let symbol = units.temperature_symbol();
    let local_time = loc
        .local_now(Utc::now())
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();

    format!(
        "{}, {}  ({local_time} local)\n\
         Desc      {}\n\
         Temp      {:.1} {symbol}\n\
         Min       {:.1} {symbol}\n\
         Max       {:.1} {symbol}\n\
         Humidity  {} %\n\
         Range from {}\n",
        loc.name,
        loc.country,
        title_case(&loc.condition),
        loc.temperature,
        report.range.min(),
        report.range.max(),
        loc.humidity_pct,
        report.source,
    )
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use weather_core::{DailyRange, LocationSnapshot, RangeSource};

    #[test]
    fn title_case_words() {
        assert_eq!(title_case("broken clouds"), "Broken Clouds");
        assert_eq!(title_case("LIGHT  rain"), "Light Rain");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn parses_show_with_units() {
        let cli = Cli::try_parse_from(["weather", "show", "Paris,FR", "--units", "imperial"])
            .expect("valid args");

        match cli.command {
            Command::Show { place, units } => {
                assert_eq!(place, "Paris,FR");
                assert_eq!(units, Some(Units::Imperial));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_units() {
        assert!(Cli::try_parse_from(["weather", "range", "Oslo", "--units", "parsecs"]).is_err());
    }

    #[test]
    fn report_rounds_to_one_decimal() {
        let report = WeatherReport {
            location: LocationSnapshot {
                name: "Oslo".into(),
                country: "NO".into(),
                latitude: 59.91,
                longitude: 10.75,
                utc_offset_secs: 7200,
                temperature: 12.345,
                condition: "scattered clouds".into(),
                humidity_pct: 64,
            },
            range: DailyRange::new(8.04, 17.96).expect("valid range"),
            source: RangeSource::IntervalForecast,
        };

        let out = render_report(&report, Units::Metric);

        assert!(out.starts_with("Oslo, NO"));
        assert!(out.contains("Scattered Clouds"));
        assert!(out.contains("Temp      12.3 °C"));
        assert!(out.contains("Min       8.0 °C"));
        assert!(out.contains("Max       18.0 °C"));
        assert!(out.contains("Humidity  64 %"));
        assert!(out.contains("3-hour forecast"));
    }
}
