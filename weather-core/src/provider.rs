use crate::{
    Config, DailyRange, ForecastSlice, LocationSnapshot, WeatherError,
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Why the optional daily aggregate tier produced nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum Unavailable {
    /// Any non-success HTTP status, including plan/tier rejections.
    Status(u16),
    /// Success, but no daily entries.
    EmptyDaily,
    Malformed(String),
    Transport(String),
}

impl std::fmt::Display for Unavailable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status(code) => write!(f, "HTTP {code}"),
            Self::EmptyDaily => f.write_str("empty daily list"),
            Self::Malformed(msg) => write!(f, "malformed body: {msg}"),
            Self::Transport(msg) => write!(f, "transport error: {msg}"),
        }
    }
}

/// Outcome of a tier that is allowed to be missing.
///
/// There is no error arm: whatever goes wrong upstream becomes
/// [`PrimaryOutcome::Unavailable`], so a caller cannot propagate it with `?`.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimaryOutcome<T> {
    Available(T),
    Unavailable(Unavailable),
}

/// The three upstream queries a lookup needs.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Resolve a place name to coordinates, offset and current conditions.
    async fn current_conditions(&self, place: &str) -> Result<LocationSnapshot, WeatherError>;

    /// Pre-computed min/max for today, when the account's plan allows it.
    async fn daily_aggregate(&self, latitude: f64, longitude: f64) -> PrimaryOutcome<DailyRange>;

    /// Chronological ~3-hour slices for the place.
    async fn interval_forecast(&self, place: &str) -> Result<Vec<ForecastSlice>, WeatherError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<OpenWeatherProvider> {
    let api_key = config.api_key()?;
    let endpoints = config.endpoints();

    OpenWeatherProvider::new(api_key.to_owned(), config.units, endpoints, config.timeout())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(&cfg).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No API key configured"));
        assert!(msg.contains("Hint: run `weather configure"));
    }

    #[test]
    fn provider_from_config_works_when_configured() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());

        assert!(provider_from_config(&cfg).is_ok());
    }

    #[test]
    fn unavailable_reasons_display() {
        assert_eq!(Unavailable::Status(401).to_string(), "HTTP 401");
        assert_eq!(Unavailable::EmptyDaily.to_string(), "empty daily list");
    }
}
