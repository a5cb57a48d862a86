use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::{
    DailyRange, ForecastSlice, LocationSnapshot, Reading, Units, WeatherError,
    provider::{PrimaryOutcome, Unavailable},
};

use super::WeatherProvider;

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
const DAILY_EXCLUDE: &str = "minutely,hourly,alerts";

/// Full URLs of the three OpenWeather endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Current conditions, by place name.
    pub current: String,
    /// 5-day / 3-hour forecast, by place name.
    pub forecast: String,
    /// One Call daily aggregate, by coordinates. May require a subscription.
    pub daily: String,
}

impl Endpoints {
    pub fn with_base_url(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            current: format!("{base}/data/2.5/weather"),
            forecast: format!("{base}/data/2.5/forecast"),
            daily: format!("{base}/data/3.0/onecall"),
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }
}

#[derive(Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    units: Units,
    endpoints: Endpoints,
    http: Client,
}

impl std::fmt::Debug for OpenWeatherProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherProvider")
            .field("api_key", &"<redacted>")
            .field("units", &self.units)
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

impl OpenWeatherProvider {
    pub fn new(
        api_key: String,
        units: Units,
        endpoints: Endpoints,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}"))?;

        Ok(Self::with_client(http, api_key, units, endpoints))
    }

    /// Use a caller-supplied HTTP client. `reqwest::Client` is cheap to clone
    /// and safe to share between concurrent lookups.
    pub fn with_client(http: Client, api_key: String, units: Units, endpoints: Endpoints) -> Self {
        Self { api_key, units, endpoints, http }
    }

    async fn get(
        &self,
        endpoint: &'static str,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<(StatusCode, String), reqwest::Error> {
        let res = self
            .http
            .get(url)
            .query(query)
            .query(&[("appid", self.api_key.as_str()), ("units", self.units.as_str())])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        tracing::debug!(endpoint, %status, bytes = body.len(), "OpenWeather response");
        Ok((status, body))
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_conditions(&self, place: &str) -> Result<LocationSnapshot, WeatherError> {
        let (status, body) = self
            .get("current", &self.endpoints.current, &[("q", place.to_string())])
            .await?;

        if !status.is_success() {
            return Err(WeatherError::from_status(status.as_u16(), place, error_message(&body)));
        }

        let parsed: OwCurrentResponse = serde_json::from_str(&body).map_err(|e| {
            WeatherError::UpstreamFormatError(format!("current conditions: {e}"))
        })?;

        if FixedOffset::east_opt(parsed.timezone).is_none() {
            return Err(WeatherError::UpstreamFormatError(format!(
                "timezone offset out of range: {}",
                parsed.timezone
            )));
        }

        let condition = parsed
            .weather
            .first()
            .map(|w| w.description.clone())
            .unwrap_or_else(|| "Unknown".to_string());

        Ok(LocationSnapshot {
            name: parsed.name,
            country: parsed.sys.country,
            latitude: parsed.coord.lat,
            longitude: parsed.coord.lon,
            utc_offset_secs: parsed.timezone,
            temperature: parsed.main.temp,
            condition,
            humidity_pct: parsed.main.humidity,
        })
    }

    async fn daily_aggregate(&self, latitude: f64, longitude: f64) -> PrimaryOutcome<DailyRange> {
        let query = [
            ("lat", latitude.to_string()),
            ("lon", longitude.to_string()),
            ("exclude", DAILY_EXCLUDE.to_string()),
        ];

        let (status, body) = match self.get("daily", &self.endpoints.daily, &query).await {
            Ok(res) => res,
            Err(e) => {
                return PrimaryOutcome::Unavailable(Unavailable::Transport(
                    e.without_url().to_string(),
                ));
            }
        };

        if !status.is_success() {
            return PrimaryOutcome::Unavailable(Unavailable::Status(status.as_u16()));
        }

        let parsed: OwOneCallResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(e) => return PrimaryOutcome::Unavailable(Unavailable::Malformed(e.to_string())),
        };

        let Some(today) = parsed.daily.unwrap_or_default().into_iter().next() else {
            return PrimaryOutcome::Unavailable(Unavailable::EmptyDaily);
        };

        match DailyRange::new(today.temp.min, today.temp.max) {
            Some(range) => PrimaryOutcome::Available(range),
            None => PrimaryOutcome::Unavailable(Unavailable::Malformed(format!(
                "daily[0] min {} / max {} is not a valid range",
                today.temp.min, today.temp.max
            ))),
        }
    }

    async fn interval_forecast(&self, place: &str) -> Result<Vec<ForecastSlice>, WeatherError> {
        let (status, body) = self
            .get("forecast", &self.endpoints.forecast, &[("q", place.to_string())])
            .await?;

        if !status.is_success() {
            return Err(WeatherError::from_status(status.as_u16(), place, error_message(&body)));
        }

        let parsed: OwForecastResponse = serde_json::from_str(&body)
            .map_err(|e| WeatherError::UpstreamFormatError(format!("forecast: {e}")))?;

        parsed
            .list
            .into_iter()
            .map(|entry| -> Result<ForecastSlice, WeatherError> {
                let at = DateTime::from_timestamp(entry.dt, 0).ok_or_else(|| {
                    WeatherError::UpstreamFormatError(format!("invalid timestamp {}", entry.dt))
                })?;
                let main = entry.main;

                Ok(ForecastSlice {
                    at,
                    reading: Reading::from_parts(main.temp_min, main.temp_max, main.temp),
                })
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    coord: OwCoord,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    sys: OwSys,
    /// Seconds east of UTC.
    #[serde(default)]
    timezone: i32,
}

#[derive(Debug, Deserialize)]
struct OwDailyTemp {
    min: f64,
    max: f64,
}

#[derive(Debug, Deserialize)]
struct OwDaily {
    temp: OwDailyTemp,
}

#[derive(Debug, Deserialize)]
struct OwOneCallResponse {
    daily: Option<Vec<OwDaily>>,
}

#[derive(Debug, Default, Deserialize)]
struct OwForecastMain {
    temp: Option<f64>,
    temp_min: Option<f64>,
    temp_max: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    #[serde(default)]
    main: OwForecastMain,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    #[serde(default)]
    list: Vec<OwForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct OwErrorBody {
    message: Option<String>,
}

/// Prefer the upstream `message` field, else the raw body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<OwErrorBody>(body) {
        Ok(OwErrorBody { message: Some(msg) }) => msg,
        _ => truncate_body(body.trim()),
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
