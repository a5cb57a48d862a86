//! Today's min/max for a place, from whichever upstream tier can answer.
//!
//! Order of work per lookup:
//! 1. current conditions (mandatory; any error is final)
//! 2. daily aggregate (optional; any failure means "try the next tier")
//! 3. interval forecast bucketed by local date (mandatory once reached)
//!
//! A result comes from exactly one tier. Nothing is cached between lookups.

use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::{
    DailyRange, RangeSource, WeatherError, WeatherReport, bucketing,
    provider::{PrimaryOutcome, WeatherProvider},
};

#[derive(Debug, Clone)]
pub struct Resolver<P> {
    provider: P,
}

impl<P: WeatherProvider> Resolver<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Today's `(min, max)` for `place`.
    pub async fn today_range(&self, place: &str) -> Result<DailyRange, WeatherError> {
        self.lookup(place).await.map(|report| report.range)
    }

    /// Current conditions plus today's range.
    pub async fn lookup(&self, place: &str) -> Result<WeatherReport, WeatherError> {
        self.lookup_at(place, Utc::now()).await
    }

    /// Same as [`Resolver::lookup`] with an explicit "now".
    #[instrument(skip(self), level = "info")]
    pub async fn lookup_at(
        &self,
        place: &str,
        now: DateTime<Utc>,
    ) -> Result<WeatherReport, WeatherError> {
        let place = place.trim();
        if place.is_empty() {
            return Err(WeatherError::InvalidPlace);
        }

        let location = self.provider.current_conditions(place).await?;
        let offset = location.offset().ok_or_else(|| {
            WeatherError::UpstreamFormatError(format!(
                "timezone offset out of range: {}",
                location.utc_offset_secs
            ))
        })?;

        match self
            .provider
            .daily_aggregate(location.latitude, location.longitude)
            .await
        {
            PrimaryOutcome::Available(range) => {
                tracing::info!(min = range.min(), max = range.max(), "using daily aggregate");
                return Ok(WeatherReport { location, range, source: RangeSource::DailyAggregate });
            }
            PrimaryOutcome::Unavailable(reason) => {
                tracing::warn!(%reason, "daily aggregate unavailable, falling back to 3-hour forecast");
            }
        }

        let slices = self.provider.interval_forecast(place).await?;
        let range = bucketing::today_range(&slices, offset, now)?;

        tracing::info!(
            min = range.min(),
            max = range.max(),
            slices = slices.len(),
            "derived range from 3-hour forecast"
        );

        Ok(WeatherReport { location, range, source: RangeSource::IntervalForecast })
    }
}
