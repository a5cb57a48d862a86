//! Derive today's range from interval forecast slices.
//!
//! "Today" is the calendar date of `now` at the location's fixed UTC offset.
//! Offsets are applied to instants with `FixedOffset`; wall-clock values are
//! never shifted by hand.
//!
//! When no slice lands on today's date (late evening, near the end of the
//! upstream reporting window) the selection widens to `[now, now + 24h]`.
//! Near midnight this pulls tomorrow's early-morning values into "today";
//! that is the accepted behavior, an empty answer is worse.

use chrono::{DateTime, Duration, FixedOffset, Utc};

use crate::{DailyRange, ForecastSlice, WeatherError};

const WIDENED_WINDOW_HOURS: i64 = 24;

pub fn today_range(
    slices: &[ForecastSlice],
    offset: FixedOffset,
    now: DateTime<Utc>,
) -> Result<DailyRange, WeatherError> {
    let today = now.with_timezone(&offset).date_naive();

    let mut selected: Vec<&ForecastSlice> = slices
        .iter()
        .filter(|s| s.at.with_timezone(&offset).date_naive() == today)
        .collect();

    if selected.is_empty() {
        let end = now + Duration::hours(WIDENED_WINDOW_HOURS);
        selected = slices.iter().filter(|s| now <= s.at && s.at <= end).collect();
        tracing::debug!(
            count = selected.len(),
            "no slices on local date {today}, widened to next {WIDENED_WINDOW_HOURS}h"
        );
    }

    if selected.is_empty() {
        return Err(WeatherError::ForecastUnavailable);
    }

    let (lo, hi) = selected
        .iter()
        .filter_map(|s| s.reading.bounds())
        .reduce(|(lo, hi), (a, b)| (lo.min(a), hi.max(b)))
        .ok_or(WeatherError::IncompleteForecastData)?;

    DailyRange::new(lo, hi).ok_or(WeatherError::IncompleteForecastData)
}
