use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// Current conditions for a resolved place, plus what later steps need
/// (coordinates and the fixed UTC offset).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSnapshot {
    pub name: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Seconds east of UTC.
    pub utc_offset_secs: i32,
    pub temperature: f64,
    pub condition: String,
    pub humidity_pct: u8,
}

impl LocationSnapshot {
    pub fn offset(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_secs)
    }

    /// `now` as seen on the location's wall clock.
    pub fn local_now(&self, now: DateTime<Utc>) -> Option<DateTime<FixedOffset>> {
        self.offset().map(|tz| now.with_timezone(&tz))
    }
}

/// Temperature carried by one forecast slice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Reading {
    Range { min: f64, max: f64 },
    Point(f64),
    Missing,
}

impl Reading {
    /// Build from the optional upstream fields. A complete range wins over a point.
    pub fn from_parts(min: Option<f64>, max: Option<f64>, point: Option<f64>) -> Self {
        match (min, max, point) {
            (Some(min), Some(max), _) => Self::Range { min, max },
            (_, _, Some(t)) => Self::Point(t),
            _ => Self::Missing,
        }
    }

    /// Ordered `(lo, hi)` contribution, or `None` when nothing usable is present.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        let (a, b) = match *self {
            Self::Range { min, max } => (min, max),
            Self::Point(t) => (t, t),
            Self::Missing => return None,
        };

        if !a.is_finite() || !b.is_finite() {
            return None;
        }

        Some((a.min(b), a.max(b)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastSlice {
    pub at: DateTime<Utc>,
    pub reading: Reading,
}

/// Today's resolved minimum and maximum. `min <= max` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRange")]
pub struct DailyRange {
    min: f64,
    max: f64,
}

#[derive(Deserialize)]
struct RawRange {
    min: f64,
    max: f64,
}

impl TryFrom<RawRange> for DailyRange {
    type Error = String;

    fn try_from(raw: RawRange) -> Result<Self, Self::Error> {
        DailyRange::new(raw.min, raw.max)
            .ok_or_else(|| format!("invalid range: min {} / max {}", raw.min, raw.max))
    }
}

impl DailyRange {
    pub fn new(min: f64, max: f64) -> Option<Self> {
        if min.is_finite() && max.is_finite() && min <= max {
            Some(Self { min, max })
        } else {
            None
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

/// Which upstream tier produced a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeSource {
    DailyAggregate,
    IntervalForecast,
}

impl RangeSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DailyAggregate => "daily aggregate",
            Self::IntervalForecast => "3-hour forecast",
        }
    }
}

impl std::fmt::Display for RangeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub location: LocationSnapshot,
    pub range: DailyRange,
    pub source: RangeSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_wins_over_point() {
        let r = Reading::from_parts(Some(3.0), Some(9.0), Some(5.0));
        assert_eq!(r, Reading::Range { min: 3.0, max: 9.0 });
    }

    #[test]
    fn half_range_falls_back_to_point() {
        let r = Reading::from_parts(Some(3.0), None, Some(5.0));
        assert_eq!(r, Reading::Point(5.0));
        assert_eq!(Reading::from_parts(None, Some(1.0), None), Reading::Missing);
    }

    #[test]
    fn bounds_are_ordered_and_finite() {
        assert_eq!(Reading::Range { min: 9.0, max: 3.0 }.bounds(), Some((3.0, 9.0)));
        assert_eq!(Reading::Point(4.5).bounds(), Some((4.5, 4.5)));
        assert_eq!(Reading::Point(f64::NAN).bounds(), None);
        assert_eq!(Reading::Missing.bounds(), None);
    }

    #[test]
    fn daily_range_rejects_inverted_or_nan() {
        assert!(DailyRange::new(5.0, 20.0).is_some());
        assert!(DailyRange::new(7.0, 7.0).is_some());
        assert!(DailyRange::new(20.0, 5.0).is_none());
        assert!(DailyRange::new(f64::NAN, 5.0).is_none());
    }

    #[test]
    fn deserialized_range_keeps_min_below_max() {
        let ok: DailyRange = serde_json::from_str(r#"{"min":5.0,"max":20.0}"#).expect("valid");
        assert_eq!((ok.min(), ok.max()), (5.0, 20.0));

        let err = serde_json::from_str::<DailyRange>(r#"{"min":20.0,"max":5.0}"#).unwrap_err();
        assert!(err.to_string().contains("invalid range"));
    }

    #[test]
    fn report_with_inverted_range_is_rejected() {
        let body = r#"{
            "location": {
                "name": "Oslo", "country": "NO", "latitude": 59.9, "longitude": 10.7,
                "utc_offset_secs": 7200, "temperature": 12.0,
                "condition": "clear sky", "humidity_pct": 50
            },
            "range": { "min": 20.0, "max": 5.0 },
            "source": "interval_forecast"
        }"#;

        assert!(serde_json::from_str::<WeatherReport>(body).is_err());
        assert!(serde_json::from_str::<WeatherReport>(&body.replace("20.0", "2.0")).is_ok());
    }

    #[test]
    fn local_now_applies_offset() {
        let snap = LocationSnapshot {
            name: "Tokyo".into(),
            country: "JP".into(),
            latitude: 35.68,
            longitude: 139.69,
            utc_offset_secs: 9 * 3600,
            temperature: 20.0,
            condition: "clear sky".into(),
            humidity_pct: 40,
        };
        let now = DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp");
        let local = snap.local_now(now).expect("valid offset");

        assert_eq!(local.timestamp(), now.timestamp());
        assert_eq!(local.offset().local_minus_utc(), 9 * 3600);
    }
}
