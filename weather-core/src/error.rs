use thiserror::Error;

/// Every way a daily range lookup can fail.
///
/// A lookup returns either a [`DailyRange`](crate::DailyRange) or exactly one
/// of these; no partial results.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeatherError {
    #[error("Place name must not be empty")]
    InvalidPlace,

    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("Credentials rejected by upstream (HTTP {status})")]
    AuthFailure { status: u16 },

    #[error("Rate limited by upstream")]
    RateLimited,

    #[error("Network error: {0}")]
    TransientNetworkError(String),

    #[error("Unexpected upstream data: {0}")]
    UpstreamFormatError(String),

    #[error("Upstream request failed with HTTP {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("No forecast slices found for today or the next 24 hours")]
    ForecastUnavailable,

    #[error("Forecast slices carried no usable temperatures")]
    IncompleteForecastData,
}

impl WeatherError {
    /// One-line text suitable for showing to whoever typed the place name.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidPlace => "Please enter a city name.".to_string(),
            Self::LocationNotFound(_) => "City not found.".to_string(),
            Self::AuthFailure { .. } => {
                "Unauthorized: Check your API key or plan for this endpoint.".to_string()
            }
            Self::RateLimited => "Rate limit exceeded. Try again later.".to_string(),
            Self::TransientNetworkError(_) => "Network error.".to_string(),
            Self::UpstreamFormatError(what) => format!("Unexpected data format: {what}"),
            Self::Upstream { status: 400, message } if message.is_empty() => {
                "Bad request: Please verify inputs.".to_string()
            }
            Self::Upstream { status: 400, message } => format!("Bad request: {message}"),
            Self::Upstream { status, message } if message.is_empty() => {
                format!("HTTP {status}: Request failed.")
            }
            Self::Upstream { status, message } => format!("HTTP {status}: {message}"),
            Self::ForecastUnavailable => "Forecast data unavailable.".to_string(),
            Self::IncompleteForecastData => "Incomplete forecast data for min/max.".to_string(),
        }
    }

    /// Whether the caller may reasonably try the same lookup again later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited | Self::TransientNetworkError(_))
    }

    /// Map a non-success HTTP status from a mandatory source.
    pub(crate) fn from_status(status: u16, place: &str, message: String) -> Self {
        match status {
            401 | 403 => Self::AuthFailure { status },
            404 => Self::LocationNotFound(place.to_string()),
            429 => Self::RateLimited,
            _ => Self::Upstream { status, message },
        }
    }
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the API key.
        let err = err.without_url();
        if err.is_decode() {
            Self::UpstreamFormatError(err.to_string())
        } else {
            Self::TransientNetworkError(err.to_string())
        }
    }
}
