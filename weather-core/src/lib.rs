//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The upstream provider abstraction and its OpenWeather implementation
//! - Local-date bucketing of 3-hour forecast slices
//! - The resolver that turns a place name into today's min/max
//!
//! It is used by `weather-cli`, but can also be reused by other binaries or services.

pub mod bucketing;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod resolver;

pub use config::{Config, Units};
pub use error::WeatherError;
pub use model::{DailyRange, ForecastSlice, LocationSnapshot, RangeSource, Reading, WeatherReport};
pub use provider::openweather::{Endpoints, OpenWeatherProvider};
pub use provider::{PrimaryOutcome, Unavailable, WeatherProvider, provider_from_config};
pub use resolver::Resolver;
