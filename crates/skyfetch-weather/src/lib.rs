//! Weather source for SkyFetch
//!
//! Fetches current conditions and the 5-day forecast for a named city from
//! OpenWeatherMap and normalizes them into render-ready view models.

pub mod error;
pub mod forecast;
pub mod provider;
pub mod types;

pub use error::{FetchError, FetchErrorKind};
pub use forecast::{normalize_forecast, select_midday_samples, MAX_FORECAST_DAYS, MIDDAY_MARKER};
pub use provider::{fetch_weather, OpenWeatherProvider, WeatherSource};
pub use types::*;
