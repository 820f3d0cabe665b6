//! Core library for the `citycast` CLI.
//!
//! This crate defines:
//! - Normalization of OpenWeather current conditions into [`CanonicalWeather`]
//! - Aggregation of the 3-hour forecast feed into [`DailyForecast`] days
//! - The OpenWeather HTTP source and the [`WeatherService`] that composes them
//! - The JSON-file user store and on-disk configuration
//!
//! The normalization functions are pure: no I/O, no shared state. Everything
//! that talks to the network or the filesystem lives in `provider`, `users`
//! and `config`.

pub mod config;
pub mod error;
pub mod forecast;
pub mod model;
pub mod normalize;
pub mod provider;
pub mod raw;
pub mod rounding;
pub mod service;
pub mod users;
pub mod wind;

pub use config::{ApiSettings, Config};
pub use error::{LookupError, TransportError};
pub use forecast::{MAX_FORECAST_DAYS, aggregate_forecast, aggregate_forecast_in};
pub use model::{CanonicalWeather, CityReport, DailyForecast};
pub use normalize::{normalize_current, normalize_current_in};
pub use provider::{WeatherSource, openweather::OpenWeatherClient, source_from_config};
pub use service::WeatherService;
pub use users::{RegistrationError, User, UserStore};
pub use wind::CompassDirection;
