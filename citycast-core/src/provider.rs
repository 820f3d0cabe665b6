use crate::{Config, error::TransportError, provider::openweather::OpenWeatherClient};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Raw access to a weather provider.
///
/// Implementations return the response body untouched; turning it into
/// domain values is the job of [`crate::normalize`] and [`crate::forecast`].
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    /// Body of the current-conditions endpoint for `city`.
    async fn fetch_current(&self, city: &str) -> Result<String, TransportError>;

    /// Body of the 5-day / 3-hour forecast endpoint for `city`.
    async fn fetch_forecast(&self, city: &str) -> Result<String, TransportError>;
}

/// Construct the OpenWeather source described by `config`.
pub fn source_from_config(config: &Config) -> anyhow::Result<OpenWeatherClient> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No OpenWeather API key configured.\n\
                 Hint: run `citycast configure` or set OPENWEATHER_API_KEY."
        )
    })?;

    OpenWeatherClient::new(api_key, &config.api)
}
