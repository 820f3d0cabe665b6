use std::fmt::Display;

use chrono::{Local, TimeZone};
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::{
    error::LookupError,
    forecast::aggregate_forecast_in,
    model::{CanonicalWeather, CityReport, DailyForecast},
    normalize::normalize_current_in,
    provider::WeatherSource,
};

/// Fetches provider payloads and runs them through the normalizers.
///
/// Clock strings and calendar days are computed in `Tz`, the local zone of the
/// serving process unless replaced with [`WeatherService::with_time_zone`].
#[derive(Debug)]
pub struct WeatherService<S, Tz = Local> {
    source: S,
    tz: Tz,
}

impl<S: WeatherSource> WeatherService<S, Local> {
    pub fn new(source: S) -> Self {
        Self { source, tz: Local }
    }
}

impl<S, Tz> WeatherService<S, Tz>
where
    S: WeatherSource,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    pub fn with_time_zone<T: TimeZone>(self, tz: T) -> WeatherService<S, T> {
        WeatherService {
            source: self.source,
            tz,
        }
    }

    #[instrument(skip(self))]
    pub async fn current(&self, city: &str) -> Result<CanonicalWeather, LookupError> {
        let city = validate_city(city)?;
        info!("fetching current weather");

        let body = self.source.fetch_current(city).await?;
        let weather = normalize_current_in(&parse_body(&body)?, &self.tz)?;

        info!(
            city = %weather.city,
            country = %weather.country_code,
            "current weather ready"
        );
        Ok(weather)
    }

    #[instrument(skip(self))]
    pub async fn forecast(&self, city: &str) -> Result<Vec<DailyForecast>, LookupError> {
        let city = validate_city(city)?;
        info!("fetching 5-day forecast");

        let body = self.source.fetch_forecast(city).await?;
        let days = aggregate_forecast_in(&parse_body(&body)?, &self.tz)?;

        info!(days = days.len(), "forecast ready");
        Ok(days)
    }

    /// Current conditions plus forecast. Only the current lookup must succeed;
    /// a failed forecast leaves the report's forecast empty.
    pub async fn lookup(&self, city: &str) -> Result<CityReport, LookupError> {
        let weather = self.current(city).await?;

        let forecast = match self.forecast(city).await {
            Ok(days) => days,
            Err(e) => {
                warn!(city, error = %e, "forecast unavailable, showing current weather only");
                Vec::new()
            }
        };

        Ok(CityReport { weather, forecast })
    }
}

fn validate_city(city: &str) -> Result<&str, LookupError> {
    let city = city.trim();
    if city.is_empty() {
        warn!("weather lookup with empty city");
        return Err(LookupError::BlankCity);
    }
    Ok(city)
}

fn parse_body(body: &str) -> Result<Value, LookupError> {
    serde_json::from_str(body)
        .map_err(|e| LookupError::malformed(format!("response is not JSON: {e}")))
}
