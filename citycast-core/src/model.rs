use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::wind::CompassDirection;

/// Normalized current conditions for one city. Every field is always set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalWeather {
    pub city: String,
    pub country_code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub condition_main: String,
    pub description: String,
    pub icon_id: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: u32,
    pub pressure: u32,
    pub visibility_km: f64,
    pub wind_speed: f64,
    pub wind_degrees: f64,
    pub wind_gust: f64,
    pub wind_direction: CompassDirection,
    pub cloudiness: u32,
    pub sunrise_local: String,
    pub sunset_local: String,
    pub timezone_offset_seconds: i64,
    pub rain_last_hour_mm: f64,
    pub snow_last_hour_mm: f64,
}

/// One calendar day of forecast, built from the 3-hour samples of that day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub day_name: String,
    pub temp_max: f64,
    pub temp_min: f64,
    pub temp: f64,
    pub humidity: u32,
    pub description: String,
    pub icon_id: String,
    pub wind_speed: f64,
    pub rain_chance_percent: u32,
}

/// Current conditions plus whatever forecast could be fetched alongside them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityReport {
    pub weather: CanonicalWeather,
    pub forecast: Vec<DailyForecast>,
}
