//! Typed view of the OpenWeather JSON payloads.
//!
//! Every field the provider may omit is an `Option` here. Defaults are applied
//! in a single pass by [`crate::normalize`] and [`crate::forecast`], never while
//! reading.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

const SUCCESS_CODE: &str = "200";

/// Whether the provider's `cod` discriminator reports success.
///
/// The current-weather endpoint sends `200` as a number and the forecast
/// endpoint sends `"200"` as a string, so both are compared in string form.
pub fn status_is_success(payload: &Map<String, Value>) -> bool {
    match payload.get("cod") {
        Some(Value::String(code)) => code == SUCCESS_CODE,
        Some(Value::Number(code)) => code.to_string() == SUCCESS_CODE,
        _ => false,
    }
}

/// Display form of the discriminator, for logs.
pub(crate) fn status_code(payload: &Map<String, Value>) -> String {
    match payload.get("cod") {
        Some(Value::String(code)) => code.clone(),
        Some(other) => other.to_string(),
        None => "missing".to_string(),
    }
}

/// One current-conditions observation (`/weather`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawObservation {
    pub name: Option<String>,
    pub coord: Option<RawCoord>,
    pub weather: Option<Vec<RawCondition>>,
    pub main: Option<RawMain>,
    pub visibility: Option<f64>,
    pub wind: Option<RawWind>,
    pub clouds: Option<RawClouds>,
    pub sys: Option<RawSys>,
    #[serde(deserialize_with = "lenient_timestamp")]
    pub timezone: Option<i64>,
    pub rain: Option<RawPrecipitation>,
    pub snow: Option<RawPrecipitation>,
}

/// One 3-hour forecast sample (`/forecast` → `list[i]`).
///
/// `dt` and `main` are required; a sample without them cannot be placed on a
/// calendar day and is skipped by the aggregator.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSample {
    #[serde(deserialize_with = "numeric_timestamp")]
    pub dt: i64,
    pub main: RawMain,
    #[serde(default)]
    pub weather: Option<Vec<RawCondition>>,
    #[serde(default)]
    pub wind: Option<RawWind>,
    #[serde(default)]
    pub pop: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCoord {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCondition {
    pub main: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawMain {
    pub temp: Option<f64>,
    pub feels_like: Option<f64>,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawWind {
    pub speed: Option<f64>,
    /// Non-numeric bearings are read as absent rather than failing the record.
    #[serde(deserialize_with = "lenient_number")]
    pub deg: Option<f64>,
    pub gust: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawClouds {
    pub all: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSys {
    pub country: Option<String>,
    #[serde(deserialize_with = "lenient_timestamp")]
    pub sunrise: Option<i64>,
    #[serde(deserialize_with = "lenient_timestamp")]
    pub sunset: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawPrecipitation {
    #[serde(rename = "1h")]
    pub one_hour: Option<f64>,
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Value::as_f64))
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|secs| secs as i64))))
}

/// Integer or float seconds; anything else fails the sample.
fn numeric_timestamp<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|secs| secs as i64))
        .ok_or_else(|| serde::de::Error::custom(format!("expected a timestamp, found {value}")))
}
