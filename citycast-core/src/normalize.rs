//! Current-conditions normalization: provider JSON → [`CanonicalWeather`].

use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    error::LookupError,
    model::CanonicalWeather,
    raw::{RawObservation, status_code, status_is_success},
    rounding::{round_to, whole},
    wind::CompassDirection,
};

const UNKNOWN_CITY: &str = "Unknown";
const UNKNOWN_COUNTRY: &str = "N/A";
const DEFAULT_CONDITION: &str = "Clear";
const DEFAULT_ICON: &str = "01d";
pub(crate) const NOT_AVAILABLE: &str = "N/A";

const CLOCK_FORMAT: &str = "%I:%M %p";

/// Normalize a `/weather` payload, rendering sunrise and sunset in the local
/// time zone of this process.
pub fn normalize_current(payload: &Value) -> Result<CanonicalWeather, LookupError> {
    normalize_current_in(payload, &Local)
}

/// Same as [`normalize_current`] with an explicit time zone for clock values.
pub fn normalize_current_in<Tz>(payload: &Value, tz: &Tz) -> Result<CanonicalWeather, LookupError>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let object = payload
        .as_object()
        .ok_or_else(|| LookupError::malformed("current weather payload is not a JSON object"))?;

    if !status_is_success(object) {
        warn!(code = %status_code(object), "provider reported location not found");
        return Err(LookupError::NotFound);
    }

    let raw = RawObservation::deserialize(payload)
        .map_err(|e| LookupError::malformed(format!("current weather: {e}")))?;

    let weather = canonicalize(raw, tz);
    debug!(
        city = %weather.city,
        country = %weather.country_code,
        "normalized current weather"
    );
    Ok(weather)
}

fn canonicalize<Tz>(raw: RawObservation, tz: &Tz) -> CanonicalWeather
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let RawObservation {
        name,
        coord,
        weather,
        main,
        visibility,
        wind,
        clouds,
        sys,
        timezone,
        rain,
        snow,
    } = raw;

    let coord = coord.unwrap_or_default();
    let condition = weather
        .and_then(|conditions| conditions.into_iter().next())
        .unwrap_or_default();
    let main = main.unwrap_or_default();
    let wind = wind.unwrap_or_default();
    let sys = sys.unwrap_or_default();

    let visibility_km = match visibility {
        Some(meters) if meters > 0.0 => round_to(meters / 1000.0, 1),
        _ => 0.0,
    };
    let wind_degrees = wind.deg.unwrap_or(0.0);

    CanonicalWeather {
        city: name.unwrap_or_else(|| UNKNOWN_CITY.to_string()),
        country_code: sys.country.unwrap_or_else(|| UNKNOWN_COUNTRY.to_string()),
        latitude: round_to(coord.lat.unwrap_or(0.0), 4),
        longitude: round_to(coord.lon.unwrap_or(0.0), 4),
        condition_main: condition.main.unwrap_or_else(|| DEFAULT_CONDITION.to_string()),
        description: title_case(condition.description.as_deref().unwrap_or_default()),
        icon_id: condition.icon.unwrap_or_else(|| DEFAULT_ICON.to_string()),
        temperature: round_to(main.temp.unwrap_or(0.0), 1),
        feels_like: round_to(main.feels_like.unwrap_or(0.0), 1),
        temp_min: round_to(main.temp_min.unwrap_or(0.0), 1),
        temp_max: round_to(main.temp_max.unwrap_or(0.0), 1),
        humidity: whole(main.humidity.unwrap_or(0.0)),
        pressure: whole(main.pressure.unwrap_or(0.0)),
        visibility_km,
        wind_speed: round_to(wind.speed.unwrap_or(0.0), 1),
        wind_degrees,
        wind_gust: round_to(wind.gust.unwrap_or(0.0), 1),
        wind_direction: CompassDirection::from_degrees(wind_degrees),
        cloudiness: whole(clouds.and_then(|c| c.all).unwrap_or(0.0)),
        sunrise_local: local_clock(sys.sunrise, tz),
        sunset_local: local_clock(sys.sunset, tz),
        timezone_offset_seconds: timezone.unwrap_or(0),
        rain_last_hour_mm: round_to(rain.and_then(|r| r.one_hour).unwrap_or(0.0), 1),
        snow_last_hour_mm: round_to(snow.and_then(|s| s.one_hour).unwrap_or(0.0), 1),
    }
}

/// "hh:mm AM/PM" for an epoch timestamp, or "N/A" when there is nothing to show.
fn local_clock<Tz>(timestamp: Option<i64>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    timestamp
        .filter(|secs| *secs != 0)
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|utc| utc.with_timezone(tz).format(CLOCK_FORMAT).to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Capitalize the first letter of every run of letters and lowercase the rest.
pub(crate) fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut word_start = true;

    for ch in text.chars() {
        if ch.is_alphabetic() {
            if word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            word_start = false;
        } else {
            out.push(ch);
            word_start = true;
        }
    }

    out
}
