//! Forecast aggregation: 3-hour samples → at most five [`DailyForecast`]s.
//!
//! The first sample seen for a date fixes every field of that day except the
//! temperature range, which keeps widening as later samples of the same date
//! arrive. Days come out in the order they were first seen.

use std::collections::HashMap;

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    error::LookupError,
    model::DailyForecast,
    normalize::{NOT_AVAILABLE, title_case},
    raw::{RawSample, status_code, status_is_success},
    rounding::{round_to, whole},
};

/// Maximum number of days returned.
pub const MAX_FORECAST_DAYS: usize = 5;

/// Aggregate a `/forecast` payload using the local time zone of this process
/// to decide which calendar day each sample belongs to.
pub fn aggregate_forecast(payload: &Value) -> Result<Vec<DailyForecast>, LookupError> {
    aggregate_forecast_in(payload, &Local)
}

/// Same as [`aggregate_forecast`] with an explicit time zone for day boundaries.
pub fn aggregate_forecast_in<Tz: TimeZone>(
    payload: &Value,
    tz: &Tz,
) -> Result<Vec<DailyForecast>, LookupError> {
    let object = payload
        .as_object()
        .ok_or_else(|| LookupError::malformed("forecast payload is not a JSON object"))?;

    if !status_is_success(object) {
        warn!(code = %status_code(object), "provider reported forecast location not found");
        return Err(LookupError::NotFound);
    }

    let samples = match object.get("list") {
        None | Some(Value::Null) => return Err(LookupError::Empty),
        Some(Value::Array(samples)) => samples,
        Some(_) => return Err(LookupError::malformed("forecast `list` is not an array")),
    };

    if samples.is_empty() {
        warn!("forecast contained no samples");
        return Err(LookupError::Empty);
    }

    let mut days = DayTable::default();
    for (index, sample) in samples.iter().enumerate() {
        let sample = match RawSample::deserialize(sample) {
            Ok(sample) => sample,
            Err(e) => {
                warn!(index, error = %e, "skipping malformed forecast sample");
                continue;
            }
        };

        let Some(date) = DateTime::from_timestamp(sample.dt, 0)
            .map(|utc| utc.with_timezone(tz).date_naive())
        else {
            warn!(index, dt = sample.dt, "skipping forecast sample with out-of-range timestamp");
            continue;
        };

        days.record(date, &sample);
    }

    let forecast = days.finish();
    if forecast.is_empty() {
        warn!("no valid forecast samples");
        return Err(LookupError::Empty);
    }

    debug!(days = forecast.len(), "aggregated forecast");
    Ok(forecast)
}

/// Per-date state while samples are being folded in.
#[derive(Debug)]
struct DayAccumulator {
    date: NaiveDate,
    temp: f64,
    temp_max: f64,
    temp_min: f64,
    humidity: f64,
    description: String,
    icon_id: String,
    wind_speed: f64,
    rain_chance: f64,
}

impl DayAccumulator {
    fn seed(date: NaiveDate, sample: &RawSample) -> Self {
        // An empty `weather` array counts as no conditions at all.
        let condition = sample.weather.as_deref().and_then(<[_]>::first).cloned();

        let (description, icon_id) = match condition {
            Some(condition) => (
                title_case(condition.description.as_deref().unwrap_or_default()),
                condition.icon.unwrap_or_default(),
            ),
            None => (NOT_AVAILABLE.to_string(), String::new()),
        };

        Self {
            date,
            temp: sample.main.temp.unwrap_or(0.0),
            temp_max: sample.main.temp_max.unwrap_or(0.0),
            temp_min: sample.main.temp_min.unwrap_or(0.0),
            humidity: sample.main.humidity.unwrap_or(0.0),
            description,
            icon_id,
            wind_speed: sample
                .wind
                .as_ref()
                .and_then(|wind| wind.speed)
                .unwrap_or(0.0),
            rain_chance: sample.pop.unwrap_or(0.0) * 100.0,
        }
    }

    fn widen(&mut self, sample: &RawSample) {
        let temp_max = sample.main.temp_max.unwrap_or(0.0);
        let temp_min = sample.main.temp_min.unwrap_or(0.0);

        if temp_max > self.temp_max {
            self.temp_max = temp_max;
        }
        if temp_min < self.temp_min {
            self.temp_min = temp_min;
        }
    }

    fn finish(self) -> DailyForecast {
        DailyForecast {
            date: self.date,
            day_name: self.date.format("%A").to_string(),
            temp_max: round_to(self.temp_max, 1),
            temp_min: round_to(self.temp_min, 1),
            temp: round_to(self.temp, 1),
            humidity: whole(self.humidity),
            description: self.description,
            icon_id: self.icon_id,
            wind_speed: round_to(self.wind_speed, 1),
            rain_chance_percent: whole(self.rain_chance),
        }
    }
}

/// Accumulators in first-seen order, with an index for date lookups.
#[derive(Debug, Default)]
struct DayTable {
    order: Vec<DayAccumulator>,
    index: HashMap<NaiveDate, usize>,
}

impl DayTable {
    fn record(&mut self, date: NaiveDate, sample: &RawSample) {
        match self.index.get(&date) {
            Some(&slot) => self.order[slot].widen(sample),
            None => {
                self.index.insert(date, self.order.len());
                self.order.push(DayAccumulator::seed(date, sample));
            }
        }
    }

    fn finish(self) -> Vec<DailyForecast> {
        self.order
            .into_iter()
            .take(MAX_FORECAST_DAYS)
            .map(DayAccumulator::finish)
            .collect()
    }
}
