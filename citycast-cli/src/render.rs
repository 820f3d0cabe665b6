use chrono::NaiveDate;
use citycast_core::{CanonicalWeather, CityReport, DailyForecast};

pub fn city_report(report: &CityReport) -> String {
    let mut out = current_weather(&report.weather);
    out.push('\n');

    if report.forecast.is_empty() {
        out.push_str("Forecast unavailable.\n");
    } else {
        out.push_str("5-day forecast\n");
        out.push_str(&forecast_table(&report.forecast));
    }
    out
}

pub fn current_weather(w: &CanonicalWeather) -> String {
    format!(
        "{}, {}  ({:.4}, {:.4})\n\
         {} [{}]  {:.1}°C, feels like {:.1}°C\n\
         Low / High:  {:.1}°C / {:.1}°C\n\
         Humidity:    {}%   Pressure: {} hPa   Visibility: {:.1} km\n\
         Wind:        {:.1} m/s {} ({}°), gusts {:.1} m/s\n\
         Clouds:      {}%   Rain (1h): {:.1} mm   Snow (1h): {:.1} mm\n\
         Sunrise:     {}   Sunset: {}\n",
        w.city,
        w.country_code,
        w.latitude,
        w.longitude,
        display_description(w),
        w.icon_id,
        w.temperature,
        w.feels_like,
        w.temp_min,
        w.temp_max,
        w.humidity,
        w.pressure,
        w.visibility_km,
        w.wind_speed,
        w.wind_direction,
        w.wind_degrees,
        w.wind_gust,
        w.cloudiness,
        w.rain_last_hour_mm,
        w.snow_last_hour_mm,
        w.sunrise_local,
        w.sunset_local,
    )
}

pub fn forecast_heading(location: Option<&CanonicalWeather>, city: &str) -> String {
    match location {
        Some(w) => format!(
            "5-day forecast for {}, {}  ({:.4}, {:.4})",
            w.city, w.country_code, w.latitude, w.longitude
        ),
        None => format!("5-day forecast for {}", city.trim()),
    }
}

pub fn forecast_table(days: &[DailyForecast]) -> String {
    days.iter().map(forecast_row).collect()
}

fn forecast_row(day: &DailyForecast) -> String {
    format!(
        "{:<10} {}  {:>6.1}°C  low {:>5.1}  high {:>5.1}  hum {:>3}%  wind {:>4.1} m/s  rain {:>3}%  {}\n",
        short_date(day.date),
        day.day_name.chars().take(3).collect::<String>(),
        day.temp,
        day.temp_min,
        day.temp_max,
        day.humidity,
        day.wind_speed,
        day.rain_chance_percent,
        day.description
    )
}

fn short_date(date: NaiveDate) -> String {
    date.format("%d %b %Y").to_string()
}

fn display_description(w: &CanonicalWeather) -> &str {
    if w.description.is_empty() {
        &w.condition_main
    } else {
        &w.description
    }
}
