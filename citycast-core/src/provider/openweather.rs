use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, error};

use crate::{config::ApiSettings, error::TransportError};

use super::WeatherSource;

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String, settings: &ApiSettings) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to build HTTP client for OpenWeather")?;

        Ok(Self {
            api_key,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn fetch(&self, endpoint: &str, city: &str) -> Result<String, TransportError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(%url, city, "requesting OpenWeather");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|e| classify(endpoint, city, e))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| classify(endpoint, city, e))?;

        // A 404 still carries a `cod` body; the normalizers turn it into NotFound.
        if !status.is_success() && status != StatusCode::NOT_FOUND {
            error!(endpoint, city, %status, "OpenWeather request failed");
            return Err(TransportError::Http {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn fetch_current(&self, city: &str) -> Result<String, TransportError> {
        self.fetch("weather", city).await
    }

    async fn fetch_forecast(&self, city: &str) -> Result<String, TransportError> {
        self.fetch("forecast", city).await
    }
}

fn classify(endpoint: &str, city: &str, err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        error!(endpoint, city, "timeout talking to OpenWeather");
        TransportError::Timeout
    } else {
        error!(endpoint, city, error = %err, "request error talking to OpenWeather");
        TransportError::Network(err.to_string())
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
