use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{
    config::{DEFAULT_OPENWEATHER_URL, DEFAULT_TIMEOUT_SECS},
    model::{CurrentObservation, LocationQuery},
    provider::{http_client, truncate_body},
};

use super::{CurrentWeatherSource, Geocoder};

/// Queries shorter than this are not sent to the geocoder.
pub const MIN_QUERY_LEN: usize = 3;

/// OpenWeatherMap: direct geocoding and current conditions.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_base_url(
            api_key,
            DEFAULT_OPENWEATHER_URL,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    pub fn with_base_url(api_key: String, base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: http_client(timeout)?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwGeoEntry {
    name: String,
    country: String,
    state: Option<String>,
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwApiError {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    id: i32,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[async_trait]
impl Geocoder for OpenWeatherProvider {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<LocationQuery>> {
        if query.chars().count() < MIN_QUERY_LEN {
            return Ok(Vec::new());
        }

        let url = format!("{}/geo/1.0/direct", self.base_url);
        tracing::debug!(%query, limit, "searching cities");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", query.to_string()),
                ("limit", limit.to_string()),
                ("appid", self.api_key.clone()),
            ])
            .send()
            .await
            .context("Failed to send request to OpenWeather (geocoding)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read OpenWeather geocoding response body")?;

        if !status.is_success() {
            let message = serde_json::from_str::<OwApiError>(&body)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or_else(|| "An unknown API error occurred.".to_string());
            return Err(anyhow!(
                "Failed to fetch city suggestions ({status}): {message}"
            ));
        }

        let parsed: Option<Vec<OwGeoEntry>> =
            serde_json::from_str(&body).context("Failed to parse OpenWeather geocoding JSON")?;

        Ok(parsed
            .unwrap_or_default()
            .into_iter()
            .map(|e| LocationQuery {
                name: e.name,
                country: e.country,
                state: e.state,
                lat: e.lat,
                lon: e.lon,
            })
            .collect())
    }
}

#[async_trait]
impl CurrentWeatherSource for OpenWeatherProvider {
    async fn current(&self, lat: f64, lon: f64) -> Result<CurrentObservation> {
        let url = format!("{}/data/2.5/weather", self.base_url);
        tracing::debug!(lat, lon, "fetching current weather");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await
            .context("Failed to send request to OpenWeather (current weather)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read OpenWeather current response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather current request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: OwCurrentResponse =
            serde_json::from_str(&body).context("Failed to parse OpenWeather current JSON")?;

        let condition_code = parsed
            .weather
            .first()
            .map(|w| w.id)
            .ok_or_else(|| {
                anyhow!("OpenWeather current response contained no weather condition")
            })?;

        Ok(CurrentObservation {
            temperature_c: parsed.main.temp,
            condition_code,
            wind_speed_mps: parsed.wind.speed,
            humidity_pct: parsed.main.humidity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn short_queries_skip_the_network() {
        // unroutable base url: any request would fail
        let provider = OpenWeatherProvider::with_base_url(
            "KEY".into(),
            "http://127.0.0.1:9",
            Duration::from_millis(50),
        )
        .expect("client");

        let found = provider.search("Ro", 5).await.expect("short query is not an error");
        assert!(found.is_empty());
    }

    #[test]
    fn base_url_is_normalized() {
        let provider = OpenWeatherProvider::with_base_url(
            "KEY".into(),
            "http://localhost:1234/",
            Duration::from_secs(1),
        )
        .expect("client");
        assert_eq!(provider.base_url, "http://localhost:1234");
    }
}
