use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{
    config::{DEFAULT_OPEN_METEO_ARCHIVE_URL, DEFAULT_TIMEOUT_SECS},
    model::DailyObservation,
    provider::{http_client, truncate_body},
};

use super::HistoricalWeatherSource;

const DAILY_FIELDS: &str =
    "weather_code,temperature_2m_max,relative_humidity_2m_mean,wind_speed_10m_max";

/// Open-Meteo historical archive. Free, no API key required.
#[derive(Debug, Clone)]
pub struct OpenMeteoArchive {
    base_url: String,
    http: Client,
}

impl OpenMeteoArchive {
    pub fn new() -> Result<Self> {
        Self::with_base_url(
            DEFAULT_OPEN_METEO_ARCHIVE_URL,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: http_client(timeout)?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OmArchiveResponse {
    daily: Option<OmDaily>,
}

// Open-Meteo reports `null` for days it has no measurement for.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OmDaily {
    time: Vec<String>,
    weather_code: Vec<Option<f64>>,
    temperature_2m_max: Vec<Option<f64>>,
    relative_humidity_2m_mean: Vec<Option<f64>>,
    wind_speed_10m_max: Vec<Option<f64>>,
}

impl OmDaily {
    fn first_observation(&self) -> Option<DailyObservation> {
        if self.time.is_empty() {
            return None;
        }

        fn first(values: &[Option<f64>]) -> Option<f64> {
            values.first().copied().flatten()
        }

        Some(DailyObservation {
            temperature_max_c: first(&self.temperature_2m_max)?,
            condition_code: first(&self.weather_code)? as i32,
            wind_speed_max_kmh: first(&self.wind_speed_10m_max)?,
            humidity_mean_pct: first(&self.relative_humidity_2m_mean)?,
        })
    }
}

#[async_trait]
impl HistoricalWeatherSource for OpenMeteoArchive {
    async fn daily(
        &self,
        lat: f64,
        lon: f64,
        date: NaiveDate,
    ) -> Result<Option<DailyObservation>> {
        let url = format!("{}/v1/archive", self.base_url);
        let day = date.format("%Y-%m-%d").to_string();

        let res = self
            .http
            .get(&url)
            .query(&[
                ("latitude", lat.to_string()),
                ("longitude", lon.to_string()),
                ("start_date", day.clone()),
                ("end_date", day.clone()),
                ("daily", DAILY_FIELDS.to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await
            .with_context(|| format!("Failed to send request to Open-Meteo archive ({day})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read Open-Meteo archive response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Open-Meteo archive request for {} failed with status {}: {}",
                day,
                status,
                truncate_body(&body),
            ));
        }

        let parsed: OmArchiveResponse = serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse Open-Meteo archive JSON ({day})"))?;

        Ok(parsed.daily.and_then(|d| d.first_observation()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Option<DailyObservation> {
        let parsed: OmArchiveResponse = serde_json::from_str(json).expect("valid json");
        parsed.daily.and_then(|d| d.first_observation())
    }

    #[test]
    fn reads_first_day() {
        let obs = parse(
            r#"{"daily": {
                "time": ["2006-10-18"],
                "weather_code": [63],
                "temperature_2m_max": [14.2],
                "relative_humidity_2m_mean": [88],
                "wind_speed_10m_max": [21.6]
            }}"#,
        )
        .expect("observation");

        assert_eq!(obs.condition_code, 63);
        assert_eq!(obs.temperature_max_c, 14.2);
        assert_eq!(obs.humidity_mean_pct, 88.0);
        assert_eq!(obs.wind_speed_max_kmh, 21.6);
    }

    #[test]
    fn missing_or_empty_daily_is_no_data() {
        assert!(parse(r#"{"latitude": 1.0}"#).is_none());
        assert!(parse(r#"{"daily": {"time": []}}"#).is_none());
    }

    #[test]
    fn null_values_are_no_data() {
        let obs = parse(
            r#"{"daily": {
                "time": ["2006-10-18"],
                "weather_code": [3],
                "temperature_2m_max": [null],
                "relative_humidity_2m_mean": [70],
                "wind_speed_10m_max": [10]
            }}"#,
        );
        assert!(obs.is_none());
    }
}
