use crate::{
    Config, CurrentObservation, DailyObservation, LocationQuery,
    provider::{openmeteo::OpenMeteoArchive, openweather::OpenWeatherProvider},
};
use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use std::{convert::TryFrom, fmt::Debug, time::Duration};

pub mod openmeteo;
pub mod openweather;

const USER_AGENT: &str = concat!("weather-rewind/", env!("CARGO_PKG_VERSION"));

/// Upstream services that need credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenWeather,
    Gemini,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "openweather",
            ProviderId::Gemini => "gemini",
        }
    }

    /// Environment variable that overrides the stored key.
    pub fn env_var(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "OPENWEATHER_API_KEY",
            ProviderId::Gemini => "GEMINI_API_KEY",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenWeather, ProviderId::Gemini]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "openweather" => Ok(ProviderId::OpenWeather),
            "gemini" => Ok(ProviderId::Gemini),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: openweather, gemini."
            )),
        }
    }
}

/// City name lookup.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// Up to `limit` matches; empty when nothing matches.
    async fn search(&self, query: &str, limit: usize) -> anyhow::Result<Vec<LocationQuery>>;
}

#[async_trait]
pub trait CurrentWeatherSource: Send + Sync + Debug {
    async fn current(&self, lat: f64, lon: f64) -> anyhow::Result<CurrentObservation>;
}

#[async_trait]
pub trait HistoricalWeatherSource: Send + Sync + Debug {
    /// Daily aggregate for a single past day, `Ok(None)` when the archive has no data for it.
    async fn daily(
        &self,
        lat: f64,
        lon: f64,
        date: NaiveDate,
    ) -> anyhow::Result<Option<DailyObservation>>;
}

/// Construct the OpenWeatherMap client (geocoding + current weather) from config.
pub fn openweather_from_config(config: &Config) -> anyhow::Result<OpenWeatherProvider> {
    let api_key = config.require_api_key(ProviderId::OpenWeather)?;
    OpenWeatherProvider::with_base_url(
        api_key.to_owned(),
        &config.endpoints.openweather,
        config.history.timeout(),
    )
}

/// Construct the Open-Meteo archive client from config. No credentials needed.
pub fn archive_from_config(config: &Config) -> anyhow::Result<OpenMeteoArchive> {
    OpenMeteoArchive::with_base_url(&config.endpoints.open_meteo_archive, config.history.timeout())
}

pub(crate) fn http_client(timeout: Duration) -> anyhow::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build HTTP client")
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
