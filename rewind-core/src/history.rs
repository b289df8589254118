//! Same-day weather for today and for each of the past N years.
//!
//! Every past year is fetched independently and concurrently. A year whose
//! fetch fails, times out or has no data is dropped from the result; the
//! other years are unaffected. Nothing is retried.

use anyhow::{Result, anyhow};
use chrono::{Datelike, Local, Months, NaiveDate};
use futures::future::join_all;
use std::{sync::Arc, time::Duration};
use tokio::time::timeout;

use crate::{
    config::MAX_YEARS_BACK,
    model::{LocationQuery, Series, WeatherRecord},
    provider::{CurrentWeatherSource, HistoricalWeatherSource},
};

#[derive(Debug, Clone)]
pub struct HistoryAggregator {
    current: Arc<dyn CurrentWeatherSource>,
    archive: Arc<dyn HistoricalWeatherSource>,
    timeout: Duration,
}

impl HistoryAggregator {
    pub fn new(
        current: Arc<dyn CurrentWeatherSource>,
        archive: Arc<dyn HistoricalWeatherSource>,
        timeout: Duration,
    ) -> Self {
        Self { current, archive, timeout }
    }

    pub async fn fetch_today(&self, location: &LocationQuery) -> Result<WeatherRecord> {
        self.fetch_today_on(location, Local::now().date_naive()).await
    }

    pub async fn fetch_today_on(
        &self,
        location: &LocationQuery,
        today: NaiveDate,
    ) -> Result<WeatherRecord> {
        let obs = timeout(self.timeout, self.current.current(location.lat, location.lon))
            .await
            .map_err(|_| anyhow!("current weather request timed out after {:?}", self.timeout))??;

        Ok(WeatherRecord::from_current(&location.name, today, &obs))
    }

    pub async fn fetch_history(&self, location: &LocationQuery, years_back: u32) -> Series {
        self.fetch_history_from(location, Local::now().date_naive(), years_back).await
    }

    /// Records for `today` shifted back 1..=`years_back` years, ascending by year.
    /// `years_back` is capped at [`MAX_YEARS_BACK`].
    pub async fn fetch_history_from(
        &self,
        location: &LocationQuery,
        today: NaiveDate,
        years_back: u32,
    ) -> Series {
        if years_back > MAX_YEARS_BACK {
            tracing::warn!(years_back, max = MAX_YEARS_BACK, "capping history depth");
        }
        let years_back = years_back.min(MAX_YEARS_BACK);

        let slots = join_all((1..=years_back).map(|i| self.fetch_year(location, today, i))).await;

        let records: Vec<WeatherRecord> = slots.into_iter().flatten().collect();
        let dropped = years_back as usize - records.len();
        if dropped > 0 {
            tracing::info!(city = %location.name, dropped, "history has gaps");
        }

        Series::from_records(records)
    }

    async fn fetch_year(
        &self,
        location: &LocationQuery,
        today: NaiveDate,
        years_ago: u32,
    ) -> Option<WeatherRecord> {
        let date = years_before(today, years_ago)?;
        let year = date.year();

        match timeout(self.timeout, self.archive.daily(location.lat, location.lon, date)).await {
            Ok(Ok(Some(obs))) => Some(WeatherRecord::from_daily(&location.name, date, &obs)),
            Ok(Ok(None)) => {
                tracing::debug!(year, "no archive data");
                None
            }
            Ok(Err(err)) => {
                tracing::warn!(year, "could not fetch weather: {err:#}");
                None
            }
            Err(_) => {
                tracing::warn!(year, timeout = ?self.timeout, "archive request timed out");
                None
            }
        }
    }
}

/// The same calendar day `years` years earlier. Feb 29 becomes Feb 28 in non-leap years.
pub fn years_before(date: NaiveDate, years: u32) -> Option<NaiveDate> {
    date.checked_sub_months(Months::new(years.checked_mul(12)?))
}
