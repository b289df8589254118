//! Today-versus-history comparison for one location.
//!
//! Each comparison is tagged with a [`RequestToken`]. When a newer comparison
//! has been started by the time a comparison's fetches settle, its results are
//! discarded with [`RewindError::Superseded`].

use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use crate::{
    Config,
    error::RewindError,
    history::HistoryAggregator,
    model::{LocationQuery, Series, WeatherRecord},
    provider::{Geocoder, archive_from_config, openweather_from_config},
    summary::{SummaryGenerator, summarizer_from_config},
};

pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub location: LocationQuery,
    pub today: WeatherRecord,
    /// Never empty.
    pub history: Series,
}

#[derive(Debug)]
pub struct ComparisonService {
    geocoder: Arc<dyn Geocoder>,
    aggregator: HistoryAggregator,
    summarizer: Option<Arc<dyn SummaryGenerator>>,
    years_back: u32,
    generation: AtomicU64,
}

impl ComparisonService {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        aggregator: HistoryAggregator,
        summarizer: Option<Arc<dyn SummaryGenerator>>,
        years_back: u32,
    ) -> Self {
        Self {
            geocoder,
            aggregator,
            summarizer,
            years_back,
            generation: AtomicU64::new(0),
        }
    }

    /// Wire up the HTTP providers described by `config`.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        config.history.validate()?;

        let openweather = Arc::new(openweather_from_config(config)?);
        let archive = Arc::new(archive_from_config(config)?);
        let aggregator =
            HistoryAggregator::new(openweather.clone(), archive, config.history.timeout());
        let summarizer = summarizer_from_config(config)?
            .map(|s| Arc::new(s) as Arc<dyn SummaryGenerator>);

        Ok(Self::new(openweather, aggregator, summarizer, config.history.years_back))
    }

    pub fn years_back(&self) -> u32 {
        self.years_back
    }

    pub fn has_summarizer(&self) -> bool {
        self.summarizer.is_some()
    }

    /// City suggestions; an empty list when nothing matches.
    pub async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<LocationQuery>, RewindError> {
        self.geocoder
            .search(query, limit)
            .await
            .map_err(RewindError::Lookup)
    }

    /// First match for `query`, or [`RewindError::LocationNotFound`].
    pub async fn resolve(&self, query: &str) -> Result<LocationQuery, RewindError> {
        self.search(query, 1)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RewindError::LocationNotFound(query.to_string()))
    }

    /// Start a new comparison, invalidating every earlier token.
    pub fn begin(&self) -> RequestToken {
        RequestToken(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.generation.load(Ordering::SeqCst) == token.0
    }

    /// Today's weather and the same day in each of the past years, fetched concurrently.
    ///
    /// Fails when today's weather is unavailable or when not a single past year could
    /// be fetched. Missing individual years only shorten the history.
    pub async fn compare(
        &self,
        token: RequestToken,
        location: &LocationQuery,
    ) -> Result<Comparison, RewindError> {
        self.compare_on(token, location, Local::now().date_naive())
            .await
    }

    /// [`ComparisonService::compare`] with today's date fixed, so the current record and
    /// the history always refer to the same calendar day.
    pub async fn compare_on(
        &self,
        token: RequestToken,
        location: &LocationQuery,
        date: NaiveDate,
    ) -> Result<Comparison, RewindError> {
        let (today, history) = tokio::join!(
            self.aggregator.fetch_today_on(location, date),
            self.aggregator
                .fetch_history_from(location, date, self.years_back),
        );

        if !self.is_current(token) {
            tracing::debug!(generation = token.0, "discarding stale comparison");
            return Err(RewindError::Superseded(token.0));
        }

        let today = today.map_err(RewindError::MandatoryFetch)?;
        if history.is_empty() {
            return Err(RewindError::InsufficientHistory);
        }

        tracing::info!(
            city = %location.name,
            years = history.len(),
            requested = self.years_back,
            "comparison ready"
        );

        Ok(Comparison {
            location: location.clone(),
            today,
            history,
        })
    }

    /// Trend analysis for a finished comparison. Failure leaves the comparison usable.
    pub async fn summarize(&self, comparison: &Comparison) -> Result<String, RewindError> {
        let summarizer = self
            .summarizer
            .as_ref()
            .ok_or(RewindError::SummaryUnavailable)?;
        summarizer
            .summarize(&comparison.today, &comparison.history)
            .await
            .map_err(RewindError::Summary)
    }
}
