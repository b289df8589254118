//! User-facing failures of a comparison.
//!
//! A failed past year is deliberately not represented here: it only shows up
//! as a shorter [`Series`](crate::Series).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RewindError {
    #[error("No cities found for '{0}'.")]
    LocationNotFound(String),

    #[error("City lookup failed: {0:#}")]
    Lookup(#[source] anyhow::Error),

    #[error("Failed to fetch today's weather: {0:#}")]
    MandatoryFetch(#[source] anyhow::Error),

    #[error("Could not retrieve enough data to display trends.")]
    InsufficientHistory,

    #[error("Failed to generate weather trend analysis: {0:#}")]
    Summary(#[source] anyhow::Error),

    #[error("Trend analysis is not configured.\nHint: run `rewind configure gemini` and enter your API key.")]
    SummaryUnavailable,

    #[error("Comparison #{0} was superseded by a newer request")]
    Superseded(u64),
}

impl RewindError {
    /// Whether the weather data of the comparison is still usable.
    pub fn is_summary_only(&self) -> bool {
        matches!(self, RewindError::Summary(_) | RewindError::SummaryUnavailable)
    }
}
