//! Core library for the `rewind` CLI.
//!
//! This crate defines:
//! - Condition normalization across weather providers
//! - Concurrent, failure-tolerant aggregation of same-day weather history
//! - Chart projection (scales, trend line, axis ticks) and pointer hit-testing
//! - Clients for geocoding, current weather, the historical archive and the AI summary
//! - Configuration & credentials handling
//!
//! It is used by `rewind-cli`, but can also be reused by other front ends.

pub mod chart;
pub mod compare;
pub mod condition;
pub mod config;
pub mod error;
pub mod history;
pub mod locate;
pub mod model;
pub mod provider;
pub mod summary;

pub use chart::{Padding, Polyline, ProjectionFrame, build_frame, build_path, x_scale, y_scale};
pub use compare::{Comparison, ComparisonService, RequestToken};
pub use condition::{ConditionKind, ProviderKind, normalize};
pub use config::{Config, ProviderConfig};
pub use error::RewindError;
pub use history::HistoryAggregator;
pub use locate::{HoverPoint, hover, locate};
pub use model::{CurrentObservation, DailyObservation, LocationQuery, Series, WeatherRecord};
pub use provider::{CurrentWeatherSource, Geocoder, HistoricalWeatherSource, ProviderId};
pub use summary::SummaryGenerator;
