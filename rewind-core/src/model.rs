use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::condition::{ConditionKind, ProviderKind, normalize};

/// A resolved geocoding target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationQuery {
    pub name: String,
    pub country: String,
    pub state: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

impl LocationQuery {
    /// "Springfield, Illinois, US" or "London, GB".
    pub fn display_name(&self) -> String {
        match &self.state {
            Some(state) => format!("{}, {}, {}", self.name, state, self.country),
            None => format!("{}, {}", self.name, self.country),
        }
    }
}

/// One day of weather for one city in one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub city: String,
    /// Display-formatted day, e.g. "October 18".
    pub date: String,
    pub year: i32,
    /// Degrees Celsius.
    pub temperature: f64,
    pub condition: ConditionKind,
    /// km/h
    pub wind_speed: f64,
    /// Percent.
    pub humidity: f64,
}

impl WeatherRecord {
    /// Build today's record from a current-weather observation (wind in m/s).
    pub fn from_current(city: &str, date: NaiveDate, obs: &CurrentObservation) -> Self {
        Self {
            city: city.to_string(),
            date: display_date(date),
            year: date.year(),
            temperature: round_half_up(obs.temperature_c),
            condition: normalize(obs.condition_code, ProviderKind::OpenWeather),
            wind_speed: round_half_up(obs.wind_speed_mps * 3.6),
            humidity: round_half_up(obs.humidity_pct),
        }
    }

    /// Build a past year's record from a daily archive observation (wind in km/h).
    pub fn from_daily(city: &str, date: NaiveDate, obs: &DailyObservation) -> Self {
        Self {
            city: city.to_string(),
            date: display_date(date),
            year: date.year(),
            temperature: round_half_up(obs.temperature_max_c),
            condition: normalize(obs.condition_code, ProviderKind::Wmo),
            wind_speed: round_half_up(obs.wind_speed_max_kmh),
            humidity: round_half_up(obs.humidity_mean_pct),
        }
    }
}

/// Raw current conditions as reported by the current-weather provider.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentObservation {
    pub temperature_c: f64,
    pub condition_code: i32,
    pub wind_speed_mps: f64,
    pub humidity_pct: f64,
}

/// Raw daily aggregate as reported by the historical archive.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyObservation {
    pub temperature_max_c: f64,
    pub condition_code: i32,
    pub wind_speed_max_kmh: f64,
    pub humidity_mean_pct: f64,
}

/// Per-year records for one location, ascending by year, at most one per year.
///
/// Serialized as a plain list of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<WeatherRecord>", into = "Vec<WeatherRecord>")]
pub struct Series {
    records: Vec<WeatherRecord>,
}

impl Series {
    pub fn from_records(mut records: Vec<WeatherRecord>) -> Self {
        records.sort_by_key(|r| r.year);
        records.dedup_by_key(|r| r.year);
        Self { records }
    }

    pub fn records(&self) -> &[WeatherRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WeatherRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The last `n` records, most recent first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &WeatherRecord> {
        let start = self.records.len().saturating_sub(n);
        self.records[start..].iter().rev()
    }

    pub fn temperature_range(&self) -> Option<(f64, f64)> {
        self.records.iter().map(|r| r.temperature).fold(None, |acc, t| match acc {
            None => Some((t, t)),
            Some((lo, hi)) => Some((lo.min(t), hi.max(t))),
        })
    }

    pub fn year_range(&self) -> Option<(i32, i32)> {
        // sorted, so the ends are the extremes
        Some((self.records.first()?.year, self.records.last()?.year))
    }
}

impl From<Vec<WeatherRecord>> for Series {
    fn from(records: Vec<WeatherRecord>) -> Self {
        Self::from_records(records)
    }
}

impl From<Series> for Vec<WeatherRecord> {
    fn from(series: Series) -> Self {
        series.records
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a WeatherRecord;
    type IntoIter = std::slice::Iter<'a, WeatherRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

pub fn display_date(date: NaiveDate) -> String {
    date.format("%B %-d").to_string()
}

/// Round half-way values up (towards positive infinity), e.g. -2.5 -> -2.
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}
