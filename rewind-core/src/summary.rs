//! Natural-language trend analysis of a comparison.

use async_trait::async_trait;
use std::fmt::{Debug, Write};

use crate::{
    Config,
    model::{Series, WeatherRecord},
    provider::ProviderId,
};

pub mod gemini;

pub use gemini::GeminiSummarizer;

#[async_trait]
pub trait SummaryGenerator: Send + Sync + Debug {
    /// Prose summary; the text is returned as produced, never parsed.
    async fn summarize(&self, today: &WeatherRecord, history: &Series) -> anyhow::Result<String>;
}

/// The Gemini summarizer when a key is configured, `None` otherwise.
pub fn summarizer_from_config(config: &Config) -> anyhow::Result<Option<GeminiSummarizer>> {
    let Some(api_key) = config.provider_api_key(ProviderId::Gemini) else {
        return Ok(None);
    };

    GeminiSummarizer::with_base_url(
        api_key.to_owned(),
        &config.endpoints.gemini,
        &config.summary.model,
        config.history.timeout(),
    )
    .map(Some)
}

pub fn build_prompt(today: &WeatherRecord, history: &Series) -> String {
    let mut lines = String::new();
    for w in history {
        let _ = writeln!(lines, "- {}: {}°C, {}", w.year, w.temperature, w.condition);
    }

    format!(
        "You are a climatologist AI, skilled at analyzing weather data and identifying long-term trends. \
Your task is to provide a concise and insightful analysis of the weather for a specific day over the last {years} years.

Here is the data for {city} on {date}:

**Today's Weather ({year}):**
- Temperature: {temp}°C
- Condition: {condition}

**Historical Weather Data (Last {years} Years):**
{lines}
Please provide a summary of the {years}-year weather trend. Focus on the following:
1.  **Overall Trend:** Is there a noticeable warming or cooling trend over these {years} years?
2.  **Key Years:** Point out the warmest and coolest years in the dataset.
3.  **General Observation:** Briefly describe the typical weather for this day based on the historical data.
4.  **Tone:** Your analysis should be insightful, clear, and easy for a layperson to understand.
",
        years = history.year_range().map_or(0, |(first, _)| today.year - first),
        city = today.city,
        date = today.date,
        year = today.year,
        temp = today.temperature,
        condition = today.condition,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::ConditionKind;

    fn record(year: i32, temperature: f64, condition: ConditionKind) -> WeatherRecord {
        WeatherRecord {
            city: "Madrid".into(),
            date: "August 2".into(),
            year,
            temperature,
            condition,
            wind_speed: 12.0,
            humidity: 30.0,
        }
    }

    #[test]
    fn prompt_lists_today_and_history() {
        let today = record(2026, 36.0, ConditionKind::Sunny);
        let history = Series::from_records(vec![
            record(2024, 34.0, ConditionKind::PartlyCloudy),
            record(2023, 31.0, ConditionKind::Sunny),
        ]);

        let prompt = build_prompt(&today, &history);

        assert!(prompt.contains("Here is the data for Madrid on August 2:"));
        assert!(prompt.contains("**Today's Weather (2026):**"));
        assert!(prompt.contains("- Temperature: 36°C"));
        assert!(prompt.contains("- 2023: 31°C, Sunny\n- 2024: 34°C, Partly Cloudy\n"));
        // 2023..2026
        assert!(prompt.contains("(Last 3 Years)"));
        assert!(prompt.contains("trend over these 3 years?"));
        assert!(!prompt.contains("two decades"));
    }

    #[test]
    fn no_key_means_no_summarizer() {
        let cfg = Config::default();
        assert!(summarizer_from_config(&cfg).expect("no error").is_none());

        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::Gemini, "G".into());
        assert!(summarizer_from_config(&cfg).expect("no error").is_some());
    }
}
