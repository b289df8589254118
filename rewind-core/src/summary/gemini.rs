use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{
    config::{DEFAULT_GEMINI_MODEL, DEFAULT_GEMINI_URL, DEFAULT_TIMEOUT_SECS},
    model::{Series, WeatherRecord},
    provider::{http_client, truncate_body},
};

use super::{SummaryGenerator, build_prompt};

/// Google Gemini `generateContent` REST client.
#[derive(Debug, Clone)]
pub struct GeminiSummarizer {
    api_key: String,
    base_url: String,
    model: String,
    http: Client,
}

impl GeminiSummarizer {
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_base_url(
            api_key,
            DEFAULT_GEMINI_URL,
            DEFAULT_GEMINI_MODEL,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    pub fn with_base_url(
        api_key: String,
        base_url: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            http: http_client(timeout)?,
        })
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn text(self) -> Option<String> {
        let parts = self.candidates.into_iter().next()?.content?.parts;
        let text: String = parts.into_iter().filter_map(|p| p.text).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

#[async_trait]
impl SummaryGenerator for GeminiSummarizer {
    async fn summarize(&self, today: &WeatherRecord, history: &Series) -> Result<String> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model);
        let prompt = build_prompt(today, history);
        let request = GenerateRequest {
            contents: [Content {
                parts: [RequestPart { text: &prompt }],
            }],
        };

        tracing::debug!(
            model = %self.model,
            records = history.len(),
            "requesting trend analysis"
        );

        let res = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Gemini")?;

        let status = res.status();
        let body = res.text().await.context("Failed to read Gemini response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Gemini request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&body).context("Failed to parse Gemini JSON")?;

        parsed.text().ok_or_else(|| anyhow!("Gemini response contained no text"))
    }
}
