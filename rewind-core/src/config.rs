use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::Path, path::PathBuf, time::Duration};

use crate::provider::ProviderId;

pub const DEFAULT_OPENWEATHER_URL: &str = "https://api.openweathermap.org";
pub const DEFAULT_OPEN_METEO_ARCHIVE_URL: &str = "https://archive-api.open-meteo.com";
pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_YEARS_BACK: u32 = 20;
/// Upper bound for `history.years_back`; one archive request runs per year.
pub const MAX_YEARS_BACK: u32 = 20;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for a single provider (e.g., API key).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
}

/// Base URLs of the upstream services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub openweather: String,
    pub open_meteo_archive: String,
    pub gemini: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            openweather: DEFAULT_OPENWEATHER_URL.to_string(),
            open_meteo_archive: DEFAULT_OPEN_METEO_ARCHIVE_URL.to_string(),
            gemini: DEFAULT_GEMINI_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// How many past years to compare against.
    pub years_back: u32,
    /// Upper bound for every single upstream request.
    pub timeout_secs: u64,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            years_back: DEFAULT_YEARS_BACK,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl HistorySettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// `years_back` must lie in `1..=MAX_YEARS_BACK`.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_YEARS_BACK).contains(&self.years_back) {
            return Err(anyhow!(
                "history.years_back must be between 1 and {MAX_YEARS_BACK}, got {}.\n\
                 Hint: fix `years_back` under [history] in the config file.",
                self.years_back
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarySettings {
    pub model: String,
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_GEMINI_MODEL.to_string(),
        }
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Example TOML:
    /// [providers.openweather]
    /// api_key = "..."
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    #[serde(default)]
    pub endpoints: Endpoints,

    #[serde(default)]
    pub history: HistorySettings,

    #[serde(default)]
    pub summary: SummarySettings,
}

impl Config {
    /// Load config from disk (or defaults on first run), then apply
    /// `OPENWEATHER_API_KEY` / `GEMINI_API_KEY` from the environment.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let mut cfg = Self::load_from(&path)?;
        cfg.apply_key_overrides(|name| std::env::var(name).ok());
        Ok(cfg)
    }

    /// Load config from an explicit path, or return an empty default if it doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        cfg.history
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the platform config file.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;
        self.save_to(&path)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-rewind", "rewind")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Replace stored keys with non-empty values returned by `lookup(env_var_name)`.
    pub fn apply_key_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for id in ProviderId::all() {
            if let Some(key) = lookup(id.env_var()).filter(|k| !k.trim().is_empty()) {
                self.upsert_provider_api_key(*id, key);
            }
        }
    }

    /// Set/replace a provider API key.
    pub fn upsert_provider_api_key(&mut self, provider_id: ProviderId, api_key: String) {
        self.providers
            .insert(provider_id.as_str().to_string(), ProviderConfig { api_key });
    }

    /// Returns API key for a provider, if present.
    pub fn provider_api_key(&self, provider_id: ProviderId) -> Option<&str> {
        self.providers.get(provider_id.as_str()).map(|cfg| cfg.api_key.as_str())
    }

    /// Like [`Config::provider_api_key`], but a missing key is an error with a hint.
    pub fn require_api_key(&self, provider_id: ProviderId) -> Result<&str> {
        self.provider_api_key(provider_id).ok_or_else(|| {
            anyhow!(
                "No API key configured for provider '{provider_id}'.\n\
                 Hint: run `rewind configure {provider_id}` or set {}.",
                provider_id.env_var()
            )
        })
    }

    pub fn is_provider_configured(&self, provider_id: ProviderId) -> bool {
        self.provider_api_key(provider_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderId;

    #[test]
    fn require_api_key_errors_with_hint() {
        let cfg = Config::default();
        let err = cfg.require_api_key(ProviderId::OpenWeather).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No API key configured for provider 'openweather'"));
        assert!(msg.contains("rewind configure openweather"));
        assert!(msg.contains("OPENWEATHER_API_KEY"));
    }

    #[test]
    fn upsert_replaces_existing_key() {
        let mut cfg = Config::default();

        cfg.upsert_provider_api_key(ProviderId::OpenWeather, "OLD".into());
        cfg.upsert_provider_api_key(ProviderId::OpenWeather, "NEW".into());

        assert_eq!(cfg.provider_api_key(ProviderId::OpenWeather), Some("NEW"));
        assert!(!cfg.is_provider_configured(ProviderId::Gemini));
    }

    #[test]
    fn env_overrides_take_precedence_over_file() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::OpenWeather, "FROM_FILE".into());

        cfg.apply_key_overrides(|name| match name {
            "OPENWEATHER_API_KEY" => Some("FROM_ENV".into()),
            "GEMINI_API_KEY" => Some("   ".into()),
            _ => None,
        });

        assert_eq!(cfg.provider_api_key(ProviderId::OpenWeather), Some("FROM_ENV"));
        // blank values are ignored
        assert!(!cfg.is_provider_configured(ProviderId::Gemini));
    }

    #[test]
    fn missing_sections_use_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [providers.openweather]
            api_key = "K"

            [history]
            years_back = 5
            "#,
        )
        .expect("config should parse");

        assert_eq!(cfg.provider_api_key(ProviderId::OpenWeather), Some("K"));
        assert_eq!(cfg.history.years_back, 5);
        assert_eq!(cfg.history.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(cfg.endpoints, Endpoints::default());
        assert_eq!(cfg.summary.model, DEFAULT_GEMINI_MODEL);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::Gemini, "G".into());
        cfg.history.timeout_secs = 3;
        cfg.save_to(&path).expect("save should succeed");

        let loaded = Config::load_from(&path).expect("load should succeed");
        assert_eq!(loaded.provider_api_key(ProviderId::Gemini), Some("G"));
        assert_eq!(loaded.history.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn out_of_range_years_back_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");

        for years in [0, 45] {
            let path = dir.path().join(format!("years_{years}.toml"));
            fs::write(&path, format!("[history]\nyears_back = {years}\n")).expect("write");

            let err = Config::load_from(&path).unwrap_err();
            let msg = format!("{err:#}");
            assert!(msg.contains("between 1 and 20"), "{msg}");
            assert!(msg.contains("Hint:"), "{msg}");
        }

        let path = dir.path().join("max.toml");
        fs::write(&path, "[history]\nyears_back = 20\n").expect("write");
        assert_eq!(Config::load_from(&path).expect("valid").history.years_back, 20);
    }

    #[test]
    fn load_from_missing_file_is_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = Config::load_from(&dir.path().join("absent.toml")).expect("defaults");
        assert!(cfg.providers.is_empty());
        assert_eq!(cfg.history.years_back, DEFAULT_YEARS_BACK);
    }
}
