//! Application settings loading from config.toml
//!
//! Non-secret settings (daily limits, assistant tuning, weather endpoints and the
//! fashion-trend catalogue) live in `config.toml`. Every section is optional and falls
//! back to the defaults below. Secrets such as the LLM API key are read from the
//! environment instead.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Environment variable holding the LLM API key. Unset disables generation.
pub const LLM_API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Daily quota thresholds
    pub limits: LimitsConfig,
    /// LLM and persona settings
    pub assistant: AssistantConfig,
    /// Weather provider endpoints
    pub weather: WeatherConfig,
    /// Fashion trends to seed
    pub trends: Vec<TrendConfig>,
}

/// Daily thresholds per quota dimension
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LimitsConfig {
    /// Chat messages per day for non-premium members
    pub chat_messages_per_day: u32,
    /// Instant outfit generations per day for non-premium members
    pub instant_outfits_per_day: u32,
    /// Chat messages per day for guests without a profile
    pub guest_chat_messages_per_day: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            chat_messages_per_day: 5,
            instant_outfits_per_day: 10,
            guest_chat_messages_per_day: 2,
        }
    }
}

/// LLM and persona settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Name the styling assistant introduces itself with
    pub persona_name: String,
    /// Chat-completions model
    pub model: String,
    /// Base URL of an OpenAI-compatible API
    pub base_url: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Reply token budget
    pub max_tokens: u32,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            persona_name: "Olivia".to_string(),
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            temperature: 0.8,
            max_tokens: 1200,
            request_timeout_secs: 60,
        }
    }
}

/// Weather provider endpoints
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Geocoding search endpoint
    pub geocoding_url: String,
    /// Forecast endpoint
    pub forecast_url: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            geocoding_url: "https://geocoding-api.open-meteo.com/v1/search".to_string(),
            forecast_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            request_timeout_secs: 15,
        }
    }
}

/// Configuration for a single fashion trend
#[derive(Debug, Deserialize, Clone)]
pub struct TrendConfig {
    /// Trend name
    pub name: String,
    /// One-line description
    pub description: String,
    /// Season the trend belongs to
    #[serde(default)]
    pub season: Option<String>,
    /// Relative popularity, higher first
    #[serde(default)]
    pub popularity: i32,
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    parse_settings(&contents)
}

/// Parses settings from TOML text
pub fn parse_settings(contents: &str) -> Result<Settings> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads settings from ./config.toml, using defaults when the file is absent.
///
/// A file that exists but does not parse is still an error.
pub fn load_default_settings() -> Result<Settings> {
    let path = Path::new("config.toml");
    if !path.exists() {
        tracing::warn!("config.toml not found, using default settings");
        return Ok(Settings::default());
    }
    load_settings(path)
}

/// Reads the LLM API key; blank values count as unset.
#[must_use]
pub fn llm_api_key() -> Option<String> {
    std::env::var(LLM_API_KEY_VAR)
        .ok()
        .filter(|key| !key.trim().is_empty())
}
