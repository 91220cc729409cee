//! Weather adapter - geocode a city, then fetch its current conditions.
//!
//! Backed by Open-Meteo: one geocoding call, one forecast call, no caching and no
//! retries. Callers that must not fail use [`current_or_fallback`], which substitutes a
//! random but plausible report.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::config::settings::WeatherConfig;

/// Failures looking up the weather
#[derive(Debug, Clone, Error)]
pub enum WeatherError {
    /// The geocoder returned no match
    #[error("city not found: {city}")]
    CityNotFound {
        /// City that was searched
        city: String,
    },
    /// Connection or protocol failure
    #[error("network error: {0}")]
    Transport(String),
    /// Non-success status
    #[error("http {status}")]
    Http {
        /// Status code
        status: u16,
    },
    /// Response could not be decoded
    #[error("json error: {0}")]
    Serde(String),
}

/// Normalized current conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    /// Resolved city name
    pub city: String,
    /// Resolved country, if known
    pub country: Option<String>,
    /// Air temperature in °C
    pub temperature: f64,
    /// Apparent temperature in °C
    pub feels_like: f64,
    /// Relative humidity in %
    pub humidity: f64,
    /// Wind speed in km/h
    pub wind_speed: f64,
    /// WMO weather code
    pub weather_code: i32,
    /// Human label for `weather_code`
    pub condition: String,
}

impl WeatherReport {
    /// Short label for prompts and messages, e.g. `"18°C, Partly cloudy"`
    #[must_use]
    pub fn summary(&self) -> String {
        format!("{:.0}°C, {}", self.temperature, self.condition)
    }
}

/// Anything that can report current conditions for a city
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Current conditions for `city`, optionally disambiguated by `country`
    async fn current(&self, city: &str, country: Option<&str>)
    -> Result<WeatherReport, WeatherError>;
}

/// Maps a WMO weather code to a label; unmapped codes are `"Unknown"`.
#[must_use]
pub const fn condition_label(code: i32) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown",
    }
}

const FALLBACK_CODES: [i32; 6] = [0, 1, 2, 3, 61, 80];

/// A random, schema-valid report used when the real lookup fails
#[must_use]
pub fn fallback_weather(city: &str) -> WeatherReport {
    let mut rng = rand::rng();
    let temperature: f64 = rng.random_range(-5.0..35.0);
    let weather_code = FALLBACK_CODES[rng.random_range(0..FALLBACK_CODES.len())];

    WeatherReport {
        city: city.to_string(),
        country: None,
        temperature,
        feels_like: temperature + rng.random_range(-3.0..3.0),
        humidity: rng.random_range(30.0..90.0),
        wind_speed: rng.random_range(0.0..30.0),
        weather_code,
        condition: condition_label(weather_code).to_string(),
    }
}

/// Looks the weather up and never fails: any error yields [`fallback_weather`].
///
/// Returns the report and whether it is the fallback.
pub async fn current_or_fallback(
    provider: &dyn WeatherProvider,
    city: &str,
    country: Option<&str>,
) -> (WeatherReport, bool) {
    match provider.current(city, country).await {
        Ok(report) => (report, false),
        Err(e) => {
            warn!(
                city,
                error = %e,
                used_fallback = true,
                source = "weather",
                "Weather lookup failed, using generated weather"
            );
            (fallback_weather(city), true)
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<GeocodingResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    name: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    country_code: Option<String>,
}

impl GeocodingResult {
    fn matches_country(&self, country: &str) -> bool {
        self.country
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case(country))
            || self
                .country_code
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(country))
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: CurrentConditions,
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    temperature_2m: f64,
    apparent_temperature: f64,
    relative_humidity_2m: f64,
    wind_speed_10m: f64,
    weather_code: i32,
}

/// Open-Meteo weather client
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    http: Client,
    geocoding_url: String,
    forecast_url: String,
}

impl OpenMeteoClient {
    /// Create a new client from the weather settings
    pub fn new(config: &WeatherConfig) -> Result<Self, WeatherError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| WeatherError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            geocoding_url: config.geocoding_url.clone(),
            forecast_url: config.forecast_url.clone(),
        })
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, WeatherError> {
        let res = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| WeatherError::Transport(e.to_string()))?;

        if !res.status().is_success() {
            return Err(WeatherError::Http {
                status: res.status().as_u16(),
            });
        }

        res.json::<T>()
            .await
            .map_err(|e| WeatherError::Serde(e.to_string()))
    }

    async fn geocode(
        &self,
        city: &str,
        country: Option<&str>,
    ) -> Result<GeocodingResult, WeatherError> {
        let response: GeocodingResponse = self
            .get_json(
                &self.geocoding_url,
                &[
                    ("name", city.to_string()),
                    ("count", "5".to_string()),
                    ("language", "en".to_string()),
                    ("format", "json".to_string()),
                ],
            )
            .await?;

        pick_location(response.results, country).ok_or_else(|| WeatherError::CityNotFound {
            city: city.to_string(),
        })
    }
}

fn pick_location(
    results: Vec<GeocodingResult>,
    country: Option<&str>,
) -> Option<GeocodingResult> {
    if let Some(country) = country {
        if let Some(idx) = results.iter().position(|r| r.matches_country(country)) {
            return results.into_iter().nth(idx);
        }
    }
    results.into_iter().next()
}

#[async_trait]
impl WeatherProvider for OpenMeteoClient {
    async fn current(
        &self,
        city: &str,
        country: Option<&str>,
    ) -> Result<WeatherReport, WeatherError> {
        let location = self.geocode(city, country).await?;

        let forecast: ForecastResponse = self
            .get_json(
                &self.forecast_url,
                &[
                    ("latitude", location.latitude.to_string()),
                    ("longitude", location.longitude.to_string()),
                    (
                        "current",
                        "temperature_2m,apparent_temperature,relative_humidity_2m,wind_speed_10m,weather_code"
                            .to_string(),
                    ),
                ],
            )
            .await?;

        let current = forecast.current;
        Ok(WeatherReport {
            city: location.name,
            country: location.country,
            temperature: current.temperature_2m,
            feels_like: current.apparent_temperature,
            humidity: current.relative_humidity_2m,
            wind_speed: current.wind_speed_10m,
            weather_code: current.weather_code,
            condition: condition_label(current.weather_code).to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::FailingWeather;

    fn location(name: &str, country: &str, code: &str) -> GeocodingResult {
        GeocodingResult {
            name: name.to_string(),
            latitude: 1.0,
            longitude: 2.0,
            country: Some(country.to_string()),
            country_code: Some(code.to_string()),
        }
    }

    #[test]
    fn test_condition_label_known_and_unknown() {
        assert_eq!(condition_label(0), "Clear sky");
        assert_eq!(condition_label(63), "Moderate rain");
        assert_eq!(condition_label(42), "Unknown");
        assert_eq!(condition_label(-1), "Unknown");
    }

    #[test]
    fn test_fallback_weather_is_schema_valid() {
        for _ in 0..50 {
            let report = fallback_weather("Nonexistent City");
            assert!(report.temperature.is_finite());
            assert!(report.feels_like.is_finite());
            assert!(!report.condition.is_empty());
            assert_ne!(report.condition, "Unknown");
            assert_eq!(report.city, "Nonexistent City");
        }
    }

    #[test]
    fn test_pick_location_prefers_country_match() {
        let results = vec![
            location("Paris", "United States", "US"),
            location("Paris", "France", "FR"),
        ];
        let picked = pick_location(results, Some("fr")).unwrap();
        assert_eq!(picked.country.as_deref(), Some("France"));
    }

    #[test]
    fn test_pick_location_defaults_to_first() {
        let results = vec![location("Paris", "France", "FR")];
        let picked = pick_location(results, Some("Japan")).unwrap();
        assert_eq!(picked.country.as_deref(), Some("France"));
        assert!(pick_location(Vec::new(), None).is_none());
    }

    #[test]
    fn test_geocoding_response_without_results() {
        let parsed: GeocodingResponse = serde_json::from_str(r#"{"generationtime_ms": 0.5}"#).unwrap();
        assert!(parsed.results.is_empty());
    }

    #[test]
    fn test_forecast_response_decodes() {
        let body = r#"{
            "latitude": 52.52,
            "longitude": 13.41,
            "current": {
                "time": "2024-05-01T12:00",
                "temperature_2m": 17.3,
                "apparent_temperature": 16.1,
                "relative_humidity_2m": 55,
                "wind_speed_10m": 12.4,
                "weather_code": 2
            }
        }"#;
        let parsed: ForecastResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.current.weather_code, 2);
        assert!((parsed.current.relative_humidity_2m - 55.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_unknown_city_falls_back() {
        let provider = FailingWeather;
        let (report, used_fallback) =
            current_or_fallback(&provider, "Nonexistent City", None).await;
        assert!(used_fallback);
        assert!(report.temperature.is_finite());
        assert!(!report.condition.is_empty());
    }
}
