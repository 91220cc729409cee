//! Unified error types for `WardrobeBuddy`.
//!
//! Core functions return [`Result`]; the external clients keep their own error enums
//! ([`LlmError`], [`WeatherError`]) which convert into [`Error`] when they escape a
//! pipeline instead of being absorbed by a fallback.

use crate::services::{llm::LlmError, weather::WeatherError};
use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or missing configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description
        message: String,
    },

    /// Caller supplied data that fails validation
    #[error("Invalid input: {message}")]
    Validation {
        /// Human-readable description
        message: String,
    },

    /// A row owned by the caller could not be found
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind ("outfit", "clothing item", ...)
        entity: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// Database failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// LLM provider failure
    #[error("Assistant error: {0}")]
    Llm(#[from] LlmError),

    /// Weather provider failure
    #[error("Weather error: {0}")]
    Weather(#[from] WeatherError),

    /// JSON (de)serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// String formatting failure
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// Missing environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Serenity/Poise failure
    #[error("Serenity/Poise framework error: {0}")]
    #[allow(clippy::enum_variant_names)]
    FrameworkError(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::FrameworkError(Box::new(value))
    }
}

impl Error {
    /// Shorthand for a [`Error::NotFound`] on an id.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Shorthand for a [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
