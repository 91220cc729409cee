//! Shared test utilities for `WardrobeBuddy`.
//!
//! This module provides common helper functions for setting up test databases,
//! creating test entities with sensible defaults, and in-process fakes for the
//! LLM and weather providers.

use crate::{
    config::settings::{AssistantConfig, LimitsConfig},
    core::{
        assistant::Assistant,
        learning,
        outfit::{self, NewOutfit},
        preferences::{self, PreferencesUpdate},
        wardrobe::{self, NewClothingItem},
    },
    entities::{self, TagList},
    errors::Result,
    services::{
        llm::{CompletionRequest, LanguageModel, LlmError},
        weather::{WeatherError, WeatherProvider, WeatherReport, condition_label},
    },
};
use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use serde_json::json;
use std::sync::{Arc, Mutex, PoisonError};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test clothing item.
///
/// # Defaults
/// * `color`: "navy"
/// * `seasons`: all-season
/// * `occasions`: casual
pub async fn create_test_item(
    db: &DatabaseConnection,
    user_id: &str,
    name: &str,
    item_type: &str,
) -> Result<entities::clothing_item::Model> {
    wardrobe::create_item(
        db,
        user_id,
        NewClothingItem {
            name: name.to_string(),
            item_type: item_type.to_string(),
            color: Some("navy".to_string()),
            seasons: TagList::parse("all-season"),
            occasions: TagList::parse("casual"),
            ..Default::default()
        },
    )
    .await
}

/// Creates a two-piece outfit (a top and a bottom, both new items) for the owner.
///
/// `seasons` is a comma-separated tag list; the outfit's occasion is "casual".
pub async fn create_test_outfit(
    db: &DatabaseConnection,
    user_id: &str,
    name: &str,
    seasons: &str,
) -> Result<(entities::outfit::Model, Vec<entities::clothing_item::Model>)> {
    let top = create_test_item(db, user_id, &format!("{name} top"), "top").await?;
    let bottom = create_test_item(db, user_id, &format!("{name} bottom"), "bottom").await?;

    let created = outfit::create_outfit(
        db,
        user_id,
        NewOutfit {
            name: name.to_string(),
            item_ids: vec![top.id, bottom.id],
            seasons: TagList::parse(seasons),
            occasions: TagList::parse("casual"),
        },
    )
    .await?;

    Ok((created, vec![top, bottom]))
}

/// Creates preferences opted into daily suggestions, located in Paris.
pub async fn create_test_preferences(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<entities::user_preferences::Model> {
    preferences::upsert_preferences(
        db,
        user_id,
        PreferencesUpdate {
            city: Some("Paris".to_string()),
            country: Some("France".to_string()),
            favorite_styles: Some(TagList::parse("minimal")),
            daily_suggestions: Some(true),
            ..Default::default()
        },
    )
    .await
}

/// Records a plain rating with the given style, worn for a casual occasion.
pub async fn record_test_rating(
    db: &DatabaseConnection,
    user_id: &str,
    rating: i32,
    style: &str,
) -> Result<entities::learning_datum::Model> {
    learning::record_interaction(
        db,
        learning::NewLearningDatum {
            user_id: user_id.to_string(),
            interaction_type: learning::RATING.to_string(),
            rating: Some(rating),
            feedback: None,
            outfit_data: json!({ "style": style, "colors": ["navy"] }),
            context: json!({ "temperature": 18.0, "occasion": "casual" }),
            success: rating >= 4,
        },
    )
    .await
}

/// An assistant with default limits around the given fakes.
pub fn test_assistant(
    model: Option<Arc<ScriptedModel>>,
    weather: Arc<dyn WeatherProvider>,
) -> Assistant {
    test_assistant_with_limits(model, weather, LimitsConfig::default())
}

/// An assistant with custom limits around the given fakes.
pub fn test_assistant_with_limits(
    model: Option<Arc<ScriptedModel>>,
    weather: Arc<dyn WeatherProvider>,
    limits: LimitsConfig,
) -> Assistant {
    Assistant::new(
        model.map(|m| m as Arc<dyn LanguageModel>),
        weather,
        limits,
        AssistantConfig::default(),
    )
}

/// A language model that always gives the same answer and remembers what it was asked.
#[derive(Debug)]
pub struct ScriptedModel {
    reply: std::result::Result<String, LlmError>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedModel {
    /// Always replies with `text`
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always fails with a transport error
    pub fn failing() -> Self {
        Self {
            reply: Err(LlmError::Transport("connection refused".to_string())),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every request received so far
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, request: CompletionRequest) -> std::result::Result<String, LlmError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        self.reply.clone()
    }
}

/// Weather that is always clear at a fixed temperature.
#[derive(Debug, Clone, Copy)]
pub struct FixedWeather {
    /// Temperature in °C
    pub temperature: f64,
}

impl FixedWeather {
    /// Clear sky at `temperature`
    pub const fn at(temperature: f64) -> Self {
        Self { temperature }
    }
}

#[async_trait]
impl WeatherProvider for FixedWeather {
    async fn current(
        &self,
        city: &str,
        country: Option<&str>,
    ) -> std::result::Result<WeatherReport, WeatherError> {
        Ok(WeatherReport {
            city: city.to_string(),
            country: country.map(str::to_string),
            temperature: self.temperature,
            feels_like: self.temperature,
            humidity: 50.0,
            wind_speed: 5.0,
            weather_code: 0,
            condition: condition_label(0).to_string(),
        })
    }
}

/// Weather provider that never finds the city.
#[derive(Debug, Clone, Copy)]
pub struct FailingWeather;

#[async_trait]
impl WeatherProvider for FailingWeather {
    async fn current(
        &self,
        city: &str,
        _country: Option<&str>,
    ) -> std::result::Result<WeatherReport, WeatherError> {
        Err(WeatherError::CityNotFound {
            city: city.to_string(),
        })
    }
}
