//! User preferences entity - Read-mostly per-user configuration and profile.

use super::tags::TagList;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User preferences database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_preferences")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner; one row per user
    #[sea_orm(unique)]
    pub user_id: String,
    /// Colours the user says they like
    pub favorite_colors: TagList,
    /// Styles the user says they like
    pub favorite_styles: TagList,
    /// Styles derived from the style quiz
    pub quiz_styles: TagList,
    /// Lifestyle description ("office", "student", "outdoorsy", ...)
    pub lifestyle: Option<String>,
    /// City used for weather lookups
    pub city: Option<String>,
    /// Optional country to disambiguate the city
    pub country: Option<String>,
    /// Whether outfit reminders are enabled
    pub reminder_enabled: bool,
    /// Preferred reminder time ("07:30")
    pub reminder_time: Option<String>,
    /// Opted in to the daily suggestion run
    pub daily_suggestions: bool,
    /// Premium users bypass daily quotas
    pub is_premium: bool,
    /// When the row last changed
    pub updated_at: DateTimeUtc,
}

/// `UserPreferences` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
