//! Daily suggestion entity - The outfit set generated for a user on a given day.
//!
//! At most one row exists per (`user_id`, `suggestion_date`); the unique index is
//! created alongside the table. After insertion only `viewed` and `accepted` change.

use super::tags::IdList;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Daily suggestion database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "daily_suggestions")]
pub struct Model {
    /// Unique identifier for the suggestion
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the suggestion
    pub user_id: String,
    /// Day the suggestion is for
    pub suggestion_date: Date,
    /// Suggested outfit ids, best first
    pub outfit_ids: IdList,
    /// Human-readable rationale
    #[sea_orm(column_type = "Text")]
    pub reasoning: String,
    /// Snapshot of the weather used for the suggestion
    pub weather_context: Json,
    /// True when the rationale is the canned fallback rather than AI output
    pub used_fallback: bool,
    /// Whether the owner has seen the suggestion
    pub viewed: bool,
    /// Whether the owner accepted the suggestion
    pub accepted: bool,
    /// When the suggestion was generated
    pub created_at: DateTimeUtc,
}

/// `DailySuggestion` references outfits through its JSON id list only
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
