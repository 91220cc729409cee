//! Outfit log entity - Records that an outfit was worn on a given day.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Outfit log database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "outfit_logs")]
pub struct Model {
    /// Unique identifier for the log entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the log entry
    pub user_id: String,
    /// Outfit that was worn
    pub outfit_id: i64,
    /// Calendar day it was worn
    pub worn_on: Date,
    /// Free-form time of day ("morning", "evening", ...)
    pub time_of_day: Option<String>,
    /// Weather annotation
    pub weather: Option<String>,
    /// Activity annotation
    pub activity: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
    /// When the entry was written
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `OutfitLog` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each log belongs to one outfit
    #[sea_orm(
        belongs_to = "super::outfit::Entity",
        from = "Column::OutfitId",
        to = "super::outfit::Column::Id"
    )]
    Outfit,
}

impl Related<super::outfit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Outfit.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
