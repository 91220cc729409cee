//! Outfit entity - A named combination of clothing items.

use super::tags::{IdList, TagList};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Outfit database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "outfits")]
pub struct Model {
    /// Unique identifier for the outfit
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the outfit
    pub user_id: String,
    /// Display name
    pub name: String,
    /// Clothing item ids in wearing order
    pub item_ids: IdList,
    /// Seasons the outfit suits
    pub seasons: TagList,
    /// Occasions the outfit suits
    pub occasions: TagList,
    /// Marked as favourite by the owner
    pub is_favorite: bool,
    /// How many times the outfit has been logged as worn
    pub times_worn: i32,
    /// Last time the outfit was worn, None if never
    pub last_worn: Option<DateTimeUtc>,
    /// When the outfit was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Outfit and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One outfit has many wear logs
    #[sea_orm(has_many = "super::outfit_log::Entity")]
    OutfitLogs,
}

impl Related<super::outfit_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OutfitLogs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
