//! Clothing item entity - One garment in a user's digital wardrobe.
//!
//! Items are created on upload, edited freely and deleted explicitly. Wear logging
//! bumps `times_worn` and `last_worn`.

use super::tags::TagList;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Clothing item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "clothing_items")]
pub struct Model {
    /// Unique identifier for the item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the item
    pub user_id: String,
    /// Display name (e.g., "Navy wool coat")
    pub name: String,
    /// Garment type (e.g., "top", "bottom", "outerwear", "shoes")
    pub item_type: String,
    /// Dominant colour
    pub color: Option<String>,
    /// Fabric or material
    pub material: Option<String>,
    /// Seasons the item suits
    pub seasons: TagList,
    /// Occasions the item suits
    pub occasions: TagList,
    /// Marked as favourite by the owner
    pub is_favorite: bool,
    /// How many times the item has been logged as worn
    pub times_worn: i32,
    /// Last time the item was worn, None if never
    pub last_worn: Option<DateTimeUtc>,
    /// Reference to the stored photo
    pub image_url: Option<String>,
    /// When the item was added
    pub created_at: DateTimeUtc,
}

/// Clothing items are referenced by outfits through JSON id lists, not foreign keys
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
