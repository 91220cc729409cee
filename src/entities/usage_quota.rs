//! Usage quota entity - Per-user, per-dimension, per-day usage counter.
//!
//! The day is part of the key, so yesterday's counter is simply never read again.
//! Unique on (`user_id`, `dimension`, `day`).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Usage quota database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "usage_quotas")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the counter
    pub user_id: String,
    /// Quota dimension key (`"chat_messages"`, `"instant_outfits"`)
    pub dimension: String,
    /// Calendar day the counter applies to
    pub day: Date,
    /// Units consumed on that day
    pub count: i32,
    /// Last time the counter changed
    pub updated_at: DateTimeUtc,
}

/// `UsageQuota` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
