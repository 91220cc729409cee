//! Learning datum entity - One recorded user interaction (rating, rejection, quiz, ...).
//!
//! Append-only. Read back in small recent windows to derive preference signals.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Learning datum database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "learning_data")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the interaction
    pub user_id: String,
    /// Interaction tag: `"rating"`, `"rejected"`, `"quiz_completed"`, `"saved_instant"`
    pub interaction_type: String,
    /// Rating from 1 to 5, when the interaction carries one
    pub rating: Option<i32>,
    /// Free-text feedback
    pub feedback: Option<String>,
    /// Outfit attributes at the time (`style`, `colors`, `occasion`, ...)
    pub outfit_data: Json,
    /// Situational context (`temperature`, `weather`, `occasion`, ...)
    pub context: Json,
    /// Whether the interaction was a positive outcome
    pub success: bool,
    /// When the interaction was recorded
    pub created_at: DateTimeUtc,
}

/// `LearningDatum` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
