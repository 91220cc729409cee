//! Fashion trend entity - Small shared catalogue of current trends fed into prompts.
//! Seeded from `config.toml` on first run.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Fashion trend database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fashion_trends")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Trend name (e.g., "Quiet luxury")
    pub name: String,
    /// One-line description
    pub description: String,
    /// Season the trend belongs to, if any
    pub season: Option<String>,
    /// Relative popularity, higher first
    pub popularity: i32,
}

/// `FashionTrend` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
