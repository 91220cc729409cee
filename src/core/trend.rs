//! Fashion trends - the shared catalogue mixed into generation prompts.

use crate::{
    config::settings::TrendConfig,
    entities::{FashionTrend, fashion_trend},
    errors::Result,
};
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};

/// Trends included in a daily prompt
pub const PROMPT_TRENDS: u64 = 5;

/// Inserts the configured trends when the catalogue is empty. Returns how many were added.
pub async fn seed_trends(db: &DatabaseConnection, trends: &[TrendConfig]) -> Result<usize> {
    if FashionTrend::find().count(db).await? > 0 || trends.is_empty() {
        return Ok(0);
    }

    let rows = trends.iter().map(|t| fashion_trend::ActiveModel {
        name: Set(t.name.clone()),
        description: Set(t.description.clone()),
        season: Set(t.season.clone()),
        popularity: Set(t.popularity),
        ..Default::default()
    });
    FashionTrend::insert_many(rows).exec(db).await?;

    tracing::info!(count = trends.len(), "Seeded fashion trends");
    Ok(trends.len())
}

/// The most popular trends.
pub async fn get_top_trends(db: &DatabaseConnection, limit: u64) -> Result<Vec<fashion_trend::Model>> {
    FashionTrend::find()
        .order_by_desc(fashion_trend::Column::Popularity)
        .order_by_asc(fashion_trend::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}
