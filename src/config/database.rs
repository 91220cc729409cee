//! Database configuration module for `WardrobeBuddy`.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! and the composite unique indexes that the entities cannot express are created here.

use crate::entities::{
    ClothingItem, DailySuggestion, FashionTrend, LearningDatum, Outfit, OutfitLog, UsageQuota,
    UserPreferences, daily_suggestion, usage_quota,
};
use crate::errors::Result;
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema, sea_query::Index,
};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/wardrobe_buddy.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to a local `SQLite` file if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    Database::connect(&get_database_url()).await.map_err(Into::into)
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates all tables and unique indexes if they do not exist yet.
///
/// Safe to call on every start-up.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    create_table(db, &schema, ClothingItem).await?;
    create_table(db, &schema, Outfit).await?;
    create_table(db, &schema, OutfitLog).await?;
    create_table(db, &schema, DailySuggestion).await?;
    create_table(db, &schema, LearningDatum).await?;
    create_table(db, &schema, UsageQuota).await?;
    create_table(db, &schema, UserPreferences).await?;
    create_table(db, &schema, FashionTrend).await?;

    // One suggestion per owner per day
    let suggestion_index = Index::create()
        .name("idx_daily_suggestions_user_date")
        .table(DailySuggestion)
        .col(daily_suggestion::Column::UserId)
        .col(daily_suggestion::Column::SuggestionDate)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&suggestion_index)).await?;

    // One counter per owner, dimension and day
    let quota_index = Index::create()
        .name("idx_usage_quotas_user_dimension_day")
        .table(UsageQuota)
        .col(usage_quota::Column::UserId)
        .col(usage_quota::Column::Dimension)
        .col(usage_quota::Column::Day)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&quota_index)).await?;

    Ok(())
}
