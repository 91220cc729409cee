//! Daily suggestion persistence - one row per owner per day.
//!
//! Rows are written once by the daily batch; afterwards only the `viewed` and
//! `accepted` flags change.

use crate::{
    entities::{DailySuggestion, IdList, daily_suggestion},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{
    QueryOrder, Set, TryInsertResult,
    prelude::*,
    sea_query::{Expr, OnConflict},
};

/// Fields for a new daily suggestion
#[derive(Debug, Clone)]
pub struct NewDailySuggestion {
    /// Owner
    pub user_id: String,
    /// Day the suggestion is for
    pub suggestion_date: NaiveDate,
    /// Suggested outfits, in order
    pub outfit_ids: Vec<i64>,
    /// Explanation shown to the owner
    pub reasoning: String,
    /// Snapshot of the weather used
    pub weather_context: Json,
    /// Whether the canned rationale was used
    pub used_fallback: bool,
}

/// Inserts the suggestion for (owner, date).
///
/// Returns `None` when a row for that pair already exists; the existing row is left
/// untouched.
pub async fn create_daily_suggestion(
    db: &DatabaseConnection,
    suggestion: NewDailySuggestion,
) -> Result<Option<daily_suggestion::Model>> {
    let user_id = suggestion.user_id.clone();
    let date = suggestion.suggestion_date;

    let row = daily_suggestion::ActiveModel {
        user_id: Set(suggestion.user_id),
        suggestion_date: Set(suggestion.suggestion_date),
        outfit_ids: Set(IdList(suggestion.outfit_ids)),
        reasoning: Set(suggestion.reasoning),
        weather_context: Set(suggestion.weather_context),
        used_fallback: Set(suggestion.used_fallback),
        viewed: Set(false),
        accepted: Set(false),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let inserted = DailySuggestion::insert(row)
        .on_conflict(
            OnConflict::columns([
                daily_suggestion::Column::UserId,
                daily_suggestion::Column::SuggestionDate,
            ])
            .do_nothing()
            .to_owned(),
        )
        .do_nothing()
        .exec(db)
        .await?;

    match inserted {
        TryInsertResult::Inserted(_) => get_suggestion_for_date(db, &user_id, date).await,
        TryInsertResult::Conflicted | TryInsertResult::Empty => Ok(None),
    }
}

/// The owner's suggestion for `date`, if one was generated.
pub async fn get_suggestion_for_date(
    db: &DatabaseConnection,
    user_id: &str,
    date: NaiveDate,
) -> Result<Option<daily_suggestion::Model>> {
    DailySuggestion::find()
        .filter(daily_suggestion::Column::UserId.eq(user_id))
        .filter(daily_suggestion::Column::SuggestionDate.eq(date))
        .one(db)
        .await
        .map_err(Into::into)
}

/// The owner's most recent suggestion.
pub async fn get_latest_suggestion(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Option<daily_suggestion::Model>> {
    DailySuggestion::find()
        .filter(daily_suggestion::Column::UserId.eq(user_id))
        .order_by_desc(daily_suggestion::Column::SuggestionDate)
        .one(db)
        .await
        .map_err(Into::into)
}

async fn set_flag(
    db: &DatabaseConnection,
    user_id: &str,
    suggestion_id: i64,
    column: daily_suggestion::Column,
) -> Result<daily_suggestion::Model> {
    let result = DailySuggestion::update_many()
        .col_expr(column, Expr::value(true))
        .filter(daily_suggestion::Column::Id.eq(suggestion_id))
        .filter(daily_suggestion::Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::not_found("daily suggestion", suggestion_id));
    }

    DailySuggestion::find_by_id(suggestion_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("daily suggestion", suggestion_id))
}

/// Marks one of the owner's suggestions as seen.
pub async fn mark_viewed(
    db: &DatabaseConnection,
    user_id: &str,
    suggestion_id: i64,
) -> Result<daily_suggestion::Model> {
    set_flag(db, user_id, suggestion_id, daily_suggestion::Column::Viewed).await
}

/// Marks one of the owner's suggestions as accepted (which implies viewed).
pub async fn mark_accepted(
    db: &DatabaseConnection,
    user_id: &str,
    suggestion_id: i64,
) -> Result<daily_suggestion::Model> {
    set_flag(db, user_id, suggestion_id, daily_suggestion::Column::Viewed).await?;
    set_flag(db, user_id, suggestion_id, daily_suggestion::Column::Accepted).await
}
