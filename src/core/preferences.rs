//! User preferences - profile, location and opt-ins, one row per owner.

use crate::{
    entities::{TagList, UserPreferences, user_preferences},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};

/// Partial update of an owner's preferences; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct PreferencesUpdate {
    /// Favourite colours
    pub favorite_colors: Option<TagList>,
    /// Favourite styles
    pub favorite_styles: Option<TagList>,
    /// Free-text lifestyle description
    pub lifestyle: Option<String>,
    /// City used for weather lookups
    pub city: Option<String>,
    /// Country used to disambiguate the city
    pub country: Option<String>,
    /// Daily reminder toggle
    pub reminder_enabled: Option<bool>,
    /// Reminder time, `HH:MM`
    pub reminder_time: Option<String>,
    /// Opt-in to the daily suggestion batch
    pub daily_suggestions: Option<bool>,
}

/// Gets the owner's preferences, if any were ever saved.
pub async fn get_preferences(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Option<user_preferences::Model>> {
    UserPreferences::find()
        .filter(user_preferences::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn validate_reminder_time(value: &str) -> Result<()> {
    chrono::NaiveTime::parse_from_str(value, "%H:%M")
        .map(|_| ())
        .map_err(|_| Error::validation(format!("Reminder time must be HH:MM, got '{value}'")))
}

/// Creates the owner's preferences or applies `update` to the existing row.
///
/// Blank strings clear the optional text fields.
pub async fn upsert_preferences(
    db: &DatabaseConnection,
    user_id: &str,
    update: PreferencesUpdate,
) -> Result<user_preferences::Model> {
    if let Some(time) = update.reminder_time.as_deref().filter(|t| !t.trim().is_empty()) {
        validate_reminder_time(time.trim())?;
    }

    let existing = get_preferences(db, user_id).await?;
    let is_new = existing.is_none();
    let mut active: user_preferences::ActiveModel = match existing {
        Some(existing) => existing.into(),
        None => user_preferences::ActiveModel {
            user_id: Set(user_id.to_string()),
            favorite_colors: Set(TagList::default()),
            favorite_styles: Set(TagList::default()),
            quiz_styles: Set(TagList::default()),
            lifestyle: Set(None),
            city: Set(None),
            country: Set(None),
            reminder_enabled: Set(false),
            reminder_time: Set(None),
            daily_suggestions: Set(false),
            is_premium: Set(false),
            ..Default::default()
        },
    };

    if let Some(colors) = update.favorite_colors {
        active.favorite_colors = Set(colors);
    }
    if let Some(styles) = update.favorite_styles {
        active.favorite_styles = Set(styles);
    }
    if let Some(lifestyle) = update.lifestyle {
        active.lifestyle = Set(non_blank(lifestyle));
    }
    if let Some(city) = update.city {
        active.city = Set(non_blank(city));
    }
    if let Some(country) = update.country {
        active.country = Set(non_blank(country));
    }
    if let Some(enabled) = update.reminder_enabled {
        active.reminder_enabled = Set(enabled);
    }
    if let Some(time) = update.reminder_time {
        active.reminder_time = Set(non_blank(time));
    }
    if let Some(daily) = update.daily_suggestions {
        active.daily_suggestions = Set(daily);
    }
    active.updated_at = Set(Utc::now());

    let saved = if is_new {
        active.insert(db).await?
    } else {
        active.update(db).await?
    };
    Ok(saved)
}

/// Stores the quiz result as the owner's quiz styles.
pub async fn set_quiz_styles(
    db: &DatabaseConnection,
    user_id: &str,
    styles: TagList,
) -> Result<user_preferences::Model> {
    let prefs = upsert_preferences(db, user_id, PreferencesUpdate::default()).await?;
    let mut active: user_preferences::ActiveModel = prefs.into();
    active.quiz_styles = Set(styles);
    active.updated_at = Set(Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// Grants or revokes premium (unlimited quota) for the owner.
pub async fn set_premium(
    db: &DatabaseConnection,
    user_id: &str,
    premium: bool,
) -> Result<user_preferences::Model> {
    let prefs = upsert_preferences(db, user_id, PreferencesUpdate::default()).await?;
    let mut active: user_preferences::ActiveModel = prefs.into();
    active.is_premium = Set(premium);
    active.updated_at = Set(Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// Everyone who opted into daily suggestions, in a stable order.
pub async fn list_daily_subscribers(
    db: &DatabaseConnection,
) -> Result<Vec<user_preferences::Model>> {
    UserPreferences::find()
        .filter(user_preferences::Column::DailySuggestions.eq(true))
        .order_by_asc(user_preferences::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
