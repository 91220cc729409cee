//! Outfit business logic - Handles outfit CRUD, wear logging and ratings.
//!
//! Wear logging keeps the outfit, its items and the log in step: the log insert and the
//! `times_worn`/`last_worn` increments run inside one database transaction, using
//! atomic `col = col + 1` updates rather than read-modify-write.

use crate::{
    core::{learning, preferences, wardrobe},
    entities::{IdList, Outfit, OutfitLog, TagList, outfit, outfit_log},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde_json::json;

/// Fields for a new outfit
#[derive(Debug, Clone, Default)]
pub struct NewOutfit {
    /// Display name
    pub name: String,
    /// Clothing item ids, in wearing order
    pub item_ids: Vec<i64>,
    /// Suitable seasons
    pub seasons: TagList,
    /// Suitable occasions
    pub occasions: TagList,
}

/// Details for a wear log entry
#[derive(Debug, Clone, Default)]
pub struct WearDetails {
    /// Time of day
    pub time_of_day: Option<String>,
    /// Weather annotation
    pub weather: Option<String>,
    /// Activity annotation
    pub activity: Option<String>,
    /// Notes
    pub notes: Option<String>,
}

/// Creates an outfit from items the owner already has.
///
/// Duplicate ids are dropped; every remaining id must be one of the owner's items.
pub async fn create_outfit(
    db: &DatabaseConnection,
    user_id: &str,
    new_outfit: NewOutfit,
) -> Result<outfit::Model> {
    let name = new_outfit.name.trim();
    if name.is_empty() {
        return Err(Error::validation("Outfit name cannot be empty"));
    }

    let mut item_ids: Vec<i64> = Vec::with_capacity(new_outfit.item_ids.len());
    for id in new_outfit.item_ids {
        if !item_ids.contains(&id) {
            item_ids.push(id);
        }
    }
    if item_ids.is_empty() {
        return Err(Error::validation("An outfit needs at least one item"));
    }

    let owned = wardrobe::get_items_by_ids(db, user_id, &item_ids).await?;
    if let Some(missing) = item_ids
        .iter()
        .find(|id| !owned.iter().any(|item| item.id == **id))
    {
        return Err(Error::not_found("clothing item", missing));
    }

    let model = outfit::ActiveModel {
        user_id: Set(user_id.to_string()),
        name: Set(name.to_string()),
        item_ids: Set(IdList(item_ids)),
        seasons: Set(new_outfit.seasons),
        occasions: Set(new_outfit.occasions),
        is_favorite: Set(false),
        times_worn: Set(0),
        last_worn: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    model.insert(db).await.map_err(Into::into)
}

/// Lists the owner's outfits alphabetically.
pub async fn list_outfits<C>(db: &C, user_id: &str) -> Result<Vec<outfit::Model>>
where
    C: ConnectionTrait,
{
    Outfit::find()
        .filter(outfit::Column::UserId.eq(user_id))
        .order_by_asc(outfit::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds one of the owner's outfits by id.
pub async fn get_outfit<C>(db: &C, user_id: &str, outfit_id: i64) -> Result<Option<outfit::Model>>
where
    C: ConnectionTrait,
{
    Outfit::find_by_id(outfit_id)
        .filter(outfit::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds one of the owner's outfits by exact name.
pub async fn get_outfit_by_name(
    db: &DatabaseConnection,
    user_id: &str,
    name: &str,
) -> Result<Option<outfit::Model>> {
    Outfit::find()
        .filter(outfit::Column::UserId.eq(user_id))
        .filter(outfit::Column::Name.eq(name.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Loads the owner's outfits with the given ids, preserving the order of `ids`.
pub async fn get_outfits_by_ids(
    db: &DatabaseConnection,
    user_id: &str,
    ids: &[i64],
) -> Result<Vec<outfit::Model>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let outfits = Outfit::find()
        .filter(outfit::Column::UserId.eq(user_id))
        .filter(outfit::Column::Id.is_in(ids.iter().copied()))
        .all(db)
        .await?;

    Ok(ids
        .iter()
        .filter_map(|id| outfits.iter().find(|o| o.id == *id).cloned())
        .collect())
}

async fn require_outfit<C>(db: &C, user_id: &str, outfit_id: i64) -> Result<outfit::Model>
where
    C: ConnectionTrait,
{
    get_outfit(db, user_id, outfit_id)
        .await?
        .ok_or_else(|| Error::not_found("outfit", outfit_id))
}

/// Flips the favourite flag and returns the updated outfit.
pub async fn toggle_outfit_favorite(
    db: &DatabaseConnection,
    user_id: &str,
    outfit_id: i64,
) -> Result<outfit::Model> {
    let current = require_outfit(db, user_id, outfit_id).await?;
    let favorite = !current.is_favorite;
    let mut active: outfit::ActiveModel = current.into();
    active.is_favorite = Set(favorite);
    active.update(db).await.map_err(Into::into)
}

/// Deletes one of the owner's outfits together with its wear logs.
pub async fn delete_outfit(db: &DatabaseConnection, user_id: &str, outfit_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    require_outfit(&txn, user_id, outfit_id).await?;

    OutfitLog::delete_many()
        .filter(outfit_log::Column::OutfitId.eq(outfit_id))
        .filter(outfit_log::Column::UserId.eq(user_id))
        .exec(&txn)
        .await?;
    Outfit::delete_by_id(outfit_id).exec(&txn).await?;

    txn.commit().await?;
    Ok(())
}

/// Records that the owner wore an outfit on `worn_on`.
///
/// Inserts the log and bumps `times_worn`/`last_worn` on the outfit and each of its
/// items, all in one transaction.
pub async fn log_outfit_wear(
    db: &DatabaseConnection,
    user_id: &str,
    outfit_id: i64,
    worn_on: NaiveDate,
    details: WearDetails,
) -> Result<outfit_log::Model> {
    let txn = db.begin().await?;

    let worn_outfit = require_outfit(&txn, user_id, outfit_id).await?;
    let now = Utc::now();

    let log = outfit_log::ActiveModel {
        user_id: Set(user_id.to_string()),
        outfit_id: Set(outfit_id),
        worn_on: Set(worn_on),
        time_of_day: Set(details.time_of_day),
        weather: Set(details.weather),
        activity: Set(details.activity),
        notes: Set(details.notes),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    Outfit::update_many()
        .col_expr(
            outfit::Column::TimesWorn,
            Expr::col(outfit::Column::TimesWorn).add(1),
        )
        .col_expr(outfit::Column::LastWorn, Expr::value(now))
        .filter(outfit::Column::Id.eq(outfit_id))
        .exec(&txn)
        .await?;

    wardrobe::mark_items_worn(&txn, user_id, &worn_outfit.item_ids.0, now).await?;

    txn.commit().await?;
    Ok(log)
}

/// Lists the owner's wear logs, most recent day first.
pub async fn list_outfit_logs(
    db: &DatabaseConnection,
    user_id: &str,
    limit: u64,
) -> Result<Vec<outfit_log::Model>> {
    OutfitLog::find()
        .filter(outfit_log::Column::UserId.eq(user_id))
        .order_by_desc(outfit_log::Column::WornOn)
        .order_by_desc(outfit_log::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Replaces the notes of one of the owner's wear logs.
pub async fn update_outfit_log_notes(
    db: &DatabaseConnection,
    user_id: &str,
    log_id: i64,
    notes: Option<String>,
) -> Result<outfit_log::Model> {
    let log = OutfitLog::find_by_id(log_id)
        .filter(outfit_log::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("outfit log", log_id))?;

    let mut active: outfit_log::ActiveModel = log.into();
    active.notes = Set(notes);
    active.update(db).await.map_err(Into::into)
}

/// Deletes one of the owner's wear logs. Wear counters are not rolled back.
pub async fn delete_outfit_log(db: &DatabaseConnection, user_id: &str, log_id: i64) -> Result<()> {
    let result = OutfitLog::delete_many()
        .filter(outfit_log::Column::Id.eq(log_id))
        .filter(outfit_log::Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::not_found("outfit log", log_id));
    }
    Ok(())
}

/// Records the owner's 1-5 rating of an outfit as a learning datum.
///
/// A rating of 1 is stored as a `"rejected"` interaction. Item colours, season tags and
/// the first occasion tag are captured so later analysis does not depend on the outfit
/// still existing. The style comes from the owner's declared styles (favourites first,
/// then the quiz result) and is left out when the owner has none.
pub async fn rate_outfit(
    db: &DatabaseConnection,
    user_id: &str,
    outfit_id: i64,
    rating: i32,
    feedback: Option<String>,
    temperature: Option<f64>,
) -> Result<crate::entities::learning_datum::Model> {
    let rated = require_outfit(db, user_id, outfit_id).await?;
    let (items, prefs) = tokio::try_join!(
        wardrobe::get_items_by_ids(db, user_id, &rated.item_ids.0),
        preferences::get_preferences(db, user_id),
    )?;
    let style = prefs.as_ref().and_then(|p| {
        p.favorite_styles
            .iter()
            .chain(p.quiz_styles.iter())
            .next()
            .map(str::to_string)
    });

    let mut colors: Vec<String> = Vec::new();
    for color in items.iter().filter_map(|item| item.color.clone()) {
        if !colors.contains(&color) {
            colors.push(color);
        }
    }

    let interaction_type = if rating == 1 {
        learning::REJECTED
    } else {
        learning::RATING
    };

    let mut outfit_data = json!({
        "outfit_id": rated.id,
        "name": rated.name,
        "colors": colors,
        "seasons": rated.seasons.0,
    });
    if let Some(style) = style {
        outfit_data["style"] = json!(style);
    }

    learning::record_interaction(
        db,
        learning::NewLearningDatum {
            user_id: user_id.to_string(),
            interaction_type: interaction_type.to_string(),
            rating: Some(rating),
            feedback,
            outfit_data,
            context: json!({
                "temperature": temperature,
                "occasion": rated.occasions.iter().next(),
            }),
            success: rating >= 4,
        },
    )
    .await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{entities::ClothingItem, test_utils::*};

    #[tokio::test]
    async fn test_create_outfit_requires_owned_items() -> Result<()> {
        let db = setup_test_db().await?;
        let mine = create_test_item(&db, "alice", "Tee", "top").await?;
        let theirs = create_test_item(&db, "bob", "Jeans", "bottom").await?;

        let result = create_outfit(
            &db,
            "alice",
            NewOutfit {
                name: "Mixed".to_string(),
                item_ids: vec![mine.id, theirs.id],
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::NotFound { .. })));

        let result = create_outfit(
            &db,
            "alice",
            NewOutfit {
                name: "Empty".to_string(),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let created = create_outfit(
            &db,
            "alice",
            NewOutfit {
                name: " Casual ".to_string(),
                item_ids: vec![mine.id, mine.id],
                seasons: TagList::parse("summer"),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(created.name, "Casual");
        assert_eq!(created.item_ids, IdList(vec![mine.id]));

        Ok(())
    }

    #[tokio::test]
    async fn test_log_wear_updates_counters() -> Result<()> {
        let db = setup_test_db().await?;
        let (outfit, items) = create_test_outfit(&db, "alice", "Office", "fall").await?;
        let day = NaiveDate::from_ymd_opt(2024, 10, 1).unwrap();

        let log = log_outfit_wear(
            &db,
            "alice",
            outfit.id,
            day,
            WearDetails {
                time_of_day: Some("morning".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(log.worn_on, day);

        log_outfit_wear(&db, "alice", outfit.id, day, WearDetails::default()).await?;

        let reloaded = get_outfit(&db, "alice", outfit.id).await?.unwrap();
        assert_eq!(reloaded.times_worn, 2);
        assert!(reloaded.last_worn.is_some());

        for item in items {
            let item = ClothingItem::find_by_id(item.id).one(&db).await?.unwrap();
            assert_eq!(item.times_worn, 2);
        }

        let logs = list_outfit_logs(&db, "alice", 10).await?;
        assert_eq!(logs.len(), 2);
        assert!(list_outfit_logs(&db, "bob", 10).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_log_wear_for_foreign_outfit_fails() -> Result<()> {
        let db = setup_test_db().await?;
        let (outfit, _) = create_test_outfit(&db, "alice", "Office", "fall").await?;
        let day = NaiveDate::from_ymd_opt(2024, 10, 1).unwrap();

        let result = log_outfit_wear(&db, "bob", outfit.id, day, WearDetails::default()).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        assert!(list_outfit_logs(&db, "bob", 10).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_log_notes_update_and_delete() -> Result<()> {
        let db = setup_test_db().await?;
        let (outfit, _) = create_test_outfit(&db, "alice", "Weekend", "summer").await?;
        let day = NaiveDate::from_ymd_opt(2024, 7, 6).unwrap();
        let log = log_outfit_wear(&db, "alice", outfit.id, day, WearDetails::default()).await?;

        let updated =
            update_outfit_log_notes(&db, "alice", log.id, Some("Too warm".to_string())).await?;
        assert_eq!(updated.notes.as_deref(), Some("Too warm"));

        assert!(delete_outfit_log(&db, "bob", log.id).await.is_err());
        delete_outfit_log(&db, "alice", log.id).await?;
        assert!(list_outfit_logs(&db, "alice", 10).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_outfit_removes_logs() -> Result<()> {
        let db = setup_test_db().await?;
        let (outfit, _) = create_test_outfit(&db, "alice", "Gym", "summer").await?;
        let day = NaiveDate::from_ymd_opt(2024, 7, 6).unwrap();
        log_outfit_wear(&db, "alice", outfit.id, day, WearDetails::default()).await?;

        delete_outfit(&db, "alice", outfit.id).await?;
        assert!(get_outfit(&db, "alice", outfit.id).await?.is_none());
        assert!(list_outfit_logs(&db, "alice", 10).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_rate_outfit_records_learning_datum() -> Result<()> {
        let db = setup_test_db().await?;
        let (outfit, _) = create_test_outfit(&db, "alice", "Date night", "fall").await?;

        let liked = rate_outfit(&db, "alice", outfit.id, 5, None, Some(12.0)).await?;
        assert_eq!(liked.interaction_type, learning::RATING);
        assert!(liked.success);
        assert!(liked.outfit_data.get("style").is_none());
        assert_eq!(liked.context["occasion"], "casual");
        assert_eq!(liked.outfit_data["colors"][0], "navy");

        let rejected = rate_outfit(&db, "alice", outfit.id, 1, Some("meh".to_string()), None).await?;
        assert_eq!(rejected.interaction_type, learning::REJECTED);
        assert!(!rejected.success);

        let result = rate_outfit(&db, "alice", outfit.id, 6, None, None).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_rated_style_is_separate_from_occasion() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_preferences(&db, "alice").await?;
        let (outfit, _) = create_test_outfit(&db, "alice", "Weekend", "all-season").await?;

        for _ in 0..3 {
            let row = rate_outfit(&db, "alice", outfit.id, 5, None, Some(18.0)).await?;
            assert_eq!(row.outfit_data["style"], "minimal");
            assert_eq!(row.context["occasion"], "casual");
        }

        let rows = learning::get_recent_learning_data(&db, "alice", learning::PATTERN_WINDOW).await?;
        let insights = learning::analyze_patterns(&rows);
        assert!(insights.iter().any(|i| i.contains("love minimal looks")));
        assert!(insights.iter().any(|i| i.contains("dressing for casual")));
        assert!(!insights.iter().any(|i| i.contains("love casual looks")));

        Ok(())
    }
}
