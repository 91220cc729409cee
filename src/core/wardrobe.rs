//! Wardrobe business logic - Handles all clothing-item operations.
//!
//! Every function is scoped to an owner: an item that belongs to someone else behaves
//! exactly like an item that does not exist.

use crate::{
    entities::{ClothingItem, TagList, clothing_item},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::Expr};

/// Fields for a new clothing item
#[derive(Debug, Clone, Default)]
pub struct NewClothingItem {
    /// Display name
    pub name: String,
    /// Garment type
    pub item_type: String,
    /// Dominant colour
    pub color: Option<String>,
    /// Fabric or material
    pub material: Option<String>,
    /// Suitable seasons
    pub seasons: TagList,
    /// Suitable occasions
    pub occasions: TagList,
    /// Stored photo reference
    pub image_url: Option<String>,
}

/// Partial update of a clothing item; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct ClothingItemUpdate {
    /// New name
    pub name: Option<String>,
    /// New type
    pub item_type: Option<String>,
    /// New colour
    pub color: Option<String>,
    /// New material
    pub material: Option<String>,
    /// New season tags
    pub seasons: Option<TagList>,
    /// New occasion tags
    pub occasions: Option<TagList>,
}

fn required(value: &str, field: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

/// Adds an item to the owner's wardrobe. Name and type are required.
pub async fn create_item(
    db: &DatabaseConnection,
    user_id: &str,
    item: NewClothingItem,
) -> Result<clothing_item::Model> {
    let name = required(&item.name, "Item name")?;
    let item_type = required(&item.item_type, "Item type")?.to_lowercase();

    let model = clothing_item::ActiveModel {
        user_id: Set(user_id.to_string()),
        name: Set(name),
        item_type: Set(item_type),
        color: Set(item.color.map(|c| c.trim().to_lowercase())),
        material: Set(item.material),
        seasons: Set(item.seasons),
        occasions: Set(item.occasions),
        is_favorite: Set(false),
        times_worn: Set(0),
        last_worn: Set(None),
        image_url: Set(item.image_url),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    model.insert(db).await.map_err(Into::into)
}

/// Lists the owner's items, newest first.
pub async fn list_items(db: &DatabaseConnection, user_id: &str) -> Result<Vec<clothing_item::Model>> {
    ClothingItem::find()
        .filter(clothing_item::Column::UserId.eq(user_id))
        .order_by_desc(clothing_item::Column::CreatedAt)
        .order_by_desc(clothing_item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Counts the owner's items.
pub async fn count_items(db: &DatabaseConnection, user_id: &str) -> Result<u64> {
    ClothingItem::find()
        .filter(clothing_item::Column::UserId.eq(user_id))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Finds one of the owner's items by id.
pub async fn get_item(
    db: &DatabaseConnection,
    user_id: &str,
    item_id: i64,
) -> Result<Option<clothing_item::Model>> {
    ClothingItem::find_by_id(item_id)
        .filter(clothing_item::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

async fn require_item(
    db: &DatabaseConnection,
    user_id: &str,
    item_id: i64,
) -> Result<clothing_item::Model> {
    get_item(db, user_id, item_id)
        .await?
        .ok_or_else(|| Error::not_found("clothing item", item_id))
}

/// Applies a partial update to one of the owner's items.
pub async fn update_item(
    db: &DatabaseConnection,
    user_id: &str,
    item_id: i64,
    update: ClothingItemUpdate,
) -> Result<clothing_item::Model> {
    let item = require_item(db, user_id, item_id).await?;
    let mut active: clothing_item::ActiveModel = item.into();

    if let Some(name) = update.name {
        active.name = Set(required(&name, "Item name")?);
    }
    if let Some(item_type) = update.item_type {
        active.item_type = Set(required(&item_type, "Item type")?.to_lowercase());
    }
    if let Some(color) = update.color {
        active.color = Set(Some(color.trim().to_lowercase()));
    }
    if let Some(material) = update.material {
        active.material = Set(Some(material));
    }
    if let Some(seasons) = update.seasons {
        active.seasons = Set(seasons);
    }
    if let Some(occasions) = update.occasions {
        active.occasions = Set(occasions);
    }

    active.update(db).await.map_err(Into::into)
}

/// Flips the favourite flag and returns the updated item.
pub async fn toggle_item_favorite(
    db: &DatabaseConnection,
    user_id: &str,
    item_id: i64,
) -> Result<clothing_item::Model> {
    let item = require_item(db, user_id, item_id).await?;
    let favorite = !item.is_favorite;
    let mut active: clothing_item::ActiveModel = item.into();
    active.is_favorite = Set(favorite);
    active.update(db).await.map_err(Into::into)
}

/// Deletes one of the owner's items.
///
/// Outfits keep their id references; missing items are skipped when outfits are shown.
pub async fn delete_item(db: &DatabaseConnection, user_id: &str, item_id: i64) -> Result<()> {
    let result = ClothingItem::delete_many()
        .filter(clothing_item::Column::Id.eq(item_id))
        .filter(clothing_item::Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::not_found("clothing item", item_id));
    }
    Ok(())
}

/// Loads the owner's items with the given ids, preserving the order of `ids`.
pub async fn get_items_by_ids<C>(
    db: &C,
    user_id: &str,
    ids: &[i64],
) -> Result<Vec<clothing_item::Model>>
where
    C: ConnectionTrait,
{
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let items = ClothingItem::find()
        .filter(clothing_item::Column::UserId.eq(user_id))
        .filter(clothing_item::Column::Id.is_in(ids.iter().copied()))
        .all(db)
        .await?;

    Ok(ids
        .iter()
        .filter_map(|id| items.iter().find(|item| item.id == *id).cloned())
        .collect())
}

/// Atomically bumps `times_worn` and sets `last_worn` on the owner's items.
///
/// `UPDATE clothing_items SET times_worn = times_worn + 1, last_worn = ? WHERE id IN (...)`
pub async fn mark_items_worn<C>(
    db: &C,
    user_id: &str,
    ids: &[i64],
    worn_at: DateTime<Utc>,
) -> Result<u64>
where
    C: ConnectionTrait,
{
    if ids.is_empty() {
        return Ok(0);
    }

    let result = ClothingItem::update_many()
        .col_expr(
            clothing_item::Column::TimesWorn,
            Expr::col(clothing_item::Column::TimesWorn).add(1),
        )
        .col_expr(clothing_item::Column::LastWorn, Expr::value(worn_at))
        .filter(clothing_item::Column::UserId.eq(user_id))
        .filter(clothing_item::Column::Id.is_in(ids.iter().copied()))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_item_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_item(
            &db,
            "alice",
            NewClothingItem {
                name: "   ".to_string(),
                item_type: "top".to_string(),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = create_item(
            &db,
            "alice",
            NewClothingItem {
                name: "Shirt".to_string(),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_and_list_items() -> Result<()> {
        let db = setup_test_db().await?;

        let first = create_test_item(&db, "alice", "White tee", "top").await?;
        let second = create_test_item(&db, "alice", "Jeans", "bottom").await?;
        create_test_item(&db, "bob", "Coat", "outerwear").await?;

        assert_eq!(first.item_type, "top");
        assert_eq!(first.times_worn, 0);
        assert!(first.last_worn.is_none());

        let items = list_items(&db, "alice").await?;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, second.id);
        assert_eq!(count_items(&db, "alice").await?, 2);
        assert_eq!(count_items(&db, "nobody").await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_items_are_owner_scoped() -> Result<()> {
        let db = setup_test_db().await?;
        let item = create_test_item(&db, "alice", "Scarf", "accessory").await?;

        assert!(get_item(&db, "bob", item.id).await?.is_none());
        let result = delete_item(&db, "bob", item.id).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        assert!(get_item(&db, "alice", item.id).await?.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn test_update_and_favorite() -> Result<()> {
        let db = setup_test_db().await?;
        let item = create_test_item(&db, "alice", "Blazer", "outerwear").await?;

        let updated = update_item(
            &db,
            "alice",
            item.id,
            ClothingItemUpdate {
                color: Some(" Navy ".to_string()),
                seasons: Some(TagList::parse("fall, winter")),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.color.as_deref(), Some("navy"));
        assert!(updated.seasons.contains("winter"));
        assert_eq!(updated.name, "Blazer");

        let fav = toggle_item_favorite(&db, "alice", item.id).await?;
        assert!(fav.is_favorite);
        let unfav = toggle_item_favorite(&db, "alice", item.id).await?;
        assert!(!unfav.is_favorite);

        Ok(())
    }

    #[tokio::test]
    async fn test_mark_items_worn_is_atomic_increment() -> Result<()> {
        let db = setup_test_db().await?;
        let a = create_test_item(&db, "alice", "Tee", "top").await?;
        let b = create_test_item(&db, "alice", "Shorts", "bottom").await?;
        let other = create_test_item(&db, "bob", "Hat", "accessory").await?;

        let now = Utc::now();
        let affected = mark_items_worn(&db, "alice", &[a.id, b.id, other.id], now).await?;
        assert_eq!(affected, 2);
        mark_items_worn(&db, "alice", &[a.id], now).await?;

        let items = get_items_by_ids(&db, "alice", &[b.id, a.id]).await?;
        assert_eq!(items[0].id, b.id);
        assert_eq!(items[0].times_worn, 1);
        assert_eq!(items[1].times_worn, 2);
        assert!(items[1].last_worn.is_some());

        let untouched = get_item(&db, "bob", other.id).await?.unwrap();
        assert_eq!(untouched.times_worn, 0);

        Ok(())
    }
}
