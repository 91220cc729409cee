//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables; every row is owned by exactly one user.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod clothing_item;
pub mod daily_suggestion;
pub mod fashion_trend;
pub mod learning_datum;
pub mod outfit;
pub mod outfit_log;
pub mod tags;
pub mod usage_quota;
pub mod user_preferences;

// Re-export specific types to avoid conflicts
pub use clothing_item::{
    Column as ClothingItemColumn, Entity as ClothingItem, Model as ClothingItemModel,
};
pub use daily_suggestion::{
    Column as DailySuggestionColumn, Entity as DailySuggestion, Model as DailySuggestionModel,
};
pub use fashion_trend::{
    Column as FashionTrendColumn, Entity as FashionTrend, Model as FashionTrendModel,
};
pub use learning_datum::{
    Column as LearningDatumColumn, Entity as LearningDatum, Model as LearningDatumModel,
};
pub use outfit::{Column as OutfitColumn, Entity as Outfit, Model as OutfitModel};
pub use outfit_log::{Column as OutfitLogColumn, Entity as OutfitLog, Model as OutfitLogModel};
pub use tags::{IdList, TagList};
pub use usage_quota::{
    Column as UsageQuotaColumn, Entity as UsageQuota, Model as UsageQuotaModel,
};
pub use user_preferences::{
    Column as UserPreferencesColumn, Entity as UserPreferences, Model as UserPreferencesModel,
};
