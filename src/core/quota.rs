//! Daily quota tracking - per user, per dimension, per calendar day.
//!
//! Each (owner, dimension, day) has its own counter row, so the daily reset is a
//! property of the key: a counter from another day is simply never read. Consuming a
//! unit is a single conditional `UPDATE … SET count = count + 1 WHERE count < limit`,
//! which keeps two concurrent requests from both taking the last unit.
//!
//! Guests have no durable identity; [`GuestQuota`] tracks them in memory only.

use crate::{
    entities::{UsageQuota, UserPreferences, usage_quota, user_preferences},
    errors::Result,
};
use chrono::{Local, NaiveDate, Utc};
use sea_orm::{
    Set,
    prelude::*,
    sea_query::{Expr, OnConflict},
};
use serde::Serialize;
use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

/// An independently rate-limited feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaDimension {
    /// Messages sent to the styling assistant
    ChatMessages,
    /// Instant outfit generations
    InstantOutfits,
}

impl QuotaDimension {
    /// Key stored in `usage_quotas.dimension`
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::ChatMessages => "chat_messages",
            Self::InstantOutfits => "instant_outfits",
        }
    }
}

/// Outcome of a quota check or consumption
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaStatus {
    /// Units used today, including the one just consumed
    pub used: u32,
    /// Daily threshold
    pub limit: u32,
    /// Premium owners are never limited
    pub premium: bool,
    /// Whether the action is (or was) allowed
    pub allowed: bool,
}

impl QuotaStatus {
    /// True when the action was refused because the quota is exhausted
    #[must_use]
    pub const fn limit_reached(&self) -> bool {
        !self.allowed
    }

    /// Units left today; `None` for premium owners
    #[must_use]
    pub const fn remaining(&self) -> Option<u32> {
        if self.premium {
            None
        } else {
            Some(self.limit.saturating_sub(self.used))
        }
    }
}

/// Today's calendar date in local time. Quota days roll over at local midnight.
#[must_use]
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Whether the owner has the premium flag set. Owners without preferences are not premium.
pub async fn is_premium<C>(db: &C, user_id: &str) -> Result<bool>
where
    C: ConnectionTrait,
{
    let prefs = UserPreferences::find()
        .filter(user_preferences::Column::UserId.eq(user_id))
        .one(db)
        .await?;
    Ok(prefs.is_some_and(|p| p.is_premium))
}

async fn used_today<C>(
    db: &C,
    user_id: &str,
    dimension: QuotaDimension,
    today: NaiveDate,
) -> Result<u32>
where
    C: ConnectionTrait,
{
    let row = UsageQuota::find()
        .filter(usage_quota::Column::UserId.eq(user_id))
        .filter(usage_quota::Column::Dimension.eq(dimension.key()))
        .filter(usage_quota::Column::Day.eq(today))
        .one(db)
        .await?;

    Ok(row.map_or(0, |r| u32::try_from(r.count).unwrap_or(0)))
}

/// Creates today's zero counter unless it already exists.
async fn ensure_counter<C>(
    db: &C,
    user_id: &str,
    dimension: QuotaDimension,
    today: NaiveDate,
) -> Result<()>
where
    C: ConnectionTrait,
{
    let counter = usage_quota::ActiveModel {
        user_id: Set(user_id.to_string()),
        dimension: Set(dimension.key().to_string()),
        day: Set(today),
        count: Set(0),
        updated_at: Set(Utc::now()),
        ..Default::default()
    };

    UsageQuota::insert(counter)
        .on_conflict(
            OnConflict::columns([
                usage_quota::Column::UserId,
                usage_quota::Column::Dimension,
                usage_quota::Column::Day,
            ])
            .do_nothing()
            .to_owned(),
        )
        .do_nothing()
        .exec(db)
        .await?;

    Ok(())
}

/// Reports today's usage without consuming anything.
pub async fn quota_status<C>(
    db: &C,
    user_id: &str,
    dimension: QuotaDimension,
    limit: u32,
    today: NaiveDate,
) -> Result<QuotaStatus>
where
    C: ConnectionTrait,
{
    let premium = is_premium(db, user_id).await?;
    let used = used_today(db, user_id, dimension, today).await?;

    Ok(QuotaStatus {
        used,
        limit,
        premium,
        allowed: premium || used < limit,
    })
}

/// Consumes one unit of `dimension` for today if the owner is within quota.
///
/// Premium owners are always allowed (their usage is still counted). For everyone else
/// the increment only happens while `count < limit`, checked and applied in one
/// statement. A refused call leaves the counter untouched and reports
/// `limit_reached() == true` with zero remaining.
pub async fn try_consume<C>(
    db: &C,
    user_id: &str,
    dimension: QuotaDimension,
    limit: u32,
    today: NaiveDate,
) -> Result<QuotaStatus>
where
    C: ConnectionTrait,
{
    let premium = is_premium(db, user_id).await?;
    ensure_counter(db, user_id, dimension, today).await?;

    let mut update = UsageQuota::update_many()
        .col_expr(
            usage_quota::Column::Count,
            Expr::col(usage_quota::Column::Count).add(1),
        )
        .col_expr(usage_quota::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(usage_quota::Column::UserId.eq(user_id))
        .filter(usage_quota::Column::Dimension.eq(dimension.key()))
        .filter(usage_quota::Column::Day.eq(today));

    if !premium {
        let ceiling = i32::try_from(limit).unwrap_or(i32::MAX);
        update = update.filter(usage_quota::Column::Count.lt(ceiling));
    }

    let result = update.exec(db).await?;
    let allowed = result.rows_affected > 0;
    let used = used_today(db, user_id, dimension, today).await?;

    if !allowed {
        tracing::debug!(user_id, dimension = dimension.key(), used, limit, "Quota exhausted");
    }

    Ok(QuotaStatus {
        used,
        limit,
        premium,
        allowed,
    })
}

#[derive(Debug, Clone, Copy)]
struct GuestUsage {
    day: NaiveDate,
    count: u32,
}

/// In-memory quota for guests without a profile.
///
/// Lost on restart and trivially bypassed; it only gates a convenience feature.
#[derive(Debug)]
pub struct GuestQuota {
    limit: u32,
    usage: Mutex<HashMap<String, GuestUsage>>,
}

impl GuestQuota {
    /// Creates a tracker allowing `limit` actions per guest per day
    #[must_use]
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            usage: Mutex::new(HashMap::new()),
        }
    }

    /// Consumes one unit for `guest_key` if allowed. Entries from other days are dropped
    /// first, so the map only ever holds today's guests.
    pub fn try_consume(&self, guest_key: &str, today: NaiveDate) -> QuotaStatus {
        let mut usage = self.usage.lock().unwrap_or_else(PoisonError::into_inner);
        // Earlier days no longer count
        usage.retain(|_, u| u.day == today);
        let entry = usage
            .entry(guest_key.to_string())
            .or_insert(GuestUsage { day: today, count: 0 });

        let allowed = entry.count < self.limit;
        if allowed {
            entry.count += 1;
        }

        QuotaStatus {
            used: entry.count,
            limit: self.limit,
            premium: false,
            allowed,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[tokio::test]
    async fn test_stale_counter_counts_as_zero() -> Result<()> {
        let db = setup_test_db().await?;

        // Yesterday's counter is far over the limit
        let stale = usage_quota::ActiveModel {
            user_id: Set("alice".to_string()),
            dimension: Set(QuotaDimension::ChatMessages.key().to_string()),
            day: Set(day(1)),
            count: Set(99),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        stale.insert(&db).await?;

        let status = quota_status(&db, "alice", QuotaDimension::ChatMessages, 5, day(2)).await?;
        assert_eq!(status.used, 0);
        assert!(status.allowed);

        let consumed = try_consume(&db, "alice", QuotaDimension::ChatMessages, 5, day(2)).await?;
        assert!(consumed.allowed);
        assert_eq!(consumed.used, 1);
        assert_eq!(consumed.remaining(), Some(4));

        Ok(())
    }

    #[tokio::test]
    async fn test_limit_plus_one_is_denied() -> Result<()> {
        let db = setup_test_db().await?;
        let limit = 5;

        for n in 1..=limit {
            let status =
                try_consume(&db, "bob", QuotaDimension::InstantOutfits, limit, day(3)).await?;
            assert!(status.allowed, "call {n} should be allowed");
            assert_eq!(status.used, n);
        }

        let denied = try_consume(&db, "bob", QuotaDimension::InstantOutfits, limit, day(3)).await?;
        assert!(denied.limit_reached());
        assert_eq!(denied.remaining(), Some(0));
        assert_eq!(denied.used, limit);

        // Next day starts fresh
        let tomorrow = try_consume(&db, "bob", QuotaDimension::InstantOutfits, limit, day(4)).await?;
        assert!(tomorrow.allowed);
        assert_eq!(tomorrow.used, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_premium_always_allowed() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_preferences(&db, "vip").await?;
        crate::core::preferences::set_premium(&db, "vip", true).await?;

        for _ in 0..4 {
            let status = try_consume(&db, "vip", QuotaDimension::ChatMessages, 2, day(5)).await?;
            assert!(status.allowed);
            assert!(status.premium);
            assert_eq!(status.remaining(), None);
        }

        let status = quota_status(&db, "vip", QuotaDimension::ChatMessages, 2, day(5)).await?;
        assert_eq!(status.used, 4);
        assert!(status.allowed);

        Ok(())
    }

    #[tokio::test]
    async fn test_dimensions_do_not_share_counters() -> Result<()> {
        let db = setup_test_db().await?;

        for _ in 0..2 {
            try_consume(&db, "carol", QuotaDimension::ChatMessages, 2, day(6)).await?;
        }
        let chat = try_consume(&db, "carol", QuotaDimension::ChatMessages, 2, day(6)).await?;
        assert!(chat.limit_reached());

        let outfits = try_consume(&db, "carol", QuotaDimension::InstantOutfits, 2, day(6)).await?;
        assert!(outfits.allowed);
        assert_eq!(outfits.used, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_last_unit_granted_once() -> Result<()> {
        let db = setup_test_db().await?;
        let limit = 5;

        for _ in 0..4 {
            try_consume(&db, "dave", QuotaDimension::ChatMessages, limit, day(7)).await?;
        }

        let (first, second) = tokio::join!(
            try_consume(&db, "dave", QuotaDimension::ChatMessages, limit, day(7)),
            try_consume(&db, "dave", QuotaDimension::ChatMessages, limit, day(7)),
        );
        let granted = [first?, second?].iter().filter(|s| s.allowed).count();
        assert_eq!(granted, 1);

        let third = try_consume(&db, "dave", QuotaDimension::ChatMessages, limit, day(7)).await?;
        assert!(third.limit_reached());
        assert_eq!(third.used, limit);

        Ok(())
    }

    #[test]
    fn test_guest_quota_resets_on_new_day() {
        let guests = GuestQuota::new(2);

        assert!(guests.try_consume("guest-1", day(8)).allowed);
        assert!(guests.try_consume("guest-1", day(8)).allowed);
        let denied = guests.try_consume("guest-1", day(8));
        assert!(denied.limit_reached());
        assert_eq!(denied.remaining(), Some(0));

        // Another guest is unaffected
        assert!(guests.try_consume("guest-2", day(8)).allowed);

        let next_day = guests.try_consume("guest-1", day(9));
        assert!(next_day.allowed);
        assert_eq!(next_day.used, 1);
    }

    #[test]
    fn test_guest_quota_forgets_earlier_days() {
        let guests = GuestQuota::new(2);
        guests.try_consume("guest-1", day(8));
        guests.try_consume("guest-2", day(8));
        guests.try_consume("guest-3", day(9));

        let usage = guests.usage.lock().unwrap();
        assert_eq!(usage.len(), 1);
        assert!(usage.contains_key("guest-3"));
    }
}
