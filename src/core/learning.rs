//! Preference learning - records interactions and derives preference signals from them.
//!
//! Nothing is materialized: every summary is recomputed from a small window of the most
//! recent rows (50 for pattern analysis, 20 for chat context). Frequency ties are broken
//! by first-seen order, and rows arrive newest first, so the most recent key wins a tie.

use crate::{
    core::selection::WeatherBracket,
    entities::{LearningDatum, learning_datum},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};
use serde::Serialize;

/// Interaction tag for a plain rating
pub const RATING: &str = "rating";
/// Interaction tag for an explicit rejection
pub const REJECTED: &str = "rejected";
/// Interaction tag for a completed style quiz
pub const QUIZ_COMPLETED: &str = "quiz_completed";
/// Interaction tag for an instant outfit the user chose to keep
pub const SAVED_INSTANT: &str = "saved_instant";

/// Rows read for pattern analysis
pub const PATTERN_WINDOW: u64 = 50;
/// Rows read for chat context
pub const CHAT_WINDOW: u64 = 20;

const MIN_PATTERN_SAMPLES: usize = 3;
const MIN_SATISFACTION_SAMPLES: usize = 5;

/// Fields for a new learning datum
#[derive(Debug, Clone)]
pub struct NewLearningDatum {
    /// Owner
    pub user_id: String,
    /// Interaction tag
    pub interaction_type: String,
    /// Optional 1-5 rating
    pub rating: Option<i32>,
    /// Optional free-text feedback
    pub feedback: Option<String>,
    /// Outfit attributes
    pub outfit_data: Json,
    /// Situational context
    pub context: Json,
    /// Positive outcome
    pub success: bool,
}

/// Appends one interaction. Ratings must be between 1 and 5.
pub async fn record_interaction(
    db: &DatabaseConnection,
    datum: NewLearningDatum,
) -> Result<learning_datum::Model> {
    if let Some(rating) = datum.rating {
        if !(1..=5).contains(&rating) {
            return Err(Error::validation(format!(
                "Rating must be between 1 and 5, got {rating}"
            )));
        }
    }

    learning_datum::ActiveModel {
        user_id: Set(datum.user_id),
        interaction_type: Set(datum.interaction_type),
        rating: Set(datum.rating),
        feedback: Set(datum.feedback),
        outfit_data: Set(datum.outfit_data),
        context: Set(datum.context),
        success: Set(datum.success),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// The owner's most recent interactions, newest first.
pub async fn get_recent_learning_data(
    db: &DatabaseConnection,
    user_id: &str,
    limit: u64,
) -> Result<Vec<learning_datum::Model>> {
    LearningDatum::find()
        .filter(learning_datum::Column::UserId.eq(user_id))
        .order_by_desc(learning_datum::Column::CreatedAt)
        .order_by_desc(learning_datum::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Counts keys while remembering the order they were first seen in.
#[derive(Debug, Default)]
struct FrequencyTable {
    entries: Vec<(String, usize)>,
}

impl FrequencyTable {
    fn add(&mut self, key: &str) {
        let key = key.trim().to_lowercase();
        if key.is_empty() {
            return;
        }
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((key, 1)),
        }
    }

    /// Keys by descending count; the stable sort keeps first-seen order on ties.
    fn top(&self, n: usize) -> Vec<(String, usize)> {
        let mut sorted = self.entries.clone();
        sorted.sort_by(|a, b| b.1.cmp(&a.1));
        sorted.truncate(n);
        sorted
    }
}

fn is_liked(row: &learning_datum::Model) -> bool {
    row.rating.is_some_and(|r| r >= 4)
}

fn is_disliked(row: &learning_datum::Model) -> bool {
    row.rating == Some(1) || row.interaction_type == REJECTED
}

fn style_of(row: &learning_datum::Model) -> Option<&str> {
    row.outfit_data.get("style").and_then(Json::as_str)
}

fn occasion_of(row: &learning_datum::Model) -> Option<&str> {
    row.context
        .get("occasion")
        .and_then(Json::as_str)
        .or_else(|| row.outfit_data.get("occasion").and_then(Json::as_str))
}

fn colors_of(row: &learning_datum::Model) -> Vec<&str> {
    row.outfit_data
        .get("colors")
        .and_then(Json::as_array)
        .map(|colors| colors.iter().filter_map(Json::as_str).collect())
        .unwrap_or_default()
}

fn temperature_of(row: &learning_datum::Model) -> Option<f64> {
    row.context.get("temperature").and_then(Json::as_f64)
}

/// Simple frequency summary of recent interactions
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PreferenceSummary {
    /// Most frequent style among liked outfits
    pub top_style: Option<String>,
    /// Up to three most frequent colours among liked outfits
    pub top_colors: Vec<String>,
    /// Mean of all ratings present
    pub average_rating: Option<f64>,
    /// Number of rows considered
    pub sample_size: usize,
}

/// Summarizes rows into top style, top colours and average rating.
#[must_use]
pub fn summarize(rows: &[learning_datum::Model]) -> PreferenceSummary {
    let mut styles = FrequencyTable::default();
    let mut colors = FrequencyTable::default();

    for row in rows.iter().filter(|r| is_liked(r)) {
        if let Some(style) = style_of(row) {
            styles.add(style);
        }
        for color in colors_of(row) {
            colors.add(color);
        }
    }

    let ratings: Vec<i32> = rows.iter().filter_map(|r| r.rating).collect();
    #[allow(clippy::cast_precision_loss)] // at most a few dozen ratings
    let average_rating = (!ratings.is_empty())
        .then(|| f64::from(ratings.iter().sum::<i32>()) / ratings.len() as f64);

    PreferenceSummary {
        top_style: styles.top(1).into_iter().next().map(|(k, _)| k),
        top_colors: colors.top(3).into_iter().map(|(k, _)| k).collect(),
        average_rating,
        sample_size: rows.len(),
    }
}

/// Turns recent interactions into at most one sentence per pattern category.
///
/// Categories with too few supporting samples are left out: style, colour, temperature
/// and occasion affinity need three liked rows carrying that attribute, the rejection
/// pattern needs three disliked rows and overall satisfaction needs five ratings.
#[must_use]
pub fn analyze_patterns(rows: &[learning_datum::Model]) -> Vec<String> {
    let liked: Vec<&learning_datum::Model> = rows.iter().filter(|r| is_liked(r)).collect();
    let disliked: Vec<&learning_datum::Model> = rows.iter().filter(|r| is_disliked(r)).collect();
    let mut insights = Vec::new();

    let mut styles = FrequencyTable::default();
    let mut style_samples = 0;
    for style in liked.iter().filter_map(|r| style_of(r)) {
        styles.add(style);
        style_samples += 1;
    }
    if style_samples >= MIN_PATTERN_SAMPLES {
        if let Some((style, count)) = styles.top(1).into_iter().next() {
            insights.push(format!(
                "You consistently love {style} looks ({count} of your top-rated outfits)."
            ));
        }
    }

    let mut colors = FrequencyTable::default();
    let mut color_samples = 0;
    for row in &liked {
        let row_colors = colors_of(row);
        if !row_colors.is_empty() {
            color_samples += 1;
        }
        for color in row_colors {
            colors.add(color);
        }
    }
    if color_samples >= MIN_PATTERN_SAMPLES {
        let top: Vec<String> = colors.top(3).into_iter().map(|(k, _)| k).collect();
        if !top.is_empty() {
            insights.push(format!(
                "Your favourite colours lately are {}.",
                top.join(", ")
            ));
        }
    }

    let mut brackets = FrequencyTable::default();
    let mut temperature_samples = 0;
    for temperature in liked.iter().filter_map(|r| temperature_of(r)) {
        brackets.add(WeatherBracket::from_temperature(temperature).label());
        temperature_samples += 1;
    }
    if temperature_samples >= MIN_PATTERN_SAMPLES {
        if let Some((bracket, _)) = brackets.top(1).into_iter().next() {
            insights.push(format!("You rate your outfits highest in {bracket} weather."));
        }
    }

    let mut occasions = FrequencyTable::default();
    let mut occasion_samples = 0;
    for occasion in liked.iter().filter_map(|r| occasion_of(r)) {
        occasions.add(occasion);
        occasion_samples += 1;
    }
    if occasion_samples >= MIN_PATTERN_SAMPLES {
        if let Some((occasion, _)) = occasions.top(1).into_iter().next() {
            insights.push(format!("You feel most confident dressing for {occasion}."));
        }
    }

    if disliked.len() >= MIN_PATTERN_SAMPLES {
        let mut rejected = FrequencyTable::default();
        for row in &disliked {
            if let Some(style) = style_of(row) {
                rejected.add(style);
            }
        }
        match rejected.top(1).into_iter().next() {
            Some((style, count)) if count > 1 => {
                insights.push(format!("You tend to pass on {style} outfits."));
            }
            _ => insights.push(format!(
                "You turned down {} suggestions recently, so expect bolder alternatives.",
                disliked.len()
            )),
        }
    }

    let ratings: Vec<i32> = rows.iter().filter_map(|r| r.rating).collect();
    if ratings.len() >= MIN_SATISFACTION_SAMPLES {
        #[allow(clippy::cast_precision_loss)] // at most a few dozen ratings
        let average = f64::from(ratings.iter().sum::<i32>()) / ratings.len() as f64;
        let mood = if average >= 4.0 {
            "you're loving your outfits"
        } else if average >= 3.0 {
            "your outfits are working, with room to refine"
        } else {
            "it's time to shake up your rotation"
        };
        insights.push(format!("Your average rating is {average:.1}/5, {mood}."));
    }

    insights
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use serde_json::json;

    fn row(rating: Option<i32>, style: &str, colors: &[&str], temperature: Option<f64>) -> learning_datum::Model {
        learning_datum::Model {
            id: 0,
            user_id: "u".to_string(),
            interaction_type: RATING.to_string(),
            rating,
            feedback: None,
            outfit_data: json!({ "style": style, "colors": colors }),
            context: json!({ "temperature": temperature, "occasion": "work" }),
            success: rating.is_some_and(|r| r >= 4),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_frequency_ties_keep_first_seen_order() {
        let mut table = FrequencyTable::default();
        for key in ["blue", "Red", "red", "blue", "green"] {
            table.add(key);
        }
        let top = table.top(3);
        assert_eq!(top[0], ("blue".to_string(), 2));
        assert_eq!(top[1], ("red".to_string(), 2));
        assert_eq!(top[2], ("green".to_string(), 1));
    }

    #[test]
    fn test_summarize() {
        let rows = vec![
            row(Some(5), "minimal", &["black", "white"], None),
            row(Some(4), "minimal", &["black"], None),
            row(Some(2), "boho", &["orange"], None),
            row(None, "boho", &[], None),
        ];
        let summary = summarize(&rows);
        assert_eq!(summary.top_style.as_deref(), Some("minimal"));
        assert_eq!(summary.top_colors, vec!["black".to_string(), "white".to_string()]);
        assert!((summary.average_rating.unwrap() - 11.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.sample_size, 4);

        assert_eq!(summarize(&[]), PreferenceSummary::default());
    }

    #[test]
    fn test_no_insights_below_minimum_samples() {
        let rows = vec![
            row(Some(5), "minimal", &["black"], Some(5.0)),
            row(Some(5), "minimal", &["black"], Some(6.0)),
        ];
        assert!(analyze_patterns(&rows).is_empty());
    }

    #[test]
    fn test_insights_per_category() {
        let mut rows = vec![
            row(Some(5), "minimal", &["black"], Some(5.0)),
            row(Some(4), "minimal", &["black", "grey"], Some(8.0)),
            row(Some(5), "street", &["grey"], Some(2.0)),
        ];
        for _ in 0..3 {
            let mut rejected = row(Some(1), "boho", &["orange"], None);
            rejected.interaction_type = REJECTED.to_string();
            rows.push(rejected);
        }

        let insights = analyze_patterns(&rows);
        assert_eq!(insights.len(), 6);
        assert!(insights[0].contains("minimal"));
        assert!(insights[1].contains("black, grey"));
        assert!(insights[2].contains("cold weather"));
        assert!(insights[3].contains("work"));
        assert!(insights[4].contains("pass on boho"));
        assert!(insights[5].contains("2.8/5"));
    }

    #[tokio::test]
    async fn test_record_and_read_recent_window() -> Result<()> {
        let db = setup_test_db().await?;

        for rating in 1..=5 {
            record_test_rating(&db, "alice", rating, "casual").await?;
        }
        record_test_rating(&db, "bob", 3, "formal").await?;

        let recent = get_recent_learning_data(&db, "alice", 3).await?;
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].rating, Some(5));
        assert!(recent.iter().all(|r| r.user_id == "alice"));

        Ok(())
    }

    #[tokio::test]
    async fn test_record_rejects_out_of_range_rating() -> Result<()> {
        let db = setup_test_db().await?;
        let result = record_interaction(
            &db,
            NewLearningDatum {
                user_id: "alice".to_string(),
                interaction_type: RATING.to_string(),
                rating: Some(0),
                feedback: None,
                outfit_data: json!({}),
                context: json!({}),
                success: false,
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }
}
