//! Daily suggestion batch - one outfit set per opted-in owner per day.
//!
//! Owners are processed one after another. For each owner the wardrobe, weather,
//! learning history and trends are gathered, a short list of weather-appropriate
//! candidates is built and the LLM picks up to three of them with a rationale. When the
//! LLM fails or answers with nothing usable, the top candidates are stored with a
//! canned rationale instead. A failure for one owner is counted and the run moves on.

use crate::{
    core::{
        assistant::Assistant,
        learning, outfit, preferences,
        selection::{self, DAILY_CANDIDATES, WeatherBracket},
        suggestion::{self, NewDailySuggestion},
        trend, wardrobe,
    },
    entities::{clothing_item, fashion_trend, outfit as outfit_entity, user_preferences},
    errors::Result,
    services::{
        llm::complete_json,
        weather::{WeatherReport, current_or_fallback, fallback_weather},
    },
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use tracing::{error, info, warn};

/// Candidates listed in the prompt for the LLM to choose from
const PROMPT_CANDIDATES: usize = 10;

/// Summary of one batch run, printed as JSON by the `daily` command
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// No owner failed
    pub success: bool,
    /// The run did nothing because no LLM is configured
    pub skipped: bool,
    /// Suggestions created
    pub processed: usize,
    /// Of those, how many used the canned rationale
    pub fallbacks: usize,
    /// Owners left alone (already done today or nothing to suggest from)
    pub unchanged: usize,
    /// Owners whose generation failed
    pub errors: usize,
}

/// What happened for one owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DailyOutcome {
    /// A suggestion row was written
    Created {
        /// New suggestion id
        suggestion_id: i64,
        /// Whether the canned rationale was used
        used_fallback: bool,
    },
    /// The owner already has a suggestion for the day
    AlreadyGenerated,
    /// The owner has no clothing items or no outfits
    NoWardrobe,
    /// No LLM configured
    NotConfigured,
}

#[derive(Debug, Deserialize)]
struct DailyReply {
    #[serde(default)]
    outfit_ids: Vec<i64>,
    #[serde(default)]
    reasoning: String,
}

/// Runs the daily batch for every owner who opted in.
pub async fn run_daily_suggestions(
    db: &DatabaseConnection,
    assistant: &Assistant,
    today: NaiveDate,
) -> Result<BatchReport> {
    if assistant.llm().is_none() {
        info!("Daily suggestions skipped: no LLM configured");
        return Ok(BatchReport {
            success: true,
            skipped: true,
            ..Default::default()
        });
    }

    let subscribers = preferences::list_daily_subscribers(db).await?;
    let mut report = BatchReport::default();

    for prefs in &subscribers {
        match generate_for_user(db, assistant, prefs, today).await {
            Ok(DailyOutcome::Created { used_fallback, .. }) => {
                report.processed += 1;
                if used_fallback {
                    report.fallbacks += 1;
                }
            }
            Ok(DailyOutcome::AlreadyGenerated | DailyOutcome::NoWardrobe) => {
                report.unchanged += 1;
            }
            Ok(DailyOutcome::NotConfigured) => {}
            Err(e) => {
                error!(user_id = %prefs.user_id, error = %e, "Daily suggestion failed");
                report.errors += 1;
            }
        }
    }

    report.success = report.errors == 0;
    info!(
        %today,
        subscribers = subscribers.len(),
        processed = report.processed,
        fallbacks = report.fallbacks,
        unchanged = report.unchanged,
        errors = report.errors,
        "Daily suggestion run finished"
    );
    Ok(report)
}

/// Generates and stores today's suggestion for one owner.
pub async fn generate_for_user(
    db: &DatabaseConnection,
    assistant: &Assistant,
    prefs: &user_preferences::Model,
    today: NaiveDate,
) -> Result<DailyOutcome> {
    let Some(llm) = assistant.llm() else {
        return Ok(DailyOutcome::NotConfigured);
    };
    let user_id = prefs.user_id.as_str();

    if suggestion::get_suggestion_for_date(db, user_id, today)
        .await?
        .is_some()
    {
        return Ok(DailyOutcome::AlreadyGenerated);
    }

    let (items, outfits) = tokio::try_join!(
        wardrobe::list_items(db, user_id),
        outfit::list_outfits(db, user_id),
    )?;
    if items.is_empty() || outfits.is_empty() {
        return Ok(DailyOutcome::NoWardrobe);
    }

    let ((weather, weather_fallback), history, trends) = tokio::join!(
        weather_for(assistant, prefs),
        learning::get_recent_learning_data(db, user_id, learning::PATTERN_WINDOW),
        trend::get_top_trends(db, trend::PROMPT_TRENDS),
    );
    let insights = learning::analyze_patterns(&history?);
    let trends = trends?;

    let bracket = WeatherBracket::from_temperature(weather.temperature);
    let candidates = selection::select_candidates(outfits.clone(), weather.temperature, PROMPT_CANDIDATES);

    let prompt = build_prompt(prefs, &weather, bracket, &candidates, &items, &insights, &trends);
    let request = assistant.request(system_prompt(assistant.persona()), prompt);

    let picked = match complete_json::<DailyReply>(llm, request).await {
        Ok(reply) => {
            let ids = owned_ids(&reply.outfit_ids, &outfits);
            if ids.is_empty() || reply.reasoning.trim().is_empty() {
                warn!(
                    user_id,
                    used_fallback = true,
                    source = "daily",
                    "LLM reply had no usable outfits, using fallback selection"
                );
                None
            } else {
                Some((ids, reply.reasoning.trim().to_string()))
            }
        }
        Err(e) => {
            warn!(
                user_id,
                error = %e,
                used_fallback = true,
                source = "daily",
                "LLM call failed, using fallback selection"
            );
            None
        }
    };

    let used_fallback = picked.is_none();
    let (outfit_ids, reasoning) = picked.unwrap_or_else(|| {
        let ids: Vec<i64> = candidates
            .iter()
            .take(DAILY_CANDIDATES)
            .map(|o| o.id)
            .collect();
        let reasoning = fallback_rationale(&weather, bracket, ids.len());
        (ids, reasoning)
    });

    let mut weather_context = serde_json::to_value(&weather)?;
    weather_context["bracket"] = bracket.label().into();
    weather_context["generated"] = weather_fallback.into();

    let created = suggestion::create_daily_suggestion(
        db,
        NewDailySuggestion {
            user_id: user_id.to_string(),
            suggestion_date: today,
            outfit_ids,
            reasoning,
            weather_context,
            used_fallback,
        },
    )
    .await?;

    Ok(created.map_or(DailyOutcome::AlreadyGenerated, |row| {
        DailyOutcome::Created {
            suggestion_id: row.id,
            used_fallback,
        }
    }))
}

async fn weather_for(assistant: &Assistant, prefs: &user_preferences::Model) -> (WeatherReport, bool) {
    match prefs.city.as_deref() {
        Some(city) => current_or_fallback(assistant.weather(), city, prefs.country.as_deref()).await,
        None => {
            warn!(
                user_id = %prefs.user_id,
                used_fallback = true,
                source = "weather",
                "No city set, using generated weather"
            );
            (fallback_weather("your area"), true)
        }
    }
}

/// Keeps ids of the owner's outfits, first occurrence only, at most three.
fn owned_ids(ids: &[i64], outfits: &[outfit_entity::Model]) -> Vec<i64> {
    let mut kept: Vec<i64> = Vec::new();
    for id in ids {
        if outfits.iter().any(|o| o.id == *id) && !kept.contains(id) {
            kept.push(*id);
        }
        if kept.len() == DAILY_CANDIDATES {
            break;
        }
    }
    kept
}

/// Weather-derived rationale used when the LLM gives nothing usable
#[must_use]
pub fn fallback_rationale(weather: &WeatherReport, bracket: WeatherBracket, count: usize) -> String {
    let advice = match bracket {
        WeatherBracket::Cold => "Layer up and keep warm",
        WeatherBracket::Mild => "A light layer you can take off will do",
        WeatherBracket::Warm => "Keep it light and breathable",
    };
    let plural = if count == 1 { "" } else { "s" };
    format!(
        "It's {} in {} today. {advice}: here {} {count} {} outfit{plural} you haven't worn in a while.",
        weather.summary(),
        weather.city,
        if count == 1 { "is" } else { "are" },
        bracket.label(),
    )
}

fn system_prompt(persona: &str) -> String {
    format!(
        "You are {persona}, a friendly personal stylist. You pick outfits from the user's \
         own wardrobe. Reply with a JSON object only: \
         {{\"outfit_ids\": [up to 3 ids from the candidate list], \
         \"reasoning\": \"at most two sentences\"}}."
    )
}

fn build_prompt(
    prefs: &user_preferences::Model,
    weather: &WeatherReport,
    bracket: WeatherBracket,
    candidates: &[outfit_entity::Model],
    items: &[clothing_item::Model],
    insights: &[String],
    trends: &[fashion_trend::Model],
) -> String {
    let mut prompt = String::new();

    let _ = writeln!(
        prompt,
        "Weather in {}: {} (feels like {:.0}°C, {} weather).",
        weather.city,
        weather.summary(),
        weather.feels_like,
        bracket.label()
    );

    let styles: Vec<&str> = prefs
        .favorite_styles
        .iter()
        .chain(prefs.quiz_styles.iter())
        .collect();
    if !styles.is_empty() {
        let _ = writeln!(prompt, "Preferred styles: {}.", styles.join(", "));
    }
    if !prefs.favorite_colors.is_empty() {
        let colors: Vec<&str> = prefs.favorite_colors.iter().collect();
        let _ = writeln!(prompt, "Favourite colours: {}.", colors.join(", "));
    }
    if let Some(lifestyle) = &prefs.lifestyle {
        let _ = writeln!(prompt, "Lifestyle: {lifestyle}.");
    }

    if !insights.is_empty() {
        prompt.push_str("What we learned from their ratings:\n");
        for insight in insights {
            let _ = writeln!(prompt, "- {insight}");
        }
    }

    if !trends.is_empty() {
        prompt.push_str("Current trends:\n");
        for t in trends {
            let _ = writeln!(prompt, "- {}: {}", t.name, t.description);
        }
    }

    prompt.push_str("Candidate outfits (least recently worn first):\n");
    for candidate in candidates {
        let pieces: Vec<&str> = candidate
            .item_ids
            .0
            .iter()
            .filter_map(|id| items.iter().find(|i| i.id == *id))
            .map(|i| i.name.as_str())
            .collect();
        let seasons: Vec<&str> = candidate.seasons.iter().collect();
        let _ = writeln!(
            prompt,
            "- id {}: \"{}\" [{}] seasons: {}",
            candidate.id,
            candidate.name,
            pieces.join(", "),
            if seasons.is_empty() { "any".to_string() } else { seasons.join("/") }
        );
    }

    prompt.push_str("Pick the best outfits for today.");
    prompt
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        core::outfit::{WearDetails, log_outfit_wear},
        test_utils::*,
    };
    use std::sync::Arc;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 15).unwrap()
    }

    #[tokio::test]
    async fn test_skipped_without_llm() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_preferences(&db, "alice").await?;
        create_test_outfit(&db, "alice", "Beach", "summer").await?;

        let assistant = test_assistant(None, Arc::new(FixedWeather::at(25.0)));
        let report = run_daily_suggestions(&db, &assistant, day()).await?;

        assert!(report.skipped);
        assert_eq!(report.processed, 0);
        assert!(suggestion::get_suggestion_for_date(&db, "alice", day()).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_owner_without_outfits_is_left_alone() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_preferences(&db, "alice").await?;
        create_test_item(&db, "alice", "Tee", "top").await?;

        let model = Arc::new(ScriptedModel::replying(r#"{"outfit_ids": [1], "reasoning": "x"}"#));
        let assistant = test_assistant(Some(Arc::clone(&model)), Arc::new(FixedWeather::at(25.0)));
        let report = run_daily_suggestions(&db, &assistant, day()).await?;

        assert_eq!(report.unchanged, 1);
        assert_eq!(report.processed, 0);
        assert_eq!(report.errors, 0);
        assert!(model.requests().is_empty());
        assert!(suggestion::get_suggestion_for_date(&db, "alice", day()).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_llm_choice_is_filtered_to_owned_outfits() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_preferences(&db, "alice").await?;
        let (beach, _) = create_test_outfit(&db, "alice", "Beach", "summer").await?;
        let (city, _) = create_test_outfit(&db, "alice", "City", "spring").await?;
        let (foreign, _) = create_test_outfit(&db, "bob", "Bob's", "summer").await?;

        let reply = format!(
            r#"{{"outfit_ids": [{}, {}, {}, {}], "reasoning": "Sunny and warm, go breezy."}}"#,
            city.id, foreign.id, beach.id, city.id
        );
        let model = Arc::new(ScriptedModel::replying(&reply));
        let assistant = test_assistant(Some(Arc::clone(&model)), Arc::new(FixedWeather::at(27.0)));
        let report = run_daily_suggestions(&db, &assistant, day()).await?;

        assert_eq!(report.processed, 1);
        assert_eq!(report.fallbacks, 0);
        assert!(report.success);

        let stored = suggestion::get_suggestion_for_date(&db, "alice", day()).await?.unwrap();
        assert_eq!(stored.outfit_ids.0, vec![city.id, beach.id]);
        assert_eq!(stored.reasoning, "Sunny and warm, go breezy.");
        assert!(!stored.used_fallback);
        assert_eq!(stored.weather_context["bracket"], "warm");

        let requests = model.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].json_mode);
        assert!(requests[0].prompt().contains("Beach"));
        assert!(!requests[0].prompt().contains("Bob's"));
        Ok(())
    }

    #[tokio::test]
    async fn test_llm_failure_falls_back_to_least_recently_worn() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_preferences(&db, "alice").await?;
        let (worn, _) = create_test_outfit(&db, "alice", "Worn", "summer").await?;
        let (fresh, _) = create_test_outfit(&db, "alice", "Fresh", "summer").await?;
        let (winter, _) = create_test_outfit(&db, "alice", "Parka", "winter").await?;
        let (spring, _) = create_test_outfit(&db, "alice", "Trench", "spring").await?;
        log_outfit_wear(&db, "alice", worn.id, day(), WearDetails::default()).await?;

        let model = Arc::new(ScriptedModel::failing());
        let assistant = test_assistant(Some(model), Arc::new(FixedWeather::at(24.0)));
        let report = run_daily_suggestions(&db, &assistant, day()).await?;

        assert_eq!(report.processed, 1);
        assert_eq!(report.fallbacks, 1);

        let stored = suggestion::get_suggestion_for_date(&db, "alice", day()).await?.unwrap();
        assert!(stored.used_fallback);
        assert_eq!(stored.outfit_ids.0, vec![fresh.id, spring.id, worn.id]);
        assert!(!stored.outfit_ids.0.contains(&winter.id));
        assert!(stored.reasoning.contains("warm"));
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_reply_uses_fallback() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_preferences(&db, "alice").await?;
        create_test_outfit(&db, "alice", "Layers", "fall").await?;

        let model = Arc::new(ScriptedModel::replying("Sure! Here are some outfits..."));
        let assistant = test_assistant(Some(model), Arc::new(FailingWeather));
        let report = run_daily_suggestions(&db, &assistant, day()).await?;

        assert_eq!(report.fallbacks, 1);
        let stored = suggestion::get_suggestion_for_date(&db, "alice", day()).await?.unwrap();
        assert_eq!(stored.outfit_ids.len(), 1);
        assert_eq!(stored.weather_context["generated"], true);
        Ok(())
    }

    #[tokio::test]
    async fn test_second_run_same_day_is_noop() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_preferences(&db, "alice").await?;
        let (outfit, _) = create_test_outfit(&db, "alice", "Beach", "summer").await?;

        let reply = format!(r#"{{"outfit_ids": [{}], "reasoning": "First pick."}}"#, outfit.id);
        let model = Arc::new(ScriptedModel::replying(&reply));
        let assistant = test_assistant(Some(Arc::clone(&model)), Arc::new(FixedWeather::at(25.0)));

        let first = run_daily_suggestions(&db, &assistant, day()).await?;
        assert_eq!(first.processed, 1);
        let second = run_daily_suggestions(&db, &assistant, day()).await?;
        assert_eq!(second.processed, 0);
        assert_eq!(second.unchanged, 1);
        assert_eq!(model.requests().len(), 1);

        let stored = suggestion::get_suggestion_for_date(&db, "alice", day()).await?.unwrap();
        assert_eq!(stored.reasoning, "First pick.");

        // The next day generates again
        let next = run_daily_suggestions(&db, &assistant, day().succ_opt().unwrap()).await?;
        assert_eq!(next.processed, 1);
        Ok(())
    }

    #[test]
    fn test_fallback_rationale_mentions_weather() {
        let mut weather = fallback_weather("Oslo");
        weather.temperature = 2.0;
        weather.condition = "Slight snow fall".to_string();
        let text = fallback_rationale(&weather, WeatherBracket::Cold, 3);
        assert!(text.contains("Oslo"));
        assert!(text.contains("2°C, Slight snow fall"));
        assert!(text.contains("3 cold outfits"));
    }
}
