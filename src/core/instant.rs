//! Instant outfit ideas - wardrobe-agnostic suggestions for a style and occasion.
//!
//! Each call consumes one unit of the owner's daily instant-outfit quota before the
//! LLM is asked. Nothing is persisted unless the owner saves an idea afterwards.

use crate::{
    core::{
        assistant::Assistant,
        learning,
        quota::{self, QuotaDimension, QuotaStatus},
    },
    entities::learning_datum,
    errors::{Error, Result},
    services::{llm::complete_json, weather::current_or_fallback},
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

/// Ideas returned per request
pub const INSTANT_OUTFITS: usize = 3;

const DEFAULT_WEATHER: &str = "mild weather";

/// One suggested outfit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutfitIdea {
    /// Short title
    pub title: String,
    /// Pieces making up the look
    #[serde(default)]
    pub items: Vec<String>,
    /// Why it works
    #[serde(default)]
    pub reasoning: String,
    /// Colour palette
    #[serde(default)]
    pub palette: Vec<String>,
    /// Things to avoid with this look
    #[serde(default)]
    pub do_not_wear: Vec<String>,
}

/// Parameters of an instant outfit request
#[derive(Debug, Clone, Default)]
pub struct InstantOutfitRequest {
    /// Desired style, e.g. "minimal"
    pub style: String,
    /// Occasion, e.g. "job interview"
    pub occasion: String,
    /// Explicit weather label, takes precedence over a lookup
    pub weather: Option<String>,
    /// City to look the weather up for
    pub city: Option<String>,
    /// Country disambiguating `city`
    pub country: Option<String>,
}

/// Result of an instant outfit request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstantOutfitResponse {
    /// Up to three ideas; empty when the limit was reached
    pub outfits: Vec<OutfitIdea>,
    /// Ideas are templates rather than LLM output
    pub used_fallback: bool,
    /// Today's quota is exhausted
    pub limit_reached: bool,
    /// Generations left today; `None` when unlimited or unknown
    pub generations_remaining: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct InstantReply {
    #[serde(default)]
    outfits: Vec<OutfitIdea>,
}

/// Generates up to three outfit ideas for `request`.
///
/// Returns `None` when no LLM is configured. LLM, weather and quota-store failures never
/// surface: the response carries templated ideas and `used_fallback` instead.
pub async fn generate_instant_outfits(
    db: &DatabaseConnection,
    assistant: &Assistant,
    user_id: &str,
    request: &InstantOutfitRequest,
    today: NaiveDate,
) -> Option<InstantOutfitResponse> {
    let llm = assistant.llm()?;
    let limit = assistant.limits().instant_outfits_per_day;

    let status = match quota::try_consume(db, user_id, QuotaDimension::InstantOutfits, limit, today).await {
        Ok(status) if status.limit_reached() => {
            return Some(InstantOutfitResponse {
                outfits: Vec::new(),
                used_fallback: false,
                limit_reached: true,
                generations_remaining: Some(0),
            });
        }
        Ok(status) => Some(status),
        Err(e) => {
            warn!(
                user_id,
                error = %e,
                used_fallback = true,
                source = "instant",
                "Quota check failed, serving template outfits"
            );
            None
        }
    };

    let weather = weather_label(assistant, request).await;
    let generations_remaining = status.as_ref().and_then(QuotaStatus::remaining);

    if status.is_none() {
        return Some(InstantOutfitResponse {
            outfits: fallback_outfits(&request.style, &request.occasion, &weather),
            used_fallback: true,
            limit_reached: false,
            generations_remaining,
        });
    }

    let prompt = format!(
        "Style: {}\nOccasion: {}\nWeather: {weather}\n\
         Suggest {INSTANT_OUTFITS} complete outfits.",
        request.style, request.occasion
    );
    let llm_request = assistant.request(system_prompt(assistant.persona()), prompt);

    let (outfits, used_fallback) = match complete_json::<InstantReply>(llm, llm_request).await {
        Ok(reply) if !reply.outfits.is_empty() => {
            let mut outfits = reply.outfits;
            outfits.truncate(INSTANT_OUTFITS);
            (outfits, false)
        }
        Ok(_) => {
            warn!(
                user_id,
                used_fallback = true,
                source = "instant",
                "LLM reply had no outfits, serving template outfits"
            );
            (fallback_outfits(&request.style, &request.occasion, &weather), true)
        }
        Err(e) => {
            warn!(
                user_id,
                error = %e,
                used_fallback = true,
                source = "instant",
                "LLM call failed, serving template outfits"
            );
            (fallback_outfits(&request.style, &request.occasion, &weather), true)
        }
    };

    Some(InstantOutfitResponse {
        outfits,
        used_fallback,
        limit_reached: false,
        generations_remaining,
    })
}

async fn weather_label(assistant: &Assistant, request: &InstantOutfitRequest) -> String {
    if let Some(label) = request.weather.as_deref().map(str::trim).filter(|w| !w.is_empty()) {
        return label.to_string();
    }
    match request.city.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        Some(city) => {
            let (report, _) =
                current_or_fallback(assistant.weather(), city, request.country.as_deref()).await;
            report.summary()
        }
        None => DEFAULT_WEATHER.to_string(),
    }
}

fn system_prompt(persona: &str) -> String {
    format!(
        "You are {persona}, a friendly personal stylist. Reply with a JSON object only: \
         {{\"outfits\": [{{\"title\": \"...\", \"items\": [\"...\"], \
         \"reasoning\": \"at most two sentences\", \"palette\": [\"...\"], \
         \"doNotWear\": [\"...\"]}}]}} with exactly {INSTANT_OUTFITS} outfits."
    )
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

/// Three generic template outfits, used whenever the LLM gives nothing usable.
#[must_use]
pub fn fallback_outfits(style: &str, occasion: &str, weather: &str) -> Vec<OutfitIdea> {
    let style = if style.trim().is_empty() { "classic" } else { style.trim() };
    let occasion = if occasion.trim().is_empty() { "your day" } else { occasion.trim() };

    vec![
        OutfitIdea {
            title: format!("Effortless {style} basics"),
            items: strings(&["Crisp white shirt", "Straight-leg jeans", "Clean white sneakers"]),
            reasoning: format!("A reliable base for {occasion} that works in {weather}."),
            palette: strings(&["white", "denim blue"]),
            do_not_wear: strings(&["Clashing prints"]),
        },
        OutfitIdea {
            title: format!("Polished {style} layers"),
            items: strings(&["Fine-knit sweater", "Tailored trousers", "Loafers", "Light trench coat"]),
            reasoning: format!("Easy to adjust for {weather} while staying sharp for {occasion}."),
            palette: strings(&["camel", "navy", "cream"]),
            do_not_wear: strings(&["Athletic wear"]),
        },
        OutfitIdea {
            title: format!("Relaxed {style} statement"),
            items: strings(&["Midi dress or linen shirt", "Neutral cardigan", "Ankle boots"]),
            reasoning: format!("Comfortable yet considered, with one standout piece for {occasion}."),
            palette: strings(&["olive", "black", "gold accents"]),
            do_not_wear: strings(&["Overly formal suiting"]),
        },
    ]
}

/// Keeps one idea as a `saved_instant` learning datum.
pub async fn save_instant_outfit(
    db: &DatabaseConnection,
    user_id: &str,
    idea: &OutfitIdea,
    request: &InstantOutfitRequest,
) -> Result<learning_datum::Model> {
    if idea.title.trim().is_empty() {
        return Err(Error::validation("Outfit title cannot be empty"));
    }

    learning::record_interaction(
        db,
        learning::NewLearningDatum {
            user_id: user_id.to_string(),
            interaction_type: learning::SAVED_INSTANT.to_string(),
            rating: None,
            feedback: None,
            outfit_data: json!({
                "title": idea.title,
                "items": idea.items,
                "style": request.style.trim().to_lowercase(),
                "colors": idea.palette,
            }),
            context: json!({
                "occasion": request.occasion,
                "weather": request.weather,
            }),
            success: true,
        },
    )
    .await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{config::settings::LimitsConfig, test_utils::*};
    use std::sync::Arc;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()
    }

    fn request() -> InstantOutfitRequest {
        InstantOutfitRequest {
            style: "minimal".to_string(),
            occasion: "gallery opening".to_string(),
            weather: Some("light rain, 12°C".to_string()),
            ..Default::default()
        }
    }

    const FOUR_OUTFITS: &str = r#"{"outfits": [
        {"title": "A", "items": ["x"], "reasoning": "r", "palette": ["black"], "doNotWear": ["y"]},
        {"title": "B", "items": ["x"], "reasoning": "r", "palette": [], "doNotWear": []},
        {"title": "C", "items": [], "reasoning": "r"},
        {"title": "D"}
    ]}"#;

    #[tokio::test]
    async fn test_none_without_llm() -> Result<()> {
        let db = setup_test_db().await?;
        let assistant = test_assistant(None, Arc::new(FixedWeather::at(20.0)));
        assert!(generate_instant_outfits(&db, &assistant, "alice", &request(), day()).await.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_reply_is_truncated_to_three() -> Result<()> {
        let db = setup_test_db().await?;
        let model = Arc::new(ScriptedModel::replying(FOUR_OUTFITS));
        let assistant = test_assistant(Some(Arc::clone(&model)), Arc::new(FixedWeather::at(20.0)));

        let response = generate_instant_outfits(&db, &assistant, "alice", &request(), day())
            .await
            .unwrap();
        assert_eq!(response.outfits.len(), 3);
        assert_eq!(response.outfits[0].do_not_wear, vec!["y".to_string()]);
        assert!(!response.used_fallback);
        assert_eq!(response.generations_remaining, Some(9));

        let prompt = model.requests()[0].prompt().to_string();
        assert!(prompt.contains("light rain, 12°C"));
        assert!(prompt.contains("gallery opening"));
        Ok(())
    }

    #[tokio::test]
    async fn test_short_reply_is_not_backfilled() -> Result<()> {
        let db = setup_test_db().await?;
        let model = Arc::new(ScriptedModel::replying(r#"{"outfits": [{"title": "Only one"}]}"#));
        let assistant = test_assistant(Some(model), Arc::new(FixedWeather::at(20.0)));

        let response = generate_instant_outfits(&db, &assistant, "alice", &request(), day())
            .await
            .unwrap();
        assert_eq!(response.outfits.len(), 1);
        assert!(!response.used_fallback);
        Ok(())
    }

    #[tokio::test]
    async fn test_failure_or_empty_reply_uses_templates() -> Result<()> {
        let db = setup_test_db().await?;

        for model in [
            ScriptedModel::failing(),
            ScriptedModel::replying(r#"{"outfits": []}"#),
            ScriptedModel::replying(r#"{"looks": ["a"]}"#),
        ] {
            let assistant = test_assistant(Some(Arc::new(model)), Arc::new(FixedWeather::at(20.0)));
            let response = generate_instant_outfits(&db, &assistant, "alice", &request(), day())
                .await
                .unwrap();
            assert_eq!(response.outfits.len(), INSTANT_OUTFITS);
            assert!(response.used_fallback);
            assert!(!response.limit_reached);
            assert!(response.outfits[0].title.contains("minimal"));
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_limit_reached_after_threshold() -> Result<()> {
        let db = setup_test_db().await?;
        let model = Arc::new(ScriptedModel::replying(FOUR_OUTFITS));
        let limits = LimitsConfig {
            instant_outfits_per_day: 2,
            ..Default::default()
        };
        let assistant = test_assistant_with_limits(Some(Arc::clone(&model)), Arc::new(FixedWeather::at(20.0)), limits);

        for _ in 0..2 {
            let response = generate_instant_outfits(&db, &assistant, "alice", &request(), day())
                .await
                .unwrap();
            assert!(!response.limit_reached);
        }

        let denied = generate_instant_outfits(&db, &assistant, "alice", &request(), day())
            .await
            .unwrap();
        assert!(denied.limit_reached);
        assert_eq!(denied.generations_remaining, Some(0));
        assert!(denied.outfits.is_empty());
        assert_eq!(model.requests().len(), 2);

        // Chat budget is untouched
        let chat = quota::quota_status(&db, "alice", QuotaDimension::ChatMessages, 5, day()).await?;
        assert_eq!(chat.used, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_weather_lookup_when_no_label() -> Result<()> {
        let db = setup_test_db().await?;
        let model = Arc::new(ScriptedModel::replying(FOUR_OUTFITS));
        let assistant = test_assistant(Some(Arc::clone(&model)), Arc::new(FixedWeather::at(31.0)));

        let mut req = request();
        req.weather = None;
        req.city = Some("Seville".to_string());
        generate_instant_outfits(&db, &assistant, "alice", &req, day()).await.unwrap();

        req.city = None;
        generate_instant_outfits(&db, &assistant, "alice", &req, day()).await.unwrap();

        let requests = model.requests();
        assert!(requests[0].prompt().contains("31°C"));
        assert!(requests[1].prompt().contains(DEFAULT_WEATHER));
        Ok(())
    }

    #[tokio::test]
    async fn test_save_instant_outfit() -> Result<()> {
        let db = setup_test_db().await?;
        let idea = fallback_outfits("minimal", "work", "sunny").remove(1);

        let saved = save_instant_outfit(&db, "alice", &idea, &request()).await?;
        assert_eq!(saved.interaction_type, learning::SAVED_INSTANT);
        assert_eq!(saved.outfit_data["style"], "minimal");
        assert_eq!(saved.outfit_data["colors"][0], "camel");
        Ok(())
    }
}
