//! Styling assistant chat.
//!
//! Members spend their durable `chat_messages` quota and get answers grounded in their
//! preferences, wardrobe and rating history. Guests are limited in memory only and get
//! no personal context.

use crate::{
    core::{
        assistant::Assistant,
        learning, preferences,
        quota::{self, QuotaDimension},
        wardrobe,
    },
    entities::{clothing_item, user_preferences},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::fmt::Write as _;
use tracing::warn;

const MAX_MESSAGE_CHARS: usize = 2000;

/// Who is chatting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatUser<'a> {
    /// A member with a durable profile
    Member(&'a str),
    /// A guest identified only by an opaque key
    Guest(&'a str),
}

/// The assistant's answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    /// Reply text
    pub reply: String,
    /// The reply is canned rather than generated
    pub used_fallback: bool,
    /// Today's quota is exhausted
    pub limit_reached: bool,
    /// Messages left today; `None` when unlimited
    pub messages_remaining: Option<u32>,
}

/// Answers one chat message.
///
/// Returns `None` when no LLM is configured. An LLM failure yields a canned reply with
/// `used_fallback` set; running out of quota yields `limit_reached` and no LLM call.
pub async fn chat(
    db: &DatabaseConnection,
    assistant: &Assistant,
    user: ChatUser<'_>,
    message: &str,
    today: NaiveDate,
) -> Result<Option<ChatReply>> {
    let message = message.trim();
    if message.is_empty() {
        return Err(Error::validation("Message cannot be empty"));
    }
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(Error::validation(format!(
            "Message is too long (max {MAX_MESSAGE_CHARS} characters)"
        )));
    }

    let Some(llm) = assistant.llm() else {
        return Ok(None);
    };

    let status = match user {
        ChatUser::Member(user_id) => {
            quota::try_consume(
                db,
                user_id,
                QuotaDimension::ChatMessages,
                assistant.limits().chat_messages_per_day,
                today,
            )
            .await?
        }
        ChatUser::Guest(key) => assistant.guest_chat().try_consume(key, today),
    };

    if status.limit_reached() {
        return Ok(Some(ChatReply {
            reply: format!(
                "You've used all your messages with {} for today. Come back tomorrow!",
                assistant.persona()
            ),
            used_fallback: false,
            limit_reached: true,
            messages_remaining: Some(0),
        }));
    }

    let context = match user {
        ChatUser::Member(user_id) => match member_context(db, user_id).await {
            Ok(context) => context,
            Err(e) => {
                warn!(
                    user_id,
                    error = %e,
                    used_fallback = true,
                    source = "chat",
                    "Could not load member context, answering without it"
                );
                String::new()
            }
        },
        ChatUser::Guest(_) => String::new(),
    };

    let prompt = if context.is_empty() {
        message.to_string()
    } else {
        format!("{context}\nUser message: {message}")
    };
    let request = assistant.request(system_prompt(assistant.persona()), prompt);

    let (reply, used_fallback) = match llm.complete(request).await {
        Ok(text) if !text.trim().is_empty() => (text.trim().to_string(), false),
        Ok(_) => (fallback_reply(assistant.persona()), true),
        Err(e) => {
            let user_id = match user {
                ChatUser::Member(id) | ChatUser::Guest(id) => id,
            };
            warn!(
                user_id,
                error = %e,
                used_fallback = true,
                source = "chat",
                "LLM call failed, sending canned reply"
            );
            (fallback_reply(assistant.persona()), true)
        }
    };

    Ok(Some(ChatReply {
        reply,
        used_fallback,
        limit_reached: false,
        messages_remaining: status.remaining(),
    }))
}

/// Members are callers with a saved profile; everyone else chats as a guest keyed by
/// their id.
pub async fn resolve_chat_user<'a>(db: &DatabaseConnection, user_id: &'a str) -> Result<ChatUser<'a>> {
    Ok(match preferences::get_preferences(db, user_id).await? {
        Some(_) => ChatUser::Member(user_id),
        None => ChatUser::Guest(user_id),
    })
}

async fn member_context(db: &DatabaseConnection, user_id: &str) -> Result<String> {
    let (prefs, items, history) = tokio::try_join!(
        preferences::get_preferences(db, user_id),
        wardrobe::list_items(db, user_id),
        learning::get_recent_learning_data(db, user_id, learning::CHAT_WINDOW),
    )?;
    let insights = learning::analyze_patterns(&history);

    let mut context = String::new();
    if let Some(prefs) = &prefs {
        describe_preferences(&mut context, prefs);
    }
    if !items.is_empty() {
        let _ = writeln!(context, "Wardrobe: {}.", wardrobe_summary(&items));
    }
    for insight in insights {
        let _ = writeln!(context, "Insight: {insight}");
    }
    Ok(context)
}

fn describe_preferences(out: &mut String, prefs: &user_preferences::Model) {
    let styles: Vec<&str> = prefs
        .favorite_styles
        .iter()
        .chain(prefs.quiz_styles.iter())
        .collect();
    if !styles.is_empty() {
        let _ = writeln!(out, "Style: {}.", styles.join(", "));
    }
    if !prefs.favorite_colors.is_empty() {
        let colors: Vec<&str> = prefs.favorite_colors.iter().collect();
        let _ = writeln!(out, "Favourite colours: {}.", colors.join(", "));
    }
    if let Some(lifestyle) = &prefs.lifestyle {
        let _ = writeln!(out, "Lifestyle: {lifestyle}.");
    }
    if let Some(city) = &prefs.city {
        let _ = writeln!(out, "Lives in: {city}.");
    }
}

/// `"5 items: 2 top, 2 bottom, 1 shoes"`, types in first-seen order
fn wardrobe_summary(items: &[clothing_item::Model]) -> String {
    let mut by_type: Vec<(&str, usize)> = Vec::new();
    for item in items {
        match by_type.iter_mut().find(|(t, _)| *t == item.item_type) {
            Some((_, count)) => *count += 1,
            None => by_type.push((item.item_type.as_str(), 1)),
        }
    }
    let parts: Vec<String> = by_type
        .iter()
        .map(|(t, count)| format!("{count} {t}"))
        .collect();
    format!("{} items: {}", items.len(), parts.join(", "))
}

fn system_prompt(persona: &str) -> String {
    format!(
        "You are {persona}, a warm and encouraging personal stylist. Give concise, \
         practical fashion advice in a friendly tone, using what you know about the user."
    )
}

fn fallback_reply(persona: &str) -> String {
    format!(
        "{persona} here! I'm having trouble thinking right now. In the meantime, a \
         well-fitted basic and one statement piece never fail. Ask me again in a moment?"
    )
}
