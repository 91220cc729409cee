//! Styling Discord commands - suggestions, chat, weather, insights, preferences and the quiz.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        core::{
            chat::{self as chat_core, ChatUser},
            instant::{self, InstantOutfitRequest, INSTANT_OUTFITS},
            learning, outfit,
            preferences::{self, PreferencesUpdate},
            quiz, quota, suggestion,
        },
        entities::TagList,
        errors::{Error, Result},
        services::weather,
    };
    use std::fmt::Write;

    fn remaining_line(remaining: Option<u32>, noun: &str) -> String {
        remaining.map_or_else(String::new, |n| format!("\n_{n} {noun} left today._"))
    }

    /// Gets instant outfit ideas for a style and occasion.
    #[poise::command(slash_command, prefix_command)]
    pub async fn suggest(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Style (e.g. minimal, boho, classic)"] style: String,
        #[description = "Occasion (e.g. job interview, brunch)"] occasion: String,
        #[description = "Weather, if you already know it (e.g. rainy and cold)"]
        weather: Option<String>,
        #[description = "City to check the weather for"] city: Option<String>,
        #[description = "Save idea number 1-3 to your style profile"]
        #[min = 1]
        #[max = 3]
        keep: Option<u8>,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;
        let user_id = ctx.author().id.to_string();

        // The city falls back to the one in the owner's preferences
        let prefs = preferences::get_preferences(db, &user_id).await?;
        let (city, country) = match city {
            Some(city) => (Some(city), None),
            None => prefs.map_or((None, None), |p| (p.city, p.country)),
        };

        let request = InstantOutfitRequest {
            style,
            occasion,
            weather,
            city,
            country,
        };

        ctx.defer().await?;
        let Some(response) = instant::generate_instant_outfits(
            db,
            &data.assistant,
            &user_id,
            &request,
            quota::local_today(),
        )
        .await
        else {
            ctx.say("ℹ️ Outfit ideas are unavailable: no LLM API key is configured.")
                .await?;
            return Ok(());
        };

        if response.limit_reached {
            ctx.say(format!(
                "⏳ You've used all {} outfit generations for today. Come back tomorrow!",
                data.assistant.limits().instant_outfits_per_day
            ))
            .await?;
            return Ok(());
        }

        let mut reply = format!(
            "✨ **{} outfit ideas for {}**\n",
            request.style, request.occasion
        );
        for (i, idea) in response.outfits.iter().take(INSTANT_OUTFITS).enumerate() {
            writeln!(&mut reply, "\n**{}. {}**", i + 1, idea.title)?;
            for item in &idea.items {
                writeln!(&mut reply, "• {item}")?;
            }
            if !idea.palette.is_empty() {
                writeln!(&mut reply, "🎨 {}", idea.palette.join(", "))?;
            }
            if !idea.reasoning.is_empty() {
                writeln!(&mut reply, "_{}_", idea.reasoning)?;
            }
            if !idea.do_not_wear.is_empty() {
                writeln!(&mut reply, "🚫 Skip: {}", idea.do_not_wear.join(", "))?;
            }
        }

        if let Some(n) = keep {
            match response.outfits.get(usize::from(n) - 1) {
                Some(idea) => {
                    instant::save_instant_outfit(db, &user_id, idea, &request).await?;
                    writeln!(&mut reply, "\n💾 Saved idea {n} to your style profile.")?;
                }
                None => writeln!(&mut reply, "\n❌ There is no idea {n} to save.")?,
            }
        }

        reply.push_str(&remaining_line(response.generations_remaining, "generations"));
        ctx.say(reply).await?;
        Ok(())
    }

    /// Asks the style assistant anything. Users without a saved profile chat as guests.
    #[poise::command(slash_command, prefix_command)]
    pub async fn chat(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Your question"] message: String,
    ) -> Result<()> {
        let data = ctx.data();
        let user_id = ctx.author().id.to_string();

        ctx.defer().await?;
        let user = chat_core::resolve_chat_user(&data.database, &user_id).await?;
        let answer = chat_core::chat(
            &data.database,
            &data.assistant,
            user,
            &message,
            quota::local_today(),
        )
        .await?;

        let Some(answer) = answer else {
            ctx.say("ℹ️ Chat is unavailable: no LLM API key is configured.")
                .await?;
            return Ok(());
        };

        if answer.limit_reached {
            let limits = data.assistant.limits();
            let (allowance, hint) = match user {
                ChatUser::Member(_) => (limits.chat_messages_per_day, ""),
                ChatUser::Guest(_) => (
                    limits.guest_chat_messages_per_day,
                    " Set up your profile with `/prefs` for more.",
                ),
            };
            ctx.say(format!(
                "⏳ You've used all {allowance} chat messages for today. Come back tomorrow!{hint}"
            ))
            .await?;
            return Ok(());
        }

        let mut reply = answer.reply;
        reply.push_str(&remaining_line(answer.messages_remaining, "messages"));
        ctx.say(reply).await?;
        Ok(())
    }

    /// Shows today's outfit suggestion.
    #[poise::command(slash_command, prefix_command)]
    pub async fn today(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let db = &ctx.data().database;
        let user_id = ctx.author().id.to_string();
        let date = quota::local_today();

        let current = match suggestion::get_suggestion_for_date(db, &user_id, date).await? {
            Some(s) => Some(s),
            None => suggestion::get_latest_suggestion(db, &user_id).await?,
        };
        let Some(current) = current else {
            ctx.say(
                "📭 No suggestion yet. Turn on daily suggestions with `/prefs daily:true` and add some outfits!",
            )
            .await?;
            return Ok(());
        };

        let viewed = suggestion::mark_viewed(db, &user_id, current.id).await?;
        let outfits = outfit::get_outfits_by_ids(db, &user_id, &viewed.outfit_ids.0).await?;

        let mut response = if viewed.suggestion_date == date {
            String::from("👗 **Today's suggestion**\n")
        } else {
            format!(
                "👗 **Latest suggestion** ({})\n",
                viewed.suggestion_date.format("%Y-%m-%d")
            )
        };
        writeln!(&mut response, "{}", viewed.reasoning)?;
        for o in &outfits {
            writeln!(&mut response, "• **{}**", o.name)?;
        }
        if outfits.is_empty() {
            writeln!(&mut response, "_The suggested outfits have since been deleted._")?;
        }
        if viewed.accepted {
            response.push_str("✅ Accepted");
        } else {
            response.push_str("Like it? Use `/accept`.");
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Accepts today's outfit suggestion.
    #[poise::command(slash_command, prefix_command)]
    pub async fn accept(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let db = &ctx.data().database;
        let user_id = ctx.author().id.to_string();

        let Some(current) =
            suggestion::get_suggestion_for_date(db, &user_id, quota::local_today()).await?
        else {
            ctx.say("📭 There is no suggestion for today.").await?;
            return Ok(());
        };

        suggestion::mark_accepted(db, &user_id, current.id).await?;
        ctx.say("✅ Great choice! Suggestion accepted.").await?;
        Ok(())
    }

    /// Shows the current weather for a city.
    #[poise::command(slash_command, prefix_command)]
    pub async fn weather(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "City (defaults to the one in your preferences)"] city: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let user_id = ctx.author().id.to_string();

        let (city, country) = match city {
            Some(city) => (city, None),
            None => match preferences::get_preferences(&data.database, &user_id)
                .await?
                .and_then(|p| p.city.map(|city| (city, p.country)))
            {
                Some(found) => found,
                None => {
                    ctx.say("❌ Give a city, or set one with `/prefs city:...`.")
                        .await?;
                    return Ok(());
                }
            },
        };

        let (report, generated) =
            weather::current_or_fallback(data.assistant.weather(), &city, country.as_deref())
                .await;

        let mut response = format!("🌤️ **Weather in {}**\n", report.city);
        writeln!(&mut response, "{}", report.summary())?;
        writeln!(
            &mut response,
            "Feels like {:.0}°C, humidity {:.0}%, wind {:.0} km/h",
            report.feels_like, report.humidity, report.wind_speed
        )?;
        if generated {
            response.push_str("_Live weather is unavailable, this is an estimate._");
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Shows what the assistant has learned about your style.
    #[poise::command(slash_command, prefix_command)]
    pub async fn insights(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();
        let user_id = ctx.author().id.to_string();

        let rows =
            learning::get_recent_learning_data(&data.database, &user_id, learning::PATTERN_WINDOW)
                .await?;
        if rows.is_empty() {
            ctx.say("🔍 Nothing learned yet. Rate outfits with `/rate` or take the `/quiz`!")
                .await?;
            return Ok(());
        }

        let summary = learning::summarize(&rows);
        let patterns = learning::analyze_patterns(&rows);

        let mut response = format!("🔍 **What {} has learned**\n", data.assistant.persona());
        if let Some(style) = &summary.top_style {
            writeln!(&mut response, "Favourite style: {style}")?;
        }
        if !summary.top_colors.is_empty() {
            writeln!(&mut response, "Favourite colours: {}", summary.top_colors.join(", "))?;
        }
        if let Some(avg) = summary.average_rating {
            writeln!(&mut response, "Average rating: {avg:.1}/5")?;
        }
        for pattern in &patterns {
            writeln!(&mut response, "• {pattern}")?;
        }
        write!(
            &mut response,
            "_Based on your last {} interactions._",
            summary.sample_size
        )?;

        ctx.say(response).await?;
        Ok(())
    }

    /// Updates your style preferences.
    #[poise::command(slash_command, prefix_command)]
    #[allow(clippy::too_many_arguments)]
    pub async fn prefs(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Your city, for weather"] city: Option<String>,
        #[description = "Your country"] country: Option<String>,
        #[description = "Favourite styles, comma-separated"] styles: Option<String>,
        #[description = "Favourite colours, comma-separated"] colors: Option<String>,
        #[description = "Your lifestyle (e.g. office worker, student)"] lifestyle: Option<String>,
        #[description = "Receive a daily outfit suggestion"] daily: Option<bool>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let user_id = ctx.author().id.to_string();

        let prefs = preferences::upsert_preferences(
            db,
            &user_id,
            PreferencesUpdate {
                favorite_colors: colors.map(|s| TagList::parse(&s)),
                favorite_styles: styles.map(|s| TagList::parse(&s)),
                lifestyle,
                city,
                country,
                daily_suggestions: daily,
                ..Default::default()
            },
        )
        .await?;

        let join = |tags: &TagList| {
            if tags.is_empty() {
                "-".to_string()
            } else {
                tags.iter().collect::<Vec<_>>().join(", ")
            }
        };

        let mut response = String::from("⚙️ **Your preferences**\n");
        writeln!(
            &mut response,
            "City: {}",
            prefs.city.as_deref().unwrap_or("-")
        )?;
        writeln!(&mut response, "Styles: {}", join(&prefs.favorite_styles))?;
        writeln!(&mut response, "Colours: {}", join(&prefs.favorite_colors))?;
        if !prefs.quiz_styles.is_empty() {
            writeln!(&mut response, "Quiz result: {}", join(&prefs.quiz_styles))?;
        }
        write!(
            &mut response,
            "Daily suggestions: {}",
            if prefs.daily_suggestions { "on" } else { "off" }
        )?;

        ctx.say(response).await?;
        Ok(())
    }

    /// Takes the style quiz. Run without answers to see the questions.
    #[poise::command(slash_command, prefix_command)]
    pub async fn quiz(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Your answers as option numbers, comma-separated (e.g. 1,3,2,4,1)"]
        answers: Option<String>,
    ) -> Result<()> {
        let Some(answers) = answers else {
            let mut response = String::from("📝 **Style quiz**\n");
            for (q, question) in quiz::QUESTIONS.iter().enumerate() {
                writeln!(&mut response, "\n**{}. {}**", q + 1, question.prompt)?;
                for (o, option) in question.options.iter().enumerate() {
                    writeln!(&mut response, "  {}) {}", o + 1, option.label)?;
                }
            }
            response.push_str("\nAnswer with `/quiz answers:1,2,...`");
            ctx.say(response).await?;
            return Ok(());
        };

        let choices = answers
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| match s.parse::<usize>() {
                Ok(n) if n >= 1 => Ok(n - 1),
                _ => Err(Error::validation(format!("'{s}' is not an option number"))),
            })
            .collect::<Result<Vec<usize>>>()?;

        let db = &ctx.data().database;
        let user_id = ctx.author().id.to_string();
        let prefs = quiz::apply_quiz(db, &user_id, &choices).await?;

        ctx.say(format!(
            "🎉 Your style: **{}**",
            prefs.quiz_styles.iter().collect::<Vec<_>>().join(", ")
        ))
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
