//! Wardrobe Discord commands - clothing items, outfits, wear history and ratings.
//!
//! Every command acts on the invoking user's own wardrobe.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete},
        core::{
            outfit::{self, NewOutfit, WearDetails},
            preferences, quota,
            wardrobe::{self, NewClothingItem},
        },
        entities::TagList,
        errors::{Error, Result},
    };
    use std::fmt::Write;

    fn tags(input: Option<String>) -> TagList {
        input.map(|s| TagList::parse(&s)).unwrap_or_default()
    }

    fn join_tags(tags: &TagList) -> String {
        if tags.is_empty() {
            "-".to_string()
        } else {
            tags.iter().collect::<Vec<_>>().join(", ")
        }
    }

    /// Adds a clothing item to your wardrobe.
    #[poise::command(slash_command, prefix_command)]
    pub async fn item_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name of the item"] name: String,
        #[description = "Type (top, bottom, dress, outerwear, shoes, accessory...)"]
        item_type: String,
        #[description = "Main colour"] color: Option<String>,
        #[description = "Seasons, comma-separated (e.g. spring, summer)"] seasons: Option<String>,
        #[description = "Occasions, comma-separated (e.g. work, casual)"] occasions: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let user_id = ctx.author().id.to_string();

        let item = wardrobe::create_item(
            db,
            &user_id,
            NewClothingItem {
                name,
                item_type,
                color,
                seasons: tags(seasons),
                occasions: tags(occasions),
                ..Default::default()
            },
        )
        .await?;

        ctx.say(format!(
            "✅ Added **{}** ({}) to your wardrobe as item #{}.",
            item.name, item.item_type, item.id
        ))
        .await?;
        Ok(())
    }

    /// Lists the clothing items in your wardrobe.
    #[poise::command(slash_command, prefix_command)]
    pub async fn items(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let db = &ctx.data().database;
        let user_id = ctx.author().id.to_string();

        let items = wardrobe::list_items(db, &user_id).await?;
        if items.is_empty() {
            ctx.say("👕 Your wardrobe is empty. Add something with `/item_add`!")
                .await?;
            return Ok(());
        }

        let mut response = format!("👕 **Your wardrobe** ({} items)\n", items.len());
        for item in &items {
            write!(&mut response, "• #{} **{}** - {}", item.id, item.name, item.item_type)?;
            if let Some(color) = &item.color {
                write!(&mut response, ", {color}")?;
            }
            if item.is_favorite {
                response.push_str(" ⭐");
            }
            writeln!(&mut response, " (worn {}x)", item.times_worn)?;
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Removes a clothing item from your wardrobe.
    #[poise::command(slash_command, prefix_command)]
    pub async fn item_remove(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Item id (see /items)"] item_id: i64,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let user_id = ctx.author().id.to_string();

        wardrobe::delete_item(db, &user_id, item_id).await?;
        ctx.say(format!("🗑️ Removed item #{item_id}.")).await?;
        Ok(())
    }

    /// Creates an outfit from items you own.
    #[poise::command(slash_command, prefix_command)]
    pub async fn outfit_create(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name of the outfit"] name: String,
        #[description = "Item ids, comma-separated (see /items)"] item_ids: String,
        #[description = "Seasons, comma-separated (or all-season)"] seasons: Option<String>,
        #[description = "Occasions, comma-separated"] occasions: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let user_id = ctx.author().id.to_string();

        let ids = item_ids
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.trim_start_matches('#')
                    .parse::<i64>()
                    .map_err(|_| Error::validation(format!("'{s}' is not an item id")))
            })
            .collect::<Result<Vec<i64>>>()?;

        let created = outfit::create_outfit(
            db,
            &user_id,
            NewOutfit {
                name,
                item_ids: ids,
                seasons: tags(seasons),
                occasions: tags(occasions),
            },
        )
        .await?;

        ctx.say(format!(
            "✅ Created outfit **{}** with {} item{}.",
            created.name,
            created.item_ids.len(),
            if created.item_ids.len() == 1 { "" } else { "s" }
        ))
        .await?;
        Ok(())
    }

    /// Lists your outfits.
    #[poise::command(slash_command, prefix_command)]
    pub async fn outfits(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let db = &ctx.data().database;
        let user_id = ctx.author().id.to_string();

        let outfits = outfit::list_outfits(db, &user_id).await?;
        if outfits.is_empty() {
            ctx.say("👗 No outfits yet. Build one with `/outfit_create`!")
                .await?;
            return Ok(());
        }

        let mut response = format!("👗 **Your outfits** ({})\n", outfits.len());
        for o in &outfits {
            let last_worn = o
                .last_worn
                .map_or_else(|| "never".to_string(), |d| d.format("%Y-%m-%d").to_string());
            writeln!(
                &mut response,
                "• **{}** - seasons: {}, occasions: {}, last worn: {last_worn}",
                o.name,
                join_tags(&o.seasons),
                join_tags(&o.occasions)
            )?;
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Logs that you wore an outfit today.
    #[poise::command(slash_command, prefix_command)]
    pub async fn wear(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Outfit you wore"]
        #[autocomplete = "autocomplete::autocomplete_outfit_name"]
        outfit_name: String,
        #[description = "Activity (e.g. office, dinner)"] activity: Option<String>,
        #[description = "Notes"] notes: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let user_id = ctx.author().id.to_string();

        let Some(worn) = outfit::get_outfit_by_name(db, &user_id, &outfit_name).await? else {
            ctx.say(format!(
                "❌ Outfit '{outfit_name}' not found. Use `/outfits` to see yours."
            ))
            .await?;
            return Ok(());
        };

        outfit::log_outfit_wear(
            db,
            &user_id,
            worn.id,
            quota::local_today(),
            WearDetails {
                activity,
                notes,
                ..Default::default()
            },
        )
        .await?;

        ctx.say(format!(
            "📝 Logged **{}**. Worn {} time{} so far.",
            worn.name,
            worn.times_worn + 1,
            if worn.times_worn == 0 { "" } else { "s" }
        ))
        .await?;
        Ok(())
    }

    /// Rates one of your outfits from 1 to 5.
    #[poise::command(slash_command, prefix_command)]
    pub async fn rate(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Outfit to rate"]
        #[autocomplete = "autocomplete::autocomplete_outfit_name"]
        outfit_name: String,
        #[description = "Rating from 1 (not for me) to 5 (love it)"]
        #[min = 1]
        #[max = 5]
        rating: i32,
        #[description = "What did you think?"] feedback: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;
        let user_id = ctx.author().id.to_string();

        let Some(rated) = outfit::get_outfit_by_name(db, &user_id, &outfit_name).await? else {
            ctx.say(format!("❌ Outfit '{outfit_name}' not found.")).await?;
            return Ok(());
        };

        // Temperature context comes from the owner's city when one is set
        let temperature = match preferences::get_preferences(db, &user_id)
            .await?
            .and_then(|p| p.city.map(|city| (city, p.country)))
        {
            Some((city, country)) => data
                .assistant
                .weather()
                .current(&city, country.as_deref())
                .await
                .ok()
                .map(|w| w.temperature),
            None => None,
        };

        outfit::rate_outfit(db, &user_id, rated.id, rating, feedback, temperature).await?;

        let reaction = match rating {
            5 => "😍",
            4 => "😊",
            3 => "🙂",
            2 => "😕",
            _ => "🙅",
        };
        ctx.say(format!(
            "{reaction} Thanks! Rated **{}** {rating}/5. {} will keep that in mind.",
            rated.name,
            data.assistant.persona()
        ))
        .await?;
        Ok(())
    }

    /// Shows your recent wear history.
    #[poise::command(slash_command, prefix_command)]
    pub async fn history(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "How many entries (default 10)"]
        #[min = 1]
        #[max = 25]
        limit: Option<u64>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let user_id = ctx.author().id.to_string();

        let logs = outfit::list_outfit_logs(db, &user_id, limit.unwrap_or(10)).await?;
        if logs.is_empty() {
            ctx.say("📅 No wear history yet. Log an outfit with `/wear`!")
                .await?;
            return Ok(());
        }

        let ids: Vec<i64> = logs.iter().map(|log| log.outfit_id).collect();
        let outfits = outfit::get_outfits_by_ids(db, &user_id, &ids).await?;

        let mut response = String::from("📅 **Recently worn**\n");
        for log in &logs {
            let name = outfits
                .iter()
                .find(|o| o.id == log.outfit_id)
                .map_or("(deleted outfit)", |o| o.name.as_str());
            write!(&mut response, "• {} - **{name}**", log.worn_on.format("%Y-%m-%d"))?;
            if let Some(notes) = &log.notes {
                write!(&mut response, " _{notes}_")?;
            }
            response.push('\n');
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Marks or unmarks one of your outfits as a favourite.
    #[poise::command(slash_command, prefix_command)]
    pub async fn favorite(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Outfit to toggle"]
        #[autocomplete = "autocomplete::autocomplete_outfit_name"]
        outfit_name: String,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let user_id = ctx.author().id.to_string();

        let Some(found) = outfit::get_outfit_by_name(db, &user_id, &outfit_name).await? else {
            ctx.say(format!("❌ Outfit '{outfit_name}' not found.")).await?;
            return Ok(());
        };

        let toggled = outfit::toggle_outfit_favorite(db, &user_id, found.id).await?;
        let message = if toggled.is_favorite {
            format!("⭐ **{}** is now a favourite.", toggled.name)
        } else {
            format!("**{}** is no longer a favourite.", toggled.name)
        };
        ctx.say(message).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
