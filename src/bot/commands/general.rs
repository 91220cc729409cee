//! General Discord commands - ping, help, and the admin-only daily run and premium grant.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        core::{daily, preferences, quota},
        errors::{Error, Result},
    };
    use std::fmt::Write;

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let persona = ctx.data().assistant.persona().to_string();
        let help_text = format!(
            "**WardrobeBuddy Help**\n\
            Here is a summary of all available commands.\n\n\
            **Wardrobe**\n\
            • `/item_add <name> <type> [color] [seasons] [occasions]` - Adds a clothing item.\n\
            • `/items` - Lists your clothing items.\n\
            • `/item_remove <id>` - Removes a clothing item.\n\
            • `/outfit_create <name> <item ids> [seasons] [occasions]` - Builds an outfit from your items.\n\
            • `/outfits` - Lists your outfits.\n\
            • `/wear <outfit> [activity] [notes]` - Logs that you wore an outfit today.\n\
            • `/history [limit]` - Shows your recent wear history.\n\
            • `/favorite <outfit>` - Marks or unmarks a favourite outfit.\n\
            • `/rate <outfit> <1-5> [feedback]` - Rates an outfit so {persona} learns your taste.\n\n\
            **Styling**\n\
            • `/today` - Shows today's outfit suggestion.\n\
            • `/accept` - Accepts today's suggestion.\n\
            • `/suggest <style> <occasion> [weather] [city] [keep]` - Instant outfit ideas.\n\
            • `/chat <message>` - Ask {persona} anything about style.\n\
            • `/weather [city]` - Current weather for your city.\n\
            • `/insights` - What {persona} has learned about your style.\n\
            • `/prefs ...` - Sets your city, styles, colours and daily suggestions.\n\
            • `/quiz [answers]` - Takes the style quiz.\n\n\
            **Utility**\n\
            • `/ping` - Checks if the bot is responsive.\n\
            • `/help` - Shows this help message."
        );

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Runs today's daily suggestion batch (admins only).
    #[poise::command(slash_command, prefix_command)]
    pub async fn daily_run(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();
        if !data.is_admin(&ctx.author().id.to_string()) {
            ctx.say("❌ Only admins can run the daily batch.").await?;
            return Ok(());
        }

        ctx.defer().await?;
        let report =
            daily::run_daily_suggestions(&data.database, &data.assistant, quota::local_today())
                .await?;

        if report.skipped {
            ctx.say("ℹ️ Daily run skipped: no LLM API key is configured.")
                .await?;
            return Ok(());
        }

        let mut response = String::from("✅ **Daily run complete**\n");
        writeln!(&mut response, "Created: {}", report.processed)?;
        writeln!(&mut response, "Fallbacks: {}", report.fallbacks)?;
        writeln!(&mut response, "Unchanged: {}", report.unchanged)?;
        write!(&mut response, "Errors: {}", report.errors)?;
        ctx.say(response).await?;
        Ok(())
    }

    /// Grants or revokes unlimited daily usage for a user (admins only).
    #[poise::command(slash_command, prefix_command)]
    pub async fn premium(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "User to update"] user: poise::serenity_prelude::User,
        #[description = "Grant (true) or revoke (false)"] enabled: bool,
    ) -> Result<()> {
        let data = ctx.data();
        if !data.is_admin(&ctx.author().id.to_string()) {
            ctx.say("❌ Only admins can change premium status.").await?;
            return Ok(());
        }

        preferences::set_premium(&data.database, &user.id.to_string(), enabled).await?;
        let verb = if enabled { "now has" } else { "no longer has" };
        ctx.say(format!("✅ {} {verb} unlimited daily usage.", user.name))
            .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
