//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for the WardrobeBuddy application,
//! including all slash commands, autocomplete handlers, and bot context management.

/// Discord command implementations (wardrobe, style, general)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{core::assistant::Assistant, errors::Error};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::{error, info};

/// Shared data available to all bot commands.
/// This structure holds the database connection, the styling assistant and the
/// list of users allowed to run admin commands.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// LLM, weather provider and limits
    pub assistant: Arc<Assistant>,
    /// Discord user ids allowed to trigger the daily run
    pub admins: Vec<String>,
}

impl BotData {
    /// Creates a new `BotData` instance.
    #[must_use]
    pub const fn new(database: DatabaseConnection, assistant: Arc<Assistant>, admins: Vec<String>) -> Self {
        Self {
            database,
            assistant,
            admins,
        }
    }

    /// Whether the given Discord user may run admin commands
    #[must_use]
    pub fn is_admin(&self, user_id: &str) -> bool {
        self.admins.iter().any(|id| id == user_id)
    }
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!(command = %ctx.command().name, error = %error, "Command failed");
            let message = match &error {
                Error::Validation { message } => format!("❌ {message}"),
                Error::NotFound { entity, .. } => format!("❌ That {entity} doesn't exist."),
                _ => "❌ Something went wrong, please try again later.".to_string(),
            };
            if let Err(e) = ctx.say(message).await {
                error!("Failed to send error message: {}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Builds the poise framework, registers commands globally and runs until shutdown.
pub async fn run_bot(token: String, data: BotData) -> Result<(), serenity::Error> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Registered commands globally");
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::Client::builder(&token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {:?}", e))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {:?}", e))
}

pub use commands::*;
pub use handlers::*;
