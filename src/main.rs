use dotenvy::dotenv;
use std::{env, sync::Arc};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use wardrobe_buddy::{
    bot::{self, BotData},
    config::{admins, database, settings},
    core::{assistant::Assistant, daily, quota, trend},
    errors::{Error, Result},
};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also be set externally
    dotenv().ok();

    // 3. Load config.toml
    let settings = settings::load_default_settings()
        .inspect_err(|e| error!("Failed to load settings: {}", e))?;

    // 4. Initialize database
    if env::var("DATABASE_URL").is_err() {
        std::fs::create_dir_all("data")?;
    }
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    let seeded = trend::seed_trends(&db, &settings.trends).await?;
    if seeded > 0 {
        info!(seeded, "Seeded fashion trends");
    }

    let assistant = Assistant::from_settings(&settings)?;

    // `daily` runs the suggestion batch once and exits, for cron
    if env::args().nth(1).as_deref() == Some("daily") {
        let report = daily::run_daily_suggestions(&db, &assistant, quota::local_today()).await?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    // 5. Run the bot
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {}", e))
        .map_err(Error::EnvVar)?;

    let data = BotData::new(db, Arc::new(assistant), admins::get_admin_ids());
    bot::run_bot(token, data).await.map_err(Error::from)?;

    Ok(())
}
