use anyhow::{Context, Result};
use std::sync::Arc;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::prelude::*;
use tracing::{info, warn};

use coin_bot::bot;
use coin_bot::config::BotConfig;
use coin_bot::db;
use coin_bot::dialogue::AdminDialogueState;
use coin_bot::localization::init_localization;
use coin_bot::logging;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging
    logging::init();

    info!("Starting Coin Telegram Bot");

    let config = Arc::new(BotConfig::from_env().context("Invalid configuration")?);
    if config.owner_id == 0 {
        warn!("OWNER_ID is not set, the admin panel is disabled");
    }

    init_localization()?;

    // Create the connection pool and make sure the schema exists
    let pool = Arc::new(db::connect_with_retry(&config.db).await?);
    db::init_database_schema(&pool).await?;

    // Initialize the bot
    let bot = Bot::new(config.bot_token.clone());
    let me = bot.get_me().await.context("Failed to fetch bot identity")?;
    info!(username = %me.username(), "Bot initialized");

    bot.delete_webhook()
        .drop_pending_updates(true)
        .await
        .context("Failed to delete webhook")?;

    let mut dispatcher = Dispatcher::builder(bot, bot::schema())
        .dependencies(dptree::deps![
            me,
            pool,
            config,
            InMemStorage::<AdminDialogueState>::new()
        ])
        .enable_ctrlc_handler()
        .build();

    let shutdown = dispatcher.shutdown_token();
    tokio::spawn(async move {
        wait_for_terminate().await;
        info!("Termination signal received, stopping dispatcher");
        match shutdown.shutdown() {
            Ok(done) => done.await,
            Err(e) => warn!(error = ?e, "Dispatcher was not running"),
        }
    });

    info!("Starting dispatcher");
    dispatcher.dispatch().await;

    info!("Dispatcher stopped");
    Ok(())
}

#[cfg(unix)]
async fn wait_for_terminate() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            warn!(error = %e, "Failed to install SIGTERM handler");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_terminate() {
    std::future::pending::<()>().await;
}
