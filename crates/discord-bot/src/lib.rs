use eyre::Result;
use serenity::{prelude::GatewayIntents, Client};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

pub mod attendance;
pub mod commands;
pub mod config;
pub mod handlers;
pub mod scheduler;

use commands::meme::HttpMemeSource;

/// Start the Discord bot with the provided configuration.
///
/// Connects to Discord, starts the daily attendance scheduler and runs
/// until the client disconnects or an error occurs.
///
/// # Returns
///
/// * `Ok(())` if the bot shut down gracefully
/// * `Err` if authentication, scheduler setup or the gateway connection failed
pub async fn start_bot(config: config::BotConfig) -> Result<()> {
    info!("Starting Discord bot");

    let active_windows: handlers::ActiveWindows = Arc::new(RwLock::new(HashMap::new()));
    let memes = Arc::new(HttpMemeSource::new(config.meme_api_url.clone()));

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let handler = handlers::Handler::new(config.clone(), active_windows.clone(), memes);
    let mut client = Client::builder(&config.token, intents)
        .event_handler(handler)
        .await?;

    let http = client.cache_and_http.http.clone();
    let _scheduler = scheduler::start_scheduler(config, http, active_windows).await?;

    // Start the client
    info!("Connecting to Discord...");
    client.start().await?;

    Ok(())
}
