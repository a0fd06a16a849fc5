use color_eyre::eyre::Result;
use dotenv::dotenv;
use rollcall_discord_bot::config::BotConfig;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Initialize logging, RUST_LOG overrides the default level
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Rollcall attendance bot");

    // Load configuration
    let config = BotConfig::from_env()?;
    info!(
        "Attendance channel {}, report channel {}",
        config.attendance_channel_id, config.report_channel_id
    );

    // Start the Discord bot
    match rollcall_discord_bot::start_bot(config).await {
        Ok(_) => info!("Discord bot shut down gracefully"),
        Err(e) => {
            error!("Discord bot error: {}", e);
            return Err(e);
        }
    }

    Ok(())
}
