use eyre::{eyre, Result};
use serde::Deserialize;
use std::env;
use std::time::Duration;

/// Cron expression used when `ATTENDANCE_CRON` is unset: 11:10 every day.
pub const DEFAULT_CRON: &str = "10 11 * * *";
/// Window length used when `COLLECTOR_TIME` is unset or unparsable.
pub const DEFAULT_COLLECTOR_TIME_MS: u64 = 600_000;
pub const DEFAULT_MEME_API_URL: &str = "https://meme-api.com/gimme";

/// Configuration for the Discord bot.
///
/// Everything the attendance cycle and the text commands need is read once
/// at startup from the environment.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Discord bot token (required)
    pub token: String,
    /// Channel the daily poll is posted to (required)
    pub attendance_channel_id: u64,
    /// Channel that receives the combined report (required)
    pub report_channel_id: u64,
    /// Cron expression, five or six fields
    pub attendance_cron: String,
    /// Collection window length in milliseconds
    pub collector_time_ms: u64,
    /// Prefix for text commands (defaults to "/")
    pub command_prefix: Option<String>,
    /// Endpoint returning `{ "title": .., "url": .. }`
    pub meme_api_url: String,
}

impl BotConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let token = env::var("DISCORD_TOKEN")
            .map_err(|_| eyre!("DISCORD_TOKEN environment variable not set"))?;

        let attendance_channel_id = channel_id("ATTENDANCE_CHANNEL_ID")?;
        let report_channel_id = channel_id("REPORT_CHANNEL_ID")?;

        let attendance_cron =
            env::var("ATTENDANCE_CRON").unwrap_or_else(|_| DEFAULT_CRON.to_string());

        let collector_time_ms = env::var("COLLECTOR_TIME")
            .ok()
            .and_then(|ms| ms.trim().parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .unwrap_or(DEFAULT_COLLECTOR_TIME_MS);

        let command_prefix = env::var("DISCORD_COMMAND_PREFIX").ok();

        let meme_api_url =
            env::var("MEME_API_URL").unwrap_or_else(|_| DEFAULT_MEME_API_URL.to_string());

        Ok(Self {
            token,
            attendance_channel_id,
            report_channel_id,
            attendance_cron,
            collector_time_ms,
            command_prefix,
            meme_api_url,
        })
    }

    /// Get the command prefix (defaults to "/" if not set)
    pub fn command_prefix(&self) -> &str {
        self.command_prefix.as_deref().unwrap_or("/")
    }

    pub fn window_duration(&self) -> Duration {
        Duration::from_millis(self.collector_time_ms)
    }

    /// The cron expression in the scheduler's seconds-first form.
    pub fn cron_schedule(&self) -> String {
        let expression = self.attendance_cron.trim();
        if expression.split_whitespace().count() == 5 {
            format!("0 {expression}")
        } else {
            expression.to_string()
        }
    }
}

fn channel_id(name: &str) -> Result<u64> {
    env::var(name)
        .map_err(|_| eyre!("{name} environment variable not set"))?
        .trim()
        .parse::<u64>()
        .map_err(|_| eyre!("{name} must be a valid u64"))
}
