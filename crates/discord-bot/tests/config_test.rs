use rollcall_discord_bot::config::{BotConfig, DEFAULT_COLLECTOR_TIME_MS, DEFAULT_CRON};
use rstest::rstest;
use std::time::Duration;

fn config() -> BotConfig {
    BotConfig {
        token: "test_token".to_string(),
        attendance_channel_id: 111,
        report_channel_id: 222,
        attendance_cron: DEFAULT_CRON.to_string(),
        collector_time_ms: DEFAULT_COLLECTOR_TIME_MS,
        command_prefix: None,
        meme_api_url: "http://localhost/gimme".to_string(),
    }
}

#[test]
fn test_command_prefix_default() {
    assert_eq!(config().command_prefix(), "/");
}

#[test]
fn test_command_prefix_custom() {
    let config = BotConfig {
        command_prefix: Some("!".to_string()),
        ..config()
    };

    assert_eq!(config.command_prefix(), "!");
}

#[test]
fn test_default_window_is_ten_minutes() {
    assert_eq!(config().window_duration(), Duration::from_secs(600));
}

#[rstest]
#[case("10 11 * * *", "0 10 11 * * *")]
#[case("  30 9 * * 1-5 ", "0 30 9 * * 1-5")]
#[case("15 10 11 * * *", "15 10 11 * * *")]
fn test_cron_schedule_is_seconds_first(#[case] expression: &str, #[case] expected: &str) {
    let config = BotConfig {
        attendance_cron: expression.to_string(),
        ..config()
    };

    assert_eq!(config.cron_schedule(), expected);
}
