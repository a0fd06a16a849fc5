use eyre::Result;
use rollcall_core::clock;
use serenity::http::Http;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::config::BotConfig;
use crate::handlers::{attendance::run_cycle, ActiveWindows};

/// Start the daily attendance job.
///
/// Each firing runs one full cycle on its own task. The returned scheduler
/// keeps running in the background once started.
pub async fn start_scheduler(
    config: BotConfig,
    http: Arc<Http>,
    active_windows: ActiveWindows,
) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;
    let schedule = config.cron_schedule();

    info!("Attendance cron: {} ({})", schedule, clock::TIMEZONE);
    info!(
        "Poll open duration: {} minutes",
        config.window_duration().as_secs() / 60
    );

    let job = Job::new_async_tz(schedule.as_str(), clock::TIMEZONE, move |_uuid, _lock| {
        let config = config.clone();
        let http = http.clone();
        let active_windows = active_windows.clone();

        Box::pin(async move {
            if let Err(e) = run_cycle(http, &config, &active_windows).await {
                error!("Daily attendance cycle failed: {:?}", e);
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    info!("Attendance scheduler started");
    Ok(scheduler)
}
