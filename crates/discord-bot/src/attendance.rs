//! One attendance cycle, from an open poll to a dispatched report.
//!
//! The cycle task owns the window outright. Clicks reach it over an mpsc
//! channel fed by the event handler, so the duplicate check and the insert
//! for one click always run back to back. Replies to the clickers run on
//! their own tasks and never hold up the next click or the deadline.

use async_trait::async_trait;
use eyre::Result;
use rollcall_core::clock;
use rollcall_core::models::attendance::{AttendanceWindow, Attendee, ClickOutcome};
use rollcall_core::models::roster::Roster;
use rollcall_core::report::Report;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info};

/// Clicks buffered per window before senders wait.
pub const CLICK_QUEUE_CAPACITY: usize = 64;

/// A component interaction on the poll message.
#[derive(Debug)]
pub struct Click<I> {
    pub custom_id: String,
    pub attendee: Attendee,
    /// Platform handle used to answer the clicker.
    pub interaction: I,
}

/// Side effects of a cycle on the chat platform.
#[async_trait]
pub trait PollSurface: Send + Sync {
    type Interaction: Send + 'static;

    /// Answer the clicker, visible to them only.
    async fn respond(&self, interaction: Self::Interaction, outcome: &ClickOutcome) -> Result<()>;

    /// Rewrite the poll message as closed and disable its control for everyone.
    async fn close_poll(&self, date: &str) -> Result<()>;

    /// Send the combined report to the report channel.
    async fn post_report(&self, text: &str) -> Result<()>;

    /// Send the absent list back to the attendance channel.
    async fn post_absent(&self, text: &str) -> Result<()>;
}

/// Per-cycle context: the roster snapshot, the open window and the click
/// queue, created by one scheduled firing and consumed by [`AttendanceCycle::run`].
pub struct AttendanceCycle<S: PollSurface + 'static> {
    surface: Arc<S>,
    roster: Roster,
    window: AttendanceWindow,
    clicks: mpsc::Receiver<Click<S::Interaction>>,
    /// Replies still in flight. The window keeps taking clicks meanwhile.
    replies: JoinSet<Result<()>>,
}

impl<S: PollSurface + 'static> AttendanceCycle<S> {
    pub fn new(
        surface: Arc<S>,
        roster: Roster,
        window: AttendanceWindow,
        clicks: mpsc::Receiver<Click<S::Interaction>>,
    ) -> Self {
        Self {
            surface,
            roster,
            window,
            clicks,
            replies: JoinSet::new(),
        }
    }

    /// Collect clicks until the window's duration elapses, then close the
    /// poll and dispatch the report.
    pub async fn run(mut self) -> Report {
        info!(
            "Attendance window opened at {} for {}s with {} members on the roster",
            clock::format_time(self.window.opened_at()),
            self.window.duration().as_secs(),
            self.roster.len()
        );

        self.collect().await;

        // Anything still queued arrived too late.
        self.clicks.close();
        self.window.close();

        let date = self.window.date();
        info!(
            "Attendance window closed with {} of {} marked",
            self.window.records().len(),
            self.roster.len()
        );

        if let Err(e) = self.surface.close_poll(&date).await {
            error!("Failed to close the attendance poll: {:?}", e);
        }

        let report = Report::build(date, self.window.records(), &self.roster);
        dispatch_report(self.surface.as_ref(), &report).await;

        while let Some(reply) = self.replies.join_next().await {
            log_reply(reply);
        }

        report
    }

    async fn collect(&mut self) {
        let deadline = tokio::time::sleep(self.window.duration());
        tokio::pin!(deadline);

        loop {
            let event = tokio::select! {
                biased;
                _ = &mut deadline => Event::Deadline,
                Some(reply) = self.replies.join_next() => Event::Replied(reply),
                click = self.clicks.recv() => Event::Click(click),
            };

            match event {
                Event::Deadline => break,
                Event::Replied(reply) => log_reply(reply),
                Event::Click(Some(click)) => self.handle_click(click),
                Event::Click(None) => {
                    // Every sender is gone; the window still runs its full length.
                    deadline.as_mut().await;
                    break;
                }
            }
        }
    }

    /// Apply the click to the window, then answer it on a separate task.
    fn handle_click(&mut self, click: Click<S::Interaction>) {
        let user_id = click.attendee.user_id;
        let outcome = self
            .window
            .record(&click.custom_id, click.attendee, &clock::now());

        match &outcome {
            ClickOutcome::Marked(record) => {
                info!("{} ({}) marked present at {}", record.display_name, user_id, record.marked_at);
                if !self.roster.contains(user_id) {
                    debug!("User {} is not on the roster", user_id);
                }
            }
            ClickOutcome::AlreadyMarked => debug!("User {} already marked", user_id),
            ClickOutcome::Ignored => {
                debug!("Ignoring click on {}", click.custom_id);
                return;
            }
            ClickOutcome::Closed => return,
        }

        let surface = self.surface.clone();
        let interaction = click.interaction;
        self.replies
            .spawn(async move { surface.respond(interaction, &outcome).await });
    }
}

enum Event<I> {
    Deadline,
    Replied(Result<Result<()>, JoinError>),
    Click(Option<Click<I>>),
}

fn log_reply(reply: Result<Result<()>, JoinError>) {
    match reply {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!("Failed to respond to attendance click: {:?}", e),
        Err(e) => error!("Attendance reply task failed: {:?}", e),
    }
}

/// Post the combined report and the absent list. The two sends are
/// independent; a failure in one is logged and the other still goes out.
pub async fn dispatch_report<S: PollSurface + ?Sized>(surface: &S, report: &Report) {
    if let Err(e) = surface.post_report(&report.combined_text()).await {
        error!("Failed to post attendance report: {:?}", e);
    }

    if let Err(e) = surface.post_absent(&report.absent_text()).await {
        error!("Failed to post absent list: {:?}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rollcall_core::messages::MARK_PRESENT_ID;
    use rollcall_core::models::roster::Member;
    use rollcall_core::report::NO_ONE_PRESENT;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::{sleep, Instant};

    #[derive(Default)]
    struct Recorder {
        fail_report: bool,
        fail_close: bool,
        reply_delay: Duration,
        responses: Mutex<Vec<(u64, ClickOutcome)>>,
        closed: Mutex<Vec<String>>,
        reports: Mutex<Vec<String>>,
        absents: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PollSurface for Recorder {
        type Interaction = u64;

        async fn respond(&self, interaction: u64, outcome: &ClickOutcome) -> Result<()> {
            sleep(self.reply_delay).await;
            self.responses.lock().unwrap().push((interaction, outcome.clone()));
            Ok(())
        }

        async fn close_poll(&self, date: &str) -> Result<()> {
            if self.fail_close {
                return Err(eyre::eyre!("message deleted"));
            }
            self.closed.lock().unwrap().push(date.to_string());
            Ok(())
        }

        async fn post_report(&self, text: &str) -> Result<()> {
            if self.fail_report {
                return Err(eyre::eyre!("report channel not found"));
            }
            self.reports.lock().unwrap().push(text.to_string());
            Ok(())
        }

        async fn post_absent(&self, text: &str) -> Result<()> {
            self.absents.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn roster() -> Roster {
        Roster::from_guild(["Alice", "Bob", "Carol"].iter().enumerate().map(|(i, name)| Member {
            user_id: i as u64 + 1,
            username: name.to_lowercase(),
            nickname: Some(name.to_string()),
            bot: false,
        }))
    }

    fn click(user_id: u64, name: &str, custom_id: &str) -> Click<u64> {
        Click {
            custom_id: custom_id.to_string(),
            attendee: Attendee {
                user_id,
                display_name: name.to_string(),
            },
            interaction: user_id,
        }
    }

    fn window(minutes: u64) -> AttendanceWindow {
        AttendanceWindow::open(clock::now(), Duration::from_secs(minutes * 60))
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_clicks_warn_and_late_clicks_are_dropped() {
        let surface = Arc::new(Recorder::default());
        let (tx, rx) = mpsc::channel(CLICK_QUEUE_CAPACITY);
        let cycle = AttendanceCycle::new(surface.clone(), roster(), window(10), rx);

        let clicker = async move {
            sleep(Duration::from_secs(2 * 60)).await;
            tx.send(click(1, "Alice", MARK_PRESENT_ID)).await.unwrap();
            sleep(Duration::from_secs(3 * 60)).await;
            tx.send(click(1, "Alice", MARK_PRESENT_ID)).await.unwrap();
            sleep(Duration::from_secs(6 * 60)).await;
            assert!(tx.send(click(2, "Bob", MARK_PRESENT_ID)).await.is_err());
        };

        let (report, ()) = tokio::join!(cycle.run(), clicker);

        let responses = surface.responses.lock().unwrap();
        assert_eq!(responses.len(), 2);
        assert!(matches!(responses[0], (1, ClickOutcome::Marked(_))));
        assert_eq!(responses[1], (1, ClickOutcome::AlreadyMarked));

        let present: Vec<u64> = report.present().iter().map(|r| r.user_id).collect();
        let absent: Vec<u64> = report.absent().iter().map(|m| m.user_id).collect();
        assert_eq!(present, vec![1]);
        assert_eq!(absent, vec![2, 3]);

        assert_eq!(surface.closed.lock().unwrap().len(), 1);
        assert_eq!(*surface.reports.lock().unwrap(), vec![report.combined_text()]);
        assert_eq!(*surface.absents.lock().unwrap(), vec![report.absent_text()]);
    }

    #[tokio::test(start_paused = true)]
    async fn other_controls_get_no_response() {
        let surface = Arc::new(Recorder::default());
        let (tx, rx) = mpsc::channel(CLICK_QUEUE_CAPACITY);
        let cycle = AttendanceCycle::new(surface.clone(), roster(), window(1), rx);

        tx.send(click(1, "Alice", "times_up")).await.unwrap();
        drop(tx);
        let report = cycle.run().await;

        assert!(surface.responses.lock().unwrap().is_empty());
        assert!(report.present().is_empty());
        assert!(report.present_text().ends_with(NO_ONE_PRESENT));
    }

    #[tokio::test(start_paused = true)]
    async fn window_runs_full_length_without_senders() {
        let surface = Arc::new(Recorder::default());
        let (tx, rx) = mpsc::channel::<Click<u64>>(CLICK_QUEUE_CAPACITY);
        drop(tx);

        let started = Instant::now();
        AttendanceCycle::new(surface.clone(), roster(), window(10), rx).run().await;

        assert!(started.elapsed() >= Duration::from_secs(600));
    }

    #[tokio::test(start_paused = true)]
    async fn absent_list_is_sent_when_report_channel_fails() {
        let surface = Arc::new(Recorder {
            fail_report: true,
            fail_close: true,
            ..Recorder::default()
        });
        let (_tx, rx) = mpsc::channel(CLICK_QUEUE_CAPACITY);

        let report = AttendanceCycle::new(surface.clone(), roster(), window(1), rx).run().await;

        assert!(surface.reports.lock().unwrap().is_empty());
        assert_eq!(*surface.absents.lock().unwrap(), vec![report.absent_text()]);
        assert_eq!(report.absent().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn simultaneous_clicks_are_answered_together() {
        let reply_delay = Duration::from_millis(500);
        let surface = Arc::new(Recorder {
            reply_delay,
            ..Recorder::default()
        });
        let (tx, rx) = mpsc::channel(CLICK_QUEUE_CAPACITY);
        for user_id in 1..=10 {
            tx.send(click(user_id, "User", MARK_PRESENT_ID)).await.unwrap();
        }

        let started = Instant::now();
        let cycle = tokio::spawn(AttendanceCycle::new(surface.clone(), roster(), window(1), rx).run());

        sleep(reply_delay + Duration::from_millis(50)).await;
        assert_eq!(surface.responses.lock().unwrap().len(), 10);
        assert!(started.elapsed() < Duration::from_secs(1));

        let report = cycle.await.unwrap();
        assert_eq!(report.present().len(), 10);
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_replies_do_not_delay_the_deadline() {
        let surface = Arc::new(Recorder {
            reply_delay: Duration::from_secs(30),
            ..Recorder::default()
        });
        let (tx, rx) = mpsc::channel(CLICK_QUEUE_CAPACITY);
        for user_id in 1..=5 {
            tx.send(click(user_id, "User", MARK_PRESENT_ID)).await.unwrap();
        }

        let started = Instant::now();
        let cycle = tokio::spawn(AttendanceCycle::new(surface.clone(), roster(), window(1), rx).run());

        sleep(Duration::from_secs(61)).await;
        assert_eq!(surface.closed.lock().unwrap().len(), 1);
        assert!(started.elapsed() < Duration::from_secs(90));

        cycle.await.unwrap();
        assert_eq!(surface.responses.lock().unwrap().len(), 5);
        drop(tx);
    }
}
