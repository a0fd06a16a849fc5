use async_trait::async_trait;
use eyre::Result;
use rollcall_core::{
    clock,
    errors::RollcallError,
    messages::{
        closed_poll_text, marked_reply, poll_text, ALREADY_MARKED, MARKED_ID, MARKED_LABEL,
        MARK_PRESENT_ID, MARK_PRESENT_LABEL, TIMES_UP_ID, TIMES_UP_LABEL,
    },
    models::{
        attendance::{AttendanceWindow, Attendee, ClickOutcome},
        roster::{Member, Roster},
    },
    report::{split_message, MESSAGE_LIMIT},
};
use serenity::{
    http::Http,
    model::{
        application::{
            component::ButtonStyle,
            interaction::{message_component::MessageComponentInteraction, InteractionResponseType},
        },
        channel::Message,
        guild::Member as GuildMember,
        id::{ChannelId, MessageId, UserId},
    },
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::{ActiveWindows, WindowRegistry};
use crate::attendance::{AttendanceCycle, Click, PollSurface, CLICK_QUEUE_CAPACITY};
use crate::config::BotConfig;

/// Largest page the member list endpoint returns.
const MEMBER_PAGE_SIZE: u64 = 1000;

/// Run one full cycle: roster, poll, window, report.
pub async fn run_cycle(http: Arc<Http>, config: &BotConfig, active_windows: &ActiveWindows) -> Result<()> {
    info!("Running daily attendance poll");

    let attendance_channel = ChannelId(config.attendance_channel_id);
    let roster = resolve_roster(&http, attendance_channel).await?;

    let window = AttendanceWindow::open(clock::now(), config.window_duration());
    let poll = publish_poll(&http, attendance_channel, &window.date()).await?;

    let receiver = open_window(active_windows, poll.id).await;

    let surface = Arc::new(DiscordPoll {
        http: http.clone(),
        attendance_channel,
        report_channel: ChannelId(config.report_channel_id),
        poll_message: poll.id,
    });
    let report = AttendanceCycle::new(surface, roster, window, receiver)
        .run()
        .await;

    close_window(active_windows, poll.id).await;

    info!(
        "Attendance for {} done: {} present, {} absent",
        report.date(),
        report.present().len(),
        report.absent().len()
    );

    Ok(())
}

/// Fetch every member of the guild that owns `channel_id` and keep the
/// eligible ones.
pub async fn resolve_roster(http: &Http, channel_id: ChannelId) -> Result<Roster> {
    let channel = channel_id
        .to_channel(http)
        .await
        .map_err(|_| RollcallError::ChannelNotFound(channel_id.0))?;
    let guild_id = channel
        .guild()
        .ok_or(RollcallError::NotAGuildChannel(channel_id.0))?
        .guild_id;

    let mut members = Vec::new();
    let mut after: Option<UserId> = None;
    loop {
        let page = guild_id.members(http, Some(MEMBER_PAGE_SIZE), after).await?;
        let last_page = (page.len() as u64) < MEMBER_PAGE_SIZE;
        after = page.last().map(|member| member.user.id);
        members.extend(page.iter().map(to_member));

        if last_page || after.is_none() {
            break;
        }
    }

    debug!("Fetched {} members of guild {}", members.len(), guild_id);
    Ok(Roster::from_guild(members))
}

/// Send the poll message with its single "mark present" button.
pub async fn publish_poll(http: &Http, channel_id: ChannelId, date: &str) -> Result<Message> {
    let message = channel_id
        .send_message(http, |m| {
            m.content(poll_text(date)).components(|c| {
                c.create_action_row(|row| {
                    row.create_button(|b| {
                        b.custom_id(MARK_PRESENT_ID)
                            .label(MARK_PRESENT_LABEL)
                            .style(ButtonStyle::Primary)
                    })
                })
            })
        })
        .await?;

    info!("Attendance poll posted as message {}", message.id);
    Ok(message)
}

/// Hand a component interaction to the window collecting on its message.
pub async fn route_component(active_windows: &ActiveWindows, component: MessageComponentInteraction) {
    let message_id = component.message.id;
    let display_name = component
        .member
        .as_ref()
        .map(|member| member.display_name().into_owned())
        .unwrap_or_else(|| component.user.name.clone());
    let click = Click {
        custom_id: component.data.custom_id.clone(),
        attendee: Attendee {
            user_id: component.user.id.0,
            display_name,
        },
        interaction: component,
    };

    if !forward_click(active_windows, message_id, click).await {
        debug!("No open window for message {}", message_id);
    }
}

/// Register a click queue for the poll `message_id`.
pub async fn open_window<I>(windows: &WindowRegistry<I>, message_id: MessageId) -> mpsc::Receiver<Click<I>> {
    let (sender, receiver) = mpsc::channel(CLICK_QUEUE_CAPACITY);
    windows.write().await.insert(message_id, sender);
    receiver
}

pub async fn close_window<I>(windows: &WindowRegistry<I>, message_id: MessageId) {
    windows.write().await.remove(&message_id);
}

/// Queue `click` on the window collecting on `message_id`. Returns `false`
/// when no window is registered or it has stopped taking clicks.
pub async fn forward_click<I>(windows: &WindowRegistry<I>, message_id: MessageId, click: Click<I>) -> bool {
    let sender = windows.read().await.get(&message_id).cloned();

    match sender {
        Some(sender) => sender.send(click).await.is_ok(),
        None => false,
    }
}

fn to_member(member: &GuildMember) -> Member {
    Member {
        user_id: member.user.id.0,
        username: member.user.name.clone(),
        nickname: member.nick.clone(),
        bot: member.user.bot,
    }
}

/// The poll message and the two channels of one cycle.
pub struct DiscordPoll {
    http: Arc<Http>,
    attendance_channel: ChannelId,
    report_channel: ChannelId,
    poll_message: MessageId,
}

#[async_trait]
impl PollSurface for DiscordPoll {
    type Interaction = MessageComponentInteraction;

    async fn respond(&self, interaction: MessageComponentInteraction, outcome: &ClickOutcome) -> Result<()> {
        match outcome {
            ClickOutcome::Marked(record) => {
                interaction
                    .create_interaction_response(&self.http, |r| {
                        r.kind(InteractionResponseType::ChannelMessageWithSource)
                            .interaction_response_data(|m| {
                                m.content(marked_reply(&record.marked_at))
                                    .ephemeral(true)
                                    .components(|c| {
                                        c.create_action_row(|row| {
                                            row.create_button(|b| {
                                                b.custom_id(MARKED_ID)
                                                    .label(MARKED_LABEL)
                                                    .style(ButtonStyle::Secondary)
                                                    .disabled(true)
                                            })
                                        })
                                    })
                            })
                    })
                    .await?;
            }
            ClickOutcome::AlreadyMarked => {
                interaction
                    .create_interaction_response(&self.http, |r| {
                        r.kind(InteractionResponseType::ChannelMessageWithSource)
                            .interaction_response_data(|m| m.content(ALREADY_MARKED).ephemeral(true))
                    })
                    .await?;
            }
            ClickOutcome::Ignored | ClickOutcome::Closed => {}
        }

        Ok(())
    }

    async fn close_poll(&self, date: &str) -> Result<()> {
        self.attendance_channel
            .edit_message(&self.http, self.poll_message, |m| {
                m.content(closed_poll_text(date)).components(|c| {
                    c.create_action_row(|row| {
                        row.create_button(|b| {
                            b.custom_id(TIMES_UP_ID)
                                .label(TIMES_UP_LABEL)
                                .style(ButtonStyle::Secondary)
                                .disabled(true)
                        })
                    })
                })
            })
            .await?;
        Ok(())
    }

    async fn post_report(&self, text: &str) -> Result<()> {
        self.report_channel
            .to_channel(&*self.http)
            .await
            .map_err(|_| RollcallError::ChannelNotFound(self.report_channel.0))?;
        send_chunked(&self.http, self.report_channel, text).await
    }

    async fn post_absent(&self, text: &str) -> Result<()> {
        send_chunked(&self.http, self.attendance_channel, text).await
    }
}

async fn send_chunked(http: &Http, channel_id: ChannelId, text: &str) -> Result<()> {
    for chunk in split_message(text, MESSAGE_LIMIT) {
        channel_id.say(http, chunk).await?;
    }
    Ok(())
}
