use serenity::{
    async_trait,
    model::{
        application::interaction::{
            message_component::MessageComponentInteraction, Interaction,
        },
        channel::Message,
        gateway::Ready,
        id::MessageId,
    },
    prelude::*,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::{error, info};

use crate::attendance::Click;
use crate::commands::{self, meme::MemeSource};
use crate::config::BotConfig;

pub mod attendance;

/// Click queues of the windows currently open, keyed by poll message.
pub type WindowRegistry<I> = Arc<RwLock<HashMap<MessageId, mpsc::Sender<Click<I>>>>>;

pub type ActiveWindows = WindowRegistry<MessageComponentInteraction>;

/// Main Discord handler that processes all events.
///
/// Component interactions are routed to the open attendance window, if any;
/// text messages go to the command responder.
pub struct Handler {
    config: BotConfig,
    active_windows: ActiveWindows,
    memes: Arc<dyn MemeSource>,
}

impl Handler {
    /// Create a new handler
    pub fn new(config: BotConfig, active_windows: ActiveWindows, memes: Arc<dyn MemeSource>) -> Self {
        Self {
            config,
            active_windows,
            memes,
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    /// Handle ready events (when bot connects to Discord)
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);
        info!("Waiting for the scheduled attendance poll");
    }

    /// Handle interactions (buttons on the poll message)
    async fn interaction_create(&self, _ctx: Context, interaction: Interaction) {
        if let Interaction::MessageComponent(component) = interaction {
            attendance::route_component(&self.active_windows, component).await;
        }
    }

    /// Handle plain text commands
    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        let handler_ctx = HandlerContext {
            ctx,
            config: self.config.clone(),
            memes: self.memes.clone(),
        };

        if let Err(e) = commands::handle_message(&handler_ctx, &msg).await {
            error!("Error handling command {:?}: {:?}", msg.content, e);
        }
    }
}

/// Shared context for command handlers.
///
/// Bundles the Discord context with the bot configuration and the meme
/// source so command handlers take a single argument.
pub struct HandlerContext {
    pub ctx: Context,
    pub config: BotConfig,
    pub memes: Arc<dyn MemeSource>,
}
