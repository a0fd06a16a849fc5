use eyre::Result;
use serenity::model::channel::Message;

use crate::handlers::HandlerContext;

pub mod meme;

/// What a recognized text command does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Reply with fixed text.
    Reply(&'static str),
    /// Fetch and post a meme.
    Meme,
}

const HELLO: &str = "👋 Hello! I take the daily attendance in this server.";

const HELP: &str = "📖 **Commands**\n\
    `/hello` - say hi\n\
    `/about` - what this bot does\n\
    `/rules` - how attendance works\n\
    `/meme` - a random meme";

const ABOUT: &str = "🤖 I post the daily attendance poll, collect clicks while it is open \
    and share the present and absent lists once it closes.";

const RULES: &str = "📌 **Attendance Rules**\n\
    1. Click **✅ Mark Present** on the daily poll before it closes.\n\
    2. Only your first click counts.\n\
    3. Anyone who has not marked by closing time is listed as absent.";

/// Command names (without prefix) and their canned replies.
const CANNED: [(&str, &str); 4] = [
    ("hello", HELLO),
    ("help", HELP),
    ("about", ABOUT),
    ("rules", RULES),
];

/// Match a whole message against the command table.
///
/// The message must start with `prefix`; the rest is compared
/// case-insensitively against the known command names.
pub fn parse(content: &str, prefix: &str) -> Option<Command> {
    let name = content.strip_prefix(prefix)?.to_lowercase();

    if name == "meme" {
        return Some(Command::Meme);
    }

    CANNED
        .iter()
        .find(|(command, _)| *command == name)
        .map(|(_, reply)| Command::Reply(*reply))
}

/// Answer a text message if it is a known command.
pub async fn handle_message(ctx: &HandlerContext, msg: &Message) -> Result<()> {
    match parse(&msg.content, ctx.config.command_prefix()) {
        Some(Command::Reply(text)) => {
            msg.reply(&ctx.ctx, text).await?;
        }
        Some(Command::Meme) => {
            meme::handle_meme(&ctx.ctx.http, msg.channel_id, ctx.memes.as_ref()).await?;
        }
        None => {}
    }

    Ok(())
}
