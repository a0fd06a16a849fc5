use async_trait::async_trait;
use eyre::Result;
use rollcall_core::errors::{RollcallError, RollcallResult};
use serde::Deserialize;
use serenity::{
    http::Http,
    model::id::{ChannelId, MessageId},
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub const PLACEHOLDER: &str = "Generating meme";
pub const FETCH_FAILED: &str = "❌ Failed to fetch a meme. Try again later!";

/// Delay between placeholder frames.
const FRAME_INTERVAL: Duration = Duration::from_millis(700);

/// The two fields of the provider payload the bot uses.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Meme {
    pub title: String,
    pub url: String,
}

impl Meme {
    pub fn render(&self) -> String {
        format!("**{}**\n{}", self.title, self.url)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MemeSource: Send + Sync {
    async fn fetch(&self) -> RollcallResult<Meme>;
}

/// Fetches memes from a JSON endpoint with a single GET.
pub struct HttpMemeSource {
    client: reqwest::Client,
    url: String,
}

impl HttpMemeSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl MemeSource for HttpMemeSource {
    async fn fetch(&self) -> RollcallResult<Meme> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| RollcallError::MemeFetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RollcallError::MemeFetch(format!(
                "provider answered {}",
                response.status()
            )));
        }

        response
            .json::<Meme>()
            .await
            .map_err(|e| RollcallError::MemeFetch(e.to_string()))
    }
}

/// Text that replaces the placeholder: the meme, or the failure notice.
pub async fn meme_text<M: MemeSource + ?Sized>(source: &M) -> String {
    match source.fetch().await {
        Ok(meme) => meme.render(),
        Err(e) => {
            warn!("{}", e);
            FETCH_FAILED.to_string()
        }
    }
}

/// `Generating meme.`, `..`, `...`, then around again.
pub fn placeholder_frame(frame: usize) -> String {
    format!("{PLACEHOLDER}{}", ".".repeat(frame % 3 + 1))
}

/// Post an animated placeholder, fetch a meme, then swap the placeholder
/// for the result.
pub async fn handle_meme(http: &Arc<Http>, channel_id: ChannelId, source: &dyn MemeSource) -> Result<()> {
    let placeholder = channel_id.say(http, placeholder_frame(0)).await?;

    let animation = animate(http.clone(), channel_id, placeholder.id);
    let text = meme_text(source).await;
    drop(animation);

    channel_id
        .edit_message(http, placeholder.id, |m| m.content(text))
        .await?;
    Ok(())
}

fn animate(http: Arc<Http>, channel_id: ChannelId, message_id: MessageId) -> Ticker {
    Ticker::spawn(async move {
        let mut interval = tokio::time::interval(FRAME_INTERVAL);
        // The first tick completes immediately and frame 0 is already shown.
        interval.tick().await;

        for frame in 1.. {
            interval.tick().await;
            if let Err(e) = channel_id
                .edit_message(&http, message_id, |m| m.content(placeholder_frame(frame)))
                .await
            {
                debug!("Stopping placeholder animation: {:?}", e);
                break;
            }
        }
    })
}

/// A background task that is aborted when the guard is dropped.
struct Ticker(JoinHandle<()>);

impl Ticker {
    fn spawn<F>(task: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self(tokio::spawn(task))
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.0.abort();
    }
}
