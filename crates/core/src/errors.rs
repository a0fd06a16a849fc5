use thiserror::Error;

#[derive(Error, Debug)]
pub enum RollcallError {
    #[error("Channel not found: {0}")]
    ChannelNotFound(u64),

    #[error("Channel {0} does not belong to a guild")]
    NotAGuildChannel(u64),

    #[error("Meme fetch failed: {0}")]
    MemeFetch(String),

    #[error("Internal error: {0}")]
    Internal(#[from] eyre::Report),
}

pub type RollcallResult<T> = Result<T, RollcallError>;
