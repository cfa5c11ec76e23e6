use thiserror::Error;

/// Errors that abort the forwarding of a single message.
#[derive(Debug, Error)]
pub enum StarboardError {
    /// The partial message could not be materialized (deleted, no access).
    #[error("message fetch failed: {0}")]
    Fetch(String),

    #[error("starboard channel is not configured")]
    ChannelNotConfigured,

    #[error("starboard channel {channel_id} could not be resolved: {reason}")]
    ChannelUnresolved { channel_id: u64, reason: String },

    #[error("starboard channel {channel_id} is not a text channel")]
    NotTextChannel { channel_id: u64 },

    #[error("send failed: {0}")]
    Send(String),
}

pub type Result<T> = std::result::Result<T, StarboardError>;
