use async_trait::async_trait;

use crate::error::Result;
use crate::render::StarboardPost;
use crate::types::{MessageRef, SourceMessage};

/// A resolved destination channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelInfo {
    pub id: u64,
    /// Whether the channel accepts regular messages.
    pub text_capable: bool,
}

/// Platform capabilities the starboard needs. Implemented over serenity in
/// `astra-discord`; tests use an in-memory fake.
#[async_trait]
pub trait StarboardPlatform: Send + Sync {
    /// Fetch the full message behind a partial reference.
    async fn fetch_message(&self, message: &MessageRef) -> Result<SourceMessage>;

    async fn resolve_channel(&self, channel_id: u64) -> Result<ChannelInfo>;

    /// Post `post` into `channel_id` and return the new message id.
    async fn send_post(&self, channel_id: u64, post: &StarboardPost) -> Result<u64>;
}
