//! Message model consumed by the starboard.
//!
//! Platform events arrive as thin references ([`MessageRef`]) that must be
//! resolved into a [`SourceMessage`] before any content is read.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::platform::StarboardPlatform;

/// Attachment classification by MIME type, falling back to the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    Other,
}

impl MediaKind {
    pub fn infer(content_type: Option<&str>, filename: &str) -> Self {
        let ct = content_type.unwrap_or("");
        if ct.starts_with("image/") {
            return MediaKind::Image;
        }
        if ct.starts_with("video/") {
            return MediaKind::Video;
        }
        if ct.starts_with("audio/") {
            return MediaKind::Audio;
        }

        let lower = filename.to_lowercase();
        match lower.rsplit('.').next() {
            Some("png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp") => MediaKind::Image,
            Some("mp4" | "webm" | "mov" | "mkv") => MediaKind::Video,
            Some("mp3" | "ogg" | "wav" | "flac" | "m4a") => MediaKind::Audio,
            _ => MediaKind::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub url: String,
    pub kind: MediaKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: u64,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub bot: bool,
}

/// Aggregate count for one emoji on a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionCount {
    pub emoji: String,
    pub count: u64,
}

/// A fully materialized message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMessage {
    pub id: u64,
    pub channel_id: u64,
    pub channel_name: String,
    /// `None` for direct messages.
    pub guild_id: Option<u64>,
    pub author: Author,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub attachments: Vec<Attachment>,
    pub reactions: Vec<ReactionCount>,
}

impl SourceMessage {
    /// Cached aggregate for `emoji`, if the platform reported one.
    pub fn reaction_count(&self, emoji: &str) -> Option<u64> {
        self.reactions
            .iter()
            .find(|r| r.emoji == emoji)
            .map(|r| r.count)
    }

    /// Canonical link that opens this message in the client.
    pub fn permalink(&self) -> String {
        let guild = match self.guild_id {
            Some(gid) => gid.to_string(),
            None => "@me".to_string(),
        };
        format!(
            "https://discord.com/channels/{}/{}/{}",
            guild, self.channel_id, self.id
        )
    }
}

/// Partial message payload: identity only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef {
    pub channel_id: u64,
    pub message_id: u64,
    pub guild_id: Option<u64>,
}

impl MessageRef {
    /// Materialize the referenced message. Fails when the message was deleted
    /// or the bot may not read it.
    pub async fn resolve<P>(&self, platform: &P) -> Result<SourceMessage>
    where
        P: StarboardPlatform + ?Sized,
    {
        platform.fetch_message(self).await
    }
}

/// A reaction-count change observed on some message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionEvent {
    pub message: MessageRef,
    /// Unicode emoji, or the name of a custom emoji.
    pub emoji: String,
    pub actor_id: u64,
    pub actor_is_bot: bool,
    /// Count carried by the event itself, when the platform provides one.
    pub reported_count: Option<u64>,
}
