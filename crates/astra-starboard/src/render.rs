//! Starboard post composition. Pure: no I/O happens here.

use chrono::{DateTime, Utc};

use crate::color::HexColor;
use crate::types::SourceMessage;

/// Embed description limit on Discord.
pub const EXCERPT_MAX_CHARS: usize = 4096;

/// Star gold, used when no avatar color could be derived.
pub const FALLBACK_COLOR: HexColor = HexColor::from_rgb(0xff, 0xac, 0x33);

pub const JUMP_LABEL: &str = "Jump to message";

/// Everything sent to the starboard channel for one source message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarboardPost {
    /// Plain-text line above the embed naming the origin channel.
    pub content: String,
    pub embed: StarEmbed,
    /// The single link button attached to the post.
    pub jump: LinkButton,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarEmbed {
    pub author_name: String,
    pub author_icon: Option<String>,
    /// `None` when the source message has no text.
    pub description: Option<String>,
    pub image: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub footer: String,
    pub color: HexColor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkButton {
    pub label: String,
    pub url: String,
}

/// Cut `text` to at most [`EXCERPT_MAX_CHARS`] characters.
pub fn truncate_excerpt(text: &str) -> &str {
    match text.char_indices().nth(EXCERPT_MAX_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Compose the starboard post for `message` at `stars` stars.
///
/// The first attachment becomes the embed image whatever its media kind.
pub fn render_post(
    message: &SourceMessage,
    stars: u64,
    emoji: &str,
    color: Option<HexColor>,
) -> StarboardPost {
    let description = if message.content.is_empty() {
        None
    } else {
        Some(truncate_excerpt(&message.content).to_string())
    };

    let embed = StarEmbed {
        author_name: message.author.display_name.clone(),
        author_icon: message.author.avatar_url.clone(),
        description,
        image: message.attachments.first().map(|a| a.url.clone()),
        timestamp: message.created_at,
        footer: format!("{} {} | #{}", emoji, stars, message.channel_name),
        color: color.unwrap_or(FALLBACK_COLOR),
    };

    StarboardPost {
        content: format!("{} **{}** | <#{}>", emoji, stars, message.channel_id),
        embed,
        jump: LinkButton {
            label: JUMP_LABEL.to_string(),
            url: message.permalink(),
        },
    }
}
