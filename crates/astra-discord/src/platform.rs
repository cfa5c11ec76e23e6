//! Serenity-backed [`StarboardPlatform`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serenity::builder::{
    CreateActionRow, CreateButton, CreateEmbed, CreateEmbedAuthor, CreateEmbedFooter,
    CreateMessage,
};
use serenity::model::channel::{Channel, ChannelType, Message, ReactionType};
use serenity::model::id::{ChannelId, MessageId};
use serenity::model::user::User;
use serenity::model::Timestamp;
use serenity::prelude::Context;
use tracing::debug;

use astra_starboard::{
    Attachment, Author, ChannelInfo, MediaKind, MessageRef, ReactionCount, SourceMessage,
    StarboardError, StarboardPlatform, StarboardPost,
};

/// Key a reaction is compared by: the unicode emoji itself, or a custom
/// emoji's name (its id when the name is missing).
pub fn emoji_key(reaction: &ReactionType) -> String {
    match reaction {
        ReactionType::Unicode(s) => s.clone(),
        ReactionType::Custom { id, name, .. } => name.clone().unwrap_or_else(|| id.to_string()),
        _ => String::new(),
    }
}

/// Guild channels that can carry a normal message.
pub fn is_text_kind(kind: ChannelType) -> bool {
    matches!(
        kind,
        ChannelType::Text
            | ChannelType::News
            | ChannelType::PublicThread
            | ChannelType::PrivateThread
            | ChannelType::NewsThread
    )
}

/// Users without a custom avatar get Discord's default avatar URL, so the
/// embed always has an author icon to show and sample.
pub fn author(user: &User, display_name: String) -> Author {
    Author {
        id: user.id.get(),
        display_name,
        avatar_url: Some(user.face()),
        bot: user.bot,
    }
}

/// Serenity ids panic on zero.
fn channel_id(id: u64) -> Option<ChannelId> {
    (id != 0).then(|| ChannelId::new(id))
}

pub struct SerenityPlatform {
    ctx: Context,
}

impl SerenityPlatform {
    pub fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    async fn channel_name(&self, id: ChannelId) -> String {
        match id.to_channel(&self.ctx).await {
            Ok(Channel::Guild(ch)) => ch.name,
            Ok(_) => id.to_string(),
            Err(e) => {
                debug!(channel_id = %id, error = %e, "channel name lookup failed");
                id.to_string()
            }
        }
    }

    /// Convert a fetched message. REST fetches omit the guild id, so the one
    /// from the event is used when missing.
    async fn source_message(&self, mut msg: Message, fallback_guild: Option<u64>) -> SourceMessage {
        if msg.guild_id.is_none() {
            msg.guild_id = fallback_guild.filter(|g| *g != 0).map(Into::into);
        }
        let display_name = msg
            .author_nick(&self.ctx)
            .await
            .or_else(|| msg.author.global_name.clone())
            .unwrap_or_else(|| msg.author.name.clone());
        let channel_name = self.channel_name(msg.channel_id).await;

        SourceMessage {
            id: msg.id.get(),
            channel_id: msg.channel_id.get(),
            channel_name,
            guild_id: msg.guild_id.map(|g| g.get()),
            author: author(&msg.author, display_name),
            content: msg.content.clone(),
            created_at: DateTime::from_timestamp(msg.timestamp.unix_timestamp(), 0)
                .unwrap_or_else(Utc::now),
            attachments: msg
                .attachments
                .iter()
                .map(|a| Attachment {
                    url: a.url.clone(),
                    kind: MediaKind::infer(a.content_type.as_deref(), &a.filename),
                })
                .collect(),
            reactions: msg
                .reactions
                .iter()
                .map(|r| ReactionCount {
                    emoji: emoji_key(&r.reaction_type),
                    count: r.count,
                })
                .collect(),
        }
    }
}

#[async_trait]
impl StarboardPlatform for SerenityPlatform {
    async fn fetch_message(&self, reference: &MessageRef) -> astra_starboard::Result<SourceMessage> {
        let channel = channel_id(reference.channel_id)
            .filter(|_| reference.message_id != 0)
            .ok_or_else(|| StarboardError::Fetch("zero id in message reference".to_string()))?;
        let msg = channel
            .message(&self.ctx, MessageId::new(reference.message_id))
            .await
            .map_err(|e| StarboardError::Fetch(e.to_string()))?;
        Ok(self.source_message(msg, reference.guild_id).await)
    }

    async fn resolve_channel(&self, id: u64) -> astra_starboard::Result<ChannelInfo> {
        let channel = channel_id(id).ok_or_else(|| StarboardError::ChannelUnresolved {
            channel_id: id,
            reason: "zero id".to_string(),
        })?;
        let text_capable = match channel.to_channel(&self.ctx).await {
            Ok(Channel::Guild(ch)) => is_text_kind(ch.kind),
            Ok(Channel::Private(_)) => true,
            Ok(_) => false,
            Err(e) => {
                return Err(StarboardError::ChannelUnresolved {
                    channel_id: id,
                    reason: e.to_string(),
                })
            }
        };
        Ok(ChannelInfo { id, text_capable })
    }

    async fn send_post(&self, channel: u64, post: &StarboardPost) -> astra_starboard::Result<u64> {
        let target = channel_id(channel).ok_or(StarboardError::ChannelNotConfigured)?;
        let sent = target
            .send_message(&self.ctx.http, create_message(post))
            .await
            .map_err(|e| StarboardError::Send(e.to_string()))?;
        Ok(sent.id.get())
    }
}

/// Translate a rendered post into serenity builders.
pub fn create_message(post: &StarboardPost) -> CreateMessage {
    let mut author = CreateEmbedAuthor::new(&post.embed.author_name);
    if let Some(icon) = &post.embed.author_icon {
        author = author.icon_url(icon);
    }

    let mut embed = CreateEmbed::new()
        .author(author)
        .footer(CreateEmbedFooter::new(&post.embed.footer))
        .colour(post.embed.color.value());
    if let Some(description) = &post.embed.description {
        embed = embed.description(description);
    }
    if let Some(image) = &post.embed.image {
        embed = embed.image(image);
    }
    if let Ok(ts) = Timestamp::from_unix_timestamp(post.embed.timestamp.timestamp()) {
        embed = embed.timestamp(ts);
    }

    let jump = CreateButton::new_link(&post.jump.url).label(&post.jump.label);

    CreateMessage::new()
        .content(&post.content)
        .embed(embed)
        .components(vec![CreateActionRow::Buttons(vec![jump])])
}
