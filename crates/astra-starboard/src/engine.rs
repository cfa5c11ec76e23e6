use std::sync::Arc;

use tracing::{debug, error, info, warn};

use astra_core::config::{StarboardConfig, DEFAULT_STAR_EMOJI, DEFAULT_STAR_THRESHOLD};

use crate::color::ColorSource;
use crate::error::{Result, StarboardError};
use crate::ledger::ForwardLedger;
use crate::platform::StarboardPlatform;
use crate::render::render_post;
use crate::types::{ReactionEvent, SourceMessage};

/// Validated starboard settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarboardSettings {
    /// Destination channel; `None` disables forwarding.
    pub channel_id: Option<u64>,
    pub threshold: u64,
    pub emoji: String,
}

impl StarboardSettings {
    /// Validate raw config. Call once at startup: every problem is logged here
    /// and replaced by a safe value, never reported again per event.
    pub fn from_config(config: &StarboardConfig) -> Self {
        let configured = config
            .threshold
            .as_i64()
            .and_then(|t| u64::try_from(t).ok());
        let threshold = match configured {
            Some(t) if t > 0 => t,
            _ => {
                warn!(
                    configured = %config.threshold,
                    fallback = DEFAULT_STAR_THRESHOLD,
                    "invalid starboard threshold, using default"
                );
                DEFAULT_STAR_THRESHOLD as u64
            }
        };

        let channel_id = match config.channel_id {
            Some(0) => {
                error!("starboard channel id 0 is invalid; starboard disabled");
                None
            }
            Some(id) => Some(id),
            None => {
                error!("starboard channel id not configured; starboard disabled");
                None
            }
        };

        let emoji = config.emoji.trim();
        let emoji = if emoji.is_empty() {
            warn!("empty starboard emoji, using default");
            DEFAULT_STAR_EMOJI.to_string()
        } else {
            emoji.to_string()
        };

        Self {
            channel_id,
            threshold,
            emoji,
        }
    }
}

/// What happened to one reaction event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionOutcome {
    /// The reacting user is a bot.
    IgnoredBot,
    /// Not the star emoji.
    IgnoredEmoji,
    /// Reaction inside the starboard channel itself.
    IgnoredStarboardChannel,
    /// The partial message could not be fetched.
    Unresolved,
    BelowThreshold { count: u64 },
    /// Forwarded earlier, or another event is forwarding it right now.
    AlreadyForwarded,
    Forwarded { forwarded_id: u64 },
    /// Qualified, but rendering or sending failed. Nothing was recorded.
    Aborted,
}

/// Reaction aggregator plus forwarding pipeline.
pub struct Starboard {
    platform: Arc<dyn StarboardPlatform>,
    colors: Arc<dyn ColorSource>,
    ledger: Arc<ForwardLedger>,
    settings: StarboardSettings,
}

impl Starboard {
    pub fn new(
        platform: Arc<dyn StarboardPlatform>,
        colors: Arc<dyn ColorSource>,
        ledger: Arc<ForwardLedger>,
        settings: StarboardSettings,
    ) -> Self {
        Self {
            platform,
            colors,
            ledger,
            settings,
        }
    }

    pub fn settings(&self) -> &StarboardSettings {
        &self.settings
    }

    pub fn ledger(&self) -> &Arc<ForwardLedger> {
        &self.ledger
    }

    /// Process one reaction-count change. Never fails; every error is logged
    /// and reported through the outcome.
    pub async fn handle_reaction(&self, event: &ReactionEvent) -> ReactionOutcome {
        let message_id = event.message.message_id;

        if event.actor_is_bot {
            debug!(message_id, actor = event.actor_id, "reaction by bot ignored");
            return ReactionOutcome::IgnoredBot;
        }
        if event.emoji != self.settings.emoji {
            return ReactionOutcome::IgnoredEmoji;
        }
        if self.settings.channel_id == Some(event.message.channel_id) {
            return ReactionOutcome::IgnoredStarboardChannel;
        }

        let message = match event.message.resolve(self.platform.as_ref()).await {
            Ok(m) => m,
            Err(e) => {
                warn!(message_id, error = %e, "could not resolve starred message");
                return ReactionOutcome::Unresolved;
            }
        };

        let count = event
            .reported_count
            .or_else(|| message.reaction_count(&self.settings.emoji))
            .unwrap_or(0);
        if count < self.settings.threshold {
            debug!(message_id, count, threshold = self.settings.threshold, "below threshold");
            return ReactionOutcome::BelowThreshold { count };
        }

        // No await between the check and the mark: the claim is atomic.
        let Some(claim) = self.ledger.try_claim(message.id) else {
            debug!(message_id, "already forwarded");
            return ReactionOutcome::AlreadyForwarded;
        };

        match self.forward(&message, count).await {
            Ok(forwarded_id) => {
                claim.commit(forwarded_id);
                info!(message_id, forwarded_id, stars = count, "message forwarded to starboard");
                ReactionOutcome::Forwarded { forwarded_id }
            }
            Err(e) => {
                error!(message_id, error = %e, "starboard forward failed");
                ReactionOutcome::Aborted
            }
        }
    }

    async fn forward(&self, message: &SourceMessage, stars: u64) -> Result<u64> {
        let channel_id = self
            .settings
            .channel_id
            .ok_or(StarboardError::ChannelNotConfigured)?;

        let channel = self.platform.resolve_channel(channel_id).await?;
        if !channel.text_capable {
            return Err(StarboardError::NotTextChannel { channel_id });
        }

        let color = self
            .colors
            .accent_color(message.author.avatar_url.as_deref())
            .await;
        let post = render_post(message, stars, &self.settings.emoji, color);

        self.platform.send_post(channel.id, &post).await
    }
}
