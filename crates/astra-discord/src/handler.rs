use std::sync::{Arc, OnceLock};

use serenity::async_trait;
use serenity::model::application::Interaction;
use serenity::model::channel::{Message, Reaction};
use serenity::model::gateway::Ready;
use serenity::model::id::{GuildId, UserId};
use serenity::prelude::{Context, EventHandler};
use tracing::{debug, info, warn};

use astra_presence::{PresenceScheduler, PresenceSink};
use astra_starboard::{MessageRef, ReactionEvent, Starboard};

use crate::commands::{dispatch, register_commands, SlashInteraction};
use crate::context::BotContext;
use crate::platform::{emoji_key, SerenityPlatform};
use crate::presence::ShardPresence;

/// Serenity event handler for one gateway session.
pub struct AstraHandler {
    pub ctx: Arc<BotContext>,
    pub bot_id: OnceLock<UserId>,
    /// Built on the first `ready`, once a serenity `Context` exists.
    pub starboard: OnceLock<Arc<Starboard>>,
}

impl AstraHandler {
    pub fn new(ctx: Arc<BotContext>) -> Self {
        Self {
            ctx,
            bot_id: OnceLock::new(),
            starboard: OnceLock::new(),
        }
    }
}

#[async_trait]
impl EventHandler for AstraHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        self.bot_id.set(ready.user.id).ok();
        info!(name = %ready.user.name, guilds = ready.guilds.len(), "Discord bot connected");

        let app = &self.ctx;
        self.starboard.get_or_init(|| {
            Arc::new(Starboard::new(
                Arc::new(SerenityPlatform::new(ctx.clone())),
                Arc::clone(&app.colors),
                Arc::clone(&app.ledger),
                app.starboard.clone(),
            ))
        });

        let sink = Arc::new(ShardPresence::new(ctx.clone()));
        if app.presence.rotate {
            let scheduler = PresenceScheduler::new(app.presence.clone(), sink);
            app.rotation.replace(scheduler).await;
        } else if let Err(e) = sink.push(&app.presence.fixed_presence()).await {
            warn!(error = %e, "could not set fixed presence");
        }

        if app.discord.slash_commands {
            let guild = app.discord.guild_id.filter(|g| *g != 0).map(GuildId::new);
            register_commands(&ctx, &app.commands, guild).await;
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }
        let Some(reply) = self.ctx.triggers.respond(&msg.content) else {
            return;
        };
        if let Err(e) = msg.reply(&ctx, reply).await {
            warn!(channel_id = %msg.channel_id, error = %e, "trigger reply failed");
        }
    }

    async fn reaction_add(&self, ctx: Context, reaction: Reaction) {
        let Some(starboard) = self.starboard.get() else {
            debug!("reaction before ready, ignored");
            return;
        };
        let Some(user_id) = reaction.user_id else {
            return;
        };
        if self.bot_id.get() == Some(&user_id) {
            return;
        }

        // Skip the user lookup for foreign emoji.
        let emoji = emoji_key(&reaction.emoji);
        if emoji != starboard.settings().emoji {
            return;
        }

        let Some(actor_is_bot) = actor_is_bot(&ctx, &reaction, user_id).await else {
            return;
        };

        let event = ReactionEvent {
            message: MessageRef {
                channel_id: reaction.channel_id.get(),
                message_id: reaction.message_id.get(),
                guild_id: reaction.guild_id.map(|g| g.get()),
            },
            emoji,
            actor_id: user_id.get(),
            actor_is_bot,
            reported_count: None,
        };
        let outcome = starboard.handle_reaction(&event).await;
        debug!(message_id = %reaction.message_id, ?outcome, "reaction handled");
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if !self.ctx.discord.slash_commands {
            return;
        }
        if let Interaction::Command(command) = interaction {
            let invocation = SlashInteraction::new(&ctx, &command);
            dispatch(&self.ctx.commands, &invocation).await;
        }
    }
}

/// Whether the reacting user is a bot: member payload, then cache, then REST.
/// `None` when the user cannot be looked up.
async fn actor_is_bot(ctx: &Context, reaction: &Reaction, user_id: UserId) -> Option<bool> {
    if let Some(member) = &reaction.member {
        return Some(member.user.bot);
    }
    let cached = ctx.cache.user(user_id).map(|u| u.bot);
    if cached.is_some() {
        return cached;
    }
    match user_id.to_user(ctx).await {
        Ok(user) => Some(user.bot),
        Err(e) => {
            warn!(user_id = %user_id, error = %e, "could not look up reacting user");
            None
        }
    }
}
