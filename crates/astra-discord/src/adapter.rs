use std::sync::Arc;
use std::time::Duration;

use serenity::model::gateway::GatewayIntents;
use serenity::Client;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::context::BotContext;
use crate::error::DiscordError;
use crate::handler::AstraHandler;

const RECONNECT_DELAY: Duration = Duration::from_secs(5);
const BUILD_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Discord gateway adapter.
///
/// Wraps a serenity `Client` and drives the event loop until shutdown is
/// signalled. Rebuilds the client whenever the gateway drops.
pub struct DiscordAdapter {
    ctx: Arc<BotContext>,
}

impl DiscordAdapter {
    pub fn new(ctx: Arc<BotContext>) -> Self {
        Self { ctx }
    }

    /// Connect and keep reconnecting until `shutdown` turns true.
    ///
    /// The presence rotation is stopped whenever the gateway drops; the next
    /// `ready` starts a fresh one against the new shard.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> Result<(), DiscordError> {
        if self.ctx.discord.bot_token.trim().is_empty() {
            return Err(DiscordError::NoToken);
        }

        let intents = GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT
            | GatewayIntents::GUILD_MESSAGE_REACTIONS;

        loop {
            let Some(mut client) = self.connect(intents, &mut shutdown).await else {
                break;
            };
            let shard_manager = Arc::clone(&client.shard_manager);

            info!("Discord: gateway connecting");
            tokio::select! {
                result = client.start() => match result {
                    Err(e) => warn!("Discord: gateway error ({e}), reconnecting in 5s"),
                    Ok(()) => info!("Discord: gateway stopped cleanly, reconnecting in 5s"),
                },
                _ = signalled(&mut shutdown) => {
                    info!("Discord: shutting down");
                    self.ctx.rotation.stop().await;
                    shard_manager.shutdown_all().await;
                    return Ok(());
                }
            }

            self.ctx.rotation.stop().await;
            if sleep_or_shutdown(RECONNECT_DELAY, &mut shutdown).await {
                break;
            }
        }

        self.ctx.rotation.stop().await;
        info!("Discord: adapter stopped");
        Ok(())
    }

    /// Build a client, retrying until it succeeds. `None` on shutdown.
    async fn connect(
        &self,
        intents: GatewayIntents,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Option<Client> {
        loop {
            match self.build_client(intents).await {
                Ok(c) => return Some(c),
                Err(e) => {
                    error!("Discord: connect failed ({e}), retrying in 30s");
                    if sleep_or_shutdown(BUILD_RETRY_DELAY, shutdown).await {
                        return None;
                    }
                }
            }
        }
    }

    /// Build a fresh serenity `Client` with our event handler.
    async fn build_client(&self, intents: GatewayIntents) -> Result<Client, serenity::Error> {
        let handler = AstraHandler::new(Arc::clone(&self.ctx));

        let mut builder = Client::builder(&self.ctx.discord.bot_token, intents).event_handler(handler);
        if let Some(app_id) = self.ctx.discord.application_id.filter(|id| *id != 0) {
            builder = builder.application_id(app_id.into());
        }
        builder.await
    }
}

/// Resolves once shutdown has been requested or the sender is gone.
async fn signalled(shutdown: &mut watch::Receiver<bool>) {
    while !*shutdown.borrow_and_update() {
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}

/// Sleep for `delay`; `true` when shutdown arrived first.
async fn sleep_or_shutdown(delay: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(delay) => false,
        _ = signalled(shutdown) => true,
    }
}
