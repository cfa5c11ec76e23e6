use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serenity::builder::{
    CreateInteractionResponse, CreateInteractionResponseFollowup,
    CreateInteractionResponseMessage,
};
use serenity::model::application::CommandInteraction;
use serenity::prelude::Context;

use super::{CommandError, Interaction};

/// [`Interaction`] over a serenity `CommandInteraction`.
///
/// Serenity does not remember whether a response was already created, so the
/// acknowledgement flag lives here.
pub struct SlashInteraction<'a> {
    ctx: &'a Context,
    command: &'a CommandInteraction,
    acknowledged: AtomicBool,
}

impl<'a> SlashInteraction<'a> {
    pub fn new(ctx: &'a Context, command: &'a CommandInteraction) -> Self {
        Self {
            ctx,
            command,
            acknowledged: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl Interaction for SlashInteraction<'_> {
    fn command_name(&self) -> &str {
        &self.command.data.name
    }

    fn user_id(&self) -> u64 {
        self.command.user.id.get()
    }

    fn channel_id(&self) -> u64 {
        self.command.channel_id.get()
    }

    fn option_str(&self, name: &str) -> Option<&str> {
        self.command
            .data
            .options
            .iter()
            .find(|o| o.name == name)
            .and_then(|o| o.value.as_str())
    }

    fn is_acknowledged(&self) -> bool {
        self.acknowledged.load(Ordering::SeqCst)
    }

    /// Shows "thinking..." until a follow-up arrives.
    async fn defer(&self, ephemeral: bool) -> Result<(), CommandError> {
        if self.is_acknowledged() {
            return Err(CommandError::AlreadyAcknowledged);
        }
        self.command
            .create_response(
                &self.ctx.http,
                CreateInteractionResponse::Defer(
                    CreateInteractionResponseMessage::new().ephemeral(ephemeral),
                ),
            )
            .await?;
        self.acknowledged.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn reply(&self, content: &str, ephemeral: bool) -> Result<(), CommandError> {
        if self.is_acknowledged() {
            return Err(CommandError::AlreadyAcknowledged);
        }
        self.command
            .create_response(
                &self.ctx.http,
                CreateInteractionResponse::Message(
                    CreateInteractionResponseMessage::new()
                        .content(content)
                        .ephemeral(ephemeral),
                ),
            )
            .await?;
        self.acknowledged.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn follow_up(&self, content: &str, ephemeral: bool) -> Result<(), CommandError> {
        self.command
            .create_followup(
                &self.ctx.http,
                CreateInteractionResponseFollowup::new()
                    .content(content)
                    .ephemeral(ephemeral),
            )
            .await?;
        Ok(())
    }
}
