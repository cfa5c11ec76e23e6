//! Slash commands: registry, dispatcher and the built-in handlers.
//!
//! Registration happens in `ready()` when `discord.slash_commands` is true.
//! Interactions are dispatched from `interaction_create` in the event handler.
//! Handlers never talk to serenity directly: they see an [`Interaction`], so
//! the dispatcher's error recovery can be exercised without a gateway.

pub mod builtin;
pub mod slash;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serenity::builder::CreateCommand;
use serenity::model::application::Command;
use serenity::model::id::GuildId;
use serenity::prelude::Context;
use tracing::{debug, info, warn};

pub use slash::SlashInteraction;

/// Shown to the user whenever a handler fails. Never carries error detail.
pub const FAILURE_NOTICE: &str = "\u{26a0}\u{fe0f} Something went wrong while running that command.";

/// Errors a command handler can return.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("serenity error: {0}")]
    Discord(#[from] serenity::Error),

    #[error("interaction already acknowledged")]
    AlreadyAcknowledged,
}

/// One command invocation as seen by a handler.
///
/// Acknowledgement is tracked by the implementation: after `defer` or `reply`
/// the interaction is acknowledged and only `follow_up` may be used.
#[async_trait]
pub trait Interaction: Send + Sync {
    fn command_name(&self) -> &str;
    fn user_id(&self) -> u64;
    fn channel_id(&self) -> u64;
    /// String value of the named option, if present.
    fn option_str(&self, name: &str) -> Option<&str>;
    fn is_acknowledged(&self) -> bool;

    async fn defer(&self, ephemeral: bool) -> Result<(), CommandError>;
    async fn reply(&self, content: &str, ephemeral: bool) -> Result<(), CommandError>;
    async fn follow_up(&self, content: &str, ephemeral: bool) -> Result<(), CommandError>;
}

/// A named slash command.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;

    /// Definition sent to Discord at registration.
    fn definition(&self) -> CreateCommand {
        CreateCommand::new(self.name()).description(self.description())
    }

    async fn execute(&self, interaction: &dyn Interaction) -> Result<(), CommandError>;
}

/// Static name → handler map, filled once at startup.
#[derive(Default)]
pub struct CommandRegistry {
    handlers: HashMap<&'static str, Arc<dyn CommandHandler>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a handler. A second handler with the same name replaces the first.
    pub fn register(&mut self, handler: Arc<dyn CommandHandler>) {
        let name = handler.name();
        if self.handlers.insert(name, handler).is_some() {
            warn!(command = name, "duplicate command registration, replacing");
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn CommandHandler>> {
        self.handlers.get(name)
    }

    /// Definitions of every registered command, ordered by name.
    pub fn definitions(&self) -> Vec<CreateCommand> {
        let mut names: Vec<&'static str> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
            .into_iter()
            .filter_map(|n| self.handlers.get(n))
            .map(|h| h.definition())
            .collect()
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// How a dispatch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No handler registered under that name.
    Unknown,
    Completed,
    /// The handler failed; the user got the generic failure notice.
    Failed,
}

/// Route `interaction` to its handler. Never propagates errors.
pub async fn dispatch(registry: &CommandRegistry, interaction: &dyn Interaction) -> DispatchOutcome {
    let name = interaction.command_name();
    let Some(handler) = registry.get(name) else {
        debug!(command = name, "no handler for command");
        return DispatchOutcome::Unknown;
    };

    let Err(e) = handler.execute(interaction).await else {
        return DispatchOutcome::Completed;
    };

    warn!(
        command = name,
        user = interaction.user_id(),
        channel = interaction.channel_id(),
        error = %e,
        "slash command error"
    );

    // At most one fresh reply per interaction.
    let notice = if interaction.is_acknowledged() {
        interaction.follow_up(FAILURE_NOTICE, true).await
    } else {
        interaction.reply(FAILURE_NOTICE, true).await
    };
    if let Err(e) = notice {
        warn!(command = name, error = %e, "could not deliver failure notice");
    }
    DispatchOutcome::Failed
}

/// Register the registry's commands with Discord. Call from `ready()`.
pub async fn register_commands(ctx: &Context, registry: &CommandRegistry, guild_id: Option<GuildId>) {
    let commands = registry.definitions();

    match guild_id {
        Some(gid) => match gid.set_commands(&ctx.http, commands).await {
            Ok(cmds) => info!(guild = %gid, count = cmds.len(), "registered guild slash commands"),
            Err(e) => warn!(guild = %gid, error = %e, "failed to register guild commands"),
        },
        None => match Command::set_global_commands(&ctx.http, commands).await {
            Ok(cmds) => info!(count = cmds.len(), "registered global slash commands"),
            Err(e) => warn!(error = %e, "failed to register global slash commands"),
        },
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Sent {
        Defer,
        Reply(String),
        FollowUp(String),
    }

    /// In-memory interaction that records every response.
    pub struct MockInteraction {
        pub name: String,
        pub options: Vec<(String, String)>,
        acknowledged: AtomicBool,
        sent: Mutex<Vec<Sent>>,
    }

    impl MockInteraction {
        pub fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                options: Vec::new(),
                acknowledged: AtomicBool::new(false),
                sent: Mutex::new(Vec::new()),
            }
        }

        pub fn sent(&self) -> Vec<Sent> {
            self.sent.lock().unwrap().clone()
        }

        pub fn replies(&self) -> Vec<String> {
            self.sent()
                .into_iter()
                .filter_map(|s| match s {
                    Sent::Reply(c) => Some(c),
                    _ => None,
                })
                .collect()
        }

        pub fn follow_ups(&self) -> Vec<String> {
            self.sent()
                .into_iter()
                .filter_map(|s| match s {
                    Sent::FollowUp(c) => Some(c),
                    _ => None,
                })
                .collect()
        }
    }

    #[async_trait]
    impl Interaction for MockInteraction {
        fn command_name(&self) -> &str {
            &self.name
        }

        fn user_id(&self) -> u64 {
            42
        }

        fn channel_id(&self) -> u64 {
            7
        }

        fn option_str(&self, name: &str) -> Option<&str> {
            self.options
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str())
        }

        fn is_acknowledged(&self) -> bool {
            self.acknowledged.load(Ordering::SeqCst)
        }

        async fn defer(&self, _ephemeral: bool) -> Result<(), CommandError> {
            if self.acknowledged.swap(true, Ordering::SeqCst) {
                return Err(CommandError::AlreadyAcknowledged);
            }
            self.sent.lock().unwrap().push(Sent::Defer);
            Ok(())
        }

        async fn reply(&self, content: &str, _ephemeral: bool) -> Result<(), CommandError> {
            if self.acknowledged.swap(true, Ordering::SeqCst) {
                return Err(CommandError::AlreadyAcknowledged);
            }
            self.sent.lock().unwrap().push(Sent::Reply(content.to_string()));
            Ok(())
        }

        async fn follow_up(&self, content: &str, _ephemeral: bool) -> Result<(), CommandError> {
            self.sent
                .lock()
                .unwrap()
                .push(Sent::FollowUp(content.to_string()));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{MockInteraction, Sent};
    use super::*;

    struct Echo;

    #[async_trait]
    impl CommandHandler for Echo {
        fn name(&self) -> &'static str {
            "echo"
        }
        fn description(&self) -> &'static str {
            "Echo the text option"
        }
        async fn execute(&self, interaction: &dyn Interaction) -> Result<(), CommandError> {
            let text = interaction.option_str("text").unwrap_or("nothing");
            interaction.reply(text, false).await
        }
    }

    /// Defers, then fails.
    struct SlowFailure;

    #[async_trait]
    impl CommandHandler for SlowFailure {
        fn name(&self) -> &'static str {
            "slow"
        }
        fn description(&self) -> &'static str {
            "Defers then fails"
        }
        async fn execute(&self, interaction: &dyn Interaction) -> Result<(), CommandError> {
            interaction.defer(false).await?;
            Err(serenity::Error::Other("database on fire").into())
        }
    }

    /// Fails before acknowledging.
    struct EagerFailure;

    #[async_trait]
    impl CommandHandler for EagerFailure {
        fn name(&self) -> &'static str {
            "eager"
        }
        fn description(&self) -> &'static str {
            "Fails immediately"
        }
        async fn execute(&self, _interaction: &dyn Interaction) -> Result<(), CommandError> {
            Err(serenity::Error::Other("bad input").into())
        }
    }

    fn registry() -> CommandRegistry {
        let mut registry = CommandRegistry::new();
        registry.register(Arc::new(Echo));
        registry.register(Arc::new(SlowFailure));
        registry.register(Arc::new(EagerFailure));
        registry
    }

    #[tokio::test]
    async fn unknown_command_is_silent() {
        let interaction = MockInteraction::new("nope");
        let outcome = dispatch(&registry(), &interaction).await;
        assert_eq!(outcome, DispatchOutcome::Unknown);
        assert!(interaction.sent().is_empty());
    }

    #[tokio::test]
    async fn successful_handler_replies_once() {
        let mut interaction = MockInteraction::new("echo");
        interaction
            .options
            .push(("text".to_string(), "hello".to_string()));
        let outcome = dispatch(&registry(), &interaction).await;
        assert_eq!(outcome, DispatchOutcome::Completed);
        assert_eq!(interaction.replies(), vec!["hello".to_string()]);
    }

    #[tokio::test]
    async fn failure_after_defer_sends_one_follow_up() {
        let interaction = MockInteraction::new("slow");
        let outcome = dispatch(&registry(), &interaction).await;
        assert_eq!(outcome, DispatchOutcome::Failed);
        assert!(interaction.replies().is_empty());
        assert_eq!(interaction.follow_ups(), vec![FAILURE_NOTICE.to_string()]);
        assert_eq!(interaction.sent()[0], Sent::Defer);
    }

    #[tokio::test]
    async fn failure_before_ack_sends_fresh_reply() {
        let interaction = MockInteraction::new("eager");
        let outcome = dispatch(&registry(), &interaction).await;
        assert_eq!(outcome, DispatchOutcome::Failed);
        assert_eq!(interaction.replies(), vec![FAILURE_NOTICE.to_string()]);
        assert!(interaction.follow_ups().is_empty());
    }

    #[tokio::test]
    async fn failure_notice_hides_error_detail() {
        let interaction = MockInteraction::new("slow");
        dispatch(&registry(), &interaction).await;
        assert!(interaction
            .follow_ups()
            .iter()
            .all(|m| !m.contains("database")));
    }

    #[test]
    fn duplicate_registration_replaces() {
        let mut registry = registry();
        registry.register(Arc::new(Echo));
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.names(), vec!["eager", "echo", "slow"]);
        assert_eq!(registry.definitions().len(), 3);
    }
}
