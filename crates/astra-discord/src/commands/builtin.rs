//! Commands every Astra instance ships with.

use std::sync::Arc;

use async_trait::async_trait;

use astra_presence::RotationSettings;
use astra_starboard::{ForwardLedger, StarboardSettings};

use super::{CommandError, CommandHandler, CommandRegistry, Interaction};
use crate::presence::PresenceSlot;

/// `/ping`: liveness check.
pub struct PingCommand;

#[async_trait]
impl CommandHandler for PingCommand {
    fn name(&self) -> &'static str {
        "ping"
    }

    fn description(&self) -> &'static str {
        "Check that the bot is alive"
    }

    async fn execute(&self, interaction: &dyn Interaction) -> Result<(), CommandError> {
        interaction.reply("Pong!", true).await
    }
}

/// `/starboard`: show the starboard configuration and forward count.
pub struct StarboardCommand {
    ledger: Arc<ForwardLedger>,
    settings: StarboardSettings,
}

impl StarboardCommand {
    pub fn new(ledger: Arc<ForwardLedger>, settings: StarboardSettings) -> Self {
        Self { ledger, settings }
    }

    fn summary(&self) -> String {
        let channel = match self.settings.channel_id {
            Some(id) => format!("<#{id}>"),
            None => "not configured (starboard disabled)".to_string(),
        };
        format!(
            "**Starboard**\nChannel: {}\nThreshold: {} {}\nForwarded since start: {}",
            channel,
            self.settings.threshold,
            self.settings.emoji,
            self.ledger.len()
        )
    }
}

#[async_trait]
impl CommandHandler for StarboardCommand {
    fn name(&self) -> &'static str {
        "starboard"
    }

    fn description(&self) -> &'static str {
        "Show starboard settings"
    }

    async fn execute(&self, interaction: &dyn Interaction) -> Result<(), CommandError> {
        interaction.reply(&self.summary(), true).await
    }
}

/// `/presence`: show whether the presence rotation is running.
pub struct PresenceCommand {
    slot: PresenceSlot,
    settings: RotationSettings,
}

impl PresenceCommand {
    pub fn new(slot: PresenceSlot, settings: RotationSettings) -> Self {
        Self { slot, settings }
    }
}

#[async_trait]
impl CommandHandler for PresenceCommand {
    fn name(&self) -> &'static str {
        "presence"
    }

    fn description(&self) -> &'static str {
        "Show the presence rotation state"
    }

    async fn execute(&self, interaction: &dyn Interaction) -> Result<(), CommandError> {
        let text = if !self.settings.rotate {
            format!(
                "Presence rotation is disabled. Fixed activity: {} {}",
                self.settings.fixed_activity.kind, self.settings.fixed_activity.text
            )
        } else {
            let state = if self.slot.is_running().await {
                "running"
            } else {
                "stopped"
            };
            format!(
                "Presence rotation is **{}** ({} categories, every {}s)",
                state,
                self.settings.catalog.len(),
                self.settings.interval.as_secs()
            )
        };
        interaction.reply(&text, true).await
    }
}

/// Register `/ping`, `/starboard` and `/presence`.
pub fn register_builtins(
    registry: &mut CommandRegistry,
    ledger: Arc<ForwardLedger>,
    starboard: StarboardSettings,
    slot: PresenceSlot,
    presence: RotationSettings,
) {
    registry.register(Arc::new(PingCommand));
    registry.register(Arc::new(StarboardCommand::new(ledger, starboard)));
    registry.register(Arc::new(PresenceCommand::new(slot, presence)));
}

#[cfg(test)]
mod tests {
    use astra_core::config::PresenceConfig;

    use super::*;
    use crate::commands::testing::MockInteraction;
    use crate::commands::{dispatch, DispatchOutcome};

    fn starboard_settings(channel_id: Option<u64>) -> StarboardSettings {
        StarboardSettings {
            channel_id,
            threshold: 3,
            emoji: "\u{2b50}".to_string(),
        }
    }

    #[tokio::test]
    async fn ping_replies_pong() {
        let interaction = MockInteraction::new("ping");
        PingCommand.execute(&interaction).await.unwrap();
        assert_eq!(interaction.replies(), vec!["Pong!".to_string()]);
    }

    #[tokio::test]
    async fn starboard_reports_forward_count() {
        let ledger = Arc::new(ForwardLedger::new());
        ledger.record_forward(1, 100);
        ledger.record_forward(2, 200);
        let command = StarboardCommand::new(ledger, starboard_settings(Some(55)));

        let interaction = MockInteraction::new("starboard");
        command.execute(&interaction).await.unwrap();
        let reply = &interaction.replies()[0];
        assert!(reply.contains("<#55>"));
        assert!(reply.contains("Threshold: 3"));
        assert!(reply.contains("Forwarded since start: 2"));
    }

    #[tokio::test]
    async fn starboard_reports_disabled_channel() {
        let command = StarboardCommand::new(Arc::new(ForwardLedger::new()), starboard_settings(None));
        let interaction = MockInteraction::new("starboard");
        command.execute(&interaction).await.unwrap();
        assert!(interaction.replies()[0].contains("not configured"));
    }

    #[tokio::test]
    async fn presence_reports_stopped_before_ready() {
        let settings = RotationSettings::from_config(&PresenceConfig::default());
        let command = PresenceCommand::new(PresenceSlot::new(), settings);
        let interaction = MockInteraction::new("presence");
        command.execute(&interaction).await.unwrap();
        let reply = &interaction.replies()[0];
        assert!(reply.contains("**stopped**"));
        assert!(reply.contains("every 30s"));
    }

    #[tokio::test]
    async fn presence_reports_disabled_rotation() {
        let config = PresenceConfig {
            rotate: false,
            ..PresenceConfig::default()
        };
        let command =
            PresenceCommand::new(PresenceSlot::new(), RotationSettings::from_config(&config));
        let interaction = MockInteraction::new("presence");
        command.execute(&interaction).await.unwrap();
        assert!(interaction.replies()[0].contains("disabled"));
    }

    #[tokio::test]
    async fn builtins_are_dispatchable() {
        let mut registry = CommandRegistry::new();
        register_builtins(
            &mut registry,
            Arc::new(ForwardLedger::new()),
            starboard_settings(Some(1)),
            PresenceSlot::new(),
            RotationSettings::from_config(&PresenceConfig::default()),
        );
        assert_eq!(registry.names(), vec!["ping", "presence", "starboard"]);

        let interaction = MockInteraction::new("ping");
        assert_eq!(
            dispatch(&registry, &interaction).await,
            DispatchOutcome::Completed
        );
    }
}
