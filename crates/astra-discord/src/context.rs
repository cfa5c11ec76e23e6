//! Process-wide state shared by every gateway session.

use std::sync::Arc;

use astra_core::config::DiscordConfig;
use astra_core::AstraConfig;
use astra_presence::RotationSettings;
use astra_starboard::{AvatarColorExtractor, ColorSource, ForwardLedger, StarboardSettings};

use crate::commands::builtin::register_builtins;
use crate::commands::CommandRegistry;
use crate::presence::PresenceSlot;
use crate::triggers::TextTriggers;

/// Built once at startup and handed to every rebuilt client. The ledger and
/// the presence slot outlive gateway reconnects.
pub struct BotContext {
    pub discord: DiscordConfig,
    pub commands: CommandRegistry,
    pub triggers: TextTriggers,
    pub ledger: Arc<ForwardLedger>,
    pub colors: Arc<dyn ColorSource>,
    pub starboard: StarboardSettings,
    pub presence: RotationSettings,
    pub rotation: PresenceSlot,
}

impl BotContext {
    /// Validate every section (logging problems once) and register the
    /// built-in commands.
    pub fn from_config(config: &AstraConfig) -> Self {
        let starboard = StarboardSettings::from_config(&config.starboard);
        let presence = RotationSettings::from_config(&config.presence);
        let ledger = Arc::new(ForwardLedger::new());
        let rotation = PresenceSlot::new();

        let mut commands = CommandRegistry::new();
        register_builtins(
            &mut commands,
            Arc::clone(&ledger),
            starboard.clone(),
            rotation.clone(),
            presence.clone(),
        );

        Self {
            discord: config.discord.clone(),
            commands,
            triggers: TextTriggers::from_config(&config.triggers),
            ledger,
            colors: Arc::new(AvatarColorExtractor::new()),
            starboard,
            presence,
            rotation,
        }
    }
}
