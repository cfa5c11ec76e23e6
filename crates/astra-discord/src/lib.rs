//! `astra-discord`: serenity gateway adapter for the Astra bot.
//!
//! Wires gateway events to the starboard, the presence scheduler, the slash
//! command dispatcher and the text triggers.

pub mod adapter;
pub mod commands;
pub mod context;
pub mod error;
pub mod handler;
pub mod platform;
pub mod presence;
pub mod triggers;

pub use adapter::DiscordAdapter;
pub use context::BotContext;
pub use error::DiscordError;
