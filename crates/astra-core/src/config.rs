use std::fmt;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_STAR_THRESHOLD: i64 = 2;
pub const DEFAULT_STAR_EMOJI: &str = "\u{2b50}"; // ⭐
pub const DEFAULT_ROTATION_INTERVAL_MS: u64 = 30_000;
pub const MIN_ROTATION_INTERVAL_MS: u64 = 5_000; // presence update rate limit floor

/// Top-level config (astra.toml + ASTRA_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AstraConfig {
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub starboard: StarboardConfig,
    #[serde(default)]
    pub presence: PresenceConfig,
    /// Canned text replies. Empty means the built-in set is used.
    #[serde(default)]
    pub triggers: Vec<TriggerConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Bot credential. An empty token keeps the adapter from starting.
    #[serde(default)]
    pub bot_token: String,
    /// Application identity passed to the client builder and logged at startup.
    pub application_id: Option<u64>,
    /// When set, slash commands are registered to this guild instead of globally.
    pub guild_id: Option<u64>,
    /// Register and answer slash commands (default: true).
    #[serde(default = "bool_true")]
    pub slash_commands: bool,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            application_id: None,
            guild_id: None,
            slash_commands: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StarboardConfig {
    /// Destination channel. Starboard is a no-op while unset.
    pub channel_id: Option<u64>,
    /// Minimum star count before a message is forwarded. Must be positive;
    /// anything else is replaced by [`DEFAULT_STAR_THRESHOLD`] at startup.
    #[serde(default = "default_threshold")]
    pub threshold: NumberSetting,
    #[serde(default = "default_emoji")]
    pub emoji: String,
}

impl Default for StarboardConfig {
    fn default() -> Self {
        Self {
            channel_id: None,
            threshold: NumberSetting::Int(DEFAULT_STAR_THRESHOLD),
            emoji: default_emoji(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceConfig {
    /// Availability shown next to the bot: online, idle, dnd, invisible.
    #[serde(default = "default_status")]
    pub status: String,
    /// Activity category used when rotation is off.
    #[serde(default = "default_activity_type")]
    pub activity_type: String,
    /// Activity text used when rotation is off.
    #[serde(default = "default_activity_name")]
    pub activity_name: String,
    /// Cycle through the phrase lists below (default: true).
    #[serde(default = "bool_true")]
    pub rotate: bool,
    /// Rotation period. Values below [`MIN_ROTATION_INTERVAL_MS`] are clamped.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: NumberSetting,
    // Pipe-delimited phrase lists, one per activity category.
    #[serde(default)]
    pub playing: Option<String>,
    #[serde(default)]
    pub listening: Option<String>,
    #[serde(default)]
    pub watching: Option<String>,
    #[serde(default)]
    pub competing: Option<String>,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            status: default_status(),
            activity_type: default_activity_type(),
            activity_name: default_activity_name(),
            rotate: true,
            interval_ms: NumberSetting::Int(DEFAULT_ROTATION_INTERVAL_MS as i64),
            playing: None,
            listening: None,
            watching: None,
            competing: None,
        }
    }
}

/// A numeric setting kept as written.
///
/// A malformed value must not fail the whole load and take the bot token with
/// it, so anything is accepted here and checked by the owning feature, which
/// logs and falls back to its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberSetting {
    Int(i64),
    Float(f64),
    Text(String),
}

impl NumberSetting {
    /// The value as an integer; numeric strings are accepted, anything else
    /// is `None`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            NumberSetting::Int(n) => Some(*n),
            NumberSetting::Float(_) => None,
            NumberSetting::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl From<i64> for NumberSetting {
    fn from(n: i64) -> Self {
        NumberSetting::Int(n)
    }
}

impl fmt::Display for NumberSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberSetting::Int(n) => write!(f, "{n}"),
            NumberSetting::Float(x) => write!(f, "{x}"),
            NumberSetting::Text(s) => write!(f, "{s:?}"),
        }
    }
}

/// How a trigger pattern is compared against message content.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerMatch {
    /// Whole message, ignoring surrounding whitespace.
    Exact,
    #[default]
    Contains,
    Prefix,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerConfig {
    pub pattern: String,
    pub reply: String,
    #[serde(default, rename = "match")]
    pub match_kind: TriggerMatch,
}

fn bool_true() -> bool {
    true
}
fn default_threshold() -> NumberSetting {
    NumberSetting::Int(DEFAULT_STAR_THRESHOLD)
}
fn default_emoji() -> String {
    DEFAULT_STAR_EMOJI.to_string()
}
fn default_status() -> String {
    "online".to_string()
}
fn default_activity_type() -> String {
    "playing".to_string()
}
fn default_activity_name() -> String {
    "with the stars".to_string()
}
fn default_interval_ms() -> NumberSetting {
    NumberSetting::Int(DEFAULT_ROTATION_INTERVAL_MS as i64)
}

impl AstraConfig {
    /// Load config from a TOML file with ASTRA_* env var overrides.
    ///
    /// Nested keys use a double underscore: `ASTRA_STARBOARD__CHANNEL_ID=123`.
    /// A missing file is not an error; env vars and defaults still apply.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("ASTRA_").split("__"))
            .extract()
            .map_err(|e| crate::error::AstraError::Config(e.to_string()))
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.astra/astra.toml", home)
}
