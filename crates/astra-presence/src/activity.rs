use std::fmt;

/// How the activity text is presented ("Playing …", "Listening to …").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityKind {
    Playing,
    Listening,
    Watching,
    Competing,
    Custom,
}

impl ActivityKind {
    /// Categories that take part in rotation, in rotation order.
    pub const ROTATING: [ActivityKind; 4] = [
        ActivityKind::Playing,
        ActivityKind::Listening,
        ActivityKind::Watching,
        ActivityKind::Competing,
    ];

    /// Parse a config string; unknown values fall back to `Playing`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "listening" => ActivityKind::Listening,
            "watching" => ActivityKind::Watching,
            "competing" => ActivityKind::Competing,
            "custom" => ActivityKind::Custom,
            _ => ActivityKind::Playing,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActivityKind::Playing => "playing",
            ActivityKind::Listening => "listening",
            ActivityKind::Watching => "watching",
            ActivityKind::Competing => "competing",
            ActivityKind::Custom => "custom",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityPhrase {
    pub kind: ActivityKind,
    pub text: String,
}

impl ActivityPhrase {
    pub fn new(kind: ActivityKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Availability dot shown next to the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Availability {
    #[default]
    Online,
    Idle,
    DoNotDisturb,
    Invisible,
}

impl Availability {
    /// Parse a config status string; unknown values mean `Online`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "idle" => Availability::Idle,
            "dnd" | "do_not_disturb" => Availability::DoNotDisturb,
            "invisible" => Availability::Invisible,
            _ => Availability::Online,
        }
    }
}

/// One complete presence update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceSpec {
    pub status: Availability,
    pub activity: ActivityPhrase,
}
