//! Canned replies to message content.

use astra_core::config::{TriggerConfig, TriggerMatch};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Trigger {
    /// Lowercased.
    pattern: String,
    reply: String,
    kind: TriggerMatch,
}

impl Trigger {
    fn new(pattern: &str, reply: &str, kind: TriggerMatch) -> Self {
        Self {
            pattern: pattern.trim().to_lowercase(),
            reply: reply.to_string(),
            kind,
        }
    }

    /// `content` must already be lowercased.
    fn matches(&self, content: &str) -> bool {
        match self.kind {
            TriggerMatch::Exact => content.trim() == self.pattern,
            TriggerMatch::Contains => content.contains(&self.pattern),
            TriggerMatch::Prefix => content.trim_start().starts_with(&self.pattern),
        }
    }
}

/// Ordered, case-insensitive trigger list. First match wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextTriggers {
    triggers: Vec<Trigger>,
}

impl TextTriggers {
    /// Configured triggers, or the built-in set when none are configured.
    /// Entries with an empty pattern or reply are skipped.
    pub fn from_config(configs: &[TriggerConfig]) -> Self {
        if configs.is_empty() {
            return Self::builtin();
        }
        let triggers = configs
            .iter()
            .filter(|c| !c.pattern.trim().is_empty() && !c.reply.is_empty())
            .map(|c| Trigger::new(&c.pattern, &c.reply, c.match_kind))
            .collect();
        Self { triggers }
    }

    pub fn builtin() -> Self {
        Self {
            triggers: vec![
                Trigger::new("good bot", "Thank you! \u{2b50}", TriggerMatch::Contains),
                Trigger::new("bad bot", "Sorry, I'll try harder.", TriggerMatch::Contains),
            ],
        }
    }

    pub fn respond(&self, content: &str) -> Option<&str> {
        let content = content.to_lowercase();
        self.triggers
            .iter()
            .find(|t| t.matches(&content))
            .map(|t| t.reply.as_str())
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trigger(pattern: &str, reply: &str, kind: TriggerMatch) -> TriggerConfig {
        TriggerConfig {
            pattern: pattern.to_string(),
            reply: reply.to_string(),
            match_kind: kind,
        }
    }

    #[test]
    fn builtin_set_when_unconfigured() {
        let triggers = TextTriggers::from_config(&[]);
        assert_eq!(triggers.len(), 2);
        assert_eq!(triggers.respond("What a GOOD BOT!"), Some("Thank you! \u{2b50}"));
        assert_eq!(triggers.respond("hello"), None);
    }

    #[test]
    fn match_kinds() {
        let triggers = TextTriggers::from_config(&[
            trigger("ping", "pong", TriggerMatch::Exact),
            trigger("!roll", "4", TriggerMatch::Prefix),
            trigger("coffee", "\u{2615}", TriggerMatch::Contains),
        ]);
        assert_eq!(triggers.respond("  Ping "), Some("pong"));
        assert_eq!(triggers.respond("ping please"), None);
        assert_eq!(triggers.respond("!roll d20"), Some("4"));
        assert_eq!(triggers.respond("please !roll"), None);
        assert_eq!(triggers.respond("need Coffee now"), Some("\u{2615}"));
    }

    #[test]
    fn first_match_wins() {
        let triggers = TextTriggers::from_config(&[
            trigger("hi", "first", TriggerMatch::Contains),
            trigger("hi there", "second", TriggerMatch::Contains),
        ]);
        assert_eq!(triggers.respond("hi there"), Some("first"));
    }

    #[test]
    fn blank_entries_are_skipped() {
        let triggers = TextTriggers::from_config(&[
            trigger("  ", "never", TriggerMatch::Contains),
            trigger("x", "", TriggerMatch::Contains),
        ]);
        assert!(triggers.is_empty());
        assert_eq!(triggers.respond("anything"), None);
    }
}
