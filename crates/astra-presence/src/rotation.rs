//! Phrase catalog and the round-robin rotation state.

use std::time::Duration;

use tracing::{debug, info, warn};

use astra_core::config::{PresenceConfig, DEFAULT_ROTATION_INTERVAL_MS, MIN_ROTATION_INTERVAL_MS};

use crate::activity::{ActivityKind, ActivityPhrase, Availability, PresenceSpec};

/// Built-in phrase for a category whose configured list is empty.
fn default_phrase(kind: ActivityKind) -> &'static str {
    match kind {
        ActivityKind::Playing => "with the stars",
        ActivityKind::Listening => "the cosmic background",
        ActivityKind::Watching => "the starboard",
        ActivityKind::Competing => "a stargazing contest",
        ActivityKind::Custom => "Reaching for the stars",
    }
}

/// Split a pipe-delimited list, trimming entries and dropping empty ones.
pub fn parse_phrase_list(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or("")
        .split('|')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Ordered categories, each with a non-empty phrase list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseCatalog {
    categories: Vec<(ActivityKind, Vec<String>)>,
}

impl PhraseCatalog {
    /// Build a catalog. Empty lists are replaced by the category's built-in
    /// phrase; an empty input yields the `Playing` default alone.
    pub fn from_lists(lists: impl IntoIterator<Item = (ActivityKind, Vec<String>)>) -> Self {
        let mut categories: Vec<(ActivityKind, Vec<String>)> = lists
            .into_iter()
            .map(|(kind, phrases)| {
                if phrases.is_empty() {
                    (kind, vec![default_phrase(kind).to_string()])
                } else {
                    (kind, phrases)
                }
            })
            .collect();
        if categories.is_empty() {
            let kind = ActivityKind::Playing;
            categories.push((kind, vec![default_phrase(kind).to_string()]));
        }
        Self { categories }
    }

    pub fn from_config(config: &PresenceConfig) -> Self {
        Self::from_lists(ActivityKind::ROTATING.into_iter().map(|kind| {
            let raw = match kind {
                ActivityKind::Playing => config.playing.as_deref(),
                ActivityKind::Listening => config.listening.as_deref(),
                ActivityKind::Watching => config.watching.as_deref(),
                ActivityKind::Competing => config.competing.as_deref(),
                ActivityKind::Custom => None,
            };
            (kind, parse_phrase_list(raw))
        }))
    }

    /// Number of categories (never zero).
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn phrases(&self, kind: ActivityKind) -> Option<&[String]> {
        self.categories
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, p)| p.as_slice())
    }
}

/// Validated presence settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationSettings {
    pub status: Availability,
    pub rotate: bool,
    /// Already clamped to the minimum interval.
    pub interval: Duration,
    pub catalog: PhraseCatalog,
    /// Shown when rotation is disabled.
    pub fixed_activity: ActivityPhrase,
}

impl RotationSettings {
    /// Validate raw config once at startup, logging adjustments.
    pub fn from_config(config: &PresenceConfig) -> Self {
        let configured = config
            .interval_ms
            .as_i64()
            .and_then(|ms| u64::try_from(ms).ok());
        let interval_ms = match configured {
            None => {
                warn!(
                    configured = %config.interval_ms,
                    fallback = DEFAULT_ROTATION_INTERVAL_MS,
                    "invalid presence interval, using default"
                );
                DEFAULT_ROTATION_INTERVAL_MS
            }
            Some(ms) if ms < MIN_ROTATION_INTERVAL_MS => {
                warn!(
                    configured = ms,
                    minimum = MIN_ROTATION_INTERVAL_MS,
                    "presence interval below minimum, clamping"
                );
                MIN_ROTATION_INTERVAL_MS
            }
            Some(ms) => ms,
        };

        let catalog = PhraseCatalog::from_config(config);
        for kind in ActivityKind::ROTATING {
            let phrases = catalog.phrases(kind).map_or(0, <[String]>::len);
            debug!(kind = %kind, phrases, "presence phrases");
        }
        let kind = ActivityKind::parse(&config.activity_type);
        let name = config.activity_name.trim();
        let fixed_activity = if name.is_empty() {
            ActivityPhrase::new(kind, default_phrase(kind))
        } else {
            ActivityPhrase::new(kind, name)
        };

        info!(
            rotate = config.rotate,
            interval_ms,
            categories = catalog.len(),
            "presence settings loaded"
        );

        Self {
            status: Availability::parse(&config.status),
            rotate: config.rotate,
            interval: Duration::from_millis(interval_ms),
            catalog,
            fixed_activity,
        }
    }

    /// Presence used when rotation is off.
    pub fn fixed_presence(&self) -> PresenceSpec {
        PresenceSpec {
            status: self.status,
            activity: self.fixed_activity.clone(),
        }
    }
}

#[derive(Debug, Clone)]
struct Category {
    kind: ActivityKind,
    phrases: Vec<String>,
    cursor: usize,
}

/// Round-robin position over categories and, inside each, over phrases.
///
/// The first [`advance`](Self::advance) returns the starting category's
/// first phrase; each later call moves on to the next category.
#[derive(Debug, Clone)]
pub struct RotationState {
    categories: Vec<Category>,
    current: usize,
    started: bool,
}

impl RotationState {
    /// `start` is taken modulo the number of categories.
    pub fn new(catalog: &PhraseCatalog, start: usize) -> Self {
        let categories: Vec<Category> = catalog
            .categories
            .iter()
            .map(|(kind, phrases)| Category {
                kind: *kind,
                phrases: phrases.clone(),
                cursor: 0,
            })
            .collect();
        let current = start % categories.len().max(1);
        Self {
            categories,
            current,
            started: false,
        }
    }

    pub fn current_category(&self) -> ActivityKind {
        self.categories[self.current].kind
    }

    /// Select the next phrase.
    pub fn advance(&mut self) -> ActivityPhrase {
        if self.started {
            self.current = (self.current + 1) % self.categories.len();
        } else {
            self.started = true;
        }

        let category = &mut self.categories[self.current];
        let text = category.phrases[category.cursor].clone();
        category.cursor = (category.cursor + 1) % category.phrases.len();

        ActivityPhrase {
            kind: category.kind,
            text,
        }
    }
}
