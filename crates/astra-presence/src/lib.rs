//! `astra-presence`: rotating bot presence.
//!
//! Phrases are grouped by activity category. Every tick the
//! [`PresenceScheduler`] moves to the next category (round-robin) and takes
//! that category's next phrase (its own round-robin cursor), then pushes the
//! resulting [`PresenceSpec`] to a [`PresenceSink`].

pub mod activity;
pub mod error;
pub mod rotation;
pub mod scheduler;

pub use activity::{ActivityKind, ActivityPhrase, Availability, PresenceSpec};
pub use error::{PresenceError, Result};
pub use rotation::{PhraseCatalog, RotationSettings, RotationState};
pub use scheduler::{PresenceScheduler, PresenceSink};
