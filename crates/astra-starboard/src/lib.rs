//! `astra-starboard`: relays highly-starred messages into a starboard channel.
//!
//! # Pipeline
//!
//! A [`ReactionEvent`] enters [`Starboard::handle_reaction`], which filters
//! bot actors and foreign emoji, resolves the partial message through the
//! [`StarboardPlatform`], compares the star count to the threshold, and claims
//! the message in the [`ForwardLedger`]. The claimed message is rendered into a
//! [`StarboardPost`] (accent color from the author's avatar via a
//! [`ColorSource`]) and sent. Only a successful send turns the claim into a
//! permanent forward record.
//!
//! The ledger lives for the process lifetime. A restart forgets every record,
//! so a message can be forwarded again afterwards.

pub mod color;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod platform;
pub mod render;
pub mod types;

pub use color::{AvatarColorExtractor, ColorSource, HexColor};
pub use engine::{ReactionOutcome, Starboard, StarboardSettings};
pub use error::{Result, StarboardError};
pub use ledger::{ForwardClaim, ForwardLedger};
pub use platform::{ChannelInfo, StarboardPlatform};
pub use render::StarboardPost;
pub use types::{
    Attachment, Author, MediaKind, MessageRef, ReactionCount, ReactionEvent, SourceMessage,
};
