use thiserror::Error;

#[derive(Debug, Error)]
pub enum PresenceError {
    /// The platform client refused or could not deliver the update.
    #[error("presence update failed: {0}")]
    Push(String),
}

pub type Result<T> = std::result::Result<T, PresenceError>;
