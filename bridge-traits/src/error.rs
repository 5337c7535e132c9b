use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    /// The host refused to start playback, typically an autoplay policy that
    /// requires a user gesture first.
    #[error("Playback rejected by host: {0}")]
    PlaybackRejected(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    pub fn is_playback_rejection(&self) -> bool {
        matches!(self, BridgeError::PlaybackRejected(_))
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
