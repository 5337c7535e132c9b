use bridge_traits::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProgressError {
    #[error("Progress storage error: {0}")]
    Storage(#[from] BridgeError),

    /// The stored record is not valid JSON of the expected shape. It is left
    /// untouched so no data is overwritten.
    #[error("Stored progress is corrupt: {0}")]
    Corrupt(String),

    #[error("Failed to serialize progress: {0}")]
    Serialization(String),

    #[error("Invalid verse reference {chapter}:{verse}")]
    InvalidVerse { chapter: u16, verse: u16 },
}

pub type Result<T> = std::result::Result<T, ProgressError>;
