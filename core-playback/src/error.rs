//! # Playback Error Types
//!
//! Errors returned when a controller call is rejected. Failures of the audio
//! source itself are not errors of the call; they are recorded on the session
//! as a [`PlaybackFault`](crate::session::PlaybackFault).

use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors that can occur during playback operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// Attempted operation when no source is assigned.
    #[error("No source loaded")]
    NoSourceLoaded,

    /// Requested verse is outside `1..=verse_count`.
    #[error("Verse {verse} out of range (1..={verse_count})")]
    VerseOutOfRange { verse: u16, verse_count: u16 },

    /// Invalid volume value.
    #[error("Invalid volume: {0}")]
    InvalidVolume(f32),

    /// The current source failed; a new source must be assigned first.
    #[error("Audio source failed: {0}")]
    SourceFailed(String),

    /// The host engine returned an error.
    #[error("Audio engine error: {0}")]
    Engine(#[from] BridgeError),
}

impl PlaybackError {
    /// Returns `true` if assigning a fresh source (`retry`, `go_to`) can clear
    /// the condition.
    pub fn needs_new_source(&self) -> bool {
        matches!(
            self,
            PlaybackError::NoSourceLoaded | PlaybackError::SourceFailed(_)
        )
    }

    /// Returns `true` if the error came from the caller's arguments.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            PlaybackError::VerseOutOfRange { .. } | PlaybackError::InvalidVolume(_)
        )
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
