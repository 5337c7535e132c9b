//! Error types for the content provider

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// What a failed call was trying to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resource {
    ChapterList,
    Chapter(u16),
    Verse { chapter: u16, verse: u16 },
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::ChapterList => write!(f, "chapters"),
            Resource::Chapter(id) => write!(f, "chapter/{}", id),
            Resource::Verse { chapter, verse } => write!(f, "verse/{}:{}", chapter, verse),
        }
    }
}

/// Content provider errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentError {
    /// Every configured source failed.
    #[error("Content unavailable ({resource}): {cause}")]
    DataUnavailable { resource: Resource, cause: String },

    /// Chapter id outside 1..=114.
    #[error("Chapter {0} not found")]
    ChapterNotFound(u16),

    #[error("Verse {chapter}:{verse} not found")]
    VerseNotFound { chapter: u16, verse: u16 },
}

/// Result type for content operations
pub type Result<T> = std::result::Result<T, ContentError>;

impl ContentError {
    /// Indonesian message shown to the reader.
    pub fn user_message(&self) -> &'static str {
        match self {
            ContentError::DataUnavailable { resource, .. } => match resource {
                Resource::ChapterList => "Terjadi kesalahan saat memuat data surah.",
                Resource::Chapter(_) => "Terjadi kesalahan saat memuat surah.",
                Resource::Verse { .. } => "Tidak dapat memuat ayat",
            },
            ContentError::ChapterNotFound(_) => "Surah tidak ditemukan.",
            ContentError::VerseNotFound { .. } => "Ayat tidak ditemukan.",
        }
    }

    /// Underlying cause, suitable for an expandable details section.
    pub fn details(&self) -> Option<&str> {
        match self {
            ContentError::DataUnavailable { cause, .. } => Some(cause),
            _ => None,
        }
    }

    /// Whether asking again can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ContentError::DataUnavailable { .. })
    }

    /// Re-tag a data failure with the resource the caller asked for.
    pub fn for_resource(self, resource: Resource) -> Self {
        match self {
            ContentError::DataUnavailable { cause, .. } => {
                ContentError::DataUnavailable { resource, cause }
            }
            other => other,
        }
    }
}

/// Why a single source attempt failed.
#[derive(Error, Debug)]
pub(crate) enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] bridge_traits::BridgeError),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Malformed(String),
}
