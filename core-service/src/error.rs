use core_content::ContentError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),

    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    #[error("Progress error: {0}")]
    Progress(#[from] core_progress::ProgressError),

    #[error("Playback error: {0}")]
    Playback(#[from] core_playback::PlaybackError),
}

impl CoreError {
    /// Message shown to the reader.
    pub fn user_message(&self) -> &'static str {
        match self {
            CoreError::Content(err) => err.user_message(),
            CoreError::Progress(_) => "Gagal menyimpan kemajuan hafalan.",
            CoreError::Playback(err) if err.needs_new_source() => {
                "Gagal memuat audio. Silakan coba lagi nanti."
            }
            CoreError::Playback(_) => "Gagal memutar audio. Silakan coba lagi nanti.",
            CoreError::InitializationFailed(_) | CoreError::Runtime(_) => {
                "Aplikasi tidak dapat dimulai."
            }
        }
    }

    /// Technical detail worth showing under the message, if any.
    pub fn details(&self) -> Option<String> {
        match self {
            CoreError::Content(err) => err.details().map(str::to_string),
            other => Some(other.to_string()),
        }
    }

    /// Whether a retry affordance makes sense.
    pub fn is_retryable(&self) -> bool {
        match self {
            CoreError::Content(err) => err.is_retryable(),
            CoreError::Playback(err) => !err.is_invalid_argument(),
            CoreError::Progress(_) => true,
            CoreError::InitializationFailed(_) | CoreError::Runtime(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
