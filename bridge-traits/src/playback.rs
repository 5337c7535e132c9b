//! Audio engine bridge.
//!
//! The host owns the actual audio element. The core drives it through
//! [`AudioEngine`] and the host reports what happened back as
//! [`EngineEvent`]s, each stamped with the [`SourceToken`] of the source that
//! produced it. A token identifies one `load` call; events carrying an older
//! token belong to a source that has since been replaced and are dropped by
//! the core.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::Result;

/// Identifier of one source assignment on an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceToken(u64);

impl SourceToken {
    /// Token used before any source was assigned.
    pub const NONE: SourceToken = SourceToken(0);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> u64 {
        self.0
    }

    /// The token that follows this one.
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for SourceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "src#{}", self.0)
    }
}

/// Notifications raised by the host audio element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    /// Enough of the source is known to report its duration.
    MetadataLoaded {
        token: SourceToken,
        duration: Duration,
    },
    /// Periodic position report while playing.
    TimeUpdate {
        token: SourceToken,
        position: Duration,
    },
    /// Playback reached the end of the source naturally.
    Ended { token: SourceToken },
    /// The source could not be fetched or decoded.
    Failed { token: SourceToken, message: String },
}

impl EngineEvent {
    pub fn token(&self) -> SourceToken {
        match self {
            EngineEvent::MetadataLoaded { token, .. }
            | EngineEvent::TimeUpdate { token, .. }
            | EngineEvent::Ended { token }
            | EngineEvent::Failed { token, .. } => *token,
        }
    }
}

/// Host audio element.
///
/// Exactly one source is live at a time. Calling [`AudioEngine::load`]
/// replaces whatever was loaded before.
///
/// # Example
///
/// ```ignore
/// engine.pause().await?;
/// engine.load(token, "https://cdn.example/audio/1/1.mp3").await?;
/// // ...host later reports EngineEvent::MetadataLoaded { token, duration }
/// engine.play().await?;
/// ```
#[async_trait]
pub trait AudioEngine: Send + Sync {
    /// Assign a new source. Completion is reported asynchronously through
    /// `MetadataLoaded` or `Failed` carrying `token`.
    async fn load(&self, token: SourceToken, url: &str) -> Result<()>;

    /// Start or resume playback.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::PlaybackRejected`](crate::BridgeError::PlaybackRejected)
    /// when the host refuses to start, e.g. autoplay restrictions.
    async fn play(&self) -> Result<()>;

    async fn pause(&self) -> Result<()>;

    async fn seek(&self, position: Duration) -> Result<()>;

    /// Output level in `0.0..=1.0`, already accounting for mute.
    async fn set_volume(&self, level: f32) -> Result<()>;

    /// Drop the current source and release host resources.
    async fn unload(&self) -> Result<()>;
}
