//! # Event Bus System
//!
//! Typed notifications between the core modules and the host, carried over
//! `tokio::sync::broadcast`.
//!
//! ```text
//! ┌──────────────┐   emit   ┌──────────┐  subscribe  ┌──────────────┐
//! │ content      ├─────────>│          ├────────────>│ host UI      │
//! │ progress     ├─────────>│ EventBus │             └──────────────┘
//! │ playback     ├─────────>│          ├────────────>│ analytics    │
//! └──────────────┘          └──────────┘             └──────────────┘
//! ```
//!
//! Emitting with no subscribers is not an error condition for producers; they
//! ignore the returned `SendError`.
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, ProgressEvent};
//!
//! let bus = EventBus::new(16);
//! let mut rx = bus.subscribe();
//! bus.emit(CoreEvent::Progress(ProgressEvent::Reset)).ok();
//! assert!(rx.try_recv().is_ok());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast::{self, error::SendError};

pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
///
/// Subscribers that fall further behind receive `RecvError::Lagged`.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event published on the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    Content(ContentEvent),
    Progress(ProgressEvent),
    Playback(PlaybackEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Content(e) => e.description(),
            CoreEvent::Progress(e) => e.description(),
            CoreEvent::Playback(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Content(ContentEvent::Unavailable { .. }) => EventSeverity::Error,
            CoreEvent::Playback(PlaybackEvent::Error { .. }) => EventSeverity::Error,
            CoreEvent::Content(ContentEvent::FallbackUsed { .. }) => EventSeverity::Warning,
            CoreEvent::Progress(ProgressEvent::StorageCorrupt { .. })
            | CoreEvent::Progress(ProgressEvent::WriteFailed { .. }) => EventSeverity::Warning,
            CoreEvent::Progress(ProgressEvent::VerseMarked { .. }) => EventSeverity::Info,
            CoreEvent::Playback(PlaybackEvent::Started { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Content Events
// ============================================================================

/// Remote content fetch outcomes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum ContentEvent {
    /// Data served by a source.
    Fetched {
        /// Resource path, e.g. `chapters` or `chapter/2`.
        resource: String,
        /// Name of the source that answered.
        source: String,
    },
    /// The primary source failed and the fallback was tried.
    FallbackUsed {
        resource: String,
        primary_error: String,
    },
    /// Both sources failed.
    Unavailable { resource: String, message: String },
}

impl ContentEvent {
    fn description(&self) -> &str {
        match self {
            ContentEvent::Fetched { .. } => "Content fetched",
            ContentEvent::FallbackUsed { .. } => "Fallback content source used",
            ContentEvent::Unavailable { .. } => "Content unavailable",
        }
    }
}

// ============================================================================
// Progress Events
// ============================================================================

/// Memorization record changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum ProgressEvent {
    /// A verse was marked or unmarked.
    VerseMarked {
        chapter: u16,
        verse: u16,
        memorized: bool,
        /// Memorized verses in the chapter after the change.
        chapter_total: usize,
    },
    /// The whole record was cleared.
    Reset,
    /// Stored data could not be parsed and was treated as empty.
    StorageCorrupt { message: String },
    /// Persisting the record failed.
    WriteFailed { message: String },
}

impl ProgressEvent {
    fn description(&self) -> &str {
        match self {
            ProgressEvent::VerseMarked { memorized: true, .. } => "Verse marked memorized",
            ProgressEvent::VerseMarked { .. } => "Verse unmarked",
            ProgressEvent::Reset => "Progress reset",
            ProgressEvent::StorageCorrupt { .. } => "Progress storage corrupt",
            ProgressEvent::WriteFailed { .. } => "Progress write failed",
        }
    }
}

// ============================================================================
// Playback Events
// ============================================================================

/// Recitation playback transitions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// A new source was assigned to the engine.
    SourceLoading {
        chapter: u16,
        verse: u16,
        url: String,
    },
    /// Metadata arrived, duration known.
    Ready {
        chapter: u16,
        verse: u16,
        duration_ms: u64,
    },
    Started { chapter: u16, verse: u16 },
    Paused {
        chapter: u16,
        verse: u16,
        position_ms: u64,
    },
    /// Playback reached the end of the verse.
    Completed { chapter: u16, verse: u16 },
    /// Moved to another verse.
    VerseChanged { chapter: u16, from: u16, to: u16 },
    Seeked { position_ms: u64 },
    /// Volume or mute changed. Level is the effective output in percent.
    VolumeChanged { level_percent: u8, muted: bool },
    Error {
        chapter: u16,
        verse: u16,
        message: String,
        /// Whether `retry` can help.
        recoverable: bool,
    },
    /// Session torn down.
    Released,
}

impl PlaybackEvent {
    fn description(&self) -> &str {
        match self {
            PlaybackEvent::SourceLoading { .. } => "Loading recitation",
            PlaybackEvent::Ready { .. } => "Recitation ready",
            PlaybackEvent::Started { .. } => "Playback started",
            PlaybackEvent::Paused { .. } => "Playback paused",
            PlaybackEvent::Completed { .. } => "Verse completed",
            PlaybackEvent::VerseChanged { .. } => "Verse changed",
            PlaybackEvent::Seeked { .. } => "Playback position changed",
            PlaybackEvent::VolumeChanged { .. } => "Volume changed",
            PlaybackEvent::Error { .. } => "Playback error",
            PlaybackEvent::Released => "Playback released",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Cloning the bus yields another producer on the same channel. Each
/// `subscribe()` call creates an independent receiver that sees events
/// emitted after it was created.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an error
    /// when nobody is listening.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber to receive events.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
