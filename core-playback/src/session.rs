//! Observable playback state of one view.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Shown in place of a duration that is not known yet.
pub const TIME_PLACEHOLDER: &str = "--:--";

/// Playback state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackStatus {
    /// No source assigned.
    Idle,
    /// Source assigned, waiting for metadata.
    Loading,
    /// Metadata known, paused.
    Ready,
    Playing,
    /// The verse finished. Resolved immediately by the end-of-track policy.
    Ended,
    /// The source failed or playback was refused. Left only by assigning a
    /// new source.
    Error,
}

impl PlaybackStatus {
    /// Returns `true` if a source is attached to the engine.
    pub fn has_source(&self) -> bool {
        matches!(
            self,
            Self::Loading | Self::Ready | Self::Playing | Self::Ended
        )
    }
}

/// Why the current source cannot play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlaybackFault {
    /// Every candidate URL failed to load or decode.
    LoadFailed { url: String, message: String },
    /// The host refused to start playback, e.g. autoplay restrictions.
    Blocked { message: String },
}

impl PlaybackFault {
    /// Message shown to the reader.
    pub fn user_message(&self) -> &'static str {
        match self {
            PlaybackFault::LoadFailed { .. } => "Gagal memuat audio. Silakan coba lagi nanti.",
            PlaybackFault::Blocked { .. } => {
                "Gagal memutar audio. Ketuk tombol putar untuk mencoba lagi."
            }
        }
    }

    /// Technical detail for logs and the error view.
    pub fn details(&self) -> &str {
        match self {
            PlaybackFault::LoadFailed { message, .. } | PlaybackFault::Blocked { message } => {
                message
            }
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, PlaybackFault::Blocked { .. })
    }
}

/// Snapshot of a controller's state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSession {
    pub chapter: u16,
    /// Current track, always within `first_verse..=last_verse`.
    pub verse: u16,
    /// Verses in the chapter.
    pub verse_count: u16,
    /// Playable range. Narrower than `1..=verse_count` for a single-verse player.
    pub first_verse: u16,
    pub last_verse: u16,
    pub status: PlaybackStatus,
    /// Never true while `last_error` is set.
    pub is_playing: bool,
    pub muted: bool,
    /// Stored volume in `0.0..=1.0`. Muting leaves it unchanged.
    pub volume: f32,
    /// Most recent nonzero volume, restored when unmuting at volume 0.
    pub last_audible_volume: f32,
    pub position: Duration,
    /// `None` until metadata arrives.
    pub duration: Option<Duration>,
    pub source_url: Option<String>,
    pub last_error: Option<PlaybackFault>,
}

impl PlaybackSession {
    pub(crate) fn new(chapter: u16, verse_count: u16, volume: f32) -> Self {
        let volume = if volume.is_nan() {
            0.0
        } else {
            volume.clamp(0.0, 1.0)
        };

        Self {
            chapter,
            verse: 1,
            verse_count,
            first_verse: 1,
            last_verse: verse_count,
            status: PlaybackStatus::Idle,
            is_playing: false,
            muted: volume == 0.0,
            volume,
            last_audible_volume: if volume > 0.0 { volume } else { 1.0 },
            position: Duration::ZERO,
            duration: None,
            source_url: None,
            last_error: None,
        }
    }

    /// Restricts navigation to `first..=last` and positions on `first`.
    pub(crate) fn with_range(mut self, first: u16, last: u16) -> Self {
        self.first_verse = first;
        self.last_verse = last;
        self.verse = first;
        self
    }

    /// Level actually sent to the engine.
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }

    pub fn position_label(&self) -> String {
        format_time(self.position)
    }

    /// `--:--` until the duration is known.
    pub fn duration_label(&self) -> String {
        self.duration
            .map(format_time)
            .unwrap_or_else(|| TIME_PLACEHOLDER.to_string())
    }

    pub fn has_previous(&self) -> bool {
        self.verse > self.first_verse
    }

    pub fn has_next(&self) -> bool {
        self.verse < self.last_verse
    }

    /// Whether the play/pause control should be enabled.
    pub fn can_toggle_play(&self) -> bool {
        matches!(
            self.status,
            PlaybackStatus::Loading
                | PlaybackStatus::Ready
                | PlaybackStatus::Playing
                | PlaybackStatus::Ended
        )
    }

    pub fn can_seek(&self) -> bool {
        self.duration.is_some() && self.status.has_source()
    }
}

/// Formats as `MM:SS`. Minutes are not wrapped into hours.
pub fn format_time(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(Duration::ZERO), "00:00");
        assert_eq!(format_time(Duration::from_millis(65_900)), "01:05");
        assert_eq!(format_time(Duration::from_secs(3725)), "62:05");
    }

    #[test]
    fn test_labels_before_metadata() {
        let mut session = PlaybackSession::new(1, 7, 0.7);
        assert_eq!(session.position_label(), "00:00");
        assert_eq!(session.duration_label(), TIME_PLACEHOLDER);
        assert!(!session.can_seek());

        session.status = PlaybackStatus::Ready;
        session.duration = Some(Duration::from_secs(12));
        assert_eq!(session.duration_label(), "00:12");
        assert!(session.can_seek());
    }

    #[test]
    fn test_initial_volume_is_clamped() {
        let session = PlaybackSession::new(1, 7, 3.0);
        assert_eq!(session.volume, 1.0);
        assert!(!session.muted);

        let silent = PlaybackSession::new(1, 7, 0.0);
        assert!(silent.muted);
        assert_eq!(silent.effective_volume(), 0.0);
        assert_eq!(silent.last_audible_volume, 1.0);
    }

    #[test]
    fn test_navigation_bounds() {
        let mut session = PlaybackSession::new(1, 3, 0.7);
        assert!(!session.has_previous());
        assert!(session.has_next());

        session.verse = 3;
        assert!(session.has_previous());
        assert!(!session.has_next());
    }

    #[test]
    fn test_single_verse_range_has_no_neighbors() {
        let session = PlaybackSession::new(103, 3, 0.7).with_range(2, 2);
        assert_eq!(session.verse, 2);
        assert_eq!(session.verse_count, 3);
        assert!(!session.has_previous());
        assert!(!session.has_next());
    }

    #[test]
    fn test_fault_messages_are_distinct() {
        let load = PlaybackFault::LoadFailed {
            url: "https://cdn.example/1.mp3".into(),
            message: "404".into(),
        };
        let blocked = PlaybackFault::Blocked {
            message: "NotAllowedError".into(),
        };

        assert_ne!(load.user_message(), blocked.user_message());
        assert!(blocked.is_blocked());
        assert_eq!(load.details(), "404");
    }
}
