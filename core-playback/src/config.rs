//! # Playback Configuration
//!
//! Product-mode choices for the verse controller.

use serde::{Deserialize, Serialize};

/// What happens when a verse finishes playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndOfTrackPolicy {
    /// Load the next verse. At the last verse, stop at `Ready` with the
    /// position rewound.
    AutoAdvance,
    /// Rewind to the start of the same verse and stop at `Ready`.
    StopAtEnd,
}

/// What happens when a recitation URL fails to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFallback {
    /// Only the primary URL is tried.
    SingleSource,
    /// Remaining candidate URLs for the same verse are tried in order.
    MultiSource,
}

/// Verse controller configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Default: [`EndOfTrackPolicy::AutoAdvance`].
    #[serde(default = "default_end_of_track")]
    pub end_of_track: EndOfTrackPolicy,

    /// Default: [`SourceFallback::MultiSource`].
    #[serde(default = "default_source_fallback")]
    pub source_fallback: SourceFallback,

    /// Volume applied to the engine before the first source plays.
    ///
    /// Default: 0.7.
    #[serde(default = "default_initial_volume")]
    pub initial_volume: f32,

    /// Whether an auto-advanced verse starts playing once loaded.
    ///
    /// Default: true.
    #[serde(default = "default_resume_on_advance")]
    pub resume_on_advance: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            end_of_track: default_end_of_track(),
            source_fallback: default_source_fallback(),
            initial_volume: default_initial_volume(),
            resume_on_advance: default_resume_on_advance(),
        }
    }
}

impl PlaybackConfig {
    /// Chapter view: verses play one after another.
    pub fn chapter_mode() -> Self {
        Self {
            end_of_track: EndOfTrackPolicy::AutoAdvance,
            ..Default::default()
        }
    }

    /// Single-verse view: the verse plays once and rewinds.
    pub fn verse_mode() -> Self {
        Self {
            end_of_track: EndOfTrackPolicy::StopAtEnd,
            resume_on_advance: false,
            ..Default::default()
        }
    }

    /// Whole-chapter recitation: one long track, every mirror tried in turn.
    pub fn full_chapter_mode() -> Self {
        Self::verse_mode().with_source_fallback(SourceFallback::MultiSource)
    }

    pub fn with_source_fallback(mut self, fallback: SourceFallback) -> Self {
        self.source_fallback = fallback;
        self
    }

    pub fn with_initial_volume(mut self, volume: f32) -> Self {
        self.initial_volume = volume;
        self
    }

    pub fn with_resume_on_advance(mut self, resume: bool) -> Self {
        self.resume_on_advance = resume;
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.initial_volume) {
            return Err("initial_volume must be between 0.0 and 1.0".to_string());
        }

        Ok(())
    }
}

// ============================================================================
// Default Functions (for serde)
// ============================================================================

fn default_end_of_track() -> EndOfTrackPolicy {
    EndOfTrackPolicy::AutoAdvance
}

fn default_source_fallback() -> SourceFallback {
    SourceFallback::MultiSource
}

fn default_initial_volume() -> f32 {
    0.7
}

fn default_resume_on_advance() -> bool {
    true
}
