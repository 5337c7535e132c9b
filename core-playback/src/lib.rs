//! # Verse Playback Module
//!
//! Drives recitation audio for a chapter view or a single-verse view.
//!
//! ## Overview
//!
//! This module handles:
//! - Sequential verse navigation bounded by the chapter's verse count
//! - The playback state machine on top of a host [`AudioEngine`]
//! - Falling back to alternative recitation URLs when a source fails to load
//! - Volume and mute bookkeeping
//!
//! The host owns the audio element. [`VerseController`] issues commands to it
//! and consumes the [`EngineEvent`]s it reports back.
//!
//! ```text
//!            assign source                metadata
//!   Idle ───────────────────▶ Loading ───────────────▶ Ready ◀──────▶ Playing
//!                              │  ▲                      ▲  play/pause   │
//!                       failed │  │ next verse           │               │ ended
//!                              ▼  │                      │               ▼
//!                             Error               (stop at end) ◀──── Ended
//! ```
//!
//! [`AudioEngine`]: bridge_traits::AudioEngine
//! [`EngineEvent`]: bridge_traits::EngineEvent

pub mod config;
pub mod controller;
pub mod error;
pub mod playlist;
pub mod session;

pub use config::{EndOfTrackPolicy, PlaybackConfig, SourceFallback};
pub use controller::VerseController;
pub use error::{PlaybackError, Result};
pub use playlist::{Playlist, Track};
pub use session::{format_time, PlaybackFault, PlaybackSession, PlaybackStatus, TIME_PLACEHOLDER};
