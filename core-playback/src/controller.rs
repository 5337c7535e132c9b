//! # Verse Controller
//!
//! State machine coupling verse navigation to a host [`AudioEngine`].
//!
//! ## Threading Model
//!
//! Every method takes `&mut self`. The owning view serializes user actions and
//! engine callbacks into one sequence of calls; nothing here spawns tasks.
//!
//! ## Source tokens
//!
//! Each source assignment bumps a [`SourceToken`] and passes it to
//! [`AudioEngine::load`]. The host stamps every [`EngineEvent`] with the token
//! of the source that produced it, and [`VerseController::handle_event`] drops
//! events whose token is not the current one. A late `Ended` from a verse the
//! reader already navigated away from therefore cannot advance the new verse.

use bridge_traits::playback::{AudioEngine, EngineEvent, SourceToken};
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::config::{EndOfTrackPolicy, PlaybackConfig, SourceFallback};
use crate::error::{PlaybackError, Result};
use crate::playlist::Playlist;
use crate::session::{PlaybackFault, PlaybackSession, PlaybackStatus};

/// Playback controller for one view.
///
/// Call [`release`](Self::release) when the view goes away. Dropping the
/// controller does not stop the host engine.
pub struct VerseController {
    engine: Arc<dyn AudioEngine>,
    playlist: Playlist,
    config: PlaybackConfig,
    session: PlaybackSession,
    token: SourceToken,
    /// Index into the current track's candidate URLs.
    candidate: usize,
    /// Play requested while the source was still loading.
    pending_play: bool,
    events: Option<EventBus>,
}

impl VerseController {
    /// Creates an idle controller positioned at the playlist's first track.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::VerseOutOfRange`] if `playlist` is empty.
    pub fn new(
        engine: Arc<dyn AudioEngine>,
        playlist: Playlist,
        config: PlaybackConfig,
    ) -> Result<Self> {
        let (Some(first), Some(last)) = (playlist.first(), playlist.last()) else {
            return Err(PlaybackError::VerseOutOfRange {
                verse: 1,
                verse_count: 0,
            });
        };

        let session =
            PlaybackSession::new(playlist.chapter(), playlist.verse_count(), config.initial_volume)
                .with_range(first, last);

        debug!(
            chapter = playlist.chapter(),
            tracks = playlist.len(),
            policy = ?config.end_of_track,
            "Creating verse controller"
        );

        Ok(Self {
            engine,
            playlist,
            config,
            session,
            token: SourceToken::NONE,
            candidate: 0,
            pending_play: false,
            events: None,
        })
    }

    /// Continues token numbering after `token`. Use when this controller
    /// replaces another on the same engine so late events addressed to the
    /// old one never match.
    pub fn starting_after(mut self, token: SourceToken) -> Self {
        self.token = token;
        self
    }

    pub fn with_event_bus(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn status(&self) -> PlaybackStatus {
        self.session.status
    }

    pub fn current_verse(&self) -> u16 {
        self.session.verse
    }

    pub fn verse_count(&self) -> u16 {
        self.playlist.verse_count()
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Token of the live source. Engine events must carry it to be applied.
    pub fn current_token(&self) -> SourceToken {
        self.token
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Assigns the source of the current verse. Called when the view opens.
    pub async fn load(&mut self) {
        let verse = self.session.verse;
        self.assign(verse, false).await;
    }

    /// Moves to `verse` and assigns its source.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::VerseOutOfRange`] unless `1 <= verse <= verse_count`.
    /// The controller is left untouched in that case.
    #[instrument(skip(self), fields(chapter = self.session.chapter))]
    pub async fn go_to(&mut self, verse: u16) -> Result<()> {
        if !self.playlist.contains(verse) {
            return Err(PlaybackError::VerseOutOfRange {
                verse,
                verse_count: self.playlist.verse_count(),
            });
        }

        self.change_verse(verse, false).await;
        Ok(())
    }

    /// Moves one verse forward. Returns `false` without side effects at the
    /// last verse.
    pub async fn next(&mut self) -> bool {
        match self.session.verse.checked_add(1) {
            Some(target) if self.playlist.contains(target) => {
                self.change_verse(target, false).await;
                true
            }
            _ => {
                debug!(verse = self.session.verse, "Already at last verse");
                false
            }
        }
    }

    /// Moves one verse back. Returns `false` without side effects at verse 1.
    pub async fn previous(&mut self) -> bool {
        match self.session.verse.checked_sub(1) {
            Some(target) if self.playlist.contains(target) => {
                self.change_verse(target, false).await;
                true
            }
            _ => {
                debug!(verse = self.session.verse, "Already at first verse");
                false
            }
        }
    }

    /// Reassigns the current verse starting again from its primary URL.
    #[instrument(skip(self), fields(chapter = self.session.chapter, verse = self.session.verse))]
    pub async fn retry(&mut self) {
        info!("Retrying recitation source");
        let verse = self.session.verse;
        self.assign(verse, false).await;
    }

    // ========================================================================
    // Transport
    // ========================================================================

    /// Starts playback.
    ///
    /// While the source is loading the request is queued and honored once
    /// metadata arrives. A refusal by the host moves the session to
    /// [`PlaybackStatus::Error`] with [`PlaybackFault::Blocked`].
    ///
    /// # Errors
    ///
    /// - [`PlaybackError::NoSourceLoaded`] when idle
    /// - [`PlaybackError::SourceFailed`] when the session is in error
    pub async fn play(&mut self) -> Result<()> {
        match self.session.status {
            PlaybackStatus::Idle => Err(PlaybackError::NoSourceLoaded),
            PlaybackStatus::Error => Err(self.source_failed()),
            PlaybackStatus::Loading => {
                debug!(verse = self.session.verse, "Queueing play until source is ready");
                self.pending_play = true;
                Ok(())
            }
            PlaybackStatus::Playing => Ok(()),
            PlaybackStatus::Ready | PlaybackStatus::Ended => {
                self.start_playback().await;
                Ok(())
            }
        }
    }

    /// Pauses playback, or cancels a queued play while loading.
    pub async fn pause(&mut self) -> Result<()> {
        match self.session.status {
            PlaybackStatus::Playing => {
                self.engine.pause().await?;
                self.session.status = PlaybackStatus::Ready;
                self.session.is_playing = false;
                self.emit(PlaybackEvent::Paused {
                    chapter: self.session.chapter,
                    verse: self.session.verse,
                    position_ms: millis(self.session.position),
                });
                Ok(())
            }
            PlaybackStatus::Loading => {
                self.pending_play = false;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    pub async fn toggle_play(&mut self) -> Result<()> {
        let wants_pause = self.session.is_playing
            || (self.session.status == PlaybackStatus::Loading && self.pending_play);

        if wants_pause {
            self.pause().await
        } else {
            self.play().await
        }
    }

    /// Moves the playhead. The target is clamped to the known duration and
    /// mirrored into the session immediately. Does not start or stop playback.
    ///
    /// # Errors
    ///
    /// Rejected when idle or in error.
    pub async fn seek(&mut self, position: Duration) -> Result<()> {
        match self.session.status {
            PlaybackStatus::Idle => return Err(PlaybackError::NoSourceLoaded),
            PlaybackStatus::Error => return Err(self.source_failed()),
            _ => {}
        }

        let target = match self.session.duration {
            Some(duration) => position.min(duration),
            None => position,
        };

        self.engine.seek(target).await?;
        self.session.position = target;
        self.emit(PlaybackEvent::Seeked {
            position_ms: millis(target),
        });

        Ok(())
    }

    // ========================================================================
    // Volume
    // ========================================================================

    /// Sets the stored volume, clamped to `0.0..=1.0`.
    ///
    /// Zero mutes. Any other level unmutes and becomes the level restored by a
    /// later unmute.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::InvalidVolume`] for NaN.
    pub async fn set_volume(&mut self, level: f32) -> Result<()> {
        if level.is_nan() {
            return Err(PlaybackError::InvalidVolume(level));
        }

        let volume = level.clamp(0.0, 1.0);
        let muted = volume == 0.0;

        self.apply_volume(volume, muted).await?;
        if !muted {
            self.session.last_audible_volume = volume;
        }

        Ok(())
    }

    /// Mutes or unmutes without touching the stored volume, except that
    /// unmuting at volume 0 restores the last audible level.
    pub async fn set_muted(&mut self, muted: bool) -> Result<()> {
        let volume = if !muted && self.session.volume == 0.0 {
            self.session.last_audible_volume
        } else {
            self.session.volume
        };

        self.apply_volume(volume, muted).await
    }

    pub async fn toggle_mute(&mut self) -> Result<()> {
        self.set_muted(!self.session.muted).await
    }

    // ========================================================================
    // Engine callbacks
    // ========================================================================

    /// Applies one host notification. Returns `false` if the event was
    /// ignored because it belongs to a replaced source or the session is idle
    /// or in error.
    pub async fn handle_event(&mut self, event: EngineEvent) -> bool {
        if event.token() != self.token {
            debug!(
                event_token = %event.token(),
                current = %self.token,
                "Ignoring engine event from replaced source"
            );
            return false;
        }

        if matches!(
            self.session.status,
            PlaybackStatus::Idle | PlaybackStatus::Error
        ) {
            debug!(status = ?self.session.status, "Ignoring engine event");
            return false;
        }

        match event {
            EngineEvent::MetadataLoaded { duration, .. } => self.on_metadata(duration).await,
            EngineEvent::TimeUpdate { position, .. } => self.session.position = position,
            EngineEvent::Ended { .. } => self.on_ended().await,
            EngineEvent::Failed { message, .. } => self.on_failed(message).await,
        }

        true
    }

    /// Stops playback and detaches the source. Required on view teardown.
    /// Events from the released source are ignored afterwards.
    #[instrument(skip(self), fields(chapter = self.session.chapter))]
    pub async fn release(&mut self) {
        if self.session.status != PlaybackStatus::Idle {
            if let Err(err) = self.engine.pause().await {
                warn!(error = %err, "Failed to pause engine during release");
            }
            if let Err(err) = self.engine.unload().await {
                warn!(error = %err, "Failed to unload engine source");
            }
        }

        self.token = self.token.next();
        self.candidate = 0;
        self.pending_play = false;
        self.session.status = PlaybackStatus::Idle;
        self.session.is_playing = false;
        self.session.position = Duration::ZERO;
        self.session.duration = None;
        self.session.source_url = None;
        self.session.last_error = None;

        info!("Playback released");
        self.emit(PlaybackEvent::Released);
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    async fn on_metadata(&mut self, duration: Duration) {
        self.session.duration = Some(duration);

        if self.session.status != PlaybackStatus::Loading {
            return;
        }

        self.session.status = PlaybackStatus::Ready;
        debug!(verse = self.session.verse, ?duration, "Source ready");
        self.emit(PlaybackEvent::Ready {
            chapter: self.session.chapter,
            verse: self.session.verse,
            duration_ms: millis(duration),
        });

        if std::mem::take(&mut self.pending_play) {
            self.start_playback().await;
        }
    }

    async fn on_ended(&mut self) {
        if self.session.status == PlaybackStatus::Loading {
            return;
        }

        let verse = self.session.verse;
        self.session.status = PlaybackStatus::Ended;
        self.session.is_playing = false;
        debug!(verse, "Verse finished");
        self.emit(PlaybackEvent::Completed {
            chapter: self.session.chapter,
            verse,
        });

        let next = verse
            .checked_add(1)
            .filter(|next| self.playlist.contains(*next));

        match (self.config.end_of_track, next) {
            (EndOfTrackPolicy::AutoAdvance, Some(next)) => {
                self.change_verse(next, self.config.resume_on_advance).await;
            }
            _ => self.rewind().await,
        }
    }

    async fn on_failed(&mut self, message: String) {
        let resume = self.session.is_playing || self.pending_play;
        let url = self.session.source_url.clone().unwrap_or_default();

        warn!(verse = self.session.verse, %url, %message, "Recitation source failed");

        if self.advance_candidate() {
            info!(
                verse = self.session.verse,
                candidate = self.candidate,
                "Trying alternative recitation source"
            );
            self.pause_live_source().await;
            self.session.is_playing = false;
            self.pending_play = resume;
            self.load_candidate().await;
        } else {
            self.fail(PlaybackFault::LoadFailed { url, message });
        }
    }

    async fn change_verse(&mut self, to: u16, autoplay: bool) {
        let from = self.session.verse;
        if from != to {
            self.emit(PlaybackEvent::VerseChanged {
                chapter: self.session.chapter,
                from,
                to,
            });
        }
        self.assign(to, autoplay).await;
    }

    /// Pauses whatever is live, then loads the primary URL of `verse`.
    async fn assign(&mut self, verse: u16, autoplay: bool) {
        self.pause_live_source().await;

        self.session.is_playing = false;
        self.session.verse = verse;
        self.candidate = 0;
        self.pending_play = autoplay;

        if let Err(err) = self.engine.set_volume(self.session.effective_volume()).await {
            warn!(error = %err, "Failed to apply volume");
        }

        self.load_candidate().await;
    }

    /// Pauses the live source, if any, ahead of a swap.
    async fn pause_live_source(&mut self) {
        if self.session.status != PlaybackStatus::Idle {
            if let Err(err) = self.engine.pause().await {
                warn!(error = %err, "Failed to pause previous source");
            }
        }
    }

    /// Loads the current candidate URL, moving through the remaining
    /// candidates while the engine rejects them outright.
    async fn load_candidate(&mut self) {
        loop {
            let verse = self.session.verse;
            let url = self
                .playlist
                .track(verse)
                .and_then(|track| track.sources.get(self.candidate))
                .map(str::to_string);

            self.token = self.token.next();
            self.session.status = PlaybackStatus::Loading;
            self.session.is_playing = false;
            self.session.position = Duration::ZERO;
            self.session.duration = None;
            self.session.last_error = None;
            self.session.source_url = url.clone();

            let Some(url) = url else {
                self.fail(PlaybackFault::LoadFailed {
                    url: String::new(),
                    message: format!("no recitation source for verse {verse}"),
                });
                return;
            };

            debug!(verse, token = %self.token, %url, "Assigning source");
            self.emit(PlaybackEvent::SourceLoading {
                chapter: self.session.chapter,
                verse,
                url: url.clone(),
            });

            match self.engine.load(self.token, &url).await {
                Ok(()) => return,
                Err(err) => {
                    warn!(verse, %url, error = %err, "Engine rejected source");
                    if !self.advance_candidate() {
                        self.fail(PlaybackFault::LoadFailed {
                            url,
                            message: err.to_string(),
                        });
                        return;
                    }
                }
            }
        }
    }

    async fn start_playback(&mut self) {
        match self.engine.play().await {
            Ok(()) => {
                self.session.status = PlaybackStatus::Playing;
                self.session.is_playing = true;
                info!(chapter = self.session.chapter, verse = self.session.verse, "Playback started");
                self.emit(PlaybackEvent::Started {
                    chapter: self.session.chapter,
                    verse: self.session.verse,
                });
            }
            Err(err) if err.is_playback_rejection() => {
                self.fail(PlaybackFault::Blocked {
                    message: err.to_string(),
                });
            }
            Err(err) => {
                let url = self.session.source_url.clone().unwrap_or_default();
                self.fail(PlaybackFault::LoadFailed {
                    url,
                    message: err.to_string(),
                });
            }
        }
    }

    async fn rewind(&mut self) {
        if let Err(err) = self.engine.seek(Duration::ZERO).await {
            warn!(error = %err, "Failed to rewind source");
        }
        self.session.position = Duration::ZERO;
        self.session.status = PlaybackStatus::Ready;
    }

    async fn apply_volume(&mut self, volume: f32, muted: bool) -> Result<()> {
        let effective = if muted { 0.0 } else { volume };
        self.engine.set_volume(effective).await?;

        self.session.volume = volume;
        self.session.muted = muted;
        self.emit(PlaybackEvent::VolumeChanged {
            level_percent: (effective * 100.0).round() as u8,
            muted,
        });

        Ok(())
    }

    fn advance_candidate(&mut self) -> bool {
        if self.config.source_fallback != SourceFallback::MultiSource {
            return false;
        }

        let available = self
            .playlist
            .track(self.session.verse)
            .map_or(0, |track| track.sources.len());

        if self.candidate + 1 < available {
            self.candidate += 1;
            true
        } else {
            false
        }
    }

    fn fail(&mut self, fault: PlaybackFault) {
        warn!(
            chapter = self.session.chapter,
            verse = self.session.verse,
            details = fault.details(),
            "Playback failed"
        );

        self.session.status = PlaybackStatus::Error;
        self.session.is_playing = false;
        self.pending_play = false;
        self.emit(PlaybackEvent::Error {
            chapter: self.session.chapter,
            verse: self.session.verse,
            message: fault.user_message().to_string(),
            recoverable: true,
        });
        self.session.last_error = Some(fault);
    }

    fn source_failed(&self) -> PlaybackError {
        PlaybackError::SourceFailed(
            self.session
                .last_error
                .as_ref()
                .map(|fault| fault.details().to_string())
                .unwrap_or_default(),
        )
    }

    fn emit(&self, event: PlaybackEvent) {
        if let Some(bus) = &self.events {
            let _ = bus.emit(CoreEvent::Playback(event));
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
