//! Per-screen state owned by the host while a chapter or verse is open.

use bridge_traits::playback::AudioEngine;
use core_content::{Chapter, ChapterDetail, ContentError};
use core_playback::{PlaybackConfig, Playlist, VerseController};
use core_progress::ProgressStore;
use core_runtime::events::EventBus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use tracing::info;

use crate::error::Result;
use crate::views::{ChapterDetailView, PlayerView, VerseFilter, VerseView};

/// Builds the players of each screen over the shared engine.
#[derive(Clone)]
pub(crate) struct PlayerFactory {
    pub(crate) engine: Arc<dyn AudioEngine>,
    pub(crate) events: EventBus,
    pub(crate) chapter: PlaybackConfig,
    pub(crate) verse: PlaybackConfig,
    pub(crate) full_chapter: PlaybackConfig,
}

impl PlayerFactory {
    pub(crate) fn new(engine: Arc<dyn AudioEngine>, events: EventBus) -> Self {
        Self {
            engine,
            events,
            chapter: PlaybackConfig::chapter_mode(),
            verse: PlaybackConfig::verse_mode(),
            full_chapter: PlaybackConfig::full_chapter_mode(),
        }
    }

    fn build(&self, playlist: Playlist, config: &PlaybackConfig) -> Result<VerseController> {
        Ok(
            VerseController::new(Arc::clone(&self.engine), playlist, config.clone())?
                .with_event_bus(self.events.clone()),
        )
    }

    /// Every verse of the chapter, auto-advancing.
    pub(crate) fn chapter_player(&self, detail: &ChapterDetail) -> Result<VerseController> {
        self.build(Playlist::verses(detail), &self.chapter)
    }

    /// Only `verse`; moving elsewhere is a navigation, not a player action.
    pub(crate) fn verse_player(&self, detail: &ChapterDetail, verse: u16) -> Result<VerseController> {
        let playlist = Playlist::single_verse(detail, verse).ok_or(ContentError::VerseNotFound {
            chapter: detail.chapter.id,
            verse,
        })?;
        self.build(playlist, &self.verse)
    }

    /// The chapter's full recitation with its mirrors as fallbacks.
    pub(crate) fn full_chapter_player(&self, chapter: &Chapter) -> Result<VerseController> {
        self.build(Playlist::full_chapter(chapter), &self.full_chapter)
    }
}

/// What the chapter screen's player is playing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioMode {
    /// One track per verse.
    #[default]
    Verses,
    /// The whole chapter as one recitation.
    FullChapter,
}

/// An open chapter screen: verses, memorization marks and the player.
///
/// Call [`close`](Self::close) when navigating away so the audio stops.
pub struct ChapterSession {
    detail: ChapterDetail,
    memorized: BTreeSet<u16>,
    filter: VerseFilter,
    progress: ProgressStore,
    players: PlayerFactory,
    player: VerseController,
    audio_mode: AudioMode,
}

impl ChapterSession {
    pub(crate) fn new(
        detail: ChapterDetail,
        memorized: BTreeSet<u16>,
        progress: ProgressStore,
        players: PlayerFactory,
        player: VerseController,
    ) -> Self {
        Self {
            detail,
            memorized,
            filter: VerseFilter::default(),
            progress,
            players,
            player,
            audio_mode: AudioMode::Verses,
        }
    }

    pub fn detail(&self) -> &ChapterDetail {
        &self.detail
    }

    pub fn memorized(&self) -> &BTreeSet<u16> {
        &self.memorized
    }

    pub fn filter(&self) -> VerseFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: VerseFilter) {
        self.filter = filter;
    }

    pub fn view(&self) -> ChapterDetailView {
        ChapterDetailView::new(&self.detail, &self.memorized, self.filter)
    }

    pub fn player(&self) -> &VerseController {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut VerseController {
        &mut self.player
    }

    pub fn player_view(&self) -> PlayerView {
        PlayerView::from(self.player.session())
    }

    pub fn audio_mode(&self) -> AudioMode {
        self.audio_mode
    }

    /// Switches the player to the whole-chapter recitation and starts it.
    ///
    /// The verse player is released first. Mirrors of the recitation are
    /// tried in order if the primary URL fails.
    pub async fn play_full_chapter(&mut self) -> Result<()> {
        if self.audio_mode != AudioMode::FullChapter {
            let player = self.players.full_chapter_player(&self.detail.chapter)?;
            self.replace_player(player, AudioMode::FullChapter).await;
        }
        self.player.play().await?;
        Ok(())
    }

    /// Switches back to per-verse playback, loaded at verse 1 and paused.
    pub async fn play_verses(&mut self) -> Result<()> {
        if self.audio_mode != AudioMode::Verses {
            let player = self.players.chapter_player(&self.detail)?;
            self.replace_player(player, AudioMode::Verses).await;
        }
        Ok(())
    }

    async fn replace_player(&mut self, player: VerseController, mode: AudioMode) {
        self.player.release().await;
        self.player = player.starting_after(self.player.current_token());
        self.player.load().await;
        self.audio_mode = mode;
        info!(chapter = self.detail.chapter.id, ?mode, "Switched chapter audio");
    }

    /// Flips the mark on `verse` and returns its new state.
    ///
    /// # Errors
    ///
    /// Fails for verses outside the chapter or when the mark cannot be
    /// persisted. The displayed marks are unchanged in both cases.
    pub async fn toggle_memorized(&mut self, verse: u16) -> Result<bool> {
        let chapter = self.detail.chapter.id;
        if self.detail.verse(verse).is_none() {
            return Err(ContentError::VerseNotFound { chapter, verse }.into());
        }

        let memorized = !self.memorized.contains(&verse);
        self.memorized = self
            .progress
            .try_set_memorized(chapter, verse, memorized)
            .await?;

        Ok(memorized)
    }

    /// Re-reads the marks from storage.
    pub async fn refresh(&mut self) {
        self.memorized = self.progress.get_memorized(self.detail.chapter.id).await;
    }

    /// Releases the player.
    pub async fn close(mut self) {
        info!(chapter = self.detail.chapter.id, "Closing chapter");
        self.player.release().await;
    }
}

impl fmt::Debug for ChapterSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChapterSession")
            .field("chapter", &self.detail.chapter.id)
            .field("memorized", &self.memorized)
            .field("filter", &self.filter)
            .field("audio_mode", &self.audio_mode)
            .field("player", self.player.session())
            .finish_non_exhaustive()
    }
}

/// An open single-verse screen.
///
/// The player is pinned to the shown verse. Neighbors are reached through
/// the view's navigation links, which open a new screen.
pub struct VerseSession {
    view: VerseView,
    progress: ProgressStore,
    player: VerseController,
}

impl VerseSession {
    pub(crate) fn new(view: VerseView, progress: ProgressStore, player: VerseController) -> Self {
        Self {
            view,
            progress,
            player,
        }
    }

    pub fn view(&self) -> &VerseView {
        &self.view
    }

    pub fn player(&self) -> &VerseController {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut VerseController {
        &mut self.player
    }

    pub fn player_view(&self) -> PlayerView {
        PlayerView::from(self.player.session())
    }

    /// Flips the mark on this verse and returns its new state.
    pub async fn toggle_memorized(&mut self) -> Result<bool> {
        let memorized = !self.view.memorized;
        let verses = self
            .progress
            .try_set_memorized(self.view.chapter_id, self.view.number, memorized)
            .await?;

        self.view.memorized = verses.contains(&self.view.number);
        Ok(self.view.memorized)
    }

    pub async fn close(mut self) {
        info!(
            chapter = self.view.chapter_id,
            verse = self.view.number,
            "Closing verse"
        );
        self.player.release().await;
    }
}

impl fmt::Debug for VerseSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerseSession")
            .field("view", &self.view)
            .field("player", self.player.session())
            .finish_non_exhaustive()
    }
}
