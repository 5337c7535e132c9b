//! The host-facing facade.

use bridge_traits::playback::AudioEngine;
use core_content::{ContentError, ContentProvider, Resource};
use core_playback::PlaybackConfig;
use core_progress::ProgressStore;
use core_runtime::config::CoreConfig;
use core_runtime::events::{CoreEvent, EventBus};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::broadcast::Receiver;
use tracing::{debug, info, instrument};

use crate::error::{CoreError, Result};
use crate::request::RequestTracker;
use crate::session::{ChapterSession, PlayerFactory, VerseSession};
use crate::views::{ChapterListView, ProgressDashboard, Route, VerseView};

/// What a route resolves to.
#[derive(Debug)]
pub enum Screen {
    ChapterList(ChapterListView),
    Chapter(ChapterSession),
    Verse(VerseSession),
    Progress(ProgressDashboard),
}

/// Entry point for hosts: content, progress and playback behind one handle.
///
/// Cloning is cheap; clones share the content provider, the progress store,
/// the event bus and the navigation tracker.
#[derive(Clone)]
pub struct QuranService {
    content: Arc<ContentProvider>,
    progress: ProgressStore,
    events: EventBus,
    requests: RequestTracker,
    players: PlayerFactory,
}

impl QuranService {
    /// Wires a service from validated configuration and the host audio engine.
    pub fn new(config: &CoreConfig, engine: Arc<dyn AudioEngine>) -> Result<Self> {
        config.validate()?;

        let events = EventBus::default();
        let content = ContentProvider::from_config(config).with_event_bus(events.clone());
        let progress = ProgressStore::from_config(config).with_event_bus(events.clone());

        info!(
            primary = %config.primary_source.name,
            fallback = config.fallback_source.as_ref().map(|s| s.name.as_str()).unwrap_or("none"),
            "Quran service initialized"
        );

        Ok(Self::from_parts(content, progress, engine, events))
    }

    /// Assembles a service from prebuilt parts. `events` should be the bus the
    /// parts publish to.
    pub fn from_parts(
        content: ContentProvider,
        progress: ProgressStore,
        engine: Arc<dyn AudioEngine>,
        events: EventBus,
    ) -> Self {
        Self {
            content: Arc::new(content),
            progress,
            players: PlayerFactory::new(engine, events.clone()),
            events,
            requests: RequestTracker::new(),
        }
    }

    /// Overrides the player configuration of the chapter and verse screens.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InitializationFailed`] if either config is invalid.
    pub fn with_playback(mut self, chapter: PlaybackConfig, verse: PlaybackConfig) -> Result<Self> {
        chapter
            .validate()
            .and_then(|_| verse.validate())
            .map_err(CoreError::InitializationFailed)?;

        self.players.chapter = chapter;
        self.players.verse = verse;
        Ok(self)
    }

    /// Overrides the player configuration of whole-chapter recitation.
    pub fn with_full_chapter_playback(mut self, config: PlaybackConfig) -> Result<Self> {
        config.validate().map_err(CoreError::InitializationFailed)?;
        self.players.full_chapter = config;
        Ok(self)
    }

    pub fn content(&self) -> &ContentProvider {
        &self.content
    }

    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.events.subscribe()
    }

    pub fn requests(&self) -> &RequestTracker {
        &self.requests
    }

    // ========================================================================
    // Screens
    // ========================================================================

    #[instrument(skip(self))]
    pub async fn list_chapters(&self) -> Result<ChapterListView> {
        let chapters = self.content.list_chapters().await?;
        let record = self.progress.snapshot().await;
        Ok(ChapterListView::new(&chapters, &record))
    }

    /// Opens a chapter screen with its player loaded at verse 1.
    #[instrument(skip(self))]
    pub async fn open_chapter(&self, chapter_id: u16) -> Result<ChapterSession> {
        let detail = self.content.get_chapter(chapter_id).await?;
        let memorized = self.progress.get_memorized(chapter_id).await;

        let mut player = self.players.chapter_player(&detail)?;
        player.load().await;

        Ok(ChapterSession::new(
            detail,
            memorized,
            self.progress.clone(),
            self.players.clone(),
            player,
        ))
    }

    /// Opens a single-verse screen with its player loaded at that verse and
    /// limited to it.
    #[instrument(skip(self))]
    pub async fn open_verse(&self, chapter_id: u16, verse: u16) -> Result<VerseSession> {
        let resource = Resource::Verse {
            chapter: chapter_id,
            verse,
        };
        let detail = self
            .content
            .get_chapter(chapter_id)
            .await
            .map_err(|err| err.for_resource(resource))?;

        let Some(found) = detail.verse(verse) else {
            return Err(ContentError::VerseNotFound {
                chapter: chapter_id,
                verse,
            }
            .into());
        };

        let memorized = self.progress.is_memorized(chapter_id, verse).await;
        let view = VerseView::new(&detail.chapter, found, memorized);

        let mut player = self.players.verse_player(&detail, verse)?;
        player.load().await;

        Ok(VerseSession::new(view, self.progress.clone(), player))
    }

    /// Resolves a route to a screen.
    ///
    /// Returns `Ok(None)` when another navigation started while this one was
    /// fetching; the stale result is discarded and any player it opened is
    /// released.
    #[instrument(skip(self))]
    pub async fn navigate(&self, route: Route) -> Result<Option<Screen>> {
        let ticket = self.requests.begin();
        let resolved = self.resolve(route).await;

        if self.requests.is_current(ticket) {
            return resolved.map(Some);
        }

        debug!(%route, "Discarding superseded navigation");
        match resolved {
            Ok(Screen::Chapter(session)) => session.close().await,
            Ok(Screen::Verse(session)) => session.close().await,
            _ => {}
        }

        Ok(None)
    }

    async fn resolve(&self, route: Route) -> Result<Screen> {
        Ok(match route {
            Route::ChapterList => Screen::ChapterList(self.list_chapters().await?),
            Route::Chapter { chapter } => Screen::Chapter(self.open_chapter(chapter).await?),
            Route::Verse { chapter, verse } => Screen::Verse(self.open_verse(chapter, verse).await?),
            Route::Progress => Screen::Progress(self.dashboard().await),
        })
    }

    // ========================================================================
    // Progress
    // ========================================================================

    /// Flips one verse and returns the chapter's marks.
    pub async fn toggle_memorized(&self, chapter: u16, verse: u16) -> BTreeSet<u16> {
        self.progress.toggle(chapter, verse).await
    }

    pub async fn set_memorized(&self, chapter: u16, verse: u16, memorized: bool) -> BTreeSet<u16> {
        self.progress.set_memorized(chapter, verse, memorized).await
    }

    pub async fn dashboard(&self) -> ProgressDashboard {
        ProgressDashboard::new(&self.progress.overall_stats().await)
    }
}

/// Service with the desktop HTTP client and SQLite settings store.
#[cfg(feature = "desktop-shims")]
pub fn bootstrap_desktop(engine: Arc<dyn AudioEngine>) -> Result<QuranService> {
    let config = CoreConfig::builder().build()?;
    QuranService::new(&config, engine)
}
