//! Core service facade and view models.
//!
//! [`QuranService`] wires the content provider, the progress store and the
//! host audio engine together and resolves [`Route`]s into screens. Desktop
//! hosts typically enable the `desktop-shims` feature and call
//! [`bootstrap_desktop`]; other hosts build a [`CoreConfig`] with their own
//! bridges and call [`QuranService::new`].
//!
//! ```ignore
//! let service = core_service::bootstrap_desktop(engine)?;
//! let mut chapter = service.open_chapter(112).await?;
//!
//! chapter.toggle_memorized(2).await?;
//! println!("{}", chapter.view().progress_label()); // 1/4 ayat dihafalkan (25.0%)
//!
//! chapter.player_mut().play().await?;
//! // ...forward host audio callbacks:
//! // chapter.player_mut().handle_event(event).await;
//! chapter.close().await;
//! ```
//!
//! [`CoreConfig`]: core_runtime::config::CoreConfig

pub mod error;
pub mod request;
pub mod service;
pub mod session;
pub mod views;

pub use error::{CoreError, Result};
pub use request::{RequestTicket, RequestTracker};
#[cfg(feature = "desktop-shims")]
pub use service::bootstrap_desktop;
pub use service::{QuranService, Screen};
pub use session::{AudioMode, ChapterSession, VerseSession};
pub use views::{
    ChapterDetailView, ChapterListItem, ChapterListView, ErrorView, NavLink, PlayerView,
    ProgressDashboard, Route, TabView, VerseFilter, VerseRow, VerseView,
};

pub use core_content::{Chapter, ChapterDetail, ContentError, Verse};
pub use core_playback::{PlaybackConfig, PlaybackStatus, VerseController};
pub use core_runtime::config::{CoreConfig, CoreConfigBuilder};
pub use core_runtime::events::{CoreEvent, EventBus};
