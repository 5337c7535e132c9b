//! # Content Provider
//!
//! Fetches chapter (surah) and verse (ayah) data from public JSON sources and
//! normalizes it into one model regardless of which source answered.
//!
//! ## Sources
//!
//! Two wire schemas are understood (see [`core_runtime::config::SourceKind`]):
//! - alquran.cloud: English field names, separate Arabic and translation editions
//! - equran.id: Indonesian field names, Arabic + Latin + Indonesian in one payload
//!
//! Every call tries the primary source once and, on any failure, the fallback
//! source once. There is no backoff and no caching between calls.
//!
//! ## Example
//!
//! ```ignore
//! use core_content::ContentProvider;
//!
//! let provider = ContentProvider::from_config(&config);
//! let chapters = provider.list_chapters().await?;
//! let al_baqarah = provider.get_chapter(2).await?;
//! let kursi = provider.get_verse(2, 255).await?;
//! ```

pub mod audio;
pub mod error;
pub mod model;
pub mod provider;
pub mod types;

pub use audio::AudioResolver;
pub use error::{ContentError, Resource, Result};
pub use model::{
    AudioCandidates, Chapter, ChapterDetail, Revelation, Verse, CHAPTER_COUNT, TOTAL_VERSES,
};
pub use provider::ContentProvider;
