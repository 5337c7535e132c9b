//! # Progress Store
//!
//! Persists which verses the reader has memorized.
//!
//! The whole record lives under one key of the host [`SettingsStore`] as a JSON
//! object mapping chapter number to the list of memorized verse numbers:
//!
//! ```json
//! {"1": [1, 2, 3], "112": [1, 2, 3, 4]}
//! ```
//!
//! This is the same layout the browser build has always written to
//! `localStorage`, so existing records load unchanged.
//!
//! [`SettingsStore`]: bridge_traits::storage::SettingsStore

pub mod error;
pub mod memory;
pub mod stats;
pub mod store;

pub use error::{ProgressError, Result};
pub use memory::MemorySettingsStore;
pub use stats::{ChapterProgress, ProgressStats, StartedChapterPolicy};
pub use store::{MemorizationRecord, ProgressStore};
