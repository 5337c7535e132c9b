//! Memorization record persistence.
//!
//! ## Example
//!
//! ```no_run
//! use core_progress::{MemorySettingsStore, ProgressStore};
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let store = ProgressStore::new(Arc::new(MemorySettingsStore::new()));
//!
//! store.set_memorized(1, 1, true).await;
//! assert!(store.get_memorized(1).await.contains(&1));
//!
//! let stats = store.overall_stats().await;
//! assert_eq!(stats.total_verses_memorized, 1);
//! # }
//! ```

use bridge_traits::storage::SettingsStore;
use core_runtime::config::{CoreConfig, DEFAULT_PROGRESS_KEY};
use core_runtime::events::{CoreEvent, EventBus, ProgressEvent};
use core_runtime::logging::truncate_for_log;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{ProgressError, Result};
use crate::stats::{ChapterProgress, ProgressStats, StartedChapterPolicy};

/// Chapter number to memorized verse numbers.
pub type MemorizationRecord = BTreeMap<u16, BTreeSet<u16>>;

/// Reads and writes the memorization record.
///
/// Every write re-reads the stored record, applies one change and writes the
/// whole record back. Writes from clones of the same store are serialized;
/// other processes writing the same key are last-writer-wins.
///
/// Read paths never fail: unreadable or corrupt data is logged and treated as
/// an empty record.
#[derive(Clone)]
pub struct ProgressStore {
    settings: Arc<dyn SettingsStore>,
    key: String,
    policy: StartedChapterPolicy,
    write_lock: Arc<Mutex<()>>,
    events: Option<EventBus>,
}

impl ProgressStore {
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        debug!("Initializing ProgressStore");
        Self {
            settings,
            key: DEFAULT_PROGRESS_KEY.to_string(),
            policy: StartedChapterPolicy::default(),
            write_lock: Arc::new(Mutex::new(())),
            events: None,
        }
    }

    /// Store over the configured settings bridge and key.
    pub fn from_config(config: &CoreConfig) -> Self {
        Self::new(Arc::clone(&config.settings_store)).with_key(config.progress_key.clone())
    }

    /// Storage key holding the record. Default: `quran_memorization_progress`.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn with_policy(mut self, policy: StartedChapterPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_event_bus(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Memorized verses of `chapter`; empty if none or if storage is unusable.
    pub async fn get_memorized(&self, chapter: u16) -> BTreeSet<u16> {
        self.load_or_empty()
            .await
            .remove(&chapter)
            .unwrap_or_default()
    }

    pub async fn is_memorized(&self, chapter: u16, verse: u16) -> bool {
        self.get_memorized(chapter).await.contains(&verse)
    }

    /// Marks or unmarks one verse and returns the chapter's updated set.
    ///
    /// Idempotent. If the change cannot be persisted the failure is logged and
    /// an empty set is returned; use [`try_set_memorized`](Self::try_set_memorized)
    /// to observe the error.
    pub async fn set_memorized(&self, chapter: u16, verse: u16, memorized: bool) -> BTreeSet<u16> {
        match self.try_set_memorized(chapter, verse, memorized).await {
            Ok(verses) => verses,
            Err(err) => {
                warn!(chapter, verse, memorized, error = %err, "Failed to save progress");
                self.emit(ProgressEvent::WriteFailed {
                    message: err.to_string(),
                });
                BTreeSet::new()
            }
        }
    }

    /// Fallible form of [`set_memorized`](Self::set_memorized).
    ///
    /// # Errors
    ///
    /// - [`ProgressError::InvalidVerse`] for chapter or verse 0
    /// - [`ProgressError::Corrupt`] if the stored record cannot be parsed; the
    ///   stored value is left as is
    /// - [`ProgressError::Storage`] if the host store fails
    pub async fn try_set_memorized(
        &self,
        chapter: u16,
        verse: u16,
        memorized: bool,
    ) -> Result<BTreeSet<u16>> {
        if chapter == 0 || verse == 0 {
            return Err(ProgressError::InvalidVerse { chapter, verse });
        }

        let _guard = self.write_lock.lock().await;

        let mut record = self.load().await?;
        let verses = record.entry(chapter).or_default();
        let changed = if memorized {
            verses.insert(verse)
        } else {
            verses.remove(&verse)
        };
        let updated = verses.clone();

        self.save(&record).await?;

        if changed {
            info!(chapter, verse, memorized, total = updated.len(), "Progress updated");
        } else {
            debug!(chapter, verse, memorized, "Progress unchanged");
        }

        self.emit(ProgressEvent::VerseMarked {
            chapter,
            verse,
            memorized,
            chapter_total: updated.len(),
        });

        Ok(updated)
    }

    /// Flips one verse and returns the chapter's updated set.
    pub async fn toggle(&self, chapter: u16, verse: u16) -> BTreeSet<u16> {
        let currently = self.is_memorized(chapter, verse).await;
        self.set_memorized(chapter, verse, !currently).await
    }

    /// Totals across all chapters.
    pub async fn overall_stats(&self) -> ProgressStats {
        let record = self.load_or_empty().await;

        ProgressStats {
            chapters_started: record
                .values()
                .filter(|verses| self.policy.counts(verses))
                .count(),
            total_verses_memorized: record.values().map(BTreeSet::len).sum(),
        }
    }

    pub async fn chapter_progress(&self, chapter: u16, verse_count: u16) -> ChapterProgress {
        ChapterProgress {
            chapter,
            memorized: self.get_memorized(chapter).await,
            verse_count,
        }
    }

    /// The full record.
    pub async fn snapshot(&self) -> MemorizationRecord {
        self.load_or_empty().await
    }

    /// Deletes the stored record.
    pub async fn reset(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.settings.delete(&self.key).await?;
        info!(key = %self.key, "Progress reset");
        self.emit(ProgressEvent::Reset);
        Ok(())
    }

    async fn load(&self) -> Result<MemorizationRecord> {
        let Some(raw) = self.settings.get_string(&self.key).await? else {
            return Ok(MemorizationRecord::new());
        };

        if raw.trim().is_empty() {
            return Ok(MemorizationRecord::new());
        }

        serde_json::from_str(&raw).map_err(|e| {
            warn!(
                key = %self.key,
                error = %e,
                stored = %truncate_for_log(&raw, 120),
                "Stored progress is corrupt"
            );
            self.emit(ProgressEvent::StorageCorrupt {
                message: e.to_string(),
            });
            ProgressError::Corrupt(e.to_string())
        })
    }

    async fn load_or_empty(&self) -> MemorizationRecord {
        match self.load().await {
            Ok(record) => record,
            Err(ProgressError::Corrupt(_)) => MemorizationRecord::new(),
            Err(err) => {
                warn!(key = %self.key, error = %err, "Failed to read progress");
                MemorizationRecord::new()
            }
        }
    }

    async fn save(&self, record: &MemorizationRecord) -> Result<()> {
        let json = serde_json::to_string(record)
            .map_err(|e| ProgressError::Serialization(e.to_string()))?;
        self.settings.set_string(&self.key, &json).await?;
        Ok(())
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(bus) = &self.events {
            let _ = bus.emit(CoreEvent::Progress(event));
        }
    }
}
