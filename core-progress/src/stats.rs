//! Aggregate progress figures.

use core_content::{CHAPTER_COUNT, TOTAL_VERSES};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which chapters count as "started" in [`ProgressStats::chapters_started`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartedChapterPolicy {
    /// Any chapter present in the record, even if every verse was unmarked
    /// again. Matches the figures the browser build has always shown.
    #[default]
    AnyRecord,
    /// Only chapters with at least one memorized verse.
    NonEmpty,
}

impl StartedChapterPolicy {
    pub fn counts(&self, verses: &BTreeSet<u16>) -> bool {
        match self {
            StartedChapterPolicy::AnyRecord => true,
            StartedChapterPolicy::NonEmpty => !verses.is_empty(),
        }
    }
}

/// Totals across the whole record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressStats {
    pub chapters_started: usize,
    pub total_verses_memorized: usize,
}

impl ProgressStats {
    /// Started chapters as a percentage of all 114.
    pub fn chapter_percent(&self) -> f64 {
        percent(self.chapters_started, CHAPTER_COUNT as usize)
    }

    /// Memorized verses as a percentage of all 6236.
    pub fn verse_percent(&self) -> f64 {
        percent(self.total_verses_memorized, TOTAL_VERSES as usize)
    }
}

/// Progress inside one chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterProgress {
    pub chapter: u16,
    pub memorized: BTreeSet<u16>,
    pub verse_count: u16,
}

impl ChapterProgress {
    pub fn memorized_count(&self) -> usize {
        self.memorized.len()
    }

    pub fn remaining(&self) -> usize {
        (self.verse_count as usize).saturating_sub(self.memorized.len())
    }

    pub fn percent(&self) -> f64 {
        percent(self.memorized.len(), self.verse_count as usize)
    }

    pub fn is_complete(&self) -> bool {
        self.verse_count > 0 && self.remaining() == 0
    }

    pub fn is_memorized(&self, verse: u16) -> bool {
        self.memorized.contains(&verse)
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
