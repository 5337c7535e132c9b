//! Normalized chapter and verse model.

use serde::{Deserialize, Serialize};

/// Number of chapters in the mushaf.
pub const CHAPTER_COUNT: u16 = 114;

/// Number of verses in the mushaf.
pub const TOTAL_VERSES: u32 = 6236;

/// Where a chapter was revealed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Revelation {
    Meccan,
    Medinan,
    Unknown(String),
}

impl Revelation {
    /// Accepts both the English (`Meccan`) and Indonesian (`Mekah`) spellings.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "meccan" | "mecca" | "makkah" | "mekah" | "makkiyah" => Revelation::Meccan,
            "medinan" | "medina" | "madinah" | "madaniyah" => Revelation::Medinan,
            _ => Revelation::Unknown(raw.to_string()),
        }
    }

    /// Indonesian label used in chapter headers.
    pub fn label(&self) -> &str {
        match self {
            Revelation::Meccan => "Makkiyah",
            Revelation::Medinan => "Madaniyah",
            Revelation::Unknown(raw) => raw,
        }
    }
}

/// Ordered audio URLs for one recitation: the first is the primary, the rest
/// are fallbacks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AudioCandidates(Vec<String>);

impl AudioCandidates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `url` unless it is blank or already listed.
    pub fn push(&mut self, url: impl Into<String>) {
        let url = url.into();
        if !url.trim().is_empty() && !self.0.contains(&url) {
            self.0.push(url);
        }
    }

    pub fn primary(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn fallbacks(&self) -> &[String] {
        self.0.get(1..).unwrap_or(&[])
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for AudioCandidates {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut candidates = AudioCandidates::new();
        for url in iter {
            candidates.push(url);
        }
        candidates
    }
}

/// A surah.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    /// 1..=114
    pub id: u16,
    /// Arabic name.
    pub name: String,
    /// Latin transliteration, e.g. `Al-Faatiha`.
    pub transliteration: String,
    /// Meaning of the name.
    pub translation: String,
    pub verse_count: u16,
    pub revelation: Revelation,
    /// Whole-chapter recitation.
    pub audio: AudioCandidates,
}

/// An ayah.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    pub chapter_id: u16,
    /// Position inside the chapter, 1-based.
    pub number: u16,
    /// Position across the whole mushaf, when the source reports it.
    pub global_number: Option<u32>,
    /// Arabic text.
    pub text: String,
    pub transliteration: Option<String>,
    /// Indonesian translation.
    pub translation: Option<String>,
    pub juz: Option<u8>,
    pub page: Option<u16>,
    pub audio: AudioCandidates,
}

/// A chapter with all of its verses in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterDetail {
    pub chapter: Chapter,
    pub verses: Vec<Verse>,
}

impl ChapterDetail {
    pub fn verse(&self, number: u16) -> Option<&Verse> {
        number
            .checked_sub(1)
            .and_then(|idx| self.verses.get(idx as usize))
            .filter(|verse| verse.number == number)
    }

    pub fn verse_count(&self) -> u16 {
        self.chapter.verse_count
    }

    /// Verse numbers must run 1..=verse_count with no gaps.
    pub(crate) fn check_consistency(&self) -> std::result::Result<(), String> {
        if self.verses.len() != self.chapter.verse_count as usize {
            return Err(format!(
                "chapter {} declares {} verses but {} were returned",
                self.chapter.id,
                self.chapter.verse_count,
                self.verses.len()
            ));
        }

        for (idx, verse) in self.verses.iter().enumerate() {
            if verse.number as usize != idx + 1 {
                return Err(format!(
                    "chapter {} verse at position {} is numbered {}",
                    self.chapter.id,
                    idx + 1,
                    verse.number
                ));
            }
        }

        Ok(())
    }
}

/// Whether `id` names an existing chapter.
pub fn is_valid_chapter(id: u16) -> bool {
    (1..=CHAPTER_COUNT).contains(&id)
}
