//! Ordered recitation tracks for one chapter.

use core_content::{AudioCandidates, Chapter, ChapterDetail};

/// One playable unit: a verse, or a whole chapter recitation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    /// 1-based position in the playlist.
    pub number: u16,
    pub sources: AudioCandidates,
}

/// Contiguous run of tracks in one chapter.
///
/// Track numbers are verse numbers. A playlist may cover the whole chapter
/// or a window of it; `verse_count` is always the chapter's total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    chapter: u16,
    verse_count: u16,
    tracks: Vec<Track>,
}

impl Playlist {
    /// Tracks are numbered from 1 in the given order and make up the whole
    /// chapter.
    pub fn new(chapter: u16, sources: impl IntoIterator<Item = AudioCandidates>) -> Self {
        let tracks: Vec<Track> = sources
            .into_iter()
            .zip(1u16..)
            .map(|(sources, number)| Track { number, sources })
            .collect();
        let verse_count = u16::try_from(tracks.len()).unwrap_or(u16::MAX);

        Self {
            chapter,
            verse_count,
            tracks,
        }
    }

    /// One track per verse.
    pub fn verses(detail: &ChapterDetail) -> Self {
        Self::new(
            detail.chapter.id,
            detail.verses.iter().map(|verse| verse.audio.clone()),
        )
    }

    /// Only `verse`, still reporting the chapter's verse count. `None` when the
    /// chapter has no such verse.
    pub fn single_verse(detail: &ChapterDetail, verse: u16) -> Option<Self> {
        let found = detail.verse(verse)?;
        Some(Self {
            chapter: detail.chapter.id,
            verse_count: detail.chapter.verse_count,
            tracks: vec![Track {
                number: found.number,
                sources: found.audio.clone(),
            }],
        })
    }

    /// A single track holding the full chapter recitation.
    pub fn full_chapter(chapter: &Chapter) -> Self {
        Self::new(chapter.id, std::iter::once(chapter.audio.clone()))
    }

    pub fn chapter(&self) -> u16 {
        self.chapter
    }

    /// Verses in the chapter, which can exceed [`len`](Self::len) for a window.
    pub fn verse_count(&self) -> u16 {
        self.verse_count
    }

    pub fn len(&self) -> u16 {
        u16::try_from(self.tracks.len()).unwrap_or(u16::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn first(&self) -> Option<u16> {
        self.tracks.first().map(|track| track.number)
    }

    pub fn last(&self) -> Option<u16> {
        self.tracks.last().map(|track| track.number)
    }

    /// Track numbered `number`.
    pub fn track(&self, number: u16) -> Option<&Track> {
        let offset = number.checked_sub(self.first()?)?;
        self.tracks.get(usize::from(offset))
    }

    pub fn contains(&self, number: u16) -> bool {
        self.track(number).is_some()
    }
}
