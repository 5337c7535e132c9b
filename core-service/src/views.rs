//! View models for the four screens and their routes.
//!
//! Everything here is plain data derived from content, progress and playback
//! state. Rendering is left to the host.

use core_content::{Chapter, ChapterDetail, Verse, CHAPTER_COUNT, TOTAL_VERSES};
use core_playback::{PlaybackFault, PlaybackSession, PlaybackStatus};
use core_progress::{MemorizationRecord, ProgressStats};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::CoreError;

pub const RETRY_LABEL: &str = "Coba Lagi";

// ============================================================================
// Routes
// ============================================================================

/// Screen addresses understood by the host router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "route", rename_all = "snake_case")]
pub enum Route {
    /// `/`
    ChapterList,
    /// `/surah/{chapter}`
    Chapter { chapter: u16 },
    /// `/ayah/{chapter}/{verse}`
    Verse { chapter: u16, verse: u16 },
    /// `/progress`
    Progress,
}

impl Route {
    /// Parses a path. Query strings, fragments and a trailing slash are
    /// ignored. Returns `None` for unknown paths and non-numeric ids.
    ///
    /// Ids are not range-checked here; an unknown chapter surfaces as
    /// `ChapterNotFound` when its content is requested.
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Some(Route::ChapterList),
            ["progress"] => Some(Route::Progress),
            ["surah", chapter] => Some(Route::Chapter {
                chapter: parse_id(chapter)?,
            }),
            ["ayah", chapter, verse] => Some(Route::Verse {
                chapter: parse_id(chapter)?,
                verse: parse_id(verse)?,
            }),
            _ => None,
        }
    }

    pub fn path(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::ChapterList => write!(f, "/"),
            Route::Chapter { chapter } => write!(f, "/surah/{}", chapter),
            Route::Verse { chapter, verse } => write!(f, "/ayah/{}/{}", chapter, verse),
            Route::Progress => write!(f, "/progress"),
        }
    }
}

fn parse_id(segment: &str) -> Option<u16> {
    segment.parse().ok().filter(|id| *id > 0)
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

// ============================================================================
// Chapter list
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterListItem {
    pub id: u16,
    pub name: String,
    pub transliteration: String,
    pub translation: String,
    pub verse_count: u16,
    pub revelation: String,
    pub memorized: usize,
    pub route: Route,
}

impl ChapterListItem {
    fn new(chapter: &Chapter, memorized: usize) -> Self {
        Self {
            id: chapter.id,
            name: chapter.name.clone(),
            transliteration: chapter.transliteration.clone(),
            translation: chapter.translation.clone(),
            verse_count: chapter.verse_count,
            revelation: chapter.revelation.label().to_string(),
            memorized,
            route: Route::Chapter {
                chapter: chapter.id,
            },
        }
    }

    /// `The Opening • 7 Ayat`
    pub fn subtitle(&self) -> String {
        format!("{} \u{2022} {} Ayat", self.translation, self.verse_count)
    }

    pub fn percent(&self) -> f64 {
        percent(self.memorized, usize::from(self.verse_count))
    }

    /// Shown only once at least one verse is memorized.
    pub fn progress_label(&self) -> Option<String> {
        (self.memorized > 0)
            .then(|| format!("{}/{} ayat dihafalkan", self.memorized, self.verse_count))
    }

    /// Case-insensitive substring over both names, plain substring over the
    /// chapter number.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.transliteration.to_lowercase().contains(&needle)
            || self.id.to_string().contains(query)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterListView {
    pub items: Vec<ChapterListItem>,
}

impl ChapterListView {
    pub const SEARCH_PLACEHOLDER: &'static str = "Cari surah...";

    pub fn new(chapters: &[Chapter], record: &MemorizationRecord) -> Self {
        let items = chapters
            .iter()
            .map(|chapter| {
                let memorized = record.get(&chapter.id).map_or(0, BTreeSet::len);
                ChapterListItem::new(chapter, memorized)
            })
            .collect();

        Self { items }
    }

    /// Items matching `query`, in list order. An empty query matches all.
    pub fn filter(&self, query: &str) -> Vec<&ChapterListItem> {
        self.items.iter().filter(|item| item.matches(query)).collect()
    }
}

// ============================================================================
// Chapter detail
// ============================================================================

/// Verse tabs of the chapter screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerseFilter {
    #[default]
    All,
    Memorized,
    Unmemorized,
}

impl VerseFilter {
    fn admits(&self, memorized: bool) -> bool {
        match self {
            VerseFilter::All => true,
            VerseFilter::Memorized => memorized,
            VerseFilter::Unmemorized => !memorized,
        }
    }

    fn empty_message(&self) -> Option<&'static str> {
        match self {
            VerseFilter::All => None,
            VerseFilter::Memorized => Some("Belum ada ayat yang dihafal dalam surah ini."),
            VerseFilter::Unmemorized => Some("Selamat! Semua ayat dalam surah ini telah dihafal."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabView {
    pub filter: VerseFilter,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseRow {
    pub number: u16,
    pub text: String,
    pub transliteration: Option<String>,
    pub translation: Option<String>,
    pub memorized: bool,
    /// Deep link to the single-verse screen.
    pub route: Route,
}

impl VerseRow {
    fn new(verse: &Verse, memorized: bool) -> Self {
        Self {
            number: verse.number,
            text: verse.text.clone(),
            transliteration: verse.transliteration.clone(),
            translation: verse.translation.clone(),
            memorized,
            route: Route::Verse {
                chapter: verse.chapter_id,
                verse: verse.number,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterDetailView {
    pub chapter_id: u16,
    pub name: String,
    pub transliteration: String,
    pub translation: String,
    pub revelation: String,
    pub verse_count: u16,
    pub memorized_count: usize,
    pub percent: f64,
    pub tabs: Vec<TabView>,
    pub filter: VerseFilter,
    /// Verses admitted by `filter`.
    pub verses: Vec<VerseRow>,
    /// Set when the selected tab has no verses.
    pub empty_message: Option<String>,
    pub back: Route,
}

impl ChapterDetailView {
    pub fn new(detail: &ChapterDetail, memorized: &BTreeSet<u16>, filter: VerseFilter) -> Self {
        let chapter = &detail.chapter;
        let total = usize::from(chapter.verse_count);
        let memorized_count = detail
            .verses
            .iter()
            .filter(|verse| memorized.contains(&verse.number))
            .count();

        let verses: Vec<VerseRow> = detail
            .verses
            .iter()
            .map(|verse| VerseRow::new(verse, memorized.contains(&verse.number)))
            .filter(|row| filter.admits(row.memorized))
            .collect();

        let tabs = vec![
            TabView {
                filter: VerseFilter::All,
                label: "Semua Ayat".to_string(),
                selected: filter == VerseFilter::All,
            },
            TabView {
                filter: VerseFilter::Memorized,
                label: format!("Sudah Dihafal ({})", memorized_count),
                selected: filter == VerseFilter::Memorized,
            },
            TabView {
                filter: VerseFilter::Unmemorized,
                label: format!("Belum Dihafal ({})", total.saturating_sub(memorized_count)),
                selected: filter == VerseFilter::Unmemorized,
            },
        ];

        let empty_message = if verses.is_empty() {
            filter.empty_message().map(str::to_string)
        } else {
            None
        };

        Self {
            chapter_id: chapter.id,
            name: chapter.name.clone(),
            transliteration: chapter.transliteration.clone(),
            translation: chapter.translation.clone(),
            revelation: chapter.revelation.label().to_string(),
            verse_count: chapter.verse_count,
            memorized_count,
            percent: percent(memorized_count, total),
            tabs,
            filter,
            verses,
            empty_message,
            back: Route::ChapterList,
        }
    }

    /// `1/3 ayat dihafalkan (33.3%)`
    pub fn progress_label(&self) -> String {
        format!(
            "{}/{} ayat dihafalkan ({:.1}%)",
            self.memorized_count, self.verse_count, self.percent
        )
    }
}

// ============================================================================
// Single verse
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavLink {
    pub label: &'static str,
    pub route: Route,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerseView {
    pub chapter_id: u16,
    pub chapter_name: String,
    pub chapter_transliteration: String,
    pub verse_count: u16,
    pub number: u16,
    pub text: String,
    pub transliteration: Option<String>,
    pub translation: Option<String>,
    pub juz: Option<u8>,
    pub page: Option<u16>,
    pub memorized: bool,
    /// Previous verse, or back to the chapter at verse 1.
    pub previous: NavLink,
    /// `None` at the last verse.
    pub next: Option<NavLink>,
    pub chapter_route: Route,
}

impl VerseView {
    pub fn new(chapter: &Chapter, verse: &Verse, memorized: bool) -> Self {
        let chapter_route = Route::Chapter {
            chapter: chapter.id,
        };

        let previous = match verse.number {
            0 | 1 => NavLink {
                label: "Kembali ke Surah",
                route: chapter_route,
            },
            n => NavLink {
                label: "Ayat Sebelumnya",
                route: Route::Verse {
                    chapter: chapter.id,
                    verse: n - 1,
                },
            },
        };

        let next = (verse.number < chapter.verse_count).then(|| NavLink {
            label: "Ayat Selanjutnya",
            route: Route::Verse {
                chapter: chapter.id,
                verse: verse.number + 1,
            },
        });

        Self {
            chapter_id: chapter.id,
            chapter_name: chapter.name.clone(),
            chapter_transliteration: chapter.transliteration.clone(),
            verse_count: chapter.verse_count,
            number: verse.number,
            text: verse.text.clone(),
            transliteration: verse.transliteration.clone(),
            translation: verse.translation.clone(),
            juz: verse.juz,
            page: verse.page,
            memorized,
            previous,
            next,
            chapter_route,
        }
    }

    /// `Al-Baqara : 255`
    pub fn title(&self) -> String {
        format!("{} : {}", self.chapter_transliteration, self.number)
    }
}

// ============================================================================
// Progress dashboard
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressDashboard {
    pub chapters_started: usize,
    pub chapter_total: u16,
    pub verses_memorized: usize,
    pub verse_total: u32,
    pub chapter_percent: f64,
    pub verse_percent: f64,
}

impl ProgressDashboard {
    pub fn new(stats: &ProgressStats) -> Self {
        Self {
            chapters_started: stats.chapters_started,
            chapter_total: CHAPTER_COUNT,
            verses_memorized: stats.total_verses_memorized,
            verse_total: TOTAL_VERSES,
            chapter_percent: stats.chapter_percent(),
            verse_percent: stats.verse_percent(),
        }
    }

    /// `2 dari 114`
    pub fn chapters_label(&self) -> String {
        format!("{} dari {}", self.chapters_started, self.chapter_total)
    }

    /// `11 dari 6236`
    pub fn verses_label(&self) -> String {
        format!("{} dari {}", self.verses_memorized, self.verse_total)
    }

    /// Overall completion by verse, two decimals: `0.18%`
    pub fn overall_label(&self) -> String {
        format!("{:.2}%", self.verse_percent)
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorView {
    pub message: String,
    pub details: Option<String>,
    /// Label of the retry button, absent when retrying cannot help.
    pub retry_label: Option<&'static str>,
}

impl ErrorView {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: None,
            retry_label: Some(RETRY_LABEL),
        }
    }

    pub fn can_retry(&self) -> bool {
        self.retry_label.is_some()
    }
}

impl From<&CoreError> for ErrorView {
    fn from(err: &CoreError) -> Self {
        Self {
            message: err.user_message().to_string(),
            details: err.details(),
            retry_label: err.is_retryable().then_some(RETRY_LABEL),
        }
    }
}

impl From<&PlaybackFault> for ErrorView {
    fn from(fault: &PlaybackFault) -> Self {
        Self {
            message: fault.user_message().to_string(),
            details: Some(fault.details().to_string()).filter(|d| !d.is_empty()),
            retry_label: Some(RETRY_LABEL),
        }
    }
}

// ============================================================================
// Player
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    /// `Ayat 2/7`
    pub verse_label: String,
    pub position_label: String,
    /// `--:--` until metadata arrives.
    pub duration_label: String,
    pub position_secs: f64,
    pub duration_secs: Option<f64>,
    pub is_playing: bool,
    pub is_loading: bool,
    /// `Hentikan` while playing, `Putar` otherwise.
    pub play_label: &'static str,
    pub muted: bool,
    pub volume_percent: u8,
    pub can_toggle_play: bool,
    pub can_seek: bool,
    pub can_previous: bool,
    pub can_next: bool,
    pub error: Option<ErrorView>,
}

impl From<&PlaybackSession> for PlayerView {
    fn from(session: &PlaybackSession) -> Self {
        Self {
            verse_label: format!("Ayat {}/{}", session.verse, session.verse_count),
            position_label: session.position_label(),
            duration_label: session.duration_label(),
            position_secs: session.position.as_secs_f64(),
            duration_secs: session.duration.map(|d| d.as_secs_f64()),
            is_playing: session.is_playing,
            is_loading: session.status == PlaybackStatus::Loading,
            play_label: if session.is_playing { "Hentikan" } else { "Putar" },
            muted: session.muted,
            volume_percent: (session.volume * 100.0).round() as u8,
            can_toggle_play: session.can_toggle_play(),
            can_seek: session.can_seek(),
            can_previous: session.has_previous(),
            can_next: session.has_next(),
            error: session.last_error.as_ref().map(ErrorView::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_content::{AudioCandidates, Revelation};

    fn chapter(id: u16, name: &str, transliteration: &str, verses: u16) -> Chapter {
        Chapter {
            id,
            name: name.to_string(),
            transliteration: transliteration.to_string(),
            translation: format!("Meaning {id}"),
            verse_count: verses,
            revelation: Revelation::Meccan,
            audio: AudioCandidates::new(),
        }
    }

    fn detail(verses: u16) -> ChapterDetail {
        ChapterDetail {
            chapter: chapter(112, "الإخلاص", "Al-Ikhlas", verses),
            verses: (1..=verses)
                .map(|n| Verse {
                    chapter_id: 112,
                    number: n,
                    global_number: None,
                    text: format!("arab {n}"),
                    transliteration: None,
                    translation: Some(format!("arti {n}")),
                    juz: Some(30),
                    page: Some(604),
                    audio: AudioCandidates::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_route_parse_and_format() {
        assert_eq!(Route::parse("/"), Some(Route::ChapterList));
        assert_eq!(Route::parse(""), Some(Route::ChapterList));
        assert_eq!(Route::parse("/progress"), Some(Route::Progress));
        assert_eq!(Route::parse("/surah/2"), Some(Route::Chapter { chapter: 2 }));
        assert_eq!(
            Route::parse("/ayah/2/255/?from=list#top"),
            Some(Route::Verse { chapter: 2, verse: 255 })
        );

        assert_eq!(Route::parse("/surah/abc"), None);
        assert_eq!(Route::parse("/surah/0"), None);
        assert_eq!(Route::parse("/ayah/2"), None);
        assert_eq!(Route::parse("/settings"), None);

        for route in [
            Route::ChapterList,
            Route::Progress,
            Route::Chapter { chapter: 36 },
            Route::Verse { chapter: 1, verse: 7 },
        ] {
            assert_eq!(Route::parse(&route.path()), Some(route));
        }
    }

    #[test]
    fn test_chapter_list_search() {
        let chapters = vec![
            chapter(1, "الفاتحة", "Al-Faatiha", 7),
            chapter(2, "البقرة", "Al-Baqara", 286),
            chapter(12, "يوسف", "Yusuf", 111),
        ];
        let view = ChapterListView::new(&chapters, &MemorizationRecord::new());

        assert_eq!(view.filter("").len(), 3);
        assert_eq!(view.filter("baqara")[0].id, 2);
        assert_eq!(view.filter("AL-").len(), 2);
        assert_eq!(view.filter("يوسف")[0].id, 12);

        let by_number: Vec<u16> = view.filter("1").iter().map(|item| item.id).collect();
        assert_eq!(by_number, vec![1, 12]);
        assert!(view.filter("kahf").is_empty());
    }

    #[test]
    fn test_chapter_list_progress_only_when_started() {
        let chapters = vec![chapter(1, "الفاتحة", "Al-Faatiha", 7), chapter(2, "البقرة", "Al-Baqara", 286)];
        let mut record = MemorizationRecord::new();
        record.insert(1, BTreeSet::from([1, 2]));
        record.insert(2, BTreeSet::new());

        let view = ChapterListView::new(&chapters, &record);

        assert_eq!(
            view.items[0].progress_label().as_deref(),
            Some("2/7 ayat dihafalkan")
        );
        assert_eq!(view.items[1].progress_label(), None);
        assert_eq!(view.items[0].subtitle(), "Meaning 1 \u{2022} 7 Ayat");
    }

    #[test]
    fn test_chapter_detail_header_and_tabs() {
        let view = ChapterDetailView::new(&detail(3), &BTreeSet::from([2]), VerseFilter::All);

        assert_eq!(view.progress_label(), "1/3 ayat dihafalkan (33.3%)");
        let labels: Vec<&str> = view.tabs.iter().map(|tab| tab.label.as_str()).collect();
        assert_eq!(labels, vec!["Semua Ayat", "Sudah Dihafal (1)", "Belum Dihafal (2)"]);
        assert_eq!(view.verses.len(), 3);
        assert!(view.verses[1].memorized);
        assert_eq!(view.verses[1].route, Route::Verse { chapter: 112, verse: 2 });
        assert!(view.empty_message.is_none());
    }

    #[test]
    fn test_chapter_detail_filters_and_empty_messages() {
        let none = ChapterDetailView::new(&detail(4), &BTreeSet::new(), VerseFilter::Memorized);
        assert!(none.verses.is_empty());
        assert_eq!(
            none.empty_message.as_deref(),
            Some("Belum ada ayat yang dihafal dalam surah ini.")
        );

        let all = BTreeSet::from([1, 2, 3, 4]);
        let done = ChapterDetailView::new(&detail(4), &all, VerseFilter::Unmemorized);
        assert_eq!(
            done.empty_message.as_deref(),
            Some("Selamat! Semua ayat dalam surah ini telah dihafal.")
        );
        assert_eq!(done.progress_label(), "4/4 ayat dihafalkan (100.0%)");

        let some = ChapterDetailView::new(&detail(4), &BTreeSet::from([1, 3]), VerseFilter::Unmemorized);
        let numbers: Vec<u16> = some.verses.iter().map(|row| row.number).collect();
        assert_eq!(numbers, vec![2, 4]);
    }

    #[test]
    fn test_verse_view_links() {
        let detail = detail(4);

        let first = VerseView::new(&detail.chapter, &detail.verses[0], false);
        assert_eq!(first.previous.route, Route::Chapter { chapter: 112 });
        assert_eq!(first.previous.label, "Kembali ke Surah");
        assert_eq!(
            first.next.as_ref().map(|link| link.route),
            Some(Route::Verse { chapter: 112, verse: 2 })
        );

        let last = VerseView::new(&detail.chapter, &detail.verses[3], true);
        assert_eq!(last.previous.route, Route::Verse { chapter: 112, verse: 3 });
        assert!(last.next.is_none());
        assert_eq!(last.title(), "Al-Ikhlas : 4");
    }

    #[test]
    fn test_dashboard_labels() {
        let dashboard = ProgressDashboard::new(&ProgressStats {
            chapters_started: 2,
            total_verses_memorized: 11,
        });

        assert_eq!(dashboard.chapters_label(), "2 dari 114");
        assert_eq!(dashboard.verses_label(), "11 dari 6236");
        assert_eq!(dashboard.overall_label(), "0.18%");
    }

    #[test]
    fn test_error_view_from_content_error() {
        let err = CoreError::Content(core_content::ContentError::ChapterNotFound(115));
        let view = ErrorView::from(&err);

        assert_eq!(view.message, "Surah tidak ditemukan.");
        assert!(!view.can_retry());

        let view = ErrorView::from(&CoreError::Content(
            core_content::ContentError::DataUnavailable {
                resource: core_content::Resource::ChapterList,
                cause: "HTTP status 500".to_string(),
            },
        ));
        assert_eq!(view.message, "Terjadi kesalahan saat memuat data surah.");
        assert_eq!(view.details.as_deref(), Some("HTTP status 500"));
        assert_eq!(view.retry_label, Some(RETRY_LABEL));
    }
}
