//! End-to-end behavior of the service facade over scripted bridges.

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use bridge_traits::playback::{AudioEngine, EngineEvent, SourceToken};
use bytes::Bytes;
use core_progress::MemorySettingsStore;
use core_runtime::config::{AudioTemplates, CoreConfig};
use core_runtime::events::{CoreEvent, PlaybackEvent, ProgressEvent};
use core_service::{
    AudioMode, CoreError, ErrorView, PlaybackStatus, QuranService, Route, Screen, VerseFilter,
};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

// ============================================================================
// Fakes
// ============================================================================

/// Serves canned bodies by URL. Unknown URLs answer 500, so the default
/// alquran.cloud primary always fails over to equran.id.
#[derive(Clone, Default)]
struct FakeHttp {
    routes: Arc<Mutex<HashMap<String, (u16, String)>>>,
    requested: Arc<Mutex<Vec<String>>>,
    gate: Arc<Mutex<Option<(String, Arc<Notify>)>>>,
}

impl FakeHttp {
    fn serve(self, url: &str, status: u16, body: impl Into<String>) -> Self {
        self.routes
            .lock()
            .insert(url.to_string(), (status, body.into()));
        self
    }

    /// Holds requests for `url` until the returned handle is notified.
    fn hold(&self, url: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate.lock() = Some((url.to_string(), Arc::clone(&notify)));
        notify
    }

    fn requested(&self) -> Vec<String> {
        self.requested.lock().clone()
    }
}

#[async_trait]
impl HttpClient for FakeHttp {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        self.requested.lock().push(request.url.clone());

        let gate = self
            .gate
            .lock()
            .as_ref()
            .filter(|(url, _)| *url == request.url)
            .map(|(_, notify)| Arc::clone(notify));
        if let Some(notify) = gate {
            notify.notified().await;
        }

        let (status, body) = self
            .routes
            .lock()
            .get(&request.url)
            .cloned()
            .unwrap_or((500, "Internal Server Error".to_string()));

        Ok(HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from(body),
        })
    }
}

#[derive(Clone, Default)]
struct FakeEngine {
    loads: Arc<Mutex<Vec<String>>>,
    pauses: Arc<Mutex<usize>>,
    unloaded: Arc<Mutex<bool>>,
    failing: Arc<Mutex<HashSet<String>>>,
}

impl FakeEngine {
    /// Rejects `load` for `url`.
    fn failing(self, url: &str) -> Self {
        self.failing.lock().insert(url.to_string());
        self
    }

    fn loads(&self) -> Vec<String> {
        self.loads.lock().clone()
    }
}

#[async_trait]
impl AudioEngine for FakeEngine {
    async fn load(&self, _token: SourceToken, url: &str) -> BridgeResult<()> {
        self.loads.lock().push(url.to_string());
        if self.failing.lock().contains(url) {
            return Err(BridgeError::OperationFailed(format!("cannot fetch {url}")));
        }
        Ok(())
    }

    async fn play(&self) -> BridgeResult<()> {
        Ok(())
    }

    async fn pause(&self) -> BridgeResult<()> {
        *self.pauses.lock() += 1;
        Ok(())
    }

    async fn seek(&self, _position: Duration) -> BridgeResult<()> {
        Ok(())
    }

    async fn set_volume(&self, _level: f32) -> BridgeResult<()> {
        Ok(())
    }

    async fn unload(&self) -> BridgeResult<()> {
        *self.unloaded.lock() = true;
        Ok(())
    }
}

// ============================================================================
// Fixtures
// ============================================================================

const LIST_URL: &str = "https://equran.id/api/v2/surat";
const ASR_URL: &str = "https://equran.id/api/v2/surat/103";
const FULL_PRIMARY: &str = "https://full.test/01/103.mp3";
const FULL_MIRROR: &str = "https://full.test/02/103.mp3";

const EQURAN_LIST: &str = r#"{
    "code": 200,
    "message": "Data retrieved successfully",
    "data": [
        {"nomor": 1, "nama": "الفاتحة", "namaLatin": "Al-Fatihah", "jumlahAyat": 7,
         "tempatTurun": "Mekah", "arti": "Pembukaan", "audioFull": {}},
        {"nomor": 103, "nama": "العصر", "namaLatin": "Al-'Asr", "jumlahAyat": 3,
         "tempatTurun": "Mekah", "arti": "Masa", "audioFull": {}}
    ]
}"#;

fn asr_detail() -> String {
    let ayat: Vec<String> = (1..=3)
        .map(|n| {
            format!(
                r#"{{"nomorAyat": {n}, "teksArab": "arab {n}", "teksLatin": "latin {n}",
                    "teksIndonesia": "indonesia {n}", "audio": {{"01": "https://audio.test/103/{n}.mp3"}}}}"#
            )
        })
        .collect();

    format!(
        r#"{{"code": 200, "message": "ok", "data": {{
            "nomor": 103, "nama": "العصر", "namaLatin": "Al-'Asr", "jumlahAyat": 3,
            "tempatTurun": "Mekah", "arti": "Masa",
            "audioFull": {{"02": "{}", "01": "{}"}},
            "ayat": [{}]
        }}}}"#,
        FULL_MIRROR,
        FULL_PRIMARY,
        ayat.join(",")
    )
}

fn working_http() -> FakeHttp {
    FakeHttp::default()
        .serve(LIST_URL, 200, EQURAN_LIST)
        .serve(ASR_URL, 200, asr_detail())
}

fn service_with(http: FakeHttp, store: MemorySettingsStore, engine: FakeEngine) -> QuranService {
    let config = CoreConfig::builder()
        .http_client(Arc::new(http))
        .settings_store(Arc::new(store))
        .audio_templates(AudioTemplates::none())
        .build()
        .unwrap();

    QuranService::new(&config, Arc::new(engine)).unwrap()
}

fn service(http: FakeHttp) -> QuranService {
    service_with(http, MemorySettingsStore::new(), FakeEngine::default())
}

// ============================================================================
// Chapter list
// ============================================================================

#[tokio::test]
async fn test_chapter_list_served_by_fallback() {
    let http = working_http();
    let service = service(http.clone());

    let view = service.list_chapters().await.unwrap();

    assert_eq!(view.items.len(), 2);
    assert_eq!(view.items[1].transliteration, "Al-'Asr");
    assert_eq!(view.items[1].subtitle(), "Masa \u{2022} 3 Ayat");
    assert_eq!(view.items[1].revelation, "Makkiyah");
    assert_eq!(view.items[1].progress_label(), None);
    assert_eq!(
        http.requested(),
        vec!["https://api.alquran.cloud/v1/meta".to_string(), LIST_URL.to_string()]
    );
}

#[tokio::test]
async fn test_chapter_list_unavailable() {
    let service = service(FakeHttp::default());

    let err = service.list_chapters().await.unwrap_err();
    let view = ErrorView::from(&err);

    assert_eq!(view.message, "Terjadi kesalahan saat memuat data surah.");
    assert!(view.details.is_some());
    assert!(view.can_retry());
}

#[tokio::test]
async fn test_chapter_list_search_and_progress() {
    let service = service(working_http());
    service.set_memorized(103, 1, true).await;

    let view = service.list_chapters().await.unwrap();

    let hits = view.filter("asr");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].progress_label().as_deref(), Some("1/3 ayat dihafalkan"));
    assert_eq!(view.filter("").len(), 2);
    assert_eq!(view.filter("10").len(), 1);
}

// ============================================================================
// Chapter screen
// ============================================================================

#[tokio::test]
async fn test_open_chapter_marks_and_tabs() {
    let store = MemorySettingsStore::new();
    let service = service_with(working_http(), store.clone(), FakeEngine::default());

    let mut chapter = service.open_chapter(103).await.unwrap();
    assert_eq!(chapter.view().progress_label(), "0/3 ayat dihafalkan (0.0%)");

    assert!(chapter.toggle_memorized(2).await.unwrap());
    let view = chapter.view();
    assert_eq!(view.progress_label(), "1/3 ayat dihafalkan (33.3%)");
    assert_eq!(view.tabs[1].label, "Sudah Dihafal (1)");
    assert_eq!(view.tabs[2].label, "Belum Dihafal (2)");

    chapter.set_filter(VerseFilter::Memorized);
    let numbers: Vec<u16> = chapter.view().verses.iter().map(|row| row.number).collect();
    assert_eq!(numbers, vec![2]);

    let raw = store.raw(service.progress().key()).unwrap();
    assert_eq!(raw, r#"{"103":[2]}"#);

    assert!(!chapter.toggle_memorized(2).await.unwrap());
    assert_eq!(chapter.view().progress_label(), "0/3 ayat dihafalkan (0.0%)");
    assert_eq!(
        chapter.view().empty_message.as_deref(),
        Some("Belum ada ayat yang dihafal dalam surah ini.")
    );
}

#[tokio::test]
async fn test_toggle_unknown_verse_rejected() {
    let service = service(working_http());
    let mut chapter = service.open_chapter(103).await.unwrap();

    let err = chapter.toggle_memorized(4).await.unwrap_err();

    assert_eq!(err.user_message(), "Ayat tidak ditemukan.");
    assert!(chapter.memorized().is_empty());
}

#[tokio::test]
async fn test_open_chapter_loads_first_verse() {
    let engine = FakeEngine::default();
    let service = service_with(working_http(), MemorySettingsStore::new(), engine.clone());

    let chapter = service.open_chapter(103).await.unwrap();

    assert_eq!(chapter.player().status(), PlaybackStatus::Loading);
    assert_eq!(chapter.player_view().verse_label, "Ayat 1/3");
    assert_eq!(engine.loads(), vec!["https://audio.test/103/1.mp3".to_string()]);

    chapter.close().await;
    assert!(*engine.unloaded.lock());
}

#[tokio::test]
async fn test_full_chapter_recitation_falls_back_to_mirror() {
    let engine = FakeEngine::default().failing(FULL_PRIMARY);
    let service = service_with(working_http(), MemorySettingsStore::new(), engine.clone());
    let mut chapter = service.open_chapter(103).await.unwrap();

    chapter.play_full_chapter().await.unwrap();

    assert_eq!(chapter.audio_mode(), AudioMode::FullChapter);
    assert!(*engine.unloaded.lock());
    assert_eq!(
        engine.loads(),
        vec![
            "https://audio.test/103/1.mp3".to_string(),
            FULL_PRIMARY.to_string(),
            FULL_MIRROR.to_string(),
        ]
    );
    assert_eq!(chapter.player().session().source_url.as_deref(), Some(FULL_MIRROR));
    assert_eq!(chapter.player().status(), PlaybackStatus::Loading);

    let token = chapter.player().current_token();
    chapter
        .player_mut()
        .handle_event(EngineEvent::MetadataLoaded {
            token,
            duration: Duration::from_secs(90),
        })
        .await;
    assert_eq!(chapter.player().status(), PlaybackStatus::Playing);
    assert_eq!(chapter.player_view().duration_label, "01:30");

    chapter.play_verses().await.unwrap();
    assert_eq!(chapter.audio_mode(), AudioMode::Verses);
    assert_eq!(chapter.player().current_verse(), 1);
    assert_eq!(
        engine.loads().last().map(String::as_str),
        Some("https://audio.test/103/1.mp3")
    );
}

#[tokio::test]
async fn test_full_chapter_mirror_after_reported_failure() {
    let engine = FakeEngine::default();
    let service = service_with(working_http(), MemorySettingsStore::new(), engine.clone());
    let mut chapter = service.open_chapter(103).await.unwrap();
    chapter.play_full_chapter().await.unwrap();
    assert_eq!(engine.loads().last().map(String::as_str), Some(FULL_PRIMARY));

    let pauses = *engine.pauses.lock();
    let token = chapter.player().current_token();
    chapter
        .player_mut()
        .handle_event(EngineEvent::Failed {
            token,
            message: "404".to_string(),
        })
        .await;

    assert_eq!(*engine.pauses.lock(), pauses + 1);
    assert_eq!(engine.loads().last().map(String::as_str), Some(FULL_MIRROR));
    assert_eq!(chapter.player().status(), PlaybackStatus::Loading);
}

#[tokio::test]
async fn test_unknown_chapter_makes_no_request() {
    let http = working_http();
    let service = service(http.clone());

    let err = service.open_chapter(115).await.unwrap_err();

    assert_eq!(err.user_message(), "Surah tidak ditemukan.");
    assert!(!err.is_retryable());
    assert!(http.requested().is_empty());
}

// ============================================================================
// Verse screen
// ============================================================================

#[tokio::test]
async fn test_open_verse_links() {
    let engine = FakeEngine::default();
    let service = service_with(working_http(), MemorySettingsStore::new(), engine.clone());

    let first = service.open_verse(103, 1).await.unwrap();
    let view = first.view();
    assert_eq!(view.title(), "Al-'Asr : 1");
    assert_eq!(view.previous.label, "Kembali ke Surah");
    assert_eq!(view.previous.route, Route::Chapter { chapter: 103 });
    let next = view.next.as_ref().unwrap();
    assert_eq!(next.label, "Ayat Selanjutnya");
    assert_eq!(next.route.path(), "/ayah/103/2");
    first.close().await;

    let last = service.open_verse(103, 3).await.unwrap();
    assert_eq!(last.view().previous.label, "Ayat Sebelumnya");
    assert_eq!(last.view().previous.route.path(), "/ayah/103/2");
    assert!(last.view().next.is_none());
    assert_eq!(last.player().current_verse(), 3);
    assert_eq!(
        engine.loads().last().map(String::as_str),
        Some("https://audio.test/103/3.mp3")
    );
}

#[tokio::test]
async fn test_verse_player_is_pinned_to_its_verse() {
    let engine = FakeEngine::default();
    let service = service_with(working_http(), MemorySettingsStore::new(), engine.clone());
    let mut verse = service.open_verse(103, 2).await.unwrap();

    assert!(!verse.player_mut().next().await);
    assert!(!verse.player_mut().previous().await);
    assert_eq!(verse.player().current_verse(), 2);
    assert_eq!(engine.loads(), vec!["https://audio.test/103/2.mp3".to_string()]);

    let player = verse.player_view();
    assert_eq!(player.verse_label, "Ayat 2/3");
    assert!(!player.can_next);
    assert!(!player.can_previous);

    verse.toggle_memorized().await.unwrap();
    assert_eq!(
        service.progress().get_memorized(103).await.into_iter().collect::<Vec<_>>(),
        vec![2]
    );
}

#[tokio::test]
async fn test_open_verse_toggle() {
    let service = service(working_http());
    let mut verse = service.open_verse(103, 2).await.unwrap();

    assert!(!verse.view().memorized);
    assert!(verse.toggle_memorized().await.unwrap());
    assert!(verse.view().memorized);
    assert!(service.progress().is_memorized(103, 2).await);
}

#[tokio::test]
async fn test_open_verse_missing() {
    let service = service(working_http());

    let err = service.open_verse(103, 9).await.unwrap_err();

    assert!(matches!(err, CoreError::Content(_)));
    assert_eq!(err.user_message(), "Ayat tidak ditemukan.");
}

#[tokio::test]
async fn test_open_verse_unavailable_uses_verse_message() {
    let service = service(FakeHttp::default());

    let err = service.open_verse(103, 1).await.unwrap_err();

    assert_eq!(err.user_message(), "Tidak dapat memuat ayat");
    assert!(err.is_retryable());
}

// ============================================================================
// Navigation
// ============================================================================

#[tokio::test]
async fn test_navigate_resolves_routes() {
    let service = service(working_http());

    let screen = service
        .navigate(Route::parse("/surah/103").unwrap())
        .await
        .unwrap();
    match screen {
        Some(Screen::Chapter(chapter)) => assert_eq!(chapter.detail().chapter.id, 103),
        _ => panic!("expected chapter screen"),
    }

    let screen = service.navigate(Route::Progress).await.unwrap();
    assert!(matches!(screen, Some(Screen::Progress(_))));
}

#[tokio::test]
async fn test_superseded_navigation_is_discarded() {
    let http = working_http();
    let engine = FakeEngine::default();
    let service = service_with(http.clone(), MemorySettingsStore::new(), engine.clone());
    let mut events = service.subscribe();
    let release = http.hold(ASR_URL);

    let (slow, fast, _) = tokio::join!(
        service.navigate(Route::Chapter { chapter: 103 }),
        service.navigate(Route::ChapterList),
        async { release.notify_one() },
    );

    assert!(matches!(fast.unwrap(), Some(Screen::ChapterList(_))));
    assert!(slow.unwrap().is_none());
    assert!(*engine.unloaded.lock());

    let mut released = false;
    while let Ok(event) = events.try_recv() {
        if matches!(event, CoreEvent::Playback(PlaybackEvent::Released)) {
            released = true;
        }
    }
    assert!(released);
}

// ============================================================================
// Progress
// ============================================================================

#[tokio::test]
async fn test_dashboard_counts() {
    let service = service(working_http());
    service.set_memorized(103, 1, true).await;
    service.set_memorized(103, 2, true).await;
    service.set_memorized(1, 7, true).await;

    let dashboard = service.dashboard().await;

    assert_eq!(dashboard.chapters_label(), "2 dari 114");
    assert_eq!(dashboard.verses_label(), "3 dari 6236");
    assert_eq!(dashboard.overall_label(), "0.05%");
}

#[tokio::test]
async fn test_toggle_publishes_progress_event() {
    let service = service(working_http());
    let mut events = service.subscribe();

    let verses = service.toggle_memorized(103, 3).await;

    assert!(verses.contains(&3));
    match events.recv().await.unwrap() {
        CoreEvent::Progress(ProgressEvent::VerseMarked {
            chapter,
            verse,
            memorized,
            ..
        }) => {
            assert_eq!((chapter, verse, memorized), (103, 3, true));
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn test_corrupt_progress_reads_empty_and_rejects_writes() {
    let store = MemorySettingsStore::with_entry(
        core_runtime::config::DEFAULT_PROGRESS_KEY,
        "not json",
    );
    let service = service_with(working_http(), store.clone(), FakeEngine::default());

    let mut chapter = service.open_chapter(103).await.unwrap();
    assert!(chapter.memorized().is_empty());

    let err = chapter.toggle_memorized(1).await.unwrap_err();
    assert!(matches!(err, CoreError::Progress(_)));
    assert_eq!(
        store.raw(core_runtime::config::DEFAULT_PROGRESS_KEY).as_deref(),
        Some("not json")
    );
}
