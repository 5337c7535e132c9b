//! Primary/fallback content fetching.

use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use core_runtime::config::{AudioTemplates, ContentSource, CoreConfig, SourceKind};
use core_runtime::events::{ContentEvent, CoreEvent, EventBus};
use core_runtime::logging::truncate_for_log;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::audio::AudioResolver;
use crate::error::{ContentError, FetchError, Resource, Result};
use crate::model::{is_valid_chapter, Chapter, ChapterDetail, Revelation, Verse};
use crate::types::{
    CloudEnvelope, CloudMeta, CloudSurah, CloudSurahEdition, EquranEnvelope, EquranSurat,
    EquranSuratDetail,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Characters of a bad response body kept in logs.
const BODY_LOG_LIMIT: usize = 200;

/// Fetches and normalizes Quran content.
///
/// Each public operation makes one attempt against the primary source and, if
/// that fails for any reason, one attempt against the fallback. A failure is a
/// transport error, a non-2xx status, a body that does not match the source
/// schema, or a chapter whose verse list disagrees with its declared count.
///
/// # Example
///
/// ```ignore
/// let provider = ContentProvider::new(http, ContentSource::alquran_cloud())
///     .with_fallback(ContentSource::equran());
/// let detail = provider.get_chapter(36).await?;
/// ```
pub struct ContentProvider {
    http_client: Arc<dyn HttpClient>,
    primary: ContentSource,
    fallback: Option<ContentSource>,
    audio: AudioResolver,
    timeout: Duration,
    events: Option<EventBus>,
}

impl ContentProvider {
    pub fn new(http_client: Arc<dyn HttpClient>, primary: ContentSource) -> Self {
        Self {
            http_client,
            primary,
            fallback: None,
            audio: AudioResolver::default(),
            timeout: DEFAULT_TIMEOUT,
            events: None,
        }
    }

    /// Provider wired from the runtime configuration.
    pub fn from_config(config: &CoreConfig) -> Self {
        let mut provider = Self::new(config.http_client.clone(), config.primary_source.clone())
            .with_audio_templates(config.audio.clone())
            .with_timeout(config.request_timeout);
        provider.fallback = config.fallback_source.clone();
        provider
    }

    pub fn with_fallback(mut self, fallback: ContentSource) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn with_audio_templates(mut self, templates: AudioTemplates) -> Self {
        self.audio = AudioResolver::new(templates);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_event_bus(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    fn sources(&self) -> impl Iterator<Item = &ContentSource> {
        std::iter::once(&self.primary).chain(self.fallback.iter())
    }

    /// All 114 chapters in order.
    #[instrument(skip(self))]
    pub async fn list_chapters(&self) -> Result<Vec<Chapter>> {
        let mut trail = FallbackTrail::new(Resource::ChapterList, self);

        for source in self.sources() {
            match self.fetch_chapter_list(source).await {
                Ok(chapters) => {
                    trail.succeeded(source);
                    info!(source = %source.name, count = chapters.len(), "Loaded chapter list");
                    return Ok(chapters);
                }
                Err(err) => trail.failed(source, err),
            }
        }

        Err(trail.exhausted())
    }

    /// A chapter with all verses, translation and audio candidates.
    ///
    /// # Errors
    ///
    /// - [`ContentError::ChapterNotFound`] for ids outside 1..=114, without any
    ///   network request
    /// - [`ContentError::DataUnavailable`] when every source failed
    #[instrument(skip(self))]
    pub async fn get_chapter(&self, chapter_id: u16) -> Result<ChapterDetail> {
        if !is_valid_chapter(chapter_id) {
            return Err(ContentError::ChapterNotFound(chapter_id));
        }

        let mut trail = FallbackTrail::new(Resource::Chapter(chapter_id), self);

        for source in self.sources() {
            let fetched = self
                .fetch_chapter_detail(source, chapter_id)
                .await
                .and_then(|detail| {
                    if detail.chapter.id != chapter_id {
                        return Err(FetchError::Malformed(format!(
                            "requested chapter {} but received {}",
                            chapter_id, detail.chapter.id
                        )));
                    }
                    detail.check_consistency().map_err(FetchError::Malformed)?;
                    Ok(detail)
                });

            match fetched {
                Ok(detail) => {
                    trail.succeeded(source);
                    info!(
                        source = %source.name,
                        chapter = chapter_id,
                        verses = detail.verses.len(),
                        "Loaded chapter"
                    );
                    return Ok(detail);
                }
                Err(err) => trail.failed(source, err),
            }
        }

        Err(trail.exhausted())
    }

    /// A single verse. Fetches the enclosing chapter.
    #[instrument(skip(self))]
    pub async fn get_verse(&self, chapter_id: u16, verse: u16) -> Result<Verse> {
        let resource = Resource::Verse {
            chapter: chapter_id,
            verse,
        };

        if verse == 0 && is_valid_chapter(chapter_id) {
            return Err(ContentError::VerseNotFound {
                chapter: chapter_id,
                verse,
            });
        }

        let detail = self
            .get_chapter(chapter_id)
            .await
            .map_err(|err| err.for_resource(resource))?;

        detail
            .verse(verse)
            .cloned()
            .ok_or(ContentError::VerseNotFound {
                chapter: chapter_id,
                verse,
            })
    }

    // ------------------------------------------------------------------------
    // Per-source fetching
    // ------------------------------------------------------------------------

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> std::result::Result<T, FetchError> {
        debug!(url = %url, "Requesting content");
        let request = HttpRequest::get_json(url).timeout(self.timeout);
        let response = self.http_client.execute(request).await?;
        Self::decode(&response)
    }

    fn decode<T: DeserializeOwned>(response: &HttpResponse) -> std::result::Result<T, FetchError> {
        if !response.is_success() {
            return Err(FetchError::Status(response.status));
        }

        serde_json::from_slice(&response.body).map_err(|e| {
            let body = String::from_utf8_lossy(&response.body);
            debug!(body = %truncate_for_log(&body, BODY_LOG_LIMIT), "Undecodable body");
            FetchError::Malformed(e.to_string())
        })
    }

    async fn fetch_chapter_list(
        &self,
        source: &ContentSource,
    ) -> std::result::Result<Vec<Chapter>, FetchError> {
        let chapters = match source.kind {
            SourceKind::AlQuranCloud => {
                let envelope: CloudEnvelope<CloudMeta> = self.get_json(source.url("meta")).await?;
                check_code(envelope.code)?;
                envelope
                    .data
                    .surahs
                    .references
                    .into_iter()
                    .map(|surah| self.cloud_chapter(surah))
                    .collect::<Vec<_>>()
            }
            SourceKind::EQuran => {
                let envelope: EquranEnvelope<Vec<EquranSurat>> =
                    self.get_json(source.url("surat")).await?;
                check_code(envelope.code)?;
                envelope
                    .data
                    .into_iter()
                    .map(|surat| self.equran_chapter(surat))
                    .collect::<Vec<_>>()
            }
        };

        if chapters.is_empty() {
            return Err(FetchError::Malformed("empty chapter list".to_string()));
        }

        Ok(chapters)
    }

    async fn fetch_chapter_detail(
        &self,
        source: &ContentSource,
        chapter_id: u16,
    ) -> std::result::Result<ChapterDetail, FetchError> {
        match source.kind {
            SourceKind::AlQuranCloud => {
                let arabic: CloudEnvelope<CloudSurahEdition> = self
                    .get_json(source.url(&format!("surah/{}/{}", chapter_id, source.arabic_edition)))
                    .await?;
                check_code(arabic.code)?;

                let translation: CloudEnvelope<CloudSurahEdition> = self
                    .get_json(source.url(&format!(
                        "surah/{}/{}",
                        chapter_id, source.translation_edition
                    )))
                    .await?;
                check_code(translation.code)?;

                Ok(self.merge_cloud_editions(arabic.data, translation.data))
            }
            SourceKind::EQuran => {
                let envelope: EquranEnvelope<EquranSuratDetail> = self
                    .get_json(source.url(&format!("surat/{}", chapter_id)))
                    .await?;
                check_code(envelope.code)?;
                Ok(self.equran_detail(envelope.data))
            }
        }
    }

    // ------------------------------------------------------------------------
    // Normalization
    // ------------------------------------------------------------------------

    fn cloud_chapter(&self, surah: CloudSurah) -> Chapter {
        Chapter {
            id: surah.number,
            name: surah.name,
            transliteration: surah.english_name,
            translation: surah.english_name_translation,
            verse_count: surah.number_of_ayahs,
            revelation: Revelation::parse(&surah.revelation_type),
            audio: self
                .audio
                .chapter_candidates(Vec::<String>::new(), surah.number),
        }
    }

    fn merge_cloud_editions(
        &self,
        arabic: CloudSurahEdition,
        translation: CloudSurahEdition,
    ) -> ChapterDetail {
        let mut translations: HashMap<u16, String> = translation
            .ayahs
            .into_iter()
            .map(|ayah| (ayah.number_in_surah, ayah.text))
            .collect();

        let chapter_id = arabic.number;
        let verses = arabic
            .ayahs
            .into_iter()
            .map(|ayah| {
                let embedded = ayah.audio.into_iter().chain(ayah.audio_secondary);
                Verse {
                    chapter_id,
                    number: ayah.number_in_surah,
                    global_number: Some(ayah.number),
                    translation: translations.remove(&ayah.number_in_surah),
                    transliteration: None,
                    juz: ayah.juz,
                    page: ayah.page,
                    audio: self.audio.verse_candidates(
                        embedded,
                        chapter_id,
                        ayah.number_in_surah,
                        Some(ayah.number),
                    ),
                    text: ayah.text,
                }
            })
            .collect();

        let chapter = self.cloud_chapter(CloudSurah {
            number: arabic.number,
            name: arabic.name,
            english_name: arabic.english_name,
            english_name_translation: arabic.english_name_translation,
            number_of_ayahs: arabic.number_of_ayahs,
            revelation_type: arabic.revelation_type,
        });

        ChapterDetail { chapter, verses }
    }

    fn equran_chapter(&self, surat: EquranSurat) -> Chapter {
        Chapter {
            id: surat.nomor,
            name: surat.nama,
            transliteration: surat.nama_latin,
            translation: surat.arti,
            verse_count: surat.jumlah_ayat,
            revelation: Revelation::parse(&surat.tempat_turun),
            audio: self
                .audio
                .chapter_candidates(surat.audio_full.into_values(), surat.nomor),
        }
    }

    fn equran_detail(&self, detail: EquranSuratDetail) -> ChapterDetail {
        let chapter = self.equran_chapter(detail.surat);
        let verses = detail
            .ayat
            .into_iter()
            .map(|ayat| Verse {
                chapter_id: chapter.id,
                number: ayat.nomor_ayat,
                global_number: None,
                text: ayat.teks_arab,
                transliteration: ayat.teks_latin,
                translation: ayat.teks_indonesia,
                juz: None,
                page: None,
                audio: self.audio.verse_candidates(
                    ayat.audio.into_values(),
                    chapter.id,
                    ayat.nomor_ayat,
                    None,
                ),
            })
            .collect();

        ChapterDetail { chapter, verses }
    }
}

fn check_code(code: u16) -> std::result::Result<(), FetchError> {
    if (200..300).contains(&code) {
        Ok(())
    } else {
        Err(FetchError::Malformed(format!("envelope code {}", code)))
    }
}

/// Logs and publishes the outcome of each source attempt for one resource.
struct FallbackTrail<'a> {
    resource: Resource,
    provider: &'a ContentProvider,
    failures: Vec<String>,
}

impl<'a> FallbackTrail<'a> {
    fn new(resource: Resource, provider: &'a ContentProvider) -> Self {
        Self {
            resource,
            provider,
            failures: Vec::new(),
        }
    }

    fn emit(&self, event: ContentEvent) {
        if let Some(bus) = &self.provider.events {
            let _ = bus.emit(CoreEvent::Content(event));
        }
    }

    fn succeeded(&self, source: &ContentSource) {
        if !self.failures.is_empty() {
            info!(resource = %self.resource, source = %source.name, "Served by fallback source");
        }
        self.emit(ContentEvent::Fetched {
            resource: self.resource.to_string(),
            source: source.name.clone(),
        });
    }

    fn failed(&mut self, source: &ContentSource, err: FetchError) {
        warn!(
            resource = %self.resource,
            source = %source.name,
            error = %err,
            "Content source failed"
        );

        let message = format!("{}: {}", source.name, err);
        if self.failures.is_empty() && self.provider.fallback.is_some() {
            self.emit(ContentEvent::FallbackUsed {
                resource: self.resource.to_string(),
                primary_error: message.clone(),
            });
        }
        self.failures.push(message);
    }

    fn exhausted(self) -> ContentError {
        let cause = self.failures.join("; ");
        warn!(resource = %self.resource, cause = %cause, "All content sources failed");
        self.emit(ContentEvent::Unavailable {
            resource: self.resource.to_string(),
            message: cause.clone(),
        });
        ContentError::DataUnavailable {
            resource: self.resource,
            cause,
        }
    }
}
