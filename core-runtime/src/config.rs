//! # Core Configuration Module
//!
//! Builder-based configuration for the memorization core.
//!
//! ## Contents
//!
//! - Primary and fallback [`ContentSource`] for chapter/verse data
//! - [`AudioTemplates`] used to derive recitation URLs
//! - Storage key of the memorization record
//! - Host bridges: `HttpClient` and `SettingsStore`
//!
//! When the `desktop-shims` feature is enabled, missing bridges are filled
//! with `ReqwestHttpClient` and `SqliteSettingsStore`. Without it the builder
//! fails fast with [`Error::CapabilityMissing`].
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{CoreConfig, ContentSource};
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .primary_source(ContentSource::alquran_cloud())
//!     .fallback_source(ContentSource::equran())
//!     .http_client(Arc::new(MyHttpClient))
//!     .settings_store(Arc::new(MyLocalStorage))
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::{HttpClient, SettingsStore};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Storage key the browser build has always used for the memorization record.
pub const DEFAULT_PROGRESS_KEY: &str = "quran_memorization_progress";

/// Placeholders understood by audio URL templates.
///
/// - `{chapter}` / `{verse}`: plain numbers
/// - `{chapter:03}` / `{verse:03}`: zero-padded to three digits
/// - `{global}`: verse number across the whole mushaf (1..=6236)
pub const AUDIO_PLACEHOLDERS: &[&str] = &["chapter", "chapter:03", "verse", "verse:03", "global"];

// ============================================================================
// Content sources
// ============================================================================

/// Wire schema spoken by a content source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// alquran.cloud style API (`/meta`, `/surah/{n}/editions/...`).
    AlQuranCloud,
    /// equran.id style API with Indonesian field names (`/surat`, `/surat/{n}`).
    EQuran,
}

/// One remote content source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSource {
    /// Short name used in logs and events.
    pub name: String,
    pub kind: SourceKind,
    /// Base URL without trailing slash.
    pub base_url: String,
    /// Arabic text edition (alquran.cloud only).
    #[serde(default = "default_arabic_edition")]
    pub arabic_edition: String,
    /// Translation edition (alquran.cloud only).
    #[serde(default = "default_translation_edition")]
    pub translation_edition: String,
}

fn default_arabic_edition() -> String {
    "quran-uthmani".to_string()
}

fn default_translation_edition() -> String {
    "id.indonesian".to_string()
}

impl ContentSource {
    pub fn new(name: impl Into<String>, kind: SourceKind, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            name: name.into(),
            kind,
            base_url: base_url.trim_end_matches('/').to_string(),
            arabic_edition: default_arabic_edition(),
            translation_edition: default_translation_edition(),
        }
    }

    /// `https://api.alquran.cloud/v1` with Uthmani text and Indonesian translation.
    pub fn alquran_cloud() -> Self {
        Self::new("alquran.cloud", SourceKind::AlQuranCloud, "https://api.alquran.cloud/v1")
    }

    /// `https://equran.id/api/v2`, the Indonesian national dataset.
    pub fn equran() -> Self {
        Self::new("equran.id", SourceKind::EQuran, "https://equran.id/api/v2")
    }

    pub fn with_editions(
        mut self,
        arabic: impl Into<String>,
        translation: impl Into<String>,
    ) -> Self {
        self.arabic_edition = arabic.into();
        self.translation_edition = translation.into();
        self
    }

    /// Joins `path` onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn validate(&self, role: &str) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Config(format!("{} source name cannot be empty", role)));
        }
        validate_http_url(&self.base_url)
            .map_err(|msg| Error::Config(format!("{} source '{}': {}", role, self.name, msg)))?;
        if self.kind == SourceKind::AlQuranCloud
            && (self.arabic_edition.is_empty() || self.translation_edition.is_empty())
        {
            return Err(Error::Config(format!(
                "{} source '{}' needs both an Arabic and a translation edition",
                role, self.name
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Audio templates
// ============================================================================

/// URL templates for recitation audio, tried in order after any URLs the
/// content source embeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioTemplates {
    /// Per-verse recitation.
    #[serde(default = "default_verse_templates")]
    pub verse: Vec<String>,
    /// Whole-chapter recitation.
    #[serde(default = "default_chapter_templates")]
    pub chapter: Vec<String>,
}

fn default_verse_templates() -> Vec<String> {
    vec![
        "https://cdn.islamic.network/quran/audio/128/ar.alafasy/{global}.mp3".to_string(),
        "https://everyayah.com/data/Alafasy_128kbps/{chapter:03}{verse:03}.mp3".to_string(),
    ]
}

fn default_chapter_templates() -> Vec<String> {
    vec!["https://cdn.islamic.network/quran/audio-surah/128/ar.alafasy/{chapter}.mp3".to_string()]
}

impl Default for AudioTemplates {
    fn default() -> Self {
        Self {
            verse: default_verse_templates(),
            chapter: default_chapter_templates(),
        }
    }
}

impl AudioTemplates {
    /// No templates; only URLs embedded by the content source are used.
    pub fn none() -> Self {
        Self {
            verse: Vec::new(),
            chapter: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        for template in self.verse.iter().chain(self.chapter.iter()) {
            validate_http_url(template)
                .map_err(|msg| Error::Config(format!("Audio template '{}': {}", template, msg)))?;
            for placeholder in placeholders(template) {
                if !AUDIO_PLACEHOLDERS.contains(&placeholder) {
                    return Err(Error::Config(format!(
                        "Audio template '{}' uses unknown placeholder {{{}}}",
                        template, placeholder
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Names inside `{...}` in a template, in order of appearance.
pub fn placeholders(template: &str) -> Vec<&str> {
    let mut found = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => {
                found.push(&after[..end]);
                rest = &after[end + 1..];
            }
            None => break,
        }
    }
    found
}

fn validate_http_url(url: &str) -> std::result::Result<(), String> {
    if url.starts_with("https://") || url.starts_with("http://") {
        Ok(())
    } else {
        Err("must be an http(s) URL".to_string())
    }
}

// ============================================================================
// Core configuration
// ============================================================================

/// Fully assembled configuration.
#[derive(Clone)]
pub struct CoreConfig {
    pub primary_source: ContentSource,
    pub fallback_source: Option<ContentSource>,
    pub audio: AudioTemplates,
    /// Storage key of the memorization record.
    pub progress_key: String,
    /// Per-request timeout passed to the HTTP client.
    pub request_timeout: Duration,
    pub http_client: Arc<dyn HttpClient>,
    pub settings_store: Arc<dyn SettingsStore>,
}

impl fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoreConfig")
            .field("primary_source", &self.primary_source)
            .field("fallback_source", &self.fallback_source)
            .field("audio", &self.audio)
            .field("progress_key", &self.progress_key)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

impl CoreConfig {
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Checks:
    /// - source URLs are http(s) and editions are set
    /// - primary and fallback differ
    /// - audio templates only use known placeholders
    /// - storage key and timeout are non-empty
    pub fn validate(&self) -> Result<()> {
        self.primary_source.validate("Primary")?;

        if let Some(fallback) = &self.fallback_source {
            fallback.validate("Fallback")?;
            if fallback.base_url == self.primary_source.base_url
                && fallback.kind == self.primary_source.kind
            {
                return Err(Error::Config(
                    "Fallback source must differ from the primary source".to_string(),
                ));
            }
        }

        self.audio.validate()?;

        if self.progress_key.trim().is_empty() {
            return Err(Error::Config("Progress storage key cannot be empty".to_string()));
        }

        if self.request_timeout.is_zero() {
            return Err(Error::Config(
                "Request timeout must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn http_client_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "HttpClient implementation is required to fetch chapters and verses. \
                 Desktop: enable the 'desktop-shims' feature to use ReqwestHttpClient. \
                 Browser: inject a fetch-based client."
            .to_string(),
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn settings_store_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "SettingsStore".to_string(),
        message: "SettingsStore implementation is required to persist memorization progress. \
                 Desktop: enable the 'desktop-shims' feature to use SqliteSettingsStore. \
                 Browser: inject a localStorage-backed store."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client(timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    let client: Arc<dyn HttpClient> = Arc::new(bridge_desktop::ReqwestHttpClient::with_timeout(
        timeout,
    ));
    Ok(client)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client(_timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    Err(http_client_missing_error())
}

/// Opens the SQLite store on a dedicated runtime. Works both inside and
/// outside an existing Tokio runtime.
#[cfg(feature = "desktop-shims")]
fn provide_default_settings_store(path: Option<PathBuf>) -> Result<Arc<dyn SettingsStore>> {
    use bridge_desktop::SqliteSettingsStore;
    use std::thread;
    use tokio::runtime::{Builder, Handle};

    let path = match path {
        Some(path) => path,
        None => bridge_desktop::default_settings_path()
            .map_err(|e| Error::Internal(format!("No default settings location: {}", e)))?,
    };

    let init_store = move || -> Result<SqliteSettingsStore> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| {
                Error::Internal(format!(
                    "Failed to create Tokio runtime for default settings store: {}",
                    e
                ))
            })?;

        runtime
            .block_on(SqliteSettingsStore::new(path))
            .map_err(|e| {
                Error::Internal(format!("Failed to initialize default SettingsStore: {}", e))
            })
    };

    let store = match Handle::try_current() {
        Ok(_) => thread::spawn(init_store).join().map_err(|_| {
            Error::Internal("Settings store initialization thread panicked".to_string())
        })??,
        Err(_) => init_store()?,
    };

    let store: Arc<dyn SettingsStore> = Arc::new(store);
    Ok(store)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_settings_store(_path: Option<PathBuf>) -> Result<Arc<dyn SettingsStore>> {
    Err(settings_store_missing_error())
}

/// Builder for [`CoreConfig`].
#[derive(Default)]
pub struct CoreConfigBuilder {
    primary_source: Option<ContentSource>,
    fallback_source: Option<Option<ContentSource>>,
    audio: Option<AudioTemplates>,
    progress_key: Option<String>,
    request_timeout: Option<Duration>,
    settings_path: Option<PathBuf>,
    http_client: Option<Arc<dyn HttpClient>>,
    settings_store: Option<Arc<dyn SettingsStore>>,
}

impl CoreConfigBuilder {
    /// Default: [`ContentSource::alquran_cloud`].
    pub fn primary_source(mut self, source: ContentSource) -> Self {
        self.primary_source = Some(source);
        self
    }

    /// Default: [`ContentSource::equran`].
    pub fn fallback_source(mut self, source: ContentSource) -> Self {
        self.fallback_source = Some(Some(source));
        self
    }

    /// Use the primary source only.
    pub fn without_fallback(mut self) -> Self {
        self.fallback_source = Some(None);
        self
    }

    pub fn audio_templates(mut self, audio: AudioTemplates) -> Self {
        self.audio = Some(audio);
        self
    }

    /// Default: [`DEFAULT_PROGRESS_KEY`].
    pub fn progress_key(mut self, key: impl Into<String>) -> Self {
        self.progress_key = Some(key.into());
        self
    }

    /// Default: 15 seconds.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Location of the SQLite file used by the desktop settings default.
    /// Ignored when a settings store is injected.
    pub fn settings_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.settings_path = Some(path.into());
        self
    }

    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn settings_store(mut self, store: Arc<dyn SettingsStore>) -> Self {
        self.settings_store = Some(store);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::CapabilityMissing`] when a bridge is absent and no desktop
    ///   default is compiled in
    /// - [`Error::Config`] when validation fails
    pub fn build(self) -> Result<CoreConfig> {
        let request_timeout = self.request_timeout.unwrap_or(Duration::from_secs(15));

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client(request_timeout)?,
        };

        let settings_store = match self.settings_store {
            Some(store) => store,
            None => provide_default_settings_store(self.settings_path)?,
        };

        let config = CoreConfig {
            primary_source: self
                .primary_source
                .unwrap_or_else(ContentSource::alquran_cloud),
            fallback_source: self
                .fallback_source
                .unwrap_or_else(|| Some(ContentSource::equran())),
            audio: self.audio.unwrap_or_default(),
            progress_key: self
                .progress_key
                .unwrap_or_else(|| DEFAULT_PROGRESS_KEY.to_string()),
            request_timeout,
            http_client,
            settings_store,
        };

        config.validate()?;

        Ok(config)
    }
}
