//! # Host Bridge Traits
//!
//! Capabilities the memorization core needs from its host but cannot provide
//! itself.
//!
//! ## Traits
//!
//! - [`HttpClient`](http::HttpClient) - Fetches chapter and verse JSON from the
//!   remote content sources
//! - [`SettingsStore`](storage::SettingsStore) - Key-value storage holding the
//!   memorization record (browser `localStorage`, SQLite on desktop)
//! - [`AudioEngine`](playback::AudioEngine) - The host audio element that
//!   actually decodes and renders recitation audio
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | HTTP + settings |
//! | Browser  | host shell          | all three injected |
//!
//! The audio engine is always host-provided. Desktop shims cover only HTTP and
//! settings.
//!
//! ## Error Handling
//!
//! All bridge traits report failures through [`BridgeError`](error::BridgeError).
//! Engines must report an autoplay-policy refusal as
//! [`BridgeError::PlaybackRejected`] so the core can tell it apart from a
//! broken source.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so they can be shared behind `Arc`
//! across async tasks.

pub mod error;
pub mod http;
pub mod playback;
pub mod storage;

pub use error::BridgeError;

pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use playback::{AudioEngine, EngineEvent, SourceToken};
pub use storage::SettingsStore;
