//! # Desktop Bridge Implementations
//!
//! Default implementations of the host bridges for desktop builds
//! (macOS, Windows, Linux):
//! - `HttpClient` using `reqwest`
//! - `SettingsStore` using a SQLite-backed key-value table
//!
//! The audio engine has no desktop default; hosts always inject one.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{ReqwestHttpClient, SqliteSettingsStore};
//!
//! #[tokio::main]
//! async fn main() -> bridge_traits::error::Result<()> {
//!     let http = ReqwestHttpClient::new();
//!     let settings = SqliteSettingsStore::open_default().await?;
//!     // hand both to CoreConfig::builder()
//!     Ok(())
//! }
//! ```

mod http;
mod settings;

pub use http::ReqwestHttpClient;
pub use settings::{default_settings_path, SqliteSettingsStore};
