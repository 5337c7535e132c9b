//! Workspace umbrella crate.
//!
//! Exposes a single `desktop-shims` feature that pulls in `core-service` with
//! the desktop bridge defaults (reqwest HTTP, SQLite settings). Host shells can
//! depend on `hafiz-workspace` instead of wiring each crate individually.

#[cfg(feature = "desktop-shims")]
pub use core_service::*;
