//! # Core Runtime Module
//!
//! Foundational infrastructure shared by every core crate:
//! - Logging and tracing setup
//! - Configuration (content sources, audio templates, host bridges)
//! - Event bus
//!
//! Nothing here knows about chapters or verses beyond plain identifiers; the
//! domain crates build on top of it.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
