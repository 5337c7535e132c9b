//! Integration tests for logging system

use core_runtime::logging::{
    init_logging, truncate_for_log, LogFormat, LogLevel, LoggingConfig,
};
use core_runtime::Error;

#[test]
fn test_format_selection() {
    #[cfg(debug_assertions)]
    assert_eq!(LoggingConfig::default().format, LogFormat::Pretty);

    #[cfg(not(debug_assertions))]
    assert_eq!(LoggingConfig::default().format, LogFormat::Json);
}

#[test]
fn test_config_chaining() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Warn)
        .with_target(false)
        .with_thread_info(true);

    assert_eq!(config.format, LogFormat::Compact);
    assert_eq!(config.level, LogLevel::Warn);
    assert!(!config.display_target);
    assert!(config.display_thread_info);
}

#[test]
fn test_init_logging_only_once() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug);

    init_logging(config.clone()).expect("first initialization succeeds");
    tracing::info!(chapter = 1, verse = 7, "logging initialized");

    assert!(matches!(init_logging(config), Err(Error::Config(_))));
}

#[test]
fn test_invalid_custom_filter() {
    let config = LoggingConfig::default().with_filter("core_playback=noisy");
    assert!(matches!(init_logging(config), Err(Error::Config(_))));
}

#[test]
fn test_truncate_long_body() {
    let body = "x".repeat(500);
    let short = truncate_for_log(&body, 64);

    assert_eq!(short.len(), 67);
    assert!(short.ends_with("..."));
}
