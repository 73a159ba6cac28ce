//! Tests for log configuration.

use storyboard::LoggingConfig;

#[test]
fn test_verbose_raises_level() {
    assert_eq!(LoggingConfig::new().log_level, "info");
    assert_eq!(LoggingConfig::new().with_verbose(true).log_level, "debug");
    assert_eq!(LoggingConfig::new().with_verbose(false).log_level, "info");
}

#[test]
fn test_json_logs_toggle() {
    let config = LoggingConfig::default().with_json_logs(true);
    assert!(config.json_logs);
}

#[test]
fn test_configured_level_parses() {
    let config = LoggingConfig {
        log_level: "storyboard_queue=debug,info".to_string(),
        json_logs: false,
    };
    assert!(config.env_filter().is_ok());
}
