// Logging tests
//
// The subscriber is process-global, so these only check that initialisation
// succeeds repeatedly and that events can be emitted afterwards.

use webmark::logging::{init_subscriber, init_subscriber_with, LogFormat, LoggingConfig};

#[test]
fn test_can_initialize_tracing_subscriber() {
    let result = init_subscriber();
    assert!(result.is_ok(), "Subscriber initialization should succeed");

    tracing::info!(component = "logging_tests", "subscriber ready");
}

#[test]
fn test_json_initialization_is_idempotent() {
    let config = LoggingConfig {
        level: "debug".to_string(),
        format: LogFormat::Json,
    };
    assert!(init_subscriber_with(&config).is_ok());
    assert!(init_subscriber_with(&config).is_ok());
}

#[test]
fn test_invalid_level_is_reported() {
    let config = LoggingConfig {
        level: "webmark=loudest".to_string(),
        format: LogFormat::Text,
    };
    assert!(config.validate().is_err());
}
