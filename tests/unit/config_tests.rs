// Configuration module unit tests

use webmark::config::*;
use webmark::logging::LogFormat;
use webmark::watermark::{Anchor, FontColor};

#[test]
fn test_can_deserialize_minimal_yaml_config() {
    let yaml = r#"
watermark:
  text: "COPYRIGHT"
"#;
    let config: Config = serde_yaml::from_str(yaml).expect("Failed to deserialize YAML");
    assert_eq!(config.watermark.text, "COPYRIGHT");
    assert_eq!(config.output, OutputConfig::default());
}

#[test]
fn test_watermark_text_defaults_to_holder() {
    let yaml = r#"
copyright:
  holder: "Example Studio"
"#;
    let config = Config::from_yaml_with_env(yaml).unwrap();
    assert_eq!(config.watermark.text, "Example Studio");
}

#[test]
fn test_explicit_text_is_kept() {
    let yaml = r#"
watermark:
  text: "Draft"
copyright:
  holder: "Example Studio"
"#;
    let config = Config::from_yaml_with_env(yaml).unwrap();
    assert_eq!(config.watermark.text, "Draft");
}

#[test]
fn test_single_watermark_position() {
    let yaml = r#"
watermark:
  text: "x"
  position:
    x: 12
    y: 34
"#;
    let config = Config::from_yaml_with_env(yaml).unwrap();
    assert_eq!(config.watermark.position, Some(Anchor::new(12, 34)));
    assert!(!config.watermark.is_rotated());
}

#[test]
fn test_hex_colour() {
    let yaml = r##"
watermark:
  color: "#000000"
"##;
    let config = Config::from_yaml_with_env(yaml).unwrap();
    assert_eq!(config.watermark.color, FontColor::black());
}

#[test]
fn test_invalid_colour_fails_to_load() {
    let yaml = r#"
watermark:
  color: "bright"
"#;
    assert!(Config::from_yaml_with_env(yaml).is_err());
}

#[test]
fn test_invalid_log_format_fails_to_load() {
    let yaml = r#"
logging:
  format: xml
"#;
    assert!(Config::from_yaml_with_env(yaml).is_err());
}

#[test]
fn test_logging_section() {
    let yaml = r#"
logging:
  level: "webmark=debug"
  format: json
"#;
    let config = Config::from_yaml_with_env(yaml).unwrap();
    assert_eq!(config.logging.level, "webmark=debug");
    assert_eq!(config.logging.format, LogFormat::Json);
    assert!(config.validate().is_ok());
}

#[test]
fn test_empty_holder_rejected() {
    let yaml = r#"
watermark:
  text: "x"
copyright:
  holder: "  "
"#;
    let config = Config::from_yaml_with_env(yaml).unwrap();
    assert!(config.validate().unwrap_err().contains("holder"));
}

#[test]
fn test_multiple_env_vars() {
    std::env::set_var("WEBMARK_UNIT_TEXT", "Sample");
    std::env::set_var("WEBMARK_UNIT_HOLDER", "Jane Doe");
    let yaml = r#"
watermark:
  text: "${WEBMARK_UNIT_TEXT}"
copyright:
  holder: "${WEBMARK_UNIT_HOLDER}"
"#;
    let config = Config::from_yaml_with_env(yaml).unwrap();
    assert_eq!(config.watermark.text, "Sample");
    assert_eq!(config.copyright.holder, "Jane Doe");
}

#[test]
fn test_lowercase_placeholder_is_left_alone() {
    let yaml = r#"
watermark:
  text: "${not_substituted}"
"#;
    let config = Config::from_yaml_with_env(yaml).unwrap();
    assert_eq!(config.watermark.text, "${not_substituted}");
}

#[test]
fn test_config_round_trips_through_yaml() {
    let config = Config::from_yaml_with_env("watermark:\n  text: x\n  repeat: true\n").unwrap();
    let yaml = serde_yaml::to_string(&config).unwrap();
    let reloaded = Config::from_yaml_with_env(&yaml).unwrap();
    assert_eq!(reloaded, config);
}
