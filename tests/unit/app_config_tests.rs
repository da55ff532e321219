/*!
 * Tests for application configuration
 */

use storyreel::app_config::{Config, ImageProvider, LogLevel};
use storyreel::subtitle_processor::SubtitleFormat;
use storyreel::timing::TimeUnit;

/// Test the documented defaults
#[test]
fn test_default_config_shouldUsePipelineDefaults() {
    let config = Config::default();

    assert_eq!(config.story.num_segments, 8);
    assert_eq!(config.prompt.max_width, 250);
    assert!(config.prompt.style_suffix.contains("cinematic composition"));
    assert_eq!(config.subtitle.words_per_line, 4);
    assert_eq!(config.subtitle.duration_per_line, 2.5);
    assert_eq!(config.subtitle.format, SubtitleFormat::Ass);
    assert_eq!(config.timing.external_unit, TimeUnit::Seconds);
    assert_eq!(config.image.provider, ImageProvider::Placeholder);
    assert_eq!(config.image.concurrent_requests, 2);
    assert_eq!(config.log_level, LogLevel::Info);
}

/// Test that the default configuration is valid
#[test]
fn test_validate_withDefaults_shouldSucceed() {
    assert!(Config::default().validate().is_ok());
}

/// Test that zero segments are rejected
#[test]
fn test_validate_withZeroSegments_shouldFail() {
    let mut config = Config::default();
    config.story.num_segments = 0;
    assert!(config.validate().is_err());
}

/// Test that zero words per line are rejected
#[test]
fn test_validate_withZeroWordsPerLine_shouldFail() {
    let mut config = Config::default();
    config.subtitle.words_per_line = 0;
    assert!(config.validate().is_err());
}

/// Test that a too narrow prompt width is rejected
#[test]
fn test_validate_withTinyPromptWidth_shouldFail() {
    let mut config = Config::default();
    config.prompt.max_width = 3;
    assert!(config.validate().is_err());
}

/// Test that Leonardo needs an API key and a valid endpoint
#[test]
fn test_validate_withLeonardoProvider_shouldRequireKeyAndEndpoint() {
    let mut config = Config::default();
    config.image.provider = ImageProvider::Leonardo;
    assert!(config.validate().is_err());

    config.image.api_key = "secret".to_string();
    assert!(config.validate().is_ok());

    config.image.endpoint = "not a url".to_string();
    assert!(config.validate().is_err());
}

/// Test that a malformed placeholder colour is rejected
#[test]
fn test_validate_withBadPlaceholderColor_shouldFail() {
    let mut config = Config::default();
    config.image.placeholder_color = "blue".to_string();
    assert!(config.validate().is_err());
}

/// Test that a partial JSON file keeps defaults for missing fields
#[test]
fn test_deserialize_withPartialJson_shouldFillDefaults() {
    let json = r#"{
        "story": {"num_segments": 5},
        "subtitle": {"format": "srt", "style": {"font_size": 36}},
        "timing": {"external_unit": "milliseconds"},
        "image": {"provider": "leonardo", "api_key": "k"},
        "log_level": "debug"
    }"#;
    let config: Config = serde_json::from_str(json).unwrap();

    assert_eq!(config.story.num_segments, 5);
    assert_eq!(config.subtitle.format, SubtitleFormat::Srt);
    assert_eq!(config.subtitle.style.font_size, 36);
    assert_eq!(config.subtitle.style.font_name, "Arial");
    assert_eq!(config.subtitle.words_per_line, 4);
    assert_eq!(config.timing.external_unit, TimeUnit::Milliseconds);
    assert_eq!(config.image.provider, ImageProvider::Leonardo);
    assert_eq!(config.image.width, 1024);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert!(config.validate().is_ok());
}

/// Test that the default config survives serialization
#[test]
fn test_serialize_default_shouldParseBack() {
    let json = serde_json::to_string_pretty(&Config::default()).unwrap();
    let parsed: Config = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed.prompt.visual_keywords, Config::default().prompt.visual_keywords);
    assert_eq!(parsed.video.ffmpeg_timeout_secs, 600);
}

/// Test provider names in the config file
#[test]
fn test_image_provider_withLowercaseName_shouldDeserialize() {
    let config: Config = serde_json::from_str(r#"{"image": {"provider": "leonardo"}}"#).unwrap();
    assert_eq!(config.image.provider, ImageProvider::Leonardo);
    assert!(serde_json::from_str::<Config>(r#"{"image": {"provider": "midjourney"}}"#).is_err());
}

/// Test that the subtitle gap threshold is read from the config file
#[test]
fn test_deserialize_withGapThreshold_shouldSetSubtitleConfig() {
    let config: Config = serde_json::from_str(r#"{"subtitle": {"max_gap_warning_ms": 1500}}"#).unwrap();
    assert_eq!(config.subtitle.max_gap_warning_ms, 1500);
    assert_eq!(Config::default().subtitle.max_gap_warning_ms, 0);
}
