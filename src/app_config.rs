use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::PathBuf;

use crate::subtitle_processor::{SubtitleFormat, SubtitleStyle};
use crate::timing::TimeUnit;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Story segmentation settings
    #[serde(default)]
    pub story: StoryConfig,

    /// Image prompt settings
    #[serde(default)]
    pub prompt: PromptConfig,

    /// Word timing settings
    #[serde(default)]
    pub timing: TimingConfig,

    /// Subtitle track settings
    #[serde(default)]
    pub subtitle: SubtitleConfig,

    /// Image generation settings
    #[serde(default)]
    pub image: ImageConfig,

    /// ffmpeg/ffprobe settings
    #[serde(default)]
    pub video: VideoConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Story segmentation settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StoryConfig {
    /// Number of segments (one image each)
    #[serde(default = "default_num_segments")]
    pub num_segments: usize,
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            num_segments: default_num_segments(),
        }
    }
}

/// Settings of the visual prompt extractor
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PromptConfig {
    /// Maximum description width in characters, before the style suffix
    #[serde(default = "default_prompt_max_width")]
    pub max_width: usize,

    /// Rendering style appended to every prompt
    #[serde(default = "default_style_suffix")]
    pub style_suffix: String,

    /// Lines containing any of these (case-insensitive) are considered visual
    #[serde(default = "default_visual_keywords")]
    pub visual_keywords: Vec<String>,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            max_width: default_prompt_max_width(),
            style_suffix: default_style_suffix(),
            visual_keywords: default_visual_keywords(),
        }
    }
}

/// Settings of the word-timing estimator
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TimingConfig {
    /// Seconds per character when the text has no characters to divide by
    #[serde(default = "default_fallback_secs_per_char")]
    pub fallback_secs_per_char: f64,

    /// Pause inserted after every estimated word
    #[serde(default = "default_inter_word_pause_secs")]
    pub inter_word_pause_secs: f64,

    /// Unit of numeric times in external timing records
    #[serde(default)]
    pub external_unit: TimeUnit,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            fallback_secs_per_char: default_fallback_secs_per_char(),
            inter_word_pause_secs: default_inter_word_pause_secs(),
            external_unit: TimeUnit::default(),
        }
    }
}

/// Subtitle track settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SubtitleConfig {
    /// Words shown per caption line
    #[serde(default = "default_words_per_line")]
    pub words_per_line: usize,

    /// Line length when no timing is available at all
    #[serde(default = "default_duration_per_line")]
    pub duration_per_line: f64,

    /// Output format
    #[serde(default)]
    pub format: SubtitleFormat,

    /// Caption styling
    #[serde(default)]
    pub style: SubtitleStyle,

    /// Warn about silences between lines longer than this (0 = off)
    #[serde(default)]
    pub max_gap_warning_ms: u64,
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            words_per_line: default_words_per_line(),
            duration_per_line: default_duration_per_line(),
            format: SubtitleFormat::default(),
            style: SubtitleStyle::default(),
            max_gap_warning_ms: 0,
        }
    }
}

/// Image generation backend
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImageProvider {
    // @provider: Solid colour frames rendered locally
    #[default]
    Placeholder,
    // @provider: Leonardo.ai generations API
    Leonardo,
}

/// Image generation settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ImageConfig {
    /// Backend used for segment images
    #[serde(default)]
    pub provider: ImageProvider,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "default_leonardo_endpoint")]
    pub endpoint: String,

    // @field: Generation model
    #[serde(default = "default_leonardo_model_id")]
    pub model_id: String,

    /// Things the generator should avoid
    #[serde(default = "default_negative_prompt")]
    pub negative_prompt: String,

    #[serde(default = "default_image_width")]
    pub width: u32,

    #[serde(default = "default_image_height")]
    pub height: u32,

    /// Seconds between generation status checks
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Status checks before giving up on a generation job
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,

    // @field: Timeout seconds per HTTP request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Max concurrent generations
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    /// Colour of placeholder frames (`#RRGGBB`)
    #[serde(default = "default_placeholder_color")]
    pub placeholder_color: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            provider: ImageProvider::default(),
            api_key: String::new(),
            endpoint: default_leonardo_endpoint(),
            model_id: default_leonardo_model_id(),
            negative_prompt: default_negative_prompt(),
            width: default_image_width(),
            height: default_image_height(),
            poll_interval_secs: default_poll_interval_secs(),
            max_poll_attempts: default_max_poll_attempts(),
            timeout_secs: default_timeout_secs(),
            concurrent_requests: default_concurrent_requests(),
            placeholder_color: default_placeholder_color(),
        }
    }
}

/// External media tool settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VideoConfig {
    /// ffmpeg binary
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// ffprobe binary
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: PathBuf,

    /// Maximum run time of a single ffmpeg invocation
    #[serde(default = "default_ffmpeg_timeout_secs")]
    pub ffmpeg_timeout_secs: u64,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            ffmpeg_timeout_secs: default_ffmpeg_timeout_secs(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_num_segments() -> usize {
    8
}

fn default_prompt_max_width() -> usize {
    250
}

fn default_style_suffix() -> String {
    "High-quality fantasy illustration, realistic 8k, detailed scene, natural lighting, cinematic composition, chinese wuxia style, anime inspired, fantasy artwork".to_string()
}

fn default_visual_keywords() -> Vec<String> {
    [
        // English
        "see", "saw", "look", "watch", "gaze", "stare", "glimpse", "appear", "reveal",
        "surprise", "astonish", "color", "colour", "light", "glow", "shine", "bright",
        "dark", "shadow", "wear", "dress", "robe", "sky", "sun", "moon", "scenery",
        "landscape", "mountain", "forest", "face", "eyes", "hair",
        // Vietnamese
        "nhìn", "thấy", "mặc", "ánh", "màu", "hiện ra", "xuất hiện", "kinh ngạc",
        "phát hiện", "cảnh", "đôi mắt", "gương mặt", "khuôn mặt", "trang phục",
        "bầu trời", "mặt trời", "mặt trăng", "phong cảnh", "bóng", "sáng", "tối",
        "dáng vẻ", "vẻ", "trang", "tóc", "đầu", "mình", "thân", "tay", "chân",
    ]
    .iter()
    .map(|k| k.to_string())
    .collect()
}

fn default_fallback_secs_per_char() -> f64 {
    0.1
}

fn default_inter_word_pause_secs() -> f64 {
    0.05
}

fn default_words_per_line() -> usize {
    4
}

fn default_duration_per_line() -> f64 {
    2.5
}

fn default_leonardo_endpoint() -> String {
    "https://cloud.leonardo.ai/api/rest/v1".to_string()
}

fn default_leonardo_model_id() -> String {
    // Leonardo Diffusion XL
    "ac614f96-1082-45bf-be9d-757f2d31c174".to_string()
}

fn default_negative_prompt() -> String {
    "low quality, blurry, distorted faces, bad anatomy, extra limbs, text, watermark, signature, low resolution".to_string()
}

fn default_image_width() -> u32 {
    1024
}

fn default_image_height() -> u32 {
    768
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_max_poll_attempts() -> u32 {
    20
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_concurrent_requests() -> usize {
    2
}

fn default_placeholder_color() -> String {
    "#496D89".to_string()
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_ffprobe_path() -> PathBuf {
    PathBuf::from("ffprobe")
}

fn default_ffmpeg_timeout_secs() -> u64 {
    600
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.story.num_segments == 0 {
            return Err(anyhow!("story.num_segments must be at least 1"));
        }

        if self.prompt.max_width <= crate::story::prompts::SHORTEN_PLACEHOLDER.len() {
            return Err(anyhow!(
                "prompt.max_width must be larger than {}",
                crate::story::prompts::SHORTEN_PLACEHOLDER.len()
            ));
        }

        if self.timing.fallback_secs_per_char <= 0.0 || self.timing.inter_word_pause_secs < 0.0 {
            return Err(anyhow!("timing rates must be positive"));
        }

        if self.subtitle.words_per_line == 0 {
            return Err(anyhow!("subtitle.words_per_line must be at least 1"));
        }

        if self.subtitle.duration_per_line <= 0.0 {
            return Err(anyhow!("subtitle.duration_per_line must be positive"));
        }

        self.subtitle.style.validate()?;

        if self.image.concurrent_requests == 0 {
            return Err(anyhow!("image.concurrent_requests must be at least 1"));
        }

        if crate::subtitle_processor::parse_hex_rgb(&self.image.placeholder_color).is_none() {
            return Err(anyhow!(
                "image.placeholder_color is not a #RRGGBB colour: {}",
                self.image.placeholder_color
            ));
        }

        if self.image.provider == ImageProvider::Leonardo {
            if self.image.api_key.is_empty() {
                return Err(anyhow!("Image API key is required for the Leonardo provider"));
            }
            url::Url::parse(&self.image.endpoint)
                .map_err(|e| anyhow!("Invalid image endpoint '{}': {}", self.image.endpoint, e))?;
        }

        Ok(())
    }
}
