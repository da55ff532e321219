use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::app_config::{SubtitleConfig, TimingConfig};
use crate::errors::SubtitleError;
use crate::timing::{TimingSource, Word};
use crate::validation::{TimecodeValidationResult, TimecodeValidator, TimecodeValidatorConfig};

// @module: Caption lines built from word timings, rendered as ASS or SRT

/// File stem of the caption track inside an output directory
pub const SUBTITLE_STEM: &str = "subtitle";

/// ASS canvas the style sizes refer to
const PLAY_RES_X: u32 = 640;
const PLAY_RES_Y: u32 = 480;

/// Name of the single ASS style
const STYLE_NAME: &str = "Default";

// @struct: Caption styling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleStyle {
    // @field: Font family
    #[serde(default = "default_font_name")]
    pub font_name: String,

    // @field: Font size in script pixels
    #[serde(default = "default_font_size")]
    pub font_size: u32,

    #[serde(default = "default_bold")]
    pub bold: bool,

    // @field: Text colour, #RRGGBB
    #[serde(default = "default_primary_color")]
    pub primary_color: String,

    // @field: Outline colour, #RRGGBB
    #[serde(default = "default_outline_color")]
    pub outline_color: String,

    // @field: Outline transparency, 0 opaque to 255 invisible
    #[serde(default)]
    pub outline_alpha: u8,

    // @field: Shadow transparency, 0 opaque to 255 invisible
    #[serde(default = "default_shadow_alpha")]
    pub shadow_alpha: u8,

    #[serde(default = "default_outline_width")]
    pub outline_width: f64,

    #[serde(default)]
    pub shadow: f64,

    // @field: Numpad alignment, 2 = bottom centre
    #[serde(default = "default_alignment")]
    pub alignment: u8,

    // @field: Distance from the bottom edge
    #[serde(default = "default_margin_v")]
    pub margin_v: u32,
}

fn default_font_name() -> String {
    "Arial".to_string()
}

fn default_font_size() -> u32 {
    28
}

fn default_bold() -> bool {
    true
}

fn default_primary_color() -> String {
    "#FFFFFF".to_string()
}

fn default_outline_color() -> String {
    "#FFAA00".to_string()
}

fn default_shadow_alpha() -> u8 {
    0xFF
}

fn default_outline_width() -> f64 {
    2.0
}

fn default_alignment() -> u8 {
    2
}

fn default_margin_v() -> u32 {
    30
}

impl Default for SubtitleStyle {
    fn default() -> Self {
        Self {
            font_name: default_font_name(),
            font_size: default_font_size(),
            bold: default_bold(),
            primary_color: default_primary_color(),
            outline_color: default_outline_color(),
            outline_alpha: 0,
            shadow_alpha: default_shadow_alpha(),
            outline_width: default_outline_width(),
            shadow: 0.0,
            alignment: default_alignment(),
            margin_v: default_margin_v(),
        }
    }
}

impl SubtitleStyle {
    /// Inline override tags prefixed to every line
    pub fn override_tags(&self) -> String {
        format!(
            "{{\\an{}}}{{\\fs{}}}{{\\b{}}}{{\\c{}&}}{{\\3c{}&}}{{\\3a&H{:02X}&}}{{\\4a&H{:02X}&}}",
            self.alignment,
            self.font_size,
            u8::from(self.bold),
            ass_tag_color(&self.primary_color),
            ass_tag_color(&self.outline_color),
            self.outline_alpha,
            self.shadow_alpha,
        )
    }

    /// `Style:` line of the `[V4+ Styles]` section
    pub fn style_line(&self) -> String {
        format!(
            "Style: {},{},{},{},&H000000FF,{},{},{},0,0,0,100,100,0,0,1,{},{},{},10,10,{},1",
            STYLE_NAME,
            self.font_name,
            self.font_size,
            ass_color(&self.primary_color, 0),
            ass_color(&self.outline_color, self.outline_alpha),
            ass_color("#000000", self.shadow_alpha),
            if self.bold { -1 } else { 0 },
            self.outline_width,
            self.shadow,
            self.alignment,
            self.margin_v,
        )
    }

    /// Check colours and alignment
    pub fn validate(&self) -> Result<()> {
        for (name, color) in [("primary_color", &self.primary_color), ("outline_color", &self.outline_color)] {
            if parse_hex_rgb(color).is_none() {
                return Err(anyhow!("subtitle.style.{} is not a #RRGGBB colour: {}", name, color));
            }
        }
        if !(1..=9).contains(&self.alignment) {
            return Err(anyhow!("subtitle.style.alignment must be between 1 and 9"));
        }
        if self.font_size == 0 {
            return Err(anyhow!("subtitle.style.font_size must be positive"));
        }
        Ok(())
    }
}

/// Parse `#RRGGBB` (leading `#` optional)
pub fn parse_hex_rgb(value: &str) -> Option<(u8, u8, u8)> {
    let normalized = value.trim().trim_start_matches('#');
    if normalized.len() != 6 || !normalized.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return None;
    }
    let r = u8::from_str_radix(&normalized[0..2], 16).ok()?;
    let g = u8::from_str_radix(&normalized[2..4], 16).ok()?;
    let b = u8::from_str_radix(&normalized[4..6], 16).ok()?;
    Some((r, g, b))
}

/// `&HAABBGGRR` as used in style lines; invalid colours become white
fn ass_color(value: &str, alpha: u8) -> String {
    let (r, g, b) = parse_hex_rgb(value).unwrap_or((255, 255, 255));
    format!("&H{:02X}{:02X}{:02X}{:02X}", alpha, b, g, r)
}

/// `&HBBGGRR` as used in override tags
fn ass_tag_color(value: &str) -> String {
    let (r, g, b) = parse_hex_rgb(value).unwrap_or((255, 255, 255));
    format!("&H{:02X}{:02X}{:02X}", b, g, r)
}

/// Escape text so libass shows it literally instead of reading override
/// blocks or `\N` breaks out of it
pub fn escape_ass_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '{' => escaped.push_str("\\{"),
            '}' => escaped.push_str("\\}"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// `h:mm:ss.cc`
pub fn format_ass_timestamp(seconds: f64) -> String {
    let total_cs = (seconds.max(0.0) * 100.0).round() as u64;
    let cs = total_cs % 100;
    let total_secs = total_cs / 100;
    let secs = total_secs % 60;
    let mins = (total_secs / 60) % 60;
    let hours = total_secs / 3600;
    format!("{hours}:{mins:02}:{secs:02}.{cs:02}")
}

/// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
pub fn format_srt_timestamp(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}

fn seconds_to_ms(seconds: f64) -> u64 {
    if seconds.is_finite() {
        (seconds.max(0.0) * 1000.0).round() as u64
    } else {
        0
    }
}

// @struct: One caption line
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleLine {
    // @field: Start in seconds
    pub start: f64,

    // @field: End in seconds
    pub end: f64,

    // @field: Plain words joined by spaces
    pub text: String,

    // @field: Style override prefix + text
    pub display_text: String,
}

impl SubtitleLine {
    pub fn new(start: f64, end: f64, text: impl Into<String>, display_text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
            display_text: display_text.into(),
        }
    }

    pub fn start_ms(&self) -> u64 {
        seconds_to_ms(self.start)
    }

    pub fn end_ms(&self) -> u64 {
        seconds_to_ms(self.end)
    }

    /// `Dialogue:` event of the `[Events]` section
    pub fn to_ass_event(&self) -> String {
        format!(
            "Dialogue: 0,{},{},{},,0,0,0,,{}",
            format_ass_timestamp(self.start),
            format_ass_timestamp(self.end),
            STYLE_NAME,
            self.display_text.replace('\n', "\\N"),
        )
    }

    /// SRT block with its sequence number
    pub fn to_srt_block(&self, seq_num: usize) -> String {
        format!(
            "{}\n{} --> {}\n{}\n\n",
            seq_num,
            format_srt_timestamp(self.start_ms()),
            format_srt_timestamp(self.end_ms()),
            self.text
        )
    }
}

impl fmt::Display for SubtitleLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[{} --> {}] {}",
            format_srt_timestamp(self.start_ms()),
            format_srt_timestamp(self.end_ms()),
            self.text
        )
    }
}

/// Caption file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleFormat {
    /// Advanced SubStation Alpha, styled
    #[default]
    Ass,
    /// SubRip, plain text
    Srt,
}

impl SubtitleFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            SubtitleFormat::Ass => "ass",
            SubtitleFormat::Srt => "srt",
        }
    }

    /// `subtitle.<ext>`
    pub fn file_name(&self) -> String {
        format!("{}.{}", SUBTITLE_STEM, self.extension())
    }

    /// Format implied by a file extension
    pub fn from_path(path: &Path) -> Result<Self, SubtitleError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "ass" => Ok(SubtitleFormat::Ass),
            "srt" => Ok(SubtitleFormat::Srt),
            other => Err(SubtitleError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Groups timed words into fixed-size caption lines
#[derive(Debug, Clone)]
pub struct SubtitleLineBuilder {
    style: SubtitleStyle,
    words_per_line: usize,
    duration_per_line: f64,
    max_gap_warning_ms: u64,
}

impl SubtitleLineBuilder {
    /// `words_per_line` of 0 is treated as 1
    pub fn new(style: SubtitleStyle, words_per_line: usize, duration_per_line: f64) -> Self {
        Self {
            style,
            words_per_line: words_per_line.max(1),
            duration_per_line: duration_per_line.max(0.0),
            max_gap_warning_ms: 0,
        }
    }

    pub fn from_config(config: &SubtitleConfig) -> Self {
        Self::new(config.style.clone(), config.words_per_line, config.duration_per_line)
            .with_gap_warning(config.max_gap_warning_ms)
    }

    /// Also warn about gaps between lines longer than `max_gap_ms`
    pub fn with_gap_warning(mut self, max_gap_ms: u64) -> Self {
        self.max_gap_warning_ms = max_gap_ms;
        self
    }

    pub fn style(&self) -> &SubtitleStyle {
        &self.style
    }

    /// One line per `words_per_line` words; the last line takes the remainder
    pub fn build(&self, words: &[Word]) -> Vec<SubtitleLine> {
        let lines: Vec<SubtitleLine> = words
            .chunks(self.words_per_line)
            .filter_map(|chunk| {
                let (first, last) = (chunk.first()?, chunk.last()?);
                let text = chunk.iter().map(|w| w.text.as_str()).collect::<Vec<_>>().join(" ");
                Some(self.line(first.start, last.end, text))
            })
            .collect();

        self.report_issues(&lines);
        lines
    }

    /// Equal-length lines for text without any timing
    pub fn build_untimed(&self, text: &str) -> Vec<SubtitleLine> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let lines: Vec<SubtitleLine> = tokens
            .chunks(self.words_per_line)
            .enumerate()
            .map(|(i, chunk)| {
                let start = i as f64 * self.duration_per_line;
                self.line(start, start + self.duration_per_line, chunk.join(" "))
            })
            .collect();

        self.report_issues(&lines);
        lines
    }

    /// Build from whichever timing the narration provided
    pub fn build_from_source(&self, source: &TimingSource, timing: &TimingConfig) -> Vec<SubtitleLine> {
        match source {
            TimingSource::Untimed { text } => self.build_untimed(text),
            timed => self.build(&timed.words(timing).unwrap_or_default()),
        }
    }

    fn line(&self, start: f64, end: f64, text: String) -> SubtitleLine {
        let display_text = format!("{}{}", self.style.override_tags(), escape_ass_text(&text));
        SubtitleLine::new(start, end, text, display_text)
    }

    /// Check lines with this builder's gap threshold
    pub fn validate(&self, lines: &[SubtitleLine]) -> TimecodeValidationResult {
        TimecodeValidator::with_config(TimecodeValidatorConfig {
            max_gap_warning_ms: self.max_gap_warning_ms,
            ..TimecodeValidatorConfig::default()
        })
        .validate_lines(lines)
    }

    fn report_issues(&self, lines: &[SubtitleLine]) {
        let result = self.validate(lines);
        for entry in result.failed_entries() {
            for issue in &entry.issues {
                warn!("Subtitle line {}: {}", entry.seq_num, issue);
            }
        }
        debug!("Built {} subtitle lines", lines.len());
    }
}

/// A styled caption track
#[derive(Debug, Clone)]
pub struct SubtitleTrack {
    pub style: SubtitleStyle,
    pub lines: Vec<SubtitleLine>,
}

impl SubtitleTrack {
    pub fn new(style: SubtitleStyle, lines: Vec<SubtitleLine>) -> Self {
        Self { style, lines }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Full ASS document with one style and one event per line
    pub fn to_ass_string(&self) -> String {
        let mut out = String::new();
        out.push_str("[Script Info]\n");
        out.push_str("ScriptType: v4.00+\n");
        out.push_str(&format!("PlayResX: {}\nPlayResY: {}\n", PLAY_RES_X, PLAY_RES_Y));
        out.push_str("WrapStyle: 0\nScaledBorderAndShadow: yes\n\n");

        out.push_str("[V4+ Styles]\n");
        out.push_str("Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding\n");
        out.push_str(&self.style.style_line());
        out.push_str("\n\n");

        out.push_str("[Events]\n");
        out.push_str("Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n");
        for line in &self.lines {
            out.push_str(&line.to_ass_event());
            out.push('\n');
        }
        out
    }

    /// SRT rendering of the plain line text
    pub fn to_srt_string(&self) -> String {
        self.lines
            .iter()
            .enumerate()
            .map(|(i, line)| line.to_srt_block(i + 1))
            .collect()
    }

    /// Write the track, picking the format from the file extension
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), SubtitleError> {
        let path = path.as_ref();
        let content = match SubtitleFormat::from_path(path)? {
            SubtitleFormat::Ass => self.to_ass_string(),
            SubtitleFormat::Srt => self.to_srt_string(),
        };

        let write_error = |e: std::io::Error| SubtitleError::Write {
            path: path.display().to_string(),
            message: e.to_string(),
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        fs::write(path, content).map_err(write_error)?;

        debug!("Wrote {} subtitle lines to {}", self.lines.len(), path.display());
        Ok(())
    }
}
