/*!
 * Visual prompt extraction.
 *
 * Picks the most "visual" lines of a segment with a keyword heuristic and turns
 * them into a short image-generation prompt with a fixed style suffix.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::app_config::PromptConfig;
use crate::story::segmenter::Segment;

/// Placeholder appended when a description is shortened
pub const SHORTEN_PLACEHOLDER: &str = "...";

/// Quoted dialogue, straight or typographic quotes
static DIALOGUE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r#""[^"]*"|“[^”]*”"#).unwrap());

/// Sentence boundary: terminal punctuation followed by whitespace
static SENTENCE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]\s+").unwrap());

/// Maximum sentences used when no line matches a keyword
const FALLBACK_SENTENCES: usize = 3;

/// Image prompt for one segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptSpec {
    /// 1-based index of the segment this prompt describes
    pub segment_index: usize,

    /// Prompt text, empty when the segment is empty
    pub text: String,
}

impl PromptSpec {
    /// An empty prompt means "do not generate an image for this segment"
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Keyword-scoring prompt extractor
#[derive(Debug, Clone)]
pub struct PromptExtractor {
    keywords: Vec<String>,
    max_width: usize,
    style_suffix: String,
}

impl PromptExtractor {
    /// Build an extractor from the prompt settings
    pub fn new(config: &PromptConfig) -> Self {
        Self {
            keywords: config
                .visual_keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            max_width: config.max_width,
            style_suffix: config.style_suffix.trim().to_string(),
        }
    }

    /// Derive the prompt for one segment's text
    pub fn extract(&self, segment: &str) -> String {
        if segment.trim().is_empty() {
            return String::new();
        }

        let description = shorten(&self.describe(segment), self.max_width);

        match (description.is_empty(), self.style_suffix.is_empty()) {
            (true, _) => self.style_suffix.clone(),
            (false, true) => description,
            (false, false) => format!("{} {}", description, self.style_suffix),
        }
    }

    /// One prompt per segment, in segment order
    pub fn extract_all(&self, segments: &[Segment]) -> Vec<PromptSpec> {
        segments
            .iter()
            .map(|segment| PromptSpec {
                segment_index: segment.index,
                text: self.extract(&segment.text),
            })
            .collect()
    }

    /// Visual lines of the segment, or its opening sentences
    fn describe(&self, segment: &str) -> String {
        let clean = DIALOGUE_REGEX.replace_all(segment, "");

        let visual_lines: Vec<&str> = clean
            .split('\n')
            .filter(|line| self.is_visual(line))
            .collect();

        if !visual_lines.is_empty() {
            return visual_lines.join(" ");
        }

        SENTENCE_BREAK
            .split(&clean)
            .take(FALLBACK_SENTENCES)
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn is_visual(&self, line: &str) -> bool {
        let lowered = line.to_lowercase();
        self.keywords.iter().any(|k| lowered.contains(k.as_str()))
    }
}

/// Collapse whitespace and fit `text` into `width` characters.
///
/// Whole words are dropped from the end until the kept words plus
/// [`SHORTEN_PLACEHOLDER`] fit. Words are never cut.
pub fn shorten(text: &str, width: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    let collapsed = words.join(" ");

    if collapsed.chars().count() <= width {
        return collapsed;
    }

    let budget = width.saturating_sub(SHORTEN_PLACEHOLDER.chars().count());
    let mut kept = String::new();
    let mut kept_len = 0;

    for word in words {
        let word_len = word.chars().count();
        let needed = if kept.is_empty() { word_len } else { kept_len + 1 + word_len };
        if needed > budget {
            break;
        }
        if !kept.is_empty() {
            kept.push(' ');
        }
        kept.push_str(word);
        kept_len = needed;
    }

    kept.push_str(SHORTEN_PLACEHOLDER);
    kept
}
