/*!
 * Paragraph-based story segmentation.
 *
 * A story is cut into exactly `n` segments, one per slide of the final video.
 * Paragraphs are never split, duplicated or reordered.
 */

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Separator used when several paragraphs share a segment
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Blank-line paragraph boundary (whitespace-only lines count as blank)
static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

/// One ordered slice of the story
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// 1-based position in the story
    pub index: usize,

    /// Paragraphs of this segment joined by a blank line, empty for padding
    pub text: String,
}

impl Segment {
    /// Create a segment
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }

    /// Padding segments carry no text
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Split text into trimmed, non-empty paragraphs
pub fn split_paragraphs(text: &str) -> Vec<String> {
    PARAGRAPH_BREAK
        .split(text.trim())
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Segment `text` into exactly `n` segments.
///
/// With at most `n` paragraphs every paragraph gets its own segment and the
/// rest is padding. Otherwise paragraphs are grouped in windows of
/// `ceil(paragraphs / n)` counted from the end of the story, so the shorter
/// remainder window (if any) opens the story.
pub fn segment(text: &str, n: usize) -> Vec<Segment> {
    let n = if n == 0 {
        warn!("Requested 0 segments, using 1 instead");
        1
    } else {
        n
    };

    let paragraphs = split_paragraphs(text);
    let paragraph_count = paragraphs.len();

    let mut texts: Vec<String> = if paragraph_count <= n {
        paragraphs
    } else {
        let per_segment = paragraph_count.div_ceil(n);
        let mut groups = group_from_end(&paragraphs, per_segment);

        // Ceiling rounding cannot overshoot with end-anchored windows, but the
        // merge keeps the count bound independent of the grouping strategy.
        if groups.len() > n {
            let tail = groups.split_off(n - 1).join(PARAGRAPH_SEPARATOR);
            groups.push(tail);
        }
        groups
    };

    if texts.len() < n {
        texts.resize(n, String::new());
    }

    debug!(
        "Segmented {} paragraph(s) into {} segment(s)",
        paragraph_count,
        texts.len()
    );

    texts
        .into_iter()
        .enumerate()
        .map(|(i, text)| Segment::new(i + 1, text))
        .collect()
}

/// Fixed-size windows anchored at the last paragraph
fn group_from_end(paragraphs: &[String], per_segment: usize) -> Vec<String> {
    let remainder = paragraphs.len() % per_segment;
    let mut groups = Vec::with_capacity(paragraphs.len().div_ceil(per_segment));

    if remainder > 0 {
        groups.push(paragraphs[..remainder].join(PARAGRAPH_SEPARATOR));
    }
    for window in paragraphs[remainder..].chunks(per_segment) {
        groups.push(window.join(PARAGRAPH_SEPARATOR));
    }

    groups
}
