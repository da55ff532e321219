/*!
 * Externally reported word timings.
 *
 * Narration services and the timing dump deliver loosely shaped records: the
 * word or its end may be missing, times can be numbers in seconds or
 * milliseconds, or timecode strings. Every record goes through
 * [`TimingRecord::parse`], which yields a [`Word`] or an explicit skip.
 */

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::timing::Word;

/// `[HH:]MM:SS[.,]fraction`
static TIMECODE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(\d+):)?(\d{1,2}):(\d{1,2})(?:[.,](\d{1,3}))?$").unwrap()
});

/// Unit of numeric time values in external records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    /// Values are seconds
    #[default]
    Seconds,
    /// Values are milliseconds
    Milliseconds,
}

impl TimeUnit {
    fn to_seconds(self, value: f64) -> f64 {
        match self {
            TimeUnit::Seconds => value,
            TimeUnit::Milliseconds => value / 1000.0,
        }
    }
}

/// A time as found in a record: a number or a timecode string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeValue {
    /// Numeric value in the record's unit
    Number(f64),
    /// Textual timecode, always absolute
    Timecode(String),
}

impl TimeValue {
    /// Convert to seconds; malformed timecodes degrade to zero
    pub fn to_seconds(&self, unit: TimeUnit) -> f64 {
        match self {
            TimeValue::Number(value) if value.is_finite() => unit.to_seconds(*value).max(0.0),
            TimeValue::Number(_) => 0.0,
            TimeValue::Timecode(text) => parse_timecode(text),
        }
    }
}

/// One raw timing event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingRecord {
    /// Spoken word
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word: Option<String>,

    /// Start of the word
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<TimeValue>,

    /// End of the word
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<TimeValue>,

    /// Set when the raw entry had fields of the wrong type
    #[serde(skip)]
    pub malformed: bool,
}

/// Why a record was not turned into a word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No `word` field (or blank)
    MissingWord,
    /// No `end` field
    MissingEnd,
    /// A field had the wrong type
    Malformed,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingWord => write!(f, "missing 'word' field"),
            SkipReason::MissingEnd => write!(f, "missing 'end' field"),
            SkipReason::Malformed => write!(f, "malformed field"),
        }
    }
}

/// Outcome of parsing one record
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedRecord {
    /// A usable word
    Word(Word),
    /// The record must be ignored
    Skip(SkipReason),
}

impl TimingRecord {
    /// Record with numeric times
    pub fn new(word: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            word: Some(word.into()),
            start: Some(TimeValue::Number(start)),
            end: Some(TimeValue::Number(end)),
            malformed: false,
        }
    }

    /// Read one raw JSON entry; an entry that does not fit the record shape
    /// is kept as a malformed record so it is skipped, not fatal
    pub fn from_json_value(value: &serde_json::Value) -> Self {
        match TimingRecord::deserialize(value) {
            Ok(record) => record,
            Err(e) => {
                warn!("Unreadable timing record {}: {}", value, e);
                TimingRecord {
                    malformed: true,
                    ..TimingRecord::default()
                }
            }
        }
    }

    /// Validate the record.
    ///
    /// A missing start falls back to `previous_end`; an end before the start
    /// is clamped to the start.
    pub fn parse(&self, unit: TimeUnit, previous_end: f64) -> ParsedRecord {
        if self.malformed {
            return ParsedRecord::Skip(SkipReason::Malformed);
        }
        let text = match self.word.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => text,
            _ => return ParsedRecord::Skip(SkipReason::MissingWord),
        };
        let Some(end) = &self.end else {
            return ParsedRecord::Skip(SkipReason::MissingEnd);
        };

        let start = self
            .start
            .as_ref()
            .map_or(previous_end, |s| s.to_seconds(unit));
        let end = end.to_seconds(unit).max(start);

        ParsedRecord::Word(Word::new(text, start, end))
    }
}

impl From<&Word> for TimingRecord {
    fn from(word: &Word) -> Self {
        TimingRecord::new(word.text.clone(), word.start, word.end)
    }
}

/// Normalize external records into words, skipping unusable ones with a warning
pub fn normalize_records(records: &[TimingRecord], unit: TimeUnit) -> Vec<Word> {
    let mut words = Vec::with_capacity(records.len());
    let mut previous_end = 0.0;

    for (i, record) in records.iter().enumerate() {
        match record.parse(unit, previous_end) {
            ParsedRecord::Word(word) => {
                previous_end = word.end;
                words.push(word);
            }
            ParsedRecord::Skip(reason) => {
                warn!("Skipping timing record {}: {} ({:?})", i + 1, reason, record);
            }
        }
    }

    if words.len() < records.len() {
        warn!(
            "Used {} of {} timing records",
            words.len(),
            records.len()
        );
    }

    words
}

/// Parse `HH:MM:SS[.,]mmm` (hours optional) or plain decimal seconds.
///
/// Anything else yields `0.0` with a warning.
pub fn parse_timecode(text: &str) -> f64 {
    let trimmed = text.trim();

    if let Some(caps) = TIMECODE_REGEX.captures(trimmed) {
        let field = |i: usize| {
            caps.get(i)
                .map_or(0.0, |m| m.as_str().parse::<f64>().unwrap_or(0.0))
        };
        let millis = caps.get(4).map_or(0.0, |m| {
            // "5" after the separator means 500 ms
            let digits = m.as_str();
            let value = digits.parse::<f64>().unwrap_or(0.0);
            value * 10f64.powi(3 - digits.len() as i32)
        });
        let minutes = field(2);
        let seconds = field(3);
        if minutes < 60.0 && seconds < 60.0 {
            return field(1) * 3600.0 + minutes * 60.0 + seconds + millis / 1000.0;
        }
    } else if let Ok(seconds) = trimmed.parse::<f64>() {
        if seconds.is_finite() && seconds >= 0.0 {
            return seconds;
        }
    }

    warn!("Malformed timecode '{}', using 0", text);
    0.0
}
