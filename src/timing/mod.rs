/*!
 * Word-level timing of the narration.
 *
 * - `estimator`: proportional estimate from the total audio duration
 * - `external`: validation of word events reported by a narration service
 *
 * Both produce [`Word`]s, and [`TimingSource`] lets callers hand either kind
 * (or no timing at all) to the subtitle builder.
 */

pub mod estimator;
pub mod external;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::app_config::TimingConfig;
use crate::errors::TimingError;

pub use estimator::{WordTimingEstimator, estimate_word_durations};
pub use external::{ParsedRecord, SkipReason, TimeUnit, TimeValue, TimingRecord, normalize_records, parse_timecode};

/// File name of the timing dump inside an output directory
pub const TIMING_DUMP_FILE: &str = "timings.json";

/// A spoken token with its audible span in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// Token text
    #[serde(rename = "word")]
    pub text: String,
    /// Start in seconds
    pub start: f64,
    /// End in seconds, never before `start`
    pub end: f64,
}

impl Word {
    /// Create a word
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    /// Audible length in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Where subtitle timing comes from
#[derive(Debug, Clone, PartialEq)]
pub enum TimingSource {
    /// Only the total narration length is known
    Estimated {
        /// Narrated text
        text: String,
        /// Audio length in seconds
        total_duration: f64,
    },
    /// The narration service reported per-word events
    External {
        /// Raw records
        records: Vec<TimingRecord>,
        /// Unit of numeric times in the records
        unit: TimeUnit,
    },
    /// No timing data at all
    Untimed {
        /// Text to caption
        text: String,
    },
}

impl TimingSource {
    /// Pick external events when available, else estimate from the duration
    pub fn from_narration(text: &str, total_duration: f64, records: Option<Vec<TimingRecord>>, unit: TimeUnit) -> Self {
        match records {
            Some(records) if !records.is_empty() => TimingSource::External { records, unit },
            _ => TimingSource::Estimated {
                text: text.to_string(),
                total_duration,
            },
        }
    }

    /// Word timings, or `None` for an untimed source
    pub fn words(&self, config: &TimingConfig) -> Option<Vec<Word>> {
        match self {
            TimingSource::Estimated { text, total_duration } => {
                Some(WordTimingEstimator::new(config).estimate(text, *total_duration))
            }
            TimingSource::External { records, unit } => Some(normalize_records(records, *unit)),
            TimingSource::Untimed { .. } => None,
        }
    }
}

/// Read a timing dump (JSON array of `{word, start, end}`).
///
/// Only a file that is not a JSON array fails; entries with wrong-typed
/// fields come back as malformed records.
pub fn load_timing_records<P: AsRef<Path>>(path: P) -> Result<Vec<TimingRecord>, TimingError> {
    let content = fs::read_to_string(path)?;
    let values: Vec<serde_json::Value> = serde_json::from_str(&content)?;
    Ok(values.iter().map(TimingRecord::from_json_value).collect())
}

/// Write words as a timing dump
pub fn save_timing_dump<P: AsRef<Path>>(path: P, words: &[Word]) -> Result<(), TimingError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(words)?)?;
    Ok(())
}
