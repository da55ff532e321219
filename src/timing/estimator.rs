/*!
 * Proportional word-timing estimation.
 *
 * Used when the narration source reports only a total duration: each word is
 * given time proportional to its length, with a short pause after it.
 */

use log::debug;

use crate::app_config::TimingConfig;
use crate::timing::Word;

/// Character-proportional timing estimator
#[derive(Debug, Clone)]
pub struct WordTimingEstimator {
    fallback_secs_per_char: f64,
    inter_word_pause_secs: f64,
}

impl WordTimingEstimator {
    /// Create an estimator from the timing settings
    pub fn new(config: &TimingConfig) -> Self {
        Self {
            fallback_secs_per_char: config.fallback_secs_per_char.max(0.0),
            inter_word_pause_secs: config.inter_word_pause_secs.max(0.0),
        }
    }

    /// Assign `[start, end)` to every whitespace-separated word of `text`.
    ///
    /// The last word never ends after `total_duration`: when the running clock
    /// (pauses included) overshoots, all timestamps are scaled down.
    pub fn estimate(&self, text: &str, total_duration: f64) -> Vec<Word> {
        let total_duration = if total_duration.is_finite() { total_duration.max(0.0) } else { 0.0 };
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let total_chars: usize = tokens.iter().map(|w| w.chars().count()).sum();

        let secs_per_char = if total_chars > 0 {
            total_duration / total_chars as f64
        } else {
            self.fallback_secs_per_char
        };

        let mut words = Vec::with_capacity(tokens.len());
        let mut clock = 0.0;

        for token in tokens {
            let start = clock;
            let end = start + token.chars().count() as f64 * secs_per_char;
            words.push(Word::new(token, start, end));
            clock = end + self.inter_word_pause_secs;
        }

        if !words.is_empty() && clock > total_duration {
            let scale = total_duration / clock;
            debug!(
                "Estimated timing overshoots audio ({:.3}s > {:.3}s), scaling by {:.4}",
                clock, total_duration, scale
            );
            for word in &mut words {
                word.start *= scale;
                word.end *= scale;
            }
        }

        words
    }
}

impl Default for WordTimingEstimator {
    fn default() -> Self {
        Self::new(&TimingConfig::default())
    }
}

/// Estimate word timings with the default rates
pub fn estimate_word_durations(text: &str, total_duration: f64) -> Vec<Word> {
    WordTimingEstimator::default().estimate(text, total_duration)
}
