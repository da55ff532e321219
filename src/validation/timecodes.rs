/*!
 * Timecode validation for subtitle lines.
 *
 * This module checks that built lines are:
 * - Logically consistent (start <= end)
 * - Not overlapping the line before them
 * - Optionally, not separated from it by a long silence
 *
 * Findings are data-quality warnings. Nothing here rejects a track.
 */

use log::debug;

use crate::subtitle_processor::SubtitleLine;

/// Result of timecode validation for a single line
#[derive(Debug, Clone)]
pub struct TimecodeEntryResult {
    /// 1-based position of the line in the track
    pub seq_num: usize,
    /// Whether the line passed validation
    pub passed: bool,
    /// Issues found
    pub issues: Vec<TimecodeIssue>,
}

impl TimecodeEntryResult {
    /// Create a passing result
    pub fn passed(seq_num: usize) -> Self {
        Self {
            seq_num,
            passed: true,
            issues: vec![],
        }
    }

    /// Create a failing result
    pub fn failed(seq_num: usize, issues: Vec<TimecodeIssue>) -> Self {
        Self {
            seq_num,
            passed: false,
            issues,
        }
    }
}

/// Types of timecode issues
#[derive(Debug, Clone, PartialEq)]
pub enum TimecodeIssue {
    /// End time is before start time
    InvalidTimeRange {
        start_ms: u64,
        end_ms: u64,
    },
    /// Starts before the previous line has ended
    OverlapsWithEntry {
        other_seq_num: usize,
        overlap_ms: u64,
    },
    /// Gap too large between lines
    LargeGap {
        prev_seq_num: usize,
        gap_ms: u64,
    },
}

impl std::fmt::Display for TimecodeIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimecodeIssue::InvalidTimeRange { start_ms, end_ms } => {
                write!(f, "Invalid time range: start {}ms > end {}ms", start_ms, end_ms)
            }
            TimecodeIssue::OverlapsWithEntry { other_seq_num, overlap_ms } => {
                write!(
                    f,
                    "Overlaps with line {} by {}ms",
                    other_seq_num, overlap_ms
                )
            }
            TimecodeIssue::LargeGap { prev_seq_num, gap_ms } => {
                write!(
                    f,
                    "Large gap of {}ms after line {}",
                    gap_ms, prev_seq_num
                )
            }
        }
    }
}

/// Result of validating all lines of a track
#[derive(Debug, Clone)]
pub struct TimecodeValidationResult {
    /// Overall pass/fail status
    pub passed: bool,
    /// Results for each line
    pub entry_results: Vec<TimecodeEntryResult>,
    /// Total number of issues
    pub total_issues: usize,
    /// Number of overlapping lines
    pub overlap_count: usize,
}

impl TimecodeValidationResult {
    /// Get all failed lines
    pub fn failed_entries(&self) -> Vec<&TimecodeEntryResult> {
        self.entry_results.iter().filter(|r| !r.passed).collect()
    }
}

/// Configuration for timecode validation
#[derive(Debug, Clone)]
pub struct TimecodeValidatorConfig {
    /// Whether to check for overlaps
    pub check_overlaps: bool,
    /// Maximum gap in ms before warning (0 = disable)
    pub max_gap_warning_ms: u64,
}

impl Default for TimecodeValidatorConfig {
    fn default() -> Self {
        Self {
            check_overlaps: true,
            max_gap_warning_ms: 0,
        }
    }
}

/// Timecode validator for subtitle lines
pub struct TimecodeValidator {
    config: TimecodeValidatorConfig,
}

impl TimecodeValidator {
    /// Create a new validator with default configuration
    pub fn new() -> Self {
        Self {
            config: TimecodeValidatorConfig::default(),
        }
    }

    /// Create a new validator with custom configuration
    pub fn with_config(config: TimecodeValidatorConfig) -> Self {
        Self { config }
    }

    /// Validate a single line
    pub fn validate_line(&self, seq_num: usize, line: &SubtitleLine) -> TimecodeEntryResult {
        let (start_ms, end_ms) = (line.start_ms(), line.end_ms());

        // Zero-length lines are legal, estimated timing collapses to them
        if end_ms < start_ms {
            return TimecodeEntryResult::failed(
                seq_num,
                vec![TimecodeIssue::InvalidTimeRange { start_ms, end_ms }],
            );
        }

        TimecodeEntryResult::passed(seq_num)
    }

    /// Validate lines in track order
    pub fn validate_lines(&self, lines: &[SubtitleLine]) -> TimecodeValidationResult {
        let mut entry_results: Vec<TimecodeEntryResult> = lines
            .iter()
            .enumerate()
            .map(|(i, line)| self.validate_line(i + 1, line))
            .collect();

        let mut overlap_count = 0;

        for (i, pair) in lines.windows(2).enumerate() {
            let (previous, current) = (&pair[0], &pair[1]);
            let (prev_end, next_start) = (previous.end_ms(), current.start_ms());
            let result = &mut entry_results[i + 1];

            if self.config.check_overlaps && prev_end > next_start {
                overlap_count += 1;
                result.issues.push(TimecodeIssue::OverlapsWithEntry {
                    other_seq_num: i + 1,
                    overlap_ms: prev_end - next_start,
                });
                result.passed = false;
            }

            if self.config.max_gap_warning_ms > 0 && next_start > prev_end {
                let gap_ms = next_start - prev_end;
                if gap_ms > self.config.max_gap_warning_ms {
                    // Large gaps are warnings, not failures
                    result.issues.push(TimecodeIssue::LargeGap {
                        prev_seq_num: i + 1,
                        gap_ms,
                    });
                }
            }
        }

        let total_issues: usize = entry_results.iter().map(|r| r.issues.len()).sum();
        let passed = entry_results.iter().all(|r| r.passed);

        debug!(
            "Timecode validation: {} lines, {} issues, {} overlaps",
            lines.len(),
            total_issues,
            overlap_count
        );

        TimecodeValidationResult {
            passed,
            entry_results,
            total_issues,
            overlap_count,
        }
    }
}

impl Default for TimecodeValidator {
    fn default() -> Self {
        Self::new()
    }
}
