/*!
 * Tests for subtitle line building and track rendering
 */

use std::fs;
use std::path::Path;

use storyreel::app_config::{SubtitleConfig, TimingConfig};
use storyreel::subtitle_processor::{
    escape_ass_text, format_ass_timestamp, format_srt_timestamp, parse_hex_rgb, SubtitleFormat,
    SubtitleLine, SubtitleLineBuilder, SubtitleStyle, SubtitleTrack,
};
use storyreel::timing::{TimeUnit, TimingRecord, TimingSource, Word};
use storyreel::validation::{TimecodeIssue, TimecodeValidator, TimecodeValidatorConfig};
use storyreel::SubtitleError;

use crate::common::{create_temp_dir, evenly_timed_words};

fn default_builder() -> SubtitleLineBuilder {
    SubtitleLineBuilder::from_config(&SubtitleConfig::default())
}

/// Test that the default builder groups four words per line
#[test]
fn test_build_withNineWords_shouldGroupByFour() {
    let words = evenly_timed_words("a b c d e f g h i");
    let lines = default_builder().build(&words);

    let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, vec!["a b c d", "e f g h", "i"]);
    assert_eq!((lines[1].start, lines[1].end), (4.0, 7.5));
    assert_eq!((lines[2].start, lines[2].end), (8.0, 8.5));
}

/// Test that line spans come from the first and last word
#[test]
fn test_build_withGapInsideLine_shouldSpanFirstToLastWord() {
    let words = vec![Word::new("far", 0.2, 0.4), Word::new("apart", 9.0, 9.6)];
    let lines = default_builder().build(&words);

    assert_eq!(lines.len(), 1);
    assert_eq!((lines[0].start, lines[0].end), (0.2, 9.6));
}

/// Test that every display text carries the style override prefix
#[test]
fn test_build_withCustomStyle_shouldPrefixOverrides() {
    let style = SubtitleStyle {
        font_size: 40,
        primary_color: "#FF0000".into(),
        ..SubtitleStyle::default()
    };
    let builder = SubtitleLineBuilder::new(style, 2, 2.5);
    let lines = builder.build(&evenly_timed_words("red words here"));

    for line in &lines {
        assert!(line.display_text.starts_with("{\\an2}{\\fs40}{\\b1}{\\c&H0000FF&}"));
        assert!(line.display_text.ends_with(&line.text));
    }
}

/// Test that untimed text gets back-to-back fixed-length lines
#[test]
fn test_build_untimed_withDefaultConfig_shouldChainLines() {
    let lines = default_builder().build_untimed("one two three four five six");

    assert_eq!(lines.len(), 2);
    assert_eq!((lines[0].start, lines[0].end), (0.0, 2.5));
    assert_eq!((lines[1].start, lines[1].end), (2.5, 5.0));
}

/// Test that an untimed source uses the untimed builder
#[test]
fn test_build_from_source_withUntimed_shouldUseFixedDuration() {
    let source = TimingSource::Untimed {
        text: "a b c d e".into(),
    };
    let lines = default_builder().build_from_source(&source, &TimingConfig::default());
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1].end, 5.0);
}

/// Test that an estimated source ends inside the narration
#[test]
fn test_build_from_source_withEstimate_shouldEndWithinDuration() {
    let source = TimingSource::Estimated {
        text: "Mưa rơi trên mái ngói cũ suốt đêm dài".into(),
        total_duration: 6.0,
    };
    let lines = default_builder().build_from_source(&source, &TimingConfig::default());

    assert_eq!(lines.len(), 3);
    assert!(lines.last().unwrap().end <= 6.0 + 1e-9);
    for pair in lines.windows(2) {
        assert!(pair[0].end <= pair[1].start);
    }
}

/// Test that millisecond external records are honoured
#[test]
fn test_build_from_source_withMillisecondRecords_shouldConvert() {
    let source = TimingSource::External {
        records: vec![TimingRecord::new("hi", 0.0, 250.0), TimingRecord::new("there", 300.0, 900.0)],
        unit: TimeUnit::Milliseconds,
    };
    let lines = default_builder().build_from_source(&source, &TimingConfig::default());
    assert_eq!(lines[0].end_ms(), 900);
}

/// Test timestamp formatting at boundaries
#[test]
fn test_format_timestamps_withRounding_shouldCarry() {
    assert_eq!(format_ass_timestamp(0.0), "0:00:00.00");
    assert_eq!(format_ass_timestamp(59.999), "0:01:00.00");
    assert_eq!(format_ass_timestamp(-1.0), "0:00:00.00");
    assert_eq!(format_srt_timestamp(0), "00:00:00,000");
    assert_eq!(format_srt_timestamp(61_001), "00:01:01,001");
}

/// Test hex colour parsing
#[test]
fn test_parse_hex_rgb_withVariants_shouldParseOrReject() {
    assert_eq!(parse_hex_rgb("#FFAA00"), Some((255, 170, 0)));
    assert_eq!(parse_hex_rgb("496d89"), Some((0x49, 0x6D, 0x89)));
    assert_eq!(parse_hex_rgb("#FFF"), None);
    assert_eq!(parse_hex_rgb("#GGGGGG"), None);
}

/// Test that newlines become ASS hard breaks
#[test]
fn test_to_ass_event_withNewline_shouldUseHardBreak() {
    let line = SubtitleLine::new(1.0, 2.0, "a\nb", "a\nb");
    assert_eq!(line.to_ass_event(), "Dialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,a\\Nb");
}

/// Test format detection from file names
#[test]
fn test_subtitle_format_from_path_shouldFollowExtension() {
    assert_eq!(SubtitleFormat::from_path(Path::new("out/subtitle.ASS")).unwrap(), SubtitleFormat::Ass);
    assert_eq!(SubtitleFormat::from_path(Path::new("subtitle.srt")).unwrap(), SubtitleFormat::Srt);
    assert!(matches!(
        SubtitleFormat::from_path(Path::new("subtitle")),
        Err(SubtitleError::UnsupportedFormat(_))
    ));
    assert_eq!(SubtitleFormat::Srt.file_name(), "subtitle.srt");
}

/// Test writing both formats to disk
#[test]
fn test_track_write_withBothFormats_shouldCreateFiles() {
    let temp_dir = create_temp_dir().unwrap();
    let builder = default_builder();
    let track = SubtitleTrack::new(builder.style().clone(), builder.build(&evenly_timed_words("x y z")));

    let ass_path = temp_dir.path().join("nested").join("subtitle.ass");
    let srt_path = temp_dir.path().join("subtitle.srt");
    track.write(&ass_path).unwrap();
    track.write(&srt_path).unwrap();

    let ass = fs::read_to_string(&ass_path).unwrap();
    assert!(ass.contains("[V4+ Styles]"));
    assert!(ass.contains("PlayResX: 640"));
    assert!(ass.contains("}x y z"));

    let srt = fs::read_to_string(&srt_path).unwrap();
    assert_eq!(srt, "1\n00:00:00,000 --> 00:00:02,500\nx y z\n\n");
}

/// Test that an empty track still writes a valid header
#[test]
fn test_track_write_withNoLines_shouldWriteHeaderOnly() {
    let temp_dir = create_temp_dir().unwrap();
    let track = SubtitleTrack::new(SubtitleStyle::default(), vec![]);
    let path = temp_dir.path().join("subtitle.ass");

    assert!(track.is_empty());
    track.write(&path).unwrap();
    let ass = fs::read_to_string(&path).unwrap();
    assert!(ass.contains("[Events]"));
    assert!(!ass.contains("Dialogue:"));
}

/// Test that overlapping lines are reported but zero-length lines are not
#[test]
fn test_validator_withOverlapAndZeroLength_shouldOnlyFlagOverlap() {
    let lines = vec![
        SubtitleLine::new(0.0, 2.0, "a", "a"),
        SubtitleLine::new(1.5, 3.0, "b", "b"),
        SubtitleLine::new(3.0, 3.0, "c", "c"),
    ];
    let result = TimecodeValidator::new().validate_lines(&lines);

    assert!(!result.passed);
    assert_eq!(result.overlap_count, 1);
    let failed = result.failed_entries();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].seq_num, 2);
    assert_eq!(
        failed[0].issues,
        vec![TimecodeIssue::OverlapsWithEntry { other_seq_num: 1, overlap_ms: 500 }]
    );
}

/// Test that large gaps are warnings that do not fail the track
#[test]
fn test_validator_withLargeGap_shouldWarnWithoutFailing() {
    let validator = TimecodeValidator::with_config(TimecodeValidatorConfig {
        check_overlaps: true,
        max_gap_warning_ms: 1000,
    });
    let lines = vec![SubtitleLine::new(0.0, 1.0, "a", "a"), SubtitleLine::new(5.0, 6.0, "b", "b")];
    let result = validator.validate_lines(&lines);

    assert!(result.passed);
    assert_eq!(result.total_issues, 1);
}

/// Test that braces and backslashes in story text cannot act as ASS markup
#[test]
fn test_build_withBracesInText_shouldEscapeDisplayText() {
    let words = vec![Word::new("{\\i1}loud", 0.0, 0.5), Word::new("a\\Nb", 0.5, 1.0)];
    let lines = default_builder().build(&words);

    assert_eq!(lines[0].text, "{\\i1}loud a\\Nb");
    assert!(lines[0].display_text.ends_with("\\{\\\\i1\\}loud a\\\\Nb"));
    assert_eq!(escape_ass_text("plain words"), "plain words");

    let srt = SubtitleTrack::new(SubtitleStyle::default(), lines).to_srt_string();
    assert!(srt.contains("{\\i1}loud a\\Nb"));
}

/// Test that the configured gap threshold reaches the builder's checks
#[test]
fn test_from_config_withGapThreshold_shouldReportLargeGaps() {
    let config = SubtitleConfig {
        words_per_line: 1,
        max_gap_warning_ms: 1000,
        ..SubtitleConfig::default()
    };
    let builder = SubtitleLineBuilder::from_config(&config);
    let lines = builder.build(&[Word::new("a", 0.0, 1.0), Word::new("b", 4.0, 5.0)]);

    let result = builder.validate(&lines);
    assert!(result.passed);
    assert_eq!(result.entry_results[1].issues, vec![TimecodeIssue::LargeGap { prev_seq_num: 1, gap_ms: 3000 }]);

    assert_eq!(default_builder().validate(&lines).total_issues, 0);
}
