/*!
 * Tests for word timing estimation and external timing records
 */

use storyreel::app_config::TimingConfig;
use storyreel::timing::{
    estimate_word_durations, load_timing_records, normalize_records, ParsedRecord, SkipReason,
    TimeUnit, TimeValue, TimingRecord, TimingSource, Word, WordTimingEstimator,
};

use crate::common::{create_temp_dir, create_test_file, create_timing_dump, evenly_timed_words};

/// Test that the estimate covers every word in order
#[test]
fn test_estimate_withSentence_shouldTimeEveryWord() {
    let words = estimate_word_durations("the quick brown fox", 4.0);

    let texts: Vec<&str> = words.iter().map(|w| w.text.as_str()).collect();
    assert_eq!(texts, vec!["the", "quick", "brown", "fox"]);
    assert_eq!(words[0].start, 0.0);
    assert!(words.last().unwrap().end <= 4.0 + 1e-9);
}

/// Test that pauses separate consecutive words
#[test]
fn test_estimate_withDefaultPause_shouldLeaveGapsBetweenWords() {
    let words = estimate_word_durations("one two three", 30.0);
    for pair in words.windows(2) {
        assert!(pair[1].start > pair[0].end);
    }
}

/// Test that a huge pause gets scaled back inside the audio
#[test]
fn test_estimate_withLargePause_shouldStayWithinDuration() {
    let estimator = WordTimingEstimator::new(&TimingConfig {
        inter_word_pause_secs: 5.0,
        ..TimingConfig::default()
    });
    let words = estimator.estimate("a b c d", 2.0);

    assert_eq!(words.len(), 4);
    assert!(words.iter().all(|w| w.end <= 2.0 + 1e-9));
    assert!(words.iter().all(|w| w.start <= w.end));
}

/// Test that negative durations are treated as zero
#[test]
fn test_estimate_withNegativeDuration_shouldClampToZero() {
    let words = estimate_word_durations("a b", -3.0);
    assert!(words.iter().all(|w| w.start == 0.0 && w.end == 0.0));
}

/// Test millisecond records are converted to seconds
#[test]
fn test_normalize_withMilliseconds_shouldConvert() {
    let records = vec![TimingRecord::new("xin", 0.0, 300.0), TimingRecord::new("chào", 350.0, 800.0)];
    let words = normalize_records(&records, TimeUnit::Milliseconds);

    assert_eq!(words, vec![Word::new("xin", 0.0, 0.3), Word::new("chào", 0.35, 0.8)]);
}

/// Test that a missing start falls back to the previous end
#[test]
fn test_normalize_withMissingStart_shouldUsePreviousEnd() {
    let records = vec![
        TimingRecord::new("one", 0.0, 1.0),
        TimingRecord {
            word: Some("two".into()),
            start: None,
            end: Some(TimeValue::Number(1.5)),
            ..TimingRecord::default()
        },
    ];
    let words = normalize_records(&records, TimeUnit::Seconds);
    assert_eq!(words[1], Word::new("two", 1.0, 1.5));
}

/// Test that an end before the start is clamped
#[test]
fn test_parse_withEndBeforeStart_shouldClampEnd() {
    let record = TimingRecord::new("late", 2.0, 1.0);
    assert_eq!(
        record.parse(TimeUnit::Seconds, 0.0),
        ParsedRecord::Word(Word::new("late", 2.0, 2.0))
    );
}

/// Test that blank words are skipped and the rest survive
#[test]
fn test_normalize_withBlankWord_shouldSkipRecord() {
    let records = vec![
        TimingRecord::new("  ", 0.0, 0.5),
        TimingRecord::new("kept", 0.5, 1.0),
    ];
    assert_eq!(records[0].parse(TimeUnit::Seconds, 0.0), ParsedRecord::Skip(SkipReason::MissingWord));
    assert_eq!(normalize_records(&records, TimeUnit::Seconds), vec![Word::new("kept", 0.5, 1.0)]);
}

/// Test that timecode strings are accepted in records
#[test]
fn test_parse_withTimecodeStrings_shouldConvert() {
    let record = TimingRecord {
        word: Some("dawn".into()),
        start: Some(TimeValue::Timecode("00:00:01,250".into())),
        end: Some(TimeValue::Timecode("00:00:02.5".into())),
        ..TimingRecord::default()
    };
    assert_eq!(
        record.parse(TimeUnit::Milliseconds, 0.0),
        ParsedRecord::Word(Word::new("dawn", 1.25, 2.5))
    );
}

/// Test that a dump written from words loads back as records
#[test]
fn test_load_timing_records_withDump_shouldReadAllRecords() {
    let temp_dir = create_temp_dir().unwrap();
    let words = evenly_timed_words("snow fell softly");
    let path = create_timing_dump(temp_dir.path(), &words).unwrap();

    let records = load_timing_records(&path).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(normalize_records(&records, TimeUnit::Seconds), words);
}

/// Test that loosely shaped JSON is accepted
#[test]
fn test_load_timing_records_withMixedShapes_shouldDeserialize() {
    let temp_dir = create_temp_dir().unwrap();
    let json = r#"[
        {"word": "a", "start": 0, "end": 0.4},
        {"word": "b", "end": "00:00:01,000"},
        {"start": 1.0, "end": 1.2},
        {"word": "c", "start": 1.2}
    ]"#;
    let path = create_test_file(temp_dir.path(), "timings.json", json).unwrap();

    let records = load_timing_records(&path).unwrap();
    assert_eq!(records.len(), 4);

    let words = normalize_records(&records, TimeUnit::Seconds);
    assert_eq!(words, vec![Word::new("a", 0.0, 0.4), Word::new("b", 0.4, 1.0)]);
}

/// Test that invalid JSON is reported as an error
#[test]
fn test_load_timing_records_withInvalidJson_shouldFail() {
    let temp_dir = create_temp_dir().unwrap();
    let path = create_test_file(temp_dir.path(), "timings.json", "{not json").unwrap();
    assert!(load_timing_records(&path).is_err());
}

/// Test the source selection of a narration
#[test]
fn test_timing_source_withNoRecords_shouldEstimateFromDuration() {
    let source = TimingSource::from_narration("one two", 1.0, None, TimeUnit::Seconds);
    let words = source.words(&TimingConfig::default()).unwrap();
    assert_eq!(words.len(), 2);
    assert!(words[1].end <= 1.0 + 1e-9);
}
