/*!
 * Tests for paragraph-based story segmentation
 */

use storyreel::story::{segment, split_paragraphs, Segment};

use crate::common::SAMPLE_STORY;

fn texts(segments: &[Segment]) -> Vec<&str> {
    segments.iter().map(|s| s.text.as_str()).collect()
}

/// Test that each paragraph gets its own segment when there are few enough
#[test]
fn test_segment_withFewerParagraphsThanSegments_shouldKeepOnePerSegment() {
    let segments = segment(SAMPLE_STORY, 8);

    assert_eq!(segments.len(), 8);
    assert_eq!(segments[0].text, "Snow fell on the mountain pass.");
    assert_eq!(segments[4].text, "They walked to the inn together.");
    assert!(segments[5..].iter().all(Segment::is_empty));
}

/// Test that indices are 1-based and contiguous
#[test]
fn test_segment_indices_shouldStartAtOne() {
    let segments = segment(SAMPLE_STORY, 3);
    let indices: Vec<usize> = segments.iter().map(|s| s.index).collect();
    assert_eq!(indices, vec![1, 2, 3]);
}

/// Test grouping when paragraphs outnumber segments
#[test]
fn test_segment_withFiveParagraphsIntoTwo_shouldAnchorWindowsAtEnd() {
    let segments = segment("A\n\nB\n\nC\n\nD\n\nE", 2);
    assert_eq!(texts(&segments), vec!["A\n\nB", "C\n\nD\n\nE"]);
}

/// Test that paragraph count equal to segment count maps one to one
#[test]
fn test_segment_withExactParagraphCount_shouldNotPad() {
    let segments = segment("A\n\nB\n\nC", 3);
    assert_eq!(texts(&segments), vec!["A", "B", "C"]);
    assert!(segments.iter().all(|s| !s.is_empty()));
}

/// Test that a single requested segment holds the whole story
#[test]
fn test_segment_withOneSegment_shouldJoinAllParagraphs() {
    let segments = segment("A\n\n\n\nB\n   \nC", 1);
    assert_eq!(texts(&segments), vec!["A\n\nB\n\nC"]);
}

/// Test that single newlines do not break a paragraph
#[test]
fn test_split_paragraphs_withSingleNewlines_shouldKeepLinesTogether() {
    let paragraphs = split_paragraphs("line one\nline two\n\nnext");
    assert_eq!(paragraphs, vec!["line one\nline two", "next"]);
}

/// Test that order is preserved across many segment counts
#[test]
fn test_segment_orderInvariant_shouldPreserveParagraphOrder() {
    let story: String = (1..=11)
        .map(|i| format!("P{i}"))
        .collect::<Vec<_>>()
        .join("\n\n");

    for n in [2, 3, 4, 5, 7] {
        let flattened: Vec<String> = segment(&story, n)
            .iter()
            .flat_map(|s| split_paragraphs(&s.text))
            .collect();
        let expected: Vec<String> = (1..=11).map(|i| format!("P{i}")).collect();
        assert_eq!(flattened, expected, "n = {n}");
    }
}
