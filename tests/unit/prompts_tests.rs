/*!
 * Tests for visual prompt extraction
 */

use storyreel::app_config::PromptConfig;
use storyreel::story::{shorten, PromptExtractor, Segment};

fn extractor_with(keywords: &[&str], suffix: &str, max_width: usize) -> PromptExtractor {
    PromptExtractor::new(&PromptConfig {
        max_width,
        style_suffix: suffix.to_string(),
        visual_keywords: keywords.iter().map(|k| k.to_string()).collect(),
    })
}

/// Test that matching is case-insensitive
#[test]
fn test_extract_withUppercaseKeyword_shouldMatchLine() {
    let extractor = extractor_with(&["lantern"], "ink wash", 250);
    let prompt = extractor.extract("A LANTERN swung in the wind.\nShe waited.");
    assert_eq!(prompt, "A LANTERN swung in the wind. ink wash");
}

/// Test that several visual lines are joined in order
#[test]
fn test_extract_withSeveralVisualLines_shouldJoinInOrder() {
    let extractor = extractor_with(&["moon", "river"], "", 250);
    let prompt = extractor.extract("The moon rose.\nNobody spoke.\nThe river froze.");
    assert_eq!(prompt, "The moon rose. The river froze.");
}

/// Test the fallback to the first sentences when nothing is visual
#[test]
fn test_extract_withoutKeywords_shouldUseOpeningSentences() {
    let extractor = extractor_with(&["dragon"], "style", 250);
    let prompt = extractor.extract("One. Two! Three? Four.");
    assert_eq!(prompt, "One Two Three style");
}

/// Test that a description made only of dialogue collapses to the suffix
#[test]
fn test_extract_withOnlyDialogue_shouldReturnSuffixOnly() {
    let extractor = extractor_with(&["see"], "style", 250);
    assert_eq!(extractor.extract("\"Do you see it?\""), "style");
}

/// Test that typographic quotes are removed too
#[test]
fn test_extract_withTypographicQuotes_shouldDropDialogue() {
    let extractor = extractor_with(&["glow"], "", 250);
    let prompt = extractor.extract("“What a glow,” she whispered.\nA faint glow rose over the hills.");
    assert_eq!(prompt, "A faint glow rose over the hills.");
}

/// Test that the description is shortened before the suffix is appended
#[test]
fn test_extract_withLongDescription_shouldShortenBeforeSuffix() {
    let extractor = extractor_with(&["sky"], "STYLE", 20);
    let prompt = extractor.extract("The sky over the valley burned orange and gold.");

    let (description, suffix) = prompt.rsplit_once(' ').unwrap();
    assert_eq!(suffix, "STYLE");
    assert!(description.ends_with("..."));
    assert!(description.chars().count() <= 20);
}

/// Test that the default configuration produces a styled prompt
#[test]
fn test_extract_withDefaultConfig_shouldAppendStyleSuffix() {
    let config = PromptConfig::default();
    let prompt = PromptExtractor::new(&config).extract("The sun set behind the mountain.");
    assert!(prompt.starts_with("The sun set behind the mountain."));
    assert!(prompt.ends_with(&config.style_suffix));
}

/// Test that padding segments yield empty prompts
#[test]
fn test_extract_all_withPadding_shouldLeavePromptEmpty() {
    let extractor = extractor_with(&["sky"], "style", 250);
    let segments = vec![Segment::new(1, "Grey sky."), Segment::new(2, ""), Segment::new(3, "   ")];
    let prompts = extractor.extract_all(&segments);

    assert_eq!(prompts[0].text, "Grey sky. style");
    assert!(prompts[1].is_empty());
    assert!(prompts[2].is_empty());
    assert_eq!(prompts[2].segment_index, 3);
}

/// Test that multibyte text is measured in characters
#[test]
fn test_shorten_withVietnamese_shouldCountCharacters() {
    let text = "Ánh trăng chiếu xuống mặt hồ";
    assert_eq!(shorten(text, 100), text);
    let short = shorten(text, 12);
    assert_eq!(short, "Ánh trăng...");
}
