/*!
 * Tests for file and directory utilities
 */

use std::fs;
use std::path::PathBuf;

use storyreel::file_utils::{FileManager, FileType};

use crate::common::{create_temp_dir, create_test_file, create_test_story, SAMPLE_STORY};

/// Test reading a story file
#[test]
fn test_read_story_withExistingFile_shouldReturnText() {
    let temp_dir = create_temp_dir().unwrap();
    let path = create_test_story(temp_dir.path()).unwrap();

    assert_eq!(FileManager::read_story(&path).unwrap(), SAMPLE_STORY);
}

/// Test that CRLF line endings are normalized
#[test]
fn test_read_story_withCrlf_shouldNormalizeLineEndings() {
    let temp_dir = create_temp_dir().unwrap();
    let path = create_test_file(temp_dir.path(), "story.txt", "One.\r\n\r\nTwo.\r\n").unwrap();

    assert_eq!(FileManager::read_story(&path).unwrap(), "One.\n\nTwo.\n");
}

/// Test that a missing story file is an error
#[test]
fn test_read_story_withMissingFile_shouldFail() {
    let temp_dir = create_temp_dir().unwrap();
    assert!(FileManager::read_story(temp_dir.path().join("missing.txt")).is_err());
}

/// Test image path naming
#[test]
fn test_segment_image_path_shouldZeroPadIndex() {
    let path = FileManager::segment_image_path("out", 3);
    assert_eq!(path, PathBuf::from("out").join("images").join("segment_03.png"));

    let path = FileManager::segment_image_path("out", 12);
    assert!(path.ends_with("segment_12.png"));
}

/// Test that writing creates missing parent directories
#[test]
fn test_write_to_file_withNestedPath_shouldCreateParents() {
    let temp_dir = create_temp_dir().unwrap();
    let path = temp_dir.path().join("a").join("b").join("c.txt");

    FileManager::write_to_file(&path, "hello").unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
    assert!(FileManager::dir_exists(temp_dir.path().join("a").join("b")));
}

/// Test output directory preparation and the overwrite guard
#[test]
fn test_prepare_output_dir_withExistingVideo_shouldRequireForce() {
    let temp_dir = create_temp_dir().unwrap();
    let output_dir = temp_dir.path().join("run");

    FileManager::prepare_output_dir(&output_dir, "video.mp4", false).unwrap();
    assert!(FileManager::dir_exists(&output_dir));

    create_test_file(&output_dir, "video.mp4", "old").unwrap();
    assert!(FileManager::prepare_output_dir(&output_dir, "video.mp4", false).is_err());
    assert!(FileManager::prepare_output_dir(&output_dir, "video.mp4", true).is_ok());
}

/// Test file type detection by extension
#[test]
fn test_detect_file_type_withKnownExtensions_shouldClassify() {
    let temp_dir = create_temp_dir().unwrap();
    let cases = [
        ("narration.MP3", FileType::Audio),
        ("voice.wav", FileType::Audio),
        ("segment_01.png", FileType::Image),
        ("story.txt", FileType::Text),
        ("notes.md", FileType::Text),
        ("clip.mkv", FileType::Unknown),
    ];

    for (name, expected) in cases {
        let path = create_test_file(temp_dir.path(), name, "x").unwrap();
        assert_eq!(FileManager::detect_file_type(&path).unwrap(), expected, "{name}");
    }
}

/// Test that detecting a missing file fails
#[test]
fn test_detect_file_type_withMissingFile_shouldFail() {
    let temp_dir = create_temp_dir().unwrap();
    assert!(FileManager::detect_file_type(temp_dir.path().join("nope.mp3")).is_err());
}
