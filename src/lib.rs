/*!
 * # storyreel - narrated story videos
 *
 * A Rust library that turns a block of story text into a narrated slideshow
 * video with burned-in, word-timed captions.
 *
 * ## Features
 *
 * - Split a story into a fixed number of paragraph-aligned segments
 * - Derive a visual image prompt for every segment
 * - Estimate word timings from the narration length, or normalize the word
 *   events a narration service reports
 * - Build styled caption lines (ASS or SRT)
 * - Generate segment images (Leonardo.ai or solid-colour placeholders)
 * - Mux slides, narration and captions with ffmpeg
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `story`: Segmentation and prompt extraction:
 *   - `story::segmenter`: Paragraph grouping into N segments
 *   - `story::prompts`: Keyword-based visual prompts
 * - `timing`: Word timings:
 *   - `timing::estimator`: Proportional estimation
 *   - `timing::external`: Externally reported word events
 * - `subtitle_processor`: Caption lines, styles and track rendering
 * - `validation`: Timecode checks of built caption lines
 * - `providers`: Narration, image and muxing collaborators
 * - `app_controller`: Main application controller
 * - `app_config`: Configuration management
 * - `file_utils`: File system operations
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod providers;
pub mod story;
pub mod subtitle_processor;
pub mod timing;
pub mod validation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, RunReport};
pub use story::{segment, PromptExtractor, Segment, StoryPlan};
pub use subtitle_processor::{SubtitleLine, SubtitleLineBuilder, SubtitleStyle, SubtitleTrack};
pub use timing::{estimate_word_durations, TimingRecord, TimingSource, Word};
pub use errors::{AppError, MediaError, ProviderError, SubtitleError, TimingError};
