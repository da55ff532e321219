/*!
 * Collaborators of the video pipeline.
 *
 * The story core never talks to the outside world; everything that does sits
 * behind one of these traits:
 * - `NarrationSynthesizer`: audio for the story, with optional word events
 * - `ImageGenerator`: one still per segment prompt
 * - `VideoMuxer`: slideshow + audio (+ burned captions) into a video
 *
 * Implementations:
 * - `leonardo`: Leonardo.ai generations API
 * - `media`: ffprobe/ffmpeg backed narration, placeholder images and muxing
 * - `mock`: scripted behaviours for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::path::{Path, PathBuf};

use crate::errors::AppError;
use crate::timing::TimingRecord;

/// Narration audio and whatever timing the source knows about it
#[derive(Debug, Clone, PartialEq)]
pub struct Narration {
    /// Audio file
    pub audio_path: PathBuf,
    /// Audio length in seconds
    pub duration_secs: f64,
    /// Per-word events, when the source reports them
    pub word_timings: Option<Vec<TimingRecord>>,
}

/// Inputs of one muxing run
#[derive(Debug, Clone, PartialEq)]
pub struct MuxJob {
    /// Slides in display order, each shown for `duration_secs / images.len()`
    pub images: Vec<PathBuf>,
    /// Narration audio
    pub audio: PathBuf,
    /// Narration length in seconds
    pub duration_secs: f64,
    /// Caption track to burn in
    pub subtitles: Option<PathBuf>,
    /// Destination video
    pub output: PathBuf,
}

impl MuxJob {
    /// Same job without captions
    pub fn without_subtitles(&self) -> Self {
        Self {
            subtitles: None,
            ..self.clone()
        }
    }

    /// Seconds each image stays on screen
    pub fn seconds_per_image(&self) -> f64 {
        if self.images.is_empty() {
            0.0
        } else {
            self.duration_secs / self.images.len() as f64
        }
    }
}

/// Produces the narration track for a story
#[async_trait]
pub trait NarrationSynthesizer: Send + Sync + Debug {
    /// Narrate `text`
    async fn synthesize(&self, text: &str) -> Result<Narration, AppError>;

    /// Short name for logs
    fn name(&self) -> &str;
}

/// Produces one image for a prompt
#[async_trait]
pub trait ImageGenerator: Send + Sync + Debug {
    /// Render `prompt` into `output_path` and return the written path
    async fn generate(&self, prompt: &str, output_path: &Path) -> Result<PathBuf, AppError>;

    /// Short name for logs
    fn name(&self) -> &str;
}

/// Combines slides, narration and captions
#[async_trait]
pub trait VideoMuxer: Send + Sync + Debug {
    /// Run the job and return the written video path
    async fn mux(&self, job: &MuxJob) -> Result<PathBuf, AppError>;
}

pub mod leonardo;
pub mod media;
pub mod mock;

pub use leonardo::Leonardo;
pub use media::{FfmpegMuxer, PlaceholderImages, PrerecordedNarration, probe_duration};
