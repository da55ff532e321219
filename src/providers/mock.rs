/*!
 * Mock collaborator implementations for testing.
 *
 * This module provides mocks that simulate different behaviors:
 * - `MockImageGenerator::working()` - Always writes a fake image
 * - `MockImageGenerator::intermittent(n)` - Fails every nth request
 * - `MockImageGenerator::failing()` - Always fails with an error
 * - `MockNarration` - Fixed duration, optional word events
 * - `MockMuxer` - Records jobs, optionally rejects captioned ones
 */

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::errors::{AppError, MediaError, ProviderError};
use crate::providers::{ImageGenerator, MuxJob, Narration, NarrationSynthesizer, VideoMuxer};
use crate::timing::TimingRecord;

/// Behavior mode for the mock image generator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Simulates slow generation
    Slow { delay_ms: u64 },
}

/// Mock image generator
#[derive(Debug)]
pub struct MockImageGenerator {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter for intermittent failures
    request_count: Arc<AtomicUsize>,
    /// Prompts received, in call order
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockImageGenerator {
    /// Create a new mock generator with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a working mock generator that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create an intermittently failing mock generator; `fail_every` of 0 is treated as 1
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every: fail_every.max(1) })
    }

    /// Create a failing mock generator that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Number of generate calls so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    async fn write_fake_image(output_path: &Path) -> Result<PathBuf, AppError> {
        if let Some(parent) = output_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(output_path, b"\x89PNG mock").await?;
        Ok(output_path.to_path_buf())
    }
}

impl Clone for MockImageGenerator {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
            prompts: Arc::clone(&self.prompts),
        }
    }
}

#[async_trait]
impl ImageGenerator for MockImageGenerator {
    async fn generate(&self, prompt: &str, output_path: &Path) -> Result<PathBuf, AppError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        match self.behavior {
            MockBehavior::Working => Self::write_fake_image(output_path).await,

            MockBehavior::Intermittent { fail_every } => {
                let fail_every = fail_every.max(1);
                if count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    }
                    .into())
                } else {
                    Self::write_fake_image(output_path).await
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }
            .into()),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Self::write_fake_image(output_path).await
            }
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Mock narration with a fixed duration
#[derive(Debug, Clone)]
pub struct MockNarration {
    audio_path: PathBuf,
    duration_secs: f64,
    word_timings: Option<Vec<TimingRecord>>,
    failing: bool,
}

impl MockNarration {
    /// Narration of `duration_secs` without word events
    pub fn new(duration_secs: f64) -> Self {
        Self {
            audio_path: PathBuf::from("mock_narration.mp3"),
            duration_secs,
            word_timings: None,
            failing: false,
        }
    }

    /// Report these word events with the narration
    pub fn with_word_timings(mut self, records: Vec<TimingRecord>) -> Self {
        self.word_timings = Some(records);
        self
    }

    /// Narration that always fails
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::new(0.0)
        }
    }
}

#[async_trait]
impl NarrationSynthesizer for MockNarration {
    async fn synthesize(&self, _text: &str) -> Result<Narration, AppError> {
        if self.failing {
            return Err(ProviderError::RequestFailed("Simulated narration failure".to_string()).into());
        }
        Ok(Narration {
            audio_path: self.audio_path.clone(),
            duration_secs: self.duration_secs,
            word_timings: self.word_timings.clone(),
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Mock muxer recording every job it receives
#[derive(Debug, Clone, Default)]
pub struct MockMuxer {
    /// Reject jobs that burn in captions
    fail_with_subtitles: bool,
    /// Reject every job
    always_fail: bool,
    jobs: Arc<Mutex<Vec<MuxJob>>>,
}

impl MockMuxer {
    /// Muxer that accepts every job
    pub fn working() -> Self {
        Self::default()
    }

    /// Muxer whose subtitle burn-in fails
    pub fn failing_with_subtitles() -> Self {
        Self {
            fail_with_subtitles: true,
            ..Self::default()
        }
    }

    /// Muxer that always fails
    pub fn failing() -> Self {
        Self {
            always_fail: true,
            ..Self::default()
        }
    }

    /// Jobs received so far
    pub fn jobs(&self) -> Vec<MuxJob> {
        self.jobs.lock().map(|j| j.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl VideoMuxer for MockMuxer {
    async fn mux(&self, job: &MuxJob) -> Result<PathBuf, AppError> {
        if let Ok(mut jobs) = self.jobs.lock() {
            jobs.push(job.clone());
        }

        if job.images.is_empty() {
            return Err(MediaError::NoImages.into());
        }
        if self.always_fail || (self.fail_with_subtitles && job.subtitles.is_some()) {
            return Err(MediaError::Failed {
                tool: "ffmpeg".to_string(),
                stderr: "Simulated muxing failure".to_string(),
            }
            .into());
        }

        if let Some(parent) = job.output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&job.output, b"mock video").await?;
        Ok(job.output.clone())
    }
}
