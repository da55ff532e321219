use anyhow::{Result, Context, anyhow};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, warn, info, debug};
use std::path::{Path, PathBuf};

use crate::app_config::{Config, ImageProvider};
use crate::errors::MediaError;
use crate::file_utils::FileManager;
use crate::providers::{
    FfmpegMuxer, ImageGenerator, Leonardo, MuxJob, NarrationSynthesizer, PlaceholderImages,
    PrerecordedNarration, VideoMuxer,
};
use crate::story::{PromptSpec, StoryPlan, SEGMENT_DUMP_FILE};
use crate::subtitle_processor::{SubtitleLineBuilder, SubtitleTrack};
use crate::timing::{save_timing_dump, TimingSource, TIMING_DUMP_FILE};

// @module: Application controller for the story-to-video pipeline

/// File name of the rendered video inside an output directory
pub const VIDEO_FILE: &str = "video.mp4";

/// How a segment got its image
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentImage {
    /// The image generator produced it
    Generated(PathBuf),
    /// Solid colour frame instead
    Placeholder(PathBuf),
    /// Not even a placeholder could be made; left out of the slideshow
    Dropped,
}

impl SegmentImage {
    pub fn path(&self) -> Option<&Path> {
        match self {
            SegmentImage::Generated(path) | SegmentImage::Placeholder(path) => Some(path),
            SegmentImage::Dropped => None,
        }
    }
}

/// Caption artifacts of one run
#[derive(Debug, Clone)]
pub struct SubtitleArtifacts {
    /// Written caption track
    pub subtitle_path: PathBuf,
    /// Timing dump, absent for untimed captions
    pub timings_path: Option<PathBuf>,
    /// Number of caption lines
    pub line_count: usize,
}

/// What a full run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    pub segments_path: PathBuf,
    pub images: Vec<SegmentImage>,
    pub subtitles: SubtitleArtifacts,
    pub video_path: PathBuf,
    /// False when burning in the captions failed and the video was muxed without them
    pub captioned: bool,
}

impl RunReport {
    /// Segments rendered with a placeholder
    pub fn placeholder_count(&self) -> usize {
        self.images
            .iter()
            .filter(|i| matches!(i, SegmentImage::Placeholder(_)))
            .count()
    }
}

/// Build the caption track (and timing dump) for `source` into `output_dir`
pub fn emit_subtitles(config: &Config, source: &TimingSource, output_dir: &Path) -> Result<SubtitleArtifacts> {
    FileManager::ensure_dir(output_dir)?;

    let timings_path = match source.words(&config.timing) {
        Some(words) => {
            let path = output_dir.join(TIMING_DUMP_FILE);
            save_timing_dump(&path, &words).context("Failed to write timing dump")?;
            debug!("Saved {} word timings to {}", words.len(), path.display());
            Some(path)
        }
        None => None,
    };

    let builder = SubtitleLineBuilder::from_config(&config.subtitle);
    let lines = builder.build_from_source(source, &config.timing);
    let line_count = lines.len();

    let subtitle_path = output_dir.join(config.subtitle.format.file_name());
    SubtitleTrack::new(builder.style().clone(), lines)
        .write(&subtitle_path)
        .context("Failed to write subtitle track")?;
    info!("Saved {} subtitle lines to {}", line_count, subtitle_path.display());

    Ok(SubtitleArtifacts {
        subtitle_path,
        timings_path,
        line_count,
    })
}

/// Main application controller for story videos
pub struct Controller {
    // @field: App configuration
    config: Config,
    narration: Box<dyn NarrationSynthesizer>,
    images: Box<dyn ImageGenerator>,
    placeholder: Box<dyn ImageGenerator>,
    muxer: Box<dyn VideoMuxer>,
    show_progress: bool,
}

impl Controller {
    // @method: Create a controller with the real collaborators for the given configuration
    pub fn with_config(config: Config, audio_path: PathBuf, timings_path: Option<PathBuf>) -> Result<Self> {
        config.validate()?;

        let narration = Box::new(PrerecordedNarration::new(audio_path, timings_path, &config.video));
        let placeholder = Box::new(PlaceholderImages::new(&config.image, &config.video));
        let images: Box<dyn ImageGenerator> = match config.image.provider {
            ImageProvider::Leonardo => Box::new(Leonardo::new(&config.image)),
            ImageProvider::Placeholder => Box::new(PlaceholderImages::new(&config.image, &config.video)),
        };
        let muxer = Box::new(FfmpegMuxer::new(&config.video));

        Ok(Self::with_collaborators(config, narration, images, placeholder, muxer))
    }

    /// Create a controller around explicit collaborators
    pub fn with_collaborators(
        config: Config,
        narration: Box<dyn NarrationSynthesizer>,
        images: Box<dyn ImageGenerator>,
        placeholder: Box<dyn ImageGenerator>,
        muxer: Box<dyn VideoMuxer>,
    ) -> Self {
        Self {
            config,
            narration,
            images,
            placeholder,
            muxer,
            show_progress: true,
        }
    }

    /// Disable the progress bar
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the whole pipeline for `story`, writing every artifact into `output_dir`
    pub async fn run(&self, story: &str, output_dir: &Path, force_overwrite: bool) -> Result<RunReport> {
        let start_time = std::time::Instant::now();

        if story.trim().is_empty() {
            return Err(anyhow!("Story is empty"));
        }
        FileManager::prepare_output_dir(output_dir, VIDEO_FILE, force_overwrite)?;

        let plan = StoryPlan::build(story, &self.config);
        let progress = self.progress_bar(plan.segments.len() as u64 + 4);

        info!(
            "Story split into {} segments ({} with text)",
            plan.segments.len(),
            plan.non_empty_count()
        );
        let segments_path = output_dir.join(SEGMENT_DUMP_FILE);
        plan.save_dump(&segments_path)?;
        progress.inc(1);

        progress.set_message("Narration");
        let narration = self
            .narration
            .synthesize(story)
            .await
            .with_context(|| format!("Narration with {} failed", self.narration.name()))?;
        progress.inc(1);

        progress.set_message("Images");
        let images = self.generate_images(&plan.prompts, output_dir, &progress).await;
        let slides: Vec<PathBuf> = images
            .iter()
            .filter_map(|image| image.path().map(Path::to_path_buf))
            .collect();
        if slides.is_empty() {
            progress.abandon();
            return Err(MediaError::NoImages.into());
        }

        progress.set_message("Subtitles");
        let source = TimingSource::from_narration(
            story,
            narration.duration_secs,
            narration.word_timings.clone(),
            self.config.timing.external_unit,
        );
        let subtitles = emit_subtitles(&self.config, &source, output_dir)?;
        progress.inc(1);

        progress.set_message("Video");
        let job = MuxJob {
            images: slides,
            audio: narration.audio_path.clone(),
            duration_secs: narration.duration_secs,
            subtitles: (subtitles.line_count > 0).then(|| subtitles.subtitle_path.clone()),
            output: output_dir.join(VIDEO_FILE),
        };
        let (video_path, captioned) = self.mux_with_fallback(&job).await?;
        progress.inc(1);
        progress.finish_and_clear();

        info!(
            "Video complete in {}: {}",
            Self::format_duration(start_time.elapsed()),
            video_path.display()
        );

        Ok(RunReport {
            segments_path,
            images,
            subtitles,
            video_path,
            captioned,
        })
    }

    /// One image per prompt, in segment order, at most `concurrent_requests` at a time
    async fn generate_images(&self, prompts: &[PromptSpec], output_dir: &Path, progress: &ProgressBar) -> Vec<SegmentImage> {
        let concurrency = self.config.image.concurrent_requests.max(1);

        info!(
            "Generating {} images with {} ({} in flight)",
            prompts.len(),
            self.images.name(),
            concurrency
        );

        stream::iter(prompts)
            .map(|prompt| {
                let path = FileManager::segment_image_path(output_dir, prompt.segment_index);
                async move {
                    let image = self.image_for_segment(prompt, path).await;
                    progress.inc(1);
                    image
                }
            })
            .buffered(concurrency)
            .collect()
            .await
    }

    async fn image_for_segment(&self, prompt: &PromptSpec, path: PathBuf) -> SegmentImage {
        if prompt.is_empty() {
            debug!("Segment {} has no prompt, using a placeholder", prompt.segment_index);
        } else {
            match self.images.generate(&prompt.text, &path).await {
                Ok(written) => return SegmentImage::Generated(written),
                Err(e) => warn!(
                    "Image generation failed for segment {}: {}, using a placeholder",
                    prompt.segment_index, e
                ),
            }
        }

        match self.placeholder.generate(&prompt.text, &path).await {
            Ok(written) => SegmentImage::Placeholder(written),
            Err(e) => {
                error!(
                    "Placeholder failed for segment {}: {}, leaving it out of the video",
                    prompt.segment_index, e
                );
                SegmentImage::Dropped
            }
        }
    }

    /// Mux with captions, falling back to an uncaptioned video
    async fn mux_with_fallback(&self, job: &MuxJob) -> Result<(PathBuf, bool)> {
        match self.muxer.mux(job).await {
            Ok(path) => Ok((path, job.subtitles.is_some())),
            Err(e) if job.subtitles.is_some() => {
                warn!("Muxing with subtitles failed: {}. Retrying without subtitles", e);
                let path = self
                    .muxer
                    .mux(&job.without_subtitles())
                    .await
                    .context("Muxing failed even without subtitles")?;
                Ok((path, false))
            }
            Err(e) => Err(anyhow!("Muxing failed: {}", e)),
        }
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let progress_bar = ProgressBar::new(len);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar.set_message("Segmenting");
        progress_bar
    }

    /// Format a duration as a human readable string
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
