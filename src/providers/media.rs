use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, info, warn};
use tokio::process::Command;

use crate::app_config::{ImageConfig, VideoConfig};
use crate::errors::{AppError, MediaError};
use crate::file_utils::FileManager;
use crate::providers::{ImageGenerator, MuxJob, Narration, NarrationSynthesizer, VideoMuxer};
use crate::subtitle_processor::parse_hex_rgb;
use crate::timing::load_timing_records;

// @module: ffprobe/ffmpeg backed collaborators

/// Frame rate of the rendered slideshow
const OUTPUT_FPS: u32 = 24;

/// Timeout for ffprobe calls
const PROBE_TIMEOUT_SECS: u64 = 60;

/// Run a media tool, killing it when the timeout elapses
pub async fn run_tool(program: &Path, args: &[String], timeout_secs: u64) -> Result<Output, MediaError> {
    let tool = program
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| program.display().to_string());

    debug!("Running {} {}", tool, args.join(" "));

    let future = Command::new(program).args(args).kill_on_drop(true).output();

    let timeout_duration = Duration::from_secs(timeout_secs);
    let output = tokio::select! {
        result = future => {
            result.map_err(|e| MediaError::Spawn { tool: tool.clone(), message: e.to_string() })?
        },
        _ = tokio::time::sleep(timeout_duration) => {
            return Err(MediaError::TimedOut { tool, secs: timeout_secs });
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let filtered = filter_ffmpeg_stderr(&stderr);
        error!("{} failed: {}", tool, filtered);
        return Err(MediaError::Failed { tool, stderr: filtered });
    }

    Ok(output)
}

/// Filter ffmpeg stderr to only show meaningful error lines, stripping the
/// version banner, build configuration, and stream metadata noise.
pub fn filter_ffmpeg_stderr(stderr: &str) -> String {
    let noise_prefixes = [
        "ffmpeg version",
        "ffprobe version",
        "built with",
        "configuration:",
        "lib",
        "Input #",
        "Metadata:",
        "Duration:",
        "Stream #",
        "encoder",
        "Output #",
        "Stream mapping:",
        "Press [q]",
        "frame=",
    ];

    let meaningful: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !noise_prefixes.iter().any(|p| line.starts_with(p)))
        .collect();

    if meaningful.is_empty() {
        "unknown ffmpeg error (stderr was empty after filtering)".to_string()
    } else {
        meaningful.join("\n")
    }
}

/// Escape a path for use inside an ffmpeg filter argument
pub fn escape_ffmpeg_filter_path(path: &Path) -> String {
    let normalized = path.to_string_lossy().replace('\\', "/");
    let mut escaped = String::with_capacity(normalized.len() + 12);
    for ch in normalized.chars() {
        match ch {
            ':' => escaped.push_str("\\:"),
            '\'' => escaped.push_str("\\'"),
            ',' => escaped.push_str("\\,"),
            ';' => escaped.push_str("\\;"),
            '[' => escaped.push_str("\\["),
            ']' => escaped.push_str("\\]"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Length of a media file in seconds
pub async fn probe_duration(ffprobe: &Path, media: &Path) -> Result<f64, MediaError> {
    let args = vec![
        "-v".to_string(),
        "error".to_string(),
        "-show_entries".to_string(),
        "format=duration".to_string(),
        "-of".to_string(),
        "default=noprint_wrappers=1:nokey=1".to_string(),
        media.to_string_lossy().to_string(),
    ];
    let output = run_tool(ffprobe, &args, PROBE_TIMEOUT_SECS).await?;

    parse_probe_duration(&String::from_utf8_lossy(&output.stdout))
        .ok_or_else(|| MediaError::UnknownDuration(media.display().to_string()))
}

fn parse_probe_duration(stdout: &str) -> Option<f64> {
    stdout
        .lines()
        .find_map(|line| line.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
}

/// Concat demuxer script showing each image for `seconds_per_image`
pub fn concat_list(images: &[PathBuf], seconds_per_image: f64) -> String {
    let mut list = String::from("ffconcat version 1.0\n");
    for image in images {
        let quoted = image.to_string_lossy().replace('\'', "'\\''");
        list.push_str(&format!("file '{}'\nduration {:.3}\n", quoted, seconds_per_image));
    }
    // The demuxer ignores the last duration unless the file is repeated
    if let Some(last) = images.last() {
        let quoted = last.to_string_lossy().replace('\'', "'\\''");
        list.push_str(&format!("file '{}'\n", quoted));
    }
    list
}

/// Narration from an already recorded audio file
#[derive(Debug, Clone)]
pub struct PrerecordedNarration {
    audio_path: PathBuf,
    timings_path: Option<PathBuf>,
    ffprobe_path: PathBuf,
}

impl PrerecordedNarration {
    pub fn new(audio_path: impl Into<PathBuf>, timings_path: Option<PathBuf>, video: &VideoConfig) -> Self {
        Self {
            audio_path: audio_path.into(),
            timings_path,
            ffprobe_path: video.ffprobe_path.clone(),
        }
    }
}

#[async_trait]
impl NarrationSynthesizer for PrerecordedNarration {
    async fn synthesize(&self, _text: &str) -> Result<Narration, AppError> {
        if !FileManager::file_exists(&self.audio_path) {
            return Err(AppError::File(format!(
                "Narration audio does not exist: {}",
                self.audio_path.display()
            )));
        }

        let duration_secs = probe_duration(&self.ffprobe_path, &self.audio_path).await?;
        info!(
            "Narration {} lasts {:.2}s",
            self.audio_path.display(),
            duration_secs
        );

        let word_timings = match &self.timings_path {
            Some(path) => Some(load_timing_records(path)?),
            None => None,
        };

        Ok(Narration {
            audio_path: self.audio_path.clone(),
            duration_secs,
            word_timings,
        })
    }

    fn name(&self) -> &str {
        "prerecorded"
    }
}

/// Solid colour frames rendered by ffmpeg
#[derive(Debug, Clone)]
pub struct PlaceholderImages {
    /// `0xRRGGBB`, as the lavfi color source expects
    color: String,
    width: u32,
    height: u32,
    ffmpeg_path: PathBuf,
    timeout_secs: u64,
}

impl PlaceholderImages {
    pub fn new(image: &ImageConfig, video: &VideoConfig) -> Self {
        let (r, g, b) = parse_hex_rgb(&image.placeholder_color).unwrap_or((0x49, 0x6D, 0x89));
        Self {
            color: format!("0x{:02X}{:02X}{:02X}", r, g, b),
            width: image.width,
            height: image.height,
            ffmpeg_path: video.ffmpeg_path.clone(),
            timeout_secs: video.ffmpeg_timeout_secs,
        }
    }
}

#[async_trait]
impl ImageGenerator for PlaceholderImages {
    async fn generate(&self, _prompt: &str, output_path: &Path) -> Result<PathBuf, AppError> {
        if let Some(parent) = output_path.parent() {
            FileManager::ensure_dir(parent)?;
        }

        let args = vec![
            "-y".to_string(),
            "-f".to_string(),
            "lavfi".to_string(),
            "-i".to_string(),
            format!("color=c={}:s={}x{}", self.color, self.width, self.height),
            "-frames:v".to_string(),
            "1".to_string(),
            output_path.to_string_lossy().to_string(),
        ];
        run_tool(&self.ffmpeg_path, &args, self.timeout_secs).await?;

        debug!("Placeholder image written to {}", output_path.display());
        Ok(output_path.to_path_buf())
    }

    fn name(&self) -> &str {
        "placeholder"
    }
}

/// Slideshow muxer on top of the ffmpeg concat demuxer
#[derive(Debug, Clone)]
pub struct FfmpegMuxer {
    ffmpeg_path: PathBuf,
    timeout_secs: u64,
}

impl FfmpegMuxer {
    pub fn new(video: &VideoConfig) -> Self {
        Self {
            ffmpeg_path: video.ffmpeg_path.clone(),
            timeout_secs: video.ffmpeg_timeout_secs,
        }
    }

    /// ffmpeg arguments for a job whose concat script lives at `list_path`
    pub fn build_args(job: &MuxJob, list_path: &Path) -> Vec<String> {
        // libx264 with yuv420p needs even dimensions
        let mut filter = "scale=trunc(iw/2)*2:trunc(ih/2)*2".to_string();
        if let Some(subtitles) = &job.subtitles {
            filter.push_str(&format!(
                ",subtitles=filename='{}':charenc=UTF-8",
                escape_ffmpeg_filter_path(subtitles)
            ));
        }

        vec![
            "-y".to_string(),
            "-f".to_string(),
            "concat".to_string(),
            "-safe".to_string(),
            "0".to_string(),
            "-i".to_string(),
            list_path.to_string_lossy().to_string(),
            "-i".to_string(),
            job.audio.to_string_lossy().to_string(),
            "-vf".to_string(),
            filter,
            "-r".to_string(),
            OUTPUT_FPS.to_string(),
            "-c:v".to_string(),
            "libx264".to_string(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
            "-c:a".to_string(),
            "aac".to_string(),
            "-shortest".to_string(),
            job.output.to_string_lossy().to_string(),
        ]
    }
}

#[async_trait]
impl VideoMuxer for FfmpegMuxer {
    async fn mux(&self, job: &MuxJob) -> Result<PathBuf, AppError> {
        if job.images.is_empty() {
            return Err(MediaError::NoImages.into());
        }
        if job.duration_secs <= 0.0 {
            warn!("Narration has no length, video will be empty");
        }

        let images: Vec<PathBuf> = job
            .images
            .iter()
            .map(|p| std::fs::canonicalize(p).unwrap_or_else(|_| p.clone()))
            .collect();

        let mut list_file = tempfile::Builder::new()
            .prefix("storyreel-")
            .suffix(".ffconcat")
            .tempfile()
            .map_err(MediaError::from)?;
        list_file
            .write_all(concat_list(&images, job.seconds_per_image()).as_bytes())
            .map_err(MediaError::from)?;
        list_file.flush().map_err(MediaError::from)?;

        if let Some(parent) = job.output.parent() {
            FileManager::ensure_dir(parent)?;
        }

        let args = Self::build_args(job, list_file.path());
        run_tool(&self.ffmpeg_path, &args, self.timeout_secs).await?;

        info!("Video written to {}", job.output.display());
        Ok(job.output.clone())
    }
}
