/*!
 * Error types for the storyreel application.
 *
 * The story core (segmentation, prompts, timing, subtitle lines) never fails on
 * in-range input, so these types cover the edges: collaborators, media tools,
 * artifact emission and the timing dump.
 */

use thiserror::Error;

/// Errors that can occur when talking to a generation API
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// The generation job finished without an artifact
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// The job did not complete within the polling budget
    #[error("Generation timed out after {attempts} status checks")]
    Timeout {
        /// Number of status checks performed
        attempts: u32,
    },

    /// An empty prompt reached the generator
    #[error("Refusing to generate an image for an empty prompt")]
    EmptyPrompt,

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Errors from the external media tools (ffmpeg, ffprobe)
#[derive(Error, Debug)]
pub enum MediaError {
    /// The tool could not be started
    #[error("Failed to execute {tool}: {message}")]
    Spawn {
        /// Tool name
        tool: String,
        /// Underlying error
        message: String,
    },

    /// The tool ran but exited unsuccessfully
    #[error("{tool} failed: {stderr}")]
    Failed {
        /// Tool name
        tool: String,
        /// Filtered standard error output
        stderr: String,
    },

    /// The tool did not finish in time
    #[error("{tool} timed out after {secs} seconds")]
    TimedOut {
        /// Tool name
        tool: String,
        /// Timeout that elapsed
        secs: u64,
    },

    /// Probe output did not contain a usable duration
    #[error("Could not determine duration of {0}")]
    UnknownDuration(String),

    /// No input images were available for the slideshow
    #[error("No images available for the video")]
    NoImages,

    /// Filesystem error around the media job
    #[error("Media file error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while emitting subtitle artifacts
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// The subtitle file could not be written
    #[error("Failed to write subtitle file {path}: {message}")]
    Write {
        /// Destination path
        path: String,
        /// Underlying error
        message: String,
    },

    /// Unknown subtitle file extension
    #[error("Unsupported subtitle format: {0}")]
    UnsupportedFormat(String),
}

/// Errors reading or writing the timing dump
#[derive(Error, Debug)]
pub enum TimingError {
    /// Filesystem error
    #[error("Timing file error: {0}")]
    Io(#[from] std::io::Error),

    /// The dump was not a JSON array of timing records
    #[error("Invalid timing data: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a generation provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from ffmpeg/ffprobe
    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    /// Error from subtitle emission
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from the timing dump
    #[error("Timing error: {0}")]
    Timing(#[from] TimingError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
