// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, Context};
use log::{warn, info, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::{Path, PathBuf};
use std::io::Write;
use std::fs::File;
use std::io::BufReader;
use clap::{Args, Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use storyreel::app_config::{self, Config, ImageProvider};
use storyreel::app_controller::{emit_subtitles, Controller};
use storyreel::file_utils::{FileManager, FileType};
use storyreel::story::{StoryPlan, SEGMENT_DUMP_FILE};
use storyreel::subtitle_processor::SubtitleFormat;
use storyreel::timing::{load_timing_records, TimingSource};

/// CLI Wrapper for ImageProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliImageProvider {
    Placeholder,
    Leonardo,
}

impl From<CliImageProvider> for ImageProvider {
    fn from(cli_provider: CliImageProvider) -> Self {
        match cli_provider {
            CliImageProvider::Placeholder => ImageProvider::Placeholder,
            CliImageProvider::Leonardo => ImageProvider::Leonardo,
        }
    }
}

/// CLI Wrapper for SubtitleFormat to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliSubtitleFormat {
    Ass,
    Srt,
}

impl From<CliSubtitleFormat> for SubtitleFormat {
    fn from(cli_format: CliSubtitleFormat) -> Self {
        match cli_format {
            CliSubtitleFormat::Ass => SubtitleFormat::Ass,
            CliSubtitleFormat::Srt => SubtitleFormat::Srt,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Split a story into segments and write their image prompts
    Segment(SegmentArgs),

    /// Build the caption track for a story
    Subtitles(SubtitleArgs),

    /// Run the whole pipeline: segments, images, captions and video
    Render(RenderArgs),

    /// Generate shell completions for storyreel
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Options shared by every pipeline command
#[derive(Args, Debug, Clone)]
struct StoryArgs {
    /// Story text file, or '-' for stdin
    #[arg(value_name = "STORY")]
    story: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// Number of segments (overrides the config)
    #[arg(short = 'n', long)]
    segments: Option<usize>,
}

#[derive(Args, Debug)]
struct SegmentArgs {
    #[command(flatten)]
    story: StoryArgs,
}

#[derive(Args, Debug)]
struct SubtitleArgs {
    #[command(flatten)]
    story: StoryArgs,

    /// Narration length in seconds, for estimated timing
    #[arg(short, long, conflicts_with = "timings")]
    duration: Option<f64>,

    /// Timing dump with per-word events
    #[arg(short, long)]
    timings: Option<PathBuf>,

    /// Words per caption line (overrides the config)
    #[arg(short, long)]
    words_per_line: Option<usize>,

    /// Caption format (overrides the config)
    #[arg(long, value_enum)]
    format: Option<CliSubtitleFormat>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    story: StoryArgs,

    /// Narration audio file
    #[arg(short, long)]
    audio: PathBuf,

    /// Timing dump with per-word events for the narration
    #[arg(short, long)]
    timings: Option<PathBuf>,

    /// Image provider (overrides the config)
    #[arg(short, long, value_enum)]
    provider: Option<CliImageProvider>,

    /// Image API key (overrides the config)
    #[arg(long, env = "LEONARDO_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Force overwrite of an existing video
    #[arg(short, long)]
    force_overwrite: bool,
}

/// storyreel - narrated story videos
///
/// Turns story text into a slideshow video with narration and word-timed captions.
#[derive(Parser, Debug)]
#[command(name = "storyreel")]
#[command(version = "0.1.0")]
#[command(about = "Narrated story video builder")]
#[command(long_about = "storyreel splits a story into segments, illustrates each one, and muxes the
illustrations with a narration track and captions timed to the narration.

EXAMPLES:
    storyreel segment story.txt -n 6                       # Write story_segments.json
    storyreel subtitles story.txt -d 84.5                  # Captions from the narration length
    storyreel subtitles story.txt -t timings.json --format srt
    storyreel render story.txt -a narration.mp3 -p leonardo
    storyreel completions bash > storyreel.bash            # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌",
            Level::Warn => "🚧",
            Level::Info => "",
            Level::Debug => "🔍",
            Level::Trace => "📋",
        }
    }

    // @returns: ANSI colour for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(record.level()),
                now,
                Self::get_emoji_for_level(record.level()),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts every level, log::set_max_level does the filtering
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "storyreel", &mut std::io::stdout());
            Ok(())
        }
        Commands::Segment(args) => {
            let config = load_config(&cli.config_path, cli.log_level.as_ref(), |config| {
                apply_story_overrides(config, &args.story);
            })?;
            run_segment(&config, &args.story)
        }
        Commands::Subtitles(args) => {
            let config = load_config(&cli.config_path, cli.log_level.as_ref(), |config| {
                apply_story_overrides(config, &args.story);
                if let Some(words) = args.words_per_line {
                    config.subtitle.words_per_line = words;
                }
                if let Some(format) = &args.format {
                    config.subtitle.format = format.clone().into();
                }
            })?;
            run_subtitles(&config, &args)
        }
        Commands::Render(args) => {
            let config = load_config(&cli.config_path, cli.log_level.as_ref(), |config| {
                apply_story_overrides(config, &args.story);
                if let Some(provider) = &args.provider {
                    config.image.provider = provider.clone().into();
                }
                if let Some(api_key) = &args.api_key {
                    config.image.api_key = api_key.clone();
                }
            })?;
            run_render(config, &args).await
        }
    }
}

fn apply_story_overrides(config: &mut Config, story: &StoryArgs) {
    if let Some(segments) = story.segments {
        config.story.num_segments = segments;
    }
}

/// Load (or create) the config, apply CLI overrides, validate it and set the log level
fn load_config(
    config_path: &str,
    log_level: Option<&CliLogLevel>,
    overrides: impl FnOnce(&mut Config),
) -> Result<Config> {
    // If log level is set via command line, apply it immediately
    if let Some(level) = log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level_filter(&level));
    }

    let mut config = if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    overrides(&mut config);
    if let Some(level) = log_level {
        config.log_level = level.clone().into();
    }

    config.validate()
        .context("Configuration validation failed")?;

    log::set_max_level(level_filter(&config.log_level));
    Ok(config)
}

fn run_segment(config: &Config, args: &StoryArgs) -> Result<()> {
    let story = FileManager::read_story(&args.story)?;
    let plan = StoryPlan::build(&story, config);

    plan.save_dump(args.output_dir.join(SEGMENT_DUMP_FILE))?;
    info!(
        "{} segments, {} with text",
        plan.segments.len(),
        plan.non_empty_count()
    );
    Ok(())
}

fn run_subtitles(config: &Config, args: &SubtitleArgs) -> Result<()> {
    let story = FileManager::read_story(&args.story.story)?;

    let source = match (&args.timings, args.duration) {
        (Some(path), _) => TimingSource::External {
            records: load_timing_records(path)
                .with_context(|| format!("Failed to load timing dump: {:?}", path))?,
            unit: config.timing.external_unit,
        },
        (None, Some(duration)) => TimingSource::Estimated {
            text: story,
            total_duration: duration,
        },
        (None, None) => {
            warn!("No narration timing given, captions use {}s per line", config.subtitle.duration_per_line);
            TimingSource::Untimed { text: story }
        }
    };

    let artifacts = emit_subtitles(config, &source, &args.story.output_dir)?;
    info!("Success: {:?}", artifacts.subtitle_path);
    Ok(())
}

async fn run_render(config: Config, args: &RenderArgs) -> Result<()> {
    if FileManager::detect_file_type(&args.audio)? != FileType::Audio {
        warn!("{:?} does not look like an audio file, trying anyway", args.audio);
    }

    let story = FileManager::read_story(&args.story.story)?;
    let controller = Controller::with_config(config, args.audio.clone(), args.timings.clone())?;

    let report = controller
        .run(&story, &args.story.output_dir, args.force_overwrite)
        .await?;

    if report.placeholder_count() > 0 {
        warn!("{} segments use placeholder images", report.placeholder_count());
    }
    if !report.captioned {
        warn!("Video was rendered without captions");
    }
    info!("Success: {:?}", report.video_path);
    Ok(())
}
