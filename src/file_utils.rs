use anyhow::{Result, Context, anyhow};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

// @module: File and directory utilities

/// Path argument meaning "read from standard input"
pub const STDIN_PATH: &str = "-";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @generates: Image path for a segment
    // @params: output_dir, 1-based segment index
    pub fn segment_image_path<P: AsRef<Path>>(output_dir: P, segment_index: usize) -> PathBuf {
        output_dir
            .as_ref()
            .join("images")
            .join(format!("segment_{:02}.png", segment_index))
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Read story text from a file, or stdin when the path is `-`
    pub fn read_story<P: AsRef<Path>>(path: P) -> Result<String> {
        let path = path.as_ref();

        let text = if path.as_os_str() == STDIN_PATH {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read story from stdin")?;
            buffer
        } else {
            if !Self::file_exists(path) {
                return Err(anyhow!("Story file does not exist: {:?}", path));
            }
            Self::read_to_string(path)?
        };

        // Editors on Windows leave \r\n, which hides blank-line paragraph breaks
        Ok(text.replace("\r\n", "\n"))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Make sure a run may write its artifacts into `output_dir`
    pub fn prepare_output_dir<P: AsRef<Path>>(output_dir: P, video_name: &str, force_overwrite: bool) -> Result<()> {
        let output_dir = output_dir.as_ref();
        let video = output_dir.join(video_name);

        if Self::file_exists(&video) && !force_overwrite {
            return Err(anyhow!(
                "Output video already exists: {:?} (use --force to overwrite)",
                video
            ));
        }

        Self::ensure_dir(output_dir)
    }

    /// Classify a file by its extension
    pub fn detect_file_type<P: AsRef<Path>>(path: P) -> Result<FileType> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(anyhow!("File does not exist: {:?}", path));
        }

        let ext_str = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let audio_extensions = ["mp3", "wav", "m4a", "aac", "ogg", "flac", "opus"];
        let image_extensions = ["png", "jpg", "jpeg", "webp", "bmp"];

        if audio_extensions.contains(&ext_str.as_str()) {
            Ok(FileType::Audio)
        } else if image_extensions.contains(&ext_str.as_str()) {
            Ok(FileType::Image)
        } else if ext_str == "txt" || ext_str == "md" {
            Ok(FileType::Text)
        } else {
            Ok(FileType::Unknown)
        }
    }
}

/// Enum representing different file types
#[derive(Debug, PartialEq, Eq)]
pub enum FileType {
    /// Narration audio
    Audio,
    /// Still image
    Image,
    /// Plain story text
    Text,
    /// Unknown file type
    Unknown,
}
