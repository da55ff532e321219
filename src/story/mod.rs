/*!
 * Story planning: segmentation and per-segment image prompts.
 *
 * - `segmenter`: splits the story into a fixed number of paragraph groups
 * - `prompts`: derives a visual description for each segment
 *
 * [`StoryPlan`] ties both together and produces the JSON segment dump.
 */

pub mod prompts;
pub mod segmenter;

use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::app_config::Config;
use crate::file_utils::FileManager;

pub use prompts::{PromptExtractor, PromptSpec, shorten};
pub use segmenter::{Segment, segment, split_paragraphs};

/// File name of the segment dump inside an output directory
pub const SEGMENT_DUMP_FILE: &str = "story_segments.json";

/// Segments of a story with their prompts
#[derive(Debug, Clone)]
pub struct StoryPlan {
    /// Ordered segments, always `num_segments` long
    pub segments: Vec<Segment>,

    /// One prompt per segment, same order
    pub prompts: Vec<PromptSpec>,
}

impl StoryPlan {
    /// Segment the story and extract a prompt for every segment
    pub fn build(story: &str, config: &Config) -> Self {
        let segments = segment(story, config.story.num_segments);
        let prompts = PromptExtractor::new(&config.prompt).extract_all(&segments);
        Self { segments, prompts }
    }

    /// Number of segments that carry text
    pub fn non_empty_count(&self) -> usize {
        self.segments.iter().filter(|s| !s.is_empty()).count()
    }

    /// Inspection dump of the plan
    pub fn to_dump(&self) -> SegmentDump {
        SegmentDump {
            num_segments: self.segments.len(),
            segments: self
                .segments
                .iter()
                .zip(&self.prompts)
                .map(|(segment, prompt)| SegmentRecord {
                    segment_id: segment.index,
                    text: segment.text.clone(),
                    prompt: prompt.text.clone(),
                })
                .collect(),
        }
    }

    /// Write the dump as pretty JSON
    pub fn save_dump<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(&self.to_dump())
            .context("Failed to serialize segment dump")?;
        FileManager::write_to_file(path, &json)?;
        info!("Saved segments and prompts to {}", path.display());
        Ok(())
    }
}

/// JSON shape of `story_segments.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentDump {
    /// Requested segment count
    pub num_segments: usize,
    /// One record per segment
    pub segments: Vec<SegmentRecord>,
}

/// A segment with its prompt as stored in the dump
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentRecord {
    /// 1-based segment index
    pub segment_id: usize,
    /// Segment text
    pub text: String,
    /// Image prompt, empty for padding segments
    pub prompt: String,
}
