pub mod dedupe;
pub mod filter;
pub mod labels;
pub mod vocab;

use std::path::Path;

use storysync_core::StorySet;
use storysync_core::snapshot::{load_snapshot, read_snapshot};
use tracing::info;

use crate::output::{CliError, OutputMode, render_error};

/// Load the snapshot at `path`, or from stdin when `path` is `-`.
///
/// Failures are rendered as a [`CliError`] before being returned.
pub fn load_stories(path: &Path, output: OutputMode) -> anyhow::Result<StorySet> {
    let loaded = if path == Path::new("-") {
        read_snapshot(std::io::stdin().lock())
    } else {
        load_snapshot(path)
    };

    match loaded {
        Ok(stories) => {
            info!(stories = stories.len(), path = %path.display(), "loaded story snapshot");
            Ok(stories)
        }
        Err(err) => {
            render_error(output, &CliError::from_code(err.error_code(), err.to_string()))?;
            Err(err.into())
        }
    }
}

/// One-line summary of a story used across commands.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StoryRow {
    pub id: u64,
    pub name: String,
    pub story_type: String,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

impl From<&storysync_core::Story> for StoryRow {
    fn from(story: &storysync_core::Story) -> Self {
        Self {
            id: story.id,
            name: story.name.clone(),
            story_type: story.story_type.to_string(),
            state: story.state.to_string(),
            external_id: story.external_id.clone(),
        }
    }
}
