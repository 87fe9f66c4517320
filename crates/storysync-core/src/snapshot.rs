//! Loading a fully-fetched story snapshot.
//!
//! The story source hands over everything it fetched as JSON, either as a
//! bare array of stories or wrapped as `{ "stories": [...] }`. Any other
//! top-level fields in the wrapped form are ignored.

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::error::ErrorCode;
use crate::model::story::Story;
use crate::story_set::StorySet;

/// Errors that can occur while loading a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The snapshot file could not be read.
    #[error("failed to read snapshot {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading from a non-file source failed.
    #[error("snapshot I/O error: {0}")]
    Io(#[from] io::Error),

    /// The content is not valid JSON.
    #[error("invalid story snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    /// Valid JSON, but neither a story array nor a `stories` wrapper.
    #[error("invalid story snapshot: expected a JSON array of stories or an object with a `stories` array, found {found}")]
    Shape { found: &'static str },

    /// One story in an otherwise well-formed snapshot is malformed.
    #[error(
        "invalid story at index {index}{}: {source}",
        .id.map_or_else(String::new, |id| format!(" (id {id})"))
    )]
    Story {
        index: usize,
        id: Option<u64>,
        #[source]
        source: serde_json::Error,
    },
}

impl SnapshotError {
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Read { .. } | Self::Io(_) => ErrorCode::SnapshotReadFailed,
            Self::Parse(_) | Self::Shape { .. } => ErrorCode::SnapshotParseError,
            Self::Story { .. } => ErrorCode::InvalidStoryRecord,
        }
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Parse snapshot JSON text.
///
/// Stories are decoded one at a time so a bad record is reported with its
/// position and id.
///
/// # Errors
///
/// Returns [`SnapshotError::Parse`] for invalid JSON, [`SnapshotError::Shape`]
/// when the document is not a story array or a `stories` wrapper object, and
/// [`SnapshotError::Story`] for the first malformed story.
pub fn parse_snapshot(text: &str) -> Result<StorySet, SnapshotError> {
    let doc: Value = serde_json::from_str(text)?;
    let records = match doc {
        Value::Array(records) => records,
        Value::Object(mut fields) => match fields.remove("stories") {
            Some(Value::Array(records)) => records,
            Some(other) => {
                return Err(SnapshotError::Shape {
                    found: json_kind(&other),
                });
            }
            None => {
                return Err(SnapshotError::Shape {
                    found: "an object without `stories`",
                });
            }
        },
        other => {
            return Err(SnapshotError::Shape {
                found: json_kind(&other),
            });
        }
    };

    let stories = records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let id = record.get("id").and_then(Value::as_u64);
            serde_json::from_value::<Story>(record)
                .map_err(|source| SnapshotError::Story { index, id, source })
        })
        .collect::<Result<StorySet, _>>()?;
    debug!(stories = stories.len(), "parsed story snapshot");
    Ok(stories)
}

/// Read and parse a snapshot from any reader (e.g. stdin).
///
/// # Errors
///
/// Returns [`SnapshotError::Io`] if reading fails, or a parse error as
/// described on [`parse_snapshot`].
pub fn read_snapshot(mut reader: impl Read) -> Result<StorySet, SnapshotError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    parse_snapshot(&text)
}

/// Load a snapshot file.
///
/// # Errors
///
/// Returns [`SnapshotError::Read`] if the file cannot be read, or a parse
/// error as described on [`parse_snapshot`].
pub fn load_snapshot(path: &Path) -> Result<StorySet, SnapshotError> {
    let text = std::fs::read_to_string(path).map_err(|source| SnapshotError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_snapshot(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::story::StoryState;

    const BARE: &str = r#"[
        {"id": 1, "name": "a", "story_type": "feature", "current_state": "started"},
        {"id": 2, "name": "b", "story_type": "chore", "current_state": "accepted"}
    ]"#;

    #[test]
    fn parses_bare_array() {
        let set = parse_snapshot(BARE).expect("bare array parses");
        assert_eq!(set.ids(), vec![1, 2]);
    }

    #[test]
    fn parses_wrapped_object() {
        let text = format!(r#"{{"project_id": 99, "stories": {BARE}}}"#);
        let set = parse_snapshot(&text).expect("wrapped object parses");
        assert_eq!(set.ids(), vec![1, 2]);
    }

    #[test]
    fn empty_array_is_empty_set() {
        assert!(parse_snapshot("[]").expect("parses").is_empty());
    }

    #[test]
    fn unknown_state_survives_parsing() {
        let set = parse_snapshot(
            r#"[{"id": 1, "name": "a", "story_type": "bug", "current_state": "icebox"}]"#,
        )
        .expect("parses");
        let story = set.iter().next().expect("one story");
        assert_eq!(story.state, StoryState::Unknown("icebox".to_string()));
    }

    #[test]
    fn wrong_document_shape_is_a_parse_error() {
        let err = parse_snapshot(r#"{"items": []}"#).expect_err("must fail");
        assert!(matches!(err, SnapshotError::Shape { .. }));
        assert_eq!(err.error_code(), ErrorCode::SnapshotParseError);

        let err = parse_snapshot(r#"{"stories": 3}"#).expect_err("must fail");
        assert!(err.to_string().contains("found a number"), "{err}");

        let err = parse_snapshot("[{").expect_err("truncated json");
        assert!(matches!(err, SnapshotError::Parse(_)));
    }

    #[test]
    fn bad_story_is_reported_by_index_id_and_field() {
        let text = r#"[
            {"id": 1, "name": "a", "story_type": "feature", "current_state": "started"},
            {"id": 2, "name": "b", "story_type": "chore", "current_state": "accepted",
             "accepted_at": "yesterday"}
        ]"#;
        let err = parse_snapshot(text).expect_err("bad timestamp");
        assert!(matches!(err, SnapshotError::Story { index: 1, id: Some(2), .. }));
        assert_eq!(err.error_code(), ErrorCode::InvalidStoryRecord);
        let message = err.to_string();
        assert!(message.contains("index 1 (id 2)"), "{message}");
        assert!(message.contains("accepted_at"), "{message}");
        assert!(!message.contains("untagged"), "{message}");
    }

    #[test]
    fn missing_field_is_named() {
        let err = parse_snapshot(r#"{"stories": [{"id": 7, "name": "x"}]}"#)
            .expect_err("missing fields");
        let message = err.to_string();
        assert!(message.contains("id 7"), "{message}");
        assert!(message.contains("story_type"), "{message}");
    }

    #[test]
    fn reads_from_reader() {
        let set = read_snapshot(BARE.as_bytes()).expect("reader parses");
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn load_reports_missing_file_with_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing.json");
        let err = load_snapshot(&path).expect_err("missing file");
        assert_eq!(err.error_code(), ErrorCode::SnapshotReadFailed);
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("stories.json");
        std::fs::write(&path, BARE).expect("write snapshot");
        assert_eq!(load_snapshot(&path).expect("loads").ids(), vec![1, 2]);
    }
}
