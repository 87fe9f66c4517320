//! Issue label derivation.
//!
//! Maps the stories linked to one issue onto the labels that describe the
//! issue on the external tracker. Derivation runs in two stages and keeps no
//! state between calls.
//!
//! # Stage 1: type
//!
//! Any `feature` story yields `enhancement`; otherwise any `bug` story yields
//! `bug`. At most one type label is emitted.
//!
//! # Stage 2: status
//!
//! If every story is accepted, no status label is added. Otherwise the states
//! are scanned in order:
//!
//! | state                                        | effect                          |
//! |----------------------------------------------|---------------------------------|
//! | `accepted`, `unscheduled`                    | none                            |
//! | `started`, `finished`, `delivered`, `rejected` | `in-flight`, stop scanning    |
//! | `unstarted`, `planned`                       | group is no longer unscheduled  |
//! | anything else                                | [`LabelError::UnknownStoryState`] |
//!
//! A scan that completes yields `unscheduled` if no story was scheduled and
//! `scheduled` otherwise.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use tracing::debug;

use crate::error::ErrorCode;
use crate::model::story::{StoryState, StoryType};
use crate::story_set::StorySet;

/// Labels this system reads or writes on the issue tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueLabel {
    Unscheduled,
    Scheduled,
    InFlight,
    Bug,
    Enhancement,
    /// Applied by hand on the tracker; never derived.
    Discuss,
}

impl IssueLabel {
    pub const ALL: [Self; 6] = [
        Self::Unscheduled,
        Self::Scheduled,
        Self::InFlight,
        Self::Bug,
        Self::Enhancement,
        Self::Discuss,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unscheduled => "unscheduled",
            Self::Scheduled => "scheduled",
            Self::InFlight => "in-flight",
            Self::Bug => "bug",
            Self::Enhancement => "enhancement",
            Self::Discuss => "discuss",
        }
    }

    /// Hex color used when the label has to be created on the tracker.
    ///
    /// `bug` and `enhancement` return `None` so the tracker keeps its own
    /// default colors.
    #[must_use]
    pub const fn color(self) -> Option<&'static str> {
        match self {
            Self::Unscheduled => Some("e4eff7"),
            Self::Scheduled => Some("f4f4f4"),
            Self::InFlight => Some("f3f3d1"),
            Self::Bug | Self::Enhancement => None,
            Self::Discuss => Some("c2e0c6"),
        }
    }

    /// `unscheduled`, `scheduled`, or `in-flight`.
    #[must_use]
    pub const fn is_status(self) -> bool {
        matches!(self, Self::Unscheduled | Self::Scheduled | Self::InFlight)
    }

    /// Whether [`derive_issue_labels`] can ever produce this label.
    #[must_use]
    pub const fn is_derived(self) -> bool {
        !matches!(self, Self::Discuss)
    }
}

impl fmt::Display for IssueLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a label name that is not in the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown issue label: '{0}'")]
pub struct ParseLabelError(pub String);

impl FromStr for IssueLabel {
    type Err = ParseLabelError;

    // Exact match: tracker label names are compared case-sensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| ParseLabelError(s.to_string()))
    }
}

/// Errors from label derivation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LabelError {
    /// A story is in a lifecycle state the derivation does not recognize.
    #[error("unknown story state '{state}' on story {story_id}")]
    UnknownStoryState { story_id: u64, state: String },
}

impl LabelError {
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::UnknownStoryState { .. } => ErrorCode::UnknownStoryState,
        }
    }
}

/// Derive the ordered label list for the stories linked to one issue.
///
/// The type label (if any) comes first, then the status label (if any).
///
/// # Errors
///
/// Returns [`LabelError::UnknownStoryState`] for the first story, in set
/// order, whose state is not recognized. Unknown states after an in-flight
/// story are not reached.
pub fn derive_issue_labels(stories: &StorySet) -> Result<Vec<IssueLabel>, LabelError> {
    let mut labels = Vec::with_capacity(2);
    if let Some(kind) = type_label(stories) {
        labels.push(kind);
    }

    if stories.all_accepted() {
        debug!(stories = stories.len(), ?labels, "all stories accepted");
        return Ok(labels);
    }

    let status = status_label(stories)?;
    labels.push(status);
    debug!(stories = stories.len(), ?labels, "derived issue labels");
    Ok(labels)
}

fn type_label(stories: &StorySet) -> Option<IssueLabel> {
    let mut has_bugs = false;
    for story in stories {
        match story.story_type {
            StoryType::Feature => return Some(IssueLabel::Enhancement),
            StoryType::Bug => has_bugs = true,
            _ => {}
        }
    }
    has_bugs.then_some(IssueLabel::Bug)
}

fn status_label(stories: &StorySet) -> Result<IssueLabel, LabelError> {
    let mut all_unscheduled = true;
    for story in stories {
        match &story.state {
            // Accepted stories are ignored: accepted plus unscheduled is
            // still unscheduled.
            StoryState::Accepted | StoryState::Unscheduled => {}
            StoryState::Started
            | StoryState::Finished
            | StoryState::Delivered
            | StoryState::Rejected => return Ok(IssueLabel::InFlight),
            StoryState::Unstarted | StoryState::Planned => all_unscheduled = false,
            StoryState::Unknown(state) => {
                return Err(LabelError::UnknownStoryState {
                    story_id: story.id,
                    state: state.clone(),
                });
            }
        }
    }

    Ok(if all_unscheduled {
        IssueLabel::Unscheduled
    } else {
        IssueLabel::Scheduled
    })
}
