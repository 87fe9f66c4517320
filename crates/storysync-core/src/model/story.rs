use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Story types known to the tracker.
///
/// Values outside the known set are kept verbatim in [`StoryType::Other`]
/// so that a new upstream type never fails a whole snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum StoryType {
    Feature,
    Bug,
    Chore,
    Release,
    /// Marker type for stories parked outside any iteration.
    Unscheduled,
    Other(String),
}

impl StoryType {
    pub const KNOWN: [Self; 5] = [
        Self::Feature,
        Self::Bug,
        Self::Chore,
        Self::Release,
        Self::Unscheduled,
    ];

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Feature => "feature",
            Self::Bug => "bug",
            Self::Chore => "chore",
            Self::Release => "release",
            Self::Unscheduled => "unscheduled",
            Self::Other(raw) => raw,
        }
    }

    /// Parse a type name exactly as the tracker spells it. Never fails;
    /// anything else, including other casings, becomes `Other`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "feature" => Self::Feature,
            "bug" => Self::Bug,
            "chore" => Self::Chore,
            "release" => Self::Release,
            "unscheduled" => Self::Unscheduled,
            _ => Self::Other(s.to_string()),
        }
    }
}

/// Lifecycle states a story moves through in the tracker.
///
/// An unrecognized state is preserved in [`StoryState::Unknown`]; label
/// derivation refuses to guess and reports it as an error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum StoryState {
    Unscheduled,
    Unstarted,
    Planned,
    Started,
    Finished,
    Delivered,
    Rejected,
    Accepted,
    Unknown(String),
}

impl StoryState {
    pub const KNOWN: [Self; 8] = [
        Self::Unscheduled,
        Self::Unstarted,
        Self::Planned,
        Self::Started,
        Self::Finished,
        Self::Delivered,
        Self::Rejected,
        Self::Accepted,
    ];

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Unscheduled => "unscheduled",
            Self::Unstarted => "unstarted",
            Self::Planned => "planned",
            Self::Started => "started",
            Self::Finished => "finished",
            Self::Delivered => "delivered",
            Self::Rejected => "rejected",
            Self::Accepted => "accepted",
            Self::Unknown(raw) => raw,
        }
    }

    /// Parse a state name exactly as the tracker spells it. Never fails;
    /// anything else, including other casings, becomes `Unknown`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "unscheduled" => Self::Unscheduled,
            "unstarted" => Self::Unstarted,
            "planned" => Self::Planned,
            "started" => Self::Started,
            "finished" => Self::Finished,
            "delivered" => Self::Delivered,
            "rejected" => Self::Rejected,
            "accepted" => Self::Accepted,
            _ => Self::Unknown(s.to_string()),
        }
    }

    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

/// A tracker story as handed over by the story source.
///
/// Field names follow the tracker's REST representation (`story_type`,
/// `current_state`); the shorter `type` and `state` are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    pub id: u64,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(rename = "story_type", alias = "type")]
    pub story_type: StoryType,
    #[serde(rename = "current_state", alias = "state")]
    pub state: StoryState,
    #[serde(default, deserialize_with = "deserialize_labels")]
    pub labels: Vec<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_accepted_at",
        skip_serializing_if = "Option::is_none"
    )]
    pub accepted_at: Option<DateTime<Utc>>,
    /// Identifier of the linked external issue, e.g. `owner/repo#12`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Story {
    /// A feature story in the `unscheduled` state with no labels.
    #[must_use]
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            story_type: StoryType::Feature,
            state: StoryState::Unscheduled,
            labels: Vec::new(),
            accepted_at: None,
            external_id: None,
            url: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_type(mut self, story_type: StoryType) -> Self {
        self.story_type = story_type;
        self
    }

    #[must_use]
    pub fn with_state(mut self, state: StoryState) -> Self {
        self.state = state;
        self
    }

    #[must_use]
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_accepted_at(mut self, accepted_at: DateTime<Utc>) -> Self {
        self.accepted_at = Some(accepted_at);
        self
    }

    #[must_use]
    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }
}

impl fmt::Display for StoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for StoryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for StoryType {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<String> for StoryState {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl Serialize for StoryType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl Serialize for StoryState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

fn deserialize_accepted_at<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    DateTime::parse_from_rfc3339(&raw)
        .map(|at| Some(at.with_timezone(&Utc)))
        .map_err(|err| D::Error::custom(format!("invalid `accepted_at` timestamp {raw:?}: {err}")))
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Labels arrive either as bare names or as tracker label objects.
#[derive(Deserialize)]
#[serde(untagged)]
enum LabelRef {
    Name(String),
    Object { name: String },
}

fn deserialize_labels<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let refs = Option::<Vec<LabelRef>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(refs
        .into_iter()
        .map(|label| match label {
            LabelRef::Name(name) | LabelRef::Object { name } => name,
        })
        .collect())
}
