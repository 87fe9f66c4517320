use std::fmt;

/// Machine-readable error codes for callers that branch on failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    SnapshotParseError,
    SnapshotReadFailed,
    InvalidStoryRecord,
    UnknownStoryState,
    IssueNotFound,
    InternalUnexpected,
}

impl ErrorCode {
    pub const ALL: [Self; 7] = [
        Self::ConfigParseError,
        Self::SnapshotParseError,
        Self::SnapshotReadFailed,
        Self::InvalidStoryRecord,
        Self::UnknownStoryState,
        Self::IssueNotFound,
        Self::InternalUnexpected,
    ];

    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::SnapshotParseError => "E1002",
            Self::SnapshotReadFailed => "E1003",
            Self::InvalidStoryRecord => "E1004",
            Self::UnknownStoryState => "E2001",
            Self::IssueNotFound => "E2002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::SnapshotParseError => "Story snapshot parse error",
            Self::SnapshotReadFailed => "Story snapshot could not be read",
            Self::InvalidStoryRecord => "Story record is malformed",
            Self::UnknownStoryState => "Unknown story state",
            Self::IssueNotFound => "Issue not found in snapshot",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .storysync/config.toml and retry."),
            Self::SnapshotParseError => {
                Some("Provide a JSON array of stories or an object with a `stories` array.")
            }
            Self::SnapshotReadFailed => Some("Check the snapshot path and read permissions."),
            Self::InvalidStoryRecord => {
                Some("Fix the reported field of the named story in the snapshot and retry.")
            }
            Self::UnknownStoryState => Some(
                "The story source returned a state outside the known lifecycle; \
                 update storysync before labeling this batch.",
            ),
            Self::IssueNotFound => Some("List linked issues with `storysync labels`."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
