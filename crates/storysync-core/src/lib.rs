#![forbid(unsafe_code)]
//! storysync-core library.
//!
//! Pure reasoning over a fully-loaded snapshot of tracker stories:
//! duplicate detection by content equivalence, aggregate predicates, and
//! derivation of the status labels shown on a linked issue.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums for library failures, `anyhow::Result` at
//!   I/O boundaries (config and snapshot loading).
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod config;
pub mod dedupe;
pub mod equivalence;
pub mod error;
pub mod labels;
pub mod model;
pub mod snapshot;
pub mod story_set;

pub use dedupe::Dedupe;
pub use equivalence::EquivalenceKey;
pub use labels::{IssueLabel, LabelError, derive_issue_labels};
pub use model::story::{Story, StoryState, StoryType};
pub use story_set::StorySet;
