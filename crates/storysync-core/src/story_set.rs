//! Aggregate queries over a collection of stories.
//!
//! A [`StorySet`] is an ordered sequence of stories. Order carries no meaning
//! for the aggregate predicates, but every filter that returns a subsequence
//! preserves the input order.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dedupe::{self, Dedupe};
use crate::labels::{self, IssueLabel, LabelError};
use crate::model::story::{Story, StoryState, StoryType};

/// Label that marks a story as having a linked pull request. Matched exactly.
pub const HAS_PR_LABEL: &str = "has-pr";

/// Returned by [`StorySet::last_accepted`] when nothing has been accepted.
pub const NEVER_ACCEPTED: DateTime<Utc> = DateTime::<Utc>::UNIX_EPOCH;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StorySet(Vec<Story>);

/// Stories partitioned by the external issue they are linked to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueGroups {
    pub linked: BTreeMap<String, StorySet>,
    /// Stories with no `external_id`.
    pub unlinked: StorySet,
}

impl StorySet {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Story> {
        self.0.iter()
    }

    pub fn push(&mut self, story: Story) {
        self.0.push(story);
    }

    #[must_use]
    pub fn ids(&self) -> Vec<u64> {
        self.0.iter().map(|story| story.id).collect()
    }

    /// Stories carrying `label`, compared case-insensitively by Unicode
    /// lowercase mapping.
    #[must_use]
    pub fn with_label(&self, label: &str) -> Self {
        self.0
            .iter()
            .filter(|story| story.labels.iter().any(|name| eq_fold(name, label)))
            .cloned()
            .collect()
    }

    /// True when every story is accepted. Vacuously true for an empty set.
    #[must_use]
    pub fn all_accepted(&self) -> bool {
        self.0.iter().all(|story| story.state == StoryState::Accepted)
    }

    /// True when every story has the unscheduled type marker.
    #[must_use]
    pub fn unscheduled(&self) -> bool {
        self.0
            .iter()
            .all(|story| story.story_type == StoryType::Unscheduled)
    }

    /// True when every story is a chore.
    #[must_use]
    pub fn untriaged(&self) -> bool {
        self.0.iter().all(|story| story.story_type == StoryType::Chore)
    }

    /// True when any story carries exactly [`HAS_PR_LABEL`].
    #[must_use]
    pub fn has_pr(&self) -> bool {
        self.0
            .iter()
            .any(|story| story.labels.iter().any(|name| name == HAS_PR_LABEL))
    }

    /// Latest acceptance time, or [`NEVER_ACCEPTED`] when no story has one.
    #[must_use]
    pub fn last_accepted(&self) -> DateTime<Utc> {
        self.0
            .iter()
            .filter_map(|story| story.accepted_at)
            .fold(NEVER_ACCEPTED, |latest, at| latest.max(at))
    }

    /// Split into canonical stories and discarded duplicates.
    #[must_use]
    pub fn dedupe(self) -> Dedupe {
        dedupe::dedupe(self)
    }

    /// Labels describing this set as the stories of a single issue.
    ///
    /// # Errors
    ///
    /// Returns [`LabelError::UnknownStoryState`] when a story's state is not
    /// one the derivation knows how to classify.
    pub fn issue_labels(&self) -> Result<Vec<IssueLabel>, LabelError> {
        labels::derive_issue_labels(self)
    }

    /// Group stories by `external_id`, keeping input order within each group.
    #[must_use]
    pub fn group_by_issue(self) -> IssueGroups {
        let mut groups = IssueGroups::default();
        for story in self.0 {
            match story.external_id.clone() {
                Some(issue) => groups.linked.entry(issue).or_default().push(story),
                None => groups.unlinked.push(story),
            }
        }
        groups
    }
}

/// Case-insensitive equality by full Unicode lowercase mapping
/// (`char::to_lowercase`), not simple case folding: `ß` matches only `ß`,
/// and the long s `ſ` does not match `s`.
fn eq_fold(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

impl From<Vec<Story>> for StorySet {
    fn from(stories: Vec<Story>) -> Self {
        Self(stories)
    }
}

impl FromIterator<Story> for StorySet {
    fn from_iter<I: IntoIterator<Item = Story>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for StorySet {
    type Item = Story;
    type IntoIter = std::vec::IntoIter<Story>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a StorySet {
    type Item = &'a Story;
    type IntoIter = std::slice::Iter<'a, Story>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl AsRef<[Story]> for StorySet {
    fn as_ref(&self) -> &[Story] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn story(id: u64) -> Story {
        Story::new(id, format!("story {id}"))
    }

    #[test]
    fn empty_set_predicates_are_vacuously_true() {
        let set = StorySet::new();
        assert!(set.all_accepted());
        assert!(set.unscheduled());
        assert!(set.untriaged());
        assert!(!set.has_pr());
        assert!(set.with_label("bug").is_empty());
    }

    #[test]
    fn with_label_is_case_insensitive_and_order_preserving() {
        let set: StorySet = vec![
            story(3).with_labels(["Bug"]),
            story(1).with_labels(["docs"]),
            story(2).with_labels(["BUG", "docs"]),
        ]
        .into();
        assert_eq!(set.with_label("bug").ids(), vec![3, 2]);
        assert_eq!(set.with_label("DOCS").ids(), vec![1, 2]);
        assert!(set.with_label("bugs").is_empty());
    }

    #[test]
    fn with_label_folds_non_ascii() {
        let set: StorySet = vec![story(1).with_labels(["Ärger"])].into();
        assert_eq!(set.with_label("ärger").ids(), vec![1]);
    }

    #[test]
    fn with_label_uses_lowercase_mapping() {
        let set: StorySet = vec![
            story(1).with_labels(["ÉTÉ"]),
            story(2).with_labels(["ſtyle"]),
        ]
        .into();
        assert_eq!(set.with_label("été").ids(), vec![1]);
        assert!(set.with_label("style").is_empty());
    }

    #[test]
    fn with_label_includes_story_once_with_repeated_matches() {
        let set: StorySet = vec![story(1).with_labels(["x", "X"])].into();
        assert_eq!(set.with_label("x").len(), 1);
    }

    #[test]
    fn all_accepted_requires_every_story() {
        let mut set: StorySet = vec![
            story(1).with_state(StoryState::Accepted),
            story(2).with_state(StoryState::Accepted),
        ]
        .into();
        assert!(set.all_accepted());
        set.push(story(3).with_state(StoryState::Delivered));
        assert!(!set.all_accepted());
    }

    #[test]
    fn unscheduled_checks_type_marker_not_state() {
        let by_state: StorySet = vec![
            story(1)
                .with_type(StoryType::Feature)
                .with_state(StoryState::Unscheduled),
        ]
        .into();
        assert!(!by_state.unscheduled());

        let by_type: StorySet = vec![
            story(1).with_type(StoryType::Unscheduled),
            story(2).with_type(StoryType::Unscheduled),
        ]
        .into();
        assert!(by_type.unscheduled());
    }

    #[test]
    fn untriaged_means_all_chores() {
        let chores: StorySet = vec![
            story(1).with_type(StoryType::Chore),
            story(2).with_type(StoryType::Chore),
        ]
        .into();
        assert!(chores.untriaged());

        let mixed: StorySet = vec![
            story(1).with_type(StoryType::Chore),
            story(2).with_type(StoryType::Bug),
        ]
        .into();
        assert!(!mixed.untriaged());
    }

    #[test]
    fn has_pr_is_case_sensitive() {
        let upper: StorySet = vec![story(1).with_labels(["Has-PR"])].into();
        assert!(!upper.has_pr());

        let exact: StorySet = vec![story(1), story(2).with_labels(["x", "has-pr"])].into();
        assert!(exact.has_pr());
    }

    #[test]
    fn last_accepted_picks_latest() {
        let early = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 6, 30, 8, 0, 0).unwrap();
        let set: StorySet = vec![
            story(1).with_accepted_at(late),
            story(2),
            story(3).with_accepted_at(early),
        ]
        .into();
        assert_eq!(set.last_accepted(), late);
    }

    #[test]
    fn last_accepted_without_timestamps_is_epoch() {
        let set: StorySet = vec![story(1), story(2)].into();
        assert_eq!(set.last_accepted(), NEVER_ACCEPTED);
        assert_eq!(NEVER_ACCEPTED.timestamp(), 0);
        assert_eq!(StorySet::new().last_accepted(), NEVER_ACCEPTED);
    }

    #[test]
    fn group_by_issue_partitions_and_keeps_order() {
        let set: StorySet = vec![
            story(4).with_external_id("acme/web#2"),
            story(1),
            story(2).with_external_id("acme/web#1"),
            story(3).with_external_id("acme/web#2"),
        ]
        .into();
        let groups = set.group_by_issue();
        assert_eq!(groups.linked.len(), 2);
        assert_eq!(groups.linked["acme/web#1"].ids(), vec![2]);
        assert_eq!(groups.linked["acme/web#2"].ids(), vec![4, 3]);
        assert_eq!(groups.unlinked.ids(), vec![1]);
    }

    #[test]
    fn serializes_as_plain_array() {
        let set: StorySet = vec![story(1)].into();
        let value = serde_json::to_value(&set).unwrap();
        assert!(value.is_array());
        let back: StorySet = serde_json::from_value(value).unwrap();
        assert_eq!(back, set);
    }
}
