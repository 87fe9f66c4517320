//! Content fingerprint used to decide that two stories are duplicates.
//!
//! Two stories are equivalent when their name, description, and label set are
//! identical. Identity, state, and type are not part of the key.

use crate::model::story::Story;

/// `(name, description, sorted labels joined by ",")`.
///
/// Comparison is exact. Labels are sorted in byte order, so `"Bug"` and
/// `"bug"` produce different signatures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EquivalenceKey {
    pub name: String,
    pub description: String,
    pub labels: String,
}

impl EquivalenceKey {
    #[must_use]
    pub fn of(story: &Story) -> Self {
        let mut names: Vec<&str> = story.labels.iter().map(String::as_str).collect();
        names.sort_unstable();

        Self {
            name: story.name.clone(),
            description: story.description.clone(),
            labels: names.join(","),
        }
    }
}

impl From<&Story> for EquivalenceKey {
    fn from(story: &Story) -> Self {
        Self::of(story)
    }
}

#[cfg(test)]
mod tests {
    use super::EquivalenceKey;
    use crate::model::story::{Story, StoryState, StoryType};

    #[test]
    fn label_order_does_not_matter() {
        let a = Story::new(1, "n").with_labels(["zeta", "alpha", "mid"]);
        let b = Story::new(2, "n").with_labels(["mid", "zeta", "alpha"]);
        assert_eq!(EquivalenceKey::of(&a), EquivalenceKey::of(&b));
        assert_eq!(EquivalenceKey::of(&a).labels, "alpha,mid,zeta");
    }

    #[test]
    fn ignores_id_state_and_type() {
        let a = Story::new(1, "n")
            .with_state(StoryState::Accepted)
            .with_type(StoryType::Bug);
        let b = Story::new(99, "n")
            .with_state(StoryState::Started)
            .with_type(StoryType::Chore);
        assert_eq!(EquivalenceKey::of(&a), EquivalenceKey::of(&b));
    }

    #[test]
    fn text_comparison_is_exact() {
        let base = Story::new(1, "Fix login").with_description("desc");
        let spaced = Story::new(2, "Fix login ").with_description("desc");
        let cased = Story::new(3, "fix login").with_description("desc");
        let other_desc = Story::new(4, "Fix login").with_description("Desc");
        let key = EquivalenceKey::of(&base);
        assert_ne!(key, EquivalenceKey::of(&spaced));
        assert_ne!(key, EquivalenceKey::of(&cased));
        assert_ne!(key, EquivalenceKey::of(&other_desc));
    }

    #[test]
    fn label_case_is_significant() {
        let a = Story::new(1, "n").with_labels(["Bug"]);
        let b = Story::new(2, "n").with_labels(["bug"]);
        assert_ne!(EquivalenceKey::of(&a), EquivalenceKey::of(&b));
    }

    #[test]
    fn sorts_in_byte_order() {
        let story = Story::new(1, "n").with_labels(["b", "B", "a"]);
        assert_eq!(EquivalenceKey::from(&story).labels, "B,a,b");
    }
}
