//! Duplicate removal by content equivalence.
//!
//! # Algorithm
//!
//! 1. Bucket every story by its [`EquivalenceKey`].
//! 2. In each bucket, the story with the smallest `id` (the oldest) survives
//!    as canonical; every other story in the bucket is discarded.
//! 3. Both outputs are sorted by ascending `id`.
//!
//! Every input story lands in exactly one of the two outputs.
//!
//! # Performance
//!
//! O(n log n) in the number of stories.

use std::collections::HashMap;

use tracing::debug;

use crate::equivalence::EquivalenceKey;
use crate::model::story::Story;
use crate::story_set::StorySet;

/// Result of deduplicating a [`StorySet`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dedupe {
    /// One story per equivalence class, sorted by id.
    pub canonical: StorySet,
    /// Every non-surviving duplicate, sorted by id.
    pub discarded: StorySet,
    /// `(discarded id, canonical id)` pairs, sorted by discarded id.
    pub duplicates: Vec<(u64, u64)>,
}

impl Dedupe {
    /// The canonical id a discarded story was folded into.
    #[must_use]
    pub fn survivor_of(&self, discarded_id: u64) -> Option<u64> {
        self.duplicates
            .binary_search_by_key(&discarded_id, |&(dup, _)| dup)
            .ok()
            .map(|idx| self.duplicates[idx].1)
    }
}

/// Partition `stories` into canonical stories and discarded duplicates.
#[must_use]
pub fn dedupe(stories: StorySet) -> Dedupe {
    let total = stories.len();
    let mut buckets: HashMap<EquivalenceKey, Vec<Story>> = HashMap::new();
    for story in stories {
        buckets
            .entry(EquivalenceKey::of(&story))
            .or_default()
            .push(story);
    }

    let mut canonical = Vec::with_capacity(buckets.len());
    let mut discarded = Vec::with_capacity(total - buckets.len());
    let mut duplicates = Vec::new();

    for mut bucket in buckets.into_values() {
        bucket.sort_by_key(|story| story.id);
        let mut members = bucket.into_iter();
        let Some(oldest) = members.next() else {
            continue;
        };
        for dup in members {
            duplicates.push((dup.id, oldest.id));
            discarded.push(dup);
        }
        canonical.push(oldest);
    }

    canonical.sort_by_key(|story| story.id);
    discarded.sort_by_key(|story| story.id);
    duplicates.sort_unstable();

    debug!(
        total,
        canonical = canonical.len(),
        discarded = discarded.len(),
        "deduplicated stories"
    );

    Dedupe {
        canonical: canonical.into(),
        discarded: discarded.into(),
        duplicates,
    }
}
