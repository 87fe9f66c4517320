use proptest::prelude::*;
use storysync_core::{Story, StorySet, StoryState, StoryType};

pub fn arb_known_state() -> impl Strategy<Value = StoryState> + Clone {
    prop::sample::select(StoryState::KNOWN.to_vec())
}

pub fn arb_type() -> impl Strategy<Value = StoryType> + Clone {
    prop_oneof![
        4 => prop::sample::select(StoryType::KNOWN.to_vec()),
        1 => Just(StoryType::Other("epic".to_string())),
    ]
}

/// Small pools so that generated sets contain plenty of duplicates.
fn arb_content() -> impl Strategy<Value = (String, String, Vec<String>)> {
    (
        prop::sample::select(vec!["Fix login", "Add export", "fix login"]),
        prop::sample::select(vec!["", "details", "Details"]),
        prop::collection::vec(prop::sample::select(vec!["ui", "api", "UI", "has-pr"]), 0..3),
    )
        .prop_map(|(name, description, labels)| {
            (
                name.to_string(),
                description.to_string(),
                labels.into_iter().map(str::to_string).collect(),
            )
        })
}

fn arb_story_body() -> impl Strategy<Value = Story> {
    (arb_content(), arb_type(), arb_known_state()).prop_map(
        |((name, description, labels), story_type, state)| {
            Story::new(0, name)
                .with_description(description)
                .with_labels(labels)
                .with_type(story_type)
                .with_state(state)
        },
    )
}

/// A story set with unique ids in arbitrary order.
pub fn arb_story_set() -> impl Strategy<Value = StorySet> {
    prop::collection::vec(arb_story_body(), 0..40).prop_flat_map(|bodies| {
        let n = bodies.len();
        (
            Just(bodies),
            prop::collection::hash_set(1u64..100_000, n..=n),
        )
            .prop_map(|(bodies, ids)| {
                bodies
                    .into_iter()
                    .zip(ids)
                    .map(|(mut story, id)| {
                        story.id = id;
                        story
                    })
                    .collect::<StorySet>()
            })
    })
}
