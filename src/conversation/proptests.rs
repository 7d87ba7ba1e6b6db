//! Property-based tests for transcript storage

use super::*;
use proptest::prelude::*;

fn arb_image() -> impl Strategy<Value = ImageBlob> {
    (
        prop_oneof![Just("image/png"), Just("image/jpeg")],
        proptest::collection::vec(any::<u8>(), 1..64),
    )
        .prop_map(|(media_type, bytes)| ImageBlob::new(media_type, bytes).unwrap())
}

fn arb_turn() -> impl Strategy<Value = Turn> {
    prop_oneof![
        "[a-zA-Z0-9][a-zA-Z0-9 ]{0,39}".prop_map(|text| Turn::user(text, None).unwrap()),
        ("[a-zA-Z0-9 ]{0,40}", arb_image())
            .prop_map(|(text, image)| Turn::user(text, Some(image)).unwrap()),
        "[a-zA-Z0-9][a-zA-Z0-9 ]{0,39}".prop_map(|text| Turn::assistant(text).unwrap()),
    ]
}

proptest! {
    #[test]
    fn all_returns_insertion_order(turns in proptest::collection::vec(arb_turn(), 0..50)) {
        let mut store = ConversationStore::default();
        for turn in &turns {
            store.append(turn.clone());
        }
        let stored: Vec<Turn> = store.all().cloned().collect();
        prop_assert_eq!(stored, turns);
    }

    #[test]
    fn clear_always_empties(turns in proptest::collection::vec(arb_turn(), 0..30)) {
        let mut store = ConversationStore::default();
        for turn in turns {
            store.append(turn);
        }
        store.clear();
        prop_assert_eq!(store.all().count(), 0);
    }

    #[test]
    fn cap_keeps_newest_suffix(
        turns in proptest::collection::vec(arb_turn(), 0..60),
        cap in 2usize..20,
    ) {
        let mut store = ConversationStore::with_max_turns(cap);
        for turn in &turns {
            store.append(turn.clone());
        }
        let stored: Vec<Turn> = store.all().cloned().collect();

        prop_assert!(stored.len() <= cap);
        prop_assert_eq!(stored.as_slice(), &turns[turns.len() - stored.len()..]);
        if turns.len() <= cap {
            prop_assert_eq!(stored.len(), turns.len());
        }

        // A kept reply never loses the question right before it
        let start = turns.len() - stored.len();
        if start > 0 && stored.first().is_some_and(|t| t.role() == Role::Assistant) {
            prop_assert_ne!(turns[start - 1].role(), Role::User);
        }
    }
}
