//! Property-based tests for payload assembly
//!
//! - History text comes first, in transcript order
//! - A new image is always the final part
//! - An image-only turn never sends blank text

use super::*;
use crate::runtime::testing::MockLlmService;
use proptest::prelude::*;

fn assembler() -> RequestAssembler {
    RequestAssembler::new(
        Arc::new(MockLlmService::new("test-model")),
        AssemblyOptions::default(),
    )
}

fn arb_image() -> impl Strategy<Value = ImageBlob> {
    (
        prop_oneof![Just("image/png"), Just("image/jpeg")],
        proptest::collection::vec(any::<u8>(), 1..32),
    )
        .prop_map(|(media_type, bytes)| ImageBlob::new(media_type, bytes).unwrap())
}

/// Transcript turns, some carrying images
fn arb_history() -> impl Strategy<Value = Vec<Turn>> {
    proptest::collection::vec(
        prop_oneof![
            "[a-zA-Z][a-zA-Z ]{0,20}".prop_map(|t| Turn::user(t, None).unwrap()),
            ("[a-zA-Z ]{0,20}", arb_image()).prop_map(|(t, img)| Turn::user(t, Some(img)).unwrap()),
            "[a-zA-Z][a-zA-Z ]{0,20}".prop_map(|t| Turn::assistant(t).unwrap()),
        ],
        0..12,
    )
}

proptest! {
    #[test]
    fn history_text_leads_in_order(
        history in arb_history(),
        text in "[a-zA-Z ]{0,20}",
        image in proptest::option::of(arb_image()),
    ) {
        let payload = assembler().build_request(&history, &text, image.as_ref());
        let expected: Vec<&str> = history
            .iter()
            .map(Turn::text)
            .filter(|t| !t.trim().is_empty())
            .collect();
        let sent: Vec<&str> = payload.texts().take(expected.len()).collect();
        prop_assert_eq!(sent, expected);
    }

    #[test]
    fn new_image_is_last_and_only(
        history in arb_history(),
        text in "[a-zA-Z ]{0,20}",
        image in arb_image(),
    ) {
        let payload = assembler().build_request(&history, &text, Some(&image));
        prop_assert_eq!(payload.image_count(), 1);
        prop_assert_eq!(payload.parts().last(), Some(&ContentPart::Image(image)));
    }

    #[test]
    fn image_only_sends_default_prompt(history in arb_history(), image in arb_image()) {
        let payload = assembler().build_request(&history, "", Some(&image));
        let last_text = payload.texts().last();
        prop_assert_eq!(last_text, Some(DEFAULT_IMAGE_PROMPT));
        prop_assert!(payload.texts().all(|t| !t.trim().is_empty()));
    }
}
