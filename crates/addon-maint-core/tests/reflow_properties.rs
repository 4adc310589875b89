//! Property tests for the line reflow.

use addon_maint_core::reflow::{reflow_line, reflow_text};
use proptest::prelude::*;

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Prose that never looks like a labelled list item.
fn prose() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-zA-Z0-9.,;()]{1,18}", 1..40).prop_map(|words| words.join(" "))
}

proptest! {
    #[test]
    fn lines_within_limit_are_returned_verbatim(line in "\\PC{0,60}", extra in 0usize..20) {
        let max = char_len(&line) + extra;
        prop_assert_eq!(reflow_line(&line, max), vec![line.clone()]);
    }

    #[test]
    fn tokens_without_whitespace_pass_through(token in "[a-zA-Z0-9/:._-]{1,200}", max in 1usize..80) {
        prop_assert_eq!(reflow_line(&token, max), vec![token.clone()]);
    }

    #[test]
    fn word_wrap_keeps_every_token_in_order(line in prose(), max in 10usize..80) {
        let out = reflow_line(&line, max);
        let rejoined: Vec<&str> = out.iter().flat_map(|l| l.split_whitespace()).collect();
        let original: Vec<&str> = line.split_whitespace().collect();
        prop_assert_eq!(rejoined, original);
    }

    #[test]
    fn word_wrap_respects_the_limit(line in prose(), max in 10usize..80) {
        for out in reflow_line(&line, max) {
            let single_token = !out.contains(' ');
            prop_assert!(char_len(&out) <= max || single_token, "{out:?} exceeds {max}");
        }
    }

    #[test]
    fn reflowing_wrapped_output_changes_nothing(line in prose(), max in 10usize..80) {
        for out in reflow_line(&line, max) {
            prop_assert_eq!(reflow_line(&out, max), vec![out.clone()]);
        }
    }

    #[test]
    fn labelled_items_split_into_two_lines(
        label in "[A-Za-z]{1,10}",
        body in prop::collection::vec("[a-z]{2,9}", 12..30),
    ) {
        let line = format!("- **{label}**: {}", body.join(" "));
        let max = 40;
        let out = reflow_line(&line, max);
        prop_assert_eq!(out.len(), 2);
        let head = format!("- **{label}**: ");
        prop_assert!(out[0].starts_with(&head));
        prop_assert!(out[1].starts_with("  "));
        prop_assert!(!out[1].trim().is_empty());
    }

    #[test]
    fn text_keeps_line_count_for_short_documents(lines in prop::collection::vec("[a-z ]{0,30}", 0..20)) {
        let text = lines.join("\n");
        prop_assert_eq!(reflow_text(&text, 40), text);
    }
}
