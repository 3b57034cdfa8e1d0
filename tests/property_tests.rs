//! Property-based tests for chunking and windowing invariants.
//!
//! Tests validate:
//! 1. Plain and markup splits concatenate back to the input
//! 2. Markup boundaries never fall inside a tag
//! 3. Replace windows always span min(2t, n) chunks inside [0, n)
//! 4. needs_update is false once the window for a pointer is materialized

use proptest::prelude::*;
use virtual_content::chunk::{split_markup, split_plain, ChunkSequence};
use virtual_content::model::ContentType;
use virtual_content::view_state::window::{append_range, replace_range};
use virtual_content::view_state::{WindowMode, WindowState};

/// Tag soup: text without angle brackets interleaved with `<name attr>` tags.
fn tag_soup() -> impl Strategy<Value = String> {
    let text = "[a-z .\n]{0,12}";
    let tag = "<[a-z/][a-z =\"]{0,10}>";
    prop::collection::vec(prop_oneof![text, tag], 0..40).prop_map(|parts| parts.concat())
}

/// Half-open char ranges `[start, end)` of every tag in `content`.
fn tag_spans(content: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut open = None;
    for (i, ch) in content.chars().enumerate() {
        match ch {
            '<' => open = Some(i),
            '>' => {
                if let Some(start) = open.take() {
                    spans.push((start, i + 1));
                }
            }
            _ => {}
        }
    }
    spans
}

/// Char offsets where one chunk ends and the next begins.
fn boundaries(chunks: &[String]) -> Vec<usize> {
    let mut position = 0;
    let mut out = Vec::new();
    for chunk in &chunks[..chunks.len() - 1] {
        position += chunk.chars().count();
        out.push(position);
    }
    out
}

// ===== Property 1: Round trips =====

proptest! {
    #[test]
    fn plain_split_round_trips(content in any::<String>(), len in 1usize..64) {
        let chunks = split_plain(&content, len).unwrap();
        prop_assert_eq!(chunks.concat(), content);
    }

    #[test]
    fn plain_split_respects_length(content in any::<String>(), len in 1usize..64) {
        let chunks = split_plain(&content, len).unwrap();
        prop_assert!(chunks.iter().all(|c| c.chars().count() <= len));
        if !content.is_empty() {
            prop_assert!(chunks.iter().all(|c| !c.is_empty()));
        }
    }

    #[test]
    fn markup_split_round_trips(content in any::<String>(), len in 1usize..64) {
        let chunks = split_markup(&content, len).unwrap();
        prop_assert_eq!(chunks.concat(), content);
    }

    #[test]
    fn sequence_is_never_empty(content in any::<String>(), len in 1usize..64, html in any::<bool>()) {
        let content_type = if html { ContentType::Html } else { ContentType::Text };
        let sequence = ChunkSequence::split(&content, len, content_type).unwrap();
        prop_assert!(sequence.len() >= 1);
        prop_assert_eq!(sequence.concat(), content);
    }
}

// ===== Property 2: Markup boundary safety =====

proptest! {
    #[test]
    fn markup_boundaries_stay_outside_tags(content in tag_soup(), len in 1usize..24) {
        let chunks = split_markup(&content, len).unwrap();
        let spans = tag_spans(&content);

        for boundary in boundaries(&chunks) {
            for &(start, end) in &spans {
                prop_assert!(
                    boundary <= start || boundary >= end,
                    "boundary {} inside tag [{}, {}) of {:?}",
                    boundary, start, end, content
                );
            }
        }
    }
}

// ===== Property 3: Window spans =====

proptest! {
    #[test]
    fn replace_window_has_fixed_span(
        len in 1usize..500,
        threshold in prop_oneof![1usize..20, (1usize << 40)..],
        pointer_seed in any::<usize>(),
    ) {
        let pointer = pointer_seed % len;
        let range = replace_range(pointer, threshold, len);

        prop_assert!(range.end <= len);
        prop_assert!(range.start <= range.end);
        prop_assert_eq!(range.len(), threshold.saturating_mul(2).min(len));
    }

    #[test]
    fn append_window_starts_at_pointer(
        len in 1usize..500,
        threshold in prop_oneof![1usize..20, (1usize << 40)..],
        pointer_seed in any::<usize>(),
    ) {
        let pointer = pointer_seed % len;
        let range = append_range(pointer, threshold, len);

        prop_assert_eq!(range.start, pointer);
        prop_assert_eq!(range.len(), threshold.min(len - pointer));
    }
}

// ===== Property 4: needs_update idempotence =====

proptest! {
    #[test]
    fn materialized_window_needs_no_update(
        len in 1usize..200,
        threshold in 1usize..10,
        pointer_seed in any::<usize>(),
        append in any::<bool>(),
    ) {
        let pointer = pointer_seed % len;
        let mut state = WindowState::new(WindowMode::from_append(append), threshold);
        let window = state.target(pointer, len);
        state.visible.extend(window.indices());

        prop_assert!(!state.needs_update(pointer, pointer, len));
    }
}
