//! Visibility filter, text filter and sort over an in-memory note list.
//!
//! # Invariants
//! - Steps run in fixed order: visibility, text, sort.
//! - The input slice is never mutated; a new list is returned.
//! - Sorting is stable in both directions: notes with equal keys keep
//!   their input order whether ascending or descending.

use crate::model::note::Note;
use crate::model::order::{NoteOrder, OrderType};
use std::cmp::Ordering;

/// Runs the full pipeline.
///
/// Blank `search_text` (empty or whitespace-only) keeps every note.
/// Non-blank text is matched as-is, case-insensitively, against title or
/// content.
pub fn query_notes(
    notes: &[Note],
    order: NoteOrder,
    search_text: &str,
    include_protected: bool,
) -> Vec<Note> {
    let needle = normalized_needle(search_text);
    let mut visible = notes
        .iter()
        .filter(|note| include_protected || !note.is_protected)
        .filter(|note| {
            needle
                .as_deref()
                .map_or(true, |needle| matches_text(note, needle))
        })
        .cloned()
        .collect::<Vec<_>>();

    sort_notes(&mut visible, order);
    visible
}

/// Stable in-place sort by `order`.
pub fn sort_notes(notes: &mut [Note], order: NoteOrder) {
    match order {
        NoteOrder::Title(order_type) => {
            // Lower-case once per note instead of once per comparison.
            let mut keyed = notes
                .iter()
                .map(|note| note.title.to_lowercase())
                .zip(notes.iter().cloned())
                .collect::<Vec<_>>();
            keyed.sort_by(|(left, _), (right, _)| directed(left.cmp(right), order_type));
            for (slot, (_, note)) in notes.iter_mut().zip(keyed) {
                *slot = note;
            }
        }
        NoteOrder::Date(order_type) => {
            notes.sort_by(|left, right| {
                directed(left.timestamp.cmp(&right.timestamp), order_type)
            });
        }
    }
}

fn directed(ordering: Ordering, order_type: OrderType) -> Ordering {
    match order_type {
        OrderType::Ascending => ordering,
        OrderType::Descending => ordering.reverse(),
    }
}

fn normalized_needle(search_text: &str) -> Option<String> {
    if search_text.trim().is_empty() {
        None
    } else {
        Some(search_text.to_lowercase())
    }
}

fn matches_text(note: &Note, needle: &str) -> bool {
    note.title.to_lowercase().contains(needle) || note.content.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::query_notes;
    use crate::model::note::Note;
    use crate::model::order::{NoteOrder, OrderType};

    fn note(id: i64, title: &str, content: &str, timestamp: i64, is_protected: bool) -> Note {
        Note {
            id: Some(id),
            title: title.to_string(),
            content: content.to_string(),
            timestamp,
            is_protected,
        }
    }

    fn ids(notes: &[Note]) -> Vec<i64> {
        notes.iter().filter_map(|note| note.id).collect()
    }

    fn sample() -> Vec<Note> {
        vec![
            note(1, "B", "", 100, false),
            note(2, "A", "", 200, false),
        ]
    }

    #[test]
    fn title_ascending_orders_by_title() {
        let result = query_notes(&sample(), NoteOrder::Title(OrderType::Ascending), "", false);
        assert_eq!(ids(&result), vec![2, 1]);
    }

    #[test]
    fn date_descending_orders_newest_first() {
        let result = query_notes(&sample(), NoteOrder::Date(OrderType::Descending), "", false);
        assert_eq!(ids(&result), vec![2, 1]);
    }

    #[test]
    fn protected_notes_are_hidden_unless_included() {
        let mut notes = sample();
        notes.push(note(3, "secret", "", 300, true));

        let hidden = query_notes(&notes, NoteOrder::default(), "", false);
        assert!(!ids(&hidden).contains(&3));

        let shown = query_notes(&notes, NoteOrder::default(), "", true);
        assert!(ids(&shown).contains(&3));
    }

    #[test]
    fn text_filter_matches_title_or_content_case_insensitively() {
        let notes = vec![
            note(1, "Groceries", "milk", 1, false),
            note(2, "Work", "call GROCER", 2, false),
            note(3, "Misc", "nothing", 3, false),
        ];
        let result = query_notes(&notes, NoteOrder::Date(OrderType::Ascending), "grocer", false);
        assert_eq!(ids(&result), vec![1, 2]);
    }

    #[test]
    fn blank_search_text_keeps_everything() {
        let notes = sample();
        for blank in ["", "   ", "\t\n"] {
            let result = query_notes(&notes, NoteOrder::Date(OrderType::Ascending), blank, false);
            assert_eq!(ids(&result), vec![1, 2], "search text {blank:?}");
        }
    }

    #[test]
    fn search_text_is_not_trimmed_when_non_blank() {
        let notes = vec![note(1, "ab", "", 1, false), note(2, "a b", "", 2, false)];
        let result = query_notes(&notes, NoteOrder::Date(OrderType::Ascending), " b", false);
        assert_eq!(ids(&result), vec![2]);
    }

    #[test]
    fn visibility_filter_applies_before_text_filter() {
        let notes = vec![note(1, "plan", "", 1, true), note(2, "plan", "", 2, false)];
        let result = query_notes(&notes, NoteOrder::Date(OrderType::Ascending), "plan", false);
        assert_eq!(ids(&result), vec![2]);
    }

    #[test]
    fn equal_keys_keep_input_order_in_both_directions() {
        let notes = vec![
            note(1, "same", "", 50, false),
            note(2, "Same", "", 50, false),
            note(3, "other", "", 10, false),
        ];

        let asc = query_notes(&notes, NoteOrder::Title(OrderType::Ascending), "", false);
        assert_eq!(ids(&asc), vec![3, 1, 2]);
        let desc = query_notes(&notes, NoteOrder::Title(OrderType::Descending), "", false);
        assert_eq!(ids(&desc), vec![1, 2, 3]);

        let date_asc = query_notes(&notes, NoteOrder::Date(OrderType::Ascending), "", false);
        assert_eq!(ids(&date_asc), vec![3, 1, 2]);
        let date_desc = query_notes(&notes, NoteOrder::Date(OrderType::Descending), "", false);
        assert_eq!(ids(&date_desc), vec![1, 2, 3]);
    }

    #[test]
    fn query_is_pure_and_does_not_touch_input() {
        let notes = sample();
        let snapshot = notes.clone();
        let first = query_notes(&notes, NoteOrder::Title(OrderType::Ascending), "a", true);
        let second = query_notes(&notes, NoteOrder::Title(OrderType::Ascending), "a", true);
        assert_eq!(first, second);
        assert_eq!(notes, snapshot);
    }
}
