//! Multi-select state for bulk actions.
//!
//! # Invariants
//! - Selection mode is active exactly when the set is non-empty.
//! - Leaving selection mode also drops a pending bulk-delete confirmation.

use crate::model::note::NoteId;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    selected: BTreeSet<NoteId>,
    confirm_pending: bool,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        !self.selected.is_empty()
    }

    pub fn ids(&self) -> &BTreeSet<NoteId> {
        &self.selected
    }

    pub fn contains(&self, id: NoteId) -> bool {
        self.selected.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Starts selection mode with only `id`; toggles when already active.
    pub fn enter(&mut self, id: NoteId) {
        if self.is_active() {
            self.toggle(id);
        } else {
            self.selected = BTreeSet::from([id]);
        }
    }

    pub fn toggle(&mut self, id: NoteId) {
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
        if self.selected.is_empty() {
            self.confirm_pending = false;
        }
    }

    /// Selects every known id, or clears the set if it already equals them.
    pub fn select_all(&mut self, known: impl IntoIterator<Item = NoteId>) {
        let all = known.into_iter().collect::<BTreeSet<_>>();
        if self.selected == all {
            self.exit();
        } else {
            self.selected = all;
        }
    }

    /// Drops ids that are no longer in `known`; an emptied set leaves
    /// selection mode.
    pub fn retain_known(&mut self, known: impl IntoIterator<Item = NoteId>) {
        let known = known.into_iter().collect::<BTreeSet<_>>();
        self.selected.retain(|id| known.contains(id));
        if self.selected.is_empty() {
            self.confirm_pending = false;
        }
    }

    pub fn exit(&mut self) {
        self.selected.clear();
        self.confirm_pending = false;
    }

    /// Opens the bulk-delete confirmation; refused for an empty selection.
    pub fn request_bulk_delete(&mut self) -> bool {
        self.confirm_pending = self.is_active();
        self.confirm_pending
    }

    pub fn dismiss_bulk_delete(&mut self) {
        self.confirm_pending = false;
    }

    pub fn confirm_pending(&self) -> bool {
        self.confirm_pending
    }
}

#[cfg(test)]
mod tests {
    use super::SelectionSet;

    #[test]
    fn enter_starts_with_single_id_then_toggles() {
        let mut selection = SelectionSet::new();
        selection.enter(4);
        assert!(selection.is_active());
        assert_eq!(selection.ids().iter().copied().collect::<Vec<_>>(), vec![4]);

        selection.enter(5);
        assert!(selection.contains(5));
        selection.enter(4);
        assert!(!selection.contains(4));
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn toggling_last_id_leaves_selection_mode() {
        let mut selection = SelectionSet::new();
        selection.enter(1);
        assert!(selection.request_bulk_delete());
        selection.toggle(1);
        assert!(!selection.is_active());
        assert!(!selection.confirm_pending());
    }

    #[test]
    fn select_all_twice_returns_to_empty() {
        let mut selection = SelectionSet::new();
        selection.select_all([1, 2, 3]);
        assert_eq!(selection.len(), 3);
        selection.select_all([1, 2, 3]);
        assert!(selection.is_empty());
    }

    #[test]
    fn select_all_with_partial_selection_selects_everything() {
        let mut selection = SelectionSet::new();
        selection.enter(2);
        selection.select_all([1, 2, 3]);
        assert_eq!(selection.len(), 3);
    }

    #[test]
    fn select_all_after_known_set_changed_selects_new_set() {
        let mut selection = SelectionSet::new();
        selection.select_all([1, 2]);
        selection.select_all([1, 2, 3]);
        assert_eq!(selection.len(), 3);
    }

    #[test]
    fn retain_known_drops_vanished_ids() {
        let mut selection = SelectionSet::new();
        selection.select_all([1, 2]);
        selection.retain_known([2, 3]);
        assert_eq!(selection.ids().iter().copied().collect::<Vec<_>>(), vec![2]);

        assert!(selection.request_bulk_delete());
        selection.retain_known([3]);
        assert!(!selection.is_active());
        assert!(!selection.confirm_pending());
    }

    #[test]
    fn bulk_delete_request_requires_selection_and_exit_clears_it() {
        let mut selection = SelectionSet::new();
        assert!(!selection.request_bulk_delete());

        selection.enter(7);
        assert!(selection.request_bulk_delete());
        selection.exit();
        assert!(selection.is_empty());
        assert!(!selection.confirm_pending());
    }
}
