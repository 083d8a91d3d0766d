//! Identity-based selection store
//!
//! Selection is tracked by row id, never by position, so re-sorting or
//! re-windowing the dataset cannot change which rows are selected.

use ahash::AHashSet;

use crate::value::RowId;

/// Set of selected row ids
#[derive(Debug, Clone, Default)]
pub struct SelectionStore {
    selected: AHashSet<RowId>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `id`. Returns the new membership.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(id.to_string());
            true
        }
    }

    /// Replace the selection with exactly `ids`
    pub fn select_all<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<RowId>,
    {
        self.selected.clear();
        self.selected.extend(ids.into_iter().map(Into::into));
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    /// Number of selected ids, including ids no longer in the dataset
    pub fn size(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Keep only ids for which `is_current` holds. Returns how many were pruned.
    pub fn retain_ids<F>(&mut self, mut is_current: F) -> usize
    where
        F: FnMut(&str) -> bool,
    {
        let before = self.selected.len();
        self.selected.retain(|id| is_current(id));
        before - self.selected.len()
    }
}
