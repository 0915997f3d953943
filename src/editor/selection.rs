use serde::Serialize;

use crate::models::AnnotationSet;

/// Weak reference to one interval by position.
///
/// Positions shift on every structural edit, so each edit passes the
/// selection through one of the `after_*` methods. `None` means the selected
/// interval no longer exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub query_index: usize,
    pub interval_index: usize,
}

impl Selection {
    pub fn new(query_index: usize, interval_index: usize) -> Self {
        Self {
            query_index,
            interval_index,
        }
    }

    /// An interval was inserted at `position` in query `query_index`.
    pub fn after_insert(self, query_index: usize, position: usize) -> Option<Self> {
        if self.query_index != query_index || self.interval_index < position {
            return Some(self);
        }
        Some(Self::new(self.query_index, self.interval_index + 1))
    }

    /// The interval at `position` in query `query_index` was removed.
    pub fn after_remove(self, query_index: usize, position: usize) -> Option<Self> {
        if self.query_index != query_index || self.interval_index < position {
            return Some(self);
        }
        if self.interval_index == position {
            return None;
        }
        Some(Self::new(self.query_index, self.interval_index - 1))
    }

    /// The interval at `from` now sits at `to` after a re-sort.
    pub fn after_move(self, query_index: usize, from: usize, to: usize) -> Option<Self> {
        if self.query_index != query_index {
            return Some(self);
        }
        if self.interval_index == from {
            return Some(Self::new(query_index, to));
        }
        self.after_remove(query_index, from)
            .and_then(|selection| selection.after_insert(query_index, to))
    }

    pub fn is_valid_in(&self, set: &AnnotationSet) -> bool {
        set.query(self.query_index)
            .map(|query| self.interval_index < query.intervals().len())
            .unwrap_or(false)
    }
}
