//! Visible-range tracking and slicing
//!
//! The tracker stores whatever first/last row indices the widget reports.
//! Bounds are only enforced when a dataset is sliced.

use serde::{Deserialize, Serialize};

use crate::dataset::Row;

/// Inclusive range of row indices currently scrolled into view
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct VisibleRange {
    pub start: usize,
    pub end: usize,
}

impl VisibleRange {
    /// Create a range, raising `end` to `start` when it arrives below it
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// Number of indices covered, ignoring dataset bounds
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start).saturating_add(1)
    }

    /// Slice `rows` to this range, clamped to the rows available
    ///
    /// A range past the end of `rows` yields a shorter or empty slice.
    pub fn slice<'a>(&self, rows: &'a [Row]) -> &'a [Row] {
        if self.start >= rows.len() || self.end < self.start {
            return &[];
        }
        let end = self.end.min(rows.len() - 1);
        &rows[self.start..=end]
    }
}

impl Default for VisibleRange {
    fn default() -> Self {
        Self { start: 0, end: 50 }
    }
}

/// Records the viewport reported by the grid widget
#[derive(Debug, Clone, Default)]
pub struct VisibleRangeTracker {
    range: VisibleRange,
}

impl VisibleRangeTracker {
    /// Start tracking from `initial`, before the widget reports anything
    pub fn new(initial: VisibleRange) -> Self {
        Self { range: initial }
    }

    /// Handle a viewport-scroll notification
    pub fn on_viewport_changed(&mut self, first: usize, last: usize) {
        self.range = VisibleRange::new(first, last);
        tracing::trace!(start = self.range.start, end = self.range.end, "Viewport changed");
    }

    /// Most recently reported viewport
    pub fn range(&self) -> VisibleRange {
        self.range
    }
}
