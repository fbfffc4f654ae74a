//! Grid widget boundary
//!
//! The widget itself lives outside this crate. `GridSink` is the narrow
//! surface the render loop drives; `GridState` mirrors the widget flags that
//! must suppress updates while the user is interacting with it.

use crate::dataset::Row;

/// Receives row data from the render loop
pub trait GridSink: Send + 'static {
    /// Replace the grid contents wholesale (initial load)
    fn load(&mut self, rows: &[Row]);

    /// Apply an incremental update for the given rows
    fn apply_update(&mut self, rows: &[Row]);
}

/// Interaction flags reported by the grid widget
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridState {
    /// A column filter popup is open
    pub filter_open: bool,
    /// A cell editor is active
    pub cell_editing: bool,
}

impl GridState {
    /// Whether the widget is busy and frame work should be skipped
    pub fn is_busy(&self) -> bool {
        self.filter_open || self.cell_editing
    }
}

/// In-memory grid used by the headless binary, benches and tests
///
/// Keeps a copy of the loaded rows and patches them by id on each update.
#[derive(Debug, Default)]
pub struct HeadlessGrid {
    rows: Vec<Row>,
    /// Number of incremental transactions applied
    pub transactions: u64,
    /// Total rows touched by incremental transactions
    pub rows_applied: u64,
    /// Ids of the most recent transaction, in order
    pub last_ids: Vec<u32>,
}

impl HeadlessGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current grid contents
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }
}

impl GridSink for HeadlessGrid {
    fn load(&mut self, rows: &[Row]) {
        self.rows = rows.to_vec();
    }

    fn apply_update(&mut self, rows: &[Row]) {
        for row in rows {
            // Ids are 1-based and dense, so the row usually sits at id - 1
            let slot = (row.id as usize)
                .checked_sub(1)
                .filter(|&i| self.rows.get(i).map(|r| r.id) == Some(row.id))
                .or_else(|| self.rows.iter().position(|r| r.id == row.id));

            match slot {
                Some(i) => self.rows[i] = row.clone(),
                None => self.rows.push(row.clone()),
            }
        }

        self.transactions += 1;
        self.rows_applied += rows.len() as u64;
        self.last_ids.clear();
        self.last_ids.extend(rows.iter().map(|r| r.id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Location, Strategy};

    fn row(id: u32, risk: u32) -> Row {
        Row::new(id, format!("Agent {}", id), Strategy::Momentum, Location::London, risk)
    }

    #[test]
    fn test_grid_state_busy() {
        assert!(!GridState::default().is_busy());
        assert!(GridState { filter_open: true, cell_editing: false }.is_busy());
        assert!(GridState { filter_open: false, cell_editing: true }.is_busy());
    }

    #[test]
    fn test_headless_grid_patches_by_id() {
        let mut grid = HeadlessGrid::new();
        grid.load(&[row(1, 10), row(2, 20), row(3, 30)]);

        grid.apply_update(&[row(2, 99)]);
        assert_eq!(grid.rows()[1].risk, 99);
        assert_eq!(grid.rows().len(), 3);
        assert_eq!(grid.transactions, 1);
        assert_eq!(grid.last_ids, vec![2]);

        // Unknown ids are appended
        grid.apply_update(&[row(9, 1)]);
        assert_eq!(grid.rows().len(), 4);
        assert_eq!(grid.rows_applied, 2);
    }
}
