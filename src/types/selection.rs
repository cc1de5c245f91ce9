//! Selection state: one or more ranges plus an active cell.

use serde::{Deserialize, Serialize};

use super::{CellCoordinate, CellRange};
use crate::config::GridLimits;

/// How the current selection was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    SingleCell,
    Range,
    MultipleRanges,
    Row,
    Column,
}

/// A selection in the grid.
///
/// Invariant: `ranges` is never empty, and `active_cell` is contained in at
/// least one range. All constructors and mutations preserve this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Selection {
    pub ranges: Vec<CellRange>,
    pub active_cell: CellCoordinate,
    pub mode: SelectionMode,
}

impl Selection {
    /// Select a single cell.
    pub fn single(coord: CellCoordinate) -> Self {
        Self {
            ranges: vec![CellRange::single(coord)],
            active_cell: coord,
            mode: SelectionMode::SingleCell,
        }
    }

    /// Select a rectangular range; the anchor stays the active cell.
    pub fn range(anchor: CellCoordinate, extent: CellCoordinate) -> Self {
        Self {
            ranges: vec![CellRange::new(anchor, extent)],
            active_cell: anchor,
            mode: SelectionMode::Range,
        }
    }

    /// Select an entire row across the configured column count.
    pub fn row(row: u32, limits: &GridLimits) -> Self {
        let start = CellCoordinate::new(row, 0);
        let end = CellCoordinate::new(row, limits.max_columns.saturating_sub(1));
        Self {
            ranges: vec![CellRange::new(start, end)],
            active_cell: start,
            mode: SelectionMode::Row,
        }
    }

    /// Select an entire column across the configured row count.
    pub fn column(col: u32, limits: &GridLimits) -> Self {
        let start = CellCoordinate::new(0, col);
        let end = CellCoordinate::new(limits.max_rows.saturating_sub(1), col);
        Self {
            ranges: vec![CellRange::new(start, end)],
            active_cell: start,
            mode: SelectionMode::Column,
        }
    }

    /// Select the whole grid.
    pub fn all(limits: &GridLimits) -> Self {
        let end = CellCoordinate::new(
            limits.max_rows.saturating_sub(1),
            limits.max_columns.saturating_sub(1),
        );
        Self {
            ranges: vec![CellRange::new(CellCoordinate::origin(), end)],
            active_cell: CellCoordinate::origin(),
            mode: SelectionMode::Range,
        }
    }

    /// Add a detached range, switching to multiple-ranges mode.
    ///
    /// The new range's anchor becomes the active cell.
    pub fn add_range(&mut self, range: CellRange) {
        self.ranges.push(range);
        self.active_cell = range.start;
        self.mode = SelectionMode::MultipleRanges;
    }

    /// Whether any range contains the coordinate.
    pub fn contains(&self, coord: CellCoordinate) -> bool {
        self.ranges.iter().any(|r| r.contains(coord))
    }

    /// Total cell count across ranges (overlaps counted once per range).
    pub fn cell_count(&self) -> u64 {
        self.ranges.iter().map(CellRange::cell_count).sum()
    }

    /// Iterate every selected coordinate, range by range.
    pub fn cells(&self) -> impl Iterator<Item = CellCoordinate> + '_ {
        self.ranges.iter().flat_map(|r| r.iter())
    }
}
