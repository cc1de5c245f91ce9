//! Viewport geometry: mapping scroll position and pane size to visible cells.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::cache::BoundedCache;
use crate::config::{GridConfig, GridLimits};
use crate::types::{CellCoordinate, CellRange};

/// Viewport size and position metrics. All values are logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViewportMetrics {
    /// Pane width in pixels.
    pub width: i64,
    /// Pane height in pixels.
    pub height: i64,
    /// Horizontal scroll offset in pixels.
    pub scroll_x: i64,
    /// Vertical scroll offset in pixels.
    pub scroll_y: i64,
    /// Cell width in pixels.
    pub cell_width: i64,
    /// Cell height in pixels.
    pub cell_height: i64,
    /// Height of the column-header strip.
    pub header_height: i64,
    /// Width of the row-header strip.
    pub row_header_width: i64,
}

impl ViewportMetrics {
    /// Metrics for a pane of the given size, using configured cell geometry.
    pub fn new(width: i64, height: i64, config: &GridConfig) -> Self {
        Self {
            width,
            height,
            scroll_x: 0,
            scroll_y: 0,
            cell_width: config.ui.default_cell_width,
            cell_height: config.ui.default_cell_height,
            header_height: config.ui.header_height,
            row_header_width: config.ui.row_header_width,
        }
    }

    /// Width available for cell content.
    pub fn content_width(&self) -> i64 {
        (self.width - self.row_header_width).max(0)
    }

    /// Height available for cell content.
    pub fn content_height(&self) -> i64 {
        (self.height - self.header_height).max(0)
    }

    fn cell_w(&self) -> i64 {
        self.cell_width.max(1)
    }

    fn cell_h(&self) -> i64 {
        self.cell_height.max(1)
    }

    /// Number of columns that can appear in the pane (+2 for partial cells).
    pub fn visible_columns(&self) -> i64 {
        self.content_width() / self.cell_w() + 2
    }

    /// Number of rows that can appear in the pane (+2 for partial cells).
    pub fn visible_rows(&self) -> i64 {
        self.content_height() / self.cell_h() + 2
    }

    /// First column intersecting the pane, clamped into `[0, max_columns)`.
    pub fn first_visible_column(&self, limits: &GridLimits) -> u32 {
        let first = (self.scroll_x / self.cell_w()).max(0);
        let max = i64::from(limits.max_columns.saturating_sub(1));
        u32::try_from(first.min(max)).unwrap_or(0)
    }

    /// First row intersecting the pane, clamped into `[0, max_rows)`.
    pub fn first_visible_row(&self, limits: &GridLimits) -> u32 {
        let first = (self.scroll_y / self.cell_h()).max(0);
        let max = i64::from(limits.max_rows.saturating_sub(1));
        u32::try_from(first.min(max)).unwrap_or(0)
    }

    /// Last column intersecting the pane, clamped into `[0, max_columns)`.
    pub fn last_visible_column(&self, limits: &GridLimits) -> u32 {
        let first = i64::from(self.first_visible_column(limits));
        let last = first + self.visible_columns() - 1;
        let max = i64::from(limits.max_columns.saturating_sub(1));
        u32::try_from(last.min(max).max(0)).unwrap_or(0)
    }

    /// Last row intersecting the pane, clamped into `[0, max_rows)`.
    pub fn last_visible_row(&self, limits: &GridLimits) -> u32 {
        let first = i64::from(self.first_visible_row(limits));
        let last = first + self.visible_rows() - 1;
        let max = i64::from(limits.max_rows.saturating_sub(1));
        u32::try_from(last.min(max).max(0)).unwrap_or(0)
    }

    /// Maximum valid scroll offsets for the configured grid, never negative.
    pub fn max_scroll(&self, limits: &GridLimits) -> (i64, i64) {
        let total_width = i64::from(limits.max_columns) * self.cell_w();
        let total_height = i64::from(limits.max_rows) * self.cell_h();
        (
            (total_width - self.content_width()).max(0),
            (total_height - self.content_height()).max(0),
        )
    }
}

/// Screen placement of one cell relative to the pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellPosition {
    pub coordinate: CellCoordinate,
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
    /// Entirely inside the pane's content area.
    pub is_visible: bool,
    /// Overlapping the pane's content area at all.
    pub is_partially_visible: bool,
}

/// Viewport diagnostics.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ViewportStats {
    pub update_count: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_hit_rate: f64,
    pub cached_positions: usize,
}

struct ViewportInner {
    metrics: ViewportMetrics,
    visible_range: Option<CellRange>,
    positions: BoundedCache<CellCoordinate, CellPosition>,
    update_count: u64,
}

impl ViewportInner {
    fn invalidate(&mut self) {
        self.visible_range = None;
        self.positions.clear();
    }

    fn compute_position(&self, coord: CellCoordinate) -> CellPosition {
        let m = &self.metrics;
        let x = i64::from(coord.col) * m.cell_width - m.scroll_x + m.row_header_width;
        let y = i64::from(coord.row) * m.cell_height - m.scroll_y + m.header_height;

        let is_visible = x >= m.row_header_width
            && y >= m.header_height
            && x + m.cell_width <= m.width
            && y + m.cell_height <= m.height;

        let is_partially_visible = x + m.cell_width > m.row_header_width
            && x < m.width
            && y + m.cell_height > m.header_height
            && y < m.height;

        CellPosition {
            coordinate: coord,
            x,
            y,
            width: m.cell_width,
            height: m.cell_height,
            is_visible,
            is_partially_visible,
        }
    }

    fn position(&mut self, coord: CellCoordinate) -> CellPosition {
        if let Some(pos) = self.positions.get(&coord) {
            return *pos;
        }
        let pos = self.compute_position(coord);
        self.positions.put(coord, pos);
        pos
    }

    fn range(&mut self, limits: &GridLimits) -> CellRange {
        if let Some(range) = self.visible_range {
            return range;
        }
        let range = CellRange::new(
            CellCoordinate::new(
                self.metrics.first_visible_row(limits),
                self.metrics.first_visible_column(limits),
            ),
            CellCoordinate::new(
                self.metrics.last_visible_row(limits),
                self.metrics.last_visible_column(limits),
            ),
        );
        self.visible_range = Some(range);
        range
    }
}

/// The visible window into the logical grid.
///
/// Pure geometry over a mutable [`ViewportMetrics`]: visible range, cell
/// placement, hit testing. All out-of-range inputs are clamped; no operation
/// here can fail.
pub struct Viewport {
    config: Arc<GridConfig>,
    inner: Mutex<ViewportInner>,
}

impl Viewport {
    /// Create a viewport over the given metrics.
    pub fn new(metrics: ViewportMetrics, config: Arc<GridConfig>) -> Self {
        let positions = BoundedCache::new(config.performance.viewport_cache_size);
        Self {
            config,
            inner: Mutex::new(ViewportInner {
                metrics,
                visible_range: None,
                positions,
                update_count: 0,
            }),
        }
    }

    /// Snapshot of the current metrics.
    pub fn metrics(&self) -> ViewportMetrics {
        self.inner.lock().metrics
    }

    /// Replace the metrics, invalidating cached geometry on any change.
    pub fn update_metrics(&self, metrics: ViewportMetrics) {
        let mut inner = self.inner.lock();
        if inner.metrics != metrics {
            inner.metrics = metrics;
            inner.invalidate();
        }
        inner.update_count += 1;
    }

    /// The range of coordinates intersecting the pane; memoized until the
    /// metrics change.
    pub fn visible_range(&self) -> CellRange {
        self.inner.lock().range(&self.config.limits)
    }

    /// Visible range padded by a prefetch buffer, re-clamped to grid bounds.
    pub fn extended_range(&self, buffer_rows: u32, buffer_cols: u32) -> CellRange {
        self.visible_range()
            .expand(buffer_rows, buffer_cols, &self.config.limits)
    }

    /// Screen placement of a cell. O(1) amortized via a bounded cache.
    pub fn cell_position(&self, coord: CellCoordinate) -> CellPosition {
        self.inner.lock().position(coord)
    }

    /// Placements for every at-least-partially-visible cell in the visible
    /// range. Partial cells are included so edge cells still paint.
    pub fn visible_cells(&self) -> Vec<CellPosition> {
        let mut inner = self.inner.lock();
        let range = inner.range(&self.config.limits);
        let mut positions = Vec::with_capacity(range.cell_count().min(4096) as usize);
        for coord in range.iter() {
            let pos = inner.position(coord);
            if pos.is_partially_visible {
                positions.push(pos);
            }
        }
        positions
    }

    /// Whether any part of the cell is inside the pane.
    pub fn is_cell_visible(&self, coord: CellCoordinate) -> bool {
        self.cell_position(coord).is_partially_visible
    }

    /// Scroll so the cell is centered (as far as clamping allows) and return
    /// the updated metrics.
    pub fn scroll_to_cell(&self, coord: CellCoordinate) -> ViewportMetrics {
        let coord = coord.clamped(&self.config.limits);
        let mut inner = self.inner.lock();
        let m = inner.metrics;

        let target_x = i64::from(coord.col) * m.cell_width;
        let target_y = i64::from(coord.row) * m.cell_height;
        let center_x = target_x - m.content_width() / 2;
        let center_y = target_y - m.content_height() / 2;

        let (max_x, max_y) = m.max_scroll(&self.config.limits);
        let metrics = ViewportMetrics {
            scroll_x: center_x.clamp(0, max_x),
            scroll_y: center_y.clamp(0, max_y),
            ..m
        };

        if inner.metrics != metrics {
            inner.metrics = metrics;
            inner.invalidate();
        }
        inner.update_count += 1;
        metrics
    }

    /// Inverse hit test: the cell under a pane-relative point, or `None` when
    /// the point falls in a header region or beyond the grid bounds.
    pub fn cell_at_point(&self, x: i64, y: i64) -> Option<CellCoordinate> {
        let m = self.metrics();
        let content_x = x - m.row_header_width;
        let content_y = y - m.header_height;
        if content_x < 0 || content_y < 0 {
            return None;
        }

        let col = (content_x + m.scroll_x) / m.cell_width.max(1);
        let row = (content_y + m.scroll_y) / m.cell_height.max(1);
        if col >= i64::from(self.config.limits.max_columns)
            || row >= i64::from(self.config.limits.max_rows)
        {
            return None;
        }

        Some(CellCoordinate::new(
            u32::try_from(row).ok()?,
            u32::try_from(col).ok()?,
        ))
    }

    /// Maximum valid scroll offsets for the current metrics.
    pub fn max_scroll(&self) -> (i64, i64) {
        self.metrics().max_scroll(&self.config.limits)
    }

    /// Diagnostics counters.
    pub fn stats(&self) -> ViewportStats {
        let inner = self.inner.lock();
        ViewportStats {
            update_count: inner.update_count,
            cache_hits: inner.positions.hits(),
            cache_misses: inner.positions.misses(),
            cache_hit_rate: inner.positions.hit_rate(),
            cached_positions: inner.positions.len(),
        }
    }
}
