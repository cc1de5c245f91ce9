//! Multi-pane coordination for frozen rows and columns.
//!
//! The manager owns the main viewport plus up to three auxiliary viewports
//! when freeze panes are enabled: "top" spans the frozen rows across the
//! full width, "left" spans the frozen columns across the full height, and
//! "corner" spans both. Auxiliary viewports are rebuilt from the main
//! viewport's metrics whenever scroll, size, or freeze settings change.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use super::{CellPosition, Viewport, ViewportMetrics, ViewportStats};
use crate::config::GridConfig;
use crate::types::CellCoordinate;

/// Identifies one pane of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Pane {
    Main,
    Top,
    Left,
    Corner,
}

impl Pane {
    pub fn as_str(self) -> &'static str {
        match self {
            Pane::Main => "main",
            Pane::Top => "top",
            Pane::Left => "left",
            Pane::Corner => "corner",
        }
    }
}

impl fmt::Display for Pane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Manager diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct ViewportManagerStats {
    pub freeze_enabled: bool,
    pub freeze_rows: u32,
    pub freeze_columns: u32,
    pub viewport_count: usize,
    pub main: ViewportStats,
}

struct ManagerInner {
    freeze_rows: u32,
    freeze_columns: u32,
    enabled: bool,
    /// Auxiliary viewports in paint order: top, left, corner.
    frozen: Vec<(Pane, Viewport)>,
}

/// Routes coordinates to panes and aggregates visible-cell queries.
pub struct ViewportManager {
    config: Arc<GridConfig>,
    main: Arc<Viewport>,
    inner: Mutex<ManagerInner>,
}

impl ViewportManager {
    /// Create a manager around an existing main viewport.
    pub fn new(main: Arc<Viewport>, config: Arc<GridConfig>) -> Self {
        Self {
            config,
            main,
            inner: Mutex::new(ManagerInner {
                freeze_rows: 0,
                freeze_columns: 0,
                enabled: false,
                frozen: Vec::new(),
            }),
        }
    }

    /// The main (scrollable) viewport.
    pub fn main_viewport(&self) -> &Arc<Viewport> {
        &self.main
    }

    /// Enable freeze panes and rebuild the auxiliary viewports.
    ///
    /// `rows == 0 && cols == 0` is equivalent to disabling.
    pub fn enable_freeze_panes(&self, rows: u32, cols: u32) {
        if rows == 0 && cols == 0 {
            self.disable_freeze_panes();
            return;
        }
        let metrics = self.main.metrics();
        let mut inner = self.inner.lock();
        inner.freeze_rows = rows;
        inner.freeze_columns = cols;
        inner.enabled = true;
        self.rebuild_frozen(&mut inner, metrics);
    }

    /// Disable freeze panes and drop the auxiliary viewports.
    pub fn disable_freeze_panes(&self) {
        let mut inner = self.inner.lock();
        inner.enabled = false;
        inner.freeze_rows = 0;
        inner.freeze_columns = 0;
        inner.frozen.clear();
    }

    /// Current (rows, cols) freeze counts.
    pub fn freeze_counts(&self) -> (u32, u32) {
        let inner = self.inner.lock();
        (inner.freeze_rows, inner.freeze_columns)
    }

    /// Whether freeze panes are active.
    pub fn is_freeze_enabled(&self) -> bool {
        self.inner.lock().enabled
    }

    /// Which pane a coordinate scrolls and renders in.
    pub fn pane_for_cell(&self, coord: CellCoordinate) -> Pane {
        let inner = self.inner.lock();
        if !inner.enabled {
            return Pane::Main;
        }
        let in_frozen_rows = coord.row < inner.freeze_rows;
        let in_frozen_cols = coord.col < inner.freeze_columns;
        match (in_frozen_rows, in_frozen_cols) {
            (true, true) => Pane::Corner,
            (true, false) => Pane::Top,
            (false, true) => Pane::Left,
            (false, false) => Pane::Main,
        }
    }

    /// Names of the currently active panes, main first.
    pub fn pane_names(&self) -> Vec<Pane> {
        let inner = self.inner.lock();
        let mut names = vec![Pane::Main];
        names.extend(inner.frozen.iter().map(|(pane, _)| *pane));
        names
    }

    /// Visible cell placements per pane, main pane first.
    pub fn all_visible_cells(&self) -> Vec<(Pane, Vec<CellPosition>)> {
        let main_cells = self.main.visible_cells();
        let inner = self.inner.lock();
        let mut result = Vec::with_capacity(1 + inner.frozen.len());
        result.push((Pane::Main, main_cells));
        for (pane, viewport) in &inner.frozen {
            result.push((*pane, viewport.visible_cells()));
        }
        result
    }

    /// Propagate a new scroll offset to the main viewport and rebuild the
    /// auxiliary viewports.
    pub fn update_scroll(&self, scroll_x: i64, scroll_y: i64) {
        let metrics = ViewportMetrics {
            scroll_x,
            scroll_y,
            ..self.main.metrics()
        };
        self.main.update_metrics(metrics);

        let mut inner = self.inner.lock();
        if inner.enabled {
            self.rebuild_frozen(&mut inner, metrics);
        }
    }

    /// Propagate a pane resize to the main viewport and rebuild auxiliaries.
    pub fn resize(&self, width: i64, height: i64) {
        let metrics = ViewportMetrics {
            width,
            height,
            ..self.main.metrics()
        };
        self.main.update_metrics(metrics);

        let mut inner = self.inner.lock();
        if inner.enabled {
            self.rebuild_frozen(&mut inner, metrics);
        }
    }

    /// Rebuild the auxiliary viewports from the main viewport's metrics.
    ///
    /// The top pane follows horizontal scroll with vertical pinned to 0; the
    /// left pane follows vertical scroll with horizontal pinned to 0; the
    /// corner pane pins both.
    fn rebuild_frozen(&self, inner: &mut ManagerInner, main: ViewportMetrics) {
        inner.frozen.clear();

        let frozen_height =
            i64::from(inner.freeze_rows) * main.cell_height + main.header_height;
        let frozen_width =
            i64::from(inner.freeze_columns) * main.cell_width + main.row_header_width;

        if inner.freeze_rows > 0 {
            let metrics = ViewportMetrics {
                height: frozen_height,
                scroll_y: 0,
                ..main
            };
            inner
                .frozen
                .push((Pane::Top, Viewport::new(metrics, Arc::clone(&self.config))));
        }

        if inner.freeze_columns > 0 {
            let metrics = ViewportMetrics {
                width: frozen_width,
                scroll_x: 0,
                ..main
            };
            inner
                .frozen
                .push((Pane::Left, Viewport::new(metrics, Arc::clone(&self.config))));
        }

        if inner.freeze_rows > 0 && inner.freeze_columns > 0 {
            let metrics = ViewportMetrics {
                width: frozen_width,
                height: frozen_height,
                scroll_x: 0,
                scroll_y: 0,
                ..main
            };
            inner.frozen.push((
                Pane::Corner,
                Viewport::new(metrics, Arc::clone(&self.config)),
            ));
        }
    }

    /// Diagnostics for all panes.
    pub fn stats(&self) -> ViewportManagerStats {
        let inner = self.inner.lock();
        ViewportManagerStats {
            freeze_enabled: inner.enabled,
            freeze_rows: inner.freeze_rows,
            freeze_columns: inner.freeze_columns,
            viewport_count: 1 + inner.frozen.len(),
            main: self.main.stats(),
        }
    }
}
