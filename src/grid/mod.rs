//! The grid widget: selection and edit state machines, command dispatch, and
//! the full render pass.
//!
//! A `GridWidget` composes a viewport, viewport manager, virtual scroller,
//! and cell renderer over one sheet of the external data model. Keyboard and
//! mouse commands mutate its state machines; `render()` pulls everything
//! together into a [`GridFrame`] of draw instructions.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::cell_ref::col_to_letters;
use crate::config::GridConfig;
use crate::events::{CellChangeEvent, CellChangeListener, GridEvent, GridEventSink};
use crate::layout::{Pane, Viewport, ViewportManager, ViewportMetrics};
use crate::render::{
    CellDrawing, CellRenderData, CellRenderer, DrawInstruction, Rect, RendererStats,
    RenderingContext,
};
use crate::scroll::{FrameTicker, ScrollEvent, ScrollMode, VirtualScroller};
use crate::types::{CellCoordinate, CellRange, LinePattern, Selection, SelectionMode, Sheet};

/// Keyboard modifier state accompanying a key or mouse command.
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
    };
    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
        alt: false,
    };
    pub const CTRL: Modifiers = Modifiers {
        shift: false,
        ctrl: true,
        alt: false,
    };
}

/// Mouse buttons understood by the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Edit-mode state machine tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditMode {
    View,
    Edit,
    FormulaBar,
}

/// The widget's persistent interaction state.
#[derive(Debug, Clone)]
pub struct GridState {
    pub selection: Selection,
    /// The moving corner of a shift-extended selection (the anchor stays the
    /// active cell). `None` outside an extension gesture.
    pub selection_lead: Option<CellCoordinate>,
    pub edit_mode: EditMode,
    /// Present only while `edit_mode == Edit`.
    pub editing_cell: Option<CellCoordinate>,
    pub show_formulas: bool,
    pub show_gridlines: bool,
    pub zoom_level: f32,
    pub freeze_rows: u32,
    pub freeze_columns: u32,
}

/// Column or row header label with its placement.
#[derive(Debug, Clone, Serialize)]
pub struct HeaderLabel {
    pub index: u32,
    pub text: String,
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

/// Header labels for the visible range.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GridHeaders {
    pub columns: Vec<HeaderLabel>,
    pub rows: Vec<HeaderLabel>,
}

/// Rendered cells of one pane.
#[derive(Debug, Clone, Serialize)]
pub struct PaneDrawing {
    pub pane: Pane,
    pub cells: Vec<Arc<CellDrawing>>,
}

/// The output of one full render pass.
#[derive(Debug, Clone, Serialize)]
pub struct GridFrame {
    /// Per-pane cell drawings, main pane first.
    pub panes: Vec<PaneDrawing>,
    pub headers: GridHeaders,
    /// Selection overlays intersected with the visible range.
    pub selections: Vec<DrawInstruction>,
    /// Outline around the cell currently being edited, when visible.
    pub editing_indicator: Option<DrawInstruction>,
    /// Total cells rendered across panes.
    pub cell_count: usize,
}

/// Widget diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct GridStats {
    pub render_count: u64,
    pub interaction_count: u64,
    pub selection_mode: SelectionMode,
    pub edit_mode: EditMode,
    pub zoom_level: f32,
    pub freeze_rows: u32,
    pub freeze_columns: u32,
    pub viewports: crate::layout::ViewportManagerStats,
    pub scroller: crate::scroll::ScrollerStats,
    pub renderer: RendererStats,
}

/// Top-level coordinator for one sheet's grid display.
pub struct GridWidget {
    sheet: Arc<dyn Sheet>,
    config: Arc<GridConfig>,
    viewport: Arc<Viewport>,
    viewport_manager: Arc<ViewportManager>,
    scroller: Arc<VirtualScroller>,
    renderer: CellRenderer,
    state: Mutex<GridState>,
    context: Mutex<RenderingContext>,
    event_sink: Mutex<Option<GridEventSink>>,
    render_count: AtomicU64,
    interaction_count: AtomicU64,
    _ticker: FrameTicker,
}

impl GridWidget {
    /// Create a widget over one sheet with the given pane size.
    ///
    /// The frame ticker starts immediately and stops when the widget drops.
    pub fn new(sheet: Arc<dyn Sheet>, config: Arc<GridConfig>, width: i64, height: i64) -> Self {
        let metrics = ViewportMetrics::new(width, height, &config);
        let viewport = Arc::new(Viewport::new(metrics, Arc::clone(&config)));
        let viewport_manager = Arc::new(ViewportManager::new(
            Arc::clone(&viewport),
            Arc::clone(&config),
        ));
        let scroller = Arc::new(VirtualScroller::new(
            Arc::clone(&viewport),
            Arc::clone(&config),
        ));

        // Scroll updates flow one way: scroller -> manager (pane rebuild)
        let manager_for_scroll = Arc::clone(&viewport_manager);
        scroller.set_on_scroll(move |x, y| manager_for_scroll.update_scroll(x, y));

        let ticker = FrameTicker::start(Arc::clone(&scroller), config.ui.target_fps);
        let renderer = CellRenderer::new(&config);

        Self {
            sheet,
            config,
            viewport,
            viewport_manager,
            scroller,
            renderer,
            state: Mutex::new(GridState {
                selection: Selection::single(CellCoordinate::origin()),
                selection_lead: None,
                edit_mode: EditMode::View,
                editing_cell: None,
                show_formulas: false,
                show_gridlines: true,
                zoom_level: 1.0,
                freeze_rows: 0,
                freeze_columns: 0,
            }),
            context: Mutex::new(RenderingContext::default()),
            event_sink: Mutex::new(None),
            render_count: AtomicU64::new(0),
            interaction_count: AtomicU64::new(0),
            _ticker: ticker,
        }
    }

    /// Register the sink receiving this widget's events.
    pub fn set_event_sink(&self, sink: GridEventSink) {
        *self.event_sink.lock() = Some(sink);
    }

    /// Snapshot of the interaction state.
    pub fn state(&self) -> GridState {
        self.state.lock().clone()
    }

    /// Snapshot of the current selection.
    pub fn selection(&self) -> Selection {
        self.state.lock().selection.clone()
    }

    /// Snapshot of the rendering context.
    pub fn rendering_context(&self) -> RenderingContext {
        self.context.lock().clone()
    }

    /// Mutate the rendering context (theme propagation) and drop the render
    /// cache so visuals can never reflect stale colors.
    pub fn update_rendering_context(&self, update: impl FnOnce(&mut RenderingContext)) {
        update(&mut self.context.lock());
        self.renderer.clear_cache();
    }

    /// The main viewport.
    pub fn viewport(&self) -> &Arc<Viewport> {
        &self.viewport
    }

    /// The viewport manager (freeze panes).
    pub fn viewport_manager(&self) -> &Arc<ViewportManager> {
        &self.viewport_manager
    }

    /// The virtual scroller.
    pub fn scroller(&self) -> &Arc<VirtualScroller> {
        &self.scroller
    }

    /// The cell renderer.
    pub fn cell_renderer(&self) -> &CellRenderer {
        &self.renderer
    }

    // ------------------------------------------------------------------
    // Geometry commands
    // ------------------------------------------------------------------

    /// Resize the widget's pane.
    pub fn resize(&self, width: i64, height: i64) {
        self.viewport_manager.resize(width, height);
    }

    /// Set the zoom factor (clamped to `[0.25, 4.0]`), recomputing cell pixel
    /// sizes and the render scale factor.
    pub fn set_zoom(&self, zoom: f32) {
        let zoom = GridConfig::clamp_zoom(zoom);
        self.state.lock().zoom_level = zoom;

        let cell_width = ((self.config.ui.default_cell_width as f32 * zoom).round() as i64).max(1);
        let cell_height =
            ((self.config.ui.default_cell_height as f32 * zoom).round() as i64).max(1);
        let metrics = ViewportMetrics {
            cell_width,
            cell_height,
            ..self.viewport.metrics()
        };
        self.viewport.update_metrics(metrics);
        self.viewport_manager
            .update_scroll(metrics.scroll_x, metrics.scroll_y);

        self.context.lock().scale_factor = zoom;
    }

    /// Current zoom factor.
    pub fn zoom(&self) -> f32 {
        self.state.lock().zoom_level
    }

    /// Freeze the leading rows/columns; zero both to unfreeze.
    pub fn set_freeze_panes(&self, rows: u32, cols: u32) {
        {
            let mut state = self.state.lock();
            state.freeze_rows = rows;
            state.freeze_columns = cols;
        }
        if rows > 0 || cols > 0 {
            self.viewport_manager.enable_freeze_panes(rows, cols);
        } else {
            self.viewport_manager.disable_freeze_panes();
        }
    }

    /// Scroll so the cell is visible (centered).
    pub fn scroll_to_cell(&self, coord: CellCoordinate, mode: ScrollMode) {
        self.scroller.scroll_to_cell(coord.row, coord.col, mode);
    }

    // ------------------------------------------------------------------
    // Selection state machine
    // ------------------------------------------------------------------

    /// Select a single cell, or extend the current selection to it.
    ///
    /// Extending from single-cell mode anchors at the active cell; extending
    /// in range mode keeps the range's existing anchor.
    pub fn select_cell(&self, coord: CellCoordinate, extend: bool) {
        let coord = coord.clamped(&self.config.limits);
        self.interaction_count.fetch_add(1, Ordering::Relaxed);

        let events = {
            let mut state = self.state.lock();
            if extend {
                let anchor = state.selection.active_cell;
                state.selection = Selection::range(anchor, coord);
                state.selection_lead = Some(coord);
            } else {
                state.selection = Selection::single(coord);
                state.selection_lead = None;
            }
            vec![
                GridEvent::CellSelected(coord),
                GridEvent::SelectionChanged(state.selection.clone()),
            ]
        };

        if !self.viewport.is_cell_visible(coord) {
            self.scroller
                .scroll_to_cell(coord.row, coord.col, ScrollMode::Smooth);
        }
        self.emit_all(&events);
    }

    /// Select a rectangular range; the start corner becomes the active cell.
    pub fn select_range(&self, start: CellCoordinate, end: CellCoordinate) {
        let start = start.clamped(&self.config.limits);
        let end = end.clamped(&self.config.limits);
        self.interaction_count.fetch_add(1, Ordering::Relaxed);

        let events = {
            let mut state = self.state.lock();
            state.selection = Selection::range(start, end);
            state.selection_lead = Some(end);
            vec![GridEvent::SelectionChanged(state.selection.clone())]
        };

        if !self.viewport.is_cell_visible(start) {
            self.scroller
                .scroll_to_cell(start.row, start.col, ScrollMode::Smooth);
        }
        self.emit_all(&events);
    }

    /// Select an entire row.
    pub fn select_row(&self, row: u32) {
        let row = row.min(self.config.limits.max_rows.saturating_sub(1));
        let events = {
            let mut state = self.state.lock();
            state.selection = Selection::row(row, &self.config.limits);
            state.selection_lead = None;
            vec![GridEvent::SelectionChanged(state.selection.clone())]
        };
        self.emit_all(&events);
    }

    /// Select an entire column.
    pub fn select_column(&self, col: u32) {
        let col = col.min(self.config.limits.max_columns.saturating_sub(1));
        let events = {
            let mut state = self.state.lock();
            state.selection = Selection::column(col, &self.config.limits);
            state.selection_lead = None;
            vec![GridEvent::SelectionChanged(state.selection.clone())]
        };
        self.emit_all(&events);
    }

    /// Select the whole grid.
    pub fn select_all(&self) {
        let events = {
            let mut state = self.state.lock();
            state.selection = Selection::all(&self.config.limits);
            state.selection_lead = None;
            vec![GridEvent::SelectionChanged(state.selection.clone())]
        };
        self.emit_all(&events);
    }

    /// Add a detached single-cell range (Ctrl+click).
    pub fn add_to_selection(&self, coord: CellCoordinate) {
        let coord = coord.clamped(&self.config.limits);
        let events = {
            let mut state = self.state.lock();
            state.selection.add_range(CellRange::single(coord));
            state.selection_lead = None;
            vec![
                GridEvent::CellSelected(coord),
                GridEvent::SelectionChanged(state.selection.clone()),
            ]
        };
        self.emit_all(&events);
    }

    // ------------------------------------------------------------------
    // Edit state machine
    // ------------------------------------------------------------------

    /// Enter edit mode on a cell (the active cell by default).
    pub fn start_edit(&self, coord: Option<CellCoordinate>) {
        let target = coord.unwrap_or_else(|| self.state.lock().selection.active_cell);
        self.select_cell(target, false);

        let mut state = self.state.lock();
        state.edit_mode = EditMode::Edit;
        state.editing_cell = Some(target);
    }

    /// Leave edit mode. A save with a non-empty value emits `CellEdited`;
    /// anything else is a silent no-op transition back to view mode.
    pub fn end_edit(&self, save: bool, value: &str) {
        let committed = {
            let mut state = self.state.lock();
            if state.edit_mode != EditMode::Edit {
                return;
            }
            let cell = state.editing_cell.take();
            state.edit_mode = EditMode::View;
            cell.filter(|_| save && !value.is_empty())
        };

        if let Some(coordinate) = committed {
            self.emit(&GridEvent::CellEdited {
                coordinate,
                value: value.to_string(),
            });
        }
    }

    /// Current edit mode.
    pub fn edit_mode(&self) -> EditMode {
        self.state.lock().edit_mode
    }

    // ------------------------------------------------------------------
    // Command handling
    // ------------------------------------------------------------------

    /// Handle a keyboard command. Returns whether the key was consumed.
    pub fn handle_key_press(&self, key: &str, modifiers: Modifiers) -> bool {
        let (active, lead) = {
            let state = self.state.lock();
            (state.selection.active_cell, state.selection_lead)
        };
        // Shift-extension moves the lead corner; the anchor stays put
        let base = if modifiers.shift {
            lead.unwrap_or(active)
        } else {
            active
        };
        let limits = &self.config.limits;

        match key {
            "ArrowUp" => {
                self.select_cell(base.offset(-1, 0), modifiers.shift);
                true
            }
            "ArrowDown" => {
                self.select_cell(base.offset(1, 0).clamped(limits), modifiers.shift);
                true
            }
            "ArrowLeft" => {
                self.select_cell(base.offset(0, -1), modifiers.shift);
                true
            }
            "ArrowRight" => {
                self.select_cell(base.offset(0, 1).clamped(limits), modifiers.shift);
                true
            }
            "PageUp" => {
                self.scroller.page_up();
                true
            }
            "PageDown" => {
                self.scroller.page_down();
                true
            }
            "Home" => {
                if modifiers.ctrl {
                    self.select_cell(CellCoordinate::origin(), false);
                } else {
                    self.select_cell(CellCoordinate::new(active.row, 0), false);
                }
                true
            }
            "End" => {
                let last_used = self
                    .sheet
                    .last_used_cell()
                    .unwrap_or_else(CellCoordinate::origin);
                if modifiers.ctrl {
                    self.select_cell(last_used, false);
                } else {
                    self.select_cell(CellCoordinate::new(active.row, last_used.col), false);
                }
                true
            }
            "F2" => {
                self.start_edit(None);
                true
            }
            "Enter" => {
                if self.edit_mode() == EditMode::Edit {
                    self.end_edit(true, "");
                } else {
                    self.select_cell(active.offset(1, 0).clamped(limits), false);
                }
                true
            }
            "Escape" => {
                if self.edit_mode() == EditMode::Edit {
                    self.end_edit(false, "");
                }
                true
            }
            "Delete" => {
                self.clear_selected_cells();
                true
            }
            "F9" if modifiers.ctrl => {
                self.toggle_formulas();
                true
            }
            _ => false,
        }
    }

    /// Emit one clearing edit per selected cell.
    fn clear_selected_cells(&self) {
        let ranges = self.state.lock().selection.ranges.clone();
        for range in &ranges {
            for coordinate in range.iter() {
                self.emit(&GridEvent::CellEdited {
                    coordinate,
                    value: String::new(),
                });
            }
        }
    }

    /// Handle a mouse click at pane-relative coordinates. Returns whether the
    /// click resolved to a cell.
    pub fn handle_mouse_click(
        &self,
        x: i64,
        y: i64,
        button: MouseButton,
        modifiers: Modifiers,
    ) -> bool {
        let Some(coord) = self.viewport.cell_at_point(x, y) else {
            return false;
        };

        match button {
            MouseButton::Left => {
                if modifiers.shift {
                    let anchor = self.state.lock().selection.active_cell;
                    self.select_range(anchor, coord);
                } else if modifiers.ctrl {
                    self.add_to_selection(coord);
                } else {
                    self.select_cell(coord, false);
                }
                true
            }
            // Context menus are the application's concern
            MouseButton::Right => true,
            MouseButton::Middle => false,
        }
    }

    /// Forward scroll input to the virtual scroller.
    pub fn handle_scroll(&self, delta_x: f32, delta_y: f32, is_wheel: bool) {
        self.scroller.handle_scroll(ScrollEvent {
            delta_x,
            delta_y,
            is_wheel,
        });
    }

    /// Toggle formula display, invalidating the render cache.
    pub fn toggle_formulas(&self) {
        let show = {
            let mut state = self.state.lock();
            state.show_formulas = !state.show_formulas;
            state.show_formulas
        };
        self.context.lock().show_formulas = show;
        self.renderer.clear_cache();
    }

    /// Toggle gridlines, invalidating the render cache.
    pub fn toggle_gridlines(&self) {
        let show = {
            let mut state = self.state.lock();
            state.show_gridlines = !state.show_gridlines;
            state.show_gridlines
        };
        self.context.lock().show_gridlines = show;
        self.renderer.clear_cache();
    }

    // ------------------------------------------------------------------
    // Render pass
    // ------------------------------------------------------------------

    /// Run a full render pass over every pane.
    pub fn render(&self) -> GridFrame {
        self.render_count.fetch_add(1, Ordering::Relaxed);

        let (selection, editing_cell, show_formulas) = {
            let state = self.state.lock();
            let editing = if state.edit_mode == EditMode::Edit {
                state.editing_cell
            } else {
                None
            };
            (state.selection.clone(), editing, state.show_formulas)
        };
        let context = self.context.lock().clone();

        let mut panes = Vec::new();
        let mut cell_count = 0;
        for (pane, positions) in self.viewport_manager.all_visible_cells() {
            let data: Vec<CellRenderData> = positions
                .iter()
                .map(|pos| {
                    self.cell_render_data(
                        pos.coordinate,
                        pos.x,
                        pos.y,
                        pos.width,
                        pos.height,
                        &selection,
                        editing_cell,
                        show_formulas,
                    )
                })
                .collect();
            let cells = self.renderer.render_batch(&data, &context);
            cell_count += cells.len();
            panes.push(PaneDrawing { pane, cells });
        }

        GridFrame {
            panes,
            headers: self.render_headers(),
            selections: self.render_selection_overlays(&selection, &context),
            editing_indicator: editing_cell.and_then(|c| self.render_editing_indicator(c)),
            cell_count,
        }
    }

    /// Build one cell's render snapshot from the data model and grid state.
    #[allow(clippy::too_many_arguments)]
    fn cell_render_data(
        &self,
        coordinate: CellCoordinate,
        x: i64,
        y: i64,
        width: i64,
        height: i64,
        selection: &Selection,
        editing_cell: Option<CellCoordinate>,
        show_formulas: bool,
    ) -> CellRenderData {
        let cell = self.sheet.get_cell(coordinate).unwrap_or_default();

        let display_text = if cell.is_empty() {
            String::new()
        } else if show_formulas {
            cell.formula
                .clone()
                .unwrap_or_else(|| cell.value.display_text())
        } else {
            cell.value.display_text()
        };
        let is_error = cell.value.is_error();

        CellRenderData {
            coordinate,
            value: cell.value,
            display_text,
            format: cell.format,
            is_selected: selection.contains(coordinate),
            is_editing: editing_cell == Some(coordinate),
            is_error,
            x,
            y,
            width,
            height,
        }
    }

    /// Column letters and row numbers for the visible range.
    fn render_headers(&self) -> GridHeaders {
        let range = self.viewport.visible_range();
        let m = self.viewport.metrics();
        let mut headers = GridHeaders::default();

        for col in range.start.col..=range.end.col {
            let x = i64::from(col) * m.cell_width - m.scroll_x + m.row_header_width;
            if x >= m.row_header_width && x < m.width {
                headers.columns.push(HeaderLabel {
                    index: col,
                    text: col_to_letters(col),
                    x,
                    y: 0,
                    width: m.cell_width,
                    height: m.header_height,
                });
            }
        }

        for row in range.start.row..=range.end.row {
            let y = i64::from(row) * m.cell_height - m.scroll_y + m.header_height;
            if y >= m.header_height && y < m.height {
                headers.rows.push(HeaderLabel {
                    index: row,
                    text: (row + 1).to_string(),
                    x: 0,
                    y,
                    width: m.row_header_width,
                    height: m.cell_height,
                });
            }
        }

        headers
    }

    /// Translucent overlays for the visible parts of each selected range.
    fn render_selection_overlays(
        &self,
        selection: &Selection,
        context: &RenderingContext,
    ) -> Vec<DrawInstruction> {
        let visible = self.viewport.visible_range();
        let m = self.viewport.metrics();

        selection
            .ranges
            .iter()
            .filter_map(|range| range.intersection(&visible))
            .map(|clipped| {
                let x = i64::from(clipped.start.col) * m.cell_width - m.scroll_x
                    + m.row_header_width;
                let y =
                    i64::from(clipped.start.row) * m.cell_height - m.scroll_y + m.header_height;
                DrawInstruction::Rect {
                    bounds: Rect {
                        x,
                        y,
                        width: i64::from(clipped.col_count()) * m.cell_width,
                        height: i64::from(clipped.row_count()) * m.cell_height,
                    },
                    color: context.selection_color.clone(),
                    alpha: 0.3,
                }
            })
            .collect()
    }

    /// Dashed outline around the editing cell, when fully visible.
    fn render_editing_indicator(&self, cell: CellCoordinate) -> Option<DrawInstruction> {
        let pos = self.viewport.cell_position(cell);
        if !pos.is_visible {
            return None;
        }
        Some(DrawInstruction::Outline {
            bounds: Rect {
                x: pos.x,
                y: pos.y,
                width: pos.width,
                height: pos.height,
            },
            color: "#00FF00".to_string(),
            width: 2,
            pattern: LinePattern::Dashed,
        })
    }

    /// Diagnostics counters across all components.
    pub fn stats(&self) -> GridStats {
        let state = self.state.lock();
        GridStats {
            render_count: self.render_count.load(Ordering::Relaxed),
            interaction_count: self.interaction_count.load(Ordering::Relaxed),
            selection_mode: state.selection.mode,
            edit_mode: state.edit_mode,
            zoom_level: state.zoom_level,
            freeze_rows: state.freeze_rows,
            freeze_columns: state.freeze_columns,
            viewports: self.viewport_manager.stats(),
            scroller: self.scroller.stats(),
            renderer: self.renderer.stats(),
        }
    }

    fn emit(&self, event: &GridEvent) {
        if let Some(sink) = self.event_sink.lock().as_ref() {
            sink(event);
        }
    }

    fn emit_all(&self, events: &[GridEvent]) {
        for event in events {
            self.emit(event);
        }
    }
}

impl CellChangeListener for GridWidget {
    /// Any external cell change invalidates cached draw instructions.
    fn cell_changed(&self, _event: &CellChangeEvent) {
        self.renderer.clear_cache();
    }
}
