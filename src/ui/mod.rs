//! UI manager: one grid widget per sheet, themes, and global shortcuts.
//!
//! The manager owns its widgets outright; widgets emit typed events upward
//! and never hold a reference back. Application-level commands (undo, copy,
//! save, ...) are injected as hooks and dispatched before the active grid
//! sees the key.

use std::sync::Arc;

use log::{debug, warn};
use parking_lot::Mutex;
use serde::Serialize;

use crate::config::GridConfig;
use crate::error::{GridViewError, Result};
use crate::events::GridEvent;
use crate::grid::{GridFrame, GridStats, GridWidget, Modifiers, MouseButton};
use crate::types::{CellCoordinate, Selection, Workbook};

/// Built-in UI themes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Light,
    Dark,
    HighContrast,
}

/// The colors a theme applies to every rendering context.
#[derive(Debug, Clone)]
pub struct ThemeColors {
    pub text: &'static str,
    pub background: &'static str,
    pub grid: &'static str,
    pub selection: &'static str,
}

impl Theme {
    /// Color set for this theme.
    pub fn colors(self) -> ThemeColors {
        match self {
            Theme::Light => ThemeColors {
                text: "#000000",
                background: "#FFFFFF",
                grid: "#E0E0E0",
                selection: "#4A90E2",
            },
            Theme::Dark => ThemeColors {
                text: "#FFFFFF",
                background: "#2D2D2D",
                grid: "#404040",
                selection: "#0078D4",
            },
            Theme::HighContrast => ThemeColors {
                text: "#FFFFFF",
                background: "#000000",
                grid: "#FFFFFF",
                selection: "#FFFF00",
            },
        }
    }
}

type CommandHook = Box<dyn Fn() -> bool + Send + Sync>;

/// Injected application commands, dispatched from global shortcuts.
///
/// A missing hook leaves its shortcut unhandled.
#[derive(Default)]
pub struct CommandHooks {
    pub undo: Option<CommandHook>,
    pub redo: Option<CommandHook>,
    pub copy: Option<CommandHook>,
    pub paste: Option<CommandHook>,
    pub cut: Option<CommandHook>,
    pub find: Option<CommandHook>,
    pub replace: Option<CommandHook>,
    pub save: Option<CommandHook>,
    pub open_file: Option<CommandHook>,
    pub new_file: Option<CommandHook>,
}

/// Outbound callbacks, keyed by sheet name where relevant.
#[derive(Default)]
pub struct UiCallbacks {
    pub on_cell_selected: Option<Box<dyn Fn(&str, CellCoordinate) + Send + Sync>>,
    pub on_cell_edited: Option<Box<dyn Fn(&str, CellCoordinate, &str) + Send + Sync>>,
    pub on_selection_changed: Option<Box<dyn Fn(&str, &Selection) + Send + Sync>>,
    pub on_sheet_changed: Option<Box<dyn Fn(&str) + Send + Sync>>,
    pub on_zoom_changed: Option<Box<dyn Fn(f32) + Send + Sync>>,
}

/// Manager diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct UiStats {
    pub sheet_count: usize,
    pub active_sheet: Option<String>,
    pub zoom_level: f32,
    pub window_width: i64,
    pub window_height: i64,
    pub theme: Theme,
    pub target_fps: u32,
    pub active_grid: Option<GridStats>,
}

struct UiState {
    active_sheet: Option<String>,
    window_width: i64,
    window_height: i64,
    zoom_level: f32,
    theme: Theme,
}

/// Coordinates grid widgets across sheets with shared theme and zoom.
pub struct UIManager {
    workbook: Arc<dyn Workbook>,
    config: Arc<GridConfig>,
    grids: Vec<(String, Arc<GridWidget>)>,
    state: Mutex<UiState>,
    hooks: Mutex<CommandHooks>,
    callbacks: Arc<Mutex<UiCallbacks>>,
}

impl UIManager {
    /// Create a manager with one grid widget per workbook sheet.
    ///
    /// The first sheet becomes active. Sheets the workbook names but cannot
    /// produce are skipped with a warning.
    pub fn new(
        workbook: Arc<dyn Workbook>,
        config: Arc<GridConfig>,
        window_width: i64,
        window_height: i64,
    ) -> Self {
        let callbacks: Arc<Mutex<UiCallbacks>> = Arc::new(Mutex::new(UiCallbacks::default()));

        let mut grids = Vec::new();
        for name in workbook.sheet_names() {
            let Some(sheet) = workbook.sheet(&name) else {
                warn!("workbook listed sheet {name:?} but did not provide it");
                continue;
            };
            let grid = Arc::new(GridWidget::new(
                sheet,
                Arc::clone(&config),
                window_width,
                window_height,
            ));

            let sink_callbacks = Arc::clone(&callbacks);
            let sheet_name = name.clone();
            grid.set_event_sink(Box::new(move |event: &GridEvent| {
                let cbs = sink_callbacks.lock();
                match event {
                    GridEvent::CellSelected(coord) => {
                        if let Some(f) = &cbs.on_cell_selected {
                            f(&sheet_name, *coord);
                        }
                    }
                    GridEvent::SelectionChanged(selection) => {
                        if let Some(f) = &cbs.on_selection_changed {
                            f(&sheet_name, selection);
                        }
                    }
                    GridEvent::CellEdited { coordinate, value } => {
                        if let Some(f) = &cbs.on_cell_edited {
                            f(&sheet_name, *coordinate, value);
                        }
                    }
                }
            }));

            grids.push((name, grid));
        }

        let active_sheet = grids.first().map(|(name, _)| name.clone());

        Self {
            workbook,
            config,
            grids,
            state: Mutex::new(UiState {
                active_sheet,
                window_width,
                window_height,
                zoom_level: 1.0,
                theme: Theme::Light,
            }),
            hooks: Mutex::new(CommandHooks::default()),
            callbacks,
        }
    }

    /// Replace the application command hooks.
    pub fn set_command_hooks(&self, hooks: CommandHooks) {
        *self.hooks.lock() = hooks;
    }

    /// Replace the outbound callbacks.
    pub fn set_callbacks(&self, callbacks: UiCallbacks) {
        *self.callbacks.lock() = callbacks;
    }

    /// Names of all managed sheets, in workbook order.
    pub fn sheet_names(&self) -> Vec<String> {
        self.grids.iter().map(|(name, _)| name.clone()).collect()
    }

    /// The active sheet's name.
    pub fn active_sheet_name(&self) -> Option<String> {
        self.state.lock().active_sheet.clone()
    }

    /// The grid widget for a sheet.
    pub fn grid(&self, name: &str) -> Option<&Arc<GridWidget>> {
        self.grids
            .iter()
            .find(|(sheet, _)| sheet == name)
            .map(|(_, grid)| grid)
    }

    /// The active grid widget.
    pub fn active_grid(&self) -> Option<&Arc<GridWidget>> {
        let name = self.state.lock().active_sheet.clone()?;
        self.grid(&name)
    }

    /// Switch the active sheet, cancelling any in-progress edit first.
    pub fn set_active_sheet(&self, name: &str) -> Result<()> {
        if self.grid(name).is_none() {
            return Err(GridViewError::UnknownSheet(name.to_string()));
        }

        let changed = {
            let mut state = self.state.lock();
            let changed = state.active_sheet.as_deref() != Some(name);
            if changed {
                if let Some(previous) = state.active_sheet.clone() {
                    if let Some(grid) = self.grid(&previous) {
                        grid.end_edit(false, "");
                    }
                }
                state.active_sheet = Some(name.to_string());
            }
            changed
        };

        if changed {
            if let Some(f) = &self.callbacks.lock().on_sheet_changed {
                f(name);
            }
        }
        Ok(())
    }

    /// Fan a window resize out to every grid widget.
    pub fn resize_window(&self, width: i64, height: i64) {
        {
            let mut state = self.state.lock();
            state.window_width = width;
            state.window_height = height;
        }
        for (_, grid) in &self.grids {
            grid.resize(width, height);
        }
    }

    // ------------------------------------------------------------------
    // Zoom
    // ------------------------------------------------------------------

    /// Set the active sheet's zoom (clamped), firing `on_zoom_changed`.
    pub fn set_zoom(&self, zoom: f32) {
        let Some(grid) = self.active_grid() else {
            return;
        };
        let zoom = GridConfig::clamp_zoom(zoom);
        let changed = {
            let mut state = self.state.lock();
            let changed = (state.zoom_level - zoom).abs() > f32::EPSILON;
            state.zoom_level = zoom;
            changed
        };

        grid.set_zoom(zoom);

        if changed {
            if let Some(f) = &self.callbacks.lock().on_zoom_changed {
                f(zoom);
            }
        }
    }

    /// Current zoom factor.
    pub fn zoom(&self) -> f32 {
        self.state.lock().zoom_level
    }

    /// Zoom in by 25%.
    pub fn zoom_in(&self) {
        let zoom = self.zoom();
        self.set_zoom(zoom * 1.25);
    }

    /// Zoom out by 20%.
    pub fn zoom_out(&self) {
        let zoom = self.zoom();
        self.set_zoom(zoom * 0.8);
    }

    /// Reset zoom to 100%.
    pub fn zoom_reset(&self) {
        self.set_zoom(1.0);
    }

    // ------------------------------------------------------------------
    // Input dispatch
    // ------------------------------------------------------------------

    /// Global shortcut dispatch, falling through to the active grid.
    pub fn handle_key_press(&self, key: &str, modifiers: Modifiers) -> bool {
        if modifiers.ctrl {
            let handled = match key {
                "z" => self.run_hook(|h| h.undo.as_ref()),
                "y" => self.run_hook(|h| h.redo.as_ref()),
                "c" => self.run_hook(|h| h.copy.as_ref()),
                "v" => self.run_hook(|h| h.paste.as_ref()),
                "x" => self.run_hook(|h| h.cut.as_ref()),
                "f" => self.run_hook(|h| h.find.as_ref()),
                "h" => self.run_hook(|h| h.replace.as_ref()),
                "s" => self.run_hook(|h| h.save.as_ref()),
                "o" => self.run_hook(|h| h.open_file.as_ref()),
                "n" => self.run_hook(|h| h.new_file.as_ref()),
                "=" => {
                    self.zoom_in();
                    Some(true)
                }
                "-" => {
                    self.zoom_out();
                    Some(true)
                }
                "0" => {
                    self.zoom_reset();
                    Some(true)
                }
                _ => None,
            };
            if let Some(handled) = handled {
                return handled;
            }
        }

        self.active_grid()
            .is_some_and(|grid| grid.handle_key_press(key, modifiers))
    }

    fn run_hook(&self, pick: impl Fn(&CommandHooks) -> Option<&CommandHook>) -> Option<bool> {
        let hooks = self.hooks.lock();
        pick(&hooks).map(|hook| hook())
    }

    /// Forward a mouse click to the active grid.
    pub fn handle_mouse_click(
        &self,
        x: i64,
        y: i64,
        button: MouseButton,
        modifiers: Modifiers,
    ) -> bool {
        self.active_grid()
            .is_some_and(|grid| grid.handle_mouse_click(x, y, button, modifiers))
    }

    /// Forward scroll input to the active grid.
    pub fn handle_scroll(&self, delta_x: f32, delta_y: f32, is_wheel: bool) {
        if let Some(grid) = self.active_grid() {
            grid.handle_scroll(delta_x, delta_y, is_wheel);
        }
    }

    // ------------------------------------------------------------------
    // Theme and view toggles
    // ------------------------------------------------------------------

    /// Apply a theme to every grid's rendering context.
    ///
    /// Render caches are cleared so visuals never reflect a stale theme.
    pub fn set_theme(&self, theme: Theme) {
        debug!("applying theme {theme:?}");
        self.state.lock().theme = theme;

        let colors = theme.colors();
        for (_, grid) in &self.grids {
            grid.update_rendering_context(|ctx| {
                ctx.text_color = colors.text.to_string();
                ctx.background_color = colors.background.to_string();
                ctx.grid_color = colors.grid.to_string();
                ctx.selection_color = colors.selection.to_string();
            });
        }
    }

    /// Current theme.
    pub fn theme(&self) -> Theme {
        self.state.lock().theme
    }

    /// Toggle formula display on the active sheet.
    pub fn toggle_formulas(&self) {
        if let Some(grid) = self.active_grid() {
            grid.toggle_formulas();
        }
    }

    /// Toggle gridlines on the active sheet.
    pub fn toggle_gridlines(&self) {
        if let Some(grid) = self.active_grid() {
            grid.toggle_gridlines();
        }
    }

    /// Set freeze panes on the active sheet.
    pub fn set_freeze_panes(&self, rows: u32, cols: u32) {
        if let Some(grid) = self.active_grid() {
            grid.set_freeze_panes(rows, cols);
        }
    }

    // ------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------

    /// Render the active sheet. `None` when the workbook has no sheets.
    pub fn render(&self) -> Option<GridFrame> {
        self.active_grid().map(|grid| grid.render())
    }

    /// Formula-bar text for the active cell: the formula when present,
    /// otherwise the displayed value.
    pub fn formula_bar_text(&self) -> String {
        let Some(name) = self.active_sheet_name() else {
            return String::new();
        };
        let Some(grid) = self.grid(&name) else {
            return String::new();
        };
        let active_cell = grid.selection().active_cell;

        let Some(sheet) = self.workbook.sheet(&name) else {
            return String::new();
        };
        match sheet.get_cell(active_cell) {
            Some(cell) => cell
                .formula
                .clone()
                .unwrap_or_else(|| cell.value.display_text()),
            None => String::new(),
        }
    }

    /// Aggregated diagnostics.
    pub fn stats(&self) -> UiStats {
        let state = self.state.lock();
        UiStats {
            sheet_count: self.grids.len(),
            active_sheet: state.active_sheet.clone(),
            zoom_level: state.zoom_level,
            window_width: state.window_width,
            window_height: state.window_height,
            theme: state.theme,
            target_fps: self.config.ui.target_fps,
            active_grid: state
                .active_sheet
                .as_deref()
                .and_then(|name| self.grid(name))
                .map(|grid| grid.stats()),
        }
    }
}
