//! Shared test fixtures: an in-memory sheet/workbook and config builders.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use gridview::config::GridConfig;
use gridview::events::GridEvent;
use gridview::layout::ViewportMetrics;
use gridview::types::{Cell, CellCoordinate, CellFormat, CellValue, Sheet, Workbook};

/// In-memory sheet backed by a coordinate map.
#[derive(Default)]
pub struct TestSheet {
    cells: HashMap<CellCoordinate, Cell>,
}

impl TestSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cells(cells: impl IntoIterator<Item = (CellCoordinate, Cell)>) -> Self {
        Self {
            cells: cells.into_iter().collect(),
        }
    }

    pub fn set_value(&mut self, row: u32, col: u32, value: CellValue) {
        self.cells
            .insert(CellCoordinate::new(row, col), Cell::from_value(value));
    }

    pub fn set_cell(&mut self, row: u32, col: u32, cell: Cell) {
        self.cells.insert(CellCoordinate::new(row, col), cell);
    }
}

impl Sheet for TestSheet {
    fn get_cell(&self, coord: CellCoordinate) -> Option<Cell> {
        self.cells.get(&coord).cloned()
    }

    fn last_used_cell(&self) -> Option<CellCoordinate> {
        let max_row = self.cells.keys().map(|c| c.row).max()?;
        let max_col = self.cells.keys().map(|c| c.col).max()?;
        Some(CellCoordinate::new(max_row, max_col))
    }
}

/// In-memory workbook of named test sheets.
pub struct TestWorkbook {
    sheets: Vec<(String, Arc<TestSheet>)>,
}

impl TestWorkbook {
    pub fn new(sheets: Vec<(&str, TestSheet)>) -> Self {
        Self {
            sheets: sheets
                .into_iter()
                .map(|(name, sheet)| (name.to_string(), Arc::new(sheet)))
                .collect(),
        }
    }

    /// A workbook with one sheet named "Sheet1" holding a few values.
    pub fn simple() -> Self {
        let mut sheet = TestSheet::new();
        sheet.set_value(0, 0, CellValue::Text("hello".into()));
        sheet.set_value(0, 1, CellValue::Number(42.0));
        sheet.set_value(1, 0, CellValue::Boolean(true));
        Self::new(vec![("Sheet1", sheet)])
    }
}

impl Workbook for TestWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(name, _)| name.clone()).collect()
    }

    fn sheet(&self, name: &str) -> Option<Arc<dyn Sheet>> {
        self.sheets
            .iter()
            .find(|(sheet_name, _)| sheet_name == name)
            .map(|(_, sheet)| Arc::clone(sheet) as Arc<dyn Sheet>)
    }
}

/// A formatted cell for renderer tests.
pub fn formatted_cell(value: CellValue, format: CellFormat) -> Cell {
    Cell {
        value,
        formula: None,
        format: Some(format),
    }
}

/// Config with small grid limits so edge clamping is easy to exercise.
pub fn small_config(max_rows: u32, max_columns: u32) -> Arc<GridConfig> {
    let mut config = GridConfig::default();
    config.limits.max_rows = max_rows;
    config.limits.max_columns = max_columns;
    Arc::new(config)
}

/// Metrics with no header strips: content area equals the pane.
pub fn bare_metrics(width: i64, height: i64, cell_width: i64, cell_height: i64) -> ViewportMetrics {
    ViewportMetrics {
        width,
        height,
        scroll_x: 0,
        scroll_y: 0,
        cell_width,
        cell_height,
        header_height: 0,
        row_header_width: 0,
    }
}

/// Event sink that records everything it receives.
#[derive(Clone, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<GridEvent>>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A boxed sink suitable for `GridWidget::set_event_sink`.
    pub fn sink(&self) -> Box<dyn Fn(&GridEvent) + Send + Sync> {
        let events = Arc::clone(&self.events);
        Box::new(move |event| events.lock().push(event.clone()))
    }

    pub fn events(&self) -> Vec<GridEvent> {
        self.events.lock().clone()
    }

    pub fn edited(&self) -> Vec<(CellCoordinate, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                GridEvent::CellEdited { coordinate, value } => Some((coordinate, value)),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}
