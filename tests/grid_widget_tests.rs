//! Grid widget tests: selection and edit state machines, keyboard/mouse
//! commands, zoom, freeze panes, and the render pass.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use std::sync::Arc;

use proptest::prelude::*;

use common::{small_config, EventRecorder, TestSheet};
use gridview::config::GridConfig;
use gridview::events::{CellChangeEvent, CellChangeKind, CellChangeListener, GridEvent};
use gridview::grid::{EditMode, GridWidget, Modifiers, MouseButton};
use gridview::layout::Pane;
use gridview::render::DrawInstruction;
use gridview::types::{Cell, CellCoordinate, CellValue, SelectionMode};

fn widget() -> GridWidget {
    widget_with_config(small_config(1000, 100))
}

fn widget_with_config(config: Arc<GridConfig>) -> GridWidget {
    let mut sheet = TestSheet::new();
    sheet.set_value(0, 0, CellValue::Text("alpha".into()));
    sheet.set_value(0, 1, CellValue::Number(42.0));
    sheet.set_value(1, 0, CellValue::Text("#DIV/0!".into()));
    sheet.set_cell(
        3,
        2,
        Cell {
            value: CellValue::Number(5.0),
            formula: Some("=2+3".into()),
            format: None,
        },
    );
    GridWidget::new(Arc::new(sheet), config, 800, 600)
}

fn coord(row: u32, col: u32) -> CellCoordinate {
    CellCoordinate::new(row, col)
}

// =============================================================================
// SELECTION STATE MACHINE
// =============================================================================

#[test]
fn test_initial_selection_is_origin() {
    let grid = widget();
    let selection = grid.selection();
    assert_eq!(selection.mode, SelectionMode::SingleCell);
    assert_eq!(selection.active_cell, coord(0, 0));
}

#[test]
fn test_click_selects_single_cell() {
    let grid = widget();
    // Default metrics: 60px row header, 30px column header, 100x25 cells
    let handled = grid.handle_mouse_click(165, 60, MouseButton::Left, Modifiers::NONE);
    assert!(handled);

    let selection = grid.selection();
    assert_eq!(selection.mode, SelectionMode::SingleCell);
    assert_eq!(selection.active_cell, coord(1, 1));
}

#[test]
fn test_click_outside_cells_not_handled() {
    let grid = widget();
    assert!(!grid.handle_mouse_click(10, 300, MouseButton::Left, Modifiers::NONE));
    assert!(!grid.handle_mouse_click(300, 10, MouseButton::Left, Modifiers::NONE));
}

#[test]
fn test_shift_click_extends_range() {
    let grid = widget();
    grid.select_cell(coord(1, 1), false);
    // Point inside cell (3, 3): x = 60 + 3*100 + 5, y = 30 + 3*25 + 5
    grid.handle_mouse_click(365, 110, MouseButton::Left, Modifiers::SHIFT);

    let selection = grid.selection();
    assert_eq!(selection.mode, SelectionMode::Range);
    assert_eq!(selection.ranges[0].start, coord(1, 1));
    assert_eq!(selection.ranges[0].end, coord(3, 3));
    assert_eq!(selection.active_cell, coord(1, 1), "anchor stays active");
}

#[test]
fn test_ctrl_click_adds_range() {
    let grid = widget();
    grid.select_cell(coord(0, 0), false);
    grid.handle_mouse_click(165, 60, MouseButton::Left, Modifiers::CTRL);

    let selection = grid.selection();
    assert_eq!(selection.mode, SelectionMode::MultipleRanges);
    assert_eq!(selection.ranges.len(), 2);
    assert!(selection.contains(coord(0, 0)));
    assert!(selection.contains(coord(1, 1)));
}

#[test]
fn test_select_row_and_column_modes() {
    let config = small_config(1000, 100);
    let grid = widget_with_config(Arc::clone(&config));

    grid.select_row(5);
    let selection = grid.selection();
    assert_eq!(selection.mode, SelectionMode::Row);
    assert_eq!(selection.ranges[0].col_count(), 100, "spans all columns");

    grid.select_column(3);
    let selection = grid.selection();
    assert_eq!(selection.mode, SelectionMode::Column);
    assert_eq!(selection.ranges[0].row_count(), 1000, "spans all rows");
}

#[test]
fn test_selection_invariant_after_operations() {
    let grid = widget();
    grid.select_cell(coord(5, 5), false);
    grid.select_cell(coord(8, 8), true);
    grid.add_to_selection(coord(2, 2));
    grid.select_row(1);
    grid.select_column(1);
    grid.select_all();

    // After every operation the invariant held; spot-check the last
    let selection = grid.selection();
    assert!(!selection.ranges.is_empty());
    assert!(selection.contains(selection.active_cell));
}

// =============================================================================
// KEYBOARD NAVIGATION
// =============================================================================

#[test]
fn test_arrow_navigation() {
    let grid = widget();
    grid.handle_key_press("ArrowDown", Modifiers::NONE);
    grid.handle_key_press("ArrowDown", Modifiers::NONE);
    grid.handle_key_press("ArrowRight", Modifiers::NONE);
    assert_eq!(grid.selection().active_cell, coord(2, 1));

    grid.handle_key_press("ArrowUp", Modifiers::NONE);
    grid.handle_key_press("ArrowLeft", Modifiers::NONE);
    assert_eq!(grid.selection().active_cell, coord(1, 0));
}

#[test]
fn test_arrows_clamp_at_origin() {
    let grid = widget();
    grid.handle_key_press("ArrowUp", Modifiers::NONE);
    grid.handle_key_press("ArrowLeft", Modifiers::NONE);
    assert_eq!(grid.selection().active_cell, coord(0, 0));
}

#[test]
fn test_arrows_clamp_at_grid_bounds() {
    let grid = widget_with_config(small_config(3, 3));
    grid.select_cell(coord(2, 2), false);
    grid.handle_key_press("ArrowDown", Modifiers::NONE);
    grid.handle_key_press("ArrowRight", Modifiers::NONE);
    assert_eq!(grid.selection().active_cell, coord(2, 2));
}

#[test]
fn test_shift_arrows_grow_selection() {
    let grid = widget();
    grid.select_cell(coord(1, 1), false);
    grid.handle_key_press("ArrowRight", Modifiers::SHIFT);
    grid.handle_key_press("ArrowRight", Modifiers::SHIFT);
    grid.handle_key_press("ArrowDown", Modifiers::SHIFT);

    let selection = grid.selection();
    assert_eq!(selection.mode, SelectionMode::Range);
    assert_eq!(selection.ranges[0].start, coord(1, 1));
    assert_eq!(selection.ranges[0].end, coord(2, 3));
    assert_eq!(selection.active_cell, coord(1, 1), "anchor never moves");
}

#[test]
fn test_shift_arrows_shrink_back() {
    let grid = widget();
    grid.select_cell(coord(5, 5), false);
    grid.handle_key_press("ArrowLeft", Modifiers::SHIFT);
    grid.handle_key_press("ArrowLeft", Modifiers::SHIFT);
    let selection = grid.selection();
    assert_eq!(selection.ranges[0].start, coord(5, 3));
    assert_eq!(selection.ranges[0].end, coord(5, 5));

    grid.handle_key_press("ArrowRight", Modifiers::SHIFT);
    let selection = grid.selection();
    assert_eq!(selection.ranges[0].start, coord(5, 4));
}

#[test]
fn test_home_and_ctrl_home() {
    let grid = widget();
    grid.select_cell(coord(7, 4), false);

    grid.handle_key_press("Home", Modifiers::NONE);
    assert_eq!(grid.selection().active_cell, coord(7, 0), "row start");

    grid.select_cell(coord(7, 4), false);
    grid.handle_key_press("Home", Modifiers::CTRL);
    assert_eq!(grid.selection().active_cell, coord(0, 0), "grid origin");
}

#[test]
fn test_end_uses_last_used_cell() {
    // Fixture data extends to (3, 2)
    let grid = widget();
    grid.select_cell(coord(1, 0), false);

    grid.handle_key_press("End", Modifiers::NONE);
    assert_eq!(
        grid.selection().active_cell,
        coord(1, 2),
        "plain End moves to the last used column of the current row"
    );

    grid.handle_key_press("End", Modifiers::CTRL);
    assert_eq!(
        grid.selection().active_cell,
        coord(3, 2),
        "Ctrl+End jumps to the sheet's last used cell"
    );
}

#[test]
fn test_unknown_key_not_handled() {
    let grid = widget();
    assert!(!grid.handle_key_press("F7", Modifiers::NONE));
}

// =============================================================================
// EDIT STATE MACHINE
// =============================================================================

#[test]
fn test_f2_starts_edit_on_active_cell() {
    let grid = widget();
    grid.select_cell(coord(2, 2), false);
    grid.handle_key_press("F2", Modifiers::NONE);

    let state = grid.state();
    assert_eq!(state.edit_mode, EditMode::Edit);
    assert_eq!(state.editing_cell, Some(coord(2, 2)));
}

#[test]
fn test_end_edit_commits_value() {
    let grid = widget();
    let recorder = EventRecorder::new();
    grid.set_event_sink(recorder.sink());

    grid.start_edit(Some(coord(1, 1)));
    grid.end_edit(true, "99");

    assert_eq!(grid.state().edit_mode, EditMode::View);
    assert_eq!(grid.state().editing_cell, None);
    assert_eq!(recorder.edited(), vec![(coord(1, 1), "99".to_string())]);
}

#[test]
fn test_empty_commit_is_noop() {
    let grid = widget();
    let recorder = EventRecorder::new();
    grid.set_event_sink(recorder.sink());

    grid.start_edit(Some(coord(1, 1)));
    recorder.clear();
    grid.end_edit(true, "");

    assert_eq!(grid.state().edit_mode, EditMode::View);
    assert!(recorder.edited().is_empty(), "empty value commits nothing");
}

#[test]
fn test_escape_cancels_edit() {
    let grid = widget();
    let recorder = EventRecorder::new();
    grid.set_event_sink(recorder.sink());

    grid.start_edit(None);
    recorder.clear();
    grid.handle_key_press("Escape", Modifiers::NONE);

    assert_eq!(grid.state().edit_mode, EditMode::View);
    assert!(recorder.edited().is_empty());
}

#[test]
fn test_enter_commits_edit_or_advances() {
    let grid = widget();
    grid.start_edit(Some(coord(0, 0)));
    grid.handle_key_press("Enter", Modifiers::NONE);
    assert_eq!(grid.state().edit_mode, EditMode::View, "Enter commits");

    grid.handle_key_press("Enter", Modifiers::NONE);
    assert_eq!(
        grid.selection().active_cell,
        coord(1, 0),
        "Enter in view mode advances down"
    );
}

#[test]
fn test_end_edit_outside_edit_mode_ignored() {
    let grid = widget();
    let recorder = EventRecorder::new();
    grid.set_event_sink(recorder.sink());
    grid.end_edit(true, "ignored");
    assert!(recorder.edited().is_empty());
}

// =============================================================================
// DELETE
// =============================================================================

/// Scenario: Delete over a 3-cell selection fires one clearing edit per cell.
#[test]
fn test_delete_clears_each_selected_cell() {
    let grid = widget();
    let recorder = EventRecorder::new();
    grid.set_event_sink(recorder.sink());

    grid.select_range(coord(0, 0), coord(0, 2));
    recorder.clear();
    grid.handle_key_press("Delete", Modifiers::NONE);

    let edited = recorder.edited();
    assert_eq!(edited.len(), 3, "one edit per selected cell");
    assert_eq!(
        edited,
        vec![
            (coord(0, 0), String::new()),
            (coord(0, 1), String::new()),
            (coord(0, 2), String::new()),
        ]
    );
}

#[test]
fn test_delete_covers_multiple_ranges() {
    let grid = widget();
    let recorder = EventRecorder::new();
    grid.set_event_sink(recorder.sink());

    grid.select_cell(coord(0, 0), false);
    grid.add_to_selection(coord(5, 5));
    recorder.clear();
    grid.handle_key_press("Delete", Modifiers::NONE);

    assert_eq!(recorder.edited().len(), 2);
}

// =============================================================================
// ZOOM
// =============================================================================

#[test]
fn test_zoom_scales_cell_metrics() {
    let grid = widget();
    grid.set_zoom(2.0);

    let metrics = grid.viewport().metrics();
    assert_eq!(metrics.cell_width, 200);
    assert_eq!(metrics.cell_height, 50);
    assert_eq!(grid.rendering_context().scale_factor, 2.0);
}

proptest! {
    // Each case spins up a widget (and its ticker thread); keep the count low
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// set_zoom stores a value in [0.25, 4.0] for any input.
    #[test]
    fn prop_zoom_always_clamped(zoom in proptest::num::f32::ANY) {
        let grid = GridWidget::new(
            Arc::new(TestSheet::new()),
            small_config(100, 100),
            800,
            600,
        );
        grid.set_zoom(zoom);
        let stored = grid.zoom();
        prop_assert!((0.25..=4.0).contains(&stored), "stored zoom {}", stored);
    }
}

// =============================================================================
// FREEZE PANES
// =============================================================================

/// Scenario: freeze rows=2, cols=1 produces exactly three auxiliary panes.
#[test]
fn test_freeze_panes_creates_aux_viewports() {
    let grid = widget();
    grid.set_freeze_panes(2, 1);

    let names = grid.viewport_manager().pane_names();
    assert_eq!(names, vec![Pane::Main, Pane::Top, Pane::Left, Pane::Corner]);

    let frame = grid.render();
    assert_eq!(frame.panes.len(), 4, "render covers every pane");
}

#[test]
fn test_unfreeze_drops_aux_viewports() {
    let grid = widget();
    grid.set_freeze_panes(2, 1);
    grid.set_freeze_panes(0, 0);
    assert_eq!(grid.viewport_manager().pane_names(), vec![Pane::Main]);
}

// =============================================================================
// RENDER PASS
// =============================================================================

fn cell_text(frame: &gridview::grid::GridFrame, target: CellCoordinate) -> Option<Vec<String>> {
    frame.panes.iter().find_map(|pane| {
        pane.cells
            .iter()
            .find(|c| c.coordinate == target)
            .and_then(|c| match c.text() {
                Some(DrawInstruction::Text { lines, .. }) => Some(lines.clone()),
                _ => None,
            })
    })
}

#[test]
fn test_render_produces_cells_and_headers() {
    let grid = widget();
    let frame = grid.render();

    assert_eq!(frame.panes[0].pane, Pane::Main);
    assert!(frame.cell_count > 0);
    assert_eq!(
        cell_text(&frame, coord(0, 0)),
        Some(vec!["alpha".to_string()])
    );

    let first_col = &frame.headers.columns[0];
    assert_eq!(first_col.text, "A");
    let first_row = &frame.headers.rows[0];
    assert_eq!(first_row.text, "1", "row labels are 1-based");
}

#[test]
fn test_render_marks_selection_overlay() {
    let grid = widget();
    grid.select_range(coord(0, 0), coord(1, 1));
    let frame = grid.render();

    assert_eq!(frame.selections.len(), 1);
    match &frame.selections[0] {
        DrawInstruction::Rect { bounds, alpha, .. } => {
            assert_eq!(*alpha, 0.3);
            assert_eq!(bounds.width, 200, "two 100px columns");
            assert_eq!(bounds.height, 50, "two 25px rows");
        }
        other => panic!("selection overlay should be a rect, got {other:?}"),
    }
}

#[test]
fn test_render_editing_indicator() {
    let grid = widget();
    assert!(grid.render().editing_indicator.is_none());

    grid.start_edit(Some(coord(0, 0)));
    let frame = grid.render();
    match frame.editing_indicator {
        Some(DrawInstruction::Outline { color, .. }) => assert_eq!(color, "#00FF00"),
        other => panic!("expected an outline indicator, got {other:?}"),
    }
}

#[test]
fn test_render_error_cells_flagged() {
    let grid = widget();
    let frame = grid.render();
    let error_cell = frame.panes[0]
        .cells
        .iter()
        .find(|c| c.coordinate == coord(1, 0))
        .expect("error cell is visible");
    assert!(
        error_cell
            .instructions
            .iter()
            .any(|i| matches!(i, DrawInstruction::Marker { .. })),
        "'#DIV/0!' text renders with an error marker"
    );
}

#[test]
fn test_formula_toggle_changes_display() {
    let grid = widget();
    let frame = grid.render();
    assert_eq!(cell_text(&frame, coord(3, 2)), Some(vec!["5".to_string()]));

    grid.toggle_formulas();
    let frame = grid.render();
    assert_eq!(
        cell_text(&frame, coord(3, 2)),
        Some(vec!["=2+3".to_string()]),
        "formula view shows the formula text"
    );
}

#[test]
fn test_render_count_increments() {
    let grid = widget();
    grid.render();
    grid.render();
    assert_eq!(grid.stats().render_count, 2);
}

// =============================================================================
// CACHE INVALIDATION AND EVENTS
// =============================================================================

#[test]
fn test_cell_change_event_clears_render_cache() {
    let grid = widget();
    grid.render();
    assert!(grid.stats().renderer.cache_size > 0, "render fills the cache");

    grid.cell_changed(&CellChangeEvent {
        coordinate: coord(0, 0),
        kind: CellChangeKind::ValueChanged,
    });
    assert_eq!(grid.stats().renderer.cache_size, 0);
}

#[test]
fn test_selection_events_emitted() {
    let grid = widget();
    let recorder = EventRecorder::new();
    grid.set_event_sink(recorder.sink());

    grid.select_cell(coord(2, 3), false);
    let events = recorder.events();
    assert!(matches!(
        events.first(),
        Some(GridEvent::CellSelected(c)) if *c == coord(2, 3)
    ));
    assert!(matches!(
        events.get(1),
        Some(GridEvent::SelectionChanged(s)) if s.active_cell == coord(2, 3)
    ));
}

#[test]
fn test_resize_updates_viewport() {
    let grid = widget();
    grid.resize(1200, 900);
    let metrics = grid.viewport().metrics();
    assert_eq!((metrics.width, metrics.height), (1200, 900));
}
