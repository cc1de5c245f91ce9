//! Typed events flowing in and out of the grid core.
//!
//! Inbound: the data-model collaborator notifies the grid of cell changes
//! through the [`CellChangeListener`] trait (injected observer, no global
//! event registry). Outbound: each `GridWidget` emits [`GridEvent`]s through
//! a registered sink; ownership stays one-directional, and the widget never
//! holds a reference back to its owner.

use crate::types::{CellCoordinate, Selection};

/// What changed about a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellChangeKind {
    ValueChanged,
    FormulaChanged,
    FormatChanged,
}

/// A change notification delivered by the data-model collaborator.
#[derive(Debug, Clone, Copy)]
pub struct CellChangeEvent {
    pub coordinate: CellCoordinate,
    pub kind: CellChangeKind,
}

/// Observer interface for data-model change notifications.
///
/// `GridWidget` implements this to invalidate its render cache; the
/// application is responsible for wiring model notifications to it.
pub trait CellChangeListener: Send + Sync {
    fn cell_changed(&self, event: &CellChangeEvent);
}

/// Events emitted by a `GridWidget`.
#[derive(Debug, Clone)]
pub enum GridEvent {
    /// A single cell became the active cell.
    CellSelected(CellCoordinate),
    /// The selection changed in any way.
    SelectionChanged(Selection),
    /// An edit was committed (also emitted once per cell on Delete).
    CellEdited {
        coordinate: CellCoordinate,
        value: String,
    },
}

/// Sink receiving a widget's events.
pub type GridEventSink = Box<dyn Fn(&GridEvent) + Send + Sync>;
