//! Layout engine: viewport geometry and multi-pane coordination.
//!
//! This module handles:
//! - Mapping scroll position and pane size to the visible coordinate range
//! - Per-coordinate screen placement with a bounded cache
//! - Hit testing (point -> cell) and centering scrolls (cell -> offset)
//! - Frozen row/column panes via auxiliary viewports

mod manager;
mod viewport;

pub use manager::{Pane, ViewportManager, ViewportManagerStats};
pub use viewport::{CellPosition, Viewport, ViewportMetrics, ViewportStats};
