//! gridview - virtual-scrolling grid engine
//!
//! Displays spreadsheet-scale grids (millions of logical rows and columns)
//! while only ever materializing draw output for the cells that are visible:
//! - Viewport geometry with bounded position caches
//! - Frozen rows/columns via auxiliary viewports
//! - Smooth and momentum scrolling on a dedicated frame ticker
//! - Render caching keyed on everything that affects pixel output
//! - Selection and edit-mode state machines with typed event emission
//!
//! The crate consumes an external data model (the [`types::Sheet`] and
//! [`types::Workbook`] traits) and produces an abstract, serializable tree of
//! draw instructions; rasterization belongs to the presentation layer.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use gridview::config::GridConfig;
//! use gridview::ui::UIManager;
//! # fn workbook() -> Arc<dyn gridview::types::Workbook> { unimplemented!() }
//!
//! let config = Arc::new(GridConfig::default());
//! let ui = UIManager::new(workbook(), config, 1024, 768);
//! if let Some(frame) = ui.render() {
//!     // hand `frame` (serializable) to the presentation layer
//!     let _json = serde_json::to_string(&frame);
//! }
//! ```

pub mod cache;
pub mod cell_ref;
pub mod config;
pub mod error;
pub mod events;
pub mod types;

// Engine modules
pub mod grid;
pub mod layout;
pub mod render;
pub mod scroll;
pub mod ui;

// Re-export the main coordinator types
pub use grid::GridWidget;
pub use ui::UIManager;

pub use error::{GridViewError, Result};

/// Get the library version
#[must_use]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
