//! Rendering engine: draw instructions, caches, and the cell renderer.
//!
//! This module provides:
//! - A backend-agnostic draw-instruction tree (rects, lines, text runs)
//! - The caching cell renderer keyed on everything that affects output
//! - Approximate text measurement with an independent cache
//! - Hex color parsing and tint utilities

pub mod colors;

mod cell_renderer;
mod instructions;
mod text;

pub use cell_renderer::{
    CellRenderData, CellRenderer, RendererStats, RenderingContext, RenderingMode,
};
pub use instructions::{CellDrawing, DrawInstruction, Rect};
pub use text::TextMeasurer;
