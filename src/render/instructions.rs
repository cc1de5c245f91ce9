//! Backend-agnostic draw instructions.
//!
//! A render pass produces a tree of these; the presentation layer rasterizes
//! them. Everything is plain serializable data; no drawing backend leaks in.

use serde::Serialize;

use crate::types::{CellAlignment, CellCoordinate, LinePattern};

/// Axis-aligned rectangle in pane-relative pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

/// One paint operation, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawInstruction {
    /// Filled rectangle.
    Rect {
        bounds: Rect,
        /// Hex color ("#RRGGBB").
        color: String,
        /// Opacity in `[0, 1]`.
        alpha: f32,
    },
    /// Line segment.
    Line {
        x1: i64,
        y1: i64,
        x2: i64,
        y2: i64,
        color: String,
        width: i64,
        pattern: LinePattern,
    },
    /// Text run; multiple lines when wrapping applied.
    Text {
        lines: Vec<String>,
        x: i64,
        y: i64,
        font_family: String,
        font_size: f32,
        color: String,
        bold: bool,
        italic: bool,
        alignment: CellAlignment,
    },
    /// Stroked (unfilled) rectangle outline.
    Outline {
        bounds: Rect,
        color: String,
        width: i64,
        pattern: LinePattern,
    },
    /// Small corner marker (error indicator).
    Marker {
        x: i64,
        y: i64,
        size: i64,
        color: String,
    },
}

/// The complete instruction tree for one cell, in paint order:
/// background, borders, text, selection overlay, error indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellDrawing {
    pub coordinate: CellCoordinate,
    pub bounds: Rect,
    pub instructions: Vec<DrawInstruction>,
}

impl CellDrawing {
    /// The text instruction, if the cell has one.
    pub fn text(&self) -> Option<&DrawInstruction> {
        self.instructions
            .iter()
            .find(|i| matches!(i, DrawInstruction::Text { .. }))
    }

    /// The line instructions (gridlines and format borders).
    pub fn lines(&self) -> impl Iterator<Item = &DrawInstruction> {
        self.instructions
            .iter()
            .filter(|i| matches!(i, DrawInstruction::Line { .. }))
    }
}
