//! Cell formatting types supplied by the data-model collaborator.

use serde::{Deserialize, Serialize};

/// Horizontal text alignment inside a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellAlignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Border line styles, Excel-compatible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    #[default]
    None,
    Thin,
    Medium,
    Thick,
    Dashed,
    Dotted,
    Double,
}

/// How a border style is stroked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinePattern {
    Solid,
    Dashed,
    Dotted,
    Double,
}

impl BorderStyle {
    /// Stroke width in pixels.
    pub fn width(self) -> i64 {
        match self {
            BorderStyle::None => 0,
            BorderStyle::Thin | BorderStyle::Dashed | BorderStyle::Dotted => 1,
            BorderStyle::Medium => 2,
            BorderStyle::Thick | BorderStyle::Double => 3,
        }
    }

    /// Stroke pattern.
    pub fn pattern(self) -> LinePattern {
        match self {
            BorderStyle::Dashed => LinePattern::Dashed,
            BorderStyle::Dotted => LinePattern::Dotted,
            BorderStyle::Double => LinePattern::Double,
            _ => LinePattern::Solid,
        }
    }
}

/// One side of a cell border.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellBorder {
    pub style: BorderStyle,
    /// Hex color ("#RRGGBB"); black when absent.
    pub color: Option<String>,
}

/// A cell's formatting, as exposed by the data model.
///
/// Every field here that affects pixel output participates in the render
/// cache key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellFormat {
    pub font_family: Option<String>,
    pub font_size: Option<f32>,
    /// Hex color ("#RRGGBB").
    pub font_color: Option<String>,
    pub bold: bool,
    pub italic: bool,
    /// Hex color ("#RRGGBB").
    pub background_color: Option<String>,
    pub alignment: Option<CellAlignment>,
    pub wrap_text: bool,
    pub border_top: Option<CellBorder>,
    pub border_right: Option<CellBorder>,
    pub border_bottom: Option<CellBorder>,
    pub border_left: Option<CellBorder>,
}
