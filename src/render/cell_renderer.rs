//! Cell rendering pipeline: snapshot + context -> cached draw instructions.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use super::colors;
use super::instructions::{CellDrawing, DrawInstruction, Rect};
use super::text::TextMeasurer;
use crate::cache::BoundedCache;
use crate::config::GridConfig;
use crate::types::{BorderStyle, CellAlignment, CellBorder, CellCoordinate, CellFormat, CellValue};

/// Rendering quality modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderingMode {
    /// Minimal rendering while scrolling.
    Fast,
    /// Standard quality.
    #[default]
    Normal,
    /// High quality for printing/export.
    HighQuality,
}

/// Configuration bundle for a render pass. Every field here influences pixel
/// output and therefore participates in the render cache key.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderingContext {
    pub mode: RenderingMode,
    pub scale_factor: f32,
    pub show_gridlines: bool,
    pub show_formulas: bool,
    pub highlight_errors: bool,
    pub selection_color: String,
    pub grid_color: String,
    pub text_color: String,
    pub background_color: String,
    pub font_family: String,
    pub font_size: f32,
    /// Display text beyond this length is truncated with an ellipsis.
    pub max_text_length: usize,
    pub enable_text_wrapping: bool,
    pub enable_rich_formatting: bool,
}

impl Default for RenderingContext {
    fn default() -> Self {
        Self {
            mode: RenderingMode::Normal,
            scale_factor: 1.0,
            show_gridlines: true,
            show_formulas: false,
            highlight_errors: true,
            selection_color: "#4A90E2".to_string(),
            grid_color: "#E0E0E0".to_string(),
            text_color: "#000000".to_string(),
            background_color: "#FFFFFF".to_string(),
            font_family: "Arial".to_string(),
            font_size: 11.0,
            max_text_length: 1000,
            enable_text_wrapping: true,
            enable_rich_formatting: true,
        }
    }
}

/// One cell's render-relevant snapshot, built fresh per render pass.
#[derive(Debug, Clone)]
pub struct CellRenderData {
    pub coordinate: CellCoordinate,
    pub value: CellValue,
    pub display_text: String,
    pub format: Option<CellFormat>,
    pub is_selected: bool,
    pub is_editing: bool,
    pub is_error: bool,
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

/// Renderer diagnostics.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RendererStats {
    pub cells_rendered: u64,
    pub cache_size: usize,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_hit_rate: f64,
    pub cache_enabled: bool,
    pub text_cache_entries: usize,
}

/// One border side's contribution to the cache key.
type BorderKey = Option<(BorderStyle, Option<String>)>;

/// Everything that can change a cell's pixels. Omitting an output-affecting
/// field here is a correctness bug (stale visuals served from cache).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RenderCacheKey {
    coordinate: CellCoordinate,
    display_text: String,
    is_selected: bool,
    is_editing: bool,
    is_error: bool,
    width: i64,
    height: i64,
    mode: RenderingMode,
    scale_bits: u32,
    show_gridlines: bool,
    show_formulas: bool,
    highlight_errors: bool,
    enable_text_wrapping: bool,
    enable_rich_formatting: bool,
    max_text_length: usize,
    selection_color: String,
    grid_color: String,
    text_color: String,
    background_color: String,
    base_font_family: String,
    base_font_size_bits: u32,
    format_font_family: Option<String>,
    format_font_size_bits: Option<u32>,
    format_font_color: Option<String>,
    format_bold: bool,
    format_italic: bool,
    format_background: Option<String>,
    format_alignment: Option<CellAlignment>,
    format_wrap: bool,
    border_top: BorderKey,
    border_right: BorderKey,
    border_bottom: BorderKey,
    border_left: BorderKey,
}

impl RenderCacheKey {
    fn build(data: &CellRenderData, context: &RenderingContext) -> Self {
        let border_key = |b: &Option<CellBorder>| b.as_ref().map(|b| (b.style, b.color.clone()));
        let format = data.format.as_ref();
        Self {
            coordinate: data.coordinate,
            display_text: data.display_text.clone(),
            is_selected: data.is_selected,
            is_editing: data.is_editing,
            is_error: data.is_error,
            width: data.width,
            height: data.height,
            mode: context.mode,
            scale_bits: context.scale_factor.to_bits(),
            show_gridlines: context.show_gridlines,
            show_formulas: context.show_formulas,
            highlight_errors: context.highlight_errors,
            enable_text_wrapping: context.enable_text_wrapping,
            enable_rich_formatting: context.enable_rich_formatting,
            max_text_length: context.max_text_length,
            selection_color: context.selection_color.clone(),
            grid_color: context.grid_color.clone(),
            text_color: context.text_color.clone(),
            background_color: context.background_color.clone(),
            base_font_family: context.font_family.clone(),
            base_font_size_bits: context.font_size.to_bits(),
            format_font_family: format.and_then(|f| f.font_family.clone()),
            format_font_size_bits: format.and_then(|f| f.font_size.map(f32::to_bits)),
            format_font_color: format.and_then(|f| f.font_color.clone()),
            format_bold: format.is_some_and(|f| f.bold),
            format_italic: format.is_some_and(|f| f.italic),
            format_background: format.and_then(|f| f.background_color.clone()),
            format_alignment: format.and_then(|f| f.alignment),
            format_wrap: format.is_some_and(|f| f.wrap_text),
            border_top: format.and_then(|f| border_key(&f.border_top)),
            border_right: format.and_then(|f| border_key(&f.border_right)),
            border_bottom: format.and_then(|f| border_key(&f.border_bottom)),
            border_left: format.and_then(|f| border_key(&f.border_left)),
        }
    }
}

struct RendererInner {
    cache: BoundedCache<RenderCacheKey, Arc<CellDrawing>>,
    text: TextMeasurer,
    cache_enabled: bool,
    cells_rendered: u64,
}

/// Turns cell snapshots into cached draw-instruction trees.
///
/// Malformed or missing cell data renders as empty text; nothing here fails.
pub struct CellRenderer {
    inner: Mutex<RendererInner>,
}

impl CellRenderer {
    /// Create a renderer with cache capacities from the configuration.
    pub fn new(config: &GridConfig) -> Self {
        Self {
            inner: Mutex::new(RendererInner {
                cache: BoundedCache::new(config.performance.render_cache_size),
                text: TextMeasurer::new(config.performance.text_cache_size),
                cache_enabled: true,
                cells_rendered: 0,
            }),
        }
    }

    /// Render a single cell, serving identical requests from the cache.
    pub fn render_cell(
        &self,
        data: &CellRenderData,
        context: &RenderingContext,
    ) -> Arc<CellDrawing> {
        let mut inner = self.inner.lock();
        inner.cells_rendered += 1;

        if inner.cache_enabled {
            let key = RenderCacheKey::build(data, context);
            if let Some(cached) = inner.cache.get(&key) {
                return Arc::clone(cached);
            }
            let drawing = Arc::new(Self::build_drawing(&mut inner.text, data, context));
            inner.cache.put(key, Arc::clone(&drawing));
            drawing
        } else {
            Arc::new(Self::build_drawing(&mut inner.text, data, context))
        }
    }

    /// Render a batch of cells, preserving order.
    pub fn render_batch(
        &self,
        cells: &[CellRenderData],
        context: &RenderingContext,
    ) -> Vec<Arc<CellDrawing>> {
        cells
            .iter()
            .map(|data| self.render_cell(data, context))
            .collect()
    }

    /// Drop all cached instruction trees. Must be called on theme changes,
    /// cell-change events, and format edits.
    pub fn clear_cache(&self) {
        log::debug!("render cache cleared");
        self.inner.lock().cache.clear();
    }

    /// Drop cached text measurements (font metrics changed).
    pub fn clear_text_cache(&self) {
        self.inner.lock().text.clear();
    }

    /// Enable or disable render caching. Disabling drops current entries.
    pub fn set_cache_enabled(&self, enabled: bool) {
        let mut inner = self.inner.lock();
        inner.cache_enabled = enabled;
        if !enabled {
            inner.cache.clear();
        }
    }

    /// Diagnostics counters.
    pub fn stats(&self) -> RendererStats {
        let inner = self.inner.lock();
        RendererStats {
            cells_rendered: inner.cells_rendered,
            cache_size: inner.cache.len(),
            cache_hits: inner.cache.hits(),
            cache_misses: inner.cache.misses(),
            cache_hit_rate: inner.cache.hit_rate(),
            cache_enabled: inner.cache_enabled,
            text_cache_entries: inner.text.cached_entries(),
        }
    }

    // ------------------------------------------------------------------
    // Instruction building
    // ------------------------------------------------------------------

    fn build_drawing(
        text: &mut TextMeasurer,
        data: &CellRenderData,
        context: &RenderingContext,
    ) -> CellDrawing {
        let bounds = Rect {
            x: data.x,
            y: data.y,
            width: data.width,
            height: data.height,
        };

        let mut instructions = Vec::with_capacity(6);
        instructions.push(Self::background(data, context, bounds));
        Self::borders(data, context, bounds, &mut instructions);
        if let Some(run) = Self::text_run(text, data, context, bounds) {
            instructions.push(run);
        }
        if data.is_selected {
            instructions.push(DrawInstruction::Rect {
                bounds,
                color: context.selection_color.clone(),
                alpha: 0.3,
            });
        }
        if data.is_error {
            instructions.push(DrawInstruction::Marker {
                x: bounds.x + bounds.width - 8,
                y: bounds.y,
                size: 8,
                color: "#FF0000".to_string(),
            });
        }

        CellDrawing {
            coordinate: data.coordinate,
            bounds,
            instructions,
        }
    }

    fn background(
        data: &CellRenderData,
        context: &RenderingContext,
        bounds: Rect,
    ) -> DrawInstruction {
        let mut color = context.background_color.clone();
        if let Some(bg) = data
            .format
            .as_ref()
            .and_then(|f| f.background_color.as_ref())
        {
            color.clone_from(bg);
        }
        if data.is_error && context.highlight_errors {
            color = colors::lighten("#FF0000", 0.8);
        }
        DrawInstruction::Rect {
            bounds,
            color,
            alpha: 1.0,
        }
    }

    fn borders(
        data: &CellRenderData,
        context: &RenderingContext,
        bounds: Rect,
        out: &mut Vec<DrawInstruction>,
    ) {
        let (x, y) = (bounds.x, bounds.y);
        let (x2, y2) = (x + bounds.width, y + bounds.height);

        if context.show_gridlines {
            // Right and bottom gridlines; neighbors supply the other sides
            out.push(Self::line(x2, y, x2, y2, &context.grid_color, BorderStyle::Thin));
            out.push(Self::line(x, y2, x2, y2, &context.grid_color, BorderStyle::Thin));
        }

        if !context.enable_rich_formatting {
            return;
        }
        let Some(format) = data.format.as_ref() else {
            return;
        };

        let sides: [(&Option<CellBorder>, (i64, i64, i64, i64)); 4] = [
            (&format.border_top, (x, y, x2, y)),
            (&format.border_bottom, (x, y2, x2, y2)),
            (&format.border_left, (x, y, x, y2)),
            (&format.border_right, (x2, y, x2, y2)),
        ];
        for (border, (x1, y1, bx2, by2)) in sides {
            if let Some(border) = border {
                if border.style != BorderStyle::None {
                    let color = border.color.as_deref().unwrap_or("#000000");
                    out.push(Self::line(x1, y1, bx2, by2, color, border.style));
                }
            }
        }
    }

    fn line(x1: i64, y1: i64, x2: i64, y2: i64, color: &str, style: BorderStyle) -> DrawInstruction {
        DrawInstruction::Line {
            x1,
            y1,
            x2,
            y2,
            color: color.to_string(),
            width: style.width(),
            pattern: style.pattern(),
        }
    }

    fn text_run(
        measurer: &mut TextMeasurer,
        data: &CellRenderData,
        context: &RenderingContext,
        bounds: Rect,
    ) -> Option<DrawInstruction> {
        if data.display_text.is_empty() {
            return None;
        }

        let mut text = data.display_text.clone();
        if text.chars().count() > context.max_text_length {
            text = text.chars().take(context.max_text_length).collect();
            text.push('…');
        }

        let rich = context.enable_rich_formatting;
        let format = data.format.as_ref().filter(|_| rich);
        let font_family = format
            .and_then(|f| f.font_family.clone())
            .unwrap_or_else(|| context.font_family.clone());
        let font_size = format
            .and_then(|f| f.font_size)
            .unwrap_or(context.font_size);
        let color = format
            .and_then(|f| f.font_color.clone())
            .unwrap_or_else(|| context.text_color.clone());
        let bold = format.is_some_and(|f| f.bold);
        let italic = format.is_some_and(|f| f.italic);
        let alignment = data
            .format
            .as_ref()
            .and_then(|f| f.alignment)
            .unwrap_or_default();

        let (text_width, text_height) = measurer.measure(&text, &font_family, font_size, bold, italic);

        let x = match alignment {
            CellAlignment::Left => bounds.x + 4,
            CellAlignment::Center => bounds.x + (bounds.width - text_width) / 2,
            CellAlignment::Right => bounds.x + bounds.width - text_width - 4,
        };
        let y = bounds.y + (bounds.height - text_height) / 2;

        let wrap = context.enable_text_wrapping && data.format.as_ref().is_some_and(|f| f.wrap_text);
        let lines = if wrap {
            measurer.wrap(&text, (bounds.width - 8).max(1), &font_family, font_size)
        } else {
            vec![text]
        };

        Some(DrawInstruction::Text {
            lines,
            x,
            y,
            font_family,
            font_size,
            color,
            bold,
            italic,
            alignment,
        })
    }
}
