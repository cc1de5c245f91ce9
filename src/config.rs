//! Grid configuration.
//!
//! A `GridConfig` is constructed once by the application and passed by
//! reference (`Arc`) into each component's constructor. There is no global
//! configuration registry.

use serde::{Deserialize, Serialize};

/// Hard bounds of the logical grid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GridLimits {
    /// Maximum number of rows.
    pub max_rows: u32,
    /// Maximum number of columns.
    pub max_columns: u32,
}

impl Default for GridLimits {
    fn default() -> Self {
        // Excel-compatible grid bounds
        Self {
            max_rows: 1_048_576,
            max_columns: 16_384,
        }
    }
}

/// User-interface tuning: cell geometry, scrolling behavior, frame pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Base cell width in pixels at 100% zoom.
    pub default_cell_width: i64,
    /// Base cell height in pixels at 100% zoom.
    pub default_cell_height: i64,
    /// Height of the column-header strip in pixels.
    pub header_height: i64,
    /// Width of the row-header strip in pixels.
    pub row_header_width: i64,
    /// Target frame rate for the animation/momentum ticker.
    pub target_fps: u32,
    /// Multiplier applied to incoming scroll deltas.
    pub scroll_sensitivity: f32,
    /// Duration of eased scroll animations in seconds.
    pub animation_duration: f32,
    /// Whether `ScrollMode::Smooth` requests animate (falls back to instant).
    pub enable_smooth_scrolling: bool,
    /// Whether wheel events feed momentum physics.
    pub enable_momentum_scrolling: bool,
    /// Rows of prefetch buffer around the visible range.
    pub viewport_buffer_rows: u32,
    /// Columns of prefetch buffer around the visible range.
    pub viewport_buffer_cols: u32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            default_cell_width: 100,
            default_cell_height: 25,
            header_height: 30,
            row_header_width: 60,
            target_fps: 60,
            scroll_sensitivity: 1.0,
            animation_duration: 0.3,
            enable_smooth_scrolling: true,
            enable_momentum_scrolling: true,
            viewport_buffer_rows: 10,
            viewport_buffer_cols: 5,
        }
    }
}

/// Cache capacities. A capacity of 0 disables the cache.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PerformanceConfig {
    /// Per-coordinate screen position cache in each viewport.
    pub viewport_cache_size: usize,
    /// Cell draw-instruction cache in the renderer.
    pub render_cache_size: usize,
    /// Text measurement cache.
    pub text_cache_size: usize,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            viewport_cache_size: 10_000,
            render_cache_size: 5_000,
            text_cache_size: 10_000,
        }
    }
}

/// Top-level configuration bundle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GridConfig {
    pub limits: GridLimits,
    pub ui: UiConfig,
    pub performance: PerformanceConfig,
}

impl GridConfig {
    /// Minimum zoom factor.
    pub const MIN_ZOOM: f32 = 0.25;
    /// Maximum zoom factor.
    pub const MAX_ZOOM: f32 = 4.0;

    /// Clamp a zoom factor to the supported range. NaN maps to 1.0.
    pub fn clamp_zoom(zoom: f32) -> f32 {
        if zoom.is_nan() {
            return 1.0;
        }
        zoom.clamp(Self::MIN_ZOOM, Self::MAX_ZOOM)
    }
}
