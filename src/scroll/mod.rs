//! Virtual scrolling: the authoritative scroll position and its physics.
//!
//! The [`VirtualScroller`] owns the scroll state and pushes position updates
//! into its viewport. Three modes are supported per command: instant, a
//! time-boxed eased animation, and momentum decay fed by wheel input. A new
//! command always supersedes whatever is in flight; nothing queues.
//!
//! Animation and momentum advance on [`VirtualScroller::tick`], driven by the
//! [`FrameTicker`] so input handling never blocks on physics.

mod physics;
mod ticker;

pub use physics::Easing;
pub use ticker::FrameTicker;

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use serde::Serialize;

use crate::config::GridConfig;
use crate::layout::{Viewport, ViewportMetrics};
use physics::{Momentum, ScrollAnimation};

/// Per-tick friction factor for momentum decay.
const MOMENTUM_FRICTION: f32 = 0.95;

/// Velocity below which momentum stops (pixels per tick).
const MIN_MOMENTUM_VELOCITY: f32 = 1.0;

/// How a scroll command reaches its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollMode {
    /// Jump directly to the clamped target.
    Instant,
    /// Eased animation over the configured duration.
    #[default]
    Smooth,
    /// Physics-driven decay (wheel input only; commands fall back to instant).
    Momentum,
}

/// A scroll input event.
#[derive(Debug, Clone, Copy)]
pub struct ScrollEvent {
    pub delta_x: f32,
    pub delta_y: f32,
    /// Wheel events feed momentum when enabled; drag events apply directly.
    pub is_wheel: bool,
}

/// Current scroll state. Owned exclusively by the scroller.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScrollState {
    pub position_x: i64,
    pub position_y: i64,
    pub velocity_x: f32,
    pub velocity_y: f32,
    pub is_scrolling: bool,
}

/// Scroller diagnostics.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScrollerStats {
    pub scroll_events: u64,
    pub update_count: u64,
    pub ticks: u64,
    pub current_fps: f32,
    pub is_scrolling: bool,
    pub animation_active: bool,
    pub momentum_active: bool,
    pub max_scroll_x: i64,
    pub max_scroll_y: i64,
}

type ScrollCallback = Arc<dyn Fn(i64, i64) + Send + Sync>;

struct ScrollerInner {
    state: ScrollState,
    animation: ScrollAnimation,
    momentum: Momentum,
    scroll_events: u64,
    update_count: u64,
    ticks: u64,
    fps_window_start: Option<Instant>,
    fps_frames: u32,
    current_fps: f32,
}

/// Owns the authoritative scroll position; applies deltas, animations, and
/// momentum; publishes updates to the viewport and a registered callback.
pub struct VirtualScroller {
    viewport: Arc<Viewport>,
    config: Arc<GridConfig>,
    inner: Mutex<ScrollerInner>,
    on_scroll: Mutex<Option<ScrollCallback>>,
}

impl VirtualScroller {
    /// Create a scroller driving the given viewport.
    pub fn new(viewport: Arc<Viewport>, config: Arc<GridConfig>) -> Self {
        let metrics = viewport.metrics();
        let animation = ScrollAnimation::new(config.ui.animation_duration, Easing::EaseOut);
        Self {
            viewport,
            config,
            inner: Mutex::new(ScrollerInner {
                state: ScrollState {
                    position_x: metrics.scroll_x,
                    position_y: metrics.scroll_y,
                    velocity_x: 0.0,
                    velocity_y: 0.0,
                    is_scrolling: false,
                },
                animation,
                momentum: Momentum::new(MOMENTUM_FRICTION, MIN_MOMENTUM_VELOCITY),
                scroll_events: 0,
                update_count: 0,
                ticks: 0,
                fps_window_start: None,
                fps_frames: 0,
                current_fps: 0.0,
            }),
            on_scroll: Mutex::new(None),
        }
    }

    /// Register the position-update callback (e.g. the viewport manager).
    pub fn set_on_scroll(&self, callback: impl Fn(i64, i64) + Send + Sync + 'static) {
        *self.on_scroll.lock() = Some(Arc::new(callback));
    }

    /// Snapshot of the scroll state.
    pub fn state(&self) -> ScrollState {
        self.inner.lock().state
    }

    /// Whether an animation or momentum decay is in flight.
    pub fn is_scrolling(&self) -> bool {
        self.inner.lock().state.is_scrolling
    }

    /// Handle a scroll input event. Wheel events feed momentum when enabled;
    /// everything else scrolls directly.
    pub fn handle_scroll(&self, event: ScrollEvent) {
        let dx = event.delta_x * self.config.ui.scroll_sensitivity;
        let dy = event.delta_y * self.config.ui.scroll_sensitivity;

        let direct_target = {
            let mut inner = self.inner.lock();
            inner.scroll_events += 1;
            inner.state.is_scrolling = true;

            if event.is_wheel && self.config.ui.enable_momentum_scrolling {
                // Wheel input supersedes any in-flight animation
                inner.animation.stop();
                inner.momentum.add_velocity(dx, dy);
                inner.state.velocity_x += dx;
                inner.state.velocity_y += dy;
                None
            } else {
                inner.momentum.stop();
                inner.animation.stop();
                Some((
                    inner.state.position_x + dx.round() as i64,
                    inner.state.position_y + dy.round() as i64,
                ))
            }
        };

        if let Some((x, y)) = direct_target {
            self.apply_position(x, y);
        }
    }

    /// Scroll to an absolute position, clamped to the valid range.
    pub fn scroll_to(&self, x: i64, y: i64, mode: ScrollMode) {
        let (max_x, max_y) = self.viewport.max_scroll();
        let target = (x.clamp(0, max_x), y.clamp(0, max_y));

        let smooth = mode == ScrollMode::Smooth && self.config.ui.enable_smooth_scrolling;
        if smooth {
            let mut inner = self.inner.lock();
            let current = (inner.state.position_x, inner.state.position_y);
            inner.momentum.stop();
            inner.state.velocity_x = 0.0;
            inner.state.velocity_y = 0.0;
            inner.animation.start(Instant::now(), current, target);
            inner.state.is_scrolling = true;
        } else {
            {
                let mut inner = self.inner.lock();
                inner.momentum.stop();
                inner.animation.stop();
                inner.state.velocity_x = 0.0;
                inner.state.velocity_y = 0.0;
            }
            self.apply_position(target.0, target.1);
        }
    }

    /// Scroll by a relative amount.
    pub fn scroll_by(&self, delta_x: i64, delta_y: i64, mode: ScrollMode) {
        let state = self.state();
        self.scroll_to(state.position_x + delta_x, state.position_y + delta_y, mode);
    }

    /// Scroll so the given cell is centered in the pane.
    pub fn scroll_to_cell(&self, row: u32, col: u32, mode: ScrollMode) {
        let metrics = self.viewport.metrics();
        let limits = &self.config.limits;
        let row = row.min(limits.max_rows.saturating_sub(1));
        let col = col.min(limits.max_columns.saturating_sub(1));

        let center_x = i64::from(col) * metrics.cell_width - metrics.content_width() / 2;
        let center_y = i64::from(row) * metrics.cell_height - metrics.content_height() / 2;
        self.scroll_to(center_x, center_y, mode);
    }

    /// Scroll up by one content height.
    pub fn page_up(&self) {
        let step = self.viewport.metrics().content_height();
        self.scroll_by(0, -step, ScrollMode::Smooth);
    }

    /// Scroll down by one content height.
    pub fn page_down(&self) {
        let step = self.viewport.metrics().content_height();
        self.scroll_by(0, step, ScrollMode::Smooth);
    }

    /// Scroll left by one content width.
    pub fn page_left(&self) {
        let step = self.viewport.metrics().content_width();
        self.scroll_by(-step, 0, ScrollMode::Smooth);
    }

    /// Scroll right by one content width.
    pub fn page_right(&self) {
        let step = self.viewport.metrics().content_width();
        self.scroll_by(step, 0, ScrollMode::Smooth);
    }

    /// Scroll to the top-left corner.
    pub fn home(&self) {
        self.scroll_to(0, 0, ScrollMode::Smooth);
    }

    /// Scroll to the bottom-right corner.
    pub fn end(&self) {
        let (max_x, max_y) = self.viewport.max_scroll();
        self.scroll_to(max_x, max_y, ScrollMode::Smooth);
    }

    /// Advance animation and momentum physics one frame.
    pub fn tick(&self) {
        self.tick_at(Instant::now());
    }

    /// Advance physics using an explicit timestamp (deterministic testing).
    pub fn tick_at(&self, now: Instant) {
        let new_position = {
            let mut inner = self.inner.lock();
            inner.ticks += 1;
            Self::track_fps(&mut inner, now);

            let mut new_position: Option<(i64, i64)> = None;

            if inner.animation.is_active() {
                let (position, _complete) = inner.animation.sample(now);
                new_position = Some(position);
            }

            if inner.momentum.is_active() {
                match inner.momentum.step() {
                    Some((vx, vy)) => {
                        let base = new_position
                            .unwrap_or((inner.state.position_x, inner.state.position_y));
                        new_position =
                            Some((base.0 + vx.round() as i64, base.1 + vy.round() as i64));
                        inner.state.velocity_x = vx;
                        inner.state.velocity_y = vy;
                    }
                    None => {
                        inner.state.velocity_x = 0.0;
                        inner.state.velocity_y = 0.0;
                    }
                }
            }

            // Scrolling is whatever physics remains in flight after this step
            inner.state.is_scrolling =
                inner.animation.is_active() || inner.momentum.is_active();

            new_position
        };

        if let Some((x, y)) = new_position {
            self.apply_position(x, y);
        }
    }

    /// Clamp and store a new position, then publish it to the viewport and
    /// the registered callback. Locks are released before publishing so no
    /// component lock is held across another's.
    fn apply_position(&self, x: i64, y: i64) {
        let (max_x, max_y) = self.viewport.max_scroll();
        let x = x.clamp(0, max_x);
        let y = y.clamp(0, max_y);

        let changed = {
            let mut inner = self.inner.lock();
            let changed = x != inner.state.position_x || y != inner.state.position_y;
            inner.state.position_x = x;
            inner.state.position_y = y;
            if changed {
                inner.update_count += 1;
            }
            changed
        };

        if changed {
            let metrics = ViewportMetrics {
                scroll_x: x,
                scroll_y: y,
                ..self.viewport.metrics()
            };
            self.viewport.update_metrics(metrics);

            let callback = self.on_scroll.lock().clone();
            if let Some(callback) = callback {
                callback(x, y);
            }
        }
    }

    fn track_fps(inner: &mut ScrollerInner, now: Instant) {
        inner.fps_frames += 1;
        match inner.fps_window_start {
            None => inner.fps_window_start = Some(now),
            Some(start) => {
                let elapsed = now.saturating_duration_since(start).as_secs_f32();
                if elapsed >= 1.0 {
                    inner.current_fps = inner.fps_frames as f32 / elapsed;
                    inner.fps_frames = 0;
                    inner.fps_window_start = Some(now);
                }
            }
        }
    }

    /// Diagnostics counters.
    pub fn stats(&self) -> ScrollerStats {
        let (max_x, max_y) = self.viewport.max_scroll();
        let inner = self.inner.lock();
        ScrollerStats {
            scroll_events: inner.scroll_events,
            update_count: inner.update_count,
            ticks: inner.ticks,
            current_fps: inner.current_fps,
            is_scrolling: inner.state.is_scrolling,
            animation_active: inner.animation.is_active(),
            momentum_active: inner.momentum.is_active(),
            max_scroll_x: max_x,
            max_scroll_y: max_y,
        }
    }
}
