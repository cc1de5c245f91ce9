//! Virtual scroller tests: modes, clamping, physics, and superseding.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use proptest::prelude::*;

use common::{bare_metrics, small_config};
use gridview::config::GridConfig;
use gridview::layout::Viewport;
use gridview::scroll::{ScrollEvent, ScrollMode, VirtualScroller};

fn scroller_with(config: Arc<GridConfig>) -> (Arc<Viewport>, VirtualScroller) {
    let viewport = Arc::new(Viewport::new(
        bare_metrics(800, 600, 100, 25),
        Arc::clone(&config),
    ));
    let scroller = VirtualScroller::new(Arc::clone(&viewport), config);
    (viewport, scroller)
}

fn instant_config(max_rows: u32, max_cols: u32) -> Arc<GridConfig> {
    let mut config = GridConfig::default();
    config.limits.max_rows = max_rows;
    config.limits.max_columns = max_cols;
    config.ui.enable_smooth_scrolling = false;
    Arc::new(config)
}

// =============================================================================
// INSTANT SCROLLING AND CLAMPING
// =============================================================================

#[test]
fn test_scroll_to_instant_updates_viewport() {
    let (viewport, scroller) = scroller_with(small_config(1000, 100));
    scroller.scroll_to(500, 750, ScrollMode::Instant);

    let state = scroller.state();
    assert_eq!((state.position_x, state.position_y), (500, 750));
    assert_eq!(viewport.metrics().scroll_x, 500);
    assert_eq!(viewport.metrics().scroll_y, 750);
}

#[test]
fn test_scroll_targets_clamped() {
    let config = small_config(100, 10); // total 1000x2500 px
    let (viewport, scroller) = scroller_with(Arc::clone(&config));
    let (max_x, max_y) = viewport.max_scroll();

    scroller.scroll_to(-500, -500, ScrollMode::Instant);
    let state = scroller.state();
    assert_eq!((state.position_x, state.position_y), (0, 0));

    scroller.scroll_to(i64::MAX / 4, i64::MAX / 4, ScrollMode::Instant);
    let state = scroller.state();
    assert_eq!((state.position_x, state.position_y), (max_x, max_y));
}

#[test]
fn test_scroll_by_relative() {
    let (_, scroller) = scroller_with(small_config(1000, 100));
    scroller.scroll_to(100, 100, ScrollMode::Instant);
    scroller.scroll_by(50, -25, ScrollMode::Instant);

    let state = scroller.state();
    assert_eq!((state.position_x, state.position_y), (150, 75));
}

#[test]
fn test_scroll_to_cell_centers_target() {
    let (_, scroller) = scroller_with(small_config(1_048_576, 16_384));
    scroller.scroll_to_cell(1000, 0, ScrollMode::Instant);

    let state = scroller.state();
    assert_eq!(state.position_y, 1000 * 25 - 300, "row centered vertically");
    assert_eq!(state.position_x, 0);
}

#[test]
fn test_on_scroll_callback_receives_position() {
    let (_, scroller) = scroller_with(small_config(1000, 100));
    let seen: Arc<Mutex<Vec<(i64, i64)>>> = Arc::new(Mutex::new(Vec::new()));
    let record = Arc::clone(&seen);
    scroller.set_on_scroll(move |x, y| record.lock().push((x, y)));

    scroller.scroll_to(120, 240, ScrollMode::Instant);
    assert_eq!(seen.lock().last().copied(), Some((120, 240)));
}

// =============================================================================
// PAGING, HOME, END
// =============================================================================

#[test]
fn test_paging_steps_by_content_size() {
    let (_, scroller) = scroller_with(instant_config(1000, 100));

    scroller.page_down();
    assert_eq!(scroller.state().position_y, 600);
    scroller.page_down();
    assert_eq!(scroller.state().position_y, 1200);
    scroller.page_up();
    assert_eq!(scroller.state().position_y, 600);

    scroller.page_right();
    assert_eq!(scroller.state().position_x, 800);
    scroller.page_left();
    assert_eq!(scroller.state().position_x, 0);
}

#[test]
fn test_home_and_end() {
    let config = instant_config(1000, 100);
    let (viewport, scroller) = scroller_with(Arc::clone(&config));
    let (max_x, max_y) = viewport.max_scroll();

    scroller.end();
    let state = scroller.state();
    assert_eq!((state.position_x, state.position_y), (max_x, max_y));

    scroller.home();
    let state = scroller.state();
    assert_eq!((state.position_x, state.position_y), (0, 0));
}

// =============================================================================
// SMOOTH ANIMATION
// =============================================================================

#[test]
fn test_smooth_scroll_animates_then_completes() {
    let (_, scroller) = scroller_with(small_config(1000, 100));
    scroller.scroll_to(0, 1000, ScrollMode::Smooth);
    assert!(scroller.is_scrolling());
    assert_eq!(scroller.state().position_y, 0, "no movement before a tick");

    // Mid-animation tick: position is strictly between start and target
    scroller.tick_at(Instant::now() + Duration::from_millis(100));
    let mid = scroller.state().position_y;
    assert!(mid > 0 && mid < 1000, "mid-animation position, got {mid}");

    // Past the duration: lands exactly on target and goes idle
    scroller.tick_at(Instant::now() + Duration::from_secs(1));
    assert_eq!(scroller.state().position_y, 1000);
    assert!(!scroller.is_scrolling());
}

#[test]
fn test_smooth_disabled_falls_back_to_instant() {
    let (_, scroller) = scroller_with(instant_config(1000, 100));
    scroller.scroll_to(0, 500, ScrollMode::Smooth);
    assert_eq!(scroller.state().position_y, 500);
    assert!(!scroller.stats().animation_active);
}

#[test]
fn test_new_command_supersedes_animation() {
    let (_, scroller) = scroller_with(small_config(1000, 100));
    scroller.scroll_to(0, 1000, ScrollMode::Smooth);
    assert!(scroller.stats().animation_active);

    scroller.scroll_to(0, 100, ScrollMode::Instant);
    assert!(!scroller.stats().animation_active, "instant cancels animation");
    assert_eq!(scroller.state().position_y, 100);

    // A tick afterwards must not resume the cancelled animation
    scroller.tick_at(Instant::now() + Duration::from_secs(1));
    assert_eq!(scroller.state().position_y, 100);
}

// =============================================================================
// MOMENTUM
// =============================================================================

#[test]
fn test_wheel_feeds_momentum() {
    let (_, scroller) = scroller_with(small_config(10_000, 100));
    scroller.handle_scroll(ScrollEvent {
        delta_x: 0.0,
        delta_y: 120.0,
        is_wheel: true,
    });

    assert!(scroller.stats().momentum_active);
    assert_eq!(scroller.state().position_y, 0, "momentum applies on ticks");

    scroller.tick_at(Instant::now());
    assert!(scroller.state().position_y > 0);
}

#[test]
fn test_momentum_eventually_idle() {
    let (_, scroller) = scroller_with(small_config(1_000_000, 100));
    scroller.handle_scroll(ScrollEvent {
        delta_x: 0.0,
        delta_y: 500.0,
        is_wheel: true,
    });

    let mut ticks = 0;
    let t0 = Instant::now();
    while scroller.is_scrolling() {
        ticks += 1;
        assert!(ticks < 10_000, "momentum must decay below threshold");
        scroller.tick_at(t0 + Duration::from_millis(16) * ticks);
    }
    assert!(!scroller.stats().momentum_active);
    let state = scroller.state();
    assert_eq!(state.velocity_x, 0.0);
    assert_eq!(state.velocity_y, 0.0);
    assert!(state.position_y > 0, "decay still moved the viewport");
}

proptest! {
    /// Momentum goes idle within a bounded number of ticks for any finite
    /// starting velocity (geometric decay below the minimum threshold).
    #[test]
    fn prop_momentum_bounded(vx in -10_000.0f32..10_000.0, vy in -10_000.0f32..10_000.0) {
        let (_, scroller) = scroller_with(small_config(1_000_000, 100_000));
        scroller.handle_scroll(ScrollEvent { delta_x: vx, delta_y: vy, is_wheel: true });

        let t0 = Instant::now();
        let mut ticks = 0u32;
        while scroller.is_scrolling() && ticks < 1000 {
            ticks += 1;
            scroller.tick_at(t0 + Duration::from_millis(16) * ticks);
        }
        prop_assert!(!scroller.is_scrolling(), "still scrolling after {} ticks", ticks);
    }
}

#[test]
fn test_momentum_disabled_wheel_scrolls_directly() {
    let mut config = GridConfig::default();
    config.limits.max_rows = 10_000;
    config.limits.max_columns = 100;
    config.ui.enable_momentum_scrolling = false;
    let (_, scroller) = scroller_with(Arc::new(config));

    scroller.handle_scroll(ScrollEvent {
        delta_x: 0.0,
        delta_y: 80.0,
        is_wheel: true,
    });
    assert_eq!(scroller.state().position_y, 80);
    assert!(!scroller.stats().momentum_active);
}

#[test]
fn test_scroll_sensitivity_scales_deltas() {
    let mut config = GridConfig::default();
    config.limits.max_rows = 10_000;
    config.limits.max_columns = 100;
    config.ui.scroll_sensitivity = 2.0;
    let (_, scroller) = scroller_with(Arc::new(config));

    scroller.handle_scroll(ScrollEvent {
        delta_x: 10.0,
        delta_y: 20.0,
        is_wheel: false,
    });
    let state = scroller.state();
    assert_eq!((state.position_x, state.position_y), (20, 40));
}

#[test]
fn test_command_supersedes_momentum() {
    let (_, scroller) = scroller_with(small_config(10_000, 100));
    scroller.handle_scroll(ScrollEvent {
        delta_x: 0.0,
        delta_y: 300.0,
        is_wheel: true,
    });
    assert!(scroller.stats().momentum_active);

    scroller.scroll_to(0, 50, ScrollMode::Instant);
    assert!(!scroller.stats().momentum_active, "command supersedes momentum");
    assert_eq!(scroller.state().position_y, 50);
}

#[test]
fn test_momentum_respects_scroll_bounds() {
    // Tiny grid: max scroll is small, momentum must clamp there
    let config = instant_config(30, 10);
    let (viewport, scroller) = scroller_with(Arc::clone(&config));
    let (_, max_y) = viewport.max_scroll();

    scroller.handle_scroll(ScrollEvent {
        delta_x: 0.0,
        delta_y: 10_000.0,
        is_wheel: true,
    });
    let t0 = Instant::now();
    for i in 1..=500u32 {
        scroller.tick_at(t0 + Duration::from_millis(16) * i);
        if !scroller.is_scrolling() {
            break;
        }
    }
    assert_eq!(scroller.state().position_y, max_y);
}

#[test]
fn test_stats_count_events_and_updates() {
    let (_, scroller) = scroller_with(instant_config(1000, 100));
    scroller.handle_scroll(ScrollEvent {
        delta_x: 0.0,
        delta_y: 10.0,
        is_wheel: false,
    });
    scroller.scroll_to(0, 300, ScrollMode::Instant);

    let stats = scroller.stats();
    assert_eq!(stats.scroll_events, 1);
    assert!(stats.update_count >= 2);
}
