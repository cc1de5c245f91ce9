//! Scroll physics: eased animations and momentum decay.

use std::time::{Duration, Instant};

/// Easing curve applied to animated scrolls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    /// Cubic ease-out: fast start, gentle stop.
    #[default]
    EaseOut,
    /// Cubic ease-in: gentle start, fast stop.
    EaseIn,
    /// Cubic ease-in-out.
    EaseInOut,
}

impl Easing {
    /// Transform linear progress `t` in `[0, 1]`.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::EaseOut => 1.0 - (1.0 - t).powi(3),
            Easing::EaseIn => t.powi(3),
            Easing::EaseInOut => {
                if t < 0.5 {
                    4.0 * t.powi(3)
                } else {
                    1.0 - 4.0 * (1.0 - t).powi(3)
                }
            }
        }
    }
}

/// A time-boxed eased interpolation between two scroll positions.
#[derive(Debug)]
pub(crate) struct ScrollAnimation {
    duration: Duration,
    easing: Easing,
    started_at: Option<Instant>,
    start: (i64, i64),
    target: (i64, i64),
    active: bool,
}

impl ScrollAnimation {
    /// Create an animation profile. Non-positive or non-finite durations are
    /// clamped to zero (the animation completes on its first sample).
    pub fn new(duration_secs: f32, easing: Easing) -> Self {
        let secs = if duration_secs.is_finite() {
            duration_secs.clamp(0.0, 60.0)
        } else {
            0.0
        };
        Self {
            duration: Duration::from_secs_f32(secs),
            easing,
            started_at: None,
            start: (0, 0),
            target: (0, 0),
            active: false,
        }
    }

    /// Begin animating from `start` to `target`.
    pub fn start(&mut self, now: Instant, start: (i64, i64), target: (i64, i64)) {
        self.started_at = Some(now);
        self.start = start;
        self.target = target;
        self.active = true;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Sample the position at `now`. Returns the interpolated position and
    /// whether the animation just completed (deactivating it).
    pub fn sample(&mut self, now: Instant) -> ((i64, i64), bool) {
        let Some(started_at) = self.started_at else {
            return (self.target, true);
        };
        if !self.active {
            return (self.target, true);
        }

        let elapsed = now.saturating_duration_since(started_at);
        let progress = if self.duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
        };
        let eased = self.easing.apply(progress);

        let interp = |from: i64, to: i64| from + ((to - from) as f32 * eased).round() as i64;
        let complete = progress >= 1.0;
        let position = if complete {
            self.active = false;
            self.target
        } else {
            (
                interp(self.start.0, self.target.0),
                interp(self.start.1, self.target.1),
            )
        };
        (position, complete)
    }

    pub fn stop(&mut self) {
        self.active = false;
    }
}

/// Momentum decay: velocity accumulated from input, multiplied by a friction
/// factor each tick until it drops below a minimum threshold.
#[derive(Debug)]
pub(crate) struct Momentum {
    friction: f32,
    min_velocity: f32,
    velocity: (f32, f32),
    active: bool,
}

impl Momentum {
    /// Create a momentum model. Friction outside `(0, 1)` is clamped so the
    /// decay is always geometric and terminating.
    pub fn new(friction: f32, min_velocity: f32) -> Self {
        let friction = if friction.is_finite() {
            friction.clamp(0.0, 0.999)
        } else {
            0.95
        };
        Self {
            friction,
            min_velocity: min_velocity.abs().max(f32::EPSILON),
            velocity: (0.0, 0.0),
            active: false,
        }
    }

    /// Accumulate velocity from an input gesture.
    pub fn add_velocity(&mut self, dx: f32, dy: f32) {
        self.velocity.0 += dx;
        self.velocity.1 += dy;
        self.active = true;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Advance one tick. Returns the decayed velocity, or `None` once both
    /// axes have fallen below the minimum (deactivating).
    pub fn step(&mut self) -> Option<(f32, f32)> {
        if !self.active {
            return None;
        }
        self.velocity.0 *= self.friction;
        self.velocity.1 *= self.friction;

        if self.velocity.0.abs() < self.min_velocity && self.velocity.1.abs() < self.min_velocity {
            self.velocity = (0.0, 0.0);
            self.active = false;
            return None;
        }
        Some(self.velocity)
    }

    pub fn stop(&mut self) {
        self.velocity = (0.0, 0.0);
        self.active = false;
    }
}
