//! Angle and scalar helpers shared by steering and rendering queries.

use aquarium_data::Vec2;
use std::f64::consts::{PI, TAU};

/// Axis-aligned rectangle used for movement limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Rect {
    #[must_use]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    #[must_use]
    pub fn clamp(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x.clamp(self.min_x, self.max_x.max(self.min_x)),
            p.y.clamp(self.min_y, self.max_y.max(self.min_y)),
        )
    }

    /// Shrinks by `margin` on every side, or returns `self` if that inverts it.
    #[must_use]
    pub fn inset(&self, margin: f64) -> Rect {
        let inner = Rect {
            min_x: self.min_x + margin,
            max_x: self.max_x - margin,
            min_y: self.min_y + margin,
            max_y: self.max_y - margin,
        };
        if inner.min_x > inner.max_x || inner.min_y > inner.max_y {
            *self
        } else {
            inner
        }
    }
}

/// Unit vector towards `to`, or zero when the points coincide.
#[must_use]
pub fn direction(from: Vec2, to: Vec2) -> Vec2 {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let len = dx.hypot(dy);
    if len <= f64::EPSILON {
        Vec2::default()
    } else {
        Vec2::new(dx / len, dy / len)
    }
}

/// Wraps an angle into `(-π, π]`.
#[must_use]
pub fn normalize_angle(angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    let mut out = angle % TAU;
    if out <= -PI {
        out += TAU;
    } else if out > PI {
        out -= TAU;
    }
    out
}

#[must_use]
pub fn shortest_angle_delta(from: f64, to: f64) -> f64 {
    normalize_angle(to - from)
}

/// Rotates `current` towards `target` by at most `max_step` radians.
#[must_use]
pub fn move_towards_angle(current: f64, target: f64, max_step: f64) -> f64 {
    let delta = shortest_angle_delta(current, target);
    if delta.abs() <= max_step {
        return normalize_angle(target);
    }
    normalize_angle(current + delta.signum() * max_step)
}

/// Facing flips only once the heading has clearly crossed the vertical.
#[must_use]
pub fn resolve_facing_by_cos(angle: f64, previous: i8, switch_cos: f64) -> i8 {
    let c = angle.cos();
    if c > switch_cos {
        1
    } else if c < -switch_cos {
        -1
    } else {
        previous
    }
}

/// Limits an angle to `max_tilt` around the horizontal for the given facing.
#[must_use]
pub fn clamp_angle_for_facing(angle: f64, facing: i8, max_tilt: f64) -> f64 {
    let base = if facing == -1 { PI } else { 0.0 };
    let relative = normalize_angle(angle - base);
    normalize_angle(base + relative.clamp(-max_tilt, max_tilt))
}

#[must_use]
pub fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

#[must_use]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Smoothstep easing.
#[must_use]
pub fn ease_in_out(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}
