//! Angle helpers and the per-tick state of the easing tasks

use crate::host::Vec2;
use bml_compiler::ast::NodeType;
use bml_compiler::config::compile_time::runtime::DEGENERATE_DURATION_EPSILON;
use std::f32::consts::{PI, TAU};

/// Wrap an angle into (-π, π]
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Map an angle into [0, 2π)
pub fn normalize_direction(angle: f32) -> f32 {
    let normalized = angle.rem_euclid(TAU);
    // rem_euclid rounds tiny negative inputs up to TAU
    if normalized >= TAU {
        0.0
    } else {
        normalized
    }
}

/// Direction from `from` towards `to`: 0 is up, clockwise positive
pub fn aim_direction(from: Vec2, to: Vec2) -> f32 {
    (to.x - from.x).atan2(-(to.y - from.y))
}

/// Durations too close to zero count as a single tick
pub(crate) fn effective_duration(duration: f32) -> f32 {
    if duration.abs() < DEGENERATE_DURATION_EPSILON {
        1.0
    } else {
        duration
    }
}

/// Per-tick change of an absolute/relative/sequence target
fn per_tick(policy: NodeType, value: f32, current: f32, duration: f32) -> f32 {
    match policy {
        NodeType::Sequence => value,
        NodeType::Relative => value / duration,
        _ => (value - current) / duration,
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct DirectionChange {
    policy: NodeType,
    /// Target in radians; only absolute targets are re-read every tick
    target: f32,
    delta: f32,
    duration: f32,
    elapsed: f32,
}

impl DirectionChange {
    /// `value` in degrees; `None` when the task names no direction
    pub(crate) fn new(
        policy: NodeType,
        value: Option<f32>,
        duration: f32,
        current: f32,
        aim: impl FnOnce() -> f32,
    ) -> Self {
        let duration = effective_duration(duration);
        let Some(degrees) = value else {
            return Self {
                policy: NodeType::Sequence,
                duration,
                ..Self::default()
            };
        };

        let target = degrees.to_radians();
        let delta = match policy {
            NodeType::Sequence => wrap_angle(target),
            NodeType::Relative => wrap_angle(target) / duration,
            NodeType::Absolute => 0.0,
            NodeType::Aim | NodeType::None => wrap_angle(target + aim() - current) / duration,
        };

        Self {
            policy,
            target,
            delta,
            duration,
            elapsed: 0.0,
        }
    }

    /// Advance one tick; returns the new direction and whether the change is done
    pub(crate) fn step(&mut self, current: f32, time_scale: f32) -> (f32, bool) {
        let delta = match self.policy {
            NodeType::Absolute => {
                let remaining = (self.duration - self.elapsed).max(1.0);
                wrap_angle(self.target - current) / remaining
            }
            _ => self.delta,
        };
        self.elapsed += time_scale;
        (normalize_direction(current + delta), self.duration <= self.elapsed)
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct SpeedChange {
    delta: f32,
    remaining: f32,
}

impl SpeedChange {
    pub(crate) fn new(policy: NodeType, value: Option<f32>, duration: f32, current: f32) -> Self {
        let duration = effective_duration(duration);
        Self {
            delta: value.map_or(0.0, |value| per_tick(policy, value, current, duration)),
            remaining: duration,
        }
    }

    pub(crate) fn step(&mut self, current: f32, time_scale: f32) -> (f32, bool) {
        self.remaining -= time_scale;
        (current + self.delta, self.remaining <= 0.0)
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct AccelChange {
    delta: Vec2,
    remaining: f32,
}

impl AccelChange {
    /// Each axis is `(policy, value)`; a missing axis does not change
    pub(crate) fn new(
        horizontal: Option<(NodeType, f32)>,
        vertical: Option<(NodeType, f32)>,
        duration: f32,
        current: Vec2,
    ) -> Self {
        let duration = effective_duration(duration);
        let axis = |component: Option<(NodeType, f32)>, current: f32| {
            component.map_or(0.0, |(policy, value)| per_tick(policy, value, current, duration))
        };
        Self {
            delta: Vec2::new(axis(horizontal, current.x), axis(vertical, current.y)),
            remaining: duration,
        }
    }

    pub(crate) fn step(&mut self, current: Vec2, time_scale: f32) -> (Vec2, bool) {
        self.remaining -= time_scale;
        (current + self.delta, self.remaining <= 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_wrap_angle_range() {
        assert!(close(wrap_angle(0.0), 0.0));
        assert!(close(wrap_angle(PI), PI));
        assert!(close(wrap_angle(-PI), PI));
        assert!(close(wrap_angle(3.0 * PI / 2.0), -PI / 2.0));
        assert!(close(wrap_angle(-3.0 * PI / 2.0), PI / 2.0));
        assert!(close(wrap_angle(5.0 * TAU + 0.5), 0.5));
    }

    #[test]
    fn test_normalize_direction_range() {
        assert!(close(normalize_direction(-PI / 2.0), 3.0 * PI / 2.0));
        assert!(close(normalize_direction(TAU), 0.0));
        let tiny = normalize_direction(-1e-9);
        assert!((0.0..TAU).contains(&tiny));
    }

    #[test]
    fn test_aim_direction_axes() {
        let origin = Vec2::ZERO;
        assert!(close(aim_direction(origin, Vec2::new(0.0, -10.0)), 0.0));
        assert!(close(aim_direction(origin, Vec2::new(10.0, 0.0)), PI / 2.0));
        assert!(close(aim_direction(origin, Vec2::new(0.0, 10.0)).abs(), PI));
        assert!(close(aim_direction(origin, Vec2::new(-10.0, 0.0)), -PI / 2.0));
    }

    #[test]
    fn test_degenerate_duration_is_one_tick() {
        assert_eq!(effective_duration(0.0), 1.0);
        assert_eq!(effective_duration(0.005), 1.0);
        assert_eq!(effective_duration(30.0), 30.0);
    }

    #[test]
    fn test_direction_change_takes_short_way() {
        // 350° to 10° is +20°, not -340°
        let current = 350f32.to_radians();
        let mut change = DirectionChange::new(NodeType::Absolute, Some(10.0), 2.0, current, || 0.0);

        let (after_one, done) = change.step(current, 1.0);
        assert!(!done);
        assert!(close(wrap_angle(after_one), 0.0));

        let (after_two, done) = change.step(after_one, 1.0);
        assert!(done);
        assert!(close(after_two, 10f32.to_radians()));
    }

    #[test]
    fn test_relative_direction_change_is_fixed() {
        let mut change = DirectionChange::new(NodeType::Relative, Some(90.0), 3.0, 0.0, || 0.0);
        let mut direction = 0.0;
        for _ in 0..3 {
            direction = change.step(direction, 1.0).0;
        }
        assert!(close(direction, PI / 2.0));
    }

    #[test]
    fn test_aimed_direction_change() {
        let mut change = DirectionChange::new(NodeType::Aim, Some(0.0), 1.0, 0.0, || PI / 2.0);
        let (direction, done) = change.step(0.0, 1.0);
        assert!(done);
        assert!(close(direction, PI / 2.0));
    }

    #[test]
    fn test_speed_change_policies() {
        let mut absolute = SpeedChange::new(NodeType::Absolute, Some(4.0), 2.0, 2.0);
        let (speed, done) = absolute.step(2.0, 1.0);
        assert!(close(speed, 3.0) && !done);
        let (speed, done) = absolute.step(speed, 1.0);
        assert!(close(speed, 4.0) && done);

        let mut relative = SpeedChange::new(NodeType::Relative, Some(4.0), 2.0, 2.0);
        assert!(close(relative.step(2.0, 1.0).0, 4.0));

        let mut sequence = SpeedChange::new(NodeType::Sequence, Some(0.5), 2.0, 2.0);
        assert!(close(sequence.step(2.0, 1.0).0, 2.5));
    }

    #[test]
    fn test_accel_leaves_missing_axis() {
        let mut accel =
            AccelChange::new(Some((NodeType::Absolute, 2.0)), None, 0.0, Vec2::new(0.0, 1.0));
        let (acceleration, done) = accel.step(Vec2::new(0.0, 1.0), 1.0);
        assert!(done);
        assert_eq!(acceleration, Vec2::new(2.0, 1.0));
    }
}
