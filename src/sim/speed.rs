//! Simulation speed easing (slow-motion)
//!
//! Speed changes never jump: `current` is nudged toward `goal` at a fixed
//! rate each tick and snapped once it gets within a small epsilon, so the
//! multiplier settles exactly on the goal instead of drifting forever. The
//! eased value scales the clock and the music pitch.

use serde::{Deserialize, Serialize};

use crate::consts::{SPEED_EASE_RATE, SPEED_SNAP_EPSILON};

/// Current and target simulation-speed multipliers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeedState {
    current: f32,
    goal: f32,
}

impl Default for SpeedState {
    fn default() -> Self {
        Self {
            current: 1.0,
            goal: 1.0,
        }
    }
}

impl SpeedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The multiplier consumed by the clock and the music pitch
    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn goal(&self) -> f32 {
        self.goal
    }

    /// Set the target multiplier; `current` starts easing toward it on the
    /// next tick. Callers must pass a positive goal.
    pub fn set_goal(&mut self, goal: f32) {
        debug_assert!(goal > 0.0, "speed goal must be positive");
        self.goal = goal;
    }

    /// Reset to full speed with no easing in flight (level load)
    pub fn reset(&mut self) {
        self.current = 1.0;
        self.goal = 1.0;
    }

    /// Ease `current` toward `goal` by one step. Returns true if the value
    /// moved, so the caller knows to push the new pitch to the audio layer.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.current == self.goal {
            return false;
        }

        let step = SPEED_EASE_RATE * dt.max(0.0);
        let remaining = self.goal - self.current;
        if remaining.abs() <= step.max(SPEED_SNAP_EPSILON) {
            // Close enough - snap exactly, no floating dust
            self.current = self.goal;
        } else {
            self.current += step.copysign(remaining);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use proptest::prelude::*;

    #[test]
    fn test_tick_at_goal_is_noop() {
        let mut speed = SpeedState::new();
        assert!(!speed.tick(SIM_DT));
        assert_eq!(speed.current(), 1.0);
    }

    #[test]
    fn test_converges_exactly_without_overshoot() {
        let mut speed = SpeedState::new();
        speed.set_goal(2.0);

        let mut ticks = 0;
        while speed.current() != 2.0 {
            assert!(speed.tick(SIM_DT));
            assert!(speed.current() <= 2.0);
            ticks += 1;
            assert!(ticks < 10_000, "easing did not converge");
        }
        assert_eq!(speed.current(), 2.0);

        // Settled - no further movement reported
        assert!(!speed.tick(SIM_DT));
    }

    #[test]
    fn test_eases_downward() {
        let mut speed = SpeedState::new();
        speed.set_goal(0.4);
        speed.tick(SIM_DT);
        assert!(speed.current() < 1.0);
        assert!(speed.current() > 0.4);
    }

    #[test]
    fn test_reset_clears_easing_in_flight() {
        let mut speed = SpeedState::new();
        speed.set_goal(0.4);
        speed.tick(SIM_DT);
        speed.reset();
        assert_eq!(speed.current(), 1.0);
        assert_eq!(speed.goal(), 1.0);
        assert!(!speed.tick(SIM_DT));
    }

    proptest! {
        #[test]
        fn prop_easing_converges_and_stays_bounded(goal in 0.1f32..4.0) {
            let mut speed = SpeedState::new();
            speed.set_goal(goal);

            let lo = 1.0f32.min(goal);
            let hi = 1.0f32.max(goal);
            for _ in 0..20_000 {
                if !speed.tick(SIM_DT) {
                    break;
                }
                prop_assert!(speed.current() >= lo - SPEED_SNAP_EPSILON);
                prop_assert!(speed.current() <= hi + SPEED_SNAP_EPSILON);
            }
            prop_assert_eq!(speed.current(), goal);
        }
    }
}
