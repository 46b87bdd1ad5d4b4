// ==============================================================================
// steering.rs — PROPORTIONAL HEADING CONTROLLER (CHASE THE POINTER)
// ==============================================================================
// Responsibilities:
// - Measure the vector from the vehicle to the chase target
// - Gate everything on the dead zone (target effectively reached)
// - Turn the heading toward the target by a fraction of the wrapped error
// ------------------------------------------------------------------------------
//
//   θ_target = atan2(dy, dx)
//   e        = wrap(θ_target - θ)
//   θ'       = θ + e * k * dt
//
// where:
//        k  = steer_rate (1/s)
//        e  = signed heading error, reused by the throttle stage this frame
//
// This is explicit Euler on a first-order lag: the heading approaches the
// target asymptotically and only overshoots if k * dt > 1 in a single frame.
// ==============================================================================

use crate::drift::angle::wrap;
use crate::drift::types::Vec2;

/// Steering gains (per vehicle)
#[derive(Debug, Clone, Copy)]
pub struct SteeringConfig {
    pub steer_rate: f32, // 1/s
    pub dead_zone: f32,  // units
}

/// Output of one steering solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringSolution {
    pub heading: f32,       // updated heading (radians)
    pub heading_error: f32, // wrapped error measured before the update
    pub distance: f32,      // |target - position|
}

/// Main steering solve.
///
/// Returns `None` when the target lies within the dead zone; the caller must
/// then leave the heading untouched and skip the throttle stage.
pub fn solve_steering(
    config: &SteeringConfig,
    heading: f32,
    position: Vec2,
    target: Vec2,
    dt: f32,
) -> Option<SteeringSolution> {
    let dir = target - position;
    let distance = dir.norm();

    // NaN distance fails this comparison too, which is what we want.
    if !(distance > config.dead_zone) {
        return None;
    }

    let target_angle = dir.y.atan2(dir.x);
    let heading_error = wrap(target_angle - heading);

    Some(SteeringSolution {
        heading: heading + heading_error * config.steer_rate * dt,
        heading_error,
        distance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::{FRAC_PI_2, PI};
    use test_log::test;

    const CFG: SteeringConfig = SteeringConfig {
        steer_rate: 4.0,
        dead_zone: 1.0,
    };

    #[test]
    fn turns_toward_target_proportionally() {
        let s = solve_steering(&CFG, 0.0, Vec2::new(0.0, 0.0), Vec2::new(0.0, 100.0), 0.01)
            .unwrap();
        assert_abs_diff_eq!(s.heading_error, FRAC_PI_2, epsilon = 1e-6);
        assert_abs_diff_eq!(s.heading, FRAC_PI_2 * 4.0 * 0.01, epsilon = 1e-6);
        assert_abs_diff_eq!(s.distance, 100.0);
    }

    #[test]
    fn takes_the_short_way_round() {
        // Heading just below +π, target just above -π: the short arc is positive.
        let heading = PI - 0.1;
        let target = Vec2::new((-PI + 0.1).cos(), (-PI + 0.1).sin()) * 50.0;
        let s = solve_steering(&CFG, heading, Vec2::zeros(), target, 0.016).unwrap();
        assert_abs_diff_eq!(s.heading_error, 0.2, epsilon = 1e-4);
        assert!(s.heading > heading);
    }

    #[test]
    fn dead_zone_skips_the_frame() {
        let p = Vec2::new(400.0, 300.0);
        assert!(solve_steering(&CFG, 0.3, p, p, 0.016).is_none());
        assert!(solve_steering(&CFG, 0.3, p, p + Vec2::new(1.0, 0.0), 0.016).is_none());
        assert!(solve_steering(&CFG, 0.3, p, p + Vec2::new(1.01, 0.0), 0.016).is_some());
    }
}
