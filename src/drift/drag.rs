// ==============================================================================
// drag.rs — LINEAR DRAG + SPEED LIMIT
// ------------------------------------------------------------------------------
// v -= v * drag * dt   (first-order, frame-rate dependent at coarse dt)
// |v| <= max_speed     (rescaled, direction preserved)
// ==============================================================================

use crate::drift::types::Vec2;

#[inline]
pub fn apply_drag(velocity: &mut Vec2, drag: f32, dt: f32) {
    *velocity -= *velocity * (drag * dt);
}

/// Clamp the speed to `max_speed`. Returns true when the velocity was rescaled.
pub fn limit_speed(velocity: &mut Vec2, max_speed: f32) -> bool {
    let speed = velocity.norm();
    if speed > max_speed {
        *velocity *= max_speed / speed;
        // Rounding can leave the norm a few ulps above the limit.
        while velocity.norm() > max_speed {
            *velocity *= 1.0 - f32::EPSILON;
        }
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::{Rng, SeedableRng, rngs::StdRng};
    use test_log::test;

    #[test]
    fn drag_removes_a_fraction() {
        let mut v = Vec2::new(100.0, -50.0);
        apply_drag(&mut v, 0.04, 0.5);
        assert_abs_diff_eq!(v.x, 98.0, epsilon = 1e-4);
        assert_abs_diff_eq!(v.y, -49.0, epsilon = 1e-4);
    }

    #[test]
    fn limiter_preserves_direction() {
        let mut v = Vec2::new(3000.0, 4000.0);
        assert!(limit_speed(&mut v, 650.0));
        assert_abs_diff_eq!(v.x, 390.0, epsilon = 1e-3);
        assert_abs_diff_eq!(v.y, 520.0, epsilon = 1e-3);

        let mut slow = Vec2::new(10.0, 0.0);
        assert!(!limit_speed(&mut slow, 650.0));
        assert_eq!(slow, Vec2::new(10.0, 0.0));
    }

    #[test]
    fn speed_never_exceeds_limit() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..5_000 {
            let mut v = Vec2::new(rng.gen_range(-1.0e5..1.0e5), rng.gen_range(-1.0e5..1.0e5));
            let max = rng.gen_range(1.0..2_000.0);
            apply_drag(&mut v, 0.04, rng.gen_range(0.0..0.1));
            limit_speed(&mut v, max);
            assert!(v.norm() <= max, "{} > {max}", v.norm());
        }
    }
}
