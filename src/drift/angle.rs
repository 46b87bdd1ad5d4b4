use std::f32::consts::{PI, TAU};

/// Wrap an angular difference into (-π, π] so steering always takes the
/// shorter arc.
///
/// The (-π, π] range holds for finite input only. NaN and ±inf are returned
/// as-is, so callers feeding unchecked values must test the result.
#[inline]
pub fn wrap(mut diff: f32) -> f32 {
    if !diff.is_finite() {
        return diff;
    }

    // Large magnitudes would stall the loops below (x - TAU == x in f32).
    if diff.abs() > 4.0 * TAU {
        diff = diff.rem_euclid(TAU);
    }

    while diff > PI {
        diff -= TAU;
    }
    while diff <= -PI {
        diff += TAU;
    }
    diff
}
