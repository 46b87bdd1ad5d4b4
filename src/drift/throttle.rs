// ==============================================================================
// throttle.rs — THROTTLE + PROXIMITY BRAKE (VELOCITY DOMAIN)
// ==============================================================================
// Computes the forward push and the braking drag for one frame:
// 1) Throttle ramps with distance: clamp(d / throttle_zone, 0, 1)
// 2) Alignment gate: max(cos(e), 0), so there is no thrust while the heading
//    error exceeds ±90°
// 3) Brake ramps in linearly inside brake_zone, maximal at distance 0
//
// Only runs on frames where steering ran (distance above the dead zone).
//
// Output:
// - velocity is mutated in place
// - ThrottleResult { throttle, brake } for the step report
// ==============================================================================

use crate::drift::config::SimulationConfig;
use crate::drift::types::Vec2;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ThrottleResult {
    pub throttle: f32, // 0..1, after alignment
    pub brake: f32,    // 0..1 brake intensity
}

#[inline]
pub fn throttle_ramp(distance: f32, throttle_zone: f32) -> f32 {
    (distance / throttle_zone).clamp(0.0, 1.0)
}

#[inline]
pub fn alignment(heading_error: f32) -> f32 {
    heading_error.cos().max(0.0)
}

/// Brake intensity in 0..1, or 0 outside the zone.
#[inline]
pub fn brake_intensity(distance: f32, brake_zone: f32) -> f32 {
    if distance < brake_zone {
        (brake_zone - distance) / brake_zone
    } else {
        0.0
    }
}

pub fn apply_throttle(
    cfg: &SimulationConfig,
    velocity: &mut Vec2,
    forward: Vec2,
    distance: f32,
    heading_error: f32,
    dt: f32,
) -> ThrottleResult {
    // -------------------------
    // ENGINE
    // -------------------------
    let throttle = throttle_ramp(distance, cfg.throttle_zone) * alignment(heading_error);
    *velocity += forward * (cfg.acceleration * throttle * dt);

    // -------------------------
    // BRAKE
    // -------------------------
    // Opposes current motion, never pushes.
    let brake = brake_intensity(distance, cfg.brake_zone);
    if brake > 0.0 {
        let strength = cfg.max_brake_rate * brake;
        *velocity -= *velocity * (strength * dt);
    }

    ThrottleResult { throttle, brake }
}
