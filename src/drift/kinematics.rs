// ==============================================================================
// kinematics.rs — FORWARD / LATERAL DECOMPOSITION + GRIP (DRIFT SIGNAL)
// ------------------------------------------------------------------------------
// Splits the chassis velocity against the heading basis:
//
//     v_fwd = dot(v, forward)
//     v_lat = v - forward * v_fwd
//
// then removes a fixed fraction of the lateral part every frame:
//
//     v_lat -= v_lat * grip
//     v      = forward * v_fwd + v_lat
//
// grip is a damping fraction, not a cap: 0 keeps all sideways momentum (pure
// drift), 1 kills it every frame (rails). |v_lat| after grip is the drift
// magnitude consumed by trail.rs.
// ==============================================================================

use crate::drift::types::{Vec2, forward_of};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlipComponents {
    pub forward_speed: f32,
    pub lateral: Vec2,
}

impl SlipComponents {
    #[inline]
    pub fn drift_magnitude(&self) -> f32 {
        self.lateral.norm()
    }
}

/// Project a velocity onto the heading basis.
#[inline]
pub fn slip_components(velocity: Vec2, forward: Vec2) -> SlipComponents {
    let forward_speed = velocity.dot(&forward);
    SlipComponents {
        forward_speed,
        lateral: velocity - forward * forward_speed,
    }
}

/// Decay the lateral component by `grip` and rebuild the velocity.
/// Returns the post-grip split.
pub fn apply_grip(velocity: &mut Vec2, heading: f32, grip: f32) -> SlipComponents {
    let forward = forward_of(heading);
    let mut slip = slip_components(*velocity, forward);

    slip.lateral -= slip.lateral * grip;
    *velocity = forward * slip.forward_speed + slip.lateral;

    slip
}
