// ==============================================================================
// solve.rs — PER-FRAME DRIFT SOLVER (ORCHESTRATION + INTEGRATION)
// ==============================================================================
// Runs the pipeline once per frame, in this order:
//
//   1) steering.rs   heading toward the target        (skipped in dead zone)
//   2) throttle.rs   engine push + proximity brake    (skipped in dead zone)
//   3) drag.rs       linear drag, then speed clamp
//   4) kinematics.rs forward/lateral split + grip     -> drift magnitude
//   5) trail.rs      time-gated tire marks            (pre-integration pose)
//   6) integrate     position += velocity * dt
//
// The solver owns no state of its own: the vehicle and the trail are passed in
// and mutated, the config is read-only. StepReport describes what happened so
// callers can log or stream it without re-deriving anything.
// ==============================================================================

use crate::drift::config::SimulationConfig;
use crate::drift::drag::{apply_drag, limit_speed};
use crate::drift::kinematics::apply_grip;
use crate::drift::steering::{SteeringConfig, solve_steering};
use crate::drift::throttle::{ThrottleResult, apply_throttle};
use crate::drift::trail::{TireMarkSegment, TireMarkTrail, TrailMode};
use crate::drift::types::{Vec2, VehicleState, forward_of};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    pub steered: bool,
    pub heading_error: f32,
    pub distance: f32,
    pub throttle: ThrottleResult,
    pub speed_clamped: bool,
    pub drift: f32,
    pub mode: TrailMode,
    pub emitted: Option<TireMarkSegment>,
}

impl StepReport {
    fn idle(mode: TrailMode) -> Self {
        Self {
            steered: false,
            heading_error: 0.0,
            distance: 0.0,
            throttle: ThrottleResult::default(),
            speed_clamped: false,
            drift: 0.0,
            mode,
            emitted: None,
        }
    }
}

#[inline]
pub fn integrate(state: &mut VehicleState, dt: f32) {
    state.position += state.velocity * dt;
}

/// Advance `state` and `trail` by one frame of `dt` seconds chasing `target`.
///
/// A non-positive or non-finite `dt` leaves everything untouched.
pub fn step(
    cfg: &SimulationConfig,
    state: &mut VehicleState,
    trail: &mut TireMarkTrail,
    target: Vec2,
    dt: f32,
) -> StepReport {
    if !(dt > 0.0) || !dt.is_finite() {
        return StepReport::idle(trail.mode());
    }

    let mut report = StepReport::idle(trail.mode());

    // --------------------------------------------------
    // 1) + 2) Steering and throttle
    // --------------------------------------------------
    let steer_cfg = SteeringConfig {
        steer_rate: cfg.steer_rate,
        dead_zone: cfg.target_dead_zone,
    };

    if let Some(steer) = solve_steering(&steer_cfg, state.heading, state.position, target, dt) {
        state.heading = steer.heading;

        // Thrust follows the freshly updated heading.
        report.throttle = apply_throttle(
            cfg,
            &mut state.velocity,
            forward_of(state.heading),
            steer.distance,
            steer.heading_error,
            dt,
        );
        report.steered = true;
        report.heading_error = steer.heading_error;
        report.distance = steer.distance;
    } else {
        report.distance = (target - state.position).norm();
    }

    // --------------------------------------------------
    // 3) Drag + speed limit
    // --------------------------------------------------
    apply_drag(&mut state.velocity, cfg.drag, dt);
    report.speed_clamped = limit_speed(&mut state.velocity, cfg.max_speed);

    // --------------------------------------------------
    // 4) Drift decomposition
    // --------------------------------------------------
    let slip = apply_grip(&mut state.velocity, state.heading, cfg.grip);
    report.drift = slip.drift_magnitude();

    // --------------------------------------------------
    // 5) Tire marks
    // --------------------------------------------------
    report.emitted = trail.update(cfg, report.drift, state.position, state.heading, dt);
    report.mode = trail.mode();

    // --------------------------------------------------
    // 6) Integrate
    // --------------------------------------------------
    integrate(state, dt);

    report
}
