// src/physics.rs

use tracing::{debug, trace, warn};

use crate::assets::SpriteHandle;
use crate::drift::{
    SimulationConfig, StepReport, TireMarkTrail, Vec2, VehicleState, step, vec2,
};
use crate::render::{RenderSink, RenderStyle, render_frame};

/// Owns everything the frame loop mutates: one vehicle and its skid trail.
pub struct SimulationWorld {
    pub config: SimulationConfig, // never mutated after construction
    pub vehicle: VehicleState,
    pub trail: TireMarkTrail,
    pub tick: u64,
}

impl SimulationWorld {
    pub fn new(config: SimulationConfig) -> Self {
        let vehicle = VehicleState::spawn(vec2(config.spawn));
        debug!(x = vehicle.position.x, y = vehicle.position.y, "vehicle spawned");

        Self {
            trail: TireMarkTrail::new(config.trail_capacity),
            config,
            vehicle,
            tick: 0,
        }
    }

    pub fn step(&mut self, target: Vec2, dt: f32) -> StepReport {
        let prev_mode = self.trail.mode();

        let report = step(&self.config, &mut self.vehicle, &mut self.trail, target, dt);
        self.tick += 1;

        if report.mode != prev_mode {
            trace!(
                tick = self.tick,
                drift = report.drift,
                mode = ?report.mode,
                "trail mode changed"
            );
        }
        if report.speed_clamped {
            trace!(tick = self.tick, "speed clamped to max_speed");
        }

        // Safety: a non-finite state never recovers on its own.
        if !self.vehicle.is_finite() {
            let spawn = vec2(self.config.spawn);
            warn!(
                tick = self.tick,
                state = ?self.vehicle,
                "vehicle state went non-finite, respawning"
            );
            self.vehicle = VehicleState::spawn(spawn);
            self.trail.reset();
        }

        report
    }

    pub fn render<S: RenderSink + ?Sized>(
        &self,
        sink: &mut S,
        style: &RenderStyle,
        sprite: &SpriteHandle,
    ) {
        render_frame(sink, style, &self.vehicle, self.trail.buffer(), sprite);
    }
}
