// ==============================================================================
// config.rs — DRIFT TUNING (IMMUTABLE PER RUN)
// ------------------------------------------------------------------------------
// Every stage of the frame pipeline reads its constants from SimulationConfig:
// - steering:   steer_rate, target_dead_zone
// - throttle:   acceleration, throttle_zone, brake_zone, max_brake_rate
// - drag:       drag, max_speed
// - kinematics: grip
// - trail:      drift_threshold, emission_interval, rear_offset, tire_spread,
//               trail_capacity
//
// The struct deserializes with #[serde(default)] so an override file only needs
// the fields it changes. validate() runs once at startup; the solver assumes a
// validated config and never re-checks.
// ==============================================================================

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum InvalidConfig {
    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f32 },

    #[error("{field} must be >= {min}, got {value}")]
    BelowMin {
        field: &'static str,
        min: f32,
        value: f32,
    },

    #[error("grip must lie in [0, 1], got {0}")]
    GripOutOfRange(f32),

    #[error("trail_capacity must be at least 1")]
    ZeroCapacity,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub acceleration: f32,      // units / s²
    pub max_speed: f32,         // units / s
    pub drag: f32,              // fraction of velocity removed per second
    pub grip: f32,              // fraction of lateral velocity removed per frame (0..1)
    pub steer_rate: f32,        // proportional gain, 1 / s

    pub throttle_zone: f32,     // units; full throttle at or beyond this distance
    pub brake_zone: f32,        // units; braking ramps in inside this distance
    pub max_brake_rate: f32,    // fraction of velocity removed per second at distance 0
    pub target_dead_zone: f32,  // units; no steer/throttle inside this distance

    pub drift_threshold: f32,   // lateral speed above which the tires mark
    pub emission_interval: f32, // s between tire-mark samples while drifting
    pub rear_offset: f32,       // units along forward; negative = behind
    pub tire_spread: f32,       // units from centreline to each rear tire
    pub trail_capacity: usize,  // max retained segments

    pub spawn: [f32; 2],        // initial position
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            acceleration: 2200.0,
            max_speed: 650.0,
            drag: 0.04,
            grip: 0.04,
            steer_rate: 4.0,

            throttle_zone: 250.0,
            brake_zone: 120.0,
            max_brake_rate: 6.0,
            target_dead_zone: 1.0,

            drift_threshold: 150.0,
            emission_interval: 0.02,
            rear_offset: -22.0,
            tire_spread: 14.0,
            trail_capacity: 1500,

            spawn: [400.0, 300.0],
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), InvalidConfig> {
        let finite = [
            ("acceleration", self.acceleration),
            ("max_speed", self.max_speed),
            ("drag", self.drag),
            ("grip", self.grip),
            ("steer_rate", self.steer_rate),
            ("throttle_zone", self.throttle_zone),
            ("brake_zone", self.brake_zone),
            ("max_brake_rate", self.max_brake_rate),
            ("target_dead_zone", self.target_dead_zone),
            ("drift_threshold", self.drift_threshold),
            ("emission_interval", self.emission_interval),
            ("rear_offset", self.rear_offset),
            ("tire_spread", self.tire_spread),
            ("spawn.x", self.spawn[0]),
            ("spawn.y", self.spawn[1]),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(InvalidConfig::NotFinite { field, value });
            }
        }

        // throttle_zone divides the distance, so it must stay strictly positive.
        let minimums = [
            ("acceleration", self.acceleration, 0.0),
            ("max_speed", self.max_speed, 0.0),
            ("drag", self.drag, 0.0),
            ("steer_rate", self.steer_rate, 0.0),
            ("throttle_zone", self.throttle_zone, f32::MIN_POSITIVE),
            ("brake_zone", self.brake_zone, 0.0),
            ("max_brake_rate", self.max_brake_rate, 0.0),
            ("target_dead_zone", self.target_dead_zone, 0.0),
            ("drift_threshold", self.drift_threshold, 0.0),
            ("emission_interval", self.emission_interval, 0.0),
            ("tire_spread", self.tire_spread, 0.0),
        ];
        for (field, value, min) in minimums {
            if value < min {
                return Err(InvalidConfig::BelowMin { field, min, value });
            }
        }

        if !(0.0..=1.0).contains(&self.grip) {
            return Err(InvalidConfig::GripOutOfRange(self.grip));
        }
        if self.trail_capacity == 0 {
            return Err(InvalidConfig::ZeroCapacity);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(SimulationConfig::default().validate(), Ok(()));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: SimulationConfig =
            serde_json::from_str(r#"{"grip": 0.5, "trail_capacity": 800}"#).unwrap();
        assert_eq!(cfg.grip, 0.5);
        assert_eq!(cfg.trail_capacity, 800);
        assert_eq!(cfg.max_speed, 650.0);
        assert_eq!(cfg.spawn, [400.0, 300.0]);
    }

    #[test]
    fn rejects_bad_values() {
        let cfg = SimulationConfig { grip: 1.5, ..Default::default() };
        assert_eq!(cfg.validate(), Err(InvalidConfig::GripOutOfRange(1.5)));

        let cfg = SimulationConfig { trail_capacity: 0, ..Default::default() };
        assert_eq!(cfg.validate(), Err(InvalidConfig::ZeroCapacity));

        let cfg = SimulationConfig { emission_interval: -0.1, ..Default::default() };
        assert!(matches!(
            cfg.validate(),
            Err(InvalidConfig::BelowMin { field: "emission_interval", .. })
        ));

        let cfg = SimulationConfig { drag: f32::NAN, ..Default::default() };
        assert!(matches!(
            cfg.validate(),
            Err(InvalidConfig::NotFinite { field: "drag", .. })
        ));

        let cfg = SimulationConfig { throttle_zone: 0.0, ..Default::default() };
        assert!(matches!(
            cfg.validate(),
            Err(InvalidConfig::BelowMin { field: "throttle_zone", .. })
        ));
    }
}
