//! drift - engine-agnostic arcade drift helpers (pure types + per-frame solver)

pub mod angle;
pub mod config;
pub mod drag;
pub mod kinematics;
pub mod solve;
pub mod steering;
pub mod throttle;
pub mod trail;
pub mod types;

pub use config::{InvalidConfig, SimulationConfig};
pub use solve::{StepReport, step};
pub use trail::{TireMarkSegment, TireMarkTrail, TrailBuffer, TrailMode};
pub use types::*;
