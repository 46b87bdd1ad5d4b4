//! Core shared types for `drift` (engine-agnostic).
// drift/types.rs
use nalgebra::Vector2;

pub type Vec2 = Vector2<f32>;

// ----- heading basis helpers -----
/// Unit vector pointing along `heading` (0 rad = +X, positive turns toward +Y).
#[inline]
pub fn forward_of(heading: f32) -> Vec2 {
    Vec2::new(heading.cos(), heading.sin())
}

/// Unit vector perpendicular to `forward_of(heading)`, rotated +90°.
#[inline]
pub fn side_of(heading: f32) -> Vec2 {
    Vec2::new(-heading.sin(), heading.cos())
}

#[inline]
pub fn vec2(p: [f32; 2]) -> Vec2 {
    Vec2::new(p[0], p[1])
}

#[inline]
pub fn arr2(v: Vec2) -> [f32; 2] {
    [v.x, v.y]
}

// ============================================
// Vehicle state
// ============================================

/// The single mutable subject of the frame pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleState {
    pub position: Vec2, // world units
    pub velocity: Vec2, // world units / s
    pub heading: f32,   // radians, unbounded
}

impl VehicleState {
    /// Fresh vehicle at rest, facing +X.
    pub fn spawn(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::zeros(),
            heading: 0.0,
        }
    }

    #[inline]
    pub fn forward(&self) -> Vec2 {
        forward_of(self.heading)
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.norm()
    }

    pub fn is_finite(&self) -> bool {
        self.position.iter().all(|c| c.is_finite())
            && self.velocity.iter().all(|c| c.is_finite())
            && self.heading.is_finite()
    }
}
