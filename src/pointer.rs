// ==============================================================================
// pointer.rs — CHASE TARGET SOURCE
// ------------------------------------------------------------------------------
// The vehicle chases whatever a viewer last pointed at. When nobody has pointed
// for `idle` (or nobody ever did), a wander target is picked at random inside
// the arena and re-rolled once the vehicle gets close, so a headless server
// still drives and drifts.
// ==============================================================================

use std::time::{Duration, Instant};

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::drift::Vec2;

/// Distance at which the wander target counts as reached.
pub const WANDER_REACH: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub position: Vec2,
    pub at: Instant,
}

#[derive(Debug)]
pub struct PointerSource {
    latest: Option<PointerSample>,
    wander: Option<Vec2>,
    arena: Vec2,
    idle: Duration,
    rng: StdRng,
}

impl PointerSource {
    pub fn new(arena: [f32; 2], idle: Duration) -> Self {
        Self::with_rng(arena, idle, StdRng::from_entropy())
    }

    pub fn with_rng(arena: [f32; 2], idle: Duration, rng: StdRng) -> Self {
        Self {
            latest: None,
            wander: None,
            arena: Vec2::new(arena[0], arena[1]),
            idle,
            rng,
        }
    }

    /// Record a viewer's pointer. Non-finite coordinates are dropped.
    pub fn update(&mut self, position: Vec2, at: Instant) {
        if position.iter().all(|c| c.is_finite()) {
            self.latest = Some(PointerSample { position, at });
            self.wander = None;
        }
    }

    pub fn latest(&self) -> Option<PointerSample> {
        self.latest
    }

    /// Whether a viewer has steered within the idle window.
    pub fn is_live(&self, now: Instant) -> bool {
        self.latest
            .is_some_and(|s| now.saturating_duration_since(s.at) <= self.idle)
    }

    /// The target for this frame.
    pub fn target(&mut self, vehicle: Vec2, now: Instant) -> Vec2 {
        if let Some(sample) = self.latest {
            if self.is_live(now) {
                return sample.position;
            }
        }

        match self.wander {
            Some(w) if (w - vehicle).norm() > WANDER_REACH => w,
            _ => {
                let next = self.roll_wander();
                tracing::debug!(x = next.x, y = next.y, "new wander target");
                self.wander = Some(next);
                next
            }
        }
    }

    fn roll_wander(&mut self) -> Vec2 {
        Vec2::new(
            self.rng.gen_range(0.0..=self.arena.x),
            self.rng.gen_range(0.0..=self.arena.y),
        )
    }
}
