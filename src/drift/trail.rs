// ==============================================================================
// trail.rs — SKID MARK TRAIL (TIME-GATED EMITTER + BOUNDED FIFO)
// ------------------------------------------------------------------------------
// Two modes driven purely by the drift magnitude against a hard threshold:
//
//     Gripping : |v_lat| <= threshold   -> timer = 0
//     Drifting : |v_lat| >  threshold   -> timer += dt
//
// While drifting, each time timer >= emission_interval the timer resets and a
// segment is sampled at the rear axle:
//
//     anchor = position + forward * rear_offset      (rear_offset < 0)
//     side   = (-sin θ, cos θ)
//     left   = anchor + side * tire_spread
//     right  = anchor - side * tire_spread
//
// Segments are evenly spaced in time, so mark density does not depend on the
// frame rate. The buffer keeps at most `capacity` segments, oldest evicted
// first, O(1) on both ends.
// ==============================================================================

use std::collections::VecDeque;

use crate::drift::config::SimulationConfig;
use crate::drift::types::{Vec2, forward_of, side_of};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TrailMode {
    Gripping,
    Drifting,
}

/// One sampled pair of rear tire positions.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TireMarkSegment {
    pub left: Vec2,
    pub right: Vec2,
}

impl TireMarkSegment {
    pub fn at_rear_axle(position: Vec2, heading: f32, rear_offset: f32, tire_spread: f32) -> Self {
        let anchor = position + forward_of(heading) * rear_offset;
        let side = side_of(heading) * tire_spread;
        Self {
            left: anchor + side,
            right: anchor - side,
        }
    }
}

// ============================================
// Bounded history
// ============================================

#[derive(Debug, Clone)]
pub struct TrailBuffer {
    segments: VecDeque<TireMarkSegment>,
    capacity: usize,
}

impl TrailBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            segments: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append `segment`; returns the evicted oldest entry when full.
    pub fn push(&mut self, segment: TireMarkSegment) -> Option<TireMarkSegment> {
        if self.capacity == 0 {
            return Some(segment);
        }
        let evicted = if self.segments.len() >= self.capacity {
            self.segments.pop_front()
        } else {
            None
        };
        self.segments.push_back(segment);
        evicted
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn oldest(&self) -> Option<&TireMarkSegment> {
        self.segments.front()
    }

    pub fn newest(&self) -> Option<&TireMarkSegment> {
        self.segments.back()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &TireMarkSegment> + '_ {
        self.segments.iter()
    }

    /// Adjacent (older, newer) pairs, oldest first.
    pub fn pairs(&self) -> impl Iterator<Item = (&TireMarkSegment, &TireMarkSegment)> + '_ {
        self.segments.iter().zip(self.segments.iter().skip(1))
    }

    pub fn clear(&mut self) {
        self.segments.clear();
    }
}

// ============================================
// Emitter
// ============================================

#[derive(Debug, Clone)]
pub struct TireMarkTrail {
    buffer: TrailBuffer,
    timer: f32,
    mode: TrailMode,
}

impl TireMarkTrail {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: TrailBuffer::new(capacity),
            timer: 0.0,
            mode: TrailMode::Gripping,
        }
    }

    pub fn buffer(&self) -> &TrailBuffer {
        &self.buffer
    }

    pub fn mode(&self) -> TrailMode {
        self.mode
    }

    pub fn timer(&self) -> f32 {
        self.timer
    }

    /// Advance the drift timer and emit at most one segment.
    pub fn update(
        &mut self,
        cfg: &SimulationConfig,
        drift_magnitude: f32,
        position: Vec2,
        heading: f32,
        dt: f32,
    ) -> Option<TireMarkSegment> {
        if !(drift_magnitude > cfg.drift_threshold) {
            self.mode = TrailMode::Gripping;
            self.timer = 0.0;
            return None;
        }

        self.mode = TrailMode::Drifting;
        self.timer += dt;
        if self.timer < cfg.emission_interval {
            return None;
        }

        self.timer = 0.0;
        let segment =
            TireMarkSegment::at_rear_axle(position, heading, cfg.rear_offset, cfg.tire_spread);
        self.buffer.push(segment);
        Some(segment)
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.timer = 0.0;
        self.mode = TrailMode::Gripping;
    }
}
