use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{Sender, error::TrySendError};

use crate::drift::{StepReport, TrailBuffer, TrailMode, Vec2, VehicleState, arr2};
use crate::pointer::PointerSource;
use crate::render::{DrawCommand, DrawList};

// ---------------------------------------------
// WIRE MESSAGES
// ---------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    Pointer { x: f32, y: f32 },
    Ping,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage<'a> {
    Welcome { viewer_id: &'a str },
    Frame(&'a FrameMessage<'a>),
    Pong,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct VehicleSnapshot {
    pub position: [f32; 2],
    pub velocity: [f32; 2],
    pub heading: f32,
    pub speed: f32,
}

impl From<&VehicleState> for VehicleSnapshot {
    fn from(v: &VehicleState) -> Self {
        Self {
            position: arr2(v.position),
            velocity: arr2(v.velocity),
            heading: v.heading,
            speed: v.speed(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FrameMessage<'a> {
    pub tick: u64,
    pub vehicle: VehicleSnapshot,
    pub target: [f32; 2],
    pub drifting: bool,
    pub drift: f32,
    pub speed_clamped: bool,
    pub trail_len: usize,
    pub trail_capacity: usize,
    pub commands: &'a [DrawCommand],
}

impl<'a> FrameMessage<'a> {
    pub fn new(
        tick: u64,
        vehicle: &VehicleState,
        target: Vec2,
        report: &StepReport,
        trail: &TrailBuffer,
        frame: &'a DrawList,
    ) -> Self {
        Self {
            tick,
            vehicle: vehicle.into(),
            target: arr2(target),
            drifting: report.mode == TrailMode::Drifting,
            drift: report.drift,
            speed_clamped: report.speed_clamped,
            trail_len: trail.len(),
            trail_capacity: trail.capacity(),
            commands: frame.commands(),
        }
    }
}

// ---------------------------------------------
// SHARED STATE (loop <-> viewer tasks)
// ---------------------------------------------

/// Outgoing messages buffered per viewer. Frames beyond this are dropped.
pub const VIEWER_QUEUE: usize = 16;

pub struct ViewerChannel {
    tx: Sender<String>,
    dropped: u64, // frames dropped since the viewer last kept up
}

pub struct SharedSimState {
    pub clients: HashMap<String, ViewerChannel>,
    pub pointer: PointerSource,
}

impl SharedSimState {
    pub fn new(pointer: PointerSource) -> Self {
        Self {
            clients: HashMap::new(),
            pointer,
        }
    }

    pub fn with_arena(arena: [f32; 2], idle: Duration) -> Self {
        Self::new(PointerSource::new(arena, idle))
    }

    pub fn register_client(&mut self, id: String, tx: Sender<String>) {
        self.clients.insert(id, ViewerChannel { tx, dropped: 0 });
    }

    pub fn remove_client(&mut self, id: &str) {
        self.clients.remove(id);
    }

    pub fn update_pointer(&mut self, x: f32, y: f32, at: Instant) {
        self.pointer.update(Vec2::new(x, y), at);
    }

    /// Serialize once and fan out. A viewer whose queue is full misses this
    /// frame; one whose channel closed is removed.
    pub fn broadcast_frame(&mut self, frame: &FrameMessage<'_>) {
        if self.clients.is_empty() {
            return;
        }

        let json = match serde_json::to_string(&ServerMessage::Frame(frame)) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, tick = frame.tick, "failed to serialize frame");
                return;
            }
        };

        self.clients.retain(|id, viewer| match viewer.tx.try_send(json.clone()) {
            Ok(()) => {
                if viewer.dropped > 0 {
                    tracing::info!(viewer = %id, dropped = viewer.dropped, "viewer caught up");
                    viewer.dropped = 0;
                }
                true
            }
            Err(TrySendError::Full(_)) => {
                if viewer.dropped == 0 {
                    tracing::warn!(viewer = %id, "viewer queue full, dropping frames");
                }
                viewer.dropped += 1;
                true
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!(viewer = %id, "dropping closed viewer channel");
                false
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drift::SimulationConfig;
    use crate::physics::SimulationWorld;
    use crate::assets::SpriteHandle;
    use crate::render::{Color, RenderStyle};
    use tokio::sync::mpsc;
    use test_log::test;

    #[test]
    fn parses_client_messages() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"pointer","x":12.5,"y":-3}"#).unwrap();
        assert_eq!(msg, ClientMessage::Pointer { x: 12.5, y: -3.0 });
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Ping);
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"input"}"#).is_err());
    }

    #[test]
    fn welcome_and_pong_shapes() {
        let json = serde_json::to_value(ServerMessage::Welcome { viewer_id: "abc" }).unwrap();
        assert_eq!(json, serde_json::json!({"type": "welcome", "viewer_id": "abc"}));
        let json = serde_json::to_value(ServerMessage::Pong).unwrap();
        assert_eq!(json, serde_json::json!({"type": "pong"}));
    }

    #[test]
    fn broadcasts_frames_and_drops_closed_viewers() {
        let mut world = SimulationWorld::new(SimulationConfig::default());
        let target = Vec2::new(700.0, 300.0);
        let report = world.step(target, 1.0 / 60.0);
        let sprite = SpriteHandle::solid("car", Color::rgb(255, 0, 0), [28, 14]);
        let mut list = DrawList::default();
        world.render(&mut list, &RenderStyle::default(), &sprite);

        let mut shared = SharedSimState::with_arena([800.0, 600.0], Duration::from_secs(3));
        let (tx_live, mut rx_live) = mpsc::channel(VIEWER_QUEUE);
        let (tx_dead, rx_dead) = mpsc::channel(VIEWER_QUEUE);
        drop(rx_dead);
        shared.register_client("live".into(), tx_live);
        shared.register_client("dead".into(), tx_dead);

        let frame = FrameMessage::new(
            world.tick,
            &world.vehicle,
            target,
            &report,
            world.trail.buffer(),
            &list,
        );
        shared.broadcast_frame(&frame);

        assert_eq!(shared.clients.len(), 1);
        let json: serde_json::Value = serde_json::from_str(&rx_live.try_recv().unwrap()).unwrap();
        assert_eq!(json["type"], "frame");
        assert_eq!(json["tick"], 1);
        assert_eq!(json["target"], serde_json::json!([700.0, 300.0]));
        assert_eq!(json["drifting"], false);
        assert_eq!(json["speed_clamped"], false);
        assert_eq!(json["trail_len"], 0);
        assert_eq!(json["trail_capacity"], 1500);
        assert_eq!(json["commands"].as_array().unwrap().len(), 2);
        assert_eq!(json["commands"][0]["op"], "clear");
    }

    #[test]
    fn stalled_viewer_queue_stays_bounded() {
        let mut world = SimulationWorld::new(SimulationConfig::default());
        let report = world.step(Vec2::new(700.0, 300.0), 1.0 / 60.0);
        let sprite = SpriteHandle::solid("car", Color::rgb(255, 0, 0), [28, 14]);
        let mut list = DrawList::default();
        world.render(&mut list, &RenderStyle::default(), &sprite);
        let frame = FrameMessage::new(
            world.tick,
            &world.vehicle,
            Vec2::zeros(),
            &report,
            world.trail.buffer(),
            &list,
        );

        let mut shared = SharedSimState::with_arena([800.0, 600.0], Duration::from_secs(3));
        let (tx, mut rx) = mpsc::channel(VIEWER_QUEUE);
        shared.register_client("stalled".into(), tx);

        for _ in 0..500 {
            shared.broadcast_frame(&frame);
        }

        // Still connected, but only a full queue's worth is buffered.
        assert_eq!(shared.clients.len(), 1);
        assert_eq!(shared.clients["stalled"].dropped, (500 - VIEWER_QUEUE) as u64);
        let mut queued = 0;
        while rx.try_recv().is_ok() {
            queued += 1;
        }
        assert_eq!(queued, VIEWER_QUEUE);

        // Once drained, frames flow again.
        shared.broadcast_frame(&frame);
        assert_eq!(shared.clients["stalled"].dropped, 0);
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn pointer_updates_reach_the_source() {
        let mut shared = SharedSimState::with_arena([800.0, 600.0], Duration::from_secs(3));
        let now = Instant::now();
        shared.update_pointer(5.0, 6.0, now);
        assert_eq!(shared.pointer.target(Vec2::zeros(), now), Vec2::new(5.0, 6.0));
    }
}
