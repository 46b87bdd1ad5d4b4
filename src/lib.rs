//! Headless arcade drift simulation: one vehicle chasing a pointer, leaving
//! skid marks while it slides, streamed to websocket viewers as draw lists.

pub mod assets;
pub mod clock;
pub mod config;
pub mod drift;
pub mod error;
pub mod net;
pub mod physics;
pub mod pointer;
pub mod render;
pub mod state;
