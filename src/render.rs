// ==============================================================================
// render.rs — RENDER SINK + FRAME PASS
// ------------------------------------------------------------------------------
// RenderSink is the narrow capability the frame pass draws through:
// - clear(color)
// - draw_line(from, to, color)
// - draw_rotated_sprite(sprite, dest, angle_degrees)
//
// render_frame():
// - clears the background
// - draws the skid trail as two polylines (one per rear tire), one line per
//   adjacent pair of segments
// - draws the vehicle sprite centred on its position, rotated by
//   heading·180/π + sprite_angle_offset
//
// DrawList is the server-side sink: it records commands so the frame can be
// serialized and shipped to viewers. The physics never touches this module.
// ==============================================================================

use serde::Serialize;

use crate::assets::SpriteHandle;
use crate::drift::{TrailBuffer, Vec2, VehicleState, arr2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// Destination rectangle in world units (top-left + size).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn centered(center: Vec2, size: [f32; 2]) -> Self {
        Self {
            x: center.x - size[0] * 0.5,
            y: center.y - size[1] * 0.5,
            w: size[0],
            h: size[1],
        }
    }
}

pub trait RenderSink {
    fn clear(&mut self, color: Color);
    fn draw_line(&mut self, from: Vec2, to: Vec2, color: Color);
    fn draw_rotated_sprite(&mut self, sprite: &SpriteHandle, dest: Rect, angle_degrees: f64);
}

#[derive(Debug, Clone, Copy)]
pub struct RenderStyle {
    pub background: Color,
    pub skid: Color,
    pub sprite_size: [f32; 2],    // world units
    pub sprite_angle_offset: f64, // degrees; sprite art faces -Y
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            background: Color::rgb(20, 20, 20),
            skid: Color::rgb(15, 15, 15),
            sprite_size: [112.0, 56.0],
            sprite_angle_offset: -90.0,
        }
    }
}

#[inline]
pub fn sprite_angle_degrees(heading: f32, offset: f64) -> f64 {
    (heading as f64).to_degrees() + offset
}

pub fn render_frame<S: RenderSink + ?Sized>(
    sink: &mut S,
    style: &RenderStyle,
    vehicle: &VehicleState,
    trail: &TrailBuffer,
    sprite: &SpriteHandle,
) {
    sink.clear(style.background);

    for (prev, next) in trail.pairs() {
        sink.draw_line(prev.left, next.left, style.skid);
        sink.draw_line(prev.right, next.right, style.skid);
    }

    sink.draw_rotated_sprite(
        sprite,
        Rect::centered(vehicle.position, style.sprite_size),
        sprite_angle_degrees(vehicle.heading, style.sprite_angle_offset),
    );
}

// ============================================
// Recording sink
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Clear {
        color: Color,
    },
    Line {
        from: [f32; 2],
        to: [f32; 2],
        color: Color,
    },
    Sprite {
        sprite: String,
        dest: Rect,
        angle: f64,
    },
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl RenderSink for DrawList {
    fn clear(&mut self, color: Color) {
        // Anything recorded before a clear would be painted over anyway.
        self.commands.clear();
        self.commands.push(DrawCommand::Clear { color });
    }

    fn draw_line(&mut self, from: Vec2, to: Vec2, color: Color) {
        self.commands.push(DrawCommand::Line {
            from: arr2(from),
            to: arr2(to),
            color,
        });
    }

    fn draw_rotated_sprite(&mut self, sprite: &SpriteHandle, dest: Rect, angle_degrees: f64) {
        self.commands.push(DrawCommand::Sprite {
            sprite: sprite.id().to_string(),
            dest,
            angle: angle_degrees,
        });
    }
}
