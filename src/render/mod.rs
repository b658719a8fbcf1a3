//! Draw surface
//!
//! Demos draw through the immediate-mode [`Canvas`] trait. [`DrawList`] is
//! the recording implementation: it keeps every call as a [`DrawCmd`] so a
//! backend can replay it, and so tests can inspect what a frame drew.
//! 2D coordinates are screen pixels with the origin at the top left.

pub mod shapes;
pub mod vertex;

pub use vertex::Vertex;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::Color;

/// Perspective camera for 3D passes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera3d {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub fovy: f32,
}

impl Camera3d {
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self {
            position,
            target,
            up: Vec3::Y,
            fovy: 45.0,
        }
    }

    /// Unit vector the camera looks along
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }
}

/// Immediate-mode drawing interface
pub trait Canvas {
    fn begin_frame(&mut self, clear: Color);
    fn end_frame(&mut self);

    fn rect(&mut self, pos: Vec2, size: Vec2, color: Color);
    fn rect_lines(&mut self, pos: Vec2, size: Vec2, color: Color);
    fn circle(&mut self, center: Vec2, radius: f32, color: Color);
    fn text(&mut self, text: &str, pos: Vec2, size: f32, color: Color);

    /// Approximate pixel width of `text` at `size`
    fn measure_text(&self, text: &str, size: f32) -> f32 {
        let glyphs = text.chars().count() as f32;
        let spacing = (size / 10.0).max(1.0);
        (glyphs * (size * 0.5 + spacing) - spacing).max(0.0)
    }

    fn begin_3d(&mut self, camera: Camera3d);
    fn end_3d(&mut self);

    fn cube(&mut self, center: Vec3, size: Vec3, color: Color);
    fn cube_wires(&mut self, center: Vec3, size: Vec3, color: Color);
    fn sphere(&mut self, center: Vec3, radius: f32, color: Color);
    fn sphere_wires(&mut self, center: Vec3, radius: f32, rings: u32, slices: u32, color: Color);
    /// Horizontal plane centered at `center`, `size` spans x and z
    fn plane(&mut self, center: Vec3, size: Vec2, color: Color);
    fn line_3d(&mut self, start: Vec3, end: Vec3, color: Color);
}

/// One recorded drawing call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Clear(Color),
    Rect { pos: Vec2, size: Vec2, color: Color },
    RectLines { pos: Vec2, size: Vec2, color: Color },
    Circle { center: Vec2, radius: f32, color: Color },
    Text { text: String, pos: Vec2, size: f32, color: Color },
    Begin3d(Camera3d),
    End3d,
    Cube { center: Vec3, size: Vec3, color: Color },
    CubeWires { center: Vec3, size: Vec3, color: Color },
    Sphere { center: Vec3, radius: f32, color: Color },
    SphereWires { center: Vec3, radius: f32, rings: u32, slices: u32, color: Color },
    Plane { center: Vec3, size: Vec2, color: Color },
    Line3d { start: Vec3, end: Vec3, color: Color },
}

/// Canvas that records one frame of commands
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    commands: Vec<DrawCmd>,
    in_frame: bool,
    in_3d: bool,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCmd] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Every string drawn this frame, in order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCmd::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().any(|t| t.contains(needle))
    }

    fn push(&mut self, cmd: DrawCmd) {
        if !self.in_frame {
            log::warn!("Draw call outside begin_frame/end_frame: {:?}", cmd);
        }
        self.commands.push(cmd);
    }
}

impl Canvas for DrawList {
    fn begin_frame(&mut self, clear: Color) {
        self.commands.clear();
        self.in_frame = true;
        self.in_3d = false;
        self.commands.push(DrawCmd::Clear(clear));
    }

    fn end_frame(&mut self) {
        if self.in_3d {
            log::warn!("Frame ended inside a 3D pass");
            self.end_3d();
        }
        self.in_frame = false;
    }

    fn rect(&mut self, pos: Vec2, size: Vec2, color: Color) {
        self.push(DrawCmd::Rect { pos, size, color });
    }

    fn rect_lines(&mut self, pos: Vec2, size: Vec2, color: Color) {
        self.push(DrawCmd::RectLines { pos, size, color });
    }

    fn circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.push(DrawCmd::Circle {
            center,
            radius,
            color,
        });
    }

    fn text(&mut self, text: &str, pos: Vec2, size: f32, color: Color) {
        self.push(DrawCmd::Text {
            text: text.to_owned(),
            pos,
            size,
            color,
        });
    }

    fn begin_3d(&mut self, camera: Camera3d) {
        self.in_3d = true;
        self.push(DrawCmd::Begin3d(camera));
    }

    fn end_3d(&mut self) {
        self.in_3d = false;
        self.push(DrawCmd::End3d);
    }

    fn cube(&mut self, center: Vec3, size: Vec3, color: Color) {
        self.push(DrawCmd::Cube {
            center,
            size,
            color,
        });
    }

    fn cube_wires(&mut self, center: Vec3, size: Vec3, color: Color) {
        self.push(DrawCmd::CubeWires {
            center,
            size,
            color,
        });
    }

    fn sphere(&mut self, center: Vec3, radius: f32, color: Color) {
        self.push(DrawCmd::Sphere {
            center,
            radius,
            color,
        });
    }

    fn sphere_wires(&mut self, center: Vec3, radius: f32, rings: u32, slices: u32, color: Color) {
        self.push(DrawCmd::SphereWires {
            center,
            radius,
            rings,
            slices,
            color,
        });
    }

    fn plane(&mut self, center: Vec3, size: Vec2, color: Color) {
        self.push(DrawCmd::Plane {
            center,
            size,
            color,
        });
    }

    fn line_3d(&mut self, start: Vec3, end: Vec3, color: Color) {
        self.push(DrawCmd::Line3d { start, end, color });
    }
}
