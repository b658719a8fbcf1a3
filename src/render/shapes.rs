//! Shape generation for 2D primitives

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::Vertex;
use super::{DrawCmd, DrawList};
use crate::Color;

/// Segments used for circles in a tessellated draw list
pub const CIRCLE_SEGMENTS: u32 = 24;

/// Outline thickness for `RectLines`, in pixels
pub const LINE_WIDTH: f32 = 1.0;

/// Two triangles covering the rectangle at `pos` (top left) with `size`
pub fn rect(pos: Vec2, size: Vec2, color: Color) -> Vec<Vertex> {
    let c = color.to_array();
    let (min, max) = (pos, pos + size);
    vec![
        Vertex::new(min.x, min.y, c),
        Vertex::new(max.x, min.y, c),
        Vertex::new(min.x, max.y, c),
        Vertex::new(min.x, max.y, c),
        Vertex::new(max.x, min.y, c),
        Vertex::new(max.x, max.y, c),
    ]
}

/// Four thin quads tracing the inside edge of a rectangle
pub fn rect_outline(pos: Vec2, size: Vec2, width: f32, color: Color) -> Vec<Vertex> {
    let w = width.min(size.x / 2.0).min(size.y / 2.0).max(0.0);
    let mut vertices = Vec::with_capacity(24);
    vertices.extend(rect(pos, Vec2::new(size.x, w), color));
    vertices.extend(rect(
        Vec2::new(pos.x, pos.y + size.y - w),
        Vec2::new(size.x, w),
        color,
    ));
    vertices.extend(rect(
        Vec2::new(pos.x, pos.y + w),
        Vec2::new(w, size.y - 2.0 * w),
        color,
    ));
    vertices.extend(rect(
        Vec2::new(pos.x + size.x - w, pos.y + w),
        Vec2::new(w, size.y - 2.0 * w),
        color,
    ));
    vertices
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: Color, segments: u32) -> Vec<Vertex> {
    let segments = segments.max(3);
    let c = color.to_array();
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, c));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            c,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            c,
        ));
    }

    vertices
}

/// Triangulate the 2D commands of a recorded frame
///
/// Clears, text and 3D passes are left to the backend; everything drawn
/// between `Begin3d` and `End3d` is skipped.
pub fn tessellate(list: &DrawList) -> Vec<Vertex> {
    let mut vertices = Vec::new();
    let mut in_3d = false;

    for cmd in list.commands() {
        match cmd {
            DrawCmd::Begin3d(_) => in_3d = true,
            DrawCmd::End3d => in_3d = false,
            _ if in_3d => {}
            DrawCmd::Rect { pos, size, color } => vertices.extend(rect(*pos, *size, *color)),
            DrawCmd::RectLines { pos, size, color } => {
                vertices.extend(rect_outline(*pos, *size, LINE_WIDTH, *color))
            }
            DrawCmd::Circle {
                center,
                radius,
                color,
            } => vertices.extend(circle(*center, *radius, *color, CIRCLE_SEGMENTS)),
            _ => {}
        }
    }

    vertices
}
