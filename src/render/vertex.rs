//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

use crate::Color;

/// 2D vertex in screen pixels with a normalized color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    /// Byte distance between consecutive vertices
    pub const STRIDE: usize = std::mem::size_of::<Vertex>();
    /// Byte offset of `color` inside a vertex
    pub const COLOR_OFFSET: usize = std::mem::size_of::<[f32; 2]>();

    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn colored(x: f32, y: f32, color: Color) -> Self {
        Self::new(x, y, color.to_array())
    }
}

/// View a vertex slice as raw bytes for upload
pub fn as_bytes(vertices: &[Vertex]) -> &[u8] {
    bytemuck::cast_slice(vertices)
}
