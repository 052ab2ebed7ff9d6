//! Vertex layout shared by every 2D primitive

use bytemuck::{Pod, Zeroable};

use super::color::Color;
use crate::foundation::math::{Vec2, Vec4};

/// A single 2D vertex: homogeneous position, colour and texture coordinate
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Position (x, y, depth, w)
    pub position: [f32; 4],
    /// RGBA colour
    pub color: [f32; 4],
    /// Texture coordinate
    pub uv: [f32; 2],
}

impl Vertex {
    /// Size of one vertex in bytes
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Create a vertex
    pub fn new(position: Vec4, color: Color, uv: Vec2) -> Self {
        Self {
            position: position.into(),
            color: color.into(),
            uv: uv.into(),
        }
    }

    /// Position as a vector
    pub fn position(&self) -> Vec4 {
        Vec4::from(self.position)
    }

    /// x/y of the position
    pub fn xy(&self) -> Vec2 {
        Vec2::new(self.position[0], self.position[1])
    }

    /// Set x/y of the position
    pub fn set_xy(&mut self, xy: Vec2) {
        self.position[0] = xy.x;
        self.position[1] = xy.y;
    }

    /// Colour of the vertex
    pub fn color(&self) -> Color {
        Color::from(self.color)
    }

    /// Texture coordinate
    pub fn uv(&self) -> Vec2 {
        Vec2::new(self.uv[0], self.uv[1])
    }
}

impl Default for Vertex {
    /// White vertex at the origin
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 0.0, 1.0],
            color: Color::WHITE.into(),
            uv: [0.0, 0.0],
        }
    }
}

/// How a vertex stream is assembled into primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveTopology {
    /// Isolated points
    PointList,
    /// Independent line segments
    LineList,
    /// Connected line segments
    LineStrip,
    /// Independent triangles
    TriangleList,
    /// Connected triangles
    TriangleStrip,
}

impl PrimitiveTopology {
    /// Whether consecutive primitives share vertices
    pub const fn is_strip(self) -> bool {
        matches!(self, Self::LineStrip | Self::TriangleStrip)
    }
}
