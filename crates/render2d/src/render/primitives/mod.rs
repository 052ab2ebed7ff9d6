//! Concrete primitive variants
//!
//! Each primitive owns its geometry parameters and implements vertex
//! generation for the shared [`Drawable`](super::renderable::Drawable)
//! contract.

pub mod ellipse;
pub mod line;
pub mod point;
pub mod polygon;
pub mod rectangle;
pub mod sprite;
pub mod triangle;

pub use ellipse::Ellipse;
pub use line::Line;
pub use point::Point;
pub use polygon::{Polygon, PolygonMaterial, PolygonType};
pub use rectangle::Rectangle;
pub use sprite::Sprite;
pub use triangle::{Triangle, TrianglePoint};

use super::renderable::{Drawable, RenderableBase};

/// Corner of a rectangular primitive, in vertex order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RectangleCorner {
    /// Top-left
    UpperLeft = 0,
    /// Top-right
    UpperRight = 1,
    /// Bottom-left
    LowerLeft = 2,
    /// Bottom-right
    LowerRight = 3,
}

impl RectangleCorner {
    /// All corners in vertex order
    pub const ALL: [Self; 4] = [Self::UpperLeft, Self::UpperRight, Self::LowerLeft, Self::LowerRight];

    /// Vertex index of the corner
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Copy the pipeline state and texture of `owner` onto a helper line
pub(crate) fn sync_outline(line: &mut Line, owner: &RenderableBase) {
    let base = line.base_mut();
    base.set_render_state(*owner.render_state());
    base.set_texture(owner.texture().cloned());
}
