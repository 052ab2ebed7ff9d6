//! Single point, drawn as a pixel or a small quad

use crate::foundation::math::Vec2;
use crate::render::queue::{Batch, RenderQueue};
use crate::render::renderable::{ContextId, Drawable, Positionable, RenderableBase};
use crate::render::transform::{quad_corners, QUAD_INDICES};
use crate::render::vertex::PrimitiveTopology;
use crate::render::RenderResult;

/// A point with a thickness of at least one pixel on each axis
#[derive(Debug)]
pub struct Point {
    base: RenderableBase,
    position: Vec2,
    thickness: Vec2,
    depth: f32,
}

impl Point {
    /// Create a one pixel point
    pub fn new(name: impl Into<String>, context: ContextId, position: Vec2) -> Self {
        Self {
            base: RenderableBase::new(name, context, 1),
            position,
            thickness: Vec2::new(1.0, 1.0),
            depth: 0.0,
        }
    }

    /// Thickness on each axis
    pub const fn thickness(&self) -> Vec2 {
        self.thickness
    }

    /// Set the thickness, clamped to one pixel per axis
    pub fn set_thickness(&mut self, thickness: Vec2) {
        let thickness = Vec2::new(thickness.x.max(1.0), thickness.y.max(1.0));
        if thickness == self.thickness {
            return;
        }
        self.thickness = thickness;
        let count = if self.is_unit_thickness() { 1 } else { 4 };
        if count != self.base.vertices().len() {
            let color = self.base.color();
            self.base.resize_vertices(count);
            self.base.set_color(color);
        }
        self.base.invalidate_vertices();
    }

    /// Whether the point is a single pixel
    pub fn is_unit_thickness(&self) -> bool {
        self.thickness == Vec2::new(1.0, 1.0)
    }
}

impl Drawable for Point {
    fn base(&self) -> &RenderableBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RenderableBase {
        &mut self.base
    }

    fn update_vertices(&mut self) {
        let depth = self.depth;
        let origin = if self.is_unit_thickness() {
            self.position
        } else {
            self.position - self.thickness * 0.5
        };
        let corners = quad_corners(self.thickness);
        for (vertex, corner) in self.base.vertices_mut().iter_mut().zip(corners) {
            vertex.set_xy(origin + corner);
            vertex.position[2] = depth;
        }
    }

    fn update_texture_coordinates(&mut self) {}

    fn draw(&mut self, queue: &mut RenderQueue) -> RenderResult<()> {
        self.resolve();
        let batch = if self.is_unit_thickness() {
            Batch::new(&self.base, PrimitiveTopology::PointList, self.base.vertices(), None)
        } else {
            Batch::new(
                &self.base,
                PrimitiveTopology::TriangleList,
                self.base.vertices(),
                Some(&QUAD_INDICES[..]),
            )
        };
        queue.submit(batch)
    }
}

impl Positionable for Point {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn set_position(&mut self, position: Vec2) {
        if position != self.position {
            self.position = position;
            self.base.invalidate_vertices();
        }
    }

    fn depth(&self) -> f32 {
        self.depth
    }

    fn set_depth(&mut self, depth: f32) {
        if depth != self.depth {
            self.depth = depth;
            self.base.invalidate_vertices();
        }
    }
}
