//! Filled or outlined rectangle
//!
//! A filled rectangle is a single quad. An outline is drawn as four lines
//! through an internal [`Line`], with corners rounded up to whole pixels so
//! adjacent edges meet without seams.

use super::{sync_outline, Line, RectangleCorner};
use crate::foundation::math::{RectF, Vec2};
use crate::render::color::Color;
use crate::render::queue::{Batch, RenderQueue};
use crate::render::renderable::{
    impl_transform_capabilities, ContextId, Drawable, HasTransform, Positionable, RenderableBase, TextureMapped,
};
use crate::render::transform::{quad_corners, Transform2D, QUAD_INDICES};
use crate::render::vertex::PrimitiveTopology;
use crate::render::RenderResult;

// outline walks UL -> UR -> LR -> LL -> UL
const OUTLINE: [(RectangleCorner, RectangleCorner); 4] = [
    (RectangleCorner::UpperLeft, RectangleCorner::UpperRight),
    (RectangleCorner::UpperRight, RectangleCorner::LowerRight),
    (RectangleCorner::LowerRight, RectangleCorner::LowerLeft),
    (RectangleCorner::LowerLeft, RectangleCorner::UpperLeft),
];

/// Axis aligned rectangle before rotation
#[derive(Debug)]
pub struct Rectangle {
    base: RenderableBase,
    transform: Transform2D,
    size: Vec2,
    filled: bool,
    line_thickness: Vec2,
    outline: Line,
}

impl Rectangle {
    /// Create a rectangle covering `rect`
    pub fn new(name: impl Into<String>, context: ContextId, rect: RectF, filled: bool) -> Self {
        let name = name.into();
        let outline = Line::new(format!("{name}.outline"), context, Vec2::zeros(), Vec2::zeros());
        Self {
            base: RenderableBase::new(name, context, 4),
            transform: Transform2D {
                position: rect.location(),
                ..Transform2D::default()
            },
            size: rect.size(),
            filled,
            line_thickness: Vec2::new(1.0, 1.0),
            outline,
        }
    }

    /// Size before scaling
    pub const fn size(&self) -> Vec2 {
        self.size
    }

    /// Resize
    pub fn set_size(&mut self, size: Vec2) {
        if size != self.size {
            self.size = size;
            self.base.invalidate_vertices();
        }
    }

    /// Position and size as a rectangle
    pub fn rectangle(&self) -> RectF {
        RectF::from_location_size(self.position(), self.size)
    }

    /// Move and resize in one step
    pub fn set_rectangle(&mut self, rect: RectF) {
        self.set_position(rect.location());
        self.set_size(rect.size());
    }

    /// Whether the interior is filled
    pub const fn is_filled(&self) -> bool {
        self.filled
    }

    /// Switch between filled and outlined drawing
    pub fn set_filled(&mut self, filled: bool) {
        self.filled = filled;
    }

    /// Thickness of the outline
    pub const fn line_thickness(&self) -> Vec2 {
        self.line_thickness
    }

    /// Set the outline thickness
    pub fn set_line_thickness(&mut self, thickness: Vec2) {
        self.line_thickness = Vec2::new(thickness.x.max(1.0), thickness.y.max(1.0));
    }

    /// Colour of one corner
    pub fn corner_color(&self, corner: RectangleCorner) -> Color {
        self.base.vertices()[corner.index()].color()
    }

    /// Set the colour of one corner
    pub fn set_corner_color(&mut self, corner: RectangleCorner, color: Color) {
        self.base.vertices_mut()[corner.index()].color = color.into();
    }

    fn draw_outline(&mut self, queue: &mut RenderQueue) -> RenderResult<()> {
        let rotation = self.transform.rotation();
        let corners = quad_corners(self.size).map(|corner| self.transform.apply_ceiled(corner, &rotation));

        sync_outline(&mut self.outline, &self.base);
        self.outline.set_thickness(self.line_thickness);
        self.outline.set_depth(self.transform.depth);
        for (from, to) in OUTLINE {
            let (start, end) = (&self.base.vertices()[from.index()], &self.base.vertices()[to.index()]);
            self.outline.set_start(corners[from.index()]);
            self.outline.set_end(corners[to.index()]);
            self.outline.set_start_color(start.color());
            self.outline.set_end_color(end.color());
            self.outline.set_start_texture_coordinate(start.uv());
            self.outline.set_end_texture_coordinate(end.uv());
            self.outline.draw(queue)?;
        }
        Ok(())
    }
}

impl Drawable for Rectangle {
    fn base(&self) -> &RenderableBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RenderableBase {
        &mut self.base
    }

    fn update_vertices(&mut self) {
        let corners = quad_corners(self.size);
        self.transform.transform_into(&corners, self.base.vertices_mut());
    }

    fn update_texture_coordinates(&mut self) {
        let uvs = if self.base.texture().is_some() {
            let region = self.base.texture_region();
            [
                [region.left(), region.top()],
                [region.right(), region.top()],
                [region.left(), region.bottom()],
                [region.right(), region.bottom()],
            ]
        } else {
            [[0.0; 2]; 4]
        };
        for (vertex, uv) in self.base.vertices_mut().iter_mut().zip(uvs) {
            vertex.uv = uv;
        }
    }

    fn draw(&mut self, queue: &mut RenderQueue) -> RenderResult<()> {
        self.resolve();
        if !self.filled {
            return self.draw_outline(queue);
        }
        queue.submit(Batch::new(
            &self.base,
            PrimitiveTopology::TriangleList,
            self.base.vertices(),
            Some(&QUAD_INDICES[..]),
        ))
    }
}

impl HasTransform for Rectangle {
    fn transform(&self) -> &Transform2D {
        &self.transform
    }

    fn transform_mut(&mut self) -> &mut Transform2D {
        &mut self.transform
    }
}

impl_transform_capabilities!(Rectangle);

impl TextureMapped for Rectangle {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::device::RecordingDevice;

    #[test]
    fn test_filled_rectangle_is_one_quad() {
        let recorder = RecordingDevice::shared();
        let context = ContextId::next();
        let mut queue = RenderQueue::new(recorder.clone(), context, 64);
        let mut rect = Rectangle::new("rect", context, RectF::new(10.0, 20.0, 30.0, 40.0), true);
        rect.draw(&mut queue).unwrap();
        queue.flush().unwrap();

        let device = recorder.borrow();
        let draw = &device.draws()[0];
        assert_eq!(draw.vertices.len(), 4);
        assert_eq!(draw.vertices[3].xy(), Vec2::new(40.0, 60.0));
    }

    #[test]
    fn test_outline_is_four_ceiled_lines_with_corner_colors() {
        let recorder = RecordingDevice::shared();
        let context = ContextId::next();
        let mut queue = RenderQueue::new(recorder.clone(), context, 64);
        let mut rect = Rectangle::new("rect", context, RectF::new(0.5, 0.5, 10.0, 10.0), false);
        rect.set_corner_color(RectangleCorner::UpperRight, Color::RED);
        rect.draw(&mut queue).unwrap();
        queue.flush().unwrap();

        let device = recorder.borrow();
        assert_eq!(device.draws().len(), 1);
        let draw = &device.draws()[0];
        assert_eq!(draw.state.topology, PrimitiveTopology::LineList);
        assert_eq!(draw.vertices.len(), 8);
        assert_eq!(draw.vertices[0].xy(), Vec2::new(1.0, 1.0));
        assert_eq!(draw.vertices[1].xy(), Vec2::new(11.0, 1.0));
        assert_eq!(draw.vertices[1].color(), Color::RED);
        assert_eq!(draw.vertices[2].color(), Color::RED);
    }
}
