//! Triangle made of three independent points

use super::{sync_outline, Line};
use crate::foundation::math::Vec2;
use crate::render::color::Color;
use crate::render::queue::{Batch, RenderQueue};
use crate::render::renderable::{
    impl_transform_capabilities, ContextId, Drawable, HasTransform, Positionable, RenderableBase,
};
use crate::render::transform::Transform2D;
use crate::render::vertex::PrimitiveTopology;
use crate::render::{RenderError, RenderResult};

/// One corner of a [`Triangle`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrianglePoint {
    /// Position relative to the triangle origin
    pub position: Vec2,
    /// Vertex colour
    pub color: Color,
    /// Texture coordinate in texture space
    pub texture_coordinate: Vec2,
}

impl TrianglePoint {
    /// White point at `position`
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            color: Color::WHITE,
            texture_coordinate: Vec2::zeros(),
        }
    }

    /// Set the colour
    pub const fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Set the texture coordinate
    pub const fn with_texture_coordinate(mut self, uv: Vec2) -> Self {
        self.texture_coordinate = uv;
        self
    }
}

/// Filled or outlined triangle
#[derive(Debug)]
pub struct Triangle {
    base: RenderableBase,
    transform: Transform2D,
    positions: [Vec2; 3],
    texture_coordinates: [Vec2; 3],
    filled: bool,
    line_thickness: Vec2,
    outline: Line,
}

impl Triangle {
    /// Create a triangle from three points
    pub fn new(name: impl Into<String>, context: ContextId, points: [TrianglePoint; 3], filled: bool) -> Self {
        let name = name.into();
        let outline = Line::new(format!("{name}.outline"), context, Vec2::zeros(), Vec2::zeros());
        let mut base = RenderableBase::new(name, context, 3);
        for (vertex, point) in base.vertices_mut().iter_mut().zip(&points) {
            vertex.color = point.color.into();
        }
        Self {
            base,
            transform: Transform2D::default(),
            positions: points.map(|p| p.position),
            texture_coordinates: points.map(|p| p.texture_coordinate),
            filled,
            line_thickness: Vec2::new(1.0, 1.0),
            outline,
        }
    }

    fn check_index(index: usize) -> RenderResult<()> {
        if index > 2 {
            return Err(RenderError::InvalidArgument(format!(
                "triangle point index {index} is out of range 0..=2"
            )));
        }
        Ok(())
    }

    /// Read one corner
    pub fn point(&self, index: usize) -> RenderResult<TrianglePoint> {
        Self::check_index(index)?;
        Ok(TrianglePoint {
            position: self.positions[index],
            color: self.base.vertices()[index].color(),
            texture_coordinate: self.texture_coordinates[index],
        })
    }

    /// Replace one corner
    pub fn set_point(&mut self, index: usize, point: TrianglePoint) -> RenderResult<()> {
        Self::check_index(index)?;
        self.positions[index] = point.position;
        self.texture_coordinates[index] = point.texture_coordinate;
        self.base.vertices_mut()[index].color = point.color.into();
        self.base.refresh();
        Ok(())
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

    fn draw_outline(&mut self, queue: &mut RenderQueue) -> RenderResult<()> {
        let rotation = self.transform.rotation();
        let corners = self.positions.map(|p| self.transform.apply_ceiled(p, &rotation));

        sync_outline(&mut self.outline, &self.base);
        self.outline.set_thickness(self.line_thickness);
        self.outline.set_depth(self.transform.depth);
        for i in 0..3 {
            let next = (i + 1) % 3;
            let (start, end) = (&self.base.vertices()[i], &self.base.vertices()[next]);
            self.outline.set_start(corners[i]);
            self.outline.set_end(corners[next]);
            self.outline.set_start_color(start.color());
            self.outline.set_end_color(end.color());
            self.outline.set_start_texture_coordinate(start.uv());
            self.outline.set_end_texture_coordinate(end.uv());
            self.outline.draw(queue)?;
        }
        Ok(())
    }
}

impl Drawable for Triangle {
    fn base(&self) -> &RenderableBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RenderableBase {
        &mut self.base
    }

    fn update_vertices(&mut self) {
        self.transform.transform_into(&self.positions, self.base.vertices_mut());
    }

    fn update_texture_coordinates(&mut self) {
        let textured = self.base.texture().is_some();
        let coordinates = self.texture_coordinates;
        for (vertex, uv) in self.base.vertices_mut().iter_mut().zip(coordinates) {
            vertex.uv = if textured { [uv.x, uv.y] } else { [0.0, 0.0] };
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
            None,
        ))
    }
}

impl HasTransform for Triangle {
    fn transform(&self) -> &Transform2D {
        &self.transform
    }

    fn transform_mut(&mut self) -> &mut Transform2D {
        &mut self.transform
    }
}

impl_transform_capabilities!(Triangle);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::device::RecordingDevice;

    fn points() -> [TrianglePoint; 3] {
        [
            TrianglePoint::new(Vec2::new(0.0, 0.0)).with_color(Color::RED),
            TrianglePoint::new(Vec2::new(10.0, 0.0)),
            TrianglePoint::new(Vec2::new(0.0, 10.0)),
        ]
    }

    #[test]
    fn test_point_index_out_of_range() {
        let mut triangle = Triangle::new("tri", ContextId::next(), points(), true);
        assert!(matches!(triangle.point(3), Err(RenderError::InvalidArgument(_))));
        let before = triangle.point(2).unwrap();
        assert!(triangle.set_point(3, TrianglePoint::new(Vec2::zeros())).is_err());
        assert_eq!(triangle.point(2).unwrap(), before);
        assert_eq!(triangle.point(0).unwrap().color, Color::RED);
    }

    #[test]
    fn test_filled_and_outlined_draws() {
        let recorder = RecordingDevice::shared();
        let context = ContextId::next();
        let mut queue = RenderQueue::new(recorder.clone(), context, 64);
        let mut triangle = Triangle::new("tri", context, points(), true);
        triangle.set_position(Vec2::new(5.0, 5.0));
        triangle.draw(&mut queue).unwrap();
        triangle.set_filled(false);
        triangle.draw(&mut queue).unwrap();
        queue.flush().unwrap();

        let device = recorder.borrow();
        let draws = device.draws();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].state.topology, PrimitiveTopology::TriangleList);
        assert_eq!(draws[0].vertices[1].xy(), Vec2::new(15.0, 5.0));
        assert_eq!(draws[1].state.topology, PrimitiveTopology::LineList);
        assert_eq!(draws[1].vertices.len(), 6);
        assert_eq!(draws[1].vertices[0].color(), Color::RED);
    }
}
