//! Line segment with per-endpoint colour and texture coordinate
//!
//! A line at unit thickness is two vertices drawn as a line list. Any thicker
//! line becomes a quad expanded along the segment normal.

use crate::foundation::math::Vec2;
use crate::render::color::Color;
use crate::render::queue::{Batch, RenderQueue};
use crate::render::renderable::{Anchored, ContextId, Drawable, Positionable, RenderableBase, TextureMapped};
use crate::render::transform::QUAD_INDICES;
use crate::render::vertex::PrimitiveTopology;
use crate::render::RenderResult;

/// Straight line between two points
#[derive(Debug)]
pub struct Line {
    base: RenderableBase,
    start: Vec2,
    end: Vec2,
    thickness: Vec2,
    anchor: Vec2,
    depth: f32,
    start_uv: Vec2,
    end_uv: Vec2,
}

impl Line {
    /// Create a unit thickness line
    pub fn new(name: impl Into<String>, context: ContextId, start: Vec2, end: Vec2) -> Self {
        Self {
            base: RenderableBase::new(name, context, 2),
            start,
            end,
            thickness: Vec2::new(1.0, 1.0),
            anchor: Vec2::zeros(),
            depth: 0.0,
            start_uv: Vec2::zeros(),
            end_uv: Vec2::new(1.0, 1.0),
        }
    }

    /// Starting point
    pub const fn start(&self) -> Vec2 {
        self.start
    }

    /// Move the starting point
    pub fn set_start(&mut self, start: Vec2) {
        if start != self.start {
            self.start = start;
            self.base.invalidate_vertices();
        }
    }

    /// Ending point
    pub const fn end(&self) -> Vec2 {
        self.end
    }

    /// Move the ending point
    pub fn set_end(&mut self, end: Vec2) {
        if end != self.end {
            self.end = end;
            self.base.invalidate_vertices();
        }
    }

    /// Thickness on each axis
    pub const fn thickness(&self) -> Vec2 {
        self.thickness
    }

    /// Set the thickness; each axis is at least one pixel
    pub fn set_thickness(&mut self, thickness: Vec2) {
        let thickness = Vec2::new(thickness.x.max(1.0), thickness.y.max(1.0));
        if thickness == self.thickness {
            return;
        }
        self.thickness = thickness;
        let count = if self.is_unit_thickness() { 2 } else { 4 };
        if count != self.base.vertices().len() {
            let (start, end) = (self.start_color(), self.end_color());
            self.base.resize_vertices(count);
            self.set_start_color(start);
            self.set_end_color(end);
        }
        self.base.invalidate_vertices();
        self.base.invalidate_texture();
    }

    /// Whether the line degenerates to a two vertex line primitive
    pub fn is_unit_thickness(&self) -> bool {
        self.thickness == Vec2::new(1.0, 1.0)
    }

    /// Topology used when drawing
    pub fn topology(&self) -> PrimitiveTopology {
        if self.is_unit_thickness() {
            PrimitiveTopology::LineList
        } else {
            PrimitiveTopology::TriangleList
        }
    }

    /// Colour at the starting point
    pub fn start_color(&self) -> Color {
        self.base.vertices()[0].color()
    }

    /// Set the colour at the starting point
    pub fn set_start_color(&mut self, color: Color) {
        for index in self.endpoint_vertices(0) {
            self.base.vertices_mut()[index].color = color.into();
        }
    }

    /// Colour at the ending point
    pub fn end_color(&self) -> Color {
        self.base.vertices()[1].color()
    }

    /// Set the colour at the ending point
    pub fn set_end_color(&mut self, color: Color) {
        for index in self.endpoint_vertices(1) {
            self.base.vertices_mut()[index].color = color.into();
        }
    }

    /// Texture coordinate at the starting point
    pub const fn start_texture_coordinate(&self) -> Vec2 {
        self.start_uv
    }

    /// Set the texture coordinate at the starting point
    pub fn set_start_texture_coordinate(&mut self, uv: Vec2) {
        if uv != self.start_uv {
            self.start_uv = uv;
            self.base.invalidate_texture();
        }
    }

    /// Texture coordinate at the ending point
    pub const fn end_texture_coordinate(&self) -> Vec2 {
        self.end_uv
    }

    /// Set the texture coordinate at the ending point
    pub fn set_end_texture_coordinate(&mut self, uv: Vec2) {
        if uv != self.end_uv {
            self.end_uv = uv;
            self.base.invalidate_texture();
        }
    }

    // vertices 0/2 sit on the start point, 1/3 on the end point
    fn endpoint_vertices(&self, endpoint: usize) -> impl Iterator<Item = usize> {
        let count = self.base.vertices().len();
        [endpoint, endpoint + 2].into_iter().filter(move |i| *i < count)
    }
}

impl Drawable for Line {
    fn base(&self) -> &RenderableBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RenderableBase {
        &mut self.base
    }

    fn update_vertices(&mut self) {
        let start = self.start - self.anchor;
        let end = self.end - self.anchor;
        let depth = self.depth;
        let points: Vec<Vec2> = if self.is_unit_thickness() {
            vec![start, end]
        } else {
            let direction = (end - start).try_normalize(f32::EPSILON).unwrap_or_else(|| Vec2::new(1.0, 0.0));
            let offset = Vec2::new(-direction.y * self.thickness.x, direction.x * self.thickness.y) * 0.5;
            vec![start + offset, end + offset, start - offset, end - offset]
        };
        for (vertex, point) in self.base.vertices_mut().iter_mut().zip(points) {
            vertex.set_xy(point);
            vertex.position[2] = depth;
        }
    }

    fn update_texture_coordinates(&mut self) {
        let (start, end) = if self.base.texture().is_some() {
            (self.start_uv, self.end_uv)
        } else {
            (Vec2::zeros(), Vec2::zeros())
        };
        for (index, vertex) in self.base.vertices_mut().iter_mut().enumerate() {
            let uv = if index % 2 == 0 { start } else { end };
            vertex.uv = [uv.x, uv.y];
        }
    }

    fn draw(&mut self, queue: &mut RenderQueue) -> RenderResult<()> {
        self.resolve();
        let indices = (!self.is_unit_thickness()).then_some(&QUAD_INDICES[..]);
        queue.submit(Batch::new(&self.base, self.topology(), self.base.vertices(), indices))
    }
}

impl Positionable for Line {
    fn position(&self) -> Vec2 {
        self.start
    }

    /// Moves both endpoints so the starting point lands on `position`
    fn set_position(&mut self, position: Vec2) {
        let delta = position - self.start;
        self.set_start(position);
        self.set_end(self.end + delta);
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

impl Anchored for Line {
    fn anchor(&self) -> Vec2 {
        self.anchor
    }

    fn set_anchor(&mut self, anchor: Vec2) {
        if anchor != self.anchor {
            self.anchor = anchor;
            self.base.invalidate_vertices();
        }
    }
}

impl TextureMapped for Line {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::device::RecordingDevice;
    use approx::assert_relative_eq;

    fn line() -> (std::rc::Rc<std::cell::RefCell<RecordingDevice>>, RenderQueue, Line) {
        let recorder = RecordingDevice::shared();
        let context = ContextId::next();
        let queue = RenderQueue::new(recorder.clone(), context, 1024);
        let line = Line::new("line", context, Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0));
        (recorder, queue, line)
    }

    #[test]
    fn test_unit_thickness_is_two_vertex_line_list() {
        let (recorder, mut queue, mut line) = line();
        line.draw(&mut queue).unwrap();
        queue.flush().unwrap();

        let draws = recorder.borrow();
        let draw = &draws.draws()[0];
        assert_eq!(draw.vertices.len(), 2);
        assert_eq!(draw.state.topology, PrimitiveTopology::LineList);
        assert!(draw.indices.is_none());
    }

    #[test]
    fn test_thick_line_is_indexed_quad() {
        let (recorder, mut queue, mut line) = line();
        line.set_thickness(Vec2::new(2.0, 1.0));
        line.draw(&mut queue).unwrap();
        queue.flush().unwrap();

        let draws = recorder.borrow();
        let draw = &draws.draws()[0];
        assert_eq!(draw.vertices.len(), 4);
        assert_eq!(draw.state.topology, PrimitiveTopology::TriangleList);
        assert_eq!(draw.indices.as_deref(), Some(&QUAD_INDICES[..]));
    }

    #[test]
    fn test_thick_line_expands_along_normal() {
        let (_recorder, _queue, mut line) = line();
        line.set_thickness(Vec2::new(2.0, 2.0));
        line.resolve();
        let corners: Vec<Vec2> = line.base().vertices().iter().map(|v| v.xy()).collect();
        assert_relative_eq!(corners[0], Vec2::new(0.0, 1.0));
        assert_relative_eq!(corners[1], Vec2::new(10.0, 1.0));
        assert_relative_eq!(corners[2], Vec2::new(0.0, -1.0));
        assert_relative_eq!(corners[3], Vec2::new(10.0, -1.0));
    }

    #[test]
    fn test_endpoint_colors_survive_thickness_change() {
        let (_recorder, _queue, mut line) = line();
        line.set_start_color(Color::RED);
        line.set_end_color(Color::BLUE);
        line.set_thickness(Vec2::new(3.0, 3.0));
        assert_eq!(line.base().vertices()[2].color(), Color::RED);
        assert_eq!(line.base().vertices()[3].color(), Color::BLUE);
        line.set_thickness(Vec2::new(1.0, 1.0));
        assert_eq!(line.start_color(), Color::RED);
        assert_eq!(line.end_color(), Color::BLUE);
    }

    #[test]
    fn test_moving_keeps_extent() {
        let (_recorder, _queue, mut line) = line();
        line.set_position(Vec2::new(5.0, 5.0));
        assert_eq!(line.end(), Vec2::new(15.0, 5.0));
    }
}
