//! # Ellipse
//!
//! Ellipse approximated by `quality` segments of a unit circle scaled to the
//! ellipse size.
//!
//! ## Layout
//!
//! Vertex 0 is the centre, vertices `1..=quality` lie on the rim. A filled
//! ellipse is drawn as an indexed fan; an outline is drawn as `quality` lines
//! through an internal [`Line`], with rim points rounded up to whole pixels.
//! Each rim vertex carries the colour of its segment.

use std::f32::consts::TAU;

use super::{sync_outline, Line};
use crate::core::config::{MAX_ELLIPSE_QUALITY, MIN_ELLIPSE_QUALITY};
use crate::foundation::math::Vec2;
use crate::render::color::Color;
use crate::render::queue::{Batch, RenderQueue};
use crate::render::renderable::{
    impl_transform_capabilities, ContextId, Drawable, HasTransform, Positionable, RenderableBase, TextureMapped,
};
use crate::render::transform::Transform2D;
use crate::render::vertex::PrimitiveTopology;
use crate::render::RenderResult;

/// Filled or outlined ellipse centred on its position
#[derive(Debug)]
pub struct Ellipse {
    base: RenderableBase,
    transform: Transform2D,
    size: Vec2,
    quality: u32,
    filled: bool,
    line_thickness: Vec2,
    // unit circle points, one per segment
    directions: Vec<Vec2>,
    indices: Vec<u32>,
    outline: Line,
}

impl Ellipse {
    /// Create an ellipse of `size` centred on `center`
    ///
    /// A `quality` outside `4..=256` falls back to 64 segments.
    pub fn new(
        name: impl Into<String>,
        context: ContextId,
        center: Vec2,
        size: Vec2,
        quality: u32,
        filled: bool,
    ) -> Self {
        let name = name.into();
        let quality = if Self::is_valid_quality(quality) { quality } else { 64 };
        let outline = Line::new(format!("{name}.outline"), context, Vec2::zeros(), Vec2::zeros());
        let mut ellipse = Self {
            base: RenderableBase::new(name, context, quality as usize + 1),
            transform: Transform2D {
                position: center,
                ..Transform2D::default()
            },
            size,
            quality,
            filled,
            line_thickness: Vec2::new(1.0, 1.0),
            directions: Vec::new(),
            indices: Vec::new(),
            outline,
        };
        ellipse.build_segments();
        ellipse
    }

    fn is_valid_quality(quality: u32) -> bool {
        (MIN_ELLIPSE_QUALITY..=MAX_ELLIPSE_QUALITY).contains(&quality)
    }

    fn build_segments(&mut self) {
        let quality = self.quality;
        self.directions = (0..quality)
            .map(|i| {
                let (sin, cos) = (TAU * i as f32 / quality as f32).sin_cos();
                Vec2::new(cos, sin)
            })
            .collect();
        self.indices = (0..quality)
            .flat_map(|i| [0, i + 1, (i + 1) % quality + 1])
            .collect();
    }

    /// Number of segments
    pub const fn quality(&self) -> u32 {
        self.quality
    }

    /// Change the segment count; values outside `4..=256` are ignored
    pub fn set_quality(&mut self, quality: u32) {
        if quality == self.quality {
            return;
        }
        if !Self::is_valid_quality(quality) {
            log::debug!("Ignoring ellipse quality {quality} for '{}'", self.base.name());
            return;
        }

        let last = self.base.vertices().last().map_or(Color::WHITE, |v| v.color());
        let count = quality as usize + 1;
        let old = self.base.vertices().len();
        self.base.resize_vertices(count);
        for vertex in self.base.vertices_mut().iter_mut().skip(old) {
            vertex.color = last.into();
        }
        self.quality = quality;
        self.build_segments();
        self.base.refresh();
    }

    /// Width and height
    pub const fn size(&self) -> Vec2 {
        self.size
    }

    /// Resize
    pub fn set_size(&mut self, size: Vec2) {
        if size != self.size {
            self.size = size;
            self.base.refresh();
        }
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

    /// Colour of the centre vertex
    pub fn center_color(&self) -> Color {
        self.base.vertices()[0].color()
    }

    /// Set the colour of the centre vertex
    pub fn set_center_color(&mut self, color: Color) {
        self.base.vertices_mut()[0].color = color.into();
    }

    /// Colour of every segment in order
    pub fn segment_colors(&self) -> Vec<Color> {
        self.base.vertices()[1..].iter().map(|v| v.color()).collect()
    }

    /// Colour of one segment
    pub fn segment_color(&self, segment: usize) -> Option<Color> {
        self.base.vertices().get(segment + 1).map(|v| v.color())
    }

    /// Set the colour of one segment; out-of-range segments are ignored
    pub fn set_segment_color(&mut self, segment: usize, color: Color) {
        match self.base.vertices_mut().get_mut(segment + 1) {
            Some(vertex) => vertex.color = color.into(),
            None => log::debug!("Ignoring colour for missing ellipse segment {segment}"),
        }
    }

    fn local_points(&self) -> impl Iterator<Item = Vec2> + '_ {
        let radius = self.size * 0.5;
        std::iter::once(Vec2::zeros()).chain(self.directions.iter().map(move |d| d.component_mul(&radius)))
    }

    fn draw_outline(&mut self, queue: &mut RenderQueue) -> RenderResult<()> {
        let rotation = self.transform.rotation();
        let rim: Vec<Vec2> = self
            .local_points()
            .skip(1)
            .map(|point| self.transform.apply_ceiled(point, &rotation))
            .collect();

        sync_outline(&mut self.outline, &self.base);
        self.outline.set_thickness(self.line_thickness);
        self.outline.set_depth(self.transform.depth);
        let segments = rim.len();
        for i in 0..segments {
            let next = (i + 1) % segments;
            let (start, end) = (&self.base.vertices()[i + 1], &self.base.vertices()[next + 1]);
            self.outline.set_start(rim[i]);
            self.outline.set_end(rim[next]);
            self.outline.set_start_color(start.color());
            self.outline.set_end_color(end.color());
            self.outline.set_start_texture_coordinate(start.uv());
            self.outline.set_end_texture_coordinate(end.uv());
            self.outline.draw(queue)?;
        }
        Ok(())
    }
}

impl Drawable for Ellipse {
    fn base(&self) -> &RenderableBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RenderableBase {
        &mut self.base
    }

    fn update_vertices(&mut self) {
        let points: Vec<Vec2> = self.local_points().collect();
        self.transform.transform_into(&points, self.base.vertices_mut());
    }

    fn update_texture_coordinates(&mut self) {
        if self.base.texture().is_none() {
            for vertex in self.base.vertices_mut() {
                vertex.uv = [0.0, 0.0];
            }
            return;
        }

        let region = self.base.texture_region();
        let size = self.size;
        let uvs: Vec<[f32; 2]> = self
            .local_points()
            .map(|point| {
                let relative = |value: f32, extent: f32| if extent == 0.0 { 0.5 } else { value / extent + 0.5 };
                [
                    region.left() + relative(point.x, size.x) * region.width,
                    region.top() + relative(point.y, size.y) * region.height,
                ]
            })
            .collect();
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
            Some(self.indices.as_slice()),
        ))
    }
}

impl HasTransform for Ellipse {
    fn transform(&self) -> &Transform2D {
        &self.transform
    }

    fn transform_mut(&mut self) -> &mut Transform2D {
        &mut self.transform
    }
}

impl_transform_capabilities!(Ellipse);

impl TextureMapped for Ellipse {}
