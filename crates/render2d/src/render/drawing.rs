//! # Immediate Drawing
//!
//! One-call drawing of shapes, text and textures without creating
//! primitives. A [`Drawing`] borrows the renderer's queue and a set of shared
//! primitives; each call copies the drawing state onto the matching shared
//! primitive, reconfigures it and submits it. Consecutive calls with the same
//! state batch like any other submissions.

use std::rc::Rc;

use crate::foundation::math::{RectF, Vec2};
use crate::render::color::Color;
use crate::render::primitives::{Ellipse, Line, Point, Rectangle, Triangle, TrianglePoint};
use crate::render::queue::RenderQueue;
use crate::render::renderable::{ContextId, Drawable, Positionable, RenderState, RenderableBase, TextureMapped};
use crate::render::states::{
    AlphaTestRange, BlendState, BlendingMode, CullingMode, DepthStencilState, SamplerState, SmoothingMode,
};
use crate::render::text::{GlyphSource, Text};
use crate::render::texture::Texture;
use crate::render::RenderResult;

/// Shared primitives and state owned by the renderer between drawing calls
#[derive(Debug)]
pub(crate) struct DrawingState {
    state: RenderState,
    default_quality: u32,
    rectangle: Rectangle,
    ellipse: Ellipse,
    line: Line,
    triangle: Triangle,
    point: Point,
    text: Text,
}

impl DrawingState {
    pub(crate) fn new(context: ContextId, default_quality: u32) -> Self {
        let origin = [TrianglePoint::new(Vec2::zeros()); 3];
        Self {
            state: RenderState::default(),
            default_quality,
            rectangle: Rectangle::new("drawing.rectangle", context, RectF::default(), true),
            ellipse: Ellipse::new("drawing.ellipse", context, Vec2::zeros(), Vec2::zeros(), default_quality, true),
            line: Line::new("drawing.line", context, Vec2::zeros(), Vec2::zeros()),
            triangle: Triangle::new("drawing.triangle", context, origin, true),
            point: Point::new("drawing.point", context, Vec2::zeros()),
            text: Text::new("drawing.text", context, None),
        }
    }
}

fn apply_state(base: &mut RenderableBase, state: RenderState, texture: Option<&Texture>) {
    base.set_render_state(state);
    base.set_texture(texture.cloned());
}

/// Immediate-mode drawing bound to a renderer's queue
pub struct Drawing<'a> {
    shared: &'a mut DrawingState,
    queue: &'a mut RenderQueue,
}

impl<'a> Drawing<'a> {
    pub(crate) fn new(shared: &'a mut DrawingState, queue: &'a mut RenderQueue) -> Self {
        Self { shared, queue }
    }

    /// Blending preset inferred from the blend state
    pub fn blending_mode(&self) -> BlendingMode {
        self.shared.state.blend.blending_mode()
    }

    /// Apply a blending preset to later calls
    pub fn set_blending_mode(&mut self, mode: BlendingMode) {
        self.shared.state.blend = self.shared.state.blend.with_blending_mode(mode);
    }

    /// Smoothing preset inferred from the sampler
    pub fn smoothing_mode(&self) -> SmoothingMode {
        self.shared.state.sampler.smoothing_mode()
    }

    /// Apply a smoothing preset to later calls
    pub fn set_smoothing_mode(&mut self, mode: SmoothingMode) {
        self.shared.state.sampler = self.shared.state.sampler.with_smoothing_mode(mode);
    }

    /// Blend state used by later calls
    pub const fn blend_state(&self) -> BlendState {
        self.shared.state.blend
    }

    /// Replace the blend state
    pub fn set_blend_state(&mut self, blend: BlendState) {
        self.shared.state.blend = blend;
    }

    /// Depth/stencil state used by later calls
    pub const fn depth_stencil_state(&self) -> DepthStencilState {
        self.shared.state.depth_stencil
    }

    /// Replace the depth/stencil state
    pub fn set_depth_stencil_state(&mut self, depth_stencil: DepthStencilState) {
        self.shared.state.depth_stencil = depth_stencil;
    }

    /// Sampler state used by later calls
    pub const fn sampler_state(&self) -> SamplerState {
        self.shared.state.sampler
    }

    /// Replace the sampler state
    pub fn set_sampler_state(&mut self, sampler: SamplerState) {
        self.shared.state.sampler = sampler;
    }

    /// Culling mode used by later calls
    pub const fn culling_mode(&self) -> CullingMode {
        self.shared.state.culling
    }

    /// Set the culling mode; `Unknown` is ignored
    pub fn set_culling_mode(&mut self, culling: CullingMode) {
        if culling == CullingMode::Unknown {
            log::debug!("Ignoring unknown culling mode for immediate drawing");
            return;
        }
        self.shared.state.culling = culling;
    }

    /// Alpha test range used by later calls
    pub const fn alpha_test(&self) -> AlphaTestRange {
        self.shared.state.alpha_test
    }

    /// Set the alpha test range
    pub fn set_alpha_test(&mut self, range: AlphaTestRange) {
        self.shared.state.alpha_test = range;
    }

    /// Draw a solid rectangle
    pub fn filled_rectangle(&mut self, rect: RectF, color: Color) -> RenderResult<()> {
        self.rectangle(rect, color, true, Vec2::new(1.0, 1.0), None, RectF::unit())
    }

    /// Draw a rectangle filled with a region of `texture`
    pub fn filled_rectangle_textured(
        &mut self,
        rect: RectF,
        color: Color,
        texture: &Texture,
        texture_region: RectF,
    ) -> RenderResult<()> {
        self.rectangle(rect, color, true, Vec2::new(1.0, 1.0), Some(texture), texture_region)
    }

    /// Draw a rectangle outline
    pub fn draw_rectangle(&mut self, rect: RectF, color: Color, thickness: Vec2) -> RenderResult<()> {
        self.rectangle(rect, color, false, thickness, None, RectF::unit())
    }

    fn rectangle(
        &mut self,
        rect: RectF,
        color: Color,
        filled: bool,
        thickness: Vec2,
        texture: Option<&Texture>,
        texture_region: RectF,
    ) -> RenderResult<()> {
        let shape = &mut self.shared.rectangle;
        apply_state(shape.base_mut(), self.shared.state, texture);
        shape.set_rectangle(rect);
        shape.set_filled(filled);
        shape.set_line_thickness(thickness);
        shape.set_texture_region(texture_region);
        shape.base_mut().set_color(color);
        shape.draw(self.queue)
    }

    /// Draw `texture` stretched over `region`
    pub fn blit(&mut self, texture: &Texture, region: RectF, texture_region: RectF) -> RenderResult<()> {
        self.filled_rectangle_textured(region, Color::WHITE, texture, texture_region)
    }

    /// Draw the whole of `texture` at its pixel size
    pub fn blit_at(&mut self, texture: &Texture, position: Vec2) -> RenderResult<()> {
        self.blit(texture, RectF::from_location_size(position, texture.size()), RectF::unit())
    }

    /// Draw a solid ellipse inscribed in `bounds`
    ///
    /// `quality` defaults to the renderer's ellipse quality.
    pub fn filled_ellipse(&mut self, bounds: RectF, color: Color, quality: Option<u32>) -> RenderResult<()> {
        self.ellipse(bounds, color, quality, true, Vec2::new(1.0, 1.0))
    }

    /// Draw an ellipse outline inscribed in `bounds`
    pub fn draw_ellipse(&mut self, bounds: RectF, color: Color, quality: Option<u32>, thickness: Vec2) -> RenderResult<()> {
        self.ellipse(bounds, color, quality, false, thickness)
    }

    fn ellipse(&mut self, bounds: RectF, color: Color, quality: Option<u32>, filled: bool, thickness: Vec2) -> RenderResult<()> {
        let quality = quality.unwrap_or(self.shared.default_quality);
        let shape = &mut self.shared.ellipse;
        apply_state(shape.base_mut(), self.shared.state, None);
        shape.set_quality(quality);
        shape.set_position(bounds.location() + bounds.size() * 0.5);
        shape.set_size(bounds.size());
        shape.set_filled(filled);
        shape.set_line_thickness(thickness);
        shape.base_mut().set_color(color);
        shape.draw(self.queue)
    }

    /// Draw a solid triangle offset by `position`
    pub fn filled_triangle(
        &mut self,
        position: Vec2,
        points: [TrianglePoint; 3],
        texture: Option<&Texture>,
    ) -> RenderResult<()> {
        self.triangle(position, points, true, Vec2::new(1.0, 1.0), texture)
    }

    /// Draw a triangle outline offset by `position`
    pub fn draw_triangle(
        &mut self,
        position: Vec2,
        points: [TrianglePoint; 3],
        thickness: Vec2,
        texture: Option<&Texture>,
    ) -> RenderResult<()> {
        self.triangle(position, points, false, thickness, texture)
    }

    fn triangle(
        &mut self,
        position: Vec2,
        points: [TrianglePoint; 3],
        filled: bool,
        thickness: Vec2,
        texture: Option<&Texture>,
    ) -> RenderResult<()> {
        let shape = &mut self.shared.triangle;
        apply_state(shape.base_mut(), self.shared.state, texture);
        shape.set_position(position);
        for (index, point) in points.into_iter().enumerate() {
            shape.set_point(index, point)?;
        }
        shape.set_filled(filled);
        shape.set_line_thickness(thickness);
        shape.draw(self.queue)
    }

    /// Draw a line segment
    pub fn draw_line(&mut self, start: Vec2, end: Vec2, color: Color, thickness: Vec2) -> RenderResult<()> {
        let shape = &mut self.shared.line;
        apply_state(shape.base_mut(), self.shared.state, None);
        shape.set_start(start);
        shape.set_end(end);
        shape.set_thickness(thickness);
        shape.base_mut().set_color(color);
        shape.draw(self.queue)
    }

    /// Draw a point
    pub fn draw_point(&mut self, position: Vec2, color: Color, thickness: Vec2) -> RenderResult<()> {
        let shape = &mut self.shared.point;
        apply_state(shape.base_mut(), self.shared.state, None);
        shape.set_position(position);
        shape.set_thickness(thickness);
        shape.base_mut().set_color(color);
        shape.draw(self.queue)
    }

    /// Draw a string; empty strings draw nothing
    pub fn draw_string(
        &mut self,
        font: &Rc<dyn GlyphSource>,
        text: &str,
        position: Vec2,
        color: Color,
    ) -> RenderResult<()> {
        self.string(font, text, position, color, None)
    }

    /// Draw a string with a drop shadow
    pub fn draw_string_with_shadow(
        &mut self,
        font: &Rc<dyn GlyphSource>,
        text: &str,
        position: Vec2,
        color: Color,
        shadow_offset: Vec2,
        shadow_opacity: f32,
    ) -> RenderResult<()> {
        self.string(font, text, position, color, Some((shadow_offset, shadow_opacity)))
    }

    fn string(
        &mut self,
        font: &Rc<dyn GlyphSource>,
        text: &str,
        position: Vec2,
        color: Color,
        shadow: Option<(Vec2, f32)>,
    ) -> RenderResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        let shape = &mut self.shared.text;
        apply_state(shape.base_mut(), self.shared.state, None);
        shape.set_font(Some(Rc::clone(font)));
        shape.set_text(text);
        shape.set_position(position);
        shape.set_color(color);
        shape.set_shadow_enabled(shadow.is_some());
        if let Some((offset, opacity)) = shadow {
            shape.set_shadow_offset(offset);
            shape.set_shadow_opacity(opacity);
        }
        shape.draw(self.queue)
    }

    /// Measure a string, clamped to `bounds`
    ///
    /// With `word_wrap` the string wraps at the bounds width.
    pub fn measure_string(&mut self, font: &Rc<dyn GlyphSource>, text: &str, word_wrap: bool, bounds: Vec2) -> Vec2 {
        let shape = &mut self.shared.text;
        shape.set_font(Some(Rc::clone(font)));
        let size = shape.measure_text(text, word_wrap, bounds.x);
        Vec2::new(size.x.min(bounds.x), size.y.min(bounds.y))
    }
}

impl std::fmt::Debug for Drawing<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Drawing")
            .field("state", &self.shared.state)
            .field("queue", &self.queue)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::device::RecordingDevice;
    use crate::render::text::Font;
    use crate::render::texture::TextureRegistry;
    use crate::render::vertex::PrimitiveTopology;
    use std::cell::RefCell;

    fn setup() -> (Rc<RefCell<RecordingDevice>>, RenderQueue, DrawingState) {
        let recorder = RecordingDevice::shared();
        let context = ContextId::next();
        let queue = RenderQueue::new(recorder.clone(), context, 4096);
        (recorder, queue, DrawingState::new(context, 16))
    }

    #[test]
    fn test_same_state_calls_batch_together() {
        let (recorder, mut queue, mut shared) = setup();
        let mut drawing = Drawing::new(&mut shared, &mut queue);
        drawing.filled_rectangle(RectF::new(0.0, 0.0, 10.0, 10.0), Color::RED).unwrap();
        drawing.filled_rectangle(RectF::new(20.0, 0.0, 10.0, 10.0), Color::BLUE).unwrap();
        drawing.filled_ellipse(RectF::new(0.0, 20.0, 10.0, 10.0), Color::GREEN, None).unwrap();
        queue.flush().unwrap();

        let device = recorder.borrow();
        assert_eq!(device.draws().len(), 1);
        assert_eq!(device.draws()[0].vertices.len(), 4 + 4 + 17);
        assert_eq!(device.draws()[0].vertices[4].color(), Color::BLUE);
    }

    #[test]
    fn test_blending_change_splits_batches() {
        let (recorder, mut queue, mut shared) = setup();
        let mut drawing = Drawing::new(&mut shared, &mut queue);
        drawing.draw_line(Vec2::zeros(), Vec2::new(10.0, 0.0), Color::WHITE, Vec2::new(1.0, 1.0)).unwrap();
        drawing.set_blending_mode(BlendingMode::Additive);
        drawing.draw_line(Vec2::zeros(), Vec2::new(0.0, 10.0), Color::WHITE, Vec2::new(1.0, 1.0)).unwrap();
        assert_eq!(drawing.blending_mode(), BlendingMode::Additive);
        queue.flush().unwrap();

        let device = recorder.borrow();
        assert_eq!(device.draws().len(), 2);
        assert_eq!(device.draws()[1].state.topology, PrimitiveTopology::LineList);
        assert_eq!(device.draws()[1].state.render.blend.blending_mode(), BlendingMode::Additive);
    }

    #[test]
    fn test_blit_binds_texture() {
        let registry = TextureRegistry::new();
        let texture = registry.register("splash", 64, 32).unwrap();
        let (recorder, mut queue, mut shared) = setup();
        let mut drawing = Drawing::new(&mut shared, &mut queue);
        drawing.blit_at(&texture, Vec2::new(5.0, 5.0)).unwrap();
        queue.flush().unwrap();

        let device = recorder.borrow();
        let draw = &device.draws()[0];
        assert_eq!(draw.state.texture, Some(texture.id()));
        assert_eq!(draw.vertices[3].xy(), Vec2::new(69.0, 37.0));
        assert_eq!(draw.vertices[3].uv, [1.0, 1.0]);
    }

    #[test]
    fn test_measure_string_is_clamped() {
        let registry = TextureRegistry::new();
        let texture = registry.register("font", 20, 10).unwrap();
        let font: Rc<dyn GlyphSource> = Rc::new(Font::from_grid("grid", &texture, Vec2::new(10.0, 10.0), "ab"));
        let (_recorder, mut queue, mut shared) = setup();
        let mut drawing = Drawing::new(&mut shared, &mut queue);
        assert_eq!(drawing.measure_string(&font, "abab", false, Vec2::new(100.0, 100.0)), Vec2::new(40.0, 10.0));
        assert_eq!(drawing.measure_string(&font, "abab", false, Vec2::new(25.0, 5.0)), Vec2::new(25.0, 5.0));
    }

    #[test]
    fn test_empty_string_draws_nothing() {
        let registry = TextureRegistry::new();
        let texture = registry.register("font", 20, 10).unwrap();
        let font: Rc<dyn GlyphSource> = Rc::new(Font::from_grid("grid", &texture, Vec2::new(10.0, 10.0), "ab"));
        let (_recorder, mut queue, mut shared) = setup();
        let mut drawing = Drawing::new(&mut shared, &mut queue);
        drawing.draw_string(&font, "", Vec2::zeros(), Color::WHITE).unwrap();
        drawing.draw_string(&font, "ab", Vec2::zeros(), Color::WHITE).unwrap();
        assert_eq!(queue.pending_vertices(), 8);
    }
}
