//! # 2D Renderer
//!
//! Factory and frame driver bound to one rendering context.
//!
//! ## Architecture
//!
//! - **Renderer2D** owns the batching queue, the texture registry and the
//!   shared primitives behind the [`Drawing`] facade
//! - Every `create_*` call stamps the new primitive with the renderer's
//!   [`ContextId`] and injects the texture registry as its deferred-texture
//!   lookup, so the queue accepts its geometry and named textures resolve
//! - `load*` reads persisted sprites and polygons into the same context

use std::io::Read;
use std::path::Path;
use std::rc::Rc;

use super::camera::ViewProjection;
use super::color::Color;
use super::drawing::{Drawing, DrawingState};
use super::primitives::{Ellipse, Line, Point, Polygon, PolygonType, Rectangle, Sprite, Triangle, TrianglePoint};
use super::queue::{BatchStats, RenderQueue};
use super::renderable::{ContextId, Drawable, Positionable};
use super::text::{GlyphSource, Text};
use super::texture::{TextureLookup, TextureRegistry};
use super::{RenderError, RenderResult, SharedDevice};
use crate::core::config::RendererConfig;
use crate::foundation::math::{RectF, Vec2};
use crate::io::{self, LoadContext, Loadable, PersistResult};

fn check_name(name: &str) -> RenderResult<()> {
    if name.trim().is_empty() {
        return Err(RenderError::InvalidArgument("primitive name must not be empty".to_string()));
    }
    Ok(())
}

/// Renderer bound to one context and device
pub struct Renderer2D {
    context: ContextId,
    config: RendererConfig,
    device: SharedDevice,
    queue: RenderQueue,
    textures: Rc<TextureRegistry>,
    drawing: DrawingState,
}

impl Renderer2D {
    /// Create a renderer drawing on `device`
    pub fn new(device: SharedDevice, config: RendererConfig) -> RenderResult<Self> {
        config
            .validate()
            .map_err(|e| RenderError::InvalidArgument(e.to_string()))?;

        let context = ContextId::next();
        let queue = RenderQueue::new(Rc::clone(&device), context, config.vertex_cache_size);
        let drawing = DrawingState::new(context, config.default_ellipse_quality);
        log::info!(
            "Created 2D renderer for context {} (vertex cache {}, ellipse quality {})",
            context.value(),
            config.vertex_cache_size,
            config.default_ellipse_quality
        );

        Ok(Self {
            context,
            config,
            device,
            queue,
            textures: Rc::new(TextureRegistry::new()),
            drawing,
        })
    }

    /// Use `camera` for polygons drawn from resident buffers
    pub fn with_camera(mut self, camera: impl ViewProjection + 'static) -> Self {
        self.queue.set_camera(camera);
        self
    }

    /// Context stamped on every primitive this renderer creates
    pub const fn context(&self) -> ContextId {
        self.context
    }

    /// Active configuration
    pub const fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Device the renderer draws on
    pub const fn device(&self) -> &SharedDevice {
        &self.device
    }

    /// Texture registry used to resolve deferred texture names
    pub const fn textures(&self) -> &Rc<TextureRegistry> {
        &self.textures
    }

    /// Batching queue
    pub fn queue(&mut self) -> &mut RenderQueue {
        &mut self.queue
    }

    /// Batching statistics
    pub const fn stats(&self) -> &BatchStats {
        self.queue.stats()
    }

    fn lookup(&self) -> Rc<dyn TextureLookup> {
        Rc::clone(&self.textures) as Rc<dyn TextureLookup>
    }

    fn bind<D: Drawable>(&self, mut primitive: D) -> D {
        primitive.base_mut().set_texture_lookup(self.lookup());
        primitive
    }

    /// Create a sprite of `size` pixels
    pub fn create_sprite(&self, name: &str, size: Vec2) -> RenderResult<Sprite> {
        check_name(name)?;
        Ok(self.bind(Sprite::new(name, self.context, size)))
    }

    /// Create a rectangle covering `rect`
    pub fn create_rectangle(&self, name: &str, rect: RectF, color: Color, filled: bool) -> RenderResult<Rectangle> {
        check_name(name)?;
        let mut rectangle = self.bind(Rectangle::new(name, self.context, rect, filled));
        rectangle.base_mut().set_color(color);
        Ok(rectangle)
    }

    /// Create an ellipse with the configured default quality
    pub fn create_ellipse(
        &self,
        name: &str,
        center: Vec2,
        size: Vec2,
        color: Color,
        filled: bool,
    ) -> RenderResult<Ellipse> {
        check_name(name)?;
        let quality = self.config.default_ellipse_quality;
        let mut ellipse = self.bind(Ellipse::new(name, self.context, center, size, quality, filled));
        ellipse.base_mut().set_color(color);
        Ok(ellipse)
    }

    /// Create a line from `start` to `end`
    pub fn create_line(&self, name: &str, start: Vec2, end: Vec2, color: Color) -> RenderResult<Line> {
        check_name(name)?;
        let mut line = self.bind(Line::new(name, self.context, start, end));
        line.base_mut().set_color(color);
        Ok(line)
    }

    /// Create a triangle from three points
    pub fn create_triangle(&self, name: &str, points: [TrianglePoint; 3], filled: bool) -> RenderResult<Triangle> {
        check_name(name)?;
        Ok(self.bind(Triangle::new(name, self.context, points, filled)))
    }

    /// Create an empty polygon whose buffers live on the renderer's device
    pub fn create_polygon(&self, name: &str, polygon_type: PolygonType) -> RenderResult<Polygon> {
        check_name(name)?;
        let device = Rc::clone(&self.device);
        Ok(self.bind(Polygon::new(name, self.context, device, polygon_type)))
    }

    /// Create a point at `position`
    pub fn create_point(&self, name: &str, position: Vec2, color: Color) -> RenderResult<Point> {
        check_name(name)?;
        let mut point = self.bind(Point::new(name, self.context, position));
        point.base_mut().set_color(color);
        Ok(point)
    }

    /// Create text using the configured tab width, kerning and shadow opacity
    pub fn create_text(
        &self,
        name: &str,
        font: Option<Rc<dyn GlyphSource>>,
        text: &str,
        position: Vec2,
        color: Color,
    ) -> RenderResult<Text> {
        check_name(name)?;
        let mut label = self.bind(Text::new(name, self.context, font));
        label.set_tab_spaces(self.config.tab_spaces);
        label.set_use_kerning(self.config.use_kerning);
        label.set_shadow_opacity(self.config.shadow_opacity);
        label.set_text(text);
        label.set_position(position);
        label.set_color(color);
        Ok(label)
    }

    fn load_context(&self) -> LoadContext {
        LoadContext::new(self.context, Rc::clone(&self.device)).with_texture_lookup(self.lookup())
    }

    /// Load a persisted primitive from a stream
    pub fn load<T: Loadable>(&self, name: &str, reader: impl Read) -> PersistResult<T> {
        io::load(&self.load_context(), name, reader)
    }

    /// Load a persisted primitive from memory
    pub fn load_from_bytes<T: Loadable>(&self, name: &str, bytes: &[u8]) -> PersistResult<T> {
        io::load_from_bytes(&self.load_context(), name, bytes)
    }

    /// Load a persisted primitive from a file
    pub fn load_from_path<T: Loadable>(&self, name: &str, path: impl AsRef<Path>) -> PersistResult<T> {
        io::load_from_path(&self.load_context(), name, path)
    }

    /// Draw a primitive into the queue
    pub fn add<D: Drawable + ?Sized>(&mut self, primitive: &mut D) -> RenderResult<()> {
        self.queue.add_renderable(primitive)
    }

    /// Issue the draw for everything queued so far
    pub fn flush(&mut self) -> RenderResult<()> {
        self.queue.flush()
    }

    /// Flush and present the frame
    pub fn render(&mut self) -> RenderResult<()> {
        self.queue.render()
    }

    /// Immediate-mode drawing on this renderer's queue
    pub fn drawing(&mut self) -> Drawing<'_> {
        Drawing::new(&mut self.drawing, &mut self.queue)
    }
}

impl std::fmt::Debug for Renderer2D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer2D")
            .field("context", &self.context)
            .field("config", &self.config)
            .field("queue", &self.queue)
            .field("textures", &self.textures.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::device::RecordingDevice;
    use crate::render::renderable::TextureMapped;
    use std::cell::RefCell;

    fn renderer() -> (Rc<RefCell<RecordingDevice>>, Renderer2D) {
        let recorder = RecordingDevice::shared();
        let renderer = Renderer2D::new(recorder.clone(), RendererConfig::default()).unwrap();
        (recorder, renderer)
    }

    #[test]
    fn test_invalid_config_rejected() {
        let recorder = RecordingDevice::shared();
        let config = RendererConfig::default().with_default_ellipse_quality(2);
        assert!(matches!(Renderer2D::new(recorder, config), Err(RenderError::InvalidArgument(_))));
    }

    #[test]
    fn test_empty_names_rejected() {
        let (_recorder, renderer) = renderer();
        assert!(renderer.create_sprite("", Vec2::new(1.0, 1.0)).is_err());
        assert!(renderer.create_line("  ", Vec2::zeros(), Vec2::zeros(), Color::WHITE).is_err());
        assert!(renderer.create_polygon("", PolygonType::TriangleList).is_err());
    }

    #[test]
    fn test_created_primitives_share_context() {
        let (recorder, mut renderer) = renderer();
        let mut sprite = renderer.create_sprite("hero", Vec2::new(16.0, 16.0)).unwrap();
        let mut rect = renderer
            .create_rectangle("box", RectF::new(0.0, 0.0, 8.0, 8.0), Color::RED, true)
            .unwrap();
        assert_eq!(sprite.base().context(), renderer.context());

        renderer.add(&mut sprite).unwrap();
        renderer.add(&mut rect).unwrap();
        renderer.render().unwrap();

        let device = recorder.borrow();
        assert_eq!(device.draws().len(), 1);
        assert_eq!(device.frames_presented(), 1);
        assert_eq!(renderer.stats().renderables, 2);
    }

    #[test]
    fn test_foreign_primitive_rejected() {
        let (_recorder, mut first) = renderer();
        let (_other, second) = renderer();
        let mut sprite = second.create_sprite("stranger", Vec2::new(4.0, 4.0)).unwrap();
        assert!(matches!(first.add(&mut sprite), Err(RenderError::ContextMismatch { .. })));
    }

    #[test]
    fn test_deferred_texture_resolves_through_registry() {
        let (recorder, mut renderer) = renderer();
        let mut sprite = renderer.create_sprite("hero", Vec2::new(16.0, 16.0)).unwrap();
        sprite.base_mut().set_deferred_texture_name(Some("hero_sheet"));
        sprite.set_texture_region(RectF::new(0.0, 0.0, 0.5, 0.5));
        assert!(sprite.base().texture().is_none());

        let texture = renderer.textures().register("Hero_Sheet", 64, 64).unwrap();
        renderer.add(&mut sprite).unwrap();
        renderer.flush().unwrap();

        let device = recorder.borrow();
        assert_eq!(device.draws()[0].state.texture, Some(texture.id()));
        assert_eq!(device.draws()[0].vertices[3].uv, [0.5, 0.5]);
    }

    #[test]
    fn test_text_uses_configured_defaults() {
        let recorder = RecordingDevice::shared();
        let config = RendererConfig::default().with_tab_spaces(5).with_kerning(false);
        let renderer = Renderer2D::new(recorder, config).unwrap();
        let text = renderer
            .create_text("label", None, "hello", Vec2::new(3.0, 4.0), Color::GREEN)
            .unwrap();
        assert_eq!(text.tab_spaces(), 5);
        assert!(!text.use_kerning());
        assert_eq!(text.shadow_opacity(), 0.25);
        assert_eq!(text.position(), Vec2::new(3.0, 4.0));
        assert_eq!(text.text(), "hello");
    }

    #[test]
    fn test_drawing_shares_queue_with_primitives() {
        let (recorder, mut renderer) = renderer();
        let mut rect = renderer
            .create_rectangle("box", RectF::new(0.0, 0.0, 8.0, 8.0), Color::RED, true)
            .unwrap();
        renderer.add(&mut rect).unwrap();
        renderer
            .drawing()
            .filled_rectangle(RectF::new(10.0, 0.0, 8.0, 8.0), Color::BLUE)
            .unwrap();
        renderer.flush().unwrap();

        let device = recorder.borrow();
        assert_eq!(device.draws().len(), 1);
        assert_eq!(device.draws()[0].vertices.len(), 8);
    }
}
