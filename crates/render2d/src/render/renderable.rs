//! # Renderable Contract
//!
//! Common state and lifecycle shared by every primitive.
//!
//! ## Architecture
//!
//! - **Drawable**: core contract (`update_vertices`, `update_texture_coordinates`,
//!   `resolve`, `draw`) implemented by every primitive
//! - **RenderableBase**: vertices, render state, texture reference and the
//!   update state machine, embedded in each primitive
//! - **UpdateState**: which recomputation passes are pending
//! - **Positionable / Rotatable / Scalable / Anchored / TextureMapped**:
//!   optional capabilities, implemented only by primitives that support them
//!
//! `draw` always resolves pending passes before geometry reaches the queue, so
//! stale vertices are never submitted.

use std::rc::Rc;
use std::sync::atomic::{AtomicU32, Ordering};

use super::color::Color;
use super::queue::RenderQueue;
use super::states::{
    AlphaTestRange, BlendState, BlendingMode, CullingMode, DepthStencilState, SamplerState, SmoothingMode,
};
use super::texture::{DeferredTexture, Texture, TextureLookup};
use super::transform::Transform2D;
use super::vertex::Vertex;
use super::RenderResult;
use crate::foundation::math::{RectF, Vec2};

static NEXT_CONTEXT: AtomicU32 = AtomicU32::new(1);

/// Identifies the renderer a primitive was created by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(u32);

impl ContextId {
    /// Allocate a fresh context identifier
    pub fn next() -> Self {
        Self(NEXT_CONTEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw identifier value
    pub const fn value(self) -> u32 {
        self.0
    }
}

/// Recomputation passes pending on a primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateState {
    /// Vertices and texture coordinates are current
    Clean,
    /// Texture coordinates must be recomputed
    NeedsTexture,
    /// Vertex positions must be recomputed
    NeedsVertices,
    /// Both passes are pending
    #[default]
    NeedsBoth,
}

impl UpdateState {
    /// Mark vertex positions stale
    pub fn invalidate_vertices(&mut self) {
        *self = match *self {
            Self::Clean | Self::NeedsVertices => Self::NeedsVertices,
            Self::NeedsTexture | Self::NeedsBoth => Self::NeedsBoth,
        };
    }

    /// Mark texture coordinates stale
    pub fn invalidate_texture(&mut self) {
        *self = match *self {
            Self::Clean | Self::NeedsTexture => Self::NeedsTexture,
            Self::NeedsVertices | Self::NeedsBoth => Self::NeedsBoth,
        };
    }

    /// Whether the vertex pass is pending
    pub const fn needs_vertices(self) -> bool {
        matches!(self, Self::NeedsVertices | Self::NeedsBoth)
    }

    /// Whether the texture pass is pending
    pub const fn needs_texture(self) -> bool {
        matches!(self, Self::NeedsTexture | Self::NeedsBoth)
    }

    /// Whether nothing is pending
    pub const fn is_clean(self) -> bool {
        matches!(self, Self::Clean)
    }
}

/// Pipeline state carried by a primitive
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RenderState {
    /// Blending
    pub blend: BlendState,
    /// Depth and stencil
    pub depth_stencil: DepthStencilState,
    /// Texture sampling
    pub sampler: SamplerState,
    /// Face culling
    pub culling: CullingMode,
    /// Alpha rejection range
    pub alpha_test: AlphaTestRange,
}

/// State shared by every primitive
pub struct RenderableBase {
    name: String,
    context: ContextId,
    vertices: Vec<Vertex>,
    state: RenderState,
    texture: DeferredTexture,
    texture_region: RectF,
    update: UpdateState,
    vertex_revision: u64,
    lookup: Option<Rc<dyn TextureLookup>>,
}

impl RenderableBase {
    /// Create state for a primitive with `vertex_count` white vertices
    pub fn new(name: impl Into<String>, context: ContextId, vertex_count: usize) -> Self {
        Self {
            name: name.into(),
            context,
            vertices: vec![Vertex::default(); vertex_count],
            state: RenderState::default(),
            texture: DeferredTexture::None,
            texture_region: RectF::unit(),
            update: UpdateState::NeedsBoth,
            vertex_revision: 0,
            lookup: None,
        }
    }

    /// Attach the service used to resolve deferred texture names
    pub fn with_texture_lookup(mut self, lookup: Rc<dyn TextureLookup>) -> Self {
        self.set_texture_lookup(lookup);
        self
    }

    /// Replace the texture lookup service, retrying any pending name
    pub fn set_texture_lookup(&mut self, lookup: Rc<dyn TextureLookup>) {
        self.lookup = Some(lookup);
        self.resolve_deferred_texture();
    }

    /// Primitive name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Creating context
    pub const fn context(&self) -> ContextId {
        self.context
    }

    /// Current vertices
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Mutable vertices, for the owning primitive's update passes
    pub fn vertices_mut(&mut self) -> &mut [Vertex] {
        &mut self.vertices
    }

    /// Resize the vertex array, filling new slots with default vertices
    pub fn resize_vertices(&mut self, count: usize) {
        self.vertices.resize(count, Vertex::default());
    }

    /// Replace the vertex array
    pub fn replace_vertices(&mut self, vertices: Vec<Vertex>) {
        self.vertices = vertices;
    }

    /// Pending passes
    pub const fn update_state(&self) -> UpdateState {
        self.update
    }

    /// Number of vertex passes run so far
    pub const fn vertex_revision(&self) -> u64 {
        self.vertex_revision
    }

    /// Mark vertex positions stale
    pub fn invalidate_vertices(&mut self) {
        self.update.invalidate_vertices();
    }

    /// Mark texture coordinates stale
    pub fn invalidate_texture(&mut self) {
        self.update.invalidate_texture();
    }

    /// Force both passes on the next draw
    pub fn refresh(&mut self) {
        self.update = UpdateState::NeedsBoth;
    }

    pub(crate) fn finish_update(&mut self, ran_vertices: bool) {
        if ran_vertices {
            self.vertex_revision += 1;
        }
        self.update = UpdateState::Clean;
    }

    /// Colour of the first vertex
    pub fn color(&self) -> Color {
        self.vertices.first().map_or(Color::WHITE, Vertex::color)
    }

    /// Set the colour of every vertex
    pub fn set_color(&mut self, color: Color) {
        for vertex in &mut self.vertices {
            vertex.color = color.into();
        }
    }

    /// Alpha of the first vertex
    pub fn opacity(&self) -> f32 {
        self.color().a
    }

    /// Set the alpha of every vertex, keeping rgb
    pub fn set_opacity(&mut self, opacity: f32) {
        for vertex in &mut self.vertices {
            vertex.color[3] = opacity;
        }
    }

    /// Render state
    pub const fn render_state(&self) -> &RenderState {
        &self.state
    }

    /// Replace the whole render state
    pub fn set_render_state(&mut self, state: RenderState) {
        self.state = state;
    }

    /// Blend state
    pub const fn blend_state(&self) -> BlendState {
        self.state.blend
    }

    /// Replace the blend state
    pub fn set_blend_state(&mut self, blend: BlendState) {
        self.state.blend = blend;
    }

    /// Depth/stencil state
    pub const fn depth_stencil_state(&self) -> DepthStencilState {
        self.state.depth_stencil
    }

    /// Replace the depth/stencil state
    pub fn set_depth_stencil_state(&mut self, depth_stencil: DepthStencilState) {
        self.state.depth_stencil = depth_stencil;
    }

    /// Sampler state
    pub const fn sampler_state(&self) -> SamplerState {
        self.state.sampler
    }

    /// Replace the sampler state
    pub fn set_sampler_state(&mut self, sampler: SamplerState) {
        self.state.sampler = sampler;
    }

    /// Culling mode
    pub const fn culling_mode(&self) -> CullingMode {
        self.state.culling
    }

    /// Set the culling mode; `Unknown` is ignored
    pub fn set_culling_mode(&mut self, culling: CullingMode) {
        if culling == CullingMode::Unknown {
            log::debug!("Ignoring unknown culling mode on '{}'", self.name);
            return;
        }
        self.state.culling = culling;
    }

    /// Alpha test range
    pub const fn alpha_test(&self) -> AlphaTestRange {
        self.state.alpha_test
    }

    /// Set the alpha test range
    pub fn set_alpha_test(&mut self, range: AlphaTestRange) {
        self.state.alpha_test = range;
    }

    /// Blending preset inferred from the blend state
    pub fn blending_mode(&self) -> BlendingMode {
        self.state.blend.blending_mode()
    }

    /// Apply a blending preset
    pub fn set_blending_mode(&mut self, mode: BlendingMode) {
        self.state.blend = self.state.blend.with_blending_mode(mode);
    }

    /// Smoothing preset inferred from the sampler
    pub fn smoothing_mode(&self) -> SmoothingMode {
        self.state.sampler.smoothing_mode()
    }

    /// Apply a smoothing preset
    pub fn set_smoothing_mode(&mut self, mode: SmoothingMode) {
        self.state.sampler = self.state.sampler.with_smoothing_mode(mode);
    }

    /// Bound texture
    pub fn texture(&self) -> Option<&Texture> {
        self.texture.texture()
    }

    /// Texture reference, including unresolved names
    pub const fn deferred_texture(&self) -> &DeferredTexture {
        &self.texture
    }

    /// Bind a texture directly
    pub fn set_texture(&mut self, texture: Option<Texture>) {
        let texture = DeferredTexture::from(texture);
        if texture != self.texture {
            self.texture = texture;
            self.update.invalidate_texture();
        }
    }

    /// Name of the referenced texture, bound or pending
    pub fn deferred_texture_name(&self) -> Option<&str> {
        self.texture.name()
    }

    /// Reference a texture by name; it is bound once the lookup can find it
    pub fn set_deferred_texture_name(&mut self, name: Option<&str>) {
        self.texture = match name.map(str::trim) {
            Some(name) if !name.is_empty() => DeferredTexture::Pending(name.to_string()),
            _ => DeferredTexture::None,
        };
        self.resolve_deferred_texture();
        self.update.invalidate_texture();
    }

    /// Try to bind a pending texture name; returns the texture when newly bound
    pub fn resolve_deferred_texture(&mut self) -> Option<Texture> {
        let lookup = self.lookup.clone()?;
        if self.texture.resolve(lookup.as_ref()) {
            self.update.invalidate_texture();
            return self.texture.texture().cloned();
        }
        None
    }

    /// Texture region in texture space
    pub const fn texture_region(&self) -> RectF {
        self.texture_region
    }

    /// Set the texture region
    pub fn set_texture_region(&mut self, region: RectF) {
        if region != self.texture_region {
            self.texture_region = region;
            self.update.invalidate_texture();
        }
    }
}

impl std::fmt::Debug for RenderableBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderableBase")
            .field("name", &self.name)
            .field("context", &self.context)
            .field("vertices", &self.vertices.len())
            .field("texture", &self.texture)
            .field("update", &self.update)
            .finish_non_exhaustive()
    }
}

/// Core contract of every primitive
pub trait Drawable {
    /// Shared state
    fn base(&self) -> &RenderableBase;

    /// Mutable shared state
    fn base_mut(&mut self) -> &mut RenderableBase;

    /// Recompute vertex positions from the geometry parameters
    fn update_vertices(&mut self);

    /// Recompute texture coordinates from the texture region
    fn update_texture_coordinates(&mut self);

    /// Run every pending pass, leaving the primitive clean
    fn resolve(&mut self) {
        self.base_mut().resolve_deferred_texture();
        let state = self.base().update_state();
        if state.needs_vertices() {
            self.update_vertices();
        }
        if state.needs_texture() {
            self.update_texture_coordinates();
        }
        self.base_mut().finish_update(state.needs_vertices());
    }

    /// Resolve and submit the primitive to `queue`
    fn draw(&mut self, queue: &mut RenderQueue) -> RenderResult<()>;

    /// Primitive name
    fn name(&self) -> &str {
        self.base().name()
    }
}

/// Primitives with a position and depth
pub trait Positionable {
    /// Position
    fn position(&self) -> Vec2;
    /// Move the primitive
    fn set_position(&mut self, position: Vec2);
    /// Depth written into z
    fn depth(&self) -> f32;
    /// Set the depth
    fn set_depth(&mut self, depth: f32);
}

/// Primitives that rotate about their anchor
pub trait Rotatable {
    /// Angle in degrees
    fn angle(&self) -> f32;
    /// Set the angle in degrees
    fn set_angle(&mut self, degrees: f32);
}

/// Primitives with a per-axis scale
pub trait Scalable {
    /// Scale
    fn scale(&self) -> Vec2;
    /// Set the scale
    fn set_scale(&mut self, scale: Vec2);
}

/// Primitives with a local pivot
pub trait Anchored {
    /// Anchor in local units
    fn anchor(&self) -> Vec2;
    /// Set the anchor
    fn set_anchor(&mut self, anchor: Vec2);
}

/// Primitives that map a texture region onto their geometry
pub trait TextureMapped: Drawable {
    /// Region in texture space
    fn texture_region(&self) -> RectF {
        self.base().texture_region()
    }

    /// Set the region in texture space
    fn set_texture_region(&mut self, region: RectF) {
        self.base_mut().set_texture_region(region);
    }

    /// Top-left of the region
    fn texture_offset(&self) -> Vec2 {
        self.texture_region().location()
    }

    /// Move the region
    fn set_texture_offset(&mut self, offset: Vec2) {
        let region = self.texture_region();
        self.set_texture_region(RectF::from_location_size(offset, region.size()));
    }

    /// Size of the region
    fn texture_size(&self) -> Vec2 {
        self.texture_region().size()
    }

    /// Resize the region
    fn set_texture_size(&mut self, size: Vec2) {
        let region = self.texture_region();
        self.set_texture_region(RectF::from_location_size(region.location(), size));
    }
}

/// Primitives whose transform lives in a [`Transform2D`]
pub(crate) trait HasTransform: Drawable {
    fn transform(&self) -> &Transform2D;
    fn transform_mut(&mut self) -> &mut Transform2D;
}

/// Write one transform field, marking the vertices stale when it changes
pub(crate) fn update_transform<T, V>(target: &mut T, value: V, field: fn(&mut Transform2D) -> &mut V)
where
    T: HasTransform + ?Sized,
    V: PartialEq,
{
    let slot = field(target.transform_mut());
    if *slot != value {
        *slot = value;
        target.base_mut().invalidate_vertices();
    }
}

/// Implement the transform capabilities for a primitive that stores a
/// [`Transform2D`]
macro_rules! impl_transform_capabilities {
    ($ty:ty) => {
        impl $crate::render::renderable::Positionable for $ty {
            fn position(&self) -> $crate::foundation::math::Vec2 {
                $crate::render::renderable::HasTransform::transform(self).position
            }

            fn set_position(&mut self, position: $crate::foundation::math::Vec2) {
                $crate::render::renderable::update_transform(self, position, |t| &mut t.position);
            }

            fn depth(&self) -> f32 {
                $crate::render::renderable::HasTransform::transform(self).depth
            }

            fn set_depth(&mut self, depth: f32) {
                $crate::render::renderable::update_transform(self, depth, |t| &mut t.depth);
            }
        }

        impl $crate::render::renderable::Rotatable for $ty {
            fn angle(&self) -> f32 {
                $crate::render::renderable::HasTransform::transform(self).angle
            }

            fn set_angle(&mut self, degrees: f32) {
                $crate::render::renderable::update_transform(self, degrees, |t| &mut t.angle);
            }
        }

        impl $crate::render::renderable::Scalable for $ty {
            fn scale(&self) -> $crate::foundation::math::Vec2 {
                $crate::render::renderable::HasTransform::transform(self).scale
            }

            fn set_scale(&mut self, scale: $crate::foundation::math::Vec2) {
                $crate::render::renderable::update_transform(self, scale, |t| &mut t.scale);
            }
        }

        impl $crate::render::renderable::Anchored for $ty {
            fn anchor(&self) -> $crate::foundation::math::Vec2 {
                $crate::render::renderable::HasTransform::transform(self).anchor
            }

            fn set_anchor(&mut self, anchor: $crate::foundation::math::Vec2) {
                $crate::render::renderable::update_transform(self, anchor, |t| &mut t.anchor);
            }
        }
    };
}

pub(crate) use impl_transform_capabilities;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::texture::TextureRegistry;

    #[test]
    fn test_update_state_transitions() {
        let mut state = UpdateState::Clean;
        state.invalidate_texture();
        assert_eq!(state, UpdateState::NeedsTexture);
        state.invalidate_vertices();
        assert_eq!(state, UpdateState::NeedsBoth);
        assert!(state.needs_vertices() && state.needs_texture());

        let mut state = UpdateState::Clean;
        state.invalidate_vertices();
        assert!(!state.needs_texture());
    }

    #[test]
    fn test_color_and_opacity_cover_every_vertex() {
        let mut base = RenderableBase::new("quad", ContextId::next(), 4);
        base.set_color(Color::RED);
        base.set_opacity(0.5);
        assert!(base.vertices().iter().all(|v| v.color == [1.0, 0.0, 0.0, 0.5]));
        assert_eq!(base.opacity(), 0.5);
    }

    #[test]
    fn test_unknown_culling_ignored() {
        let mut base = RenderableBase::new("quad", ContextId::next(), 4);
        assert_eq!(base.culling_mode(), CullingMode::Back);
        base.set_culling_mode(CullingMode::Unknown);
        assert_eq!(base.culling_mode(), CullingMode::Back);
        base.set_culling_mode(CullingMode::None);
        assert_eq!(base.culling_mode(), CullingMode::None);
    }

    #[test]
    fn test_region_change_marks_texture_dirty() {
        let mut base = RenderableBase::new("quad", ContextId::next(), 4);
        base.finish_update(true);
        base.set_texture_region(RectF::unit());
        assert!(base.update_state().is_clean());
        base.set_texture_region(RectF::new(0.0, 0.0, 0.5, 0.5));
        assert_eq!(base.update_state(), UpdateState::NeedsTexture);
    }

    #[test]
    fn test_deferred_name_resolved_through_lookup() {
        let registry = Rc::new(TextureRegistry::new());
        let mut base = RenderableBase::new("quad", ContextId::next(), 4).with_texture_lookup(registry.clone());
        base.set_deferred_texture_name(Some("hero"));
        assert!(base.texture().is_none());
        assert_eq!(base.deferred_texture_name(), Some("hero"));

        registry.register("HERO", 32, 32).unwrap();
        assert!(base.resolve_deferred_texture().is_some());
        assert_eq!(base.texture().map(Texture::width), Some(32));
    }

    #[test]
    fn test_contexts_are_unique() {
        assert_ne!(ContextId::next(), ContextId::next());
    }
}
