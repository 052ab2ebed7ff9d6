//! # Sprite
//!
//! Textured quad with per-corner colour and offset.
//!
//! ## Vertex pass
//!
//! Corners are built anchor-relative (`-anchor` to `size - anchor`), run
//! through the shared [`Transform2D`], and each corner offset is added after
//! translation. Vertex order is upper-left, upper-right, lower-left,
//! lower-right.
//!
//! ## Texture pass
//!
//! Corners map to the texture region corners, swapped on each flipped axis.
//! Without a bound texture every coordinate is zero. Sprites loaded from the
//! legacy format carry a pixel-space region that is converted once the
//! deferred texture resolves.

use super::RectangleCorner;
use crate::foundation::math::{RectF, Vec2};
use crate::render::collider::Collider;
use crate::render::color::Color;
use crate::render::queue::{Batch, RenderQueue};
use crate::render::renderable::{
    impl_transform_capabilities, ContextId, Drawable, HasTransform, RenderableBase, TextureMapped,
};
use crate::render::transform::{quad_corners, Transform2D, QUAD_INDICES};
use crate::render::vertex::PrimitiveTopology;
use crate::render::RenderResult;

/// Transformable textured quad
#[derive(Debug)]
pub struct Sprite {
    base: RenderableBase,
    transform: Transform2D,
    size: Vec2,
    offsets: [Vec2; 4],
    horizontal_flip: bool,
    vertical_flip: bool,
    collider: Option<Collider>,
    pixel_region: Option<RectF>,
}

impl Sprite {
    /// Create a sprite of `size` pixels
    pub fn new(name: impl Into<String>, context: ContextId, size: Vec2) -> Self {
        Self {
            base: RenderableBase::new(name, context, 4),
            transform: Transform2D::default(),
            size,
            offsets: [Vec2::zeros(); 4],
            horizontal_flip: false,
            vertical_flip: false,
            collider: None,
            pixel_region: None,
        }
    }

    /// Size in pixels before scaling
    pub const fn size(&self) -> Vec2 {
        self.size
    }

    /// Resize the sprite
    pub fn set_size(&mut self, size: Vec2) {
        if size != self.size {
            self.size = size;
            self.base.invalidate_vertices();
        }
    }

    /// Scaled size
    pub fn scaled_size(&self) -> Vec2 {
        self.size.component_mul(&self.transform.scale)
    }

    /// Offset added to one corner after transformation
    pub const fn corner_offset(&self, corner: RectangleCorner) -> Vec2 {
        self.offsets[corner.index()]
    }

    /// Set the offset of one corner
    pub fn set_corner_offset(&mut self, corner: RectangleCorner, offset: Vec2) {
        if self.offsets[corner.index()] != offset {
            self.offsets[corner.index()] = offset;
            self.base.invalidate_vertices();
        }
    }

    /// Colour of one corner
    pub fn corner_color(&self, corner: RectangleCorner) -> Color {
        self.base.vertices()[corner.index()].color()
    }

    /// Set the colour of one corner
    pub fn set_corner_color(&mut self, corner: RectangleCorner, color: Color) {
        self.base.vertices_mut()[corner.index()].color = color.into();
    }

    /// Whether the texture is mirrored horizontally
    pub const fn horizontal_flip(&self) -> bool {
        self.horizontal_flip
    }

    /// Mirror the texture horizontally
    pub fn set_horizontal_flip(&mut self, flip: bool) {
        if flip != self.horizontal_flip {
            self.horizontal_flip = flip;
            self.base.invalidate_texture();
        }
    }

    /// Whether the texture is mirrored vertically
    pub const fn vertical_flip(&self) -> bool {
        self.vertical_flip
    }

    /// Mirror the texture vertically
    pub fn set_vertical_flip(&mut self, flip: bool) {
        if flip != self.vertical_flip {
            self.vertical_flip = flip;
            self.base.invalidate_texture();
        }
    }

    /// Attached collision shape
    pub const fn collider(&self) -> Option<&Collider> {
        self.collider.as_ref()
    }

    /// Attach or remove a collision shape
    pub fn set_collider(&mut self, collider: Option<Collider>) {
        self.collider = collider;
    }

    /// Set the texture region in pixels, converted when a texture is bound
    pub fn set_pixel_texture_region(&mut self, region: RectF) {
        match self.base.texture() {
            Some(texture) => {
                let region = texture.to_texel_space(region);
                self.base.set_texture_region(region);
                self.pixel_region = None;
            }
            None => {
                self.pixel_region = Some(region);
                self.base.invalidate_texture();
            }
        }
    }

    /// Pixel-space region still waiting for its texture
    pub const fn pending_pixel_region(&self) -> Option<RectF> {
        self.pixel_region
    }

    /// Transformed corner positions in vertex order
    pub fn corners(&mut self) -> [Vec2; 4] {
        self.resolve();
        let vertices = self.base.vertices();
        [vertices[0].xy(), vertices[1].xy(), vertices[2].xy(), vertices[3].xy()]
    }
}

impl Drawable for Sprite {
    fn base(&self) -> &RenderableBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RenderableBase {
        &mut self.base
    }

    fn update_vertices(&mut self) {
        let corners = quad_corners(self.size);
        self.transform.transform_into(&corners, self.base.vertices_mut());
        let offsets = self.offsets;
        for (vertex, offset) in self.base.vertices_mut().iter_mut().zip(offsets) {
            if offset != Vec2::zeros() {
                let moved = vertex.xy() + offset;
                vertex.set_xy(moved);
            }
        }
    }

    fn update_texture_coordinates(&mut self) {
        let Some(texture) = self.base.texture().cloned() else {
            for vertex in self.base.vertices_mut() {
                vertex.uv = [0.0, 0.0];
            }
            return;
        };

        if let Some(pixels) = self.pixel_region.take() {
            self.base.set_texture_region(texture.to_texel_space(pixels));
        }

        let region = self.base.texture_region();
        let (left, right) = if self.horizontal_flip {
            (region.right(), region.left())
        } else {
            (region.left(), region.right())
        };
        let (top, bottom) = if self.vertical_flip {
            (region.bottom(), region.top())
        } else {
            (region.top(), region.bottom())
        };

        let uvs = [[left, top], [right, top], [left, bottom], [right, bottom]];
        for (vertex, uv) in self.base.vertices_mut().iter_mut().zip(uvs) {
            vertex.uv = uv;
        }
    }

    fn draw(&mut self, queue: &mut RenderQueue) -> RenderResult<()> {
        self.resolve();
        queue.submit(Batch::new(
            &self.base,
            PrimitiveTopology::TriangleList,
            self.base.vertices(),
            Some(&QUAD_INDICES[..]),
        ))
    }
}

impl HasTransform for Sprite {
    fn transform(&self) -> &Transform2D {
        &self.transform
    }

    fn transform_mut(&mut self) -> &mut Transform2D {
        &mut self.transform
    }
}

impl_transform_capabilities!(Sprite);

impl TextureMapped for Sprite {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::renderable::{Anchored, Positionable, Rotatable, Scalable};
    use crate::render::texture::TextureRegistry;
    use approx::assert_relative_eq;
    use std::rc::Rc;

    fn sprite() -> Sprite {
        Sprite::new("sprite", ContextId::next(), Vec2::new(20.0, 10.0))
    }

    #[test]
    fn test_untransformed_corners_are_position_relative() {
        let mut sprite = sprite();
        sprite.set_anchor(Vec2::new(10.0, 5.0));
        sprite.set_position(Vec2::new(100.0, 50.0));
        let corners = sprite.corners();
        assert_eq!(corners[0], Vec2::new(90.0, 45.0));
        assert_eq!(corners[1], Vec2::new(110.0, 45.0));
        assert_eq!(corners[2], Vec2::new(90.0, 55.0));
        assert_eq!(corners[3], Vec2::new(110.0, 55.0));
    }

    #[test]
    fn test_quarter_turn_rotates_right_edge_onto_y_axis() {
        let mut sprite = sprite();
        sprite.set_angle(90.0);
        let corners = sprite.corners();
        assert_relative_eq!(corners[1], Vec2::new(0.0, 20.0), epsilon = 1e-5);
    }

    #[test]
    fn test_scale_and_corner_offset() {
        let mut sprite = sprite();
        sprite.set_scale(Vec2::new(2.0, 3.0));
        sprite.set_corner_offset(RectangleCorner::LowerRight, Vec2::new(1.0, 1.0));
        let corners = sprite.corners();
        assert_eq!(corners[3], Vec2::new(41.0, 31.0));
        assert_eq!(sprite.scaled_size(), Vec2::new(40.0, 30.0));
    }

    #[test]
    fn test_uvs_zero_without_texture_and_flip_with_texture() {
        let registry = Rc::new(TextureRegistry::new());
        let texture = registry.register("atlas", 64, 64).unwrap();

        let mut sprite = sprite();
        sprite.resolve();
        assert!(sprite.base().vertices().iter().all(|v| v.uv == [0.0, 0.0]));

        sprite.base_mut().set_texture(Some(texture));
        sprite.set_texture_region(RectF::new(0.25, 0.5, 0.25, 0.5));
        sprite.set_horizontal_flip(true);
        sprite.resolve();
        let vertices = sprite.base().vertices();
        assert_eq!(vertices[0].uv, [0.5, 0.5]);
        assert_eq!(vertices[1].uv, [0.25, 0.5]);
        assert_eq!(vertices[3].uv, [0.25, 1.0]);
    }

    #[test]
    fn test_repeated_draw_recomputes_once() {
        let recorder = crate::render::device::RecordingDevice::shared();
        let context = ContextId::next();
        let mut queue = RenderQueue::new(recorder, context, 64);
        let mut sprite = Sprite::new("sprite", context, Vec2::new(4.0, 4.0));
        sprite.draw(&mut queue).unwrap();
        sprite.draw(&mut queue).unwrap();
        assert_eq!(sprite.base().vertex_revision(), 1);
        assert_eq!(queue.pending_vertices(), 8);
    }

    #[test]
    fn test_pixel_region_converted_when_texture_resolves() {
        let registry = Rc::new(TextureRegistry::new());
        let mut sprite = sprite();
        sprite.base_mut().set_texture_lookup(registry.clone());
        sprite.base_mut().set_deferred_texture_name(Some("late"));
        sprite.set_pixel_texture_region(RectF::new(16.0, 0.0, 16.0, 32.0));
        sprite.resolve();
        assert!(sprite.pending_pixel_region().is_some());

        registry.register("late", 64, 32).unwrap();
        sprite.resolve();
        assert!(sprite.pending_pixel_region().is_none());
        assert_eq!(sprite.texture_region(), RectF::new(0.25, 0.0, 0.25, 1.0));
    }
}
