//! # Polygon
//!
//! Arbitrary caller-supplied geometry drawn from buffers the polygon owns.
//!
//! ## Architecture
//!
//! - A CPU copy of every vertex and index is kept for bounds, persistence and
//!   buffer regrowth
//! - Device buffers are created on the first assignment and regrown to twice
//!   the required size when a write does not fit; the old buffer is released
//!   and the CPU copy uploaded again
//! - Toggling between static and dynamic buffers is destructive: both buffers
//!   are released and the geometry is cleared
//! - Position, rotation, scale and anchor are folded into a world matrix that
//!   is multiplied by the queue camera at draw time; vertices are never
//!   transformed on the CPU

use crate::foundation::math::{Mat4, RectF, Vec2, Vec3, Vec4};
use crate::render::color::Color;
use crate::render::device::{BufferKind, BufferUsage, DrawSource, GpuBuffer, SharedDevice};
use crate::render::queue::{BatchState, RenderQueue};
use crate::render::renderable::{impl_transform_capabilities, ContextId, Drawable, HasTransform, RenderableBase};
use crate::render::states::CullingMode;
use crate::render::transform::Transform2D;
use crate::render::vertex::{PrimitiveTopology, Vertex};
use crate::render::{RenderError, RenderResult};

const TRIANGLE_FLAG: i32 = 1;
const LINE_FLAG: i32 = 2;
const STRIP_FLAG: i32 = 4;
const TRIANGLE_STRIP_FLAGS: i32 = TRIANGLE_FLAG | STRIP_FLAG;
const LINE_STRIP_FLAGS: i32 = LINE_FLAG | STRIP_FLAG;

/// How polygon vertices are assembled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolygonType {
    /// Independent triangles
    #[default]
    TriangleList,
    /// Connected triangles
    TriangleStrip,
    /// Independent segments
    LineList,
    /// Connected segments
    LineStrip,
}

impl PolygonType {
    /// Persisted flag combination
    pub const fn to_flags(self) -> i32 {
        match self {
            Self::TriangleList => TRIANGLE_FLAG,
            Self::TriangleStrip => TRIANGLE_STRIP_FLAGS,
            Self::LineList => LINE_FLAG,
            Self::LineStrip => LINE_STRIP_FLAGS,
        }
    }

    /// Decode a persisted flag combination
    pub const fn from_flags(flags: i32) -> Option<Self> {
        match flags {
            TRIANGLE_FLAG => Some(Self::TriangleList),
            TRIANGLE_STRIP_FLAGS => Some(Self::TriangleStrip),
            LINE_FLAG => Some(Self::LineList),
            LINE_STRIP_FLAGS => Some(Self::LineStrip),
            _ => None,
        }
    }

    /// Device topology
    pub const fn topology(self) -> PrimitiveTopology {
        match self {
            Self::TriangleList => PrimitiveTopology::TriangleList,
            Self::TriangleStrip => PrimitiveTopology::TriangleStrip,
            Self::LineList => PrimitiveTopology::LineList,
            Self::LineStrip => PrimitiveTopology::LineStrip,
        }
    }
}

/// Per-draw shading inputs for a polygon
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygonMaterial {
    /// Colour multiplied with every vertex
    pub diffuse: Color,
    /// Texture offset in `xy`, texture scale in `zw`
    pub texture_transform: Vec4,
}

impl Default for PolygonMaterial {
    fn default() -> Self {
        Self {
            diffuse: Color::WHITE,
            texture_transform: Vec4::new(0.0, 0.0, 1.0, 1.0),
        }
    }
}

/// Polygon drawn from its own device buffers
pub struct Polygon {
    base: RenderableBase,
    device: SharedDevice,
    polygon_type: PolygonType,
    transform: Transform2D,
    world: Mat4,
    indices: Vec<u32>,
    vertex_buffer: Option<GpuBuffer>,
    index_buffer: Option<GpuBuffer>,
    dynamic: bool,
    material: PolygonMaterial,
    bounds: Option<RectF>,
}

impl Polygon {
    /// Create an empty polygon whose buffers live on `device`
    pub fn new(name: impl Into<String>, context: ContextId, device: SharedDevice, polygon_type: PolygonType) -> Self {
        let mut base = RenderableBase::new(name, context, 0);
        base.set_culling_mode(CullingMode::Back);
        Self {
            base,
            device,
            polygon_type,
            transform: Transform2D::default(),
            world: Mat4::identity(),
            indices: Vec::new(),
            vertex_buffer: None,
            index_buffer: None,
            dynamic: false,
            material: PolygonMaterial::default(),
            bounds: None,
        }
    }

    /// Assembly mode
    pub const fn polygon_type(&self) -> PolygonType {
        self.polygon_type
    }

    /// Change the assembly mode
    pub fn set_polygon_type(&mut self, polygon_type: PolygonType) {
        self.polygon_type = polygon_type;
    }

    /// Diffuse colour of the material
    pub const fn color(&self) -> Color {
        self.material.diffuse
    }

    /// Set the diffuse colour of the material
    pub fn set_color(&mut self, color: Color) {
        self.material.diffuse = color;
    }

    /// Material sent with each draw
    pub const fn material(&self) -> PolygonMaterial {
        self.material
    }

    /// Texture offset in texture space
    pub fn texture_offset(&self) -> Vec2 {
        self.material.texture_transform.xy()
    }

    /// Move the texture
    pub fn set_texture_offset(&mut self, offset: Vec2) {
        self.material.texture_transform.x = offset.x;
        self.material.texture_transform.y = offset.y;
    }

    /// Texture scale
    pub fn texture_scale(&self) -> Vec2 {
        let t = self.material.texture_transform;
        Vec2::new(t.z, t.w)
    }

    /// Scale the texture
    pub fn set_texture_scale(&mut self, scale: Vec2) {
        self.material.texture_transform.z = scale.x;
        self.material.texture_transform.w = scale.y;
    }

    /// CPU copy of the vertices
    pub fn vertices(&self) -> &[Vertex] {
        self.base.vertices()
    }

    /// CPU copy of the indices
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.base.vertices().len()
    }

    /// Number of indices; zero when drawing without an index buffer
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Local bounds of the vertex data
    pub const fn bounds(&self) -> Option<RectF> {
        self.bounds
    }

    /// Size of the local bounds
    pub fn size(&self) -> Vec2 {
        self.bounds.map_or_else(Vec2::zeros, |b| b.size())
    }

    /// Whether the buffers are created for frequent updates
    pub const fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    /// Switch buffer usage; discards the buffers and the geometry
    pub fn set_dynamic(&mut self, dynamic: bool) {
        if dynamic == self.dynamic {
            return;
        }
        log::debug!(
            "Polygon '{}' switching to {} buffers, discarding {} vertices and {} indices",
            self.base.name(),
            if dynamic { "dynamic" } else { "static" },
            self.vertex_count(),
            self.indices.len()
        );
        self.dynamic = dynamic;
        self.vertex_buffer = None;
        self.index_buffer = None;
        self.base.replace_vertices(Vec::new());
        self.indices.clear();
        self.bounds = None;
    }

    /// Capacity of the vertex buffer, in vertices
    pub fn vertex_capacity(&self) -> usize {
        self.vertex_buffer.as_ref().map_or(0, |b| b.size_bytes() / Vertex::SIZE)
    }

    /// Capacity of the index buffer, in indices
    pub fn index_capacity(&self) -> usize {
        self.index_buffer.as_ref().map_or(0, |b| b.size_bytes() / 4)
    }

    const fn usage(&self) -> BufferUsage {
        if self.dynamic {
            BufferUsage::Dynamic
        } else {
            BufferUsage::Static
        }
    }

    // returns the end of the destination range
    fn check_range(
        what: &str,
        len: usize,
        source_offset: usize,
        count: usize,
        current: usize,
        offset: usize,
    ) -> RenderResult<usize> {
        if source_offset >= len {
            return Err(RenderError::InvalidArgument(format!(
                "{what} source offset {source_offset} is outside 0..{len}"
            )));
        }
        if source_offset.checked_add(count).map_or(true, |end| end > len) {
            return Err(RenderError::InvalidArgument(format!(
                "{what} range {source_offset}+{count} exceeds source length {len}"
            )));
        }
        if offset > current {
            return Err(RenderError::InvalidArgument(format!(
                "{what} destination offset {offset} leaves a gap after {current} elements"
            )));
        }
        offset.checked_add(count).ok_or_else(|| {
            RenderError::InvalidArgument(format!("{what} destination range {offset}+{count} overflows"))
        })
    }

    /// Upload `count` vertices from `source[source_offset..]` to position `offset`
    ///
    /// Every vertex takes the polygon depth in z. Writing from offset 0 over
    /// the whole current set replaces it.
    pub fn set_vertex_data(
        &mut self,
        source: &[Vertex],
        source_offset: usize,
        offset: usize,
        count: usize,
    ) -> RenderResult<()> {
        if source.is_empty() {
            return Ok(());
        }
        let end = Self::check_range("vertex", source.len(), source_offset, count, self.vertex_count(), offset)?;
        let mut vertices = self.base.vertices().to_vec();
        if offset == 0 && count >= vertices.len() {
            vertices.clear();
        }
        if vertices.len() < end {
            vertices.resize(end, Vertex::default());
        }
        let depth = self.transform.depth;
        for (target, vertex) in vertices[offset..end].iter_mut().zip(&source[source_offset..source_offset + count]) {
            *target = *vertex;
            target.position[2] = depth;
        }
        self.bounds = RectF::bounding(vertices.iter().map(Vertex::xy));
        self.base.replace_vertices(vertices);

        if self.ensure_vertex_capacity(end)? {
            self.upload_vertices(0, self.vertex_count())
        } else {
            self.upload_vertices(offset, count)
        }
    }

    /// Upload `count` indices from `source[source_offset..]` to position `offset`
    ///
    /// An empty source or a zero count removes the index buffer.
    pub fn set_index_data(&mut self, source: &[u32], source_offset: usize, offset: usize, count: usize) -> RenderResult<()> {
        if source.is_empty() || count == 0 {
            self.indices.clear();
            self.index_buffer = None;
            return Ok(());
        }
        let end = Self::check_range("index", source.len(), source_offset, count, self.indices.len(), offset)?;
        if offset == 0 && count >= self.indices.len() {
            self.indices.clear();
        }
        if self.indices.len() < end {
            self.indices.resize(end, 0);
        }
        self.indices[offset..end].copy_from_slice(&source[source_offset..source_offset + count]);

        if self.ensure_index_capacity(end)? {
            self.upload_indices(0, self.indices.len())
        } else {
            self.upload_indices(offset, count)
        }
    }

    // returns true when the buffer was (re)created
    fn ensure_vertex_capacity(&mut self, count: usize) -> RenderResult<bool> {
        if count <= self.vertex_capacity() {
            return Ok(false);
        }
        log::debug!("Growing vertex buffer of '{}' to {} vertices", self.base.name(), count * 2);
        self.vertex_buffer = None;
        self.vertex_buffer = Some(GpuBuffer::new(
            &self.device,
            BufferKind::Vertex,
            self.usage(),
            count * 2 * Vertex::SIZE,
        )?);
        Ok(true)
    }

    fn ensure_index_capacity(&mut self, count: usize) -> RenderResult<bool> {
        if count <= self.index_capacity() {
            return Ok(false);
        }
        log::debug!("Growing index buffer of '{}' to {} indices", self.base.name(), count * 2);
        self.index_buffer = None;
        self.index_buffer = Some(GpuBuffer::new(&self.device, BufferKind::Index, self.usage(), count * 2 * 4)?);
        Ok(true)
    }

    fn upload_vertices(&self, offset: usize, count: usize) -> RenderResult<()> {
        let Some(buffer) = &self.vertex_buffer else {
            return Ok(());
        };
        let data = &self.base.vertices()[offset..offset + count];
        buffer.write(offset * Vertex::SIZE, bytemuck::cast_slice(data))
    }

    fn upload_indices(&self, offset: usize, count: usize) -> RenderResult<()> {
        let Some(buffer) = &self.index_buffer else {
            return Ok(());
        };
        buffer.write(offset * 4, bytemuck::cast_slice(&self.indices[offset..offset + count]))
    }

    /// World transform without the camera
    pub fn world_transform(&mut self) -> Mat4 {
        self.resolve();
        self.world
    }
}

impl Drawable for Polygon {
    fn base(&self) -> &RenderableBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RenderableBase {
        &mut self.base
    }

    fn update_vertices(&mut self) {
        let t = &self.transform;
        let anchor = Mat4::new_translation(&Vec3::new(-t.anchor.x, -t.anchor.y, 0.0));
        let rotation = Mat4::new_rotation(Vec3::new(0.0, 0.0, t.angle.to_radians()));
        let scale = Mat4::new_nonuniform_scaling(&Vec3::new(t.scale.x, t.scale.y, 1.0));
        let translation = Mat4::new_translation(&Vec3::new(t.position.x, t.position.y, t.depth));
        self.world = translation * scale * rotation * anchor;
    }

    fn update_texture_coordinates(&mut self) {}

    fn draw(&mut self, queue: &mut RenderQueue) -> RenderResult<()> {
        self.resolve();
        let Some(vertex_buffer) = &self.vertex_buffer else {
            return Ok(());
        };
        let indexed = self.index_buffer.is_some();
        let state = BatchState::of(&self.base, self.polygon_type.topology(), indexed);
        let source = DrawSource::Resident {
            vertex_buffer: vertex_buffer.id(),
            vertex_count: self.vertex_count(),
            index_buffer: self.index_buffer.as_ref().map(GpuBuffer::id),
            index_count: self.indices.len(),
            transform: queue.view_projection() * self.world,
            material: self.material,
        };
        queue.submit_resident(self.base.context(), state, source)
    }
}

impl HasTransform for Polygon {
    fn transform(&self) -> &Transform2D {
        &self.transform
    }

    fn transform_mut(&mut self) -> &mut Transform2D {
        &mut self.transform
    }
}

impl_transform_capabilities!(Polygon);

impl std::fmt::Debug for Polygon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Polygon")
            .field("base", &self.base)
            .field("polygon_type", &self.polygon_type)
            .field("vertices", &self.vertex_count())
            .field("indices", &self.indices.len())
            .field("dynamic", &self.dynamic)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::device::RecordingDevice;
    use crate::render::primitives::Sprite;
    use crate::render::renderable::{Anchored, Positionable};
    use approx::assert_relative_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn vertex(x: f32, y: f32) -> Vertex {
        Vertex::new(Vec4::new(x, y, 0.0, 1.0), Color::WHITE, Vec2::zeros())
    }

    fn polygon() -> (Rc<RefCell<RecordingDevice>>, ContextId, Polygon) {
        let recorder = RecordingDevice::shared();
        let context = ContextId::next();
        let polygon = Polygon::new("poly", context, recorder.clone(), PolygonType::TriangleList);
        (recorder, context, polygon)
    }

    #[test]
    fn test_flag_mapping() {
        for kind in [
            PolygonType::TriangleList,
            PolygonType::TriangleStrip,
            PolygonType::LineList,
            PolygonType::LineStrip,
        ] {
            assert_eq!(PolygonType::from_flags(kind.to_flags()), Some(kind));
        }
        assert_eq!(PolygonType::TriangleStrip.to_flags(), 5);
        assert_eq!(PolygonType::from_flags(4), None);
    }

    #[test]
    fn test_invalid_ranges_rejected_without_change() {
        let (_recorder, _context, mut polygon) = polygon();
        let source = [vertex(0.0, 0.0), vertex(1.0, 0.0)];
        assert!(matches!(
            polygon.set_vertex_data(&source, 2, 0, 1),
            Err(RenderError::InvalidArgument(_))
        ));
        assert!(polygon.set_vertex_data(&source, 1, 0, 2).is_err());
        assert_eq!(polygon.vertex_count(), 0);
        assert!(polygon.set_index_data(&[0, 1], 0, 0, 3).is_err());
    }

    #[test]
    fn test_destination_offset_is_bounded() {
        let (recorder, _context, mut polygon) = polygon();
        let source = [vertex(0.0, 0.0), vertex(1.0, 0.0)];
        polygon.set_vertex_data(&source, 0, 0, 2).unwrap();

        assert!(matches!(
            polygon.set_vertex_data(&source, 0, 3, 1),
            Err(RenderError::InvalidArgument(_))
        ));
        assert!(matches!(
            polygon.set_vertex_data(&source, 0, usize::MAX, 2),
            Err(RenderError::InvalidArgument(_))
        ));
        assert!(matches!(
            polygon.set_vertex_data(&source, 1, 0, usize::MAX),
            Err(RenderError::InvalidArgument(_))
        ));
        assert_eq!(polygon.vertex_count(), 2);
        assert_eq!(polygon.vertex_capacity(), 4);
        assert_eq!(recorder.borrow().buffers_created(), 1);

        polygon.set_index_data(&[0, 1], 0, 0, 2).unwrap();
        assert!(matches!(
            polygon.set_index_data(&[0, 1], 0, usize::MAX, 1),
            Err(RenderError::InvalidArgument(_))
        ));
        assert_eq!(polygon.indices(), &[0, 1]);
    }

    #[test]
    fn test_texture_transform_accessors() {
        let (_recorder, _context, mut polygon) = polygon();
        polygon.set_texture_offset(Vec2::new(0.25, 0.5));
        polygon.set_texture_scale(Vec2::new(2.0, 3.0));
        assert_eq!(polygon.texture_offset(), Vec2::new(0.25, 0.5));
        assert_eq!(polygon.texture_scale(), Vec2::new(2.0, 3.0));
        assert_eq!(polygon.material().texture_transform, Vec4::new(0.25, 0.5, 2.0, 3.0));
    }

    #[test]
    fn test_buffer_grows_geometrically() {
        let (recorder, _context, mut polygon) = polygon();
        let source: Vec<Vertex> = (0..4).map(|i| vertex(i as f32, 0.0)).collect();
        polygon.set_vertex_data(&source, 0, 0, 3).unwrap();
        assert_eq!(polygon.vertex_capacity(), 6);

        polygon.set_vertex_data(&source, 0, 3, 4).unwrap();
        assert_eq!(polygon.vertex_count(), 7);
        assert_eq!(polygon.vertex_capacity(), 14);
        assert_eq!(recorder.borrow().buffers_created(), 2);
        assert_eq!(recorder.borrow().live_buffers(), 1);
        assert_eq!(polygon.bounds(), Some(RectF::new(0.0, 0.0, 3.0, 0.0)));
    }

    #[test]
    fn test_vertices_take_polygon_depth() {
        let (_recorder, _context, mut polygon) = polygon();
        polygon.set_depth(0.5);
        polygon.set_vertex_data(&[vertex(1.0, 2.0)], 0, 0, 1).unwrap();
        assert_eq!(polygon.vertices()[0].position[2], 0.5);
    }

    #[test]
    fn test_empty_indices_drop_buffer() {
        let (recorder, _context, mut polygon) = polygon();
        polygon.set_index_data(&[0, 1, 2], 0, 0, 3).unwrap();
        assert_eq!(recorder.borrow().live_buffers(), 1);
        polygon.set_index_data(&[], 0, 0, 0).unwrap();
        assert_eq!(polygon.index_count(), 0);
        assert_eq!(recorder.borrow().live_buffers(), 0);
    }

    #[test]
    fn test_dynamic_toggle_is_destructive() {
        let (recorder, _context, mut polygon) = polygon();
        polygon.set_vertex_data(&[vertex(0.0, 0.0), vertex(1.0, 1.0)], 0, 0, 2).unwrap();
        polygon.set_index_data(&[0, 1], 0, 0, 2).unwrap();
        polygon.set_dynamic(true);
        assert_eq!(polygon.vertex_count(), 0);
        assert_eq!(polygon.index_count(), 0);
        assert_eq!(recorder.borrow().live_buffers(), 0);

        polygon.set_vertex_data(&[vertex(0.0, 0.0)], 0, 0, 1).unwrap();
        let device = recorder.borrow();
        assert!(device
            .buffer(polygon.vertex_buffer.as_ref().unwrap().id())
            .is_some_and(|b| b.usage == BufferUsage::Dynamic));
    }

    #[test]
    fn test_buffers_released_on_drop() {
        let (recorder, _context, mut polygon) = polygon();
        polygon.set_vertex_data(&[vertex(0.0, 0.0)], 0, 0, 1).unwrap();
        polygon.set_index_data(&[0], 0, 0, 1).unwrap();
        drop(polygon);
        assert_eq!(recorder.borrow().live_buffers(), 0);
        assert_eq!(recorder.borrow().buffers_destroyed(), 2);
    }

    #[test]
    fn test_world_transform_applies_anchor_then_translation() {
        let (_recorder, _context, mut polygon) = polygon();
        polygon.set_anchor(Vec2::new(5.0, 5.0));
        polygon.set_position(Vec2::new(100.0, 0.0));
        let world = polygon.world_transform();
        let moved = world * Vec4::new(5.0, 5.0, 0.0, 1.0);
        assert_relative_eq!(moved, Vec4::new(100.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_resident_draw_flushes_cached_geometry_first() {
        let (recorder, context, mut polygon) = polygon();
        let mut queue = RenderQueue::new(recorder.clone(), context, 64);
        let mut sprite = Sprite::new("sprite", context, Vec2::new(2.0, 2.0));
        polygon.set_vertex_data(&[vertex(0.0, 0.0), vertex(4.0, 0.0), vertex(0.0, 4.0)], 0, 0, 3).unwrap();

        sprite.draw(&mut queue).unwrap();
        polygon.draw(&mut queue).unwrap();

        let device = recorder.borrow();
        let draws = device.draws();
        assert_eq!(draws.len(), 2);
        assert!(!draws[0].is_resident());
        assert!(draws[1].is_resident());
        assert_eq!(draws[1].vertices.len(), 3);
        assert_eq!(draws[1].vertices[1].xy(), Vec2::new(4.0, 0.0));
        assert!(draws[1].indices.is_none());
        assert_eq!(draws[1].material, Some(PolygonMaterial::default()));
    }
}
