//! # Sprite and Polygon Persistence
//!
//! ## Sprite (`GORSPR20`)
//!
//! - `SPRTDATA`: anchor, size, flip flags, corner colours, corner offsets
//! - `RNDRDATA`: culling, alpha test, blend and depth/stencil state
//! - `COLLIDER` (optional): collider type name and shape
//! - `TXTRDATA` (optional): sampler, deferred texture name, texture region
//!
//! ## Polygon (`GORPLY20`)
//!
//! - `POLYDATA`: type flags, anchor, colour, vertex and index arrays
//! - `RNDRDATA`: as for sprites
//! - `TXTRDATA` (optional): sampler, deferred texture name, texture offset
//!   and scale
//!
//! `TXTRDATA` is written only when the primitive references a texture by
//! name. Streams that start with a legacy sprite header are handed to
//! [`legacy`](super::legacy).

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use std::rc::Rc;

use super::binary::{BinaryReader, BinaryWriter};
use super::chunk::{ChunkFileReader, ChunkFileWriter};
use super::{legacy, PersistError, PersistResult};
use crate::foundation::math::{RectF, Vec2};
use crate::render::collider::Collider;
use crate::render::device::SharedDevice;
use crate::render::primitives::{Polygon, PolygonType, RectangleCorner, Sprite};
use crate::render::renderable::{Anchored, ContextId, Drawable, Positionable, RenderState, TextureMapped};
use crate::render::states::{
    AlphaTestRange, BlendFactor, BlendOperation, BlendState, ColorWriteMask, ComparisonFunction, CullingMode,
    DepthStencilState, SamplerState, StencilFaceState, StencilOperation, TextureAddress, TextureFilter,
};
use crate::render::texture::TextureLookup;
use crate::render::vertex::Vertex;

/// Header of current-format sprite files
pub const SPRITE_HEADER: &str = "GORSPR20";

/// Header of current-format polygon files
pub const POLYGON_HEADER: &str = "GORPLY20";

const SPRITE_DATA: &str = "SPRTDATA";
const POLYGON_DATA: &str = "POLYDATA";
const RENDER_DATA: &str = "RNDRDATA";
const COLLIDER_DATA: &str = "COLLIDER";
const TEXTURE_DATA: &str = "TXTRDATA";

/// Primitives that can be written in the chunked format
pub trait Persist {
    /// File header identifying the primitive kind
    const HEADER: &'static str;

    /// Append this primitive's chunks
    fn write_chunks(&self, file: &mut ChunkFileWriter) -> PersistResult<()>;

    /// Encode into memory
    fn save_to_bytes(&self) -> PersistResult<Vec<u8>> {
        let mut file = ChunkFileWriter::new(Self::HEADER)?;
        self.write_chunks(&mut file)?;
        file.to_bytes()
    }

    /// Encode into a stream
    fn save<W: Write>(&self, writer: &mut W) -> PersistResult<()> {
        let mut file = ChunkFileWriter::new(Self::HEADER)?;
        self.write_chunks(&mut file)?;
        file.write_to(writer)
    }

    /// Encode into a file, replacing it
    fn save_to_path(&self, path: impl AsRef<Path>) -> PersistResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.save(&mut writer)
    }
}

/// Context a loaded primitive is bound to
#[derive(Clone)]
pub struct LoadContext {
    context: ContextId,
    device: SharedDevice,
    lookup: Option<Rc<dyn TextureLookup>>,
}

impl LoadContext {
    /// Bind loaded primitives to `context`, allocating buffers on `device`
    pub fn new(context: ContextId, device: SharedDevice) -> Self {
        Self {
            context,
            device,
            lookup: None,
        }
    }

    /// Resolve deferred texture names through `lookup`
    pub fn with_texture_lookup(mut self, lookup: Rc<dyn TextureLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// Context stamped on loaded primitives
    pub const fn context(&self) -> ContextId {
        self.context
    }

    /// Device used by primitives that own buffers
    pub const fn device(&self) -> &SharedDevice {
        &self.device
    }
}

impl std::fmt::Debug for LoadContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadContext")
            .field("context", &self.context)
            .field("lookup", &self.lookup.is_some())
            .finish_non_exhaustive()
    }
}

/// Primitives that can be rebuilt from persisted bytes
pub trait Loadable: Drawable + Sized {
    /// Create an empty named instance
    fn create(context: &LoadContext, name: &str) -> Self;

    /// Populate from an encoded file
    fn read_from(&mut self, data: &[u8]) -> PersistResult<()>;
}

/// Load a named primitive from a stream
pub fn load<T: Loadable>(context: &LoadContext, name: &str, mut reader: impl Read) -> PersistResult<T> {
    check_name(name)?;
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    load_from_bytes(context, name, &data)
}

/// Load a named primitive from memory
pub fn load_from_bytes<T: Loadable>(context: &LoadContext, name: &str, data: &[u8]) -> PersistResult<T> {
    check_name(name)?;
    let mut primitive = T::create(context, name);
    if let Some(lookup) = &context.lookup {
        primitive.base_mut().set_texture_lookup(Rc::clone(lookup));
    }
    primitive.read_from(data)?;
    Ok(primitive)
}

/// Load a named primitive from a file
pub fn load_from_path<T: Loadable>(context: &LoadContext, name: &str, path: impl AsRef<Path>) -> PersistResult<T> {
    check_name(name)?;
    let data = std::fs::read(path)?;
    load_from_bytes(context, name, &data)
}

fn check_name(name: &str) -> PersistResult<()> {
    if name.trim().is_empty() {
        return Err(PersistError::InvalidArgument("primitive name must not be empty".to_string()));
    }
    Ok(())
}

fn read_raw<T>(reader: &mut BinaryReader<'_>, field: &'static str, decode: fn(i32) -> Option<T>) -> PersistResult<T> {
    let value = reader.read_i32()?;
    decode(value).ok_or(PersistError::InvalidValue {
        field,
        value: i64::from(value),
    })
}

fn read_count(reader: &mut BinaryReader<'_>, field: &'static str, item_size: usize) -> PersistResult<usize> {
    let value = reader.read_i32()?;
    let count = usize::try_from(value).map_err(|_| PersistError::InvalidValue {
        field,
        value: i64::from(value),
    })?;
    let needed = count.saturating_mul(item_size);
    if needed > reader.remaining() {
        return Err(PersistError::ChunkOverrun {
            requested: needed,
            remaining: reader.remaining(),
        });
    }
    Ok(count)
}

fn write_count(writer: &mut BinaryWriter, count: usize) {
    writer.write_i32(i32::try_from(count).unwrap_or(i32::MAX));
}

fn write_stencil_face(writer: &mut BinaryWriter, face: StencilFaceState) {
    writer.write_i32(face.comparison().to_raw());
    writer.write_i32(face.depth_fail_operation().to_raw());
    writer.write_i32(face.fail_operation().to_raw());
    writer.write_i32(face.pass_operation().to_raw());
}

fn read_stencil_face(reader: &mut BinaryReader<'_>) -> PersistResult<StencilFaceState> {
    Ok(StencilFaceState::default()
        .with_comparison(read_raw(reader, "stencil comparison", ComparisonFunction::from_raw)?)
        .with_depth_fail_operation(read_raw(reader, "stencil depth-fail operation", StencilOperation::from_raw)?)
        .with_fail_operation(read_raw(reader, "stencil fail operation", StencilOperation::from_raw)?)
        .with_pass_operation(read_raw(reader, "stencil pass operation", StencilOperation::from_raw)?))
}

/// Write the `RNDRDATA` payload
pub(crate) fn write_render_state(writer: &mut BinaryWriter, state: &RenderState) {
    let blend = state.blend;
    let depth = state.depth_stencil;

    writer.write_i32(state.culling.to_raw());
    writer.write_f32(state.alpha_test.min);
    writer.write_f32(state.alpha_test.max);
    writer.write_i32(blend.alpha_operation().to_raw());
    writer.write_i32(blend.blend_operation().to_raw());
    writer.write_color(blend.blend_factor());
    writer.write_i32(blend.destination_alpha_blend().to_raw());
    writer.write_i32(blend.destination_blend().to_raw());
    writer.write_i32(blend.source_alpha_blend().to_raw());
    writer.write_i32(blend.source_blend().to_raw());
    writer.write_i32(i32::from(blend.write_mask().bits()));
    write_stencil_face(writer, depth.back_face());
    write_stencil_face(writer, depth.front_face());
    writer.write_i32(depth.depth_bias());
    writer.write_i32(depth.depth_comparison().to_raw());
    writer.write_i32(depth.stencil_reference());
    writer.write_bool(depth.depth_write_enabled());
    writer.write_u8(depth.stencil_read_mask());
    writer.write_u8(depth.stencil_write_mask());
}

/// Read the `RNDRDATA` payload; the sampler is left as `sampler`
pub(crate) fn read_render_state(reader: &mut BinaryReader<'_>, sampler: SamplerState) -> PersistResult<RenderState> {
    let mut culling = read_raw(reader, "culling mode", CullingMode::from_raw)?;
    if culling == CullingMode::Unknown {
        log::debug!("Ignoring unknown culling mode in render state");
        culling = CullingMode::default();
    }
    let alpha_test = AlphaTestRange::new(reader.read_f32()?, reader.read_f32()?);

    let alpha_operation = read_raw(reader, "alpha operation", BlendOperation::from_raw)?;
    let blend_operation = read_raw(reader, "blend operation", BlendOperation::from_raw)?;
    let blend_factor = reader.read_color()?;
    let destination_alpha = read_raw(reader, "destination alpha blend", BlendFactor::from_raw)?;
    let destination = read_raw(reader, "destination blend", BlendFactor::from_raw)?;
    let source_alpha = read_raw(reader, "source alpha blend", BlendFactor::from_raw)?;
    let source = read_raw(reader, "source blend", BlendFactor::from_raw)?;
    let write_mask = read_raw(reader, "write mask", |raw| {
        u8::try_from(raw).ok().and_then(ColorWriteMask::from_bits)
    })?;
    let blend = BlendState::default()
        .with_alpha_operation(alpha_operation)
        .with_blend_operation(blend_operation)
        .with_blend_factor(blend_factor)
        .with_destination_alpha_blend(destination_alpha)
        .with_destination_blend(destination)
        .with_source_alpha_blend(source_alpha)
        .with_source_blend(source)
        .with_write_mask(write_mask);

    let back_face = read_stencil_face(reader)?;
    let front_face = read_stencil_face(reader)?;
    let depth_bias = reader.read_i32()?;
    let depth_comparison = read_raw(reader, "depth comparison", ComparisonFunction::from_raw)?;
    let stencil_reference = reader.read_i32()?;
    let depth_write = reader.read_bool()?;
    let read_mask = reader.read_u8()?;
    let write_mask = reader.read_u8()?;
    let depth_stencil = DepthStencilState::default()
        .with_back_face(back_face)
        .with_front_face(front_face)
        .with_depth_bias(depth_bias)
        .with_depth_comparison(depth_comparison)
        .with_stencil_reference(stencil_reference)
        .with_depth_write(depth_write)
        .with_stencil_read_mask(read_mask)
        .with_stencil_write_mask(write_mask);

    Ok(RenderState {
        blend,
        depth_stencil,
        sampler,
        culling,
        alpha_test,
    })
}

fn write_sampler(writer: &mut BinaryWriter, sampler: &SamplerState) {
    writer.write_color(sampler.border_color());
    writer.write_i32(sampler.horizontal_address().to_raw());
    writer.write_i32(sampler.vertical_address().to_raw());
    writer.write_i32(sampler.filter().bits());
}

fn read_sampler(reader: &mut BinaryReader<'_>) -> PersistResult<SamplerState> {
    let border = reader.read_color()?;
    let horizontal = read_raw(reader, "horizontal wrapping", TextureAddress::from_raw)?;
    let vertical = read_raw(reader, "vertical wrapping", TextureAddress::from_raw)?;
    let filter = read_raw(reader, "texture filter", TextureFilter::from_bits)?;
    Ok(SamplerState::default()
        .with_border_color(border)
        .with_horizontal_address(horizontal)
        .with_vertical_address(vertical)
        .with_filter(filter))
}

fn write_collider(writer: &mut BinaryWriter, collider: &Collider) {
    writer.write_string(collider.type_name());
    match collider {
        Collider::BoundingBox { offset, size } => {
            writer.write_vec2(*offset);
            writer.write_vec2(*size);
        }
        Collider::BoundingCircle { center, radius } => {
            writer.write_vec2(*center);
            writer.write_f32(*radius);
        }
        Collider::Polygon { points } => {
            write_count(writer, points.len());
            for point in points {
                writer.write_vec2(*point);
            }
        }
    }
}

fn read_collider(reader: &mut BinaryReader<'_>) -> PersistResult<Collider> {
    let type_name = reader.read_string()?;
    match type_name.as_str() {
        "BoundingBox" => Ok(Collider::BoundingBox {
            offset: reader.read_vec2()?,
            size: reader.read_vec2()?,
        }),
        "BoundingCircle" => Ok(Collider::BoundingCircle {
            center: reader.read_vec2()?,
            radius: reader.read_f32()?,
        }),
        "Polygon" => {
            let count = read_count(reader, "collider point count", 8)?;
            let points = (0..count).map(|_| reader.read_vec2()).collect::<PersistResult<Vec<_>>>()?;
            Ok(Collider::Polygon { points })
        }
        other => Err(PersistError::InvalidArgument(format!("unknown collider type {other:?}"))),
    }
}

fn write_vertex(writer: &mut BinaryWriter, vertex: &Vertex) {
    for value in vertex.position.iter().chain(&vertex.color).chain(&vertex.uv) {
        writer.write_f32(*value);
    }
}

fn read_vertex(reader: &mut BinaryReader<'_>) -> PersistResult<Vertex> {
    let mut vertex = Vertex::default();
    for slot in vertex.position.iter_mut().chain(&mut vertex.color).chain(&mut vertex.uv) {
        *slot = reader.read_f32()?;
    }
    Ok(vertex)
}

impl Persist for Sprite {
    const HEADER: &'static str = SPRITE_HEADER;

    fn write_chunks(&self, file: &mut ChunkFileWriter) -> PersistResult<()> {
        file.chunk(SPRITE_DATA, |w| {
            w.write_vec2(self.anchor());
            w.write_vec2(self.size());
            w.write_bool(self.horizontal_flip());
            w.write_bool(self.vertical_flip());
            for corner in RectangleCorner::ALL {
                w.write_color(self.corner_color(corner));
            }
            for corner in RectangleCorner::ALL {
                w.write_vec2(self.corner_offset(corner));
            }
        })?;

        file.chunk(RENDER_DATA, |w| write_render_state(w, self.base().render_state()))?;

        if let Some(collider) = self.collider() {
            file.chunk(COLLIDER_DATA, |w| write_collider(w, collider))?;
        }

        if let Some(name) = self.base().deferred_texture_name() {
            let region = self.texture_region();
            file.chunk(TEXTURE_DATA, |w| {
                write_sampler(w, &self.base().sampler_state());
                w.write_string(name);
                w.write_f32(region.x);
                w.write_f32(region.y);
                w.write_f32(region.width);
                w.write_f32(region.height);
            })?;
        }
        Ok(())
    }
}

impl Loadable for Sprite {
    fn create(context: &LoadContext, name: &str) -> Self {
        Self::new(name, context.context(), Vec2::zeros())
    }

    fn read_from(&mut self, data: &[u8]) -> PersistResult<()> {
        if legacy::is_legacy_sprite(data) {
            let version = legacy::read_sprite(self, data)?;
            log::info!("Loaded sprite '{}' from legacy format {:?}", self.base().name(), version);
            return Ok(());
        }

        let file = ChunkFileReader::open(data, SPRITE_HEADER)?;

        let mut reader = file.open_chunk(SPRITE_DATA)?;
        self.set_anchor(reader.read_vec2()?);
        self.set_size(reader.read_vec2()?);
        self.set_horizontal_flip(reader.read_bool()?);
        self.set_vertical_flip(reader.read_bool()?);
        for corner in RectangleCorner::ALL {
            self.set_corner_color(corner, reader.read_color()?);
        }
        for corner in RectangleCorner::ALL {
            self.set_corner_offset(corner, reader.read_vec2()?);
        }

        let mut reader = file.open_chunk(RENDER_DATA)?;
        let state = read_render_state(&mut reader, self.base().sampler_state())?;
        self.base_mut().set_render_state(state);

        if let Some(mut reader) = file.open_optional(COLLIDER_DATA) {
            self.set_collider(Some(read_collider(&mut reader)?));
        }

        if let Some(mut reader) = file.open_optional(TEXTURE_DATA) {
            let sampler = read_sampler(&mut reader)?;
            let name = reader.read_string()?;
            let region = RectF::new(reader.read_f32()?, reader.read_f32()?, reader.read_f32()?, reader.read_f32()?);
            self.base_mut().set_sampler_state(sampler);
            self.base_mut().set_deferred_texture_name(Some(&name));
            self.set_texture_region(region);
        }
        Ok(())
    }
}

impl Persist for Polygon {
    const HEADER: &'static str = POLYGON_HEADER;

    fn write_chunks(&self, file: &mut ChunkFileWriter) -> PersistResult<()> {
        file.chunk(POLYGON_DATA, |w| {
            w.write_i32(self.polygon_type().to_flags());
            w.write_vec2(self.anchor());
            w.write_color(self.color());
            write_count(w, self.vertex_count());
            write_count(w, self.index_count());
            for vertex in self.vertices() {
                write_vertex(w, vertex);
            }
            for index in self.indices() {
                w.write_u32(*index);
            }
        })?;

        file.chunk(RENDER_DATA, |w| write_render_state(w, self.base().render_state()))?;

        if let Some(name) = self.base().deferred_texture_name() {
            file.chunk(TEXTURE_DATA, |w| {
                write_sampler(w, &self.base().sampler_state());
                w.write_string(name);
                w.write_vec2(self.texture_offset());
                w.write_vec2(self.texture_scale());
            })?;
        }
        Ok(())
    }
}

impl Loadable for Polygon {
    fn create(context: &LoadContext, name: &str) -> Self {
        Self::new(name, context.context(), Rc::clone(context.device()), PolygonType::default())
    }

    fn read_from(&mut self, data: &[u8]) -> PersistResult<()> {
        let file = ChunkFileReader::open(data, POLYGON_HEADER)?;

        let mut reader = file.open_chunk(POLYGON_DATA)?;
        let polygon_type = read_raw(&mut reader, "polygon type", PolygonType::from_flags)?;
        self.set_polygon_type(polygon_type);
        self.set_anchor(reader.read_vec2()?);
        self.set_color(reader.read_color()?);
        let vertex_count = read_count(&mut reader, "vertex count", Vertex::SIZE)?;
        let index_count = read_count(&mut reader, "index count", 0)?;
        let vertices = (0..vertex_count)
            .map(|_| read_vertex(&mut reader))
            .collect::<PersistResult<Vec<_>>>()?;
        if index_count.saturating_mul(4) > reader.remaining() {
            return Err(PersistError::ChunkOverrun {
                requested: index_count.saturating_mul(4),
                remaining: reader.remaining(),
            });
        }
        let indices = (0..index_count)
            .map(|_| reader.read_u32())
            .collect::<PersistResult<Vec<_>>>()?;
        // z carries the depth the polygon was saved at
        if let Some(first) = vertices.first() {
            self.set_depth(first.position[2]);
        }
        self.set_vertex_data(&vertices, 0, 0, vertices.len())?;
        self.set_index_data(&indices, 0, 0, indices.len())?;

        let mut reader = file.open_chunk(RENDER_DATA)?;
        let state = read_render_state(&mut reader, self.base().sampler_state())?;
        self.base_mut().set_render_state(state);

        if let Some(mut reader) = file.open_optional(TEXTURE_DATA) {
            let sampler = read_sampler(&mut reader)?;
            let name = reader.read_string()?;
            let offset = reader.read_vec2()?;
            let scale = reader.read_vec2()?;
            self.base_mut().set_sampler_state(sampler);
            self.base_mut().set_deferred_texture_name(Some(&name));
            self.set_texture_offset(offset);
            self.set_texture_scale(scale);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::color::Color;
    use crate::render::device::RecordingDevice;
    use crate::render::states::{BlendingMode, SmoothingMode};
    use crate::render::texture::TextureRegistry;

    fn context() -> LoadContext {
        LoadContext::new(ContextId::next(), RecordingDevice::shared())
    }

    fn styled_sprite(context: &LoadContext) -> Sprite {
        let mut sprite = Sprite::new("ship", context.context(), Vec2::new(32.0, 16.0));
        sprite.set_anchor(Vec2::new(16.0, 8.0));
        sprite.set_horizontal_flip(true);
        sprite.set_corner_color(RectangleCorner::LowerRight, Color::new(0.2, 0.4, 0.6, 0.8));
        sprite.set_corner_offset(RectangleCorner::UpperLeft, Vec2::new(-1.0, 2.0));
        sprite.set_collider(Some(Collider::BoundingCircle {
            center: Vec2::new(16.0, 8.0),
            radius: 7.5,
        }));
        let base = sprite.base_mut();
        base.set_blending_mode(BlendingMode::Additive);
        base.set_smoothing_mode(SmoothingMode::Smooth);
        base.set_culling_mode(CullingMode::Front);
        base.set_alpha_test(AlphaTestRange::new(0.1, 0.9));
        base.set_depth_stencil_state(
            DepthStencilState::default()
                .with_depth_bias(3)
                .with_stencil_write_mask(0x0F)
                .with_front_face(StencilFaceState::default().with_pass_operation(StencilOperation::Replace)),
        );
        base.set_deferred_texture_name(Some("ships"));
        sprite.set_texture_region(RectF::new(0.25, 0.0, 0.5, 0.5));
        sprite
    }

    #[test]
    fn test_sprite_round_trip() {
        let context = context();
        let sprite = styled_sprite(&context);
        let bytes = sprite.save_to_bytes().unwrap();
        assert_eq!(&bytes[..8], SPRITE_HEADER.as_bytes());

        let loaded: Sprite = load_from_bytes(&context, "copy", &bytes).unwrap();
        assert_eq!(loaded.base().name(), "copy");
        assert_eq!(loaded.anchor(), sprite.anchor());
        assert_eq!(loaded.size(), sprite.size());
        assert!(loaded.horizontal_flip());
        assert!(!loaded.vertical_flip());
        for corner in RectangleCorner::ALL {
            assert_eq!(loaded.corner_offset(corner), sprite.corner_offset(corner));
            assert_eq!(loaded.corner_color(corner).to_argb(), sprite.corner_color(corner).to_argb());
        }
        assert_eq!(loaded.collider(), sprite.collider());
        assert_eq!(loaded.base().render_state(), sprite.base().render_state());
        assert_eq!(loaded.base().deferred_texture_name(), Some("ships"));
        assert_eq!(loaded.texture_region(), sprite.texture_region());
    }

    #[test]
    fn test_untextured_sprite_omits_texture_chunk() {
        let context = context();
        let sprite = Sprite::new("plain", context.context(), Vec2::new(4.0, 4.0));
        let bytes = sprite.save_to_bytes().unwrap();
        let file = ChunkFileReader::open(&bytes, SPRITE_HEADER).unwrap();
        assert_eq!(file.chunk_ids().collect::<Vec<_>>(), vec![SPRITE_DATA, RENDER_DATA]);

        let loaded: Sprite = load_from_bytes(&context, "plain", &bytes).unwrap();
        assert!(loaded.base().deferred_texture_name().is_none());
        assert!(loaded.base().texture().is_none());
        assert_eq!(loaded.texture_region(), RectF::unit());
    }

    #[test]
    fn test_loaded_texture_name_resolves_through_lookup() {
        let registry = Rc::new(TextureRegistry::new());
        let texture = registry.register("SHIPS", 128, 128).unwrap();
        let context = context().with_texture_lookup(registry);
        let bytes = styled_sprite(&context).save_to_bytes().unwrap();
        let loaded: Sprite = load_from_bytes(&context, "ship", &bytes).unwrap();
        assert_eq!(loaded.base().texture(), Some(&texture));
    }

    #[test]
    fn test_bad_header_and_empty_name() {
        let context = context();
        let result: PersistResult<Sprite> = load_from_bytes(&context, "ship", b"NOTASPRITEFILE");
        assert!(matches!(result, Err(PersistError::InvalidHeader { .. })));

        let bytes = Sprite::new("a", context.context(), Vec2::zeros()).save_to_bytes().unwrap();
        let result: PersistResult<Sprite> = load_from_bytes(&context, "", &bytes);
        assert!(matches!(result, Err(PersistError::InvalidArgument(_))));

        let result: PersistResult<Polygon> = load_from_bytes(&context, "poly", &bytes);
        assert!(matches!(result, Err(PersistError::InvalidHeader { .. })));
    }

    #[test]
    fn test_polygon_round_trip() {
        let context = context();
        let mut polygon = Polygon::new("hull", context.context(), Rc::clone(context.device()), PolygonType::LineStrip);
        let vertices: Vec<Vertex> = (0..5)
            .map(|i| {
                let mut vertex = Vertex::default();
                vertex.position = [i as f32, (i * 2) as f32, 0.0, 1.0];
                vertex.uv = [0.1 * i as f32, 0.5];
                vertex
            })
            .collect();
        polygon.set_vertex_data(&vertices, 0, 0, vertices.len()).unwrap();
        polygon.set_index_data(&[0, 1, 2, 3, 4, 0], 0, 0, 6).unwrap();
        polygon.set_anchor(Vec2::new(2.0, 4.0));
        polygon.set_position(Vec2::new(100.0, 50.0));
        polygon.set_color(Color::GREEN);
        polygon.set_texture_offset(Vec2::new(0.5, 0.25));
        polygon.set_texture_scale(Vec2::new(2.0, 2.0));
        polygon.base_mut().set_deferred_texture_name(Some("hull_plates"));

        let mut stream = Vec::new();
        polygon.save(&mut stream).unwrap();
        assert_eq!(&stream[..8], POLYGON_HEADER.as_bytes());

        let loaded: Polygon = load(&context, "hull", stream.as_slice()).unwrap();
        assert_eq!(loaded.polygon_type(), PolygonType::LineStrip);
        assert_eq!(loaded.anchor(), Vec2::new(2.0, 4.0));
        assert_eq!(loaded.color(), Color::GREEN);
        assert_eq!(loaded.vertices(), polygon.vertices());
        assert_eq!(loaded.indices(), &[0, 1, 2, 3, 4, 0]);
        assert_eq!(loaded.texture_offset(), Vec2::new(0.5, 0.25));
        assert_eq!(loaded.texture_scale(), Vec2::new(2.0, 2.0));
        assert_eq!(loaded.base().deferred_texture_name(), Some("hull_plates"));
        assert!(loaded.vertex_capacity() >= 5);
    }

    #[test]
    fn test_polygon_depth_survives_round_trip() {
        let context = context();
        let mut polygon = Polygon::new("layer", context.context(), Rc::clone(context.device()), PolygonType::TriangleList);
        polygon.set_depth(0.75);
        polygon.set_vertex_data(&[Vertex::default(); 3], 0, 0, 3).unwrap();

        let bytes = polygon.save_to_bytes().unwrap();
        let loaded: Polygon = load_from_bytes(&context, "layer", &bytes).unwrap();
        assert_eq!(loaded.depth(), 0.75);
        assert!(loaded.vertices().iter().all(|v| v.position[2] == 0.75));
    }

    #[test]
    fn test_truncated_polygon_fails() {
        let context = context();
        let mut polygon = Polygon::new("hull", context.context(), Rc::clone(context.device()), PolygonType::TriangleList);
        polygon.set_vertex_data(&[Vertex::default(); 3], 0, 0, 3).unwrap();
        let bytes = polygon.save_to_bytes().unwrap();
        let result: PersistResult<Polygon> = load_from_bytes(&context, "hull", &bytes[..bytes.len() - 10]);
        assert!(matches!(result, Err(PersistError::ChunkOverrun { .. })));
    }

    #[test]
    fn test_file_round_trip() {
        let context = context();
        let path = std::env::temp_dir().join(format!("render2d_sprite_{}.gorSprite", std::process::id()));
        let sprite = styled_sprite(&context);
        sprite.save_to_path(&path).unwrap();
        let loaded: PersistResult<Sprite> = load_from_path(&context, "ship", &path);
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded.unwrap().size(), Vec2::new(32.0, 16.0));
    }
}
