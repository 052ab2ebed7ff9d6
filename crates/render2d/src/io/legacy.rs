//! # Legacy Sprite Reader
//!
//! Sprites from the 1.x tools are a single unchunked stream that starts with
//! a length-prefixed version string (`GORSPR1`, `GORSPR1.1` or `GORSPR1.2`).
//! Most state is optional: a block of "inherit" flags says which fields are
//! present, and fields with no modern counterpart (shaders, blend modes,
//! stencil and depth settings) are read and discarded.
//!
//! Legacy texture coordinates are in pixels. The region is kept pending on
//! the sprite and converted once the named texture is bound. The format is
//! read-only; sprites loaded from it are saved in the chunked format.

use super::binary::BinaryReader;
use super::{PersistError, PersistResult};
use crate::foundation::math::{RectF, Vec2};
use crate::render::color::Color;
use crate::render::primitives::{RectangleCorner, Sprite};
use crate::render::renderable::{Anchored, Drawable};
use crate::render::states::{AlphaTestRange, SamplerState, TextureAddress, TextureFilter};

const HEADER_PREFIX: &[u8] = b"GORSPR";

/// Legacy format revisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LegacyVersion {
    /// `GORSPR1`
    V1_0,
    /// `GORSPR1.1`: adds depth flags and the sampler border colour
    V1_1,
    /// `GORSPR1.2`: adds alpha blend modes
    V1_2,
}

impl LegacyVersion {
    fn from_header(header: &str) -> PersistResult<Self> {
        match header.to_ascii_uppercase().as_str() {
            "GORSPR1" => Ok(Self::V1_0),
            "GORSPR1.1" => Ok(Self::V1_1),
            "GORSPR1.2" => Ok(Self::V1_2),
            _ => Err(PersistError::UnsupportedLegacyVersion(header.to_string())),
        }
    }
}

/// Whether `data` starts with a legacy sprite header
pub fn is_legacy_sprite(data: &[u8]) -> bool {
    match data.first() {
        Some(length @ 7..=9) => data
            .get(1..=HEADER_PREFIX.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(HEADER_PREFIX) && data.len() > usize::from(*length)),
        _ => false,
    }
}

fn wrap_mode(value: i32) -> TextureAddress {
    match value {
        0 => TextureAddress::Wrap,
        1 => TextureAddress::Mirror,
        2 => TextureAddress::MirrorOnce,
        4 => TextureAddress::Border,
        _ => TextureAddress::Clamp,
    }
}

fn smoothing_filter(value: i32) -> TextureFilter {
    match value {
        0 => TextureFilter::POINT,
        2 => TextureFilter::MIN_POINT | TextureFilter::MAG_LINEAR | TextureFilter::MIP_LINEAR,
        3 => TextureFilter::MIN_LINEAR | TextureFilter::MAG_POINT | TextureFilter::MIP_POINT,
        _ => TextureFilter::LINEAR,
    }
}

/// Presence flags; a set flag means the field was omitted from the stream
struct Inherited {
    alpha_function: bool,
    alpha_value: bool,
    blending: bool,
    horizontal_wrap: bool,
    smoothing: bool,
    stencil_compare: bool,
    stencil_enabled: bool,
    stencil_fail: bool,
    stencil_mask: bool,
    stencil_pass: bool,
    stencil_reference: bool,
    stencil_depth_fail: bool,
    vertical_wrap: bool,
    depth_bias: bool,
    depth_function: bool,
    depth_write: bool,
}

impl Inherited {
    fn read(reader: &mut BinaryReader<'_>, version: LegacyVersion) -> PersistResult<Self> {
        let mut flags = [true; 16];
        let present = if version >= LegacyVersion::V1_1 { 16 } else { 13 };
        for flag in &mut flags[..present] {
            *flag = reader.read_bool()?;
        }
        let [alpha_function, alpha_value, blending, horizontal_wrap, smoothing, stencil_compare, stencil_enabled, stencil_fail, stencil_mask, stencil_pass, stencil_reference, stencil_depth_fail, vertical_wrap, depth_bias, depth_function, depth_write] =
            flags;
        Ok(Self {
            alpha_function,
            alpha_value,
            blending,
            horizontal_wrap,
            smoothing,
            stencil_compare,
            stencil_enabled,
            stencil_fail,
            stencil_mask,
            stencil_pass,
            stencil_reference,
            stencil_depth_fail,
            vertical_wrap,
            depth_bias,
            depth_function,
            depth_write,
        })
    }
}

fn skip_i32_unless(reader: &mut BinaryReader<'_>, inherited: bool) -> PersistResult<()> {
    if !inherited {
        reader.read_i32()?;
    }
    Ok(())
}

/// Populate `sprite` from a legacy stream, returning the detected version
pub fn read_sprite(sprite: &mut Sprite, data: &[u8]) -> PersistResult<LegacyVersion> {
    let mut reader = BinaryReader::new(data);
    let version = LegacyVersion::from_header(&reader.read_string()?)?;

    // stored name; the caller's name wins
    reader.read_string()?;

    let mut image_name = None;
    if reader.read_bool()? {
        let render_target = reader.read_bool()?;
        image_name = Some(reader.read_string()?);
        if render_target {
            reader.skip(3 * 4 + 2)?;
        }
    }

    let inherited = Inherited::read(&mut reader, version)?;

    let size = reader.read_vec2()?;
    let texture_offset = reader.read_vec2()?;
    let anchor = reader.read_vec2()?;

    let offsets = [
        (RectangleCorner::UpperLeft, reader.read_vec2()?),
        (RectangleCorner::UpperRight, reader.read_vec2()?),
        (RectangleCorner::LowerRight, reader.read_vec2()?),
        (RectangleCorner::LowerLeft, reader.read_vec2()?),
    ];
    let colors = [
        (RectangleCorner::UpperLeft, reader.read_color()?),
        (RectangleCorner::UpperRight, reader.read_color()?),
        (RectangleCorner::LowerLeft, reader.read_color()?),
        (RectangleCorner::LowerRight, reader.read_color()?),
    ];

    if version == LegacyVersion::V1_0 && reader.read_bool()? {
        reader.read_string()?;
        reader.read_bool()?;
        if reader.read_bool()? {
            reader.read_string()?;
        }
    }

    skip_i32_unless(&mut reader, inherited.alpha_function)?;
    let alpha_test = if inherited.alpha_value {
        None
    } else {
        Some(AlphaTestRange::new(0.0, reader.read_i32()? as f32 / 255.0))
    };
    if !inherited.blending {
        reader.skip(3 * 4)?;
    }
    if version >= LegacyVersion::V1_2 {
        reader.skip(2 * 4)?;
    }

    let mut horizontal = TextureAddress::Clamp;
    let mut vertical = TextureAddress::Clamp;
    let mut filter = TextureFilter::LINEAR;
    let mut border = Color::WHITE;

    if !inherited.horizontal_wrap {
        horizontal = wrap_mode(reader.read_i32()?);
    }
    if !inherited.smoothing {
        filter = smoothing_filter(reader.read_i32()?);
    }
    skip_i32_unless(&mut reader, inherited.stencil_compare)?;
    if !inherited.stencil_enabled {
        reader.read_bool()?;
    }
    skip_i32_unless(&mut reader, inherited.stencil_fail)?;
    skip_i32_unless(&mut reader, inherited.stencil_mask)?;
    skip_i32_unless(&mut reader, inherited.stencil_pass)?;
    skip_i32_unless(&mut reader, inherited.stencil_reference)?;
    skip_i32_unless(&mut reader, inherited.stencil_depth_fail)?;
    if !inherited.vertical_wrap {
        vertical = wrap_mode(reader.read_i32()?);
    }

    if version >= LegacyVersion::V1_1 {
        if !inherited.depth_bias {
            reader.read_f32()?;
        }
        skip_i32_unless(&mut reader, inherited.depth_function)?;
        if !inherited.depth_write {
            reader.read_bool()?;
        }
        border = reader.read_color()?;
        if border == Color::BLACK {
            border = Color::WHITE;
        }
    }

    let horizontal_flip = reader.read_bool()?;
    let vertical_flip = reader.read_bool()?;

    sprite.set_size(size);
    sprite.set_anchor(anchor);
    for (corner, offset) in offsets {
        sprite.set_corner_offset(corner, offset);
    }
    for (corner, color) in colors {
        sprite.set_corner_color(corner, color);
    }
    sprite.set_horizontal_flip(horizontal_flip);
    sprite.set_vertical_flip(vertical_flip);

    let base = sprite.base_mut();
    if let Some(range) = alpha_test {
        base.set_alpha_test(range);
    }
    base.set_sampler_state(
        SamplerState::default()
            .with_horizontal_address(horizontal)
            .with_vertical_address(vertical)
            .with_filter(filter)
            .with_border_color(border),
    );

    if let Some(name) = image_name.filter(|name| !name.trim().is_empty()) {
        sprite.base_mut().set_deferred_texture_name(Some(&name));
        sprite.set_pixel_texture_region(RectF::from_location_size(texture_offset, size));
    } else {
        log::debug!("Legacy sprite '{}' has no texture", sprite.base().name());
    }

    if !reader.is_at_end() {
        log::debug!("Ignoring {} trailing bytes in legacy sprite", reader.remaining());
    }

    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::binary::BinaryWriter;
    use crate::render::renderable::ContextId;
    use crate::render::texture::TextureRegistry;
    use std::rc::Rc;

    /// Stream with every optional field omitted except those `extra` writes
    fn legacy_stream(header: &str, image: Option<&str>, inherit: &[bool], extra: impl FnOnce(&mut BinaryWriter)) -> Vec<u8> {
        let mut w = BinaryWriter::new();
        w.write_string(header);
        w.write_string("old name");
        w.write_bool(image.is_some());
        if let Some(image) = image {
            w.write_bool(false);
            w.write_string(image);
        }
        for flag in inherit {
            w.write_bool(*flag);
        }
        w.write_vec2(Vec2::new(32.0, 16.0));
        w.write_vec2(Vec2::new(64.0, 0.0));
        w.write_vec2(Vec2::new(16.0, 8.0));
        w.write_vec2(Vec2::new(1.0, 1.0));
        w.write_vec2(Vec2::zeros());
        w.write_vec2(Vec2::new(3.0, 4.0));
        w.write_vec2(Vec2::zeros());
        w.write_color(Color::RED);
        w.write_color(Color::WHITE);
        w.write_color(Color::WHITE);
        w.write_color(Color::BLUE);
        extra(&mut w);
        w.into_bytes()
    }

    #[test]
    fn test_detects_legacy_headers() {
        let v1 = legacy_stream("GORSPR1", None, &[true; 13], |w| {
            w.write_bool(false);
            w.write_bool(false);
            w.write_bool(false);
        });
        assert!(is_legacy_sprite(&v1));
        assert!(is_legacy_sprite(b"\x09gorspr1.2...."));
        assert!(!is_legacy_sprite(b"GORSPR20"));
        assert!(!is_legacy_sprite(b"\x07GORPLY1"));
    }

    #[test]
    fn test_reads_v1_0_with_shader_block() {
        let data = legacy_stream("GORSPR1", None, &[true; 13], |w| {
            w.write_bool(true);
            w.write_string("shader.fx");
            w.write_bool(false);
            w.write_bool(true);
            w.write_string("technique");
            w.write_bool(true);
            w.write_bool(false);
        });
        let mut sprite = Sprite::new("ship", ContextId::next(), Vec2::zeros());
        assert_eq!(read_sprite(&mut sprite, &data).unwrap(), LegacyVersion::V1_0);
        assert_eq!(sprite.size(), Vec2::new(32.0, 16.0));
        assert_eq!(sprite.anchor(), Vec2::new(16.0, 8.0));
        assert_eq!(sprite.corner_offset(RectangleCorner::UpperLeft), Vec2::new(1.0, 1.0));
        assert_eq!(sprite.corner_offset(RectangleCorner::LowerRight), Vec2::new(3.0, 4.0));
        assert_eq!(sprite.corner_color(RectangleCorner::UpperLeft), Color::RED);
        assert_eq!(sprite.corner_color(RectangleCorner::LowerRight), Color::BLUE);
        assert!(sprite.horizontal_flip());
        assert!(!sprite.vertical_flip());
        assert!(sprite.base().deferred_texture_name().is_none());
        assert_eq!(sprite.base().sampler_state().filter(), TextureFilter::LINEAR);
        assert_eq!(sprite.base().sampler_state().border_color(), Color::WHITE);
    }

    #[test]
    fn test_reads_v1_2_optional_fields() {
        let mut inherit = [true; 16];
        inherit[1] = false; // alpha value
        inherit[3] = false; // horizontal wrap
        inherit[4] = false; // smoothing
        inherit[6] = false; // stencil enabled
        inherit[12] = false; // vertical wrap
        inherit[13] = false; // depth bias
        let data = legacy_stream("gorspr1.2", Some("sheet"), &inherit, |w| {
            w.write_i32(128);
            w.write_i32(0);
            w.write_i32(0);
            w.write_i32(0);
            w.write_i32(0);
            w.write_bool(true);
            w.write_i32(1);
            w.write_f32(0.5);
            w.write_color(Color::BLACK);
            w.write_bool(false);
            w.write_bool(true);
        });
        let mut sprite = Sprite::new("ship", ContextId::next(), Vec2::zeros());
        assert_eq!(read_sprite(&mut sprite, &data).unwrap(), LegacyVersion::V1_2);

        let sampler = sprite.base().sampler_state();
        assert_eq!(sampler.horizontal_address(), TextureAddress::Wrap);
        assert_eq!(sampler.vertical_address(), TextureAddress::Mirror);
        assert_eq!(sampler.filter(), TextureFilter::POINT);
        assert_eq!(sampler.border_color(), Color::WHITE);
        assert!((sprite.base().alpha_test().max - 128.0 / 255.0).abs() < 1e-6);
        assert!(sprite.vertical_flip());
        assert_eq!(sprite.base().deferred_texture_name(), Some("sheet"));
        assert_eq!(sprite.pending_pixel_region(), Some(RectF::new(64.0, 0.0, 32.0, 16.0)));
    }

    #[test]
    fn test_pixel_region_converts_when_texture_resolves() {
        let registry = Rc::new(TextureRegistry::new());
        registry.register("sheet", 128, 64).unwrap();
        let data = legacy_stream("GORSPR1.1", Some("sheet"), &[true; 16], |w| {
            w.write_color(Color::GREEN);
            w.write_bool(false);
            w.write_bool(false);
        });
        let mut sprite = Sprite::new("ship", ContextId::next(), Vec2::zeros());
        sprite.base_mut().set_texture_lookup(registry);
        read_sprite(&mut sprite, &data).unwrap();
        assert!(sprite.base().texture().is_some());
        assert_eq!(sprite.base().texture_region(), RectF::new(0.5, 0.0, 0.25, 0.25));
        assert_eq!(sprite.base().sampler_state().border_color(), Color::GREEN);
    }

    #[test]
    fn test_unknown_version_rejected() {
        let mut w = BinaryWriter::new();
        w.write_string("GORSPR1.5");
        let mut sprite = Sprite::new("ship", ContextId::next(), Vec2::zeros());
        assert!(matches!(
            read_sprite(&mut sprite, &w.into_bytes()),
            Err(PersistError::UnsupportedLegacyVersion(_))
        ));
    }

    #[test]
    fn test_truncated_stream_fails() {
        let data = legacy_stream("GORSPR1.1", None, &[true; 16], |_| {});
        let mut sprite = Sprite::new("ship", ContextId::next(), Vec2::zeros());
        assert!(matches!(read_sprite(&mut sprite, &data), Err(PersistError::ChunkOverrun { .. })));
    }
}
