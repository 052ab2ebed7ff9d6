//! Glyph tables consumed by text layout
//!
//! Rasterising glyphs is the job of an external font service; layout only
//! needs per-character metrics, the atlas region each glyph lives in and the
//! kerning table. [`GlyphSource`] is that seam, and [`Font`] is a plain table
//! implementation of it.

use std::collections::HashMap;

use crate::foundation::math::{RectF, Vec2};
use crate::render::color::Color;
use crate::render::texture::Texture;

/// Metrics and atlas location of one character
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    /// Character the glyph draws
    pub character: char,
    /// Size of the glyph cell in pixels
    pub size: Vec2,
    /// Offset from the pen position to the top-left of the cell
    pub offset: Vec2,
    /// Horizontal pen advance when kerning is applied
    pub advance: f32,
    /// Texture holding the glyph
    pub texture: Option<Texture>,
    /// Region of `texture` in texture space
    pub texture_region: RectF,
}

impl Glyph {
    /// Glyph of `size` pixels whose advance equals its width
    pub fn new(character: char, size: Vec2) -> Self {
        Self {
            character,
            size,
            offset: Vec2::zeros(),
            advance: size.x,
            texture: None,
            texture_region: RectF::unit(),
        }
    }

    /// Set the pen offset
    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    /// Set the advance
    pub const fn with_advance(mut self, advance: f32) -> Self {
        self.advance = advance;
        self
    }

    /// Place the glyph in a texture region (texture space)
    pub fn with_texture(mut self, texture: Texture, region: RectF) -> Self {
        self.texture = Some(texture);
        self.texture_region = region;
        self
    }

    /// Width of the glyph cell
    pub fn width(&self) -> f32 {
        self.size.x
    }
}

/// Character to glyph lookup used by text layout
pub trait GlyphSource {
    /// Glyph for `character`, if the font has one
    fn glyph(&self, character: char) -> Option<&Glyph>;

    /// Character substituted for characters the font lacks
    fn default_character(&self) -> char;

    /// Extra advance between an ordered pair of characters
    fn kerning(&self, first: char, second: char) -> Option<f32>;

    /// Whether the font has any kerning pairs
    fn has_kerning(&self) -> bool;

    /// Height of one line of glyphs in pixels
    fn font_height(&self) -> f32;

    /// Outline thickness that contributes to layout (zero when the outline is
    /// invisible)
    fn outline_size(&self) -> f32;

    /// Glyph for `character`, falling back to the default character
    ///
    /// Returns the character actually used together with its glyph.
    fn resolve_glyph(&self, character: char) -> Option<(char, &Glyph)> {
        if let Some(glyph) = self.glyph(character) {
            return Some((character, glyph));
        }
        let fallback = self.default_character();
        self.glyph(fallback).map(|glyph| (fallback, glyph))
    }
}

/// In-memory glyph table
#[derive(Debug, Clone)]
pub struct Font {
    name: String,
    font_height: f32,
    outline_size: f32,
    outline_color: Color,
    default_character: char,
    glyphs: HashMap<char, Glyph>,
    kerning_pairs: HashMap<(char, char), f32>,
}

impl Font {
    /// Create an empty font with lines `font_height` pixels tall
    pub fn new(name: impl Into<String>, font_height: f32) -> Self {
        Self {
            name: name.into(),
            font_height,
            outline_size: 0.0,
            outline_color: Color::TRANSPARENT,
            default_character: ' ',
            glyphs: HashMap::new(),
            kerning_pairs: HashMap::new(),
        }
    }

    /// Build a font from a texture laid out as a grid of equal cells
    ///
    /// Cells are assigned to `characters` left to right, top to bottom.
    pub fn from_grid(name: impl Into<String>, texture: &Texture, cell: Vec2, characters: &str) -> Self {
        let columns = if cell.x > 0.0 {
            ((texture.size().x / cell.x) as usize).max(1)
        } else {
            1
        };
        let glyphs = characters.chars().enumerate().map(|(i, character)| {
            let pixels = RectF::new((i % columns) as f32 * cell.x, (i / columns) as f32 * cell.y, cell.x, cell.y);
            Glyph::new(character, cell).with_texture(texture.clone(), texture.to_texel_space(pixels))
        });
        Self::new(name, cell.y).with_glyphs(glyphs)
    }

    /// Add or replace a glyph
    pub fn with_glyph(mut self, glyph: Glyph) -> Self {
        self.glyphs.insert(glyph.character, glyph);
        self
    }

    /// Add or replace several glyphs
    pub fn with_glyphs(mut self, glyphs: impl IntoIterator<Item = Glyph>) -> Self {
        self.glyphs.extend(glyphs.into_iter().map(|g| (g.character, g)));
        self
    }

    /// Add a kerning pair
    pub fn with_kerning_pair(mut self, first: char, second: char, amount: f32) -> Self {
        self.kerning_pairs.insert((first, second), amount);
        self
    }

    /// Set the substitute for missing characters
    pub const fn with_default_character(mut self, character: char) -> Self {
        self.default_character = character;
        self
    }

    /// Set the outline thickness and colour
    pub const fn with_outline(mut self, size: f32, color: Color) -> Self {
        self.outline_size = size;
        self.outline_color = color;
        self
    }

    /// Font name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of glyphs
    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Outline colour
    pub const fn outline_color(&self) -> Color {
        self.outline_color
    }
}

impl GlyphSource for Font {
    fn glyph(&self, character: char) -> Option<&Glyph> {
        self.glyphs.get(&character)
    }

    fn default_character(&self) -> char {
        self.default_character
    }

    fn kerning(&self, first: char, second: char) -> Option<f32> {
        self.kerning_pairs.get(&(first, second)).copied()
    }

    fn has_kerning(&self) -> bool {
        !self.kerning_pairs.is_empty()
    }

    fn font_height(&self) -> f32 {
        self.font_height
    }

    fn outline_size(&self) -> f32 {
        if self.outline_size > 0.0 && self.outline_color.a > 0.0 {
            self.outline_size
        } else {
            0.0
        }
    }
}
