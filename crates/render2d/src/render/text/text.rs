//! # Text
//!
//! String drawn with a [`GlyphSource`], one quad per visible glyph.
//!
//! ## Reflow state machine
//!
//! Changes are staged so each pass runs only when something it depends on
//! changed:
//!
//! - **NeedsFormat**: text, font, wrap rectangle, kerning, tabs or spacing
//!   changed; lines are re-flowed and re-measured
//! - **NeedsLayout**: alignment or shadow changed; glyph quads are rebuilt
//!   in local space
//! - vertex and texture passes run from the renderable base as for every
//!   other primitive
//! - colour and shadow passes are independent flags
//!
//! ## Shadows
//!
//! With shadows on each glyph owns two quads. Every shadow quad is laid out
//! before the first glyph quad so shadows never cover earlier glyphs.

use std::rc::Rc;

use super::font::GlyphSource;
use super::format::{format_text, line_width, TextFormat};
use super::markup::{parse_color_codes, ColorCodes, ColorSpan};
use crate::foundation::math::{RectF, Vec2};
use crate::render::color::Color;
use crate::render::primitives::RectangleCorner;
use crate::render::queue::{Batch, BatchState, RenderQueue};
use crate::render::renderable::{impl_transform_capabilities, ContextId, Drawable, HasTransform, RenderableBase};
use crate::render::texture::{Texture, TextureId};
use crate::render::transform::{Transform2D, QUAD_INDICES};
use crate::render::vertex::PrimitiveTopology;
use crate::render::RenderResult;

/// Placement of text lines inside the text rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextAlignment {
    /// Top, left
    #[default]
    UpperLeft,
    /// Top, centred horizontally
    UpperCenter,
    /// Top, right
    UpperRight,
    /// Centred vertically, left
    CenterLeft,
    /// Centred on both axes
    Center,
    /// Centred vertically, right
    CenterRight,
    /// Bottom, left
    LowerLeft,
    /// Bottom, centred horizontally
    LowerCenter,
    /// Bottom, right
    LowerRight,
}

impl TextAlignment {
    /// Offset of a line of `line_width` inside `region`, for text
    /// `text_height` tall, truncated to whole pixels
    pub fn offset(self, region: Vec2, line_width: f32, text_height: f32) -> Vec2 {
        let x = match self {
            Self::UpperLeft | Self::CenterLeft | Self::LowerLeft => 0.0,
            Self::UpperCenter | Self::Center | Self::LowerCenter => (region.x / 2.0 - line_width / 2.0).trunc(),
            Self::UpperRight | Self::CenterRight | Self::LowerRight => (region.x - line_width).trunc(),
        };
        let y = match self {
            Self::UpperLeft | Self::UpperCenter | Self::UpperRight => 0.0,
            Self::CenterLeft | Self::Center | Self::CenterRight => (region.y / 2.0 - text_height / 2.0).trunc(),
            Self::LowerLeft | Self::LowerCenter | Self::LowerRight => (region.y - text_height).trunc(),
        };
        Vec2::new(x, y)
    }
}

/// Pending reflow work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReflowState {
    /// Lines and glyph quads are current
    Clean,
    /// Glyph quads must be rebuilt from the current lines
    NeedsLayout,
    /// Lines must be re-flowed, then quads rebuilt
    NeedsFormat,
}

#[derive(Debug, Clone)]
struct GlyphQuad {
    corners: [Vec2; 4],
    texture: Option<Texture>,
    region: RectF,
    // ordinal among the visible characters of the decoded text
    visible_index: usize,
    shadow: bool,
}

/// Text primitive
pub struct Text {
    base: RenderableBase,
    transform: Transform2D,
    font: Option<Rc<dyn GlyphSource>>,
    raw_text: String,
    codes: ColorCodes,
    allow_color_codes: bool,
    // decoded text index of each visible character
    visible_chars: Vec<usize>,
    lines: Vec<String>,
    size: Vec2,
    quads: Vec<GlyphQuad>,
    indices: Vec<u32>,
    corner_colors: [Color; 4],
    shadow_enabled: bool,
    shadow_offset: Vec2,
    shadow_opacity: [f32; 4],
    text_rectangle: Option<RectF>,
    word_wrap: bool,
    alignment: TextAlignment,
    line_spacing: f32,
    tab_spaces: usize,
    use_kerning: bool,
    reflow: ReflowState,
    needs_color: bool,
    needs_shadow: bool,
}

impl Text {
    /// Create an empty text drawn with `font`
    pub fn new(name: impl Into<String>, context: ContextId, font: Option<Rc<dyn GlyphSource>>) -> Self {
        Self {
            base: RenderableBase::new(name, context, 0),
            transform: Transform2D::default(),
            font,
            raw_text: String::new(),
            codes: ColorCodes::default(),
            allow_color_codes: false,
            visible_chars: Vec::new(),
            lines: Vec::new(),
            size: Vec2::zeros(),
            quads: Vec::new(),
            indices: Vec::new(),
            corner_colors: [Color::WHITE; 4],
            shadow_enabled: false,
            shadow_offset: Vec2::new(1.0, 1.0),
            shadow_opacity: [0.25; 4],
            text_rectangle: None,
            word_wrap: false,
            alignment: TextAlignment::UpperLeft,
            line_spacing: 1.0,
            tab_spaces: 3,
            use_kerning: true,
            reflow: ReflowState::NeedsFormat,
            needs_color: true,
            needs_shadow: false,
        }
    }

    /// Set the initial string
    pub fn with_text(mut self, text: &str) -> Self {
        self.set_text(text);
        self
    }

    /// Displayed text, without colour tags
    pub fn text(&self) -> &str {
        &self.codes.text
    }

    /// Replace the string
    pub fn set_text(&mut self, text: &str) {
        if text == self.raw_text {
            return;
        }
        self.raw_text = text.to_string();
        self.decode();
    }

    fn decode(&mut self) {
        self.codes = if self.allow_color_codes {
            parse_color_codes(&self.raw_text)
        } else {
            ColorCodes {
                text: self.raw_text.clone(),
                spans: Vec::new(),
            }
        };
        self.visible_chars = self
            .codes
            .text
            .chars()
            .enumerate()
            .filter(|(_, c)| !matches!(c, '\n' | '\t' | ' ' | '\r'))
            .map(|(i, _)| i)
            .collect();
        self.reflow = ReflowState::NeedsFormat;
        self.needs_color = true;
    }

    /// Glyph source
    pub fn font(&self) -> Option<&Rc<dyn GlyphSource>> {
        self.font.as_ref()
    }

    /// Replace the glyph source
    pub fn set_font(&mut self, font: Option<Rc<dyn GlyphSource>>) {
        self.font = font;
        self.reflow = ReflowState::NeedsFormat;
    }

    /// Whether `[c=RRGGBBAA]` tags are interpreted
    pub const fn allow_color_codes(&self) -> bool {
        self.allow_color_codes
    }

    /// Enable or disable colour tags, re-reading the current string
    pub fn set_allow_color_codes(&mut self, allow: bool) {
        if allow != self.allow_color_codes {
            self.allow_color_codes = allow;
            self.decode();
        }
    }

    /// Colour spans found in the current string
    pub fn color_spans(&self) -> &[ColorSpan] {
        &self.codes.spans
    }

    /// Colour of the upper-left corner of every glyph
    pub const fn color(&self) -> Color {
        self.corner_colors[0]
    }

    /// Set the colour of every glyph corner
    pub fn set_color(&mut self, color: Color) {
        self.corner_colors = [color; 4];
        self.needs_color = true;
    }

    /// Colour of one corner of every glyph
    pub const fn corner_color(&self, corner: RectangleCorner) -> Color {
        self.corner_colors[corner.index()]
    }

    /// Set the colour of one corner of every glyph
    pub fn set_corner_color(&mut self, corner: RectangleCorner, color: Color) {
        if self.corner_colors[corner.index()] != color {
            self.corner_colors[corner.index()] = color;
            self.needs_color = true;
        }
    }

    /// Alpha of the upper-left glyph corner
    pub const fn opacity(&self) -> f32 {
        self.corner_colors[0].a
    }

    /// Set the alpha of every glyph corner
    pub fn set_opacity(&mut self, opacity: f32) {
        for color in &mut self.corner_colors {
            color.a = opacity;
        }
        self.needs_color = true;
    }

    /// Whether a drop shadow is drawn
    pub const fn shadow_enabled(&self) -> bool {
        self.shadow_enabled
    }

    /// Turn the drop shadow on or off
    pub fn set_shadow_enabled(&mut self, enabled: bool) {
        if enabled != self.shadow_enabled {
            self.shadow_enabled = enabled;
            self.reflow = self.reflow.max_with(ReflowState::NeedsLayout);
        }
    }

    /// Shadow offset from each glyph
    pub const fn shadow_offset(&self) -> Vec2 {
        self.shadow_offset
    }

    /// Set the shadow offset
    pub fn set_shadow_offset(&mut self, offset: Vec2) {
        if offset != self.shadow_offset {
            self.shadow_offset = offset;
            self.reflow = self.reflow.max_with(ReflowState::NeedsLayout);
        }
    }

    /// Shadow opacity of the upper-left corner
    pub const fn shadow_opacity(&self) -> f32 {
        self.shadow_opacity[0]
    }

    /// Set the shadow opacity of every corner
    pub fn set_shadow_opacity(&mut self, opacity: f32) {
        self.shadow_opacity = [opacity; 4];
        self.needs_shadow = self.shadow_enabled;
    }

    /// Region used for wrapping and alignment
    pub const fn text_rectangle(&self) -> Option<RectF> {
        self.text_rectangle
    }

    /// Set or clear the wrapping and alignment region
    pub fn set_text_rectangle(&mut self, rectangle: Option<RectF>) {
        if rectangle != self.text_rectangle {
            self.text_rectangle = rectangle;
            self.reflow = ReflowState::NeedsFormat;
        }
    }

    /// Whether lines wrap at the text rectangle width
    pub const fn word_wrap(&self) -> bool {
        self.word_wrap
    }

    /// Enable or disable wrapping
    pub fn set_word_wrap(&mut self, wrap: bool) {
        if wrap != self.word_wrap {
            self.word_wrap = wrap;
            self.reflow = ReflowState::NeedsFormat;
        }
    }

    /// Alignment inside the text rectangle
    pub const fn alignment(&self) -> TextAlignment {
        self.alignment
    }

    /// Set the alignment; it only applies while a text rectangle is set
    pub fn set_alignment(&mut self, alignment: TextAlignment) {
        if alignment != self.alignment {
            self.alignment = alignment;
            self.reflow = self.reflow.max_with(ReflowState::NeedsLayout);
        }
    }

    /// Line height multiplier
    pub const fn line_spacing(&self) -> f32 {
        self.line_spacing
    }

    /// Set the line height multiplier
    pub fn set_line_spacing(&mut self, spacing: f32) {
        if spacing != self.line_spacing {
            self.line_spacing = spacing;
            self.reflow = ReflowState::NeedsFormat;
        }
    }

    /// Spaces substituted for a tab
    pub const fn tab_spaces(&self) -> usize {
        self.tab_spaces
    }

    /// Set the tab width (at least one space)
    pub fn set_tab_spaces(&mut self, spaces: usize) {
        let spaces = spaces.max(1);
        if spaces != self.tab_spaces {
            self.tab_spaces = spaces;
            self.reflow = ReflowState::NeedsFormat;
        }
    }

    /// Whether advances use kerning pairs
    pub const fn use_kerning(&self) -> bool {
        self.use_kerning
    }

    /// Enable or disable kerning
    pub fn set_use_kerning(&mut self, enabled: bool) {
        if enabled != self.use_kerning {
            self.use_kerning = enabled;
            self.reflow = ReflowState::NeedsFormat;
        }
    }

    /// Pending reflow work
    pub const fn reflow_state(&self) -> ReflowState {
        self.reflow
    }

    /// Force every pass on the next draw
    pub fn refresh(&mut self) {
        self.reflow = ReflowState::NeedsFormat;
        self.needs_color = true;
        self.needs_shadow = self.shadow_enabled;
    }

    fn text_format(&self) -> TextFormat {
        let wrap = if self.word_wrap {
            self.text_rectangle.map(|r| r.width)
        } else {
            None
        };
        TextFormat::default()
            .with_tab_spaces(self.tab_spaces)
            .with_kerning(self.use_kerning)
            .with_line_spacing(self.line_spacing)
            .with_wrap_width(wrap)
    }

    /// Size of the current text in pixels
    pub fn size(&mut self) -> Vec2 {
        self.format();
        self.size
    }

    /// Lines of the current text after reflow
    pub fn lines(&mut self) -> &[String] {
        self.format();
        &self.lines
    }

    /// Measure `text` with this primitive's font and settings, without
    /// changing it
    ///
    /// Wrapping is skipped when `word_wrap` is off or `wrap_width` is not
    /// positive.
    pub fn measure_text(&self, text: &str, word_wrap: bool, wrap_width: f32) -> Vec2 {
        let Some(font) = self.font.as_deref() else {
            return Vec2::zeros();
        };
        if text.is_empty() {
            return Vec2::zeros();
        }
        let decoded = if self.allow_color_codes {
            parse_color_codes(text).text
        } else {
            text.to_string()
        };
        let format = self.text_format().with_wrap_width(word_wrap.then_some(wrap_width));
        format_text(&decoded, font, &format).size
    }

    fn format(&mut self) {
        if self.reflow != ReflowState::NeedsFormat {
            return;
        }
        match self.font.as_deref() {
            Some(font) => {
                let formatted = format_text(&self.codes.text, font, &self.text_format());
                self.lines = formatted.lines;
                self.size = formatted.size;
            }
            None => {
                self.lines.clear();
                self.size = Vec2::zeros();
            }
        }
        self.reflow = ReflowState::NeedsLayout;
    }

    fn layout(&mut self) {
        self.quads.clear();
        if let Some(font) = self.font.clone().filter(|_| !self.codes.text.is_empty()) {
            self.layout_glyphs(font.as_ref());
        }

        let quad_count = self.quads.len() as u32;
        self.indices = (0..quad_count)
            .flat_map(|q| QUAD_INDICES.map(|i| i + q * 4))
            .collect();
        self.base.resize_vertices(self.quads.len() * 4);
        self.base.refresh();
        self.needs_color = true;
        self.needs_shadow = self.shadow_enabled;
        self.reflow = ReflowState::Clean;
    }

    fn layout_glyphs(&mut self, font: &dyn GlyphSource) {
        let outline = font.outline_size();
        let aligned = self.text_rectangle.filter(|_| self.alignment != TextAlignment::UpperLeft);
        let mut glyphs = Vec::new();
        let mut shadows = Vec::new();
        let mut pen = Vec2::zeros();
        let mut visible = 0;

        for line in &self.lines {
            let chars: Vec<char> = line.chars().collect();
            let align = aligned.map_or_else(Vec2::zeros, |rect| {
                let width = line_width(line, font, outline, self.use_kerning);
                self.alignment.offset(rect.size(), width, self.size.y)
            });

            for (i, &character) in chars.iter().enumerate() {
                let Some((used, glyph)) = font.resolve_glyph(character) else {
                    log::debug!("No glyph or default glyph for {character:?}");
                    if character != ' ' {
                        visible += 1;
                    }
                    continue;
                };
                if used == ' ' {
                    pen.x += glyph.width() - 1.0;
                    if character != ' ' {
                        visible += 1;
                    }
                    continue;
                }

                let origin = pen + glyph.offset + align;
                let corners = [
                    origin,
                    origin + Vec2::new(glyph.size.x, 0.0),
                    origin + Vec2::new(0.0, glyph.size.y),
                    origin + glyph.size,
                ];
                let quad = GlyphQuad {
                    corners,
                    texture: glyph.texture.clone(),
                    region: glyph.texture_region,
                    visible_index: visible,
                    shadow: false,
                };
                if self.shadow_enabled {
                    shadows.push(GlyphQuad {
                        corners: corners.map(|c| c + self.shadow_offset),
                        shadow: true,
                        ..quad.clone()
                    });
                }
                glyphs.push(quad);
                visible += 1;

                pen.x += outline;
                if self.use_kerning {
                    pen.x += glyph.advance;
                    if font.has_kerning() {
                        if let Some(&next) = chars.get(i + 1) {
                            pen.x += font.kerning(used, next).unwrap_or(0.0);
                        }
                    }
                } else {
                    pen.x += glyph.width();
                }
            }

            pen.x = 0.0;
            pen.y += (font.font_height() + outline) * self.line_spacing;
        }

        self.quads = shadows;
        self.quads.append(&mut glyphs);
    }

    fn update_colors(&mut self) {
        let use_codes = self.allow_color_codes && !self.codes.spans.is_empty();
        let corner_colors = self.corner_colors;
        let mut colors = Vec::with_capacity(self.quads.len());
        for quad in self.quads.iter().filter(|q| !q.shadow) {
            let coded = use_codes
                .then(|| self.visible_chars.get(quad.visible_index))
                .flatten()
                .and_then(|&index| self.codes.color_at(index));
            colors.push(coded.map_or(corner_colors, |color| [color; 4]));
        }

        let shadow_quads = self.quads.iter().filter(|q| q.shadow).count();
        let vertices = &mut self.base.vertices_mut()[shadow_quads * 4..];
        for (quad, corners) in vertices.chunks_exact_mut(4).zip(colors) {
            for (vertex, color) in quad.iter_mut().zip(corners) {
                vertex.color = color.into();
            }
        }
    }

    fn update_shadow(&mut self) {
        let opacity = self.shadow_opacity;
        let shadow_quads = self.quads.iter().filter(|q| q.shadow).count();
        for quad in self.base.vertices_mut()[..shadow_quads * 4].chunks_exact_mut(4) {
            for (vertex, alpha) in quad.iter_mut().zip(opacity) {
                vertex.color = Color::BLACK.with_alpha(alpha).into();
            }
        }
    }
}

impl ReflowState {
    fn max_with(self, other: Self) -> Self {
        match (self, other) {
            (Self::NeedsFormat, _) | (_, Self::NeedsFormat) => Self::NeedsFormat,
            (Self::NeedsLayout, _) | (_, Self::NeedsLayout) => Self::NeedsLayout,
            _ => Self::Clean,
        }
    }
}

impl Drawable for Text {
    fn base(&self) -> &RenderableBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RenderableBase {
        &mut self.base
    }

    fn update_vertices(&mut self) {
        let rotation = self.transform.rotation();
        let transform = self.transform;
        for (quad, vertices) in self.quads.iter().zip(self.base.vertices_mut().chunks_exact_mut(4)) {
            for (vertex, corner) in vertices.iter_mut().zip(quad.corners) {
                vertex.set_xy(transform.apply(corner, &rotation));
                vertex.position[2] = transform.depth;
            }
        }
    }

    fn update_texture_coordinates(&mut self) {
        for (quad, vertices) in self.quads.iter().zip(self.base.vertices_mut().chunks_exact_mut(4)) {
            let r = quad.region;
            let uvs = [
                [r.left(), r.top()],
                [r.right(), r.top()],
                [r.left(), r.bottom()],
                [r.right(), r.bottom()],
            ];
            for (vertex, uv) in vertices.iter_mut().zip(uvs) {
                vertex.uv = uv;
            }
        }
    }

    fn resolve(&mut self) {
        self.format();
        if self.reflow == ReflowState::NeedsLayout {
            self.layout();
        }

        let state = self.base.update_state();
        if state.needs_vertices() {
            self.update_vertices();
        }
        if state.needs_texture() {
            self.update_texture_coordinates();
        }
        if self.needs_color {
            self.update_colors();
            self.needs_color = false;
        }
        if self.needs_shadow {
            self.update_shadow();
            self.needs_shadow = false;
        }
        self.base.finish_update(state.needs_vertices());
    }

    fn draw(&mut self, queue: &mut RenderQueue) -> RenderResult<()> {
        self.resolve();

        let render = *self.base.render_state();
        let vertices = self.base.vertices();
        let texture_of = |quad: &GlyphQuad| quad.texture.as_ref().map(Texture::id);
        let mut start = 0;
        while start < self.quads.len() {
            let texture: Option<TextureId> = texture_of(&self.quads[start]);
            let run = self.quads[start..]
                .iter()
                .take_while(|quad| texture_of(*quad) == texture)
                .count();
            let end = start + run;
            queue.submit(Batch {
                context: self.base.context(),
                state: BatchState {
                    render,
                    texture,
                    topology: PrimitiveTopology::TriangleList,
                    indexed: true,
                },
                vertices: &vertices[start * 4..end * 4],
                indices: Some(&self.indices[..run * 6]),
            })?;
            start = end;
        }
        Ok(())
    }
}

impl HasTransform for Text {
    fn transform(&self) -> &Transform2D {
        &self.transform
    }

    fn transform_mut(&mut self) -> &mut Transform2D {
        &mut self.transform
    }
}

impl_transform_capabilities!(Text);

impl std::fmt::Debug for Text {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Text")
            .field("base", &self.base)
            .field("text", &self.codes.text)
            .field("has_font", &self.font.is_some())
            .field("reflow", &self.reflow)
            .field("quads", &self.quads.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::device::RecordingDevice;
    use crate::render::renderable::Positionable;
    use crate::render::text::font::{Font, Glyph};
    use crate::render::texture::TextureRegistry;

    fn font() -> Rc<dyn GlyphSource> {
        let registry = TextureRegistry::new();
        let texture = registry.register("font", 40, 12).unwrap();
        Rc::new(Font::from_grid("grid", &texture, Vec2::new(10.0, 12.0), "abc "))
    }

    fn text(value: &str) -> Text {
        Text::new("text", ContextId::next(), Some(font())).with_text(value)
    }

    #[test]
    fn test_color_codes_color_only_their_span() {
        let mut text = Text::new("text", ContextId::next(), Some(font()));
        text.set_allow_color_codes(true);
        text.set_text("a [c=FF0000FF]b[/c] c");
        assert_eq!(text.text(), "a b c");

        text.resolve();
        let vertices = text.base().vertices();
        assert_eq!(vertices.len(), 12);
        assert!(vertices[..4].iter().all(|v| v.color() == Color::WHITE));
        assert!(vertices[4..8].iter().all(|v| v.color() == Color::RED));
        assert!(vertices[8..].iter().all(|v| v.color() == Color::WHITE));
        assert_eq!(vertices[4].xy(), Vec2::new(19.0, 0.0));
    }

    #[test]
    fn test_malformed_code_leaves_text() {
        let mut text = text("");
        text.set_allow_color_codes(true);
        text.set_text("[c=ZZ]x[/c]");
        assert_eq!(text.text(), "[c=ZZ]x[/c]");
        assert!(text.color_spans().is_empty());
        text.resolve();
    }

    #[test]
    fn test_shadow_quads_come_first() {
        let mut text = text("a");
        text.set_shadow_enabled(true);
        text.resolve();

        let vertices = text.base().vertices();
        assert_eq!(vertices.len(), 8);
        assert_eq!(vertices[0].xy(), Vec2::new(1.0, 1.0));
        assert_eq!(vertices[0].color(), Color::new(0.0, 0.0, 0.0, 0.25));
        assert_eq!(vertices[4].xy(), Vec2::new(0.0, 0.0));
        assert_eq!(vertices[4].color(), Color::WHITE);
    }

    #[test]
    fn test_center_alignment_in_rectangle() {
        let mut text = text("ab");
        text.set_text_rectangle(Some(RectF::new(0.0, 0.0, 100.0, 50.0)));
        text.set_alignment(TextAlignment::Center);
        text.resolve();
        assert_eq!(text.base().vertices()[0].xy(), Vec2::new(40.0, 19.0));
    }

    #[test]
    fn test_lines_advance_by_font_height() {
        let mut text = text("a\nb");
        text.set_position(Vec2::new(5.0, 5.0));
        text.resolve();
        assert_eq!(text.base().vertices()[4].xy(), Vec2::new(5.0, 17.0));
        assert_eq!(text.size(), Vec2::new(10.0, 24.0));
    }

    #[test]
    fn test_measure_does_not_change_text() {
        let mut text = text("c");
        let measured = text.measure_text("abcc", true, 25.0);
        assert_eq!(measured, Vec2::new(20.0, 24.0));
        assert_eq!(text.text(), "c");
        assert_eq!(text.size(), Vec2::new(10.0, 12.0));
        assert_eq!(text.measure_text("", true, 25.0), Vec2::zeros());
    }

    #[test]
    fn test_texture_runs_submit_separately() {
        let registry = TextureRegistry::new();
        let first = registry.register("first", 10, 12).unwrap();
        let second = registry.register("second", 10, 12).unwrap();
        let font = Font::new("split", 12.0)
            .with_glyph(Glyph::new('a', Vec2::new(10.0, 12.0)).with_texture(first, RectF::unit()))
            .with_glyph(Glyph::new('b', Vec2::new(10.0, 12.0)).with_texture(second, RectF::unit()));

        let recorder = RecordingDevice::shared();
        let context = ContextId::next();
        let mut queue = RenderQueue::new(recorder.clone(), context, 256);
        let mut text = Text::new("text", context, Some(Rc::new(font))).with_text("aab");
        text.draw(&mut queue).unwrap();
        queue.flush().unwrap();

        let device = recorder.borrow();
        assert_eq!(device.draws().len(), 2);
        assert_eq!(device.draws()[0].vertices.len(), 8);
        assert_eq!(device.draws()[0].indices.as_deref(), Some(&[0, 1, 2, 2, 1, 3, 4, 5, 6, 6, 5, 7][..]));
        assert_eq!(device.draws()[1].vertices.len(), 4);
    }

    #[test]
    fn test_repeated_draw_reflows_once() {
        let recorder = RecordingDevice::shared();
        let context = ContextId::next();
        let mut queue = RenderQueue::new(recorder, context, 256);
        let mut text = Text::new("text", context, Some(font())).with_text("abc");
        text.draw(&mut queue).unwrap();
        assert_eq!(text.reflow_state(), ReflowState::Clean);
        text.draw(&mut queue).unwrap();
        assert_eq!(text.base().vertex_revision(), 1);
    }

    #[test]
    fn test_no_font_draws_nothing() {
        let recorder = RecordingDevice::shared();
        let context = ContextId::next();
        let mut queue = RenderQueue::new(recorder, context, 256);
        let mut text = Text::new("text", context, None).with_text("abc");
        text.draw(&mut queue).unwrap();
        assert_eq!(queue.pending_vertices(), 0);
        assert_eq!(text.size(), Vec2::zeros());
    }
}
