//! # Text Reflow
//!
//! Turns a string into measured lines for a [`GlyphSource`].
//!
//! ## Pipeline
//!
//! 1. Line endings (`\n\r`, `\r\n`, `\r`) become `\n` and tabs expand to
//!    spaces.
//! 2. With a wrap width, a greedy pass breaks each overflowing line at the
//!    nearest preceding space, or inserts a break before the overflowing
//!    character when the line has none.
//! 3. The result is split on `\n` and measured.
//!
//! ## Metrics
//!
//! A space advances its width minus one pixel. Other characters advance by
//! the glyph advance plus outline plus any kerning pair when kerning is on,
//! or by the glyph width plus outline when it is off. A line's width also
//! includes the pen offset of its first visible glyph.

use super::font::GlyphSource;
use crate::foundation::math::Vec2;

/// Reflow settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextFormat {
    /// Spaces substituted for a tab
    pub tab_spaces: usize,
    /// Whether advances use glyph advance and kerning pairs
    pub use_kerning: bool,
    /// Multiplier applied to the line height
    pub line_spacing: f32,
    /// Width at which lines wrap; `None` disables wrapping
    pub wrap_width: Option<f32>,
}

impl Default for TextFormat {
    fn default() -> Self {
        Self {
            tab_spaces: 3,
            use_kerning: true,
            line_spacing: 1.0,
            wrap_width: None,
        }
    }
}

impl TextFormat {
    /// Set the tab width (at least one space)
    pub fn with_tab_spaces(mut self, spaces: usize) -> Self {
        self.tab_spaces = spaces.max(1);
        self
    }

    /// Enable or disable kerning
    pub const fn with_kerning(mut self, enabled: bool) -> Self {
        self.use_kerning = enabled;
        self
    }

    /// Set the line spacing multiplier
    pub const fn with_line_spacing(mut self, spacing: f32) -> Self {
        self.line_spacing = spacing;
        self
    }

    /// Wrap at `width`; a width of zero or less disables wrapping
    pub fn with_wrap_width(mut self, width: Option<f32>) -> Self {
        self.wrap_width = width.filter(|w| *w > 0.0);
        self
    }
}

/// Lines produced by a reflow pass and their combined size
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormattedText {
    /// Lines without terminators
    pub lines: Vec<String>,
    /// Width of the widest line and height of all lines
    pub size: Vec2,
}

/// Unify line endings and expand tabs
pub fn normalize(text: &str, tab_spaces: usize) -> String {
    let tab = " ".repeat(tab_spaces.max(1));
    text.replace("\n\r", "\n")
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\t', &tab)
}

fn advance(font: &dyn GlyphSource, character: char, next: Option<char>, outline: f32, use_kerning: bool) -> f32 {
    let Some((character, glyph)) = font.resolve_glyph(character) else {
        return 0.0;
    };
    if character == ' ' {
        return glyph.width() - 1.0;
    }
    if !use_kerning {
        return glyph.width() + outline;
    }
    let kerning = next
        .filter(|_| font.has_kerning())
        .and_then(|next| font.kerning(character, next))
        .unwrap_or(0.0);
    glyph.advance + outline + kerning
}

/// Break `text` (already normalized) so no line exceeds `width`
///
/// Wrapping stops early, leaving the rest of the text unbroken, if a single
/// glyph is wider than `width`.
pub fn word_wrap(text: &str, font: &dyn GlyphSource, width: f32, use_kerning: bool) -> String {
    let mut chars: Vec<char> = text.chars().collect();
    if width <= 0.0 {
        return text.to_string();
    }

    let outline = font.outline_size();
    let mut pen = 0.0;
    let mut i = 0;
    while i < chars.len() {
        let character = chars[i];
        if character == '\n' {
            pen = 0.0;
            i += 1;
            continue;
        }

        let Some((_, glyph)) = font.resolve_glyph(character) else {
            i += 1;
            continue;
        };
        if glyph.width() > width {
            log::debug!("Glyph for {character:?} is wider than the wrap width {width}, not wrapping further");
            break;
        }

        pen += advance(font, character, chars.get(i + 1).copied(), outline, use_kerning);

        if pen > width {
            let mut break_at = None;
            for j in (0..=i).rev() {
                match chars[j] {
                    '\n' | '\r' => break,
                    ' ' | '\t' => {
                        break_at = Some(j);
                        break;
                    }
                    _ => {}
                }
            }

            match break_at {
                Some(j) => {
                    chars[j] = '\n';
                    i = j;
                }
                None if i > 0 => chars.insert(i, '\n'),
                None => {}
            }
            pen = 0.0;
        }
        i += 1;
    }

    chars.into_iter().collect()
}

/// Width of one line in pixels
pub fn line_width(line: &str, font: &dyn GlyphSource, outline: f32, use_kerning: bool) -> f32 {
    let chars: Vec<char> = line.chars().collect();
    let mut width = 0.0;
    let mut first = true;

    for (i, &character) in chars.iter().enumerate() {
        let Some((resolved, glyph)) = font.resolve_glyph(character) else {
            continue;
        };
        match resolved {
            ' ' => {
                width += glyph.width() - 1.0;
                continue;
            }
            '\r' | '\n' => continue,
            _ => {}
        }
        if first {
            width += glyph.offset.x;
            first = false;
        }
        width += advance(font, character, chars.get(i + 1).copied(), outline, use_kerning);
    }
    width
}

/// Height of `line_count` lines
pub fn text_height(line_count: usize, font: &dyn GlyphSource, line_spacing: f32) -> f32 {
    if line_count == 0 {
        return 0.0;
    }
    let line_height = font.font_height() + font.outline_size() * 2.0;
    if (line_spacing - 1.0).abs() > f32::EPSILON {
        (line_count - 1) as f32 * line_height * line_spacing + line_height
    } else {
        line_count as f32 * line_height
    }
}

/// Reflow and measure `text`
pub fn format_text(text: &str, font: &dyn GlyphSource, format: &TextFormat) -> FormattedText {
    if text.is_empty() {
        return FormattedText {
            lines: vec![String::new()],
            size: Vec2::zeros(),
        };
    }

    let normalized = normalize(text, format.tab_spaces);
    let formatted = match format.wrap_width {
        Some(width) => word_wrap(&normalized, font, width, format.use_kerning),
        None => normalized,
    };
    let lines: Vec<String> = formatted.split('\n').map(str::to_string).collect();

    let outline = font.outline_size();
    let width = lines
        .iter()
        .map(|line| line_width(line, font, outline, format.use_kerning))
        .fold(0.0, f32::max);
    let height = text_height(lines.len(), font, format.line_spacing);

    FormattedText {
        lines,
        size: Vec2::new(width, height),
    }
}
