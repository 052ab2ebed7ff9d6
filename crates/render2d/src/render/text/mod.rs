//! # Text Rendering
//!
//! Glyph-based text with inline colour markup and reflow.
//!
//! ## Architecture
//!
//! - **font**: the [`GlyphSource`] seam and the [`Font`] glyph table
//! - **markup**: `[c=RRGGBBAA]...[/c]` colour span parsing
//! - **format**: line-ending normalisation, tab expansion, word wrap and
//!   measurement
//! - **text**: the [`Text`] primitive and its reflow state machine

pub mod font;
pub mod format;
pub mod markup;
#[allow(clippy::module_inception)]
pub mod text;

pub use font::{Font, Glyph, GlyphSource};
pub use format::{format_text, FormattedText, TextFormat};
pub use markup::{parse_color_codes, ColorCodes, ColorSpan};
pub use text::{ReflowState, Text, TextAlignment};
