//! # Renderer Configuration
//!
//! Settings consumed by [`Renderer2D`](crate::render::Renderer2D) and the
//! primitives it creates. Loadable from TOML or RON through the
//! [`Config`] trait.
//!
//! ```toml
//! vertex_cache_size = 32768
//! default_ellipse_quality = 64
//! tab_spaces = 3
//! use_kerning = true
//! shadow_opacity = 0.25
//! log_level = "info"
//! ```

use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError};

/// Lowest segment count an ellipse accepts
pub const MIN_ELLIPSE_QUALITY: u32 = 4;

/// Highest segment count an ellipse accepts
pub const MAX_ELLIPSE_QUALITY: u32 = 256;

/// Renderer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Number of vertices the batching queue holds before a capacity flush
    pub vertex_cache_size: usize,
    /// Segment count for newly created ellipses
    pub default_ellipse_quality: u32,
    /// Spaces substituted for each tab in text
    pub tab_spaces: usize,
    /// Whether new text applies kerning pairs
    pub use_kerning: bool,
    /// Opacity of text drop shadows
    pub shadow_opacity: f32,
    /// Default log filter when `RUST_LOG` is not set
    pub log_level: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            vertex_cache_size: 32768,
            default_ellipse_quality: 64,
            tab_spaces: 3,
            use_kerning: true,
            shadow_opacity: 0.25,
            log_level: "info".to_string(),
        }
    }
}

impl RendererConfig {
    /// Create configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the batching queue capacity (in vertices)
    pub fn with_vertex_cache_size(mut self, size: usize) -> Self {
        self.vertex_cache_size = size;
        self
    }

    /// Set the default ellipse quality
    pub fn with_default_ellipse_quality(mut self, quality: u32) -> Self {
        self.default_ellipse_quality = quality;
        self
    }

    /// Set the tab expansion width
    pub fn with_tab_spaces(mut self, spaces: usize) -> Self {
        self.tab_spaces = spaces;
        self
    }

    /// Enable or disable kerning for new text
    pub fn with_kerning(mut self, enabled: bool) -> Self {
        self.use_kerning = enabled;
        self
    }

    /// Set the text shadow opacity
    pub fn with_shadow_opacity(mut self, opacity: f32) -> Self {
        self.shadow_opacity = opacity;
        self
    }

    /// Set the default log filter
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.vertex_cache_size < 4 {
            return Err(ConfigError::Invalid(format!(
                "vertex_cache_size must hold at least one quad, got {}",
                self.vertex_cache_size
            )));
        }
        if !(MIN_ELLIPSE_QUALITY..=MAX_ELLIPSE_QUALITY).contains(&self.default_ellipse_quality) {
            return Err(ConfigError::Invalid(format!(
                "default_ellipse_quality must be in {MIN_ELLIPSE_QUALITY}..={MAX_ELLIPSE_QUALITY}, got {}",
                self.default_ellipse_quality
            )));
        }
        if self.tab_spaces == 0 {
            return Err(ConfigError::Invalid("tab_spaces must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&self.shadow_opacity) {
            return Err(ConfigError::Invalid(format!(
                "shadow_opacity must be in 0..=1, got {}",
                self.shadow_opacity
            )));
        }
        Ok(())
    }
}

impl Config for RendererConfig {}
