//! # render2d
//!
//! Retained-immediate 2D rendering with draw batching.
//!
//! ## Features
//!
//! - **Primitives**: sprites, rectangles, ellipses, lines, triangles,
//!   polygons, points and text, each owning its vertices and render state
//! - **Batching**: a queue that merges adjacent submissions with matching
//!   state into a single device draw
//! - **Text**: colour markup, tab expansion, word wrap and measurement
//! - **Persistence**: a chunked binary format for sprites and polygons,
//!   plus a reader for legacy sprite files
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use render2d::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut renderer = Renderer2D::new(RecordingDevice::shared(), RendererConfig::default())?;
//!
//!     let mut ship = renderer.create_sprite("ship", Vec2::new(32.0, 32.0))?;
//!     ship.set_position(Vec2::new(100.0, 80.0));
//!     renderer.add(&mut ship)?;
//!
//!     renderer
//!         .drawing()
//!         .filled_rectangle(RectF::new(0.0, 0.0, 64.0, 16.0), Color::RED)?;
//!
//!     renderer.render()?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod core;
pub mod foundation;
pub mod io;
pub mod render;

/// Common imports for renderer users
pub mod prelude {
    pub use crate::{
        core::config::RendererConfig,
        foundation::math::{RectF, Vec2},
        io::{Loadable, Persist, PersistError},
        render::{
            Anchored, BlendingMode, Collider, Color, CullingMode, Drawable, Drawing, Ellipse, Font, Line, Point,
            Polygon, PolygonType, Positionable, RecordingDevice, Rectangle, RectangleCorner, RenderError, Renderer2D,
            Rotatable, Scalable, SmoothingMode, Sprite, Text, TextureMapped, TextureRegistry, Triangle, TrianglePoint,
        },
    };
}
