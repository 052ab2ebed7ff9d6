//! # Rendering System
//!
//! Retained-immediate 2D rendering: primitives own their geometry and state,
//! and a batching queue turns them into as few device draws as possible.
//!
//! ## Architecture
//!
//! - **Vertex / State blocks**: the per-vertex record and the blend,
//!   depth/stencil and sampler blocks shared by every primitive
//! - **Renderable**: the `Drawable` contract, update state machine and
//!   capability traits
//! - **Primitives**: point, line, rectangle, ellipse, triangle, polygon,
//!   sprite and text
//! - **Queue**: deferred batching with state-change flushing
//! - **Device**: the backend seam, with an in-memory recording device
//! - **Renderer2D / Drawing**: the factory bound to a context and the
//!   immediate-mode facade on top of it
//!
//! ## Ordering
//!
//! Draw order always equals submission order. The queue only merges adjacent
//! submissions whose state matches.

pub mod camera;
pub mod collider;
pub mod color;
pub mod device;
pub mod drawing;
pub mod primitives;
pub mod queue;
pub mod renderable;
pub mod renderer;
pub mod states;
pub mod text;
pub mod texture;
pub mod transform;
pub mod vertex;

use thiserror::Error;

pub use camera::{OrthoCamera, ViewProjection};
pub use collider::Collider;
pub use color::Color;
pub use device::{RecordingDevice, RenderDevice, SharedDevice};
pub use drawing::Drawing;
pub use primitives::{
    Ellipse, Line, Point, Polygon, PolygonType, Rectangle, RectangleCorner, Sprite, Triangle, TrianglePoint,
};
pub use queue::{BatchStats, RenderQueue};
pub use renderable::{Anchored, ContextId, Drawable, Positionable, Rotatable, Scalable, TextureMapped};
pub use renderer::Renderer2D;
pub use states::{BlendingMode, CullingMode, SmoothingMode};
pub use text::{Font, Text, TextAlignment};
pub use texture::{Texture, TextureLookup, TextureRegistry};
pub use vertex::{PrimitiveTopology, Vertex};

/// Rendering errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// A required argument was empty or out of range
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Geometry submitted to a queue owned by another context
    #[error("Primitive from context {found} submitted to context {expected}")]
    ContextMismatch {
        /// Context of the queue
        expected: u32,
        /// Context of the primitive
        found: u32,
    },

    /// The device rejected an operation
    #[error("Device error: {0}")]
    Device(String),

    /// A buffer handle did not name a live buffer
    #[error("Unknown buffer handle")]
    UnknownBuffer,

    /// Texture file could not be read
    #[error("Failed to load texture: {0}")]
    TextureLoad(String),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
