//! # Render Queue
//!
//! Deferred draw batching. Primitives submit their resolved geometry; the
//! queue appends it to a shared vertex cache for as long as the pipeline state
//! stays the same and issues a single device draw when it changes.
//!
//! ## Architecture
//!
//! - **BatchState**: everything that must match for two submissions to share
//!   a draw (state blocks, texture, topology, index presence)
//! - **Batch**: one submission borrowed from a primitive
//! - **RenderQueue**: the cache, flush policy and statistics
//!
//! ## Flush policy
//!
//! The cache is drawn when the incoming state differs, when it would exceed
//! its capacity, or on an explicit `flush`/`render`. Submissions are never
//! reordered, so draw order always equals submission order.

use super::camera::{OrthoCamera, ViewProjection};
use super::device::{DrawCall, DrawSource, SharedDevice};
use super::renderable::{ContextId, Drawable, RenderState, RenderableBase};
use super::texture::TextureId;
use super::vertex::{PrimitiveTopology, Vertex};
use super::{RenderError, RenderResult};
use crate::foundation::math::Mat4;

/// Pipeline state shared by every vertex of one draw
#[derive(Debug, Clone, PartialEq)]
pub struct BatchState {
    /// Blend, depth/stencil, sampler, culling and alpha test
    pub render: RenderState,
    /// Bound texture
    pub texture: Option<TextureId>,
    /// Primitive assembly
    pub topology: PrimitiveTopology,
    /// Whether the draw uses an index list
    pub indexed: bool,
}

impl BatchState {
    /// State of `base` drawn with `topology`
    pub fn of(base: &RenderableBase, topology: PrimitiveTopology, indexed: bool) -> Self {
        Self {
            render: *base.render_state(),
            texture: base.texture().map(super::texture::Texture::id),
            topology,
            indexed,
        }
    }
}

/// Geometry submitted by a primitive
#[derive(Debug, Clone)]
pub struct Batch<'a> {
    /// Context that created the primitive
    pub context: ContextId,
    /// Pipeline state
    pub state: BatchState,
    /// Vertices to append
    pub vertices: &'a [Vertex],
    /// Indices relative to `vertices`
    pub indices: Option<&'a [u32]>,
}

impl<'a> Batch<'a> {
    /// Submission of `vertices` using the state of `base`
    pub fn new(
        base: &RenderableBase,
        topology: PrimitiveTopology,
        vertices: &'a [Vertex],
        indices: Option<&'a [u32]>,
    ) -> Self {
        Self {
            context: base.context(),
            state: BatchState::of(base, topology, indices.is_some()),
            vertices,
            indices,
        }
    }
}

/// Statistics for batching efficiency
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Primitive submissions received
    pub renderables: usize,
    /// Device draws issued
    pub flushes: usize,
    /// Flushes forced by a state change
    pub state_changes: usize,
    /// Flushes forced by a full cache
    pub capacity_flushes: usize,
    /// Vertices sent to the device
    pub vertices_drawn: usize,
    /// Frames presented
    pub frames: usize,
}

impl BatchStats {
    /// Average submissions coalesced into one draw
    pub fn avg_renderables_per_flush(&self) -> f32 {
        if self.flushes == 0 {
            0.0
        } else {
            self.renderables as f32 / self.flushes as f32
        }
    }
}

/// Batching queue bound to one rendering context
pub struct RenderQueue {
    device: SharedDevice,
    context: ContextId,
    camera: Box<dyn ViewProjection>,
    capacity: usize,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    current: Option<BatchState>,
    stats: BatchStats,
}

impl RenderQueue {
    /// Create a queue holding at most `capacity` vertices between draws
    pub fn new(device: SharedDevice, context: ContextId, capacity: usize) -> Self {
        Self {
            device,
            context,
            camera: Box::new(OrthoCamera::new(800.0, 600.0)),
            capacity: capacity.max(4),
            vertices: Vec::with_capacity(capacity),
            indices: Vec::new(),
            current: None,
            stats: BatchStats::default(),
        }
    }

    /// Use a different camera for primitives drawn from resident buffers
    pub fn with_camera(mut self, camera: impl ViewProjection + 'static) -> Self {
        self.camera = Box::new(camera);
        self
    }

    /// Replace the camera
    pub fn set_camera(&mut self, camera: impl ViewProjection + 'static) {
        self.camera = Box::new(camera);
    }

    /// Current view-projection
    pub fn view_projection(&self) -> Mat4 {
        self.camera.view_projection()
    }

    /// Context this queue accepts geometry from
    pub const fn context(&self) -> ContextId {
        self.context
    }

    /// Device the queue draws on
    pub const fn device(&self) -> &SharedDevice {
        &self.device
    }

    /// Vertex capacity
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Vertices waiting for the next flush
    pub fn pending_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Statistics since creation or the last reset
    pub const fn stats(&self) -> &BatchStats {
        &self.stats
    }

    /// Reset statistics
    pub fn reset_stats(&mut self) {
        self.stats = BatchStats::default();
    }

    /// Resolve and submit a primitive
    pub fn add_renderable<D: Drawable + ?Sized>(&mut self, renderable: &mut D) -> RenderResult<()> {
        renderable.draw(self)
    }

    fn check_context(&self, context: ContextId) -> RenderResult<()> {
        if context == self.context {
            Ok(())
        } else {
            Err(RenderError::ContextMismatch {
                expected: self.context.value(),
                found: context.value(),
            })
        }
    }

    /// Append geometry, flushing first when the state changes or the cache is full
    pub fn submit(&mut self, batch: Batch<'_>) -> RenderResult<()> {
        self.check_context(batch.context)?;
        if batch.vertices.is_empty() {
            return Ok(());
        }
        self.stats.renderables += 1;

        if self.current.as_ref() != Some(&batch.state) {
            if self.current.is_some() {
                self.stats.state_changes += 1;
            }
            self.flush()?;
            self.current = Some(batch.state.clone());
        } else if batch.state.topology.is_strip() {
            // Strips cannot be concatenated without joining their ends.
            self.flush()?;
        } else if self.vertices.len() + batch.vertices.len() > self.capacity {
            self.stats.capacity_flushes += 1;
            self.flush()?;
        }

        if batch.vertices.len() > self.capacity {
            log::debug!(
                "Submission of {} vertices exceeds cache capacity {}, drawing directly",
                batch.vertices.len(),
                self.capacity
            );
            return self.draw_now(
                &batch.state,
                DrawSource::Immediate {
                    vertices: batch.vertices,
                    indices: batch.indices,
                },
                batch.vertices.len(),
            );
        }

        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(batch.vertices);
        if let Some(indices) = batch.indices {
            self.indices.extend(indices.iter().map(|i| i + base));
        }
        Ok(())
    }

    /// Draw from buffers owned by a primitive, after flushing the cache
    pub fn submit_resident(&mut self, context: ContextId, state: BatchState, source: DrawSource<'_>) -> RenderResult<()> {
        self.check_context(context)?;
        self.flush()?;
        self.current = None;
        self.stats.renderables += 1;
        let vertex_count = match source {
            DrawSource::Resident { vertex_count, .. } => vertex_count,
            DrawSource::Immediate { vertices, .. } => vertices.len(),
        };
        self.draw_now(&state, source, vertex_count)
    }

    fn draw_now(&mut self, state: &BatchState, source: DrawSource<'_>, vertex_count: usize) -> RenderResult<()> {
        self.device.borrow_mut().draw(&DrawCall { state, source })?;
        self.stats.flushes += 1;
        self.stats.vertices_drawn += vertex_count;
        Ok(())
    }

    /// Draw everything accumulated so far and empty the cache
    pub fn flush(&mut self) -> RenderResult<()> {
        if self.vertices.is_empty() {
            return Ok(());
        }
        let Some(state) = self.current.as_ref() else {
            self.vertices.clear();
            self.indices.clear();
            return Ok(());
        };

        log::trace!("Flushing {} vertices ({:?})", self.vertices.len(), state.topology);
        let indices = state.indexed.then_some(self.indices.as_slice());
        let result = self.device.borrow_mut().draw(&DrawCall {
            state,
            source: DrawSource::Immediate {
                vertices: &self.vertices,
                indices,
            },
        });

        self.stats.flushes += 1;
        self.stats.vertices_drawn += self.vertices.len();
        self.vertices.clear();
        self.indices.clear();
        result
    }

    /// Flush and present the frame
    pub fn render(&mut self) -> RenderResult<()> {
        self.flush()?;
        self.device.borrow_mut().present()?;
        self.stats.frames += 1;
        Ok(())
    }
}

impl std::fmt::Debug for RenderQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderQueue")
            .field("context", &self.context)
            .field("capacity", &self.capacity)
            .field("pending", &self.vertices.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
