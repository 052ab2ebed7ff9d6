//! # Device Abstraction
//!
//! The renderer never talks to a graphics API directly. It allocates buffers
//! and issues draws through the [`RenderDevice`] trait, so any backend (or the
//! in-memory [`RecordingDevice`]) can sit underneath.
//!
//! ## Architecture
//!
//! - **RenderDevice**: buffer allocation, upload, draw submission, present
//! - **GpuBuffer**: scoped buffer ownership, released on drop
//! - **DrawCall**: one draw, either from queue-cached vertices or from a
//!   primitive's resident buffers
//! - **RecordingDevice**: headless device that records every operation

use std::cell::RefCell;
use std::rc::Rc;

use slotmap::SlotMap;

use super::primitives::polygon::PolygonMaterial;
use super::queue::BatchState;
use super::vertex::Vertex;
use super::{RenderError, RenderResult};
use crate::foundation::math::Mat4;

slotmap::new_key_type! {
    /// Handle to a device buffer
    pub struct BufferId;
}

/// What a buffer holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    /// Vertex data
    Vertex,
    /// 32-bit index data
    Index,
}

/// Expected update frequency of a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    /// Written rarely
    Static,
    /// Rewritten often
    Dynamic,
}

/// Where the vertices of a draw come from
#[derive(Debug, Clone, Copy)]
pub enum DrawSource<'a> {
    /// Vertices accumulated by the batching queue
    Immediate {
        /// Vertices to draw
        vertices: &'a [Vertex],
        /// Optional index list
        indices: Option<&'a [u32]>,
    },
    /// Buffers owned by a primitive
    Resident {
        /// Vertex buffer
        vertex_buffer: BufferId,
        /// Vertices to draw
        vertex_count: usize,
        /// Optional index buffer
        index_buffer: Option<BufferId>,
        /// Indices to draw
        index_count: usize,
        /// World-view-projection transform
        transform: Mat4,
        /// Diffuse colour and texture transform
        material: PolygonMaterial,
    },
}

/// One draw submitted to the device
#[derive(Debug, Clone, Copy)]
pub struct DrawCall<'a> {
    /// Pipeline state for the draw
    pub state: &'a BatchState,
    /// Geometry
    pub source: DrawSource<'a>,
}

/// Device services consumed by the renderer
pub trait RenderDevice {
    /// Allocate a buffer of `size_bytes`
    fn create_buffer(&mut self, kind: BufferKind, usage: BufferUsage, size_bytes: usize) -> RenderResult<BufferId>;

    /// Upload bytes at `offset_bytes`
    fn write_buffer(&mut self, id: BufferId, offset_bytes: usize, data: &[u8]) -> RenderResult<()>;

    /// Release a buffer
    fn destroy_buffer(&mut self, id: BufferId);

    /// Issue a draw
    fn draw(&mut self, call: &DrawCall<'_>) -> RenderResult<()>;

    /// Present the frame
    fn present(&mut self) -> RenderResult<()>;
}

/// Device shared between the queue and the primitives that own buffers
pub type SharedDevice = Rc<RefCell<dyn RenderDevice>>;

/// Device buffer released when dropped
pub struct GpuBuffer {
    device: SharedDevice,
    id: BufferId,
    kind: BufferKind,
    usage: BufferUsage,
    size_bytes: usize,
}

impl GpuBuffer {
    /// Allocate a buffer on `device`
    pub fn new(device: &SharedDevice, kind: BufferKind, usage: BufferUsage, size_bytes: usize) -> RenderResult<Self> {
        let id = device.borrow_mut().create_buffer(kind, usage, size_bytes)?;
        Ok(Self {
            device: Rc::clone(device),
            id,
            kind,
            usage,
            size_bytes,
        })
    }

    /// Upload bytes at `offset_bytes`
    pub fn write(&self, offset_bytes: usize, data: &[u8]) -> RenderResult<()> {
        if offset_bytes + data.len() > self.size_bytes {
            return Err(RenderError::Device(format!(
                "write of {} bytes at {} exceeds buffer size {}",
                data.len(),
                offset_bytes,
                self.size_bytes
            )));
        }
        self.device.borrow_mut().write_buffer(self.id, offset_bytes, data)
    }

    /// Device handle
    pub const fn id(&self) -> BufferId {
        self.id
    }

    /// Buffer contents
    pub const fn kind(&self) -> BufferKind {
        self.kind
    }

    /// Update frequency
    pub const fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// Size in bytes
    pub const fn size_bytes(&self) -> usize {
        self.size_bytes
    }
}

impl std::fmt::Debug for GpuBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuBuffer")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("usage", &self.usage)
            .field("size_bytes", &self.size_bytes)
            .finish()
    }
}

impl Drop for GpuBuffer {
    fn drop(&mut self) {
        match self.device.try_borrow_mut() {
            Ok(mut device) => device.destroy_buffer(self.id),
            Err(_) => log::warn!("Device busy while releasing {:?}; buffer leaked", self.id),
        }
    }
}

/// Buffer held by a [`RecordingDevice`]
#[derive(Debug, Clone)]
pub struct RecordedBuffer {
    /// Contents
    pub kind: BufferKind,
    /// Update frequency
    pub usage: BufferUsage,
    /// Bytes written so far
    pub data: Vec<u8>,
}

/// Draw captured by a [`RecordingDevice`]
#[derive(Debug, Clone)]
pub struct RecordedDraw {
    /// Pipeline state
    pub state: BatchState,
    /// Vertices drawn
    pub vertices: Vec<Vertex>,
    /// Indices drawn
    pub indices: Option<Vec<u32>>,
    /// Transform for resident draws
    pub transform: Option<Mat4>,
    /// Material for resident draws
    pub material: Option<PolygonMaterial>,
}

impl RecordedDraw {
    /// Whether the draw came from primitive-owned buffers
    pub const fn is_resident(&self) -> bool {
        self.transform.is_some()
    }
}

/// Headless device that keeps buffers in memory and records every draw
#[derive(Debug, Default)]
pub struct RecordingDevice {
    buffers: SlotMap<BufferId, RecordedBuffer>,
    draws: Vec<RecordedDraw>,
    frames_presented: usize,
    buffers_created: usize,
    buffers_destroyed: usize,
}

impl RecordingDevice {
    /// Create an empty device
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a device wrapped for sharing
    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Draws recorded since the last [`RecordingDevice::clear_draws`]
    pub fn draws(&self) -> &[RecordedDraw] {
        &self.draws
    }

    /// Forget recorded draws
    pub fn clear_draws(&mut self) {
        self.draws.clear();
    }

    /// Number of presented frames
    pub const fn frames_presented(&self) -> usize {
        self.frames_presented
    }

    /// Number of live buffers
    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    /// Total buffers allocated
    pub const fn buffers_created(&self) -> usize {
        self.buffers_created
    }

    /// Total buffers released
    pub const fn buffers_destroyed(&self) -> usize {
        self.buffers_destroyed
    }

    /// Inspect a live buffer
    pub fn buffer(&self, id: BufferId) -> Option<&RecordedBuffer> {
        self.buffers.get(id)
    }

    fn read_vertices(&self, id: BufferId, count: usize) -> RenderResult<Vec<Vertex>> {
        let buffer = self.buffers.get(id).ok_or(RenderError::UnknownBuffer)?;
        let bytes = buffer
            .data
            .get(..count * Vertex::SIZE)
            .ok_or_else(|| RenderError::Device(format!("vertex buffer holds fewer than {count} vertices")))?;
        Ok(bytemuck::pod_collect_to_vec(bytes))
    }

    fn read_indices(&self, id: BufferId, count: usize) -> RenderResult<Vec<u32>> {
        let buffer = self.buffers.get(id).ok_or(RenderError::UnknownBuffer)?;
        let bytes = buffer
            .data
            .get(..count * 4)
            .ok_or_else(|| RenderError::Device(format!("index buffer holds fewer than {count} indices")))?;
        Ok(bytemuck::pod_collect_to_vec(bytes))
    }
}

impl RenderDevice for RecordingDevice {
    fn create_buffer(&mut self, kind: BufferKind, usage: BufferUsage, size_bytes: usize) -> RenderResult<BufferId> {
        self.buffers_created += 1;
        Ok(self.buffers.insert(RecordedBuffer {
            kind,
            usage,
            data: vec![0; size_bytes],
        }))
    }

    fn write_buffer(&mut self, id: BufferId, offset_bytes: usize, data: &[u8]) -> RenderResult<()> {
        let buffer = self.buffers.get_mut(id).ok_or(RenderError::UnknownBuffer)?;
        let target = buffer
            .data
            .get_mut(offset_bytes..offset_bytes + data.len())
            .ok_or_else(|| RenderError::Device("write past end of buffer".to_string()))?;
        target.copy_from_slice(data);
        Ok(())
    }

    fn destroy_buffer(&mut self, id: BufferId) {
        if self.buffers.remove(id).is_some() {
            self.buffers_destroyed += 1;
        }
    }

    fn draw(&mut self, call: &DrawCall<'_>) -> RenderResult<()> {
        let draw = match call.source {
            DrawSource::Immediate { vertices, indices } => RecordedDraw {
                state: call.state.clone(),
                vertices: vertices.to_vec(),
                indices: indices.map(<[u32]>::to_vec),
                transform: None,
                material: None,
            },
            DrawSource::Resident {
                vertex_buffer,
                vertex_count,
                index_buffer,
                index_count,
                transform,
                material,
            } => RecordedDraw {
                state: call.state.clone(),
                vertices: self.read_vertices(vertex_buffer, vertex_count)?,
                indices: index_buffer
                    .map(|id| self.read_indices(id, index_count))
                    .transpose()?,
                transform: Some(transform),
                material: Some(material),
            },
        };
        self.draws.push(draw);
        Ok(())
    }

    fn present(&mut self) -> RenderResult<()> {
        self.frames_presented += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpu_buffer_released_on_drop() {
        let recorder = RecordingDevice::shared();
        let device: SharedDevice = recorder.clone();
        {
            let buffer = GpuBuffer::new(&device, BufferKind::Vertex, BufferUsage::Static, 80).unwrap();
            buffer.write(40, &[1u8; 40]).unwrap();
            assert_eq!(recorder.borrow().live_buffers(), 1);
            assert_eq!(recorder.borrow().buffer(buffer.id()).unwrap().data[40], 1);
        }
        assert_eq!(recorder.borrow().live_buffers(), 0);
        assert_eq!(recorder.borrow().buffers_destroyed(), 1);
    }

    #[test]
    fn test_write_past_end_rejected() {
        let recorder = RecordingDevice::shared();
        let device: SharedDevice = recorder;
        let buffer = GpuBuffer::new(&device, BufferKind::Index, BufferUsage::Dynamic, 8).unwrap();
        assert!(matches!(buffer.write(4, &[0u8; 8]), Err(RenderError::Device(_))));
    }
}
