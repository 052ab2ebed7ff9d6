//! # Persistence
//!
//! Saving and loading sprites and polygons in the chunked binary format.
//!
//! ## Architecture
//!
//! - **binary**: little-endian field encoding over byte buffers
//! - **chunk**: the container (8-byte header, chunk count, then id/length/payload
//!   records) with a reader that indexes every chunk in one pass
//! - **persist**: [`Persist`] and [`Loadable`] implementations for
//!   [`Sprite`](crate::render::Sprite) and [`Polygon`](crate::render::Polygon)
//! - **legacy**: reader for sprites written in the older single-stream format
//!
//! A load either completes or returns an error; a primitive that failed to
//! load is dropped rather than returned half-populated.

pub mod binary;
pub mod chunk;
pub mod legacy;
pub mod persist;

use thiserror::Error;

use crate::render::RenderError;

pub use binary::{BinaryReader, BinaryWriter};
pub use chunk::{ChunkFileReader, ChunkFileWriter};
pub use legacy::LegacyVersion;
pub use persist::{
    load, load_from_bytes, load_from_path, LoadContext, Loadable, Persist, POLYGON_HEADER, SPRITE_HEADER,
};

/// Persistence errors
#[derive(Error, Debug)]
pub enum PersistError {
    /// Underlying stream failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File header did not match the expected format
    #[error("Invalid file header: expected {expected:?}, found {found:?}")]
    InvalidHeader {
        /// Expected header
        expected: String,
        /// Header read from the stream
        found: String,
    },

    /// A required chunk is not present
    #[error("Missing chunk {0:?}")]
    MissingChunk(String),

    /// A read ran past the end of its chunk or stream
    #[error("Read of {requested} bytes overruns the {remaining} remaining")]
    ChunkOverrun {
        /// Bytes requested
        requested: usize,
        /// Bytes left
        remaining: usize,
    },

    /// A length-prefixed string was malformed or not UTF-8
    #[error("Invalid string data")]
    InvalidString,

    /// A field held a value outside its domain
    #[error("Invalid value {value} for {field}")]
    InvalidValue {
        /// Field being decoded
        field: &'static str,
        /// Raw value read
        value: i64,
    },

    /// A caller-supplied argument was rejected
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Legacy header with a version this reader does not know
    #[error("Unsupported legacy sprite version {0:?}")]
    UnsupportedLegacyVersion(String),

    /// Rebuilding the primitive failed
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

/// Result type for persistence operations
pub type PersistResult<T> = Result<T, PersistError>;
