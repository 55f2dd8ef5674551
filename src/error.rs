//! Error types for png-structure

use crate::chunk::ChunkType;
use std::io;

/// Result type for png-structure operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error produced by a [`MetadataCodec`](crate::MetadataCodec) implementation
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while parsing, editing or writing PNG chunk streams
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The stream does not start with the PNG signature
    #[error("Not PNG data")]
    NotPng,

    /// Truncated or oversized chunk framing
    #[error("Malformed chunk stream at offset {offset}: {reason}")]
    MalformedStream { offset: u64, reason: String },

    /// A chunk's stored CRC does not match its contents (only with CRC verification enabled)
    #[error(
        "CRC mismatch in {chunk_type} chunk at offset {offset}: \
         stored {stored:#010x}, computed {computed:#010x}"
    )]
    CrcMismatch {
        offset: u64,
        chunk_type: ChunkType,
        stored: u32,
        computed: u32,
    },

    /// Declared chunk length disagrees with the data actually held
    #[error(
        "Length of data not correct for {chunk_type} chunk: \
         declared {declared}, actual {actual}"
    )]
    LengthMismatch {
        chunk_type: ChunkType,
        declared: u32,
        actual: usize,
    },

    /// No eXIf chunk in the collection
    #[error("EXIF chunk not found")]
    ExifNotFound,

    /// The metadata codec could not decode the payload
    #[error("EXIF payload could not be decoded: {0}")]
    PayloadDecode(#[source] BoxError),

    /// The metadata codec could not encode the builder
    #[error("EXIF payload could not be encoded: {0}")]
    PayloadEncode(#[source] BoxError),

    /// No decoder registered for the chunk type
    #[error("No decoder registered for chunk type {0}")]
    UnsupportedChunkType(ChunkType),

    /// The chunk payload does not match the layout its type requires
    #[error("Malformed {chunk_type} payload: expected {expected} bytes, got {actual}")]
    MalformedPayload {
        chunk_type: ChunkType,
        expected: usize,
        actual: usize,
    },

    /// Position outside of the chunk collection
    #[error("Chunk index {index} out of range (len {len})")]
    ChunkIndexOutOfRange { index: usize, len: usize },
}

impl Error {
    /// Whether this is the expected "no eXIf chunk yet" condition
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::ExifNotFound)
    }
}
