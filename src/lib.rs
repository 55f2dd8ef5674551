//! Chunk-level PNG parsing, re-serialization and EXIF splicing.
//!
//! This crate treats a PNG file as what it is on disk: an 8-byte signature
//! followed by length-prefixed, type-tagged, CRC-checked chunks. It parses
//! that stream into an editable [`ChunkSlice`], writes it back byte for byte,
//! and can locate, extract and replace the EXIF payload carried in an `eXIf`
//! chunk. Pixel data is never decompressed.
//!
//! # Design Principles
//!
//! - **Round trip**: writing an unmodified parse reproduces the input exactly
//! - **Incremental**: the [`ChunkSplitter`] accepts input in fragments of any size
//! - **Opaque payloads**: EXIF tag handling is delegated to a [`MetadataCodec`]
//!
//! # Quick Start
//!
//! ```
//! use png_structure::{ByteOrder, IfdKind, MetadataCodec, PngParser, TagValue, TiffCodec};
//! # use png_structure::test_utils::{fixture_bytes, SELECTION};
//!
//! # fn main() -> png_structure::Result<()> {
//! # let bytes = fixture_bytes(SELECTION)?;
//! // Parse the chunk structure
//! let mut chunks = PngParser::new().parse_bytes(&bytes)?;
//!
//! // Add EXIF, or update the existing block
//! let codec = TiffCodec;
//! let mut builder = match chunks.construct_exif_builder(&codec) {
//!     Ok(builder) => builder,
//!     Err(e) if e.is_not_found() => codec.new_builder(IfdKind::Root, ByteOrder::BigEndian),
//!     Err(e) => return Err(e),
//! };
//! builder.set(0x0100, TagValue::Long(vec![1472]));
//! chunks.set_exif(&codec, &builder)?;
//!
//! // Write it back
//! let mut output = Vec::new();
//! chunks.write(&mut output)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Incremental Parsing
//!
//! ```
//! use png_structure::ChunkSplitter;
//! # use png_structure::test_utils::{fixture_bytes, MINIMAL};
//!
//! # fn main() -> png_structure::Result<()> {
//! # let bytes = fixture_bytes(MINIMAL)?;
//! let mut splitter = ChunkSplitter::new();
//! for fragment in bytes.chunks(5) {
//!     splitter.feed(fragment, false)?;
//! }
//! let chunks = splitter.finish()?;
//! assert_eq!(chunks.len(), 2);
//! # Ok(())
//! # }
//! ```

mod chunk;
mod chunks;
mod decoder;
mod error;
mod exif;
mod options;
mod parser;
mod splitter;
#[cfg(feature = "exif")]
mod tiff;

pub use chunk::{
    calculate_crc, Chunk, ChunkType, CHUNK_CRC_SIZE, CHUNK_HEADER_SIZE, EXIF, IDAT, IEND, IHDR,
    PHYS, TIME,
};
pub use chunks::ChunkSlice;
pub use decoder::{expect_len, ChunkDecode, ChunkDecoder, DecodedChunk, Ihdr, Phys, Time};
pub use error::{BoxError, Error, Result};
pub use exif::{ByteOrder, MetadataCodec};
pub use options::{ParseOptions, DEFAULT_FRAGMENT_SIZE};
pub use parser::{parse_bytes_structure, parse_segments, PngParser};
pub use splitter::{looks_like_png, ChunkSplitter, PNG_SIGNATURE};
#[cfg(feature = "exif")]
pub use tiff::{
    encode_tiff, parse_tiff, tags, ChainedIfd, Ifd, IfdBuilder, IfdEntry, IfdKind, TagValue,
    TiffCodec, TiffError, MAX_IFD_TAGS,
};

// Test utilities - only compiled for tests or when explicitly enabled
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
