//! Test utilities for working with synthetic PNG fixtures.
//!
//! Fixtures are built in code rather than read from disk, so tests run the
//! same everywhere. Each fixture is a complete, well-formed PNG chunk stream
//! with correct lengths and CRCs (the pixel data is not a valid zlib stream,
//! which nothing here cares about).
//!
//! # Usage
//!
//! ```
//! use png_structure::test_utils::*;
//!
//! # fn example() -> png_structure::Result<()> {
//! // Use predefined fixture constants
//! let bytes = fixture_bytes(SELECTION)?;
//!
//! // Or get test streams
//! let (format, input, output) = create_test_streams(EXIF_PNG)?;
//!
//! // Feed a fixture to the splitter in irregular fragments
//! let chunks = feed_in_fragments(&bytes, &[1, 7, 3])?;
//! # Ok(())
//! # }
//! ```

use std::{collections::HashMap, io::Cursor, sync::LazyLock};

use crate::{
    chunk::{Chunk, ChunkType, EXIF, IDAT, IEND, IHDR, PHYS, TIME},
    chunks::ChunkSlice,
    error::{Error, Result},
    splitter::{ChunkSplitter, PNG_SIGNATURE},
};

/// Type alias for test stream tuples: (format, input_cursor, output_cursor)
pub type TestStreams = (&'static str, Cursor<Vec<u8>>, Cursor<Vec<u8>>);

/// Macro to define fixtures with a builder function each
macro_rules! define_fixtures {
    ($($name:ident => ($file:expr, $builder:path)),* $(,)?) => {
        // Define constants for fixture names
        $(
            pub const $name: &str = $file;
        )*

        static FIXTURES: LazyLock<HashMap<&'static str, fn() -> Vec<u8>>> =
            LazyLock::new(|| {
                let mut map: HashMap<&'static str, fn() -> Vec<u8>> = HashMap::new();
                $(
                    map.insert($file, $builder);
                )*
                map
            });

        /// List all defined fixtures
        pub fn list_all_fixtures() -> Vec<&'static str> {
            vec![$($file),*]
        }
    };
}

define_fixtures!(
    MINIMAL => ("minimal.png", minimal_png),     // IHDR + IEND
    SELECTION => ("selection.png", selection_png), // IHDR, pHYs, tIME, 3x IDAT, IEND
    EXIF_PNG => ("exif.png", exif_png),          // IHDR, eXIf, IDAT, IEND
);

/// IHDR payload: 1472x598, 8-bit RGB
pub const SELECTION_IHDR: [u8; 13] = [
    0x00, 0x00, 0x05, 0xc0, // Width: 1472
    0x00, 0x00, 0x02, 0x56, // Height: 598
    0x08, // Bit depth: 8
    0x02, // Color type: RGB
    0x00, // Compression: deflate
    0x00, // Filter: adaptive
    0x00, // Interlace: none
];

/// Little-endian TIFF payload with ImageWidth = 11 and ImageLength = 22
pub const EXIF_PAYLOAD: [u8; 38] = [
    b'I', b'I', 0x2a, 0x00, 0x08, 0x00, 0x00, 0x00, // Header
    0x02, 0x00, // Tag count
    0x00, 0x01, 0x04, 0x00, 0x01, 0x00, 0x00, 0x00, 0x0b, 0x00, 0x00, 0x00, // ImageWidth
    0x01, 0x01, 0x04, 0x00, 0x01, 0x00, 0x00, 0x00, 0x16, 0x00, 0x00, 0x00, // ImageLength
    0x00, 0x00, 0x00, 0x00, // Next IFD
];

fn chunk(chunk_type: ChunkType, data: &[u8]) -> Chunk {
    Chunk::new(chunk_type, data.to_vec()).expect("fixture payloads fit a 32-bit length")
}

/// Encode chunks after the PNG signature
pub fn png_from_chunks(chunks: &[Chunk]) -> Result<Vec<u8>> {
    let mut data = PNG_SIGNATURE.to_vec();
    for chunk in chunks {
        chunk.write_to(&mut data)?;
    }
    Ok(data)
}

fn build(chunks: &[Chunk]) -> Vec<u8> {
    png_from_chunks(chunks).expect("fixture chunks are consistent")
}

/// Signature, 1x1 RGB IHDR and IEND
pub fn minimal_png() -> Vec<u8> {
    build(&[
        chunk(IHDR, &[0, 0, 0, 1, 0, 0, 0, 1, 8, 2, 0, 0, 0]),
        chunk(IEND, &[]),
    ])
}

/// Screenshot-like stream with ancillary chunks and split image data
pub fn selection_png() -> Vec<u8> {
    build(&[
        chunk(IHDR, &SELECTION_IHDR),
        chunk(PHYS, &[0x00, 0x00, 0x0b, 0x13, 0x00, 0x00, 0x0b, 0x13, 0x01]),
        chunk(TIME, &[0x07, 0xcc, 0x06, 0x07, 0x11, 0x3a, 0x08]),
        chunk(IDAT, &[0x78, 0x9c, 0x01, 0x02, 0x03, 0x04]),
        chunk(IDAT, &[0x05; 300]),
        chunk(IDAT, &[0x06, 0x07]),
        chunk(IEND, &[]),
    ])
}

/// Stream carrying [`EXIF_PAYLOAD`] in an eXIf chunk
pub fn exif_png() -> Vec<u8> {
    build(&[
        chunk(IHDR, &SELECTION_IHDR),
        chunk(EXIF, &EXIF_PAYLOAD),
        chunk(IDAT, &[0x78, 0x9c, 0x00]),
        chunk(IEND, &[]),
    ])
}

/// Helper to get fixture data as bytes
pub fn fixture_bytes(name: &str) -> Result<Vec<u8>> {
    FIXTURES.get(name).map(|build| build()).ok_or_else(|| {
        Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            name.to_string(),
        ))
    })
}

/// Create test streams
///
/// Returns: (format, input_cursor, output_cursor)
pub fn create_test_streams(fixture_name: &str) -> Result<TestStreams> {
    let input_cursor = Cursor::new(fixture_bytes(fixture_name)?);
    let output_cursor = Cursor::new(Vec::new());

    Ok(("image/png", input_cursor, output_cursor))
}

/// Feed `data` to a splitter in fragments of the given sizes (cycled)
pub fn feed_in_fragments(data: &[u8], sizes: &[usize]) -> Result<ChunkSlice> {
    let mut splitter = ChunkSplitter::new();
    let mut rest = data;
    let mut sizes = sizes.iter().copied().filter(|&s| s > 0).cycle();

    while !rest.is_empty() {
        let size = sizes.next().unwrap_or(rest.len()).min(rest.len());
        let (fragment, tail) = rest.split_at(size);
        splitter.feed(fragment, false)?;
        rest = tail;
    }

    splitter.finish()
}
