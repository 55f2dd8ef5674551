//! Structured decoding of chunk payloads
//!
//! [`ChunkDecoder`] is a registry from [`ChunkType`] to a [`ChunkDecode`]
//! implementation. `IHDR`, `pHYs` and `tIME` are registered by default; other
//! types are added with [`ChunkDecoder::register`].
//!
//! ```
//! use png_structure::{Chunk, ChunkDecoder, DecodedChunk, IHDR};
//!
//! # fn main() -> png_structure::Result<()> {
//! let data = vec![0, 0, 5, 0xc0, 0, 0, 2, 0x56, 8, 2, 0, 0, 0];
//! let chunk = Chunk::new(IHDR, data)?;
//!
//! let decoder = ChunkDecoder::new();
//! if let DecodedChunk::Ihdr(header) = decoder.decode(&chunk)? {
//!     assert_eq!((header.width, header.height), (1472, 598));
//! }
//! # Ok(())
//! # }
//! ```

use crate::{
    chunk::{Chunk, ChunkType, IHDR, PHYS, TIME},
    error::{Error, Result},
};
use byteorder::{BigEndian, ByteOrder};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;

/// Decoded IHDR chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ihdr {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub color_type: u8,
    pub compression_method: u8,
    pub filter_method: u8,
    pub interlace_method: u8,
}

impl Ihdr {
    /// Encoded size of an IHDR payload
    pub const SIZE: usize = 13;

    /// Encode back into the 13-byte IHDR layout
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        BigEndian::write_u32(&mut buf[0..4], self.width);
        BigEndian::write_u32(&mut buf[4..8], self.height);
        buf[8] = self.bit_depth;
        buf[9] = self.color_type;
        buf[10] = self.compression_method;
        buf[11] = self.filter_method;
        buf[12] = self.interlace_method;
        buf
    }
}

/// Decoded pHYs chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phys {
    pub pixels_per_unit_x: u32,
    pub pixels_per_unit_y: u32,
    /// 0 = unknown, 1 = meter
    pub unit: u8,
}

impl Phys {
    pub const SIZE: usize = 9;
}

/// Decoded tIME chunk (UTC)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Time {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl Time {
    pub const SIZE: usize = 7;
}

/// Result of decoding a chunk
pub enum DecodedChunk {
    Ihdr(Ihdr),
    Phys(Phys),
    Time(Time),
    /// Value produced by a caller-registered decoder
    Custom(Box<dyn Any + Send + Sync>),
}

impl DecodedChunk {
    /// Downcast a custom value
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            DecodedChunk::Custom(value) => value.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl fmt::Debug for DecodedChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedChunk::Ihdr(v) => f.debug_tuple("Ihdr").field(v).finish(),
            DecodedChunk::Phys(v) => f.debug_tuple("Phys").field(v).finish(),
            DecodedChunk::Time(v) => f.debug_tuple("Time").field(v).finish(),
            DecodedChunk::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Decoder for one chunk type
pub trait ChunkDecode: Send + Sync {
    fn decode(&self, chunk: &Chunk) -> Result<DecodedChunk>;
}

impl<F> ChunkDecode for F
where
    F: Fn(&Chunk) -> Result<DecodedChunk> + Send + Sync,
{
    fn decode(&self, chunk: &Chunk) -> Result<DecodedChunk> {
        self(chunk)
    }
}

/// Fail unless the payload is exactly `expected` bytes
pub fn expect_len(chunk: &Chunk, expected: usize) -> Result<&[u8]> {
    if chunk.data.len() != expected {
        return Err(Error::MalformedPayload {
            chunk_type: chunk.chunk_type,
            expected,
            actual: chunk.data.len(),
        });
    }
    Ok(&chunk.data)
}

struct IhdrDecoder;

impl ChunkDecode for IhdrDecoder {
    fn decode(&self, chunk: &Chunk) -> Result<DecodedChunk> {
        let data = expect_len(chunk, Ihdr::SIZE)?;
        Ok(DecodedChunk::Ihdr(Ihdr {
            width: BigEndian::read_u32(&data[0..4]),
            height: BigEndian::read_u32(&data[4..8]),
            bit_depth: data[8],
            color_type: data[9],
            compression_method: data[10],
            filter_method: data[11],
            interlace_method: data[12],
        }))
    }
}

struct PhysDecoder;

impl ChunkDecode for PhysDecoder {
    fn decode(&self, chunk: &Chunk) -> Result<DecodedChunk> {
        let data = expect_len(chunk, Phys::SIZE)?;
        Ok(DecodedChunk::Phys(Phys {
            pixels_per_unit_x: BigEndian::read_u32(&data[0..4]),
            pixels_per_unit_y: BigEndian::read_u32(&data[4..8]),
            unit: data[8],
        }))
    }
}

struct TimeDecoder;

impl ChunkDecode for TimeDecoder {
    fn decode(&self, chunk: &Chunk) -> Result<DecodedChunk> {
        let data = expect_len(chunk, Time::SIZE)?;
        Ok(DecodedChunk::Time(Time {
            year: BigEndian::read_u16(&data[0..2]),
            month: data[2],
            day: data[3],
            hour: data[4],
            minute: data[5],
            second: data[6],
        }))
    }
}

/// Registry of chunk decoders keyed by chunk type
pub struct ChunkDecoder {
    decoders: HashMap<ChunkType, Box<dyn ChunkDecode>>,
}

impl ChunkDecoder {
    /// Registry with the built-in IHDR, pHYs and tIME decoders
    pub fn new() -> Self {
        let mut decoder = Self::empty();
        decoder.register(IHDR, IhdrDecoder);
        decoder.register(PHYS, PhysDecoder);
        decoder.register(TIME, TimeDecoder);
        decoder
    }

    /// Registry with no decoders
    pub fn empty() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// Register (or replace) the decoder for `chunk_type`
    pub fn register<D>(&mut self, chunk_type: impl Into<ChunkType>, decoder: D)
    where
        D: ChunkDecode + 'static,
    {
        self.decoders.insert(chunk_type.into(), Box::new(decoder));
    }

    /// Whether a decoder is registered for `chunk_type`
    pub fn supports(&self, chunk_type: impl Into<ChunkType>) -> bool {
        self.decoders.contains_key(&chunk_type.into())
    }

    /// Decode `chunk` with the decoder registered for its type
    pub fn decode(&self, chunk: &Chunk) -> Result<DecodedChunk> {
        match self.decoders.get(&chunk.chunk_type) {
            Some(decoder) => decoder.decode(chunk),
            None => Err(Error::UnsupportedChunkType(chunk.chunk_type)),
        }
    }
}

impl Default for ChunkDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ChunkDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<_> = self.decoders.keys().collect();
        types.sort();
        f.debug_struct("ChunkDecoder").field("types", &types).finish()
    }
}
