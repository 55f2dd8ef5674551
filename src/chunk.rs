//! PNG chunk records
//!
//! Every chunk on the wire is laid out as:
//!
//! ```text
//! length (u32 BE) | type (4 bytes) | data (length bytes) | crc (u32 BE)
//! ```
//!
//! The CRC covers `type || data` only.

use crate::error::{Error, Result};
use byteorder::{BigEndian, WriteBytesExt};
use std::fmt;
use std::io::Write;

/// Size of the length and type fields preceding chunk data
pub const CHUNK_HEADER_SIZE: usize = 8;

/// Size of the trailing CRC field
pub const CHUNK_CRC_SIZE: usize = 4;

/// Four-byte chunk type tag
///
/// Letter case carries no meaning here; the critical/ancillary conventions of
/// the PNG format are not enforced.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkType(pub [u8; 4]);

/// Image header
pub const IHDR: ChunkType = ChunkType(*b"IHDR");
/// Image data
pub const IDAT: ChunkType = ChunkType(*b"IDAT");
/// Image trailer
pub const IEND: ChunkType = ChunkType(*b"IEND");
/// Physical pixel dimensions
pub const PHYS: ChunkType = ChunkType(*b"pHYs");
/// Last modification time
pub const TIME: ChunkType = ChunkType(*b"tIME");
/// Embedded EXIF metadata (PNG 1.5 extension)
pub const EXIF: ChunkType = ChunkType(*b"eXIf");

impl ChunkType {
    /// Raw tag bytes
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl From<[u8; 4]> for ChunkType {
    fn from(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }
}

impl From<&[u8; 4]> for ChunkType {
    fn from(bytes: &[u8; 4]) -> Self {
        Self(*bytes)
    }
}

impl PartialEq<[u8; 4]> for ChunkType {
    fn eq(&self, other: &[u8; 4]) -> bool {
        &self.0 == other
    }
}

impl PartialEq<&[u8; 4]> for ChunkType {
    fn eq(&self, other: &&[u8; 4]) -> bool {
        &self.0 == *other
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &byte in &self.0 {
            if byte.is_ascii_graphic() {
                write!(f, "{}", byte as char)?;
            } else {
                write!(f, "\\x{:02x}", byte)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkType(\"{}\")", self)
    }
}

/// Calculate the PNG CRC-32 over a chunk type and its data
pub fn calculate_crc(chunk_type: &ChunkType, data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type.as_bytes());
    hasher.update(data);
    hasher.finalize()
}

/// A single chunk of a PNG stream
///
/// `crc` is stored, not derived: a freshly constructed or edited chunk may
/// carry a stale value until [`Chunk::update_crc`] is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Position of the length field within the source stream
    pub offset: u64,
    /// Declared data length
    pub length: u32,
    /// Chunk type tag
    pub chunk_type: ChunkType,
    /// Raw chunk data
    pub data: Vec<u8>,
    /// Stored CRC-32 over `chunk_type || data`
    pub crc: u32,
}

impl Chunk {
    /// Build a chunk with a length and CRC matching `data`
    ///
    /// Fails with [`Error::MalformedStream`] if `data` cannot be described by a
    /// 32-bit length.
    pub fn new(chunk_type: impl Into<ChunkType>, data: Vec<u8>) -> Result<Self> {
        let chunk_type = chunk_type.into();
        let length = u32::try_from(data.len()).map_err(|_| Error::MalformedStream {
            offset: 0,
            reason: format!("{} chunk data too large: {} bytes", chunk_type, data.len()),
        })?;

        let mut chunk = Self {
            offset: 0,
            length,
            chunk_type,
            data,
            crc: 0,
        };
        chunk.update_crc();
        Ok(chunk)
    }

    /// Total encoded size: header + data + CRC
    pub fn encoded_len(&self) -> u64 {
        (CHUNK_HEADER_SIZE + CHUNK_CRC_SIZE) as u64 + self.length as u64
    }

    fn check_length(&self) -> Result<()> {
        if self.data.len() != self.length as usize {
            return Err(Error::LengthMismatch {
                chunk_type: self.chunk_type,
                declared: self.length,
                actual: self.data.len(),
            });
        }
        Ok(())
    }

    /// Encode this chunk into a new buffer
    pub fn bytes(&self) -> Result<Vec<u8>> {
        self.check_length()?;

        let mut buf = Vec::with_capacity(self.encoded_len() as usize);
        self.write_to(&mut buf)?;
        Ok(buf)
    }

    /// Encode and write this chunk, returning the number of bytes written
    ///
    /// Nothing is written when the declared length disagrees with the data.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<usize> {
        self.check_length()?;

        writer.write_u32::<BigEndian>(self.length)?;
        writer.write_all(self.chunk_type.as_bytes())?;
        writer.write_all(&self.data)?;
        writer.write_u32::<BigEndian>(self.crc)?;

        Ok(CHUNK_HEADER_SIZE + self.data.len() + CHUNK_CRC_SIZE)
    }

    /// CRC-32 over the current type and data
    pub fn calculate_crc(&self) -> u32 {
        calculate_crc(&self.chunk_type, &self.data)
    }

    /// Recompute and store the CRC
    pub fn update_crc(&mut self) {
        self.crc = self.calculate_crc();
    }

    /// Whether the stored CRC matches the current type and data
    pub fn check_crc(&self) -> bool {
        self.crc == self.calculate_crc()
    }

    /// Replace the data, keeping `length` and `crc` in step
    pub fn set_data(&mut self, data: Vec<u8>) -> Result<()> {
        self.length = u32::try_from(data.len()).map_err(|_| Error::MalformedStream {
            offset: self.offset,
            reason: format!("{} chunk data too large: {} bytes", self.chunk_type, data.len()),
        })?;
        self.data = data;
        self.update_crc();
        Ok(())
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Chunk<OFFSET=({}) LENGTH=({}) TYPE=[{}] CRC=({:#010x})>",
            self.offset, self.length, self.chunk_type, self.crc
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Chunk {
        Chunk {
            offset: 0,
            length: 5,
            chunk_type: ChunkType(*b"ABCD"),
            data: vec![0x11, 0x22, 0x33, 0x44, 0x55],
            crc: 0x5678,
        }
    }

    #[test]
    fn test_bytes() {
        let expected = vec![
            0x00, 0x00, 0x00, 0x05, // Length
            0x41, 0x42, 0x43, 0x44, // Type
            0x11, 0x22, 0x33, 0x44, 0x55, // Data
            0x00, 0x00, 0x56, 0x78, // CRC
        ];
        assert_eq!(sample().bytes().unwrap(), expected);
    }

    #[test]
    fn test_write_to_matches_bytes() {
        let chunk = sample();
        let mut buf = Vec::new();
        let written = chunk.write_to(&mut buf).unwrap();

        assert_eq!(written, 17);
        assert_eq!(buf, chunk.bytes().unwrap());
    }

    #[test]
    fn test_length_mismatch() {
        let mut chunk = sample();
        chunk.length = 6;

        assert!(matches!(
            chunk.bytes(),
            Err(Error::LengthMismatch {
                declared: 6,
                actual: 5,
                ..
            })
        ));

        let mut buf = Vec::new();
        assert!(chunk.write_to(&mut buf).is_err());
        assert!(buf.is_empty(), "mismatched chunk must not emit bytes");
    }

    #[test]
    fn test_crc_cycle() {
        let mut chunk = Chunk {
            offset: 0,
            length: 9,
            chunk_type: PHYS,
            data: vec![0x00, 0x00, 0x0b, 0x13, 0x00, 0x00, 0x0b, 0x13, 0x01],
            crc: 0,
        };

        chunk.update_crc();
        assert_eq!(chunk.crc, chunk.calculate_crc());
        assert_eq!(chunk.crc, 0x009a9c18);
        assert!(chunk.check_crc());

        chunk.chunk_type = TIME;
        chunk.data = vec![0x07, 0xcc, 0x06, 0x07, 0x11, 0x3a, 0x08];
        chunk.update_crc();
        assert_eq!(chunk.crc, 0x8eff267a);
        assert!(chunk.check_crc());

        chunk.data = vec![0x99, 0x99, 0x99, 0x99];
        assert!(!chunk.check_crc());
    }

    #[test]
    fn test_known_iend_crc() {
        let chunk = Chunk::new(IEND, Vec::new()).unwrap();
        assert_eq!(chunk.crc, 0xAE426082);
        assert_eq!(chunk.length, 0);
    }

    #[test]
    fn test_set_data_keeps_invariants() {
        let mut chunk = Chunk::new(TIME, vec![0; 7]).unwrap();
        chunk.set_data(vec![1, 2, 3]).unwrap();

        assert_eq!(chunk.length, 3);
        assert!(chunk.check_crc());
        assert_eq!(chunk.bytes().unwrap().len(), 15);
    }

    #[test]
    fn test_chunk_type_display() {
        assert_eq!(IHDR.to_string(), "IHDR");
        assert_eq!(ChunkType([0x00, b'a', b'b', 0xff]).to_string(), "\\x00ab\\xff");
        assert_eq!(format!("{:?}", EXIF), "ChunkType(\"eXIf\")");
        assert!(EXIF == *b"eXIf");
    }
}
