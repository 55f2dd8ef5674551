//! Incremental PNG chunk splitter
//!
//! [`ChunkSplitter`] turns a PNG byte stream into [`Chunk`] records without
//! needing the whole stream at once. Bytes may arrive in fragments of any
//! size; a chunk is emitted as soon as all of its bytes are available.
//!
//! Two entry points are provided:
//!
//! - [`ChunkSplitter::split`] works on a caller-owned buffer and reports how
//!   many bytes it consumed. The caller keeps the unconsumed tail and calls
//!   again with more data appended.
//! - [`ChunkSplitter::feed`] owns the accumulation buffer, so fragments can be
//!   handed over as they arrive.

use crate::{
    chunk::{Chunk, ChunkType, CHUNK_CRC_SIZE, CHUNK_HEADER_SIZE},
    chunks::ChunkSlice,
    error::{Error, Result},
    options::ParseOptions,
};
use byteorder::{BigEndian, ByteOrder};

/// PNG signature
pub const PNG_SIGNATURE: [u8; 8] = *b"\x89PNG\r\n\x1a\n";

/// Whether `data` starts with the PNG signature
pub fn looks_like_png(data: &[u8]) -> bool {
    data.len() >= PNG_SIGNATURE.len() && data[..PNG_SIGNATURE.len()] == PNG_SIGNATURE
}

/// Incremental splitter from a PNG byte stream to chunks
#[derive(Debug, Default)]
pub struct ChunkSplitter {
    chunks: Vec<Chunk>,
    current_offset: u64,
    signature_seen: bool,
    pending: Vec<u8>,
    max_chunk_length: Option<u32>,
    verify_crc: bool,
}

impl ChunkSplitter {
    /// Create a splitter with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a splitter honoring the limits in `options`
    pub fn with_options(options: &ParseOptions) -> Self {
        Self {
            max_chunk_length: options.max_chunk_length,
            verify_crc: options.verify_crc,
            ..Self::default()
        }
    }

    /// Chunks emitted so far, in stream order
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Stream offset of the next unconsumed byte
    pub fn offset(&self) -> u64 {
        self.current_offset
    }

    /// Bytes buffered by [`feed`](Self::feed) that do not yet form a complete chunk
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Consume the signature and every complete chunk at the front of `data`
    ///
    /// Returns the number of bytes consumed. Anything after that belongs to a
    /// chunk that is not complete yet and must be passed again, followed by
    /// more data. With `at_eof` set, leftover bytes are an error.
    pub fn split(&mut self, mut data: &[u8], at_eof: bool) -> Result<usize> {
        let mut advance = 0;

        if !self.signature_seen {
            let len = PNG_SIGNATURE.len();
            if data.len() < len {
                // A mismatch in the bytes we already have is final
                if at_eof || data != &PNG_SIGNATURE[..data.len()] {
                    return Err(Error::NotPng);
                }
                return Ok(0);
            }
            if data[..len] != PNG_SIGNATURE {
                return Err(Error::NotPng);
            }

            self.signature_seen = true;
            self.current_offset += len as u64;
            advance += len;
            data = &data[len..];
        }

        // There may be several chunks in this fragment; take all complete ones
        // and leave the tail for the next call.
        while data.len() >= CHUNK_HEADER_SIZE {
            let length = BigEndian::read_u32(&data[0..4]);
            let chunk_type = ChunkType([data[4], data[5], data[6], data[7]]);

            if let Some(max) = self.max_chunk_length {
                if length > max {
                    return Err(Error::MalformedStream {
                        offset: self.current_offset,
                        reason: format!(
                            "{} chunk declares {} bytes (max {})",
                            chunk_type, length, max
                        ),
                    });
                }
            }

            let chunk_size = (CHUNK_HEADER_SIZE + CHUNK_CRC_SIZE) as u64 + length as u64;
            if (data.len() as u64) < chunk_size {
                break;
            }

            // Bounded by data.len() from here on
            let chunk_size = chunk_size as usize;
            let crc_index = CHUNK_HEADER_SIZE + length as usize;

            let chunk = Chunk {
                offset: self.current_offset,
                length,
                chunk_type,
                data: data[CHUNK_HEADER_SIZE..crc_index].to_vec(),
                crc: BigEndian::read_u32(&data[crc_index..crc_index + CHUNK_CRC_SIZE]),
            };

            if self.verify_crc {
                let computed = chunk.calculate_crc();
                if computed != chunk.crc {
                    return Err(Error::CrcMismatch {
                        offset: chunk.offset,
                        chunk_type,
                        stored: chunk.crc,
                        computed,
                    });
                }
            }

            log::trace!("split {}", chunk);
            self.chunks.push(chunk);

            advance += chunk_size;
            self.current_offset += chunk_size as u64;
            data = &data[chunk_size..];
        }

        if at_eof && !data.is_empty() {
            return Err(Error::MalformedStream {
                offset: self.current_offset,
                reason: format!(
                    "{} trailing bytes do not form a complete chunk",
                    data.len()
                ),
            });
        }

        Ok(advance)
    }

    /// Append a fragment to the internal buffer and split what is complete
    ///
    /// Returns the number of buffered bytes consumed by this call. Set
    /// `is_final` on the last fragment (an empty fragment is fine) so that a
    /// truncated tail is reported.
    ///
    /// On error, chunks completed before the failing one are kept and removed
    /// from the buffer; the buffer starts at the chunk that failed.
    pub fn feed(&mut self, fragment: &[u8], is_final: bool) -> Result<usize> {
        let start = self.current_offset;

        if self.pending.is_empty() {
            let result = self.split(fragment, is_final);
            let consumed = (self.current_offset - start) as usize;
            self.pending.extend_from_slice(&fragment[consumed..]);
            return result;
        }

        let mut pending = std::mem::take(&mut self.pending);
        pending.extend_from_slice(fragment);
        let result = self.split(&pending, is_final);
        // Chunks split before a failure stay split; only the rest is kept
        let consumed = (self.current_offset - start) as usize;
        pending.drain(..consumed);
        self.pending = pending;
        result
    }

    /// Signal end of input and hand over the collected chunks
    pub fn finish(mut self) -> Result<ChunkSlice> {
        self.feed(&[], true)?;
        log::debug!(
            "split {} chunks from {} bytes",
            self.chunks.len(),
            self.current_offset
        );
        Ok(ChunkSlice::from_chunks(self.chunks))
    }
}
