//! Ordered chunk collections

use crate::{
    chunk::{Chunk, ChunkType, IHDR},
    decoder::Ihdr,
    error::{Error, Result},
    splitter::PNG_SIGNATURE,
};
use std::collections::HashMap;
use std::fmt;
use std::io::Write;

/// Ordered sequence of chunks making up a PNG stream
///
/// Order is preserved verbatim: writing an unmodified collection reproduces
/// the parsed bytes exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkSlice {
    chunks: Vec<Chunk>,
}

impl ChunkSlice {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing sequence of chunks
    pub fn from_chunks(chunks: Vec<Chunk>) -> Self {
        Self { chunks }
    }

    /// Create a collection holding only an IHDR chunk for `header`
    pub fn with_header(header: &Ihdr) -> Result<Self> {
        let chunk = Chunk::new(IHDR, header.to_bytes().to_vec())?;
        Ok(Self::from_chunks(vec![chunk]))
    }

    /// All chunks in stream order
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Mutable access to the chunks
    ///
    /// Callers editing `data` are responsible for `length` and `crc`; see
    /// [`Chunk::set_data`].
    pub fn chunks_mut(&mut self) -> &mut [Chunk] {
        &mut self.chunks
    }

    /// Consume the collection, returning its chunks
    pub fn into_chunks(self) -> Vec<Chunk> {
        self.chunks
    }

    /// Number of chunks
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the collection holds no chunks
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Group chunks by type, keeping stream order within each group
    ///
    /// Recomputed on every call.
    pub fn index(&self) -> HashMap<ChunkType, Vec<&Chunk>> {
        let mut index: HashMap<ChunkType, Vec<&Chunk>> = HashMap::new();
        for chunk in &self.chunks {
            index.entry(chunk.chunk_type).or_default().push(chunk);
        }
        index
    }

    /// Position of the first chunk of the given type
    pub fn position(&self, chunk_type: impl Into<ChunkType>) -> Option<usize> {
        let chunk_type = chunk_type.into();
        self.chunks.iter().position(|c| c.chunk_type == chunk_type)
    }

    /// First chunk of the given type
    pub fn first_of(&self, chunk_type: impl Into<ChunkType>) -> Option<&Chunk> {
        self.position(chunk_type).map(|i| &self.chunks[i])
    }

    /// Append a chunk
    pub fn push(&mut self, chunk: Chunk) {
        self.chunks.push(chunk);
    }

    /// Insert a chunk at `index`, shifting later chunks back
    pub fn insert(&mut self, index: usize, chunk: Chunk) -> Result<()> {
        if index > self.chunks.len() {
            return Err(self.out_of_range(index));
        }
        self.chunks.insert(index, chunk);
        Ok(())
    }

    /// Replace the chunk at `index`, returning the old one
    pub fn replace(&mut self, index: usize, chunk: Chunk) -> Result<Chunk> {
        match self.chunks.get_mut(index) {
            Some(slot) => Ok(std::mem::replace(slot, chunk)),
            None => Err(self.out_of_range(index)),
        }
    }

    /// Remove the chunk at `index`
    pub fn remove(&mut self, index: usize) -> Result<Chunk> {
        if index >= self.chunks.len() {
            return Err(self.out_of_range(index));
        }
        Ok(self.chunks.remove(index))
    }

    fn out_of_range(&self, index: usize) -> Error {
        Error::ChunkIndexOutOfRange {
            index,
            len: self.chunks.len(),
        }
    }

    /// Write the signature followed by every chunk
    ///
    /// Stops at the first chunk that fails to encode; bytes of the chunks
    /// before it have already reached `writer`. Use [`to_bytes`](Self::to_bytes)
    /// to stage the output when that matters.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&PNG_SIGNATURE)?;

        for chunk in &self.chunks {
            chunk.write_to(writer)?;
        }

        log::debug!("wrote {} chunks", self.chunks.len());
        Ok(())
    }

    /// Encode the whole stream into a new buffer
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let size = PNG_SIGNATURE.len() as u64
            + self.chunks.iter().map(Chunk::encoded_len).sum::<u64>();
        let mut buf = Vec::with_capacity(usize::try_from(size).unwrap_or(0));
        self.write(&mut buf)?;
        Ok(buf)
    }
}

impl From<Vec<Chunk>> for ChunkSlice {
    fn from(chunks: Vec<Chunk>) -> Self {
        Self::from_chunks(chunks)
    }
}

impl fmt::Display for ChunkSlice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkSlice<LEN=({})>", self.chunks.len())
    }
}
