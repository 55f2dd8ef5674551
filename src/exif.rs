//! EXIF (`eXIf`) chunk handling
//!
//! PNG stores EXIF as raw TIFF data in a single `eXIf` chunk, without the
//! `Exif\0\0` prefix JPEG uses. The payload itself is opaque here: decoding
//! and encoding tag structures is delegated to a [`MetadataCodec`]. With the
//! `exif` feature, [`TiffCodec`](crate::TiffCodec) is available as one.
//!
//! Only the first `eXIf` chunk is ever read or replaced. Any later ones are
//! left untouched.

use crate::{
    chunk::{Chunk, EXIF},
    chunks::ChunkSlice,
    error::{Error, Result},
};

/// Byte order of a TIFF/EXIF payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    /// `II` (Intel)
    LittleEndian,
    /// `MM` (Motorola)
    BigEndian,
}

impl ByteOrder {
    /// TIFF magic number following the byte-order mark
    pub const TIFF_MAGIC: u16 = 0x002A;

    /// Detect the byte order from a TIFF header, checking the magic number
    pub fn detect(payload: &[u8]) -> Option<Self> {
        if payload.len() < 4 {
            return None;
        }

        let (order, magic) = match &payload[0..2] {
            b"II" => (
                ByteOrder::LittleEndian,
                u16::from_le_bytes([payload[2], payload[3]]),
            ),
            b"MM" => (
                ByteOrder::BigEndian,
                u16::from_be_bytes([payload[2], payload[3]]),
            ),
            _ => return None,
        };

        (magic == Self::TIFF_MAGIC).then_some(order)
    }

    /// Two-byte mark written at the start of a TIFF header
    pub fn mark(&self) -> &'static [u8; 2] {
        match self {
            ByteOrder::LittleEndian => b"II",
            ByteOrder::BigEndian => b"MM",
        }
    }
}

/// Tag-level EXIF codec the chunk operations delegate to
///
/// The chunk layer only moves payload bytes and the handles below around; it
/// never looks at individual tags.
pub trait MetadataCodec {
    /// Mutable tag tree used to build a payload
    type Builder;
    /// Decoded, read-only root of a payload
    type Root;
    /// Result of a lightweight [`collect`](Self::collect) pass
    type Index;
    /// Which kind of root a fresh builder represents
    type Kind;
    /// Codec failure, surfaced as [`Error::PayloadDecode`] / [`Error::PayloadEncode`]
    type Error: std::error::Error + Send + Sync + 'static;

    /// Parse a payload into a builder seeded with its tags and its decoded root
    fn decode(
        &self,
        payload: &[u8],
        byte_order: ByteOrder,
    ) -> std::result::Result<(Self::Builder, Self::Root), Self::Error>;

    /// Lightweight parse of a payload
    fn collect(&self, payload: &[u8]) -> std::result::Result<Self::Index, Self::Error>;

    /// Create an empty builder
    fn new_builder(&self, kind: Self::Kind, byte_order: ByteOrder) -> Self::Builder;

    /// Serialize a builder into payload bytes
    fn encode(&self, builder: &Self::Builder) -> std::result::Result<Vec<u8>, Self::Error>;
}

impl ChunkSlice {
    /// First `eXIf` chunk
    pub fn find_exif(&self) -> Result<&Chunk> {
        self.first_of(EXIF).ok_or(Error::ExifNotFound)
    }

    /// Raw `eXIf` payload and the byte order declared by its TIFF header
    pub fn exif_payload(&self) -> Result<(&[u8], ByteOrder)> {
        let chunk = self.find_exif()?;
        let byte_order = ByteOrder::detect(&chunk.data).ok_or_else(|| {
            Error::PayloadDecode("EXIF payload does not start with a TIFF header".into())
        })?;
        Ok((&chunk.data, byte_order))
    }

    /// Decode the `eXIf` payload, returning its root and the raw bytes
    pub fn exif<C: MetadataCodec>(&self, codec: &C) -> Result<(C::Root, &[u8])> {
        let (payload, byte_order) = self.exif_payload()?;
        let (_, root) = codec
            .decode(payload, byte_order)
            .map_err(|e| Error::PayloadDecode(Box::new(e)))?;
        Ok((root, payload))
    }

    /// Builder seeded with the tags of the existing `eXIf` chunk
    ///
    /// Fails with [`Error::ExifNotFound`] when there is none; start from
    /// [`MetadataCodec::new_builder`] in that case.
    pub fn construct_exif_builder<C: MetadataCodec>(&self, codec: &C) -> Result<C::Builder> {
        let (payload, byte_order) = self.exif_payload()?;
        let (builder, _) = codec
            .decode(payload, byte_order)
            .map_err(|e| Error::PayloadDecode(Box::new(e)))?;
        Ok(builder)
    }

    /// Encode `builder` and store it as the `eXIf` chunk
    ///
    /// An existing `eXIf` chunk is replaced in place, keeping its position and
    /// offset. Otherwise a new chunk is inserted directly after the first chunk
    /// (IHDR); its offset is 0 until the stream is parsed again.
    pub fn set_exif<C: MetadataCodec>(&mut self, codec: &C, builder: &C::Builder) -> Result<()> {
        let payload = codec
            .encode(builder)
            .map_err(|e| Error::PayloadEncode(Box::new(e)))?;

        match self.position(EXIF) {
            Some(index) => {
                self.chunks_mut()[index].set_data(payload)?;
                log::debug!("replaced eXIf chunk at index {}", index);
            }
            None => {
                let index = self.len().min(1);
                self.insert(index, Chunk::new(EXIF, payload)?)?;
                log::debug!("inserted eXIf chunk at index {}", index);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::{IDAT, IEND, IHDR};
    use std::io;

    /// Stores the builder bytes verbatim after a big-endian TIFF header
    struct RawCodec;

    impl MetadataCodec for RawCodec {
        type Builder = Vec<u8>;
        type Root = Vec<u8>;
        type Index = usize;
        type Kind = ();
        type Error = io::Error;

        fn decode(&self, payload: &[u8], _: ByteOrder) -> io::Result<(Vec<u8>, Vec<u8>)> {
            let body = payload
                .get(4..)
                .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "short payload"))?;
            Ok((body.to_vec(), body.to_vec()))
        }

        fn collect(&self, payload: &[u8]) -> io::Result<usize> {
            Ok(payload.len().saturating_sub(4))
        }

        fn new_builder(&self, _: (), _: ByteOrder) -> Vec<u8> {
            Vec::new()
        }

        fn encode(&self, builder: &Vec<u8>) -> io::Result<Vec<u8>> {
            if builder.is_empty() {
                return Err(io::Error::new(io::ErrorKind::InvalidInput, "nothing to encode"));
            }
            let mut out = b"MM\x00\x2a".to_vec();
            out.extend_from_slice(builder);
            Ok(out)
        }
    }

    fn basic() -> ChunkSlice {
        ChunkSlice::from_chunks(vec![
            Chunk::new(IHDR, vec![0; 13]).unwrap(),
            Chunk::new(IDAT, vec![1, 2, 3]).unwrap(),
            Chunk::new(IEND, Vec::new()).unwrap(),
        ])
    }

    #[test]
    fn test_detect_byte_order() {
        assert_eq!(ByteOrder::detect(b"II\x2a\x00"), Some(ByteOrder::LittleEndian));
        assert_eq!(ByteOrder::detect(b"MM\x00\x2a"), Some(ByteOrder::BigEndian));
        assert_eq!(ByteOrder::detect(b"MM\x2a\x00"), None);
        assert_eq!(ByteOrder::detect(b"Exif\0\0"), None);
        assert_eq!(ByteOrder::detect(b"MM"), None);
    }

    #[test]
    fn test_find_exif_miss() {
        let slice = basic();
        let err = slice.find_exif().unwrap_err();
        assert!(err.is_not_found());
        assert!(matches!(slice.exif_payload(), Err(Error::ExifNotFound)));
        assert!(matches!(
            slice.construct_exif_builder(&RawCodec),
            Err(Error::ExifNotFound)
        ));
    }

    #[test]
    fn test_set_exif_inserts_after_header_then_replaces() {
        let mut slice = basic();

        slice.set_exif(&RawCodec, &vec![1, 2, 3]).unwrap();
        assert_eq!(slice.len(), 4);
        assert_eq!(slice.chunks()[1].chunk_type, EXIF);
        assert_eq!(slice.chunks()[1].data, b"MM\x00\x2a\x01\x02\x03");
        assert_eq!(slice.chunks()[1].length, 7);
        assert!(slice.chunks()[1].check_crc());

        slice.set_exif(&RawCodec, &vec![9; 20]).unwrap();
        assert_eq!(slice.len(), 4);
        let types: Vec<_> = slice.chunks().iter().map(|c| c.chunk_type).collect();
        assert_eq!(types, vec![IHDR, EXIF, IDAT, IEND]);
        assert_eq!(slice.chunks()[1].length, 24);
        assert!(slice.chunks()[1].check_crc());
    }

    #[test]
    fn test_set_exif_on_empty_slice() {
        let mut slice = ChunkSlice::new();
        slice.set_exif(&RawCodec, &vec![1]).unwrap();
        assert_eq!(slice.len(), 1);
        assert_eq!(slice.chunks()[0].chunk_type, EXIF);
    }

    #[test]
    fn test_set_exif_encode_failure_leaves_slice_alone() {
        let mut slice = basic();
        let before = slice.clone();

        let result = slice.set_exif(&RawCodec, &Vec::new());
        assert!(matches!(result, Err(Error::PayloadEncode(_))));
        assert_eq!(slice, before);
    }

    #[test]
    fn test_only_first_exif_chunk_is_used() {
        let mut slice = basic();
        slice
            .insert(1, Chunk::new(EXIF, b"MM\x00\x2afirst".to_vec()).unwrap())
            .unwrap();
        slice
            .insert(3, Chunk::new(EXIF, b"MM\x00\x2asecond".to_vec()).unwrap())
            .unwrap();

        let (root, raw) = slice.exif(&RawCodec).unwrap();
        assert_eq!(root, b"first");
        assert_eq!(raw, b"MM\x00\x2afirst");

        slice.set_exif(&RawCodec, &b"third".to_vec()).unwrap();
        assert_eq!(slice.chunks()[1].data, b"MM\x00\x2athird");
        assert_eq!(slice.chunks()[3].data, b"MM\x00\x2asecond");
    }

    #[test]
    fn test_construct_exif_builder_round_trip() {
        let mut slice = basic();
        slice.set_exif(&RawCodec, &vec![7, 7]).unwrap();

        let mut builder = slice.construct_exif_builder(&RawCodec).unwrap();
        assert_eq!(builder, vec![7, 7]);
        builder.push(8);

        slice.set_exif(&RawCodec, &builder).unwrap();
        let (payload, order) = slice.exif_payload().unwrap();
        assert_eq!(order, ByteOrder::BigEndian);
        assert_eq!(RawCodec.collect(payload).unwrap(), 3);
    }

    #[test]
    fn test_exif_payload_without_tiff_header() {
        let mut slice = basic();
        slice
            .insert(1, Chunk::new(EXIF, b"garbage".to_vec()).unwrap())
            .unwrap();
        assert!(matches!(slice.exif_payload(), Err(Error::PayloadDecode(_))));
    }
}
