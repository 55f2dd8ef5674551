//! Minimal TIFF/EXIF codec
//!
//! [`TiffCodec`] implements [`MetadataCodec`] for the raw TIFF data stored in
//! PNG `eXIf` chunks.
//!
//! TIFF Structure:
//! - Header: byte order (II/MM), magic (0x002A), IFD offset
//! - IFD (Image File Directory): tag count, tags (12 bytes each), next IFD offset
//! - Tags: tag ID (2), type (2), count (4), value/offset (4)
//!
//! IFD0, the sub-IFDs it points to (EXIF, GPS, interoperability) and the
//! directories chained after it (IFD1 with its JPEG thumbnail) are carried
//! through a decode/encode cycle. Every IFD offset is read at most once.

use crate::exif::{ByteOrder, MetadataCodec};
use byteorder::{BigEndian as BE, ByteOrder as _, LittleEndian as LE};
use std::collections::HashSet;

/// TIFF/EXIF tag IDs
pub mod tags {
    // IFD0 (main image) tags
    pub const IMAGE_WIDTH: u16 = 0x0100;
    pub const IMAGE_LENGTH: u16 = 0x0101;
    pub const BITS_PER_SAMPLE: u16 = 0x0102;
    pub const COMPRESSION: u16 = 0x0103;
    pub const MAKE: u16 = 0x010F;
    pub const MODEL: u16 = 0x0110;
    pub const ORIENTATION: u16 = 0x0112;
    pub const X_RESOLUTION: u16 = 0x011A;
    pub const Y_RESOLUTION: u16 = 0x011B;
    pub const SOFTWARE: u16 = 0x0131;
    pub const DATE_TIME: u16 = 0x0132;
    pub const ARTIST: u16 = 0x013B;
    pub const COPYRIGHT: u16 = 0x8298;

    // IFD1 (thumbnail) tags
    pub const JPEG_INTERCHANGE_FORMAT: u16 = 0x0201;
    pub const JPEG_INTERCHANGE_FORMAT_LENGTH: u16 = 0x0202;

    // Sub-IFD pointers
    pub const EXIF_IFD_POINTER: u16 = 0x8769;
    pub const GPS_IFD_POINTER: u16 = 0x8825;
    pub const INTEROP_IFD_POINTER: u16 = 0xA005;

    // EXIF sub-IFD tags
    pub const EXPOSURE_TIME: u16 = 0x829A;
    pub const F_NUMBER: u16 = 0x829D;
    pub const ISO_SPEED: u16 = 0x8827;
    pub const EXIF_VERSION: u16 = 0x9000;
    pub const DATE_TIME_ORIGINAL: u16 = 0x9003;
    pub const FOCAL_LENGTH: u16 = 0x920A;
}

/// TIFF data types
mod types {
    pub const BYTE: u16 = 1;
    pub const ASCII: u16 = 2;
    pub const SHORT: u16 = 3;
    pub const LONG: u16 = 4;
    pub const RATIONAL: u16 = 5;
    pub const UNDEFINED: u16 = 7;
    pub const IFD: u16 = 13;

    /// Size of one value of the given type, None for unknown types
    pub fn unit_size(type_id: u16) -> Option<u64> {
        match type_id {
            1 | 2 | 6 | 7 => Some(1),  // BYTE, ASCII, SBYTE, UNDEFINED
            3 | 8 => Some(2),          // SHORT, SSHORT
            4 | 9 | 11 | 13 => Some(4), // LONG, SLONG, FLOAT, IFD
            5 | 10 | 12 => Some(8),    // RATIONAL, SRATIONAL, DOUBLE
            _ => None,
        }
    }
}

/// Maximum number of tags in an IFD (prevents DOS attacks)
pub const MAX_IFD_TAGS: u16 = 1000;

/// Maximum sub-IFD nesting below IFD0
const MAX_IFD_DEPTH: usize = 4;

/// Maximum number of directories followed after IFD0
const MAX_CHAINED_IFDS: usize = 4;

/// Size of the TIFF header
const TIFF_HEADER_SIZE: usize = 8;

/// Errors raised by [`TiffCodec`]
#[derive(Debug, thiserror::Error)]
pub enum TiffError {
    /// Missing or unrecognized TIFF header
    #[error("Invalid TIFF header")]
    InvalidHeader,

    /// Header byte order differs from the one the caller expected
    #[error("Byte order mismatch: payload is {found:?}, expected {expected:?}")]
    ByteOrderMismatch { expected: ByteOrder, found: ByteOrder },

    /// A referenced range lies outside the payload
    #[error("Range {offset}+{size} out of bounds (payload is {len} bytes)")]
    OutOfBounds { offset: u64, size: u64, len: usize },

    /// Suspiciously large tag count
    #[error("IFD at offset {offset} has too many tags: {count}")]
    TooManyTags { offset: u64, count: usize },

    /// Sub-IFDs nested deeper than supported
    #[error("IFD nesting deeper than {0} levels")]
    TooDeep(usize),

    /// Two pointers (or a pointer and the IFD chain) lead to the same IFD
    #[error("IFD at offset {0} is referenced more than once")]
    RepeatedIfd(u64),

    /// Tag added twice to the same IFD
    #[error("Duplicate tag {0:#06x}")]
    DuplicateTag(u16),

    /// A sub-IFD pointer tag holds a plain value
    #[error("Tag {0:#06x} must hold a sub-IFD")]
    InvalidPointer(u16),

    /// Encoded data would not be addressable with 32-bit offsets
    #[error("Encoded EXIF data too large")]
    TooLarge,
}

type Result<T> = std::result::Result<T, TiffError>;

impl ByteOrder {
    fn read_u16(&self, data: &[u8]) -> u16 {
        match self {
            ByteOrder::LittleEndian => LE::read_u16(data),
            ByteOrder::BigEndian => BE::read_u16(data),
        }
    }

    fn read_u32(&self, data: &[u8]) -> u32 {
        match self {
            ByteOrder::LittleEndian => LE::read_u32(data),
            ByteOrder::BigEndian => BE::read_u32(data),
        }
    }

    fn u16_bytes(&self, value: u16) -> [u8; 2] {
        let mut buf = [0u8; 2];
        match self {
            ByteOrder::LittleEndian => LE::write_u16(&mut buf, value),
            ByteOrder::BigEndian => BE::write_u16(&mut buf, value),
        }
        buf
    }

    fn u32_bytes(&self, value: u32) -> [u8; 4] {
        let mut buf = [0u8; 4];
        match self {
            ByteOrder::LittleEndian => LE::write_u32(&mut buf, value),
            ByteOrder::BigEndian => BE::write_u32(&mut buf, value),
        }
        buf
    }
}

/// Which directory an IFD represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IfdKind {
    /// IFD0
    Root,
    /// EXIF sub-IFD
    Exif,
    /// GPS sub-IFD
    Gps,
    /// Interoperability sub-IFD
    Interop,
}

impl IfdKind {
    /// Kind of sub-IFD a pointer tag refers to
    pub fn for_pointer(tag_id: u16) -> Option<Self> {
        match tag_id {
            tags::EXIF_IFD_POINTER => Some(IfdKind::Exif),
            tags::GPS_IFD_POINTER => Some(IfdKind::Gps),
            tags::INTEROP_IFD_POINTER => Some(IfdKind::Interop),
            _ => None,
        }
    }
}

/// Value of a single tag
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Byte(Vec<u8>),
    /// Stored without the trailing NUL; non-UTF-8 bytes are replaced on decode
    Ascii(String),
    Short(Vec<u16>),
    Long(Vec<u32>),
    /// Numerator/denominator pairs
    Rational(Vec<(u32, u32)>),
    Undefined(Vec<u8>),
    /// Nested directory behind a pointer tag
    SubIfd(Vec<IfdEntry>),
    /// Types without a dedicated variant, kept as raw bytes in payload byte order
    Other { type_id: u16, count: u32, data: Vec<u8> },
}

impl TagValue {
    fn from_raw(type_id: u16, count: u32, raw: &[u8], order: ByteOrder) -> Self {
        match type_id {
            types::BYTE => TagValue::Byte(raw.to_vec()),
            types::ASCII => TagValue::Ascii(
                String::from_utf8_lossy(raw)
                    .trim_end_matches('\0')
                    .to_string(),
            ),
            types::SHORT => {
                TagValue::Short(raw.chunks_exact(2).map(|c| order.read_u16(c)).collect())
            }
            types::LONG => {
                TagValue::Long(raw.chunks_exact(4).map(|c| order.read_u32(c)).collect())
            }
            types::RATIONAL => TagValue::Rational(
                raw.chunks_exact(8)
                    .map(|c| (order.read_u32(&c[0..4]), order.read_u32(&c[4..8])))
                    .collect(),
            ),
            types::UNDEFINED => TagValue::Undefined(raw.to_vec()),
            _ => TagValue::Other {
                type_id,
                count,
                data: raw.to_vec(),
            },
        }
    }

    /// TIFF type ID used when encoding
    pub fn type_id(&self) -> u16 {
        match self {
            TagValue::Byte(_) => types::BYTE,
            TagValue::Ascii(_) => types::ASCII,
            TagValue::Short(_) => types::SHORT,
            TagValue::Long(_) | TagValue::SubIfd(_) => types::LONG,
            TagValue::Rational(_) => types::RATIONAL,
            TagValue::Undefined(_) => types::UNDEFINED,
            TagValue::Other { type_id, .. } => *type_id,
        }
    }

    fn count(&self) -> usize {
        match self {
            TagValue::Byte(v) | TagValue::Undefined(v) => v.len(),
            TagValue::Ascii(s) => s.len() + 1,
            TagValue::Short(v) => v.len(),
            TagValue::Long(v) => v.len(),
            TagValue::Rational(v) => v.len(),
            TagValue::SubIfd(_) => 1,
            TagValue::Other { count, .. } => *count as usize,
        }
    }

    fn to_bytes(&self, order: ByteOrder) -> Vec<u8> {
        match self {
            TagValue::Byte(v) | TagValue::Undefined(v) => v.clone(),
            TagValue::Ascii(s) => {
                let mut bytes = s.as_bytes().to_vec();
                bytes.push(0);
                bytes
            }
            TagValue::Short(v) => v.iter().flat_map(|&x| order.u16_bytes(x)).collect(),
            TagValue::Long(v) => v.iter().flat_map(|&x| order.u32_bytes(x)).collect(),
            TagValue::Rational(v) => v
                .iter()
                .flat_map(|&(n, d)| order.u32_bytes(n).into_iter().chain(order.u32_bytes(d)))
                .collect(),
            TagValue::SubIfd(_) => vec![0; 4],
            TagValue::Other { data, .. } => data.clone(),
        }
    }
}

/// One tag of an IFD
#[derive(Debug, Clone, PartialEq)]
pub struct IfdEntry {
    pub tag_id: u16,
    pub value: TagValue,
}

fn find(entries: &[IfdEntry], tag_id: u16) -> Option<&TagValue> {
    entries.iter().find(|e| e.tag_id == tag_id).map(|e| &e.value)
}

/// Directory chained after IFD0 through the next-IFD offset
///
/// A JPEG thumbnail referenced by `JPEGInterchangeFormat` and
/// `JPEGInterchangeFormatLength` is held as bytes in `thumbnail`; those two
/// tags are not part of `entries` and are rewritten on encode.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChainedIfd {
    pub entries: Vec<IfdEntry>,
    pub thumbnail: Option<Vec<u8>>,
}

/// Decoded, read-only IFD
#[derive(Debug, Clone, PartialEq)]
pub struct Ifd {
    pub byte_order: ByteOrder,
    pub kind: IfdKind,
    /// Entries in payload order
    pub entries: Vec<IfdEntry>,
    /// IFD1 onwards
    pub chained: Vec<ChainedIfd>,
}

impl Ifd {
    /// Value of `tag_id` in this IFD
    pub fn get(&self, tag_id: u16) -> Option<&TagValue> {
        find(&self.entries, tag_id)
    }

    /// Entries of the sub-IFD of the given kind
    pub fn sub_ifd(&self, kind: IfdKind) -> Option<&[IfdEntry]> {
        self.entries.iter().find_map(|e| match &e.value {
            TagValue::SubIfd(entries) if IfdKind::for_pointer(e.tag_id) == Some(kind) => {
                Some(entries.as_slice())
            }
            _ => None,
        })
    }

    /// Builder seeded with this IFD's entries
    pub fn to_builder(&self) -> IfdBuilder {
        IfdBuilder {
            byte_order: self.byte_order,
            kind: self.kind,
            entries: self.entries.clone(),
            chained: self.chained.clone(),
        }
    }
}

/// Mutable IFD used to produce an EXIF payload
#[derive(Debug, Clone, PartialEq)]
pub struct IfdBuilder {
    byte_order: ByteOrder,
    kind: IfdKind,
    entries: Vec<IfdEntry>,
    chained: Vec<ChainedIfd>,
}

impl IfdBuilder {
    /// Create an empty builder
    pub fn new(kind: IfdKind, byte_order: ByteOrder) -> Self {
        Self {
            byte_order,
            kind,
            entries: Vec::new(),
            chained: Vec::new(),
        }
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn kind(&self) -> IfdKind {
        self.kind
    }

    /// Entries in insertion order (encoding sorts them by tag ID)
    pub fn entries(&self) -> &[IfdEntry] {
        &self.entries
    }

    /// Add a tag that is not present yet
    pub fn add(&mut self, tag_id: u16, value: TagValue) -> Result<()> {
        if self.get(tag_id).is_some() {
            return Err(TiffError::DuplicateTag(tag_id));
        }
        self.entries.push(IfdEntry { tag_id, value });
        Ok(())
    }

    /// Replace a tag's value, adding it if missing; returns the old value
    pub fn set(&mut self, tag_id: u16, value: TagValue) -> Option<TagValue> {
        match self.entries.iter_mut().find(|e| e.tag_id == tag_id) {
            Some(entry) => Some(std::mem::replace(&mut entry.value, value)),
            None => {
                self.entries.push(IfdEntry { tag_id, value });
                None
            }
        }
    }

    pub fn get(&self, tag_id: u16) -> Option<&TagValue> {
        find(&self.entries, tag_id)
    }

    /// Directories written after IFD0, in chain order
    pub fn chained(&self) -> &[ChainedIfd] {
        &self.chained
    }

    pub fn chained_mut(&mut self) -> &mut Vec<ChainedIfd> {
        &mut self.chained
    }

    pub fn remove(&mut self, tag_id: u16) -> Option<TagValue> {
        let index = self.entries.iter().position(|e| e.tag_id == tag_id)?;
        Some(self.entries.remove(index).value)
    }
}

struct IfdReader<'a> {
    data: &'a [u8],
    order: ByteOrder,
    visited: HashSet<u64>,
}

impl<'a> IfdReader<'a> {
    fn slice(&self, offset: u64, size: u64) -> Result<&'a [u8]> {
        let out_of_bounds = || TiffError::OutOfBounds {
            offset,
            size,
            len: self.data.len(),
        };
        let end = offset.checked_add(size).ok_or_else(out_of_bounds)?;
        if end > self.data.len() as u64 {
            return Err(out_of_bounds());
        }
        Ok(&self.data[offset as usize..end as usize])
    }

    /// Read the IFD at `offset`, returning its entries and the next-IFD offset
    fn read_ifd(&mut self, offset: u32, depth: usize) -> Result<(Vec<IfdEntry>, u32)> {
        if depth > MAX_IFD_DEPTH {
            return Err(TiffError::TooDeep(MAX_IFD_DEPTH));
        }

        let offset = offset as u64;
        if !self.visited.insert(offset) {
            return Err(TiffError::RepeatedIfd(offset));
        }

        let tag_count = self.order.read_u16(self.slice(offset, 2)?);

        // Validate tag count to prevent DOS attacks
        if tag_count > MAX_IFD_TAGS {
            return Err(TiffError::TooManyTags {
                offset,
                count: tag_count as usize,
            });
        }

        let table = self.slice(offset + 2, tag_count as u64 * 12)?;
        let mut entries = Vec::with_capacity(tag_count as usize);
        let mut seen = HashSet::new();

        for tag_bytes in table.chunks_exact(12) {
            let tag_id = self.order.read_u16(&tag_bytes[0..2]);
            let type_id = self.order.read_u16(&tag_bytes[2..4]);
            let count = self.order.read_u32(&tag_bytes[4..8]);

            let Some(unit) = types::unit_size(type_id) else {
                log::warn!("skipping tag {:#06x} with unknown type {}", tag_id, type_id);
                continue;
            };

            // The first occurrence wins; encoding requires unique tags
            if !seen.insert(tag_id) {
                log::warn!("skipping duplicate tag {:#06x} at offset {}", tag_id, offset);
                continue;
            }

            let size = unit * count as u64;
            let raw = if size <= 4 {
                // Value is inline in the tag
                &tag_bytes[8..8 + size as usize]
            } else {
                let value_offset = self.order.read_u32(&tag_bytes[8..12]);
                self.slice(value_offset as u64, size)?
            };

            let is_pointer = IfdKind::for_pointer(tag_id).is_some()
                && (type_id == types::LONG || type_id == types::IFD)
                && count == 1;

            let value = if is_pointer {
                let (children, _) = self.read_ifd(self.order.read_u32(raw), depth + 1)?;
                TagValue::SubIfd(children)
            } else if IfdKind::for_pointer(tag_id).is_some() {
                log::warn!(
                    "skipping pointer tag {:#06x} with type {} and count {}",
                    tag_id,
                    type_id,
                    count
                );
                continue;
            } else {
                TagValue::from_raw(type_id, count, raw, self.order)
            };

            entries.push(IfdEntry { tag_id, value });
        }

        // Some writers omit the next-IFD offset entirely
        let next = self
            .slice(offset + 2 + tag_count as u64 * 12, 4)
            .map(|b| self.order.read_u32(b))
            .unwrap_or(0);

        Ok((entries, next))
    }

    /// Read a directory of the IFD chain, pulling out its JPEG thumbnail
    fn read_chained(&mut self, offset: u32) -> Result<(ChainedIfd, u32)> {
        let (mut entries, next) = self.read_ifd(offset, 0)?;

        let start = find(&entries, tags::JPEG_INTERCHANGE_FORMAT).and_then(single_u32);
        let len = find(&entries, tags::JPEG_INTERCHANGE_FORMAT_LENGTH).and_then(single_u32);
        let thumbnail = match (start, len) {
            (Some(start), Some(len)) => match self.slice(start as u64, len as u64) {
                Ok(bytes) => Some(bytes.to_vec()),
                Err(e) => {
                    log::warn!("dropping thumbnail of IFD at offset {}: {}", offset, e);
                    None
                }
            },
            _ => None,
        };

        // Offsets into the old payload are meaningless once re-encoded
        entries.retain(|e| {
            e.tag_id != tags::JPEG_INTERCHANGE_FORMAT
                && e.tag_id != tags::JPEG_INTERCHANGE_FORMAT_LENGTH
        });

        Ok((ChainedIfd { entries, thumbnail }, next))
    }
}

fn single_u32(value: &TagValue) -> Option<u32> {
    match value {
        TagValue::Long(v) if v.len() == 1 => Some(v[0]),
        TagValue::Short(v) if v.len() == 1 => Some(v[0] as u32),
        _ => None,
    }
}

/// Parse a TIFF payload into its root IFD
pub fn parse_tiff(payload: &[u8]) -> Result<Ifd> {
    let byte_order = ByteOrder::detect(payload).ok_or(TiffError::InvalidHeader)?;
    if payload.len() < TIFF_HEADER_SIZE {
        return Err(TiffError::InvalidHeader);
    }

    let mut reader = IfdReader {
        data: payload,
        order: byte_order,
        visited: HashSet::new(),
    };
    let ifd0_offset = byte_order.read_u32(&payload[4..8]);
    let (entries, mut next) = reader.read_ifd(ifd0_offset, 0)?;

    let mut chained = Vec::new();
    while next != 0 {
        if chained.len() == MAX_CHAINED_IFDS {
            log::warn!("ignoring IFD chain beyond {} directories", MAX_CHAINED_IFDS);
            break;
        }
        match reader.read_chained(next) {
            Ok((ifd, following)) => {
                chained.push(ifd);
                next = following;
            }
            Err(e) => {
                log::warn!("ignoring IFD chain from offset {}: {}", next, e);
                break;
            }
        }
    }

    Ok(Ifd {
        byte_order,
        kind: IfdKind::Root,
        entries,
        chained,
    })
}

struct IfdWriter {
    out: Vec<u8>,
    order: ByteOrder,
}

impl IfdWriter {
    fn offset(&self) -> Result<u32> {
        u32::try_from(self.out.len()).map_err(|_| TiffError::TooLarge)
    }

    // Values and IFDs start on word boundaries
    fn align(&mut self) {
        if self.out.len() % 2 != 0 {
            self.out.push(0);
        }
    }

    fn patch(&mut self, pos: usize, bytes: &[u8]) {
        self.out[pos..pos + bytes.len()].copy_from_slice(bytes);
    }

    /// Write an IFD (plus its values and sub-IFDs)
    ///
    /// Returns the IFD's offset and the position of its next-IFD field.
    fn write_ifd(&mut self, entries: &[IfdEntry], depth: usize) -> Result<(u32, usize)> {
        if depth > MAX_IFD_DEPTH {
            return Err(TiffError::TooDeep(MAX_IFD_DEPTH));
        }

        self.align();
        let ifd_pos = self.out.len();
        let ifd_offset = self.offset()?;

        if entries.len() > MAX_IFD_TAGS as usize {
            return Err(TiffError::TooManyTags {
                offset: ifd_offset as u64,
                count: entries.len(),
            });
        }

        let mut sorted: Vec<&IfdEntry> = entries.iter().collect();
        sorted.sort_by_key(|e| e.tag_id);
        if let Some(pair) = sorted.windows(2).find(|w| w[0].tag_id == w[1].tag_id) {
            return Err(TiffError::DuplicateTag(pair[0].tag_id));
        }

        // Reserve the table; values follow it
        self.out.resize(ifd_pos + 2 + sorted.len() * 12 + 4, 0);
        let order = self.order;
        self.patch(ifd_pos, &order.u16_bytes(sorted.len() as u16));

        let mut children = Vec::new();
        for (i, entry) in sorted.iter().enumerate() {
            let entry_pos = ifd_pos + 2 + i * 12;
            let value = &entry.value;

            match value {
                TagValue::SubIfd(sub) => children.push((entry_pos + 8, sub)),
                _ if IfdKind::for_pointer(entry.tag_id).is_some() => {
                    return Err(TiffError::InvalidPointer(entry.tag_id));
                }
                _ => {}
            }

            let count = u32::try_from(value.count()).map_err(|_| TiffError::TooLarge)?;
            let bytes = value.to_bytes(order);

            let mut field = [0u8; 4];
            if bytes.len() <= 4 {
                field[..bytes.len()].copy_from_slice(&bytes);
            } else {
                self.align();
                field = order.u32_bytes(self.offset()?);
                self.out.extend_from_slice(&bytes);
            }

            self.patch(entry_pos, &order.u16_bytes(entry.tag_id));
            self.patch(entry_pos + 2, &order.u16_bytes(value.type_id()));
            self.patch(entry_pos + 4, &order.u32_bytes(count));
            self.patch(entry_pos + 8, &field);
        }

        // Next-IFD offset stays 0 unless a chained IFD is linked in
        let next_pos = ifd_pos + 2 + sorted.len() * 12;

        for (pointer_pos, sub) in children {
            let (child_offset, _) = self.write_ifd(sub, depth + 1)?;
            self.patch(pointer_pos, &order.u32_bytes(child_offset));
        }

        Ok((ifd_offset, next_pos))
    }

    /// Write a chained IFD, its thumbnail bytes going first
    fn write_chained(&mut self, ifd: &ChainedIfd) -> Result<(u32, usize)> {
        let Some(thumbnail) = &ifd.thumbnail else {
            return self.write_ifd(&ifd.entries, 0);
        };

        self.align();
        let start = self.offset()?;
        let len = u32::try_from(thumbnail.len()).map_err(|_| TiffError::TooLarge)?;
        self.out.extend_from_slice(thumbnail);

        let mut entries: Vec<IfdEntry> = ifd
            .entries
            .iter()
            .filter(|e| {
                e.tag_id != tags::JPEG_INTERCHANGE_FORMAT
                    && e.tag_id != tags::JPEG_INTERCHANGE_FORMAT_LENGTH
            })
            .cloned()
            .collect();
        entries.push(IfdEntry {
            tag_id: tags::JPEG_INTERCHANGE_FORMAT,
            value: TagValue::Long(vec![start]),
        });
        entries.push(IfdEntry {
            tag_id: tags::JPEG_INTERCHANGE_FORMAT_LENGTH,
            value: TagValue::Long(vec![len]),
        });

        self.write_ifd(&entries, 0)
    }
}

/// Encode a builder as a TIFF payload rooted at the builder's IFD
pub fn encode_tiff(builder: &IfdBuilder) -> Result<Vec<u8>> {
    let order = builder.byte_order;
    let mut writer = IfdWriter {
        out: Vec::with_capacity(256),
        order,
    };

    writer.out.extend_from_slice(order.mark());
    writer.out.extend_from_slice(&order.u16_bytes(ByteOrder::TIFF_MAGIC));
    writer
        .out
        .extend_from_slice(&order.u32_bytes(TIFF_HEADER_SIZE as u32));

    let (_, mut next_pos) = writer.write_ifd(&builder.entries, 0)?;
    for ifd in &builder.chained {
        let (offset, following) = writer.write_chained(ifd)?;
        writer.patch(next_pos, &order.u32_bytes(offset));
        next_pos = following;
    }

    Ok(writer.out)
}

/// EXIF codec for PNG `eXIf` payloads
#[derive(Debug, Clone, Copy, Default)]
pub struct TiffCodec;

impl MetadataCodec for TiffCodec {
    type Builder = IfdBuilder;
    type Root = Ifd;
    type Index = Ifd;
    type Kind = IfdKind;
    type Error = TiffError;

    fn decode(&self, payload: &[u8], byte_order: ByteOrder) -> Result<(IfdBuilder, Ifd)> {
        let root = parse_tiff(payload)?;
        if root.byte_order != byte_order {
            return Err(TiffError::ByteOrderMismatch {
                expected: byte_order,
                found: root.byte_order,
            });
        }
        Ok((root.to_builder(), root))
    }

    fn collect(&self, payload: &[u8]) -> Result<Ifd> {
        parse_tiff(payload)
    }

    fn new_builder(&self, kind: IfdKind, byte_order: ByteOrder) -> IfdBuilder {
        IfdBuilder::new(kind, byte_order)
    }

    fn encode(&self, builder: &IfdBuilder) -> Result<Vec<u8>> {
        encode_tiff(builder)
    }
}
