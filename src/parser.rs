//! Reader-driven PNG parsing

use crate::{
    chunks::ChunkSlice,
    error::Result,
    options::ParseOptions,
    splitter::{looks_like_png, ChunkSplitter},
};
use std::io::{ErrorKind, Read};

/// PNG chunk-stream parser
///
/// Reads from any [`Read`] source in bounded fragments and feeds them to a
/// [`ChunkSplitter`]. The whole stream is retained as chunks, which is what
/// writing it back requires.
#[derive(Debug, Clone, Default)]
pub struct PngParser {
    options: ParseOptions,
}

impl PngParser {
    /// Create a parser with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with the given options
    pub fn with_options(options: ParseOptions) -> Self {
        Self { options }
    }

    /// File extensions this parser accepts
    pub fn extensions() -> &'static [&'static str] {
        &["png"]
    }

    /// MIME types this parser accepts
    pub fn mime_types() -> &'static [&'static str] {
        &["image/png"]
    }

    /// Whether `header` starts with the PNG signature
    pub fn looks_like_format(&self, header: &[u8]) -> bool {
        looks_like_png(header)
    }

    /// MIME type of `header` if it starts with the PNG signature
    pub fn detect(header: &[u8]) -> Option<&'static str> {
        looks_like_png(header).then_some("image/png")
    }

    /// Parse a complete chunk stream from `source`
    pub fn parse<R: Read>(&self, source: &mut R) -> Result<ChunkSlice> {
        let mut splitter = ChunkSplitter::with_options(&self.options);
        let mut buffer = vec![0u8; self.options.effective_fragment_size()];

        loop {
            let read = match source.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            splitter.feed(&buffer[..read], false)?;
        }

        splitter.finish()
    }

    /// Parse a chunk stream held in memory
    pub fn parse_bytes(&self, data: &[u8]) -> Result<ChunkSlice> {
        let mut splitter = ChunkSplitter::with_options(&self.options);
        splitter.split(data, true)?;
        splitter.finish()
    }
}

/// Parse a chunk stream from `source` with default options
pub fn parse_segments<R: Read>(source: &mut R) -> Result<ChunkSlice> {
    PngParser::new().parse(source)
}

/// Parse an in-memory chunk stream with default options
pub fn parse_bytes_structure(data: &[u8]) -> Result<ChunkSlice> {
    PngParser::new().parse_bytes(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        chunk::{Chunk, IEND, IHDR},
        error::Error,
        splitter::PNG_SIGNATURE,
    };
    use std::io::Cursor;

    fn minimal_png() -> Vec<u8> {
        let mut data = PNG_SIGNATURE.to_vec();
        let ihdr = Chunk::new(IHDR, vec![0, 0, 0, 1, 0, 0, 0, 1, 8, 2, 0, 0, 0]).unwrap();
        data.extend(ihdr.bytes().unwrap());
        data.extend(Chunk::new(IEND, Vec::new()).unwrap().bytes().unwrap());
        data
    }

    /// Reader returning at most `step` bytes per call
    struct Trickle<'a> {
        data: &'a [u8],
        step: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let n = self.step.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn test_parse_reader_and_bytes_agree() {
        let data = minimal_png();

        let from_reader = PngParser::new().parse(&mut Cursor::new(&data)).unwrap();
        let from_bytes = PngParser::new().parse_bytes(&data).unwrap();
        assert_eq!(from_reader, from_bytes);
        assert_eq!(from_reader.len(), 2);
    }

    #[test]
    fn test_small_fragments() {
        let data = minimal_png();
        let parser = PngParser::with_options(ParseOptions::new().with_fragment_size(3));

        let chunks = parser.parse(&mut Trickle { data: &data, step: 2 }).unwrap();
        assert_eq!(chunks, parse_bytes_structure(&data).unwrap());
    }

    #[test]
    fn test_invalid_signature() {
        let data = vec![0x00; 8];
        let result = parse_segments(&mut Cursor::new(data));
        assert!(matches!(result, Err(Error::NotPng)));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(parse_bytes_structure(&[]), Err(Error::NotPng)));
    }

    #[test]
    fn test_looks_like_format() {
        let parser = PngParser::new();
        assert!(parser.looks_like_format(&minimal_png()));
        assert!(!parser.looks_like_format(b"\xFF\xD8\xFF\xE0"));
        assert_eq!(PngParser::extensions(), &["png"]);
        assert_eq!(PngParser::mime_types(), &["image/png"]);

        assert_eq!(PngParser::detect(&minimal_png()), Some("image/png"));
        assert_eq!(PngParser::detect(&PNG_SIGNATURE[..7]), None);
    }
}
