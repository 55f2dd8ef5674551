//! Parse options

/// Default read size for reader-driven parsing (64 KB)
pub const DEFAULT_FRAGMENT_SIZE: usize = 65536;

/// Options controlling how a chunk stream is parsed
///
/// The defaults impose no limits and keep every chunk exactly as read, which
/// is what byte-exact round trips need.
///
/// # Example
///
/// ```
/// use png_structure::{ParseOptions, PngParser};
///
/// let options = ParseOptions::new()
///     .with_fragment_size(4096)
///     .with_max_chunk_length(16 * 1024 * 1024)
///     .verify_crc(true);
/// let parser = PngParser::with_options(options);
/// # let _ = parser;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    pub(crate) fragment_size: Option<usize>,
    pub(crate) max_chunk_length: Option<u32>,
    pub(crate) verify_crc: bool,
}

impl ParseOptions {
    /// Create options with all defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes requested from the reader per read call
    ///
    /// Chunks larger than this are still parsed; the splitter accumulates
    /// fragments until a whole chunk is available. Zero falls back to the default.
    pub fn with_fragment_size(mut self, size: usize) -> Self {
        self.fragment_size = Some(size);
        self
    }

    /// Reject chunks declaring more than `max` data bytes
    pub fn with_max_chunk_length(mut self, max: u32) -> Self {
        self.max_chunk_length = Some(max);
        self
    }

    /// Reject chunks whose stored CRC does not match their contents
    pub fn verify_crc(mut self, verify: bool) -> Self {
        self.verify_crc = verify;
        self
    }

    /// Get the effective fragment size (uses DEFAULT_FRAGMENT_SIZE if not set)
    pub(crate) fn effective_fragment_size(&self) -> usize {
        match self.fragment_size {
            Some(size) if size > 0 => size,
            _ => DEFAULT_FRAGMENT_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ParseOptions::new();
        assert_eq!(options.effective_fragment_size(), DEFAULT_FRAGMENT_SIZE);
        assert_eq!(options.max_chunk_length, None);
        assert!(!options.verify_crc);
    }

    #[test]
    fn test_zero_fragment_size_falls_back() {
        let options = ParseOptions::new().with_fragment_size(0);
        assert_eq!(options.effective_fragment_size(), DEFAULT_FRAGMENT_SIZE);
    }
}
