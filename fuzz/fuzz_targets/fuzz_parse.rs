#![no_main]

use libfuzzer_sys::fuzz_target;
use png_structure::{ChunkDecoder, ChunkSplitter, PngParser, TiffCodec};

fuzz_target!(|data: &[u8]| {
    // Any input must produce chunks or an error, never a panic
    let parsed = PngParser::new().parse_bytes(data);

    // Feeding the same bytes in small fragments must agree with a single pass
    let mut splitter = ChunkSplitter::new();
    let mut fed = Ok(());
    for fragment in data.chunks(7) {
        if let Err(e) = splitter.feed(fragment, false) {
            fed = Err(e);
            break;
        }
    }
    let fed = fed.and_then(|_| splitter.finish());
    assert_eq!(parsed.is_ok(), fed.is_ok());

    if let Ok(chunks) = parsed {
        assert_eq!(Some(&chunks), fed.as_ref().ok());

        let _ = chunks.index();
        let decoder = ChunkDecoder::new();
        for chunk in chunks.chunks() {
            let _ = decoder.decode(chunk);
        }

        // Exercise the EXIF reader on whatever payload is present
        let _ = chunks.exif(&TiffCodec);
    }
});
