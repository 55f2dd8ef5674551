#![no_main]

use libfuzzer_sys::fuzz_target;
use png_structure::{tags, PngParser, TagValue, TiffCodec};

fuzz_target!(|data: &[u8]| {
    let Ok(mut chunks) = PngParser::new().parse_bytes(data) else {
        return;
    };

    // Unmodified chunks must write back byte for byte
    let output = chunks.to_bytes().expect("parsed chunks re-encode");
    assert_eq!(output, data);

    // Rebuild the EXIF block when it decodes, then write and re-parse
    if let Ok(mut builder) = chunks.construct_exif_builder(&TiffCodec) {
        builder.set(tags::SOFTWARE, TagValue::Ascii("fuzz".to_string()));
        if chunks.set_exif(&TiffCodec, &builder).is_ok() {
            let output = chunks.to_bytes().expect("edited chunks re-encode");
            let reparsed = PngParser::new()
                .parse_bytes(&output)
                .expect("written output parses");
            assert_eq!(reparsed.len(), chunks.len());
        }
    }
});
