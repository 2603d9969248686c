#![no_main]
use libfuzzer_sys::fuzz_target;
use xmlmapper::parser::{parse_str_with_options, ParseOptions};
use xmlmapper::Document;

fuzz_target!(|data: &[u8]| {
    // Byte input goes through encoding detection first
    let _ = Document::parse_bytes(data);
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = parse_str_with_options(s, &ParseOptions::default().max_depth(32));
    }
});
