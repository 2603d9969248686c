#![no_main]
use libfuzzer_sys::fuzz_target;
use xmlmapper::Document;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Anything that parses must serialize to something that parses again
        if let Ok(doc) = Document::parse_str(s) {
            if let Some(root) = doc.root_element() {
                let output = doc.to_xml_string(root);
                assert!(Document::parse_str(&output).is_ok(), "{output}");
            }
        }
    }
});
