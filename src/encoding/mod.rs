//! Byte-level front-end: encoding detection and transcoding.
//!
//! The parser works on `&str`. This module turns raw bytes into a string
//! using the byte order mark, bridging to `encoding_rs` for UTF-16. Input
//! without a BOM must be UTF-8.

use std::borrow::Cow;

use crate::error::{ParseError, ParseErrorKind, SourceLocation};

/// Detects the encoding of an XML byte stream by inspecting the byte order
/// mark.
///
/// Returns the encoding and the number of BOM bytes to skip.
///
/// # Examples
///
/// ```
/// use xmlmapper::encoding::detect_encoding;
///
/// let (enc, skip) = detect_encoding(b"\xEF\xBB\xBFhello");
/// assert_eq!(enc.name(), "UTF-8");
/// assert_eq!(skip, 3);
///
/// let (enc, skip) = detect_encoding(b"\xFF\xFE<\x00");
/// assert_eq!(enc.name(), "UTF-16LE");
/// assert_eq!(skip, 2);
/// ```
#[must_use]
pub fn detect_encoding(bytes: &[u8]) -> (&'static encoding_rs::Encoding, usize) {
    match encoding_rs::Encoding::for_bom(bytes) {
        Some((encoding, bom_length)) => (encoding, bom_length),
        None => (encoding_rs::UTF_8, 0),
    }
}

/// Decodes raw bytes to UTF-8 text, stripping any byte order mark.
///
/// # Errors
///
/// Returns a `ParseError` with kind `Encoding` if the bytes are malformed
/// for the detected encoding.
pub fn decode_to_utf8(bytes: &[u8]) -> Result<Cow<'_, str>, ParseError> {
    let (encoding, bom_length) = detect_encoding(bytes);
    let body = &bytes[bom_length..];
    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .ok_or_else(|| {
            ParseError::new(
                ParseErrorKind::Encoding(format!(
                    "malformed byte sequence for encoding {}",
                    encoding.name()
                )),
                malformed_location(encoding, body, bom_length),
            )
        })
}

/// Locates the first malformed byte for UTF-8 input. Other encodings report
/// the start of the document.
fn malformed_location(
    encoding: &'static encoding_rs::Encoding,
    body: &[u8],
    bom_length: usize,
) -> SourceLocation {
    let start = SourceLocation {
        line: 1,
        column: 1,
        byte_offset: bom_length,
    };
    if encoding != encoding_rs::UTF_8 {
        return start;
    }
    let Err(err) = std::str::from_utf8(body) else {
        return start;
    };
    let valid = &body[..err.valid_up_to()];
    // The prefix is valid UTF-8 by construction.
    let prefix = std::str::from_utf8(valid).unwrap_or_default();
    let line_start = prefix.rfind('\n').map_or(0, |i| i + 1);
    let to_u32 = |n: usize| u32::try_from(n).unwrap_or(u32::MAX);
    SourceLocation {
        line: to_u32(prefix.matches('\n').count() + 1),
        column: to_u32(prefix[line_start..].chars().count() + 1),
        byte_offset: bom_length + valid.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16le(text: &str) -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn test_plain_utf8_is_borrowed() {
        let decoded = decode_to_utf8(b"<root/>").unwrap();
        assert!(matches!(decoded, Cow::Borrowed("<root/>")));
    }

    #[test]
    fn test_utf8_bom_is_stripped() {
        let decoded = decode_to_utf8(b"\xEF\xBB\xBF<root/>").unwrap();
        assert_eq!(decoded, "<root/>");
    }

    #[test]
    fn test_utf16le_is_transcoded() {
        let bytes = utf16le("<r>\u{e9}</r>");
        let decoded = decode_to_utf8(&bytes).unwrap();
        assert_eq!(decoded, "<r>\u{e9}</r>");
    }

    #[test]
    fn test_invalid_utf8_is_rejected() {
        let err = decode_to_utf8(b"<r>\xFF</r>").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::Encoding(_)));
    }

    #[test]
    fn test_malformed_byte_location() {
        let err = decode_to_utf8(b"\xEF\xBB\xBF<r>\n  \xC3\xA9\xFF</r>").unwrap_err();
        assert_eq!(
            err.location,
            SourceLocation {
                line: 2,
                column: 4,
                byte_offset: 11,
            }
        );
        assert!(err.to_string().starts_with("parse error at 2:4:"));
    }

    #[test]
    fn test_malformed_utf16_reports_document_start() {
        let err = decode_to_utf8(b"\xFF\xFE\x00\xD8").unwrap_err();
        assert_eq!((err.location.line, err.location.column), (1, 1));
    }

    #[test]
    fn test_document_parse_bytes() {
        let doc = crate::Document::parse_bytes(&utf16le("<r a=\"1\"/>")).unwrap();
        let root = doc.root_element().unwrap();
        assert_eq!(doc.attribute(root, "a"), Some("1"));
    }
}
