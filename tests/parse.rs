//! Parser behaviour over whole documents: entity decoding, diagnostics with
//! source locations, and the resource limits that guard against pathological
//! input.

#![allow(clippy::unwrap_used)]

use std::fmt::Write;

use pretty_assertions::assert_eq;
use xmlmapper::parser::{parse_str_with_options, ParseOptions};
use xmlmapper::{Document, ParseErrorKind};

fn root_text(xml: &str) -> String {
    let doc = Document::parse_str(xml).unwrap();
    doc.text(doc.root_element().unwrap())
}

fn error_kind(xml: &str) -> ParseErrorKind {
    Document::parse_str(xml).unwrap_err().kind
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

#[test]
fn test_predefined_entities() {
    assert_eq!(
        root_text("<a>&amp;&lt;&gt;&quot;&apos;</a>"),
        "&<>\"'".to_string()
    );
}

#[test]
fn test_numeric_character_references() {
    assert_eq!(root_text("<a>&#65;&#x42;&#X63;</a>"), "ABc");
    assert_eq!(root_text("<a>&#x10FFFF;</a>"), "\u{10FFFF}");
}

#[test]
fn test_entities_in_attribute_values() {
    let doc = Document::parse_str(r#"<a v="x &lt; y &#38; z"/>"#).unwrap();
    let root = doc.root_element().unwrap();
    assert_eq!(doc.attribute(root, "v"), Some("x < y & z"));
}

#[test]
fn test_invalid_numeric_references_fail() {
    for xml in [
        "<a>&#x110000;</a>",
        "<a>&#xD800;</a>",
        "<a>&#;</a>",
        "<a>&#x;</a>",
        "<a>&#12345678;</a>",
    ] {
        let kind = error_kind(xml);
        assert!(
            matches!(kind, ParseErrorKind::InvalidEntity(_)),
            "{xml}: unexpected {kind:?}"
        );
    }
    assert!(Document::parse_str("<a>&#65</a>").is_err());
}

#[test]
fn test_unknown_named_entity_fails() {
    assert_eq!(
        error_kind("<a>&nbsp;</a>"),
        ParseErrorKind::UnknownEntityReference("nbsp".to_string())
    );
}

// ---------------------------------------------------------------------------
// Structure and diagnostics
// ---------------------------------------------------------------------------

#[test]
fn test_prolog_comments_and_doctype_are_skipped() {
    let xml = "<?xml version=\"1.0\"?>\n<!DOCTYPE a>\n<!-- note -->\n<a>x<!-- y -->z</a>\n";
    let doc = Document::parse_str(xml).unwrap();
    let root = doc.root_element().unwrap();
    assert_eq!(doc.name(root).unwrap().to_string(), "a");
    assert_eq!(doc.text(root), "xz");
    assert_eq!(doc.child_count(root), 2);
}

#[test]
fn test_error_location_is_one_based() {
    let err = Document::parse_str("<a>\n  <b>\n</a>").unwrap_err();
    assert_eq!(
        err.kind,
        ParseErrorKind::MismatchedClosingTag {
            expected: "b".to_string(),
            found: "a".to_string(),
        }
    );
    assert_eq!((err.location.line, err.location.column), (3, 1));
    assert!(err.to_string().starts_with("parse error at 3:1:"));
}

#[test]
fn test_root_level_errors() {
    assert_eq!(error_kind("<a/><b/>"), ParseErrorKind::MultipleRootElements);
    assert_eq!(error_kind("  \n "), ParseErrorKind::MissingRootElement);
    assert_eq!(error_kind("hello <a/>"), ParseErrorKind::UnexpectedRootText);
    assert_eq!(
        error_kind("</a>"),
        ParseErrorKind::UnexpectedClosingTag("a".to_string())
    );
}

#[test]
fn test_truncated_input_fails() {
    for xml in ["<a>", "<a", "<a b=\"1", "<a><b></b>", "<a>&amp"] {
        assert!(Document::parse_str(xml).is_err(), "{xml} should not parse");
    }
}

#[test]
fn test_crlf_counts_as_one_line_break() {
    let err = Document::parse_str("<a>\r\n\r\n<b></c></a>").unwrap_err();
    assert_eq!(err.location.line, 3);
}

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

#[test]
fn test_deeply_nested_elements_rejected() {
    // Run in a thread with a larger stack to avoid overflow in debug mode.
    let result = std::thread::Builder::new()
        .stack_size(8 * 1024 * 1024)
        .spawn(|| {
            let open_tags: String = (0..300).map(|_| "<a>").collect();
            let close_tags: String = (0..300).map(|_| "</a>").collect();
            Document::parse_str(&format!("{open_tags}{close_tags}"))
        })
        .unwrap()
        .join()
        .unwrap();
    assert_eq!(
        result.unwrap_err().kind,
        ParseErrorKind::DepthLimitExceeded(256)
    );
}

#[test]
fn test_nesting_at_limit_is_accepted() {
    let opts = ParseOptions::default().max_depth(16);
    let mut xml = String::new();
    for i in 0..16 {
        let _ = write!(xml, "<e{i}>");
    }
    for i in (0..16).rev() {
        let _ = write!(xml, "</e{i}>");
    }
    assert!(parse_str_with_options(&xml, &opts).is_ok());
}

#[test]
fn test_long_names_rejected() {
    let name = "n".repeat(100);
    let xml = format!("<a {name}=\"1\"/>");
    let opts = ParseOptions::default().max_name_length(64);
    let err = parse_str_with_options(&xml, &opts).unwrap_err();
    assert_eq!(
        err.kind,
        ParseErrorKind::NameTooLong {
            length: 100,
            max: 64
        }
    );
    assert!(Document::parse_str(&xml).is_ok());
}

// ---------------------------------------------------------------------------
// Encodings
// ---------------------------------------------------------------------------

#[test]
fn test_parse_bytes_utf8_with_bom() {
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice("<a>é</a>".as_bytes());
    let doc = Document::parse_bytes(&bytes).unwrap();
    assert_eq!(doc.text(doc.root_element().unwrap()), "é");
}

#[test]
fn test_parse_bytes_rejects_invalid_utf8() {
    let err = Document::parse_bytes(b"<a>\xFF</a>").unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::Encoding(_)));
}
