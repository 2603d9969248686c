//! XML parser.
//!
//! A hand-rolled recursive descent parser for the restricted XML dialect
//! this crate understands: elements, attributes, text, the predefined
//! entities and numeric character references. Comments, `<!...>`
//! declarations and processing instructions are skipped. There is no DTD
//! support and no namespace resolution.
//!
//! Parsing stops at the first error.

pub(crate) mod entity;
pub(crate) mod input;
mod xml;

use crate::error::ParseError;
use crate::tree::Document;

use input::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_NAME_LENGTH};

/// Parse options controlling security limits.
///
/// ```
/// use xmlmapper::parser::ParseOptions;
///
/// let opts = ParseOptions::default().max_depth(128).max_name_length(64);
/// assert_eq!(opts.max_depth, 128);
/// ```
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Maximum element nesting depth (default: 256).
    pub max_depth: u32,
    /// Maximum length in bytes of an element or attribute name (default: 50,000).
    pub max_name_length: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_name_length: DEFAULT_MAX_NAME_LENGTH,
        }
    }
}

impl ParseOptions {
    /// Sets the maximum element nesting depth.
    #[must_use]
    pub fn max_depth(mut self, max: u32) -> Self {
        self.max_depth = max;
        self
    }

    /// Sets the maximum element/attribute name length in bytes.
    #[must_use]
    pub fn max_name_length(mut self, max: usize) -> Self {
        self.max_name_length = max;
        self
    }
}

/// Parses an XML string with default options.
///
/// # Errors
///
/// Returns `ParseError` if the input is not well-formed.
pub fn parse_str(input: &str) -> Result<Document, ParseError> {
    parse_str_with_options(input, &ParseOptions::default())
}

/// Parses an XML string with the given options.
///
/// # Errors
///
/// Returns `ParseError` if the input is not well-formed or exceeds a limit.
pub fn parse_str_with_options(input: &str, options: &ParseOptions) -> Result<Document, ParseError> {
    xml::XmlParser::new(input, options).parse()
}
