//! Error types and diagnostics.
//!
//! Three disjoint families live here:
//!
//! - [`ParseError`]: malformed input, always carrying a [`SourceLocation`].
//! - [`TreeError`]: structural misuse of the document arena.
//! - [`MapError`]: schema violations raised by a compiled
//!   [`Mapper`](crate::mapper::Mapper), each qualified by a [`Path`].
//!
//! Parsing halts on the first error; there is no recovery mode and no
//! partial tree is ever returned.

use std::fmt;

use thiserror::Error;

use crate::mapper::Path;

/// Source location within an XML document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number (in characters, not bytes).
    pub column: u32,
    /// 0-based byte offset from the start of the input.
    pub byte_offset: usize,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// What went wrong while lexing or parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("unexpected character '{found}', expected {expected}")]
    UnexpectedCharacter { expected: String, found: char },
    #[error("expected one or more {0}")]
    ExpectedOneOrMore(String),
    #[error("closing tag '{found}' does not match opening tag '{expected}'")]
    MismatchedClosingTag { expected: String, found: String },
    #[error("closing tag '{0}' has no matching opening tag")]
    UnexpectedClosingTag(String),
    #[error("invalid entity: {0}")]
    InvalidEntity(String),
    #[error("unknown entity reference: &{0};")]
    UnknownEntityReference(String),
    #[error("document has more than one root element")]
    MultipleRootElements,
    #[error("document has no root element")]
    MissingRootElement,
    #[error("unexpected text outside the root element")]
    UnexpectedRootText,
    #[error("maximum nesting depth exceeded ({0})")]
    DepthLimitExceeded(u32),
    #[error("name length ({length}) exceeds maximum ({max})")]
    NameTooLong { length: usize, max: usize },
    #[error("encoding error: {0}")]
    Encoding(String),
}

/// The error type returned when XML parsing fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error at {location}: {kind}")]
pub struct ParseError {
    /// What went wrong.
    pub kind: ParseErrorKind,
    /// Where in the source the error occurred.
    pub location: SourceLocation,
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind, location: SourceLocation) -> Self {
        Self { kind, location }
    }
}

/// Structural errors raised by [`Document`](crate::Document) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("element has no parent")]
    NoParent,
    #[error("element already has a parent; detach it first")]
    AlreadyHasParent,
    #[error("index {index} is out of range for {len} children")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("expected at most one match, found more")]
    MultipleMatches,
    #[error("expected exactly one match, found none")]
    NoMatch,
    #[error("node is not an element")]
    NotAnElement,
    #[error("an element cannot become a child of itself or its descendants")]
    WouldCreateCycle,
    #[error("'{0}' is not a valid element or attribute name")]
    InvalidName(String),
}

/// A required child rule whose minimum count was not met.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingChild {
    pub name: String,
    pub required: usize,
    pub found: usize,
}

impl fmt::Display for MissingChild {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (required {}, found {})",
            self.name, self.required, self.found
        )
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Schema errors raised while building or running a mapper.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("{path}: expected element '{expected}', found '{found}'")]
    UnexpectedElementName {
        path: Path,
        expected: String,
        found: String,
    },
    #[error("{path}: unexpected attribute")]
    UnexpectedAttribute { path: Path },
    #[error("{path}: missing attributes: {}", .names.join(", "))]
    MissingAttributes { path: Path, names: Vec<String> },
    #[error("{path}: unexpected child element")]
    UnexpectedChild { path: Path },
    #[error("{path}: missing children: {}", join(.missing))]
    MissingChildren {
        path: Path,
        missing: Vec<MissingChild>,
    },
    #[error("{path}: unexpected text")]
    UnexpectedText { path: Path },
    #[error("{path}: missing text content")]
    MissingText { path: Path },
    #[error("{path}: {message}")]
    Invalid { path: Path, message: String },
    #[error("mapper builder misuse: {0}")]
    BuilderMisuse(String),
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error("record does not fit the target type: {0}")]
    Deserialize(#[from] serde_json::Error),
}

impl MapError {
    /// Creates a validation failure for `path`.
    ///
    /// This is the error stock and user-written validators are expected to
    /// return when a raw value does not satisfy their type.
    pub fn invalid(path: &Path, message: impl Into<String>) -> Self {
        Self::Invalid {
            path: path.clone(),
            message: message.into(),
        }
    }

    /// Returns the path the error refers to, if it has one.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::UnexpectedElementName { path, .. }
            | Self::UnexpectedAttribute { path }
            | Self::MissingAttributes { path, .. }
            | Self::UnexpectedChild { path }
            | Self::MissingChildren { path, .. }
            | Self::UnexpectedText { path }
            | Self::MissingText { path }
            | Self::Invalid { path, .. } => Some(path),
            Self::BuilderMisuse(_) | Self::Tree(_) | Self::Deserialize(_) => None,
        }
    }
}
