//! Character-level input cursor shared by the parser and entity decoder.
//!
//! [`ParserInput`] owns the position (byte offset, line, column) and offers
//! the primitive peek/consume/expect operations the recursive descent parser
//! is written in terms of. Operations that take a character class accept any
//! `Fn(char) -> bool`; the classes used by the grammar are defined below.
//!
//! Line counting treats `\r` as a line break on its own and does not count a
//! `\n` that directly follows a `\r` a second time, so `\r\n`, `\r` and `\n`
//! each advance the line by exactly one.

use crate::error::{ParseError, ParseErrorKind, SourceLocation};

/// Default maximum element nesting depth.
pub(crate) const DEFAULT_MAX_DEPTH: u32 = 256;

/// Default maximum length (in bytes) of an element or attribute name.
pub(crate) const DEFAULT_MAX_NAME_LENGTH: usize = 50_000;

// -------------------------------------------------------------------------
// Character classes
// -------------------------------------------------------------------------

pub(crate) fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\r' | '\n' | '\t')
}

pub(crate) fn is_alphanumeric(c: char) -> bool {
    c.is_ascii_alphanumeric()
}

pub(crate) fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

pub(crate) fn is_hex_digit(c: char) -> bool {
    c.is_ascii_hexdigit()
}

pub(crate) fn is_lowercase(c: char) -> bool {
    c.is_ascii_lowercase()
}

pub(crate) fn is_quote(c: char) -> bool {
    c == '"' || c == '\''
}

// -------------------------------------------------------------------------
// ParserInput
// -------------------------------------------------------------------------

/// Cursor over the input text.
pub(crate) struct ParserInput<'a> {
    /// The complete input.
    input: &'a str,

    /// Current byte offset in `input`.
    pos: usize,

    /// Current line number (1-based).
    line: u32,

    /// Current column number (1-based).
    column: u32,

    /// Whether the previous character was a `\r`.
    after_cr: bool,

    /// Current element nesting depth.
    depth: u32,

    /// Maximum allowed nesting depth.
    max_depth: u32,
}

impl<'a> ParserInput<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            column: 1,
            after_cr: false,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn set_max_depth(&mut self, max: u32) {
        self.max_depth = max;
    }

    // -- Depth tracking --

    /// Increments the nesting depth. Returns an error if the limit is exceeded.
    pub fn increment_depth(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(self.error(ParseErrorKind::DepthLimitExceeded(self.max_depth)));
        }
        Ok(())
    }

    pub fn decrement_depth(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    // -- Position queries --

    pub fn location(&self) -> SourceLocation {
        SourceLocation {
            line: self.line,
            column: self.column,
            byte_offset: self.pos,
        }
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Builds an error of the given kind at the current position.
    pub fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, self.location())
    }

    // -- Peek operations --

    /// Returns the current character without consuming it, `None` at end.
    pub fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Returns `true` if the remaining input starts with `s`.
    pub fn looking_at(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    // -- Consume operations --

    fn advance(&mut self, c: char) {
        match c {
            '\r' => {
                self.line += 1;
                self.column = 1;
            }
            '\n' if self.after_cr => {}
            '\n' => {
                self.line += 1;
                self.column = 1;
            }
            _ => self.column += 1,
        }
        self.after_cr = c == '\r';
        self.pos += c.len_utf8();
    }

    /// Consumes and returns the next character, or `None` at end.
    pub fn consume_or_end(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.advance(c);
        Some(c)
    }

    /// Consumes and returns the next character.
    pub fn consume(&mut self) -> Result<char, ParseError> {
        self.consume_or_end()
            .ok_or_else(|| self.error(ParseErrorKind::UnexpectedEnd))
    }

    /// Consumes the next character, which must be `expected`.
    pub fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        self.expect_one_of(|c| c == expected, &format!("'{expected}'"))
            .map(|_| ())
    }

    /// Consumes each character of `expected` in turn.
    pub fn expect_str(&mut self, expected: &str) -> Result<(), ParseError> {
        expected.chars().try_for_each(|c| self.expect(c))
    }

    /// Consumes the next character, which must belong to `class`.
    ///
    /// `label` describes the class in the error message.
    pub fn expect_one_of(
        &mut self,
        class: impl Fn(char) -> bool,
        label: &str,
    ) -> Result<char, ParseError> {
        match self.peek() {
            None => Err(self.error(ParseErrorKind::UnexpectedEnd)),
            Some(c) if class(c) => {
                self.advance(c);
                Ok(c)
            }
            Some(found) => Err(self.error(ParseErrorKind::UnexpectedCharacter {
                expected: label.to_string(),
                found,
            })),
        }
    }

    /// Consumes the next character if it is `expected`.
    pub fn maybe_expect(&mut self, expected: char) -> bool {
        self.maybe_expect_one_of(|c| c == expected).is_some()
    }

    /// Consumes the next character if it belongs to `class`.
    pub fn maybe_expect_one_of(&mut self, class: impl Fn(char) -> bool) -> Option<char> {
        let c = self.peek().filter(|&c| class(c))?;
        self.advance(c);
        Some(c)
    }

    /// Consumes the next character if it does not belong to `class`.
    pub fn maybe_expect_not_one_of(&mut self, class: impl Fn(char) -> bool) -> Option<char> {
        self.maybe_expect_one_of(|c| !class(c))
    }

    /// Consumes characters while they belong to `class`.
    pub fn consume_while(&mut self, class: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while self.maybe_expect_one_of(&class).is_some() {}
        let input = self.input;
        &input[start..self.pos]
    }

    /// Skips characters while they belong to `class`, returning how many.
    pub fn skip_while(&mut self, class: impl Fn(char) -> bool) -> usize {
        self.consume_while(class).chars().count()
    }

    /// Skips characters until one belongs to `class` (left unconsumed) or
    /// the input ends.
    pub fn skip_until(&mut self, class: impl Fn(char) -> bool) -> usize {
        let mut skipped = 0;
        while self.maybe_expect_not_one_of(&class).is_some() {
            skipped += 1;
        }
        skipped
    }

    /// Consumes one or more characters of `class`.
    pub fn expect_one_or_more_of(
        &mut self,
        class: impl Fn(char) -> bool,
        label: &str,
    ) -> Result<&'a str, ParseError> {
        let taken = self.consume_while(class);
        if taken.is_empty() {
            return Err(self.error(ParseErrorKind::ExpectedOneOrMore(label.to_string())));
        }
        Ok(taken)
    }
}
