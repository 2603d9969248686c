//! Recursive descent parser state machine.

use crate::error::{ParseError, ParseErrorKind, SourceLocation};
use crate::tree::{Attribute, Document, NodeId, NodeKind};
use crate::util::qname::Name;

use super::entity::decode_reference;
use super::input::{is_alphanumeric, is_quote, is_whitespace, ParserInput};
use super::ParseOptions;

/// The core XML parser.
pub(crate) struct XmlParser<'a> {
    /// Low-level cursor (position, peek, consume).
    input: ParserInput<'a>,
    /// The document being built.
    doc: Document,
    /// Maximum allowed name length in bytes.
    max_name_length: usize,
    /// Start of each top-level node, in document order.
    top_level: Vec<SourceLocation>,
}

impl<'a> XmlParser<'a> {
    pub fn new(input: &'a str, options: &ParseOptions) -> Self {
        let mut pi = ParserInput::new(input);
        pi.set_max_depth(options.max_depth);

        Self {
            input: pi,
            doc: Document::new(),
            max_name_length: options.max_name_length,
            top_level: Vec::new(),
        }
    }

    /// Parses the entire input into a document with a detached root element.
    pub fn parse(mut self) -> Result<Document, ParseError> {
        // Top-level content is collected under a nameless wrapper so that the
        // root element checks can look at everything that was found.
        let wrapper = self.doc.create_node(NodeKind::element(Name::default()));
        self.parse_content(wrapper, None)?;

        let root = self.select_root(wrapper)?;
        self.doc.delete_child(wrapper, root);
        self.doc.set_root(root);

        tracing::debug!(
            root = %self.doc.name(root).map(ToString::to_string).unwrap_or_default(),
            nodes = self.doc.node_count(),
            "parsed document"
        );
        Ok(self.doc)
    }

    /// Picks the single root element out of the top-level content.
    fn select_root(&self, wrapper: NodeId) -> Result<NodeId, ParseError> {
        let mut root = None;
        for (child, &start) in self.doc.children(wrapper).zip(&self.top_level) {
            match self.doc.node_text(child) {
                Some(text) if !text.chars().all(is_whitespace) => {
                    return Err(ParseError::new(ParseErrorKind::UnexpectedRootText, start));
                }
                Some(_) => {}
                None if root.is_some() => {
                    return Err(ParseError::new(ParseErrorKind::MultipleRootElements, start));
                }
                None => root = Some(child),
            }
        }
        root.ok_or_else(|| self.input.error(ParseErrorKind::MissingRootElement))
    }

    // --- Content ---

    /// Parses content into `parent` until the closing tag of `enclosing`, or
    /// until end of input at top level (`enclosing` is `None`).
    fn parse_content(
        &mut self,
        parent: NodeId,
        enclosing: Option<&Name>,
    ) -> Result<(), ParseError> {
        loop {
            let start = self.input.location();
            let text = self.scan_text('<')?;
            if !text.is_empty() {
                let node = self.doc.create_text(text);
                self.doc.push_child(parent, node);
                if enclosing.is_none() {
                    self.top_level.push(start);
                }
            }

            if self.input.at_end() {
                return match enclosing {
                    Some(_) => Err(self.input.error(ParseErrorKind::UnexpectedEnd)),
                    None => Ok(()),
                };
            }

            if self.input.looking_at("</") {
                return self.parse_closing_tag(enclosing);
            } else if self.input.looking_at("<!") {
                // Comments and declarations end at the first '>'.
                self.input.skip_until(|c| c == '>');
                self.input.expect('>')?;
            } else if self.input.looking_at("<?") {
                self.skip_processing_instruction()?;
            } else {
                if enclosing.is_none() {
                    self.top_level.push(self.input.location());
                }
                self.parse_element(parent)?;
            }
        }
    }

    fn parse_closing_tag(&mut self, enclosing: Option<&Name>) -> Result<(), ParseError> {
        let location = self.input.location();
        self.input.expect_str("</")?;
        let name = self.parse_name()?;
        self.input.skip_while(is_whitespace);
        self.input.expect('>')?;

        match enclosing {
            None => Err(ParseError::new(
                ParseErrorKind::UnexpectedClosingTag(name.to_string()),
                location,
            )),
            Some(open) if *open != name => Err(ParseError::new(
                ParseErrorKind::MismatchedClosingTag {
                    expected: open.to_string(),
                    found: name.to_string(),
                },
                location,
            )),
            Some(_) => Ok(()),
        }
    }

    /// Skips `<?...?>`. A `?>` inside a quoted region does not end it.
    fn skip_processing_instruction(&mut self) -> Result<(), ParseError> {
        self.input.expect_str("<?")?;
        loop {
            self.input.skip_until(|c| c == '?' || is_quote(c));
            match self.input.consume()? {
                '?' => {
                    if self.input.maybe_expect('>') {
                        return Ok(());
                    }
                }
                quote => {
                    self.input.skip_until(|c| c == quote);
                    self.input.expect(quote)?;
                }
            }
        }
    }

    /// Accumulates text up to `delimiter` (not consumed) or end of input,
    /// decoding references on the way.
    fn scan_text(&mut self, delimiter: char) -> Result<String, ParseError> {
        let mut text = String::new();
        loop {
            text.push_str(self.input.consume_while(|c| c != delimiter && c != '&'));
            if self.input.peek() != Some('&') {
                return Ok(text);
            }
            decode_reference(&mut self.input, &mut text)?;
        }
    }

    // --- Elements ---

    fn parse_element(&mut self, parent: NodeId) -> Result<(), ParseError> {
        self.input.increment_depth()?;
        self.input.expect('<')?;
        let name = self.parse_name()?;

        let mut attributes = Vec::new();
        let self_closing = loop {
            let separated = self.input.skip_while(is_whitespace) > 0;
            match self.input.peek() {
                Some('/') => {
                    self.input.expect_str("/>")?;
                    break true;
                }
                Some('>') => {
                    self.input.expect('>')?;
                    break false;
                }
                Some(_) if separated => attributes.push(self.parse_attribute()?),
                Some(found) => {
                    return Err(self.input.error(ParseErrorKind::UnexpectedCharacter {
                        expected: "whitespace, '>' or '/>'".to_string(),
                        found,
                    }));
                }
                None => return Err(self.input.error(ParseErrorKind::UnexpectedEnd)),
            }
        };

        let element = self.doc.create_node(NodeKind::Element {
            name: name.clone(),
            attributes,
        });
        self.doc.push_child(parent, element);

        if !self_closing {
            self.parse_content(element, Some(&name))?;
        }
        self.input.decrement_depth();
        Ok(())
    }

    fn parse_attribute(&mut self) -> Result<Attribute, ParseError> {
        let name = self.parse_name()?;
        self.input.skip_while(is_whitespace);
        self.input.expect('=')?;
        self.input.skip_while(is_whitespace);
        let quote = self.input.expect_one_of(is_quote, "quote")?;
        let value = self.scan_text(quote)?;
        self.input.expect(quote)?;
        Ok(Attribute::new(name, value))
    }

    /// Parses `local` or `prefix:local`, both parts ASCII alphanumeric.
    fn parse_name(&mut self) -> Result<Name, ParseError> {
        let start = self.input.location();
        let first = self.input.expect_one_or_more_of(is_alphanumeric, "name characters")?;
        let name = if self.input.maybe_expect(':') {
            let local = self.input.expect_one_or_more_of(is_alphanumeric, "name characters")?;
            Name::new(first, local)
        } else {
            Name::local(first)
        };

        let length = self.input.location().byte_offset - start.byte_offset;
        if length > self.max_name_length {
            return Err(ParseError::new(
                ParseErrorKind::NameTooLong {
                    length,
                    max: self.max_name_length,
                },
                start,
            ));
        }
        Ok(name)
    }
}
