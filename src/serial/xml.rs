//! XML serializer.
//!
//! Serializes an element subtree of a [`Document`] into an XML string.

use std::borrow::Cow;

use crate::tree::{Document, NodeId, NodeKind};
use crate::util::qname::Name;

/// Options controlling XML serialization output.
///
/// # Examples
///
/// ```
/// use xmlmapper::Document;
/// use xmlmapper::serial::{serialize_with_options, SerializeOptions};
///
/// let doc = Document::parse_str("<root><child>Hello</child></root>").unwrap();
/// let root = doc.root_element().unwrap();
/// let xml = serialize_with_options(&doc, root, &SerializeOptions::default().indent(true));
/// assert_eq!(xml, "<root>\n  <child>Hello</child>\n</root>\n");
/// ```
#[derive(Debug, Clone)]
pub struct SerializeOptions {
    /// Whether to produce indented (pretty-printed) output.
    /// Defaults to `false`.
    pub indent: bool,
    /// The indentation string used for each level when `indent` is `true`.
    /// Defaults to two spaces.
    pub indent_str: String,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            indent: false,
            indent_str: "  ".to_string(),
        }
    }
}

impl SerializeOptions {
    /// Enables or disables indented output.
    ///
    /// Only element-only content (elements plus whitespace text) is
    /// re-indented; its whitespace text is replaced. Mixed content is
    /// written exactly as stored.
    #[must_use]
    pub fn indent(mut self, indent: bool) -> Self {
        self.indent = indent;
        self
    }

    /// Sets the indentation string used for each nesting level.
    #[must_use]
    pub fn indent_str(mut self, s: &str) -> Self {
        self.indent_str = s.to_string();
        self
    }
}

/// Escapes `&`, `<`, `"`, `'` and `>` with the predefined entities.
///
/// Each character is replaced exactly once, so an `&` introduced by an
/// earlier replacement is never escaped again.
///
/// # Examples
///
/// ```
/// use xmlmapper::serial::escape;
///
/// assert_eq!(escape(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&apos;");
/// assert_eq!(escape("plain"), "plain");
/// ```
#[must_use]
pub fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '"', '\'', '>']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 16);
    write_escaped(&mut out, text);
    Cow::Owned(out)
}

fn write_escaped(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

/// Serializes the subtree at `id` compactly.
///
/// An element with no children is written self-closing. A text node is
/// written as its escaped content.
#[must_use]
pub fn serialize(doc: &Document, id: NodeId) -> String {
    serialize_with_options(doc, id, &SerializeOptions::default())
}

/// Serializes the subtree at `id` with the given options.
#[must_use]
pub fn serialize_with_options(doc: &Document, id: NodeId, options: &SerializeOptions) -> String {
    let mut output = String::new();
    serialize_node(doc, id, &mut output, options, 0, options.indent);
    output
}

/// Returns `true` if the element contains at least one element and otherwise
/// only whitespace text, meaning it is safe to re-indent.
fn is_element_only(doc: &Document, id: NodeId) -> bool {
    let mut has_element_child = false;
    for child in doc.children(id) {
        match &doc.node(child).kind {
            NodeKind::Element { .. } => has_element_child = true,
            NodeKind::Text { content } => {
                if !content.trim().is_empty() {
                    return false;
                }
            }
        }
    }
    has_element_child
}

fn write_name(out: &mut String, name: &Name) {
    if !name.prefix.is_empty() {
        out.push_str(&name.prefix);
        out.push(':');
    }
    out.push_str(&name.name);
}

fn write_indent(out: &mut String, options: &SerializeOptions, depth: usize) {
    for _ in 0..depth {
        out.push_str(&options.indent_str);
    }
}

fn serialize_node(
    doc: &Document,
    id: NodeId,
    out: &mut String,
    options: &SerializeOptions,
    depth: usize,
    on_own_line: bool,
) {
    match &doc.node(id).kind {
        NodeKind::Element { name, attributes } => {
            if on_own_line {
                write_indent(out, options, depth);
            }
            out.push('<');
            write_name(out, name);

            for attr in attributes {
                out.push(' ');
                write_name(out, &attr.name);
                out.push_str("=\"");
                write_escaped(out, &attr.value);
                out.push('"');
            }

            if doc.first_child(id).is_none() {
                out.push_str("/>");
            } else {
                out.push('>');
                let element_only = options.indent && is_element_only(doc, id);
                if element_only {
                    out.push('\n');
                }
                for child in doc.children(id) {
                    if element_only && !doc.is_element(child) {
                        continue;
                    }
                    serialize_node(doc, child, out, options, depth + 1, element_only);
                }
                if element_only {
                    write_indent(out, options, depth);
                }
                out.push_str("</");
                write_name(out, name);
                out.push('>');
            }
            if on_own_line {
                out.push('\n');
            }
        }
        NodeKind::Text { content } => write_escaped(out, content),
    }
}
