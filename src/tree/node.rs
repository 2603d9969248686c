//! Node type definitions.
//!
//! Only two kinds of node exist: elements and text. Comments and processing
//! instructions are skipped by the parser and never reach the tree.

use crate::util::qname::Name;

/// An attribute on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// The qualified attribute name.
    pub name: Name,
    /// The attribute value with entity references resolved.
    pub value: String,
}

impl Attribute {
    pub fn new(name: Name, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

/// The kind of a node and its payload.
///
/// Navigation links (parent, children, siblings) are stored in
/// [`NodeData`](super::NodeData), not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// An element node, e.g. `<a:item ID="1">`.
    Element {
        /// The qualified element name.
        name: Name,
        /// Attributes in document order. Duplicates are kept.
        attributes: Vec<Attribute>,
    },

    /// A text node containing character data, already entity-decoded.
    Text { content: String },
}

impl NodeKind {
    /// Creates an element payload with no attributes.
    pub fn element(name: Name) -> Self {
        Self::Element {
            name,
            attributes: Vec::new(),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }

    #[must_use]
    pub fn is_element(&self) -> bool {
        matches!(self, Self::Element { .. })
    }
}
