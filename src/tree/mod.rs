//! Arena-based XML document tree.
//!
//! All nodes live in a `Vec<NodeData>` owned by the [`Document`] and are
//! referenced by [`NodeId`], a newtype over `NonZeroU32`. Identity of a node
//! is identity of its `NodeId`.
//!
//! # Ownership
//!
//! Every node has at most one parent. The parent link and the
//! first/last-child and sibling links are indices into the arena, so the
//! child list is owned by the parent while the back-reference to the parent
//! is a plain handle and creates no reference cycle. Links are only ever
//! changed by [`Document::add_child`], [`Document::detach`] and
//! [`Document::delete_child`], which keep the invariant that an attached
//! element appears exactly once in its parent's child list.
//!
//! Detached nodes stay allocated in the arena until the `Document` is
//! dropped.

mod node;
pub mod query;

pub use node::{Attribute, NodeKind};
pub use query::{Filter, FindChildren, FindDescendants, Query};

use std::num::NonZeroU32;

use crate::error::{ParseError, TreeError};
use crate::util::qname::Name;

/// A typed index into the document's node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NodeId(NonZeroU32);

impl NodeId {
    /// Creates a `NodeId` from a raw index.
    ///
    /// # Panics
    ///
    /// Panics if `index` is 0.
    #[allow(clippy::expect_used, clippy::cast_possible_truncation)]
    fn from_index(index: usize) -> Self {
        Self(NonZeroU32::new(index as u32).expect("NodeId index must be non-zero"))
    }

    fn as_index(self) -> usize {
        self.0.get() as usize
    }
}

/// Storage for a single node in the document arena.
#[derive(Debug, Clone)]
pub struct NodeData {
    /// Element or text payload.
    pub kind: NodeKind,
    /// Parent node, if attached.
    pub parent: Option<NodeId>,
    /// First child node.
    pub first_child: Option<NodeId>,
    /// Last child node (for O(1) append).
    pub last_child: Option<NodeId>,
    /// Next sibling.
    pub next_sibling: Option<NodeId>,
    /// Previous sibling.
    pub prev_sibling: Option<NodeId>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            first_child: None,
            last_child: None,
            next_sibling: None,
            prev_sibling: None,
        }
    }
}

/// An XML document: the node arena plus its root element.
///
/// # Examples
///
/// ```
/// use xmlmapper::Document;
///
/// let doc = Document::parse_str("<root><child>Hello</child></root>").unwrap();
/// let root = doc.root_element().unwrap();
/// assert_eq!(doc.name(root).unwrap().name, "root");
/// ```
#[derive(Debug, Clone)]
pub struct Document {
    /// The node arena. Index 0 is unused (placeholder for `NonZeroU32`).
    nodes: Vec<NodeData>,
    /// The root element, if one has been set.
    root: Option<NodeId>,
}

impl Document {
    /// Creates an empty document with no root element.
    #[must_use]
    pub fn new() -> Self {
        let mut nodes = Vec::with_capacity(64);
        // Index 0: placeholder (NodeId uses NonZeroU32)
        nodes.push(NodeData::new(NodeKind::text(String::new())));
        Self { nodes, root: None }
    }

    /// Parses an XML string into a `Document`.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the input is not well-formed.
    pub fn parse_str(input: &str) -> Result<Self, ParseError> {
        crate::parser::parse_str(input)
    }

    /// Parses XML from raw bytes, detecting UTF-8/UTF-16 from the byte
    /// order mark. See [`crate::encoding::decode_to_utf8`].
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the bytes cannot be decoded or the decoded
    /// text is not well-formed.
    pub fn parse_bytes(input: &[u8]) -> Result<Self, ParseError> {
        let text = crate::encoding::decode_to_utf8(input)?;
        crate::parser::parse_str(&text)
    }

    /// Returns the root element.
    #[must_use]
    pub fn root_element(&self) -> Option<NodeId> {
        self.root
    }

    /// Makes `id` the document's root element.
    ///
    /// # Errors
    ///
    /// `NotAnElement` for a text node, `AlreadyHasParent` if `id` is attached.
    pub fn set_root_element(&mut self, id: NodeId) -> Result<(), TreeError> {
        if !self.is_element(id) {
            return Err(TreeError::NotAnElement);
        }
        if self.node(id).parent.is_some() {
            return Err(TreeError::AlreadyHasParent);
        }
        self.root = Some(id);
        Ok(())
    }

    pub(crate) fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    /// Returns the `NodeData` for the given node.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this document.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.as_index()]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.as_index()]
    }

    /// Returns the number of nodes in the arena, detached ones included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len() - 1 // subtract placeholder at index 0
    }

    #[must_use]
    pub fn is_element(&self, id: NodeId) -> bool {
        self.node(id).kind.is_element()
    }

    /// Returns the qualified name of an element, `None` for text.
    #[must_use]
    pub fn name(&self, id: NodeId) -> Option<&Name> {
        match &self.node(id).kind {
            NodeKind::Element { name, .. } => Some(name),
            NodeKind::Text { .. } => None,
        }
    }

    /// Returns the content of a text node, `None` for elements.
    #[must_use]
    pub fn node_text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Text { content } => Some(content),
            NodeKind::Element { .. } => None,
        }
    }

    /// Concatenates the direct text children of a node, in order.
    ///
    /// Text inside child elements is not included.
    #[must_use]
    pub fn text(&self, id: NodeId) -> String {
        self.children(id)
            .filter_map(|child| self.node_text(child))
            .collect()
    }

    /// Returns the attributes of an element, empty for text nodes.
    #[must_use]
    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        match &self.node(id).kind {
            NodeKind::Element { attributes, .. } => attributes,
            NodeKind::Text { .. } => &[],
        }
    }

    /// Returns the value of an attribute by qualified name.
    ///
    /// When the same name occurs more than once the last value wins.
    #[must_use]
    pub fn attribute(&self, id: NodeId, qname: &str) -> Option<&str> {
        let wanted = Name::parse(qname);
        self.attributes(id)
            .iter()
            .rev()
            .find(|a| a.name == wanted)
            .map(|a| a.value.as_str())
    }

    // --- Navigation ---

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).first_child
    }

    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).last_child
    }

    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).next_sibling
    }

    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).prev_sibling
    }

    /// Returns an iterator over the children of a node.
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            doc: self,
            next: self.node(id).first_child,
        }
    }

    /// Returns an iterator over the element children of a node.
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id).filter(move |&child| self.is_element(child))
    }

    #[must_use]
    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).count()
    }

    /// Returns an iterator over a node and its ancestors (walking up to root).
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: Some(id),
        }
    }

    /// Returns an iterator over all descendants of a node (depth-first,
    /// document order), not including the node itself.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            root: id,
            next: self.first_child(id),
        }
    }

    // --- Construction ---

    /// Allocates a new, unattached node in the arena.
    pub fn create_node(&mut self, kind: NodeKind) -> NodeId {
        let index = self.nodes.len();
        self.nodes.push(NodeData::new(kind));
        NodeId::from_index(index)
    }

    /// Allocates a new, unattached text node.
    pub fn create_text(&mut self, content: impl Into<String>) -> NodeId {
        self.create_node(NodeKind::text(content))
    }

    /// Builds an element from a qualified name, attributes and children.
    ///
    /// Attributes whose value is `None` are dropped. Children are appended
    /// in order with the same rules as [`add_child`](Self::add_child).
    ///
    /// # Errors
    ///
    /// `InvalidName` if the element name or a kept attribute name would not
    /// parse back (names are alphanumeric with an optional `prefix:`).
    /// Otherwise fails if any child cannot be attached (e.g. it already has a
    /// parent).
    ///
    /// # Examples
    ///
    /// ```
    /// use xmlmapper::Document;
    ///
    /// let mut doc = Document::new();
    /// let text = doc.create_text("hi");
    /// let el = doc
    ///     .create_element("a:item", [("ID", Some("1")), ("skip", None)], [text])
    ///     .unwrap();
    /// assert_eq!(doc.to_xml_string(el), r#"<a:item ID="1">hi</a:item>"#);
    /// ```
    pub fn create_element<K, V>(
        &mut self,
        qname: &str,
        attributes: impl IntoIterator<Item = (K, Option<V>)>,
        children: impl IntoIterator<Item = NodeId>,
    ) -> Result<NodeId, TreeError>
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let well_formed = |qname: &str| {
            let name = Name::parse(qname);
            if name.is_well_formed() {
                Ok(name)
            } else {
                Err(TreeError::InvalidName(qname.to_string()))
            }
        };
        let name = well_formed(qname)?;
        let mut kept = Vec::new();
        for (attr, value) in attributes {
            if let Some(value) = value {
                kept.push(Attribute::new(well_formed(attr.as_ref())?, value));
            }
        }
        let id = self.create_node(NodeKind::Element {
            name,
            attributes: kept,
        });
        for child in children {
            self.append_child(id, child)?;
        }
        Ok(id)
    }

    // --- Mutation ---

    /// Appends `child` to the end of `parent`'s children.
    ///
    /// # Errors
    ///
    /// See [`add_child`](Self::add_child).
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId, TreeError> {
        self.add_child(parent, child, None)
    }

    /// Inserts `child` into `parent`'s children at `position` (default: end).
    ///
    /// Text nodes are values: a text node that is already attached somewhere
    /// is copied and the copy is inserted. The returned id is the node that
    /// was actually inserted.
    ///
    /// # Errors
    ///
    /// - `NotAnElement` if `parent` is a text node.
    /// - `AlreadyHasParent` if `child` is an element that is already attached.
    /// - `WouldCreateCycle` if `child` is `parent` or one of its ancestors.
    /// - `IndexOutOfRange` if `position` exceeds the number of children.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        position: Option<usize>,
    ) -> Result<NodeId, TreeError> {
        if !self.is_element(parent) {
            return Err(TreeError::NotAnElement);
        }
        let len = self.child_count(parent);
        let position = position.unwrap_or(len);
        if position > len {
            return Err(TreeError::IndexOutOfRange {
                index: position,
                len,
            });
        }

        let attached = self.node(child).parent.is_some();
        let child = if self.is_element(child) {
            if attached {
                return Err(TreeError::AlreadyHasParent);
            }
            if self.ancestors(parent).any(|a| a == child) {
                return Err(TreeError::WouldCreateCycle);
            }
            child
        } else if attached {
            let copy = self.node(child).kind.clone();
            self.create_node(copy)
        } else {
            child
        };

        if self.root == Some(child) {
            self.root = None;
        }

        match self.children(parent).nth(position) {
            Some(reference) => self.link_before(reference, child),
            None => self.push_child(parent, child),
        }
        tracing::trace!(?parent, ?child, position, "attached node");
        Ok(child)
    }

    /// Appends a freshly created, unattached node without any checks.
    pub(crate) fn push_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(
            self.node(child).parent.is_none(),
            "child already has a parent; detach it first"
        );
        self.node_mut(child).parent = Some(parent);

        if let Some(last) = self.node(parent).last_child {
            self.node_mut(last).next_sibling = Some(child);
            self.node_mut(child).prev_sibling = Some(last);
            self.node_mut(parent).last_child = Some(child);
        } else {
            self.node_mut(parent).first_child = Some(child);
            self.node_mut(parent).last_child = Some(child);
        }
    }

    /// Links `new_child` in front of `reference`, which must be attached.
    fn link_before(&mut self, reference: NodeId, new_child: NodeId) {
        let Some(parent) = self.node(reference).parent else {
            return;
        };
        self.node_mut(new_child).parent = Some(parent);

        if let Some(prev) = self.node(reference).prev_sibling {
            self.node_mut(prev).next_sibling = Some(new_child);
            self.node_mut(new_child).prev_sibling = Some(prev);
        } else {
            self.node_mut(parent).first_child = Some(new_child);
        }

        self.node_mut(new_child).next_sibling = Some(reference);
        self.node_mut(reference).prev_sibling = Some(new_child);
    }

    fn unlink(&mut self, id: NodeId, parent: NodeId) {
        let prev = self.node(id).prev_sibling;
        let next = self.node(id).next_sibling;

        match prev {
            Some(p) => self.node_mut(p).next_sibling = next,
            None => self.node_mut(parent).first_child = next,
        }

        match next {
            Some(n) => self.node_mut(n).prev_sibling = prev,
            None => self.node_mut(parent).last_child = prev,
        }

        let data = self.node_mut(id);
        data.parent = None;
        data.prev_sibling = None;
        data.next_sibling = None;
    }

    /// Removes a node from its parent's children and clears its parent.
    ///
    /// The node stays in the arena and may be attached elsewhere.
    ///
    /// # Errors
    ///
    /// Returns `NoParent` if the node is not attached.
    pub fn detach(&mut self, id: NodeId) -> Result<(), TreeError> {
        let parent = self.node(id).parent.ok_or(TreeError::NoParent)?;
        self.unlink(id, parent);
        tracing::trace!(node = ?id, ?parent, "detached node");
        Ok(())
    }

    /// Removes `child` from `parent`'s children if it is one of them.
    ///
    /// Returns the index the child occupied, or `None` when `child` is not
    /// a child of `parent` (which is not an error).
    pub fn delete_child(&mut self, parent: NodeId, child: NodeId) -> Option<usize> {
        let index = self.children(parent).position(|c| c == child)?;
        self.unlink(child, parent);
        Some(index)
    }

    /// Copies the subtree at `id` into fresh nodes, leaving out every
    /// descendant element selected by `filter`.
    ///
    /// The copy is unattached. The node at `id` itself is always kept, and
    /// the filter is not applied below an excluded element.
    ///
    /// # Errors
    ///
    /// Returns `NotAnElement` if `id` is a text node.
    pub fn filter_out(
        &mut self,
        id: NodeId,
        filter: impl Into<Filter>,
    ) -> Result<NodeId, TreeError> {
        if !self.is_element(id) {
            return Err(TreeError::NotAnElement);
        }
        let filter = filter.into();
        Ok(self.copy_filtered(id, &filter))
    }

    fn copy_filtered(&mut self, id: NodeId, filter: &Filter) -> NodeId {
        let copy = self.create_node(self.node(id).kind.clone());
        let children: Vec<NodeId> = self.children(id).collect();
        for child in children {
            let new_child = if self.is_element(child) {
                if filter.selects(self, child) {
                    continue;
                }
                self.copy_filtered(child, filter)
            } else {
                self.create_node(self.node(child).kind.clone())
            };
            self.push_child(copy, new_child);
        }
        copy
    }

    /// Serializes the subtree at `id` as compact XML.
    #[must_use]
    pub fn to_xml_string(&self, id: NodeId) -> String {
        crate::serial::serialize(self, id)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

// --- Iterators ---

/// Iterator over the children of a node.
#[derive(Clone)]
pub struct Children<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.node(current).next_sibling;
        Some(current)
    }
}

/// Iterator over a node and its ancestors.
#[derive(Clone)]
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.node(current).parent;
        Some(current)
    }
}

/// Pre-order iterator over all descendants of a node.
#[derive(Clone)]
pub struct Descendants<'a> {
    doc: &'a Document,
    root: NodeId,
    next: Option<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;

        // Try to go deeper first
        if let Some(child) = self.doc.first_child(current) {
            self.next = Some(child);
            return Some(current);
        }

        // Walk up until an ancestor below the root has a next sibling
        let mut node = current;
        loop {
            if node == self.root {
                self.next = None;
                return Some(current);
            }
            if let Some(sibling) = self.doc.next_sibling(node) {
                self.next = Some(sibling);
                return Some(current);
            }
            match self.doc.parent(node) {
                Some(parent) => node = parent,
                None => {
                    self.next = None;
                    return Some(current);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn element(doc: &mut Document, name: &str) -> NodeId {
        doc.create_node(NodeKind::element(Name::parse(name)))
    }

    #[test]
    fn test_new_document_is_empty() {
        let doc = Document::new();
        assert_eq!(doc.root_element(), None);
        assert_eq!(doc.node_count(), 0);
    }

    #[test]
    fn test_append_multiple_children() {
        let mut doc = Document::new();
        let root = element(&mut doc, "root");
        let a = doc.create_text("A");
        let b = doc.create_text("B");
        let c = doc.create_text("C");

        doc.append_child(root, a).unwrap();
        doc.append_child(root, b).unwrap();
        doc.append_child(root, c).unwrap();

        assert_eq!(doc.first_child(root), Some(a));
        assert_eq!(doc.last_child(root), Some(c));
        assert_eq!(doc.next_sibling(a), Some(b));
        assert_eq!(doc.prev_sibling(c), Some(b));
        assert_eq!(doc.children(root).collect::<Vec<_>>(), vec![a, b, c]);
        assert_eq!(doc.parent(b), Some(root));
    }

    #[test]
    fn test_add_child_at_position() {
        let mut doc = Document::new();
        let root = element(&mut doc, "root");
        let a = element(&mut doc, "a");
        let b = element(&mut doc, "b");
        let c = element(&mut doc, "c");
        doc.append_child(root, c).unwrap();
        doc.add_child(root, a, Some(0)).unwrap();
        doc.add_child(root, b, Some(1)).unwrap();

        assert_eq!(doc.children(root).collect::<Vec<_>>(), vec![a, b, c]);
        assert_eq!(doc.to_xml_string(root), "<root><a/><b/><c/></root>");
    }

    #[test]
    fn test_add_child_out_of_range() {
        let mut doc = Document::new();
        let root = element(&mut doc, "root");
        let a = element(&mut doc, "a");
        let err = doc.add_child(root, a, Some(1)).unwrap_err();
        assert_eq!(err, TreeError::IndexOutOfRange { index: 1, len: 0 });
        assert_eq!(doc.parent(a), None);
    }

    #[test]
    fn test_add_child_to_text_fails() {
        let mut doc = Document::new();
        let text = doc.create_text("x");
        let a = element(&mut doc, "a");
        assert_eq!(doc.append_child(text, a), Err(TreeError::NotAnElement));
    }

    #[test]
    fn test_attach_requires_detach_first() {
        let mut doc = Document::new();
        let first = element(&mut doc, "first");
        let second = element(&mut doc, "second");
        let child = element(&mut doc, "child");

        doc.append_child(first, child).unwrap();
        assert_eq!(
            doc.append_child(second, child),
            Err(TreeError::AlreadyHasParent)
        );

        doc.detach(child).unwrap();
        assert_eq!(doc.parent(child), None);
        assert_eq!(doc.child_count(first), 0);

        doc.append_child(second, child).unwrap();
        assert_eq!(doc.parent(child), Some(second));
    }

    #[test]
    fn test_attaching_ancestor_is_rejected() {
        let mut doc = Document::new();
        let root = element(&mut doc, "root");
        let child = element(&mut doc, "child");
        doc.append_child(root, child).unwrap();
        assert_eq!(doc.append_child(child, root), Err(TreeError::WouldCreateCycle));
        assert_eq!(doc.append_child(root, root), Err(TreeError::WouldCreateCycle));
    }

    #[test]
    fn test_attached_text_is_copied() {
        let mut doc = Document::new();
        let a = element(&mut doc, "a");
        let b = element(&mut doc, "b");
        let text = doc.create_text("shared");
        doc.append_child(a, text).unwrap();

        let inserted = doc.append_child(b, text).unwrap();
        assert_ne!(inserted, text);
        assert_eq!(doc.parent(text), Some(a));
        assert_eq!(doc.text(b), "shared");
    }

    #[test]
    fn test_detach_without_parent_fails() {
        let mut doc = Document::new();
        let a = element(&mut doc, "a");
        assert_eq!(doc.detach(a), Err(TreeError::NoParent));
    }

    #[test]
    fn test_detach_middle_child() {
        let mut doc = Document::new();
        let root = element(&mut doc, "root");
        let a = element(&mut doc, "a");
        let b = element(&mut doc, "b");
        let c = element(&mut doc, "c");
        for child in [a, b, c] {
            doc.append_child(root, child).unwrap();
        }

        doc.detach(b).unwrap();
        assert_eq!(doc.children(root).collect::<Vec<_>>(), vec![a, c]);
        assert_eq!(doc.next_sibling(a), Some(c));
        assert_eq!(doc.prev_sibling(c), Some(a));
        assert_eq!(doc.next_sibling(b), None);
    }

    #[test]
    fn test_delete_child_reports_position() {
        let mut doc = Document::new();
        let root = element(&mut doc, "root");
        let a = element(&mut doc, "a");
        let b = element(&mut doc, "b");
        let stranger = element(&mut doc, "stranger");
        doc.append_child(root, a).unwrap();
        doc.append_child(root, b).unwrap();

        assert_eq!(doc.delete_child(root, b), Some(1));
        assert_eq!(doc.parent(b), None);
        assert_eq!(doc.delete_child(root, b), None);
        assert_eq!(doc.delete_child(root, stranger), None);
        assert_eq!(doc.children(root).collect::<Vec<_>>(), vec![a]);
    }

    #[test]
    fn test_create_element_drops_absent_attributes() {
        let mut doc = Document::new();
        let el = doc
            .create_element("x:item", [("ID", Some("1")), ("gone", None)], [])
            .unwrap();
        assert_eq!(doc.name(el), Some(&Name::new("x", "item")));
        assert_eq!(doc.attributes(el).len(), 1);
        assert_eq!(doc.attribute(el, "ID"), Some("1"));
        assert_eq!(doc.attribute(el, "gone"), None);
    }

    #[test]
    fn test_create_element_rejects_unparsable_names() {
        let mut doc = Document::new();
        let before = doc.node_count();
        assert_eq!(
            doc.create_element::<&str, &str>("my-tag", [], []),
            Err(TreeError::InvalidName("my-tag".to_string()))
        );
        assert_eq!(
            doc.create_element("a", [("a b", Some("1"))], []),
            Err(TreeError::InvalidName("a b".to_string()))
        );
        assert_eq!(doc.node_count(), before);

        // A dropped attribute is never written, so its name is not checked.
        let el = doc.create_element("a", [("a b", None::<&str>)], []).unwrap();
        let xml = doc.to_xml_string(el);
        assert!(Document::parse_str(&xml).is_ok());
    }

    #[test]
    fn test_create_element_rejects_attached_child() {
        let mut doc = Document::new();
        let child = element(&mut doc, "child");
        doc.create_element::<&str, &str>("a", [], [child]).unwrap();
        let err = doc.create_element::<&str, &str>("b", [], [child]).unwrap_err();
        assert_eq!(err, TreeError::AlreadyHasParent);
    }

    #[test]
    fn test_attribute_last_value_wins() {
        let mut doc = Document::new();
        let el = doc
            .create_element("a", [("k", Some("1")), ("k", Some("2"))], [])
            .unwrap();
        assert_eq!(doc.attribute(el, "k"), Some("2"));
    }

    #[test]
    fn test_text_concatenates_direct_children_only() {
        let mut doc = Document::new();
        let inner_text = doc.create_text("inner");
        let inner = doc.create_element::<&str, &str>("b", [], [inner_text]).unwrap();
        let t1 = doc.create_text("one ");
        let t2 = doc.create_text("two");
        let el = doc
            .create_element::<&str, &str>("a", [], [t1, inner, t2])
            .unwrap();
        assert_eq!(doc.text(el), "one two");
    }

    #[test]
    fn test_descendants_preorder() {
        let doc = Document::parse_str("<r><a><b/>t</a><c/></r>").unwrap();
        let root = doc.root_element().unwrap();
        let names: Vec<String> = doc
            .descendants(root)
            .map(|id| match doc.name(id) {
                Some(name) => name.to_string(),
                None => format!("#{}", doc.node_text(id).unwrap_or_default()),
            })
            .collect();
        assert_eq!(names, vec!["a", "b", "#t", "c"]);
    }

    #[test]
    fn test_descendants_of_nested_node_stay_in_subtree() {
        let doc = Document::parse_str("<r><a><b/></a><c/></r>").unwrap();
        let root = doc.root_element().unwrap();
        let a = doc.first_child(root).unwrap();
        assert_eq!(doc.descendants(a).count(), 1);
    }

    #[test]
    fn test_filter_out_element_identity() {
        let mut doc = Document::parse_str("<r><a/><b><a/></b></r>").unwrap();
        let root = doc.root_element().unwrap();
        let first_a = doc.first_child(root).unwrap();
        let copy = doc.filter_out(root, first_a).unwrap();
        assert_ne!(copy, root);
        assert_eq!(doc.parent(copy), None);
        assert_eq!(doc.to_xml_string(copy), "<r><b><a/></b></r>");
        // The source tree is untouched.
        assert_eq!(doc.to_xml_string(root), "<r><a/><b><a/></b></r>");
    }

    #[test]
    fn test_set_root_element() {
        let mut doc = Document::new();
        let root = element(&mut doc, "root");
        let child = element(&mut doc, "child");
        doc.append_child(root, child).unwrap();
        assert_eq!(doc.set_root_element(child), Err(TreeError::AlreadyHasParent));
        doc.set_root_element(root).unwrap();
        assert_eq!(doc.root_element(), Some(root));
    }
}
