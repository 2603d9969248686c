//! Element queries.
//!
//! A [`Query`] selects elements by the value of their `ID` attribute, by
//! local name, or by either. When both fields are set an element matches if
//! *either* one matches; the fields are OR-ed, not AND-ed.
//!
//! The `find_*` searches are lazy iterators over the arena. Calling a search
//! again starts a fresh traversal, and the iterators are `Clone` so a
//! partially consumed search can be forked.

use crate::error::TreeError;
use crate::util::qname::Name;

use super::{Children, Descendants, Document, NodeId};

/// A filter over elements.
///
/// # Examples
///
/// ```
/// use xmlmapper::{Document, Query};
///
/// let doc = Document::parse_str(r#"<r><a ID="1"/><b/><x:b/></r>"#).unwrap();
/// let root = doc.root_element().unwrap();
/// assert_eq!(doc.find_children(root, &Query::name("b")).count(), 2);
/// assert_eq!(doc.find_children(root, &Query::id("1").with_name("b")).count(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    /// Matches the value of an attribute named exactly `ID` (no prefix).
    pub id: Option<String>,
    /// Matches the element's local name, ignoring any prefix.
    pub name: Option<String>,
}

impl Query {
    /// A query matching elements whose `ID` attribute equals `id`.
    pub fn id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: None,
        }
    }

    /// A query matching elements with local name `name`.
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// What [`Document::filter_out`] removes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Every element matching the query.
    Query(Query),
    /// One specific element, by identity.
    Node(NodeId),
}

impl Filter {
    pub(crate) fn selects(&self, doc: &Document, id: NodeId) -> bool {
        match self {
            Self::Query(query) => doc.matches(id, query),
            Self::Node(node) => *node == id,
        }
    }
}

impl From<Query> for Filter {
    fn from(query: Query) -> Self {
        Self::Query(query)
    }
}

impl From<NodeId> for Filter {
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}

/// Lazy search over the direct element children of a node.
#[derive(Clone)]
pub struct FindChildren<'a> {
    doc: &'a Document,
    query: Query,
    inner: Children<'a>,
}

impl Iterator for FindChildren<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let (doc, query) = (self.doc, &self.query);
        self.inner.find(|&id| doc.matches(id, query))
    }
}

/// Lazy pre-order search over the element descendants of a node.
#[derive(Clone)]
pub struct FindDescendants<'a> {
    doc: &'a Document,
    query: Query,
    inner: Descendants<'a>,
}

impl Iterator for FindDescendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let (doc, query) = (self.doc, &self.query);
        self.inner.find(|&id| doc.matches(id, query))
    }
}

/// Takes at most one item, failing if the iterator has another.
fn at_most_one(mut found: impl Iterator<Item = NodeId>) -> Result<Option<NodeId>, TreeError> {
    let first = found.next();
    if first.is_some() && found.next().is_some() {
        return Err(TreeError::MultipleMatches);
    }
    Ok(first)
}

impl Document {
    /// Returns `true` if `id` is an element matching `query`.
    ///
    /// A query with neither field set matches nothing.
    #[must_use]
    pub fn matches(&self, id: NodeId, query: &Query) -> bool {
        let Some(name) = self.name(id) else {
            return false;
        };
        let id_matches = query.id.as_deref().is_some_and(|wanted| {
            let id_attr = Name::local("ID");
            self.attributes(id)
                .iter()
                .rev()
                .find(|a| a.name == id_attr)
                .is_some_and(|a| a.value == wanted)
        });
        let name_matches = query.name.as_deref() == Some(name.name.as_str());
        id_matches || name_matches
    }

    /// Lazily yields the direct element children of `id` matching `query`,
    /// in document order.
    pub fn find_children(&self, id: NodeId, query: &Query) -> FindChildren<'_> {
        FindChildren {
            doc: self,
            query: query.clone(),
            inner: self.children(id),
        }
    }

    /// Lazily yields the element descendants of `id` matching `query` in
    /// pre-order. `id` itself is never yielded.
    pub fn find_descendants(&self, id: NodeId, query: &Query) -> FindDescendants<'_> {
        FindDescendants {
            doc: self,
            query: query.clone(),
            inner: self.descendants(id),
        }
    }

    /// Returns the single matching child, if any.
    ///
    /// # Errors
    ///
    /// Returns `MultipleMatches` if more than one child matches.
    pub fn find_at_most_one_child(
        &self,
        id: NodeId,
        query: &Query,
    ) -> Result<Option<NodeId>, TreeError> {
        at_most_one(self.find_children(id, query))
    }

    /// Returns the single matching descendant, if any.
    ///
    /// # Errors
    ///
    /// Returns `MultipleMatches` if more than one descendant matches.
    pub fn find_at_most_one_descendant(
        &self,
        id: NodeId,
        query: &Query,
    ) -> Result<Option<NodeId>, TreeError> {
        at_most_one(self.find_descendants(id, query))
    }

    /// Returns the single matching child.
    ///
    /// # Errors
    ///
    /// `MultipleMatches` for more than one match, `NoMatch` for none.
    pub fn find_one_child(&self, id: NodeId, query: &Query) -> Result<NodeId, TreeError> {
        self.find_at_most_one_child(id, query)?
            .ok_or(TreeError::NoMatch)
    }

    /// Returns the single matching descendant.
    ///
    /// # Errors
    ///
    /// `MultipleMatches` for more than one match, `NoMatch` for none.
    pub fn find_one_descendant(&self, id: NodeId, query: &Query) -> Result<NodeId, TreeError> {
        self.find_at_most_one_descendant(id, query)?
            .ok_or(TreeError::NoMatch)
    }
}
