//! Diagnostic paths into a mapped subtree.

use std::fmt;

/// One step of a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// The element the mapping started at, by rendered name.
    Element(String),
    /// A child element, by index among its parent's element children and
    /// local name.
    Child { index: usize, name: String },
    /// An attribute, by rendered name.
    Attribute(String),
    /// The text content of the current element.
    Text,
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element(name) => f.write_str(name),
            Self::Child { index, name } => write!(f, "{name}[{index}]"),
            Self::Attribute(name) => write!(f, "@{name}"),
            Self::Text => f.write_str("text content"),
        }
    }
}

/// Where in the input a mapping error occurred.
///
/// Displays as its segments joined with `/`, e.g. `root/User[1]/@id`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    /// A path starting at the element called `name`.
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            segments: vec![PathSegment::Element(name.into())],
        }
    }

    fn with(&self, segment: PathSegment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }

    #[must_use]
    pub fn child(&self, index: usize, name: impl Into<String>) -> Self {
        self.with(PathSegment::Child {
            index,
            name: name.into(),
        })
    }

    #[must_use]
    pub fn attribute(&self, name: impl Into<String>) -> Self {
        self.with(PathSegment::Attribute(name.into()))
    }

    #[must_use]
    pub fn text(&self) -> Self {
        self.with(PathSegment::Text)
    }

    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    #[must_use]
    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_display() {
        let path = Path::root("a:root").child(1, "User").attribute("id");
        assert_eq!(path.to_string(), "a:root/User[1]/@id");
        assert_eq!(Path::root("r").text().to_string(), "r/text content");
    }

    #[test]
    fn test_extending_does_not_modify_parent() {
        let root = Path::root("r");
        let child = root.child(0, "c");
        assert_eq!(root.segments().len(), 1);
        assert_eq!(
            child.last(),
            Some(&PathSegment::Child {
                index: 0,
                name: "c".to_string()
            })
        );
    }
}
