//! Qualified name handling.
//!
//! A qualified name is `prefix:local` or just `local`. Prefixes are opaque:
//! no namespace resolution is performed, so `a:x` and `b:x` are different
//! names even if both prefixes would bind the same URI.

use std::fmt;

use crate::parser::input::is_alphanumeric;

/// Splits a qualified name into its prefix and local name parts.
///
/// Only the first colon splits. A name without a colon has an empty prefix.
///
/// # Examples
///
/// ```
/// use xmlmapper::util::qname::split_qname;
///
/// assert_eq!(split_qname("svg:rect"), ("svg", "rect"));
/// assert_eq!(split_qname("div"), ("", "div"));
/// ```
#[must_use]
pub fn split_qname(qname: &str) -> (&str, &str) {
    match qname.find(':') {
        Some(pos) => (&qname[..pos], &qname[pos + 1..]),
        None => ("", qname),
    }
}

/// A qualified XML name.
///
/// Two names are equal iff both the prefix and the local part match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Name {
    /// Namespace prefix, empty when the name is unprefixed.
    pub prefix: String,
    /// Local part of the name.
    pub name: String,
}

impl Name {
    /// Creates a name from its two parts.
    pub fn new(prefix: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            name: name.into(),
        }
    }

    /// Creates an unprefixed name.
    pub fn local(name: impl Into<String>) -> Self {
        Self::new(String::new(), name)
    }

    /// Parses `prefix:local` or `local`.
    #[must_use]
    pub fn parse(qname: &str) -> Self {
        let (prefix, name) = split_qname(qname);
        Self::new(prefix, name)
    }

    /// Returns `true` if the name can be written out and parsed back: a
    /// non-empty alphanumeric local part and an optional alphanumeric prefix.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        let part = |s: &str| !s.is_empty() && s.chars().all(is_alphanumeric);
        part(&self.name) && (self.prefix.is_empty() || part(&self.prefix))
    }

    /// Returns `true` for `xmlns` and any `xmlns:*` declaration.
    #[must_use]
    pub fn is_namespace_declaration(&self) -> bool {
        self.prefix == "xmlns" || (self.prefix.is_empty() && self.name == "xmlns")
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prefix.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}:{}", self.prefix, self.name)
        }
    }
}

impl From<&str> for Name {
    fn from(qname: &str) -> Self {
        Self::parse(qname)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_qname_with_prefix() {
        assert_eq!(split_qname("xml:lang"), ("xml", "lang"));
    }

    #[test]
    fn test_split_qname_without_prefix() {
        assert_eq!(split_qname("div"), ("", "div"));
    }

    #[test]
    fn test_split_qname_multiple_colons() {
        // Only splits on first colon
        assert_eq!(split_qname("a:b:c"), ("a", "b:c"));
    }

    #[test]
    fn test_name_display() {
        assert_eq!(Name::parse("xml:ID").to_string(), "xml:ID");
        assert_eq!(Name::local("ID").to_string(), "ID");
    }

    #[test]
    fn test_name_equality_requires_both_parts() {
        assert_eq!(Name::parse("a:x"), Name::new("a", "x"));
        assert_ne!(Name::parse("a:x"), Name::parse("b:x"));
        assert_ne!(Name::parse("a:x"), Name::local("x"));
    }

    #[test]
    fn test_well_formed_names() {
        assert!(Name::parse("a:x1").is_well_formed());
        assert!(Name::parse("ID").is_well_formed());
        for bad in ["", "my-tag", "a b", ":x", "p:", "a:b:c", "é"] {
            assert!(!Name::parse(bad).is_well_formed(), "{bad:?}");
        }
    }

    #[test]
    fn test_namespace_declarations() {
        assert!(Name::parse("xmlns").is_namespace_declaration());
        assert!(Name::parse("xmlns:foo").is_namespace_declaration());
        assert!(!Name::parse("foo:xmlns").is_namespace_declaration());
        assert!(!Name::parse("xmlnsx").is_namespace_declaration());
    }
}
