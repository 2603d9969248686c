//! Declarative element-to-record mapping.
//!
//! A [`MapperBuilder`] describes the shape an element is expected to have:
//! its name, which attributes it carries, which child elements may occur
//! and how often, and whether it holds text. [`MapperBuilder::build`]
//! compiles the description into a [`Mapper`] that checks an element
//! against it and projects it into a JSON object.
//!
//! ```
//! use xmlmapper::mapper::{AttributeMode, ChildMode, IntegerValidator, MapperBuilder};
//! use xmlmapper::Document;
//!
//! let user = MapperBuilder::new()
//!     .attribute("id", AttributeMode::Required, IntegerValidator::default())?
//!     .build();
//! let root = MapperBuilder::new()
//!     .name("root")?
//!     .child("User", ChildMode::Repeated { min: 1 }, user)?
//!     .build();
//!
//! let doc = Document::parse_str(r#"<root><User id="1"/><User id="2"/></root>"#)?;
//! let record = root.map(&doc, doc.root_element().unwrap(), None)?;
//! assert_eq!(record["User"][1]["id"], 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod path;
pub mod validate;

pub use path::{Path, PathSegment};
pub use validate::{
    BooleanValidator, DateTimeValidator, FromStrValidator, IntegerValidator, StringValidator,
    Validator,
};

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{MapError, MissingChild, TreeError};
use crate::parser::input::is_whitespace;
use crate::tree::{Document, NodeId};
use crate::util::qname::Name;

/// How an attribute rule treats its attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeMode {
    /// Must be present; its parsed value is stored.
    Required,
    /// May be present; its parsed value is stored when it is.
    Optional,
    /// May be present; its value is validated and then dropped.
    Ignored,
}

/// How a child rule treats matching child elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildMode {
    /// Exactly one; stored as a single value.
    Required,
    /// Zero or one; stored as a single value when present.
    Optional,
    /// Any number, at least `min` (0 or 1); stored as an array.
    Repeated { min: usize },
    /// Any number; each is mapped and the results dropped.
    Ignored,
}

impl ChildMode {
    fn min(self) -> usize {
        match self {
            Self::Required => 1,
            Self::Repeated { min } => min,
            Self::Optional | Self::Ignored => 0,
        }
    }

    fn max(self) -> Option<usize> {
        match self {
            Self::Required | Self::Optional => Some(1),
            Self::Repeated { .. } | Self::Ignored => None,
        }
    }
}

type ParseFn = Arc<dyn Fn(&Path, &str) -> Result<Value, MapError> + Send + Sync>;

fn erase<V: Validator + 'static>(validator: V) -> ParseFn {
    Arc::new(move |path: &Path, raw: &str| {
        let output = validator.parse(path, raw)?;
        serde_json::to_value(output).map_err(|e| MapError::invalid(path, e.to_string()))
    })
}

struct AttributeRule {
    qname: Name,
    mode: AttributeMode,
    parse: ParseFn,
}

struct ChildRule {
    name: String,
    mode: ChildMode,
    mapper: Mapper,
}

struct TextRule {
    key: String,
    parse: Option<ParseFn>,
}

struct Schema {
    expected_name: Option<String>,
    attributes: Vec<AttributeRule>,
    children: Vec<ChildRule>,
    text: Option<TextRule>,
}

/// Accumulates a schema for one element type.
///
/// Every method checks its argument against what was declared before and
/// fails with [`MapError::BuilderMisuse`] on a conflict, so a successfully
/// built mapper never has ambiguous rules.
pub struct MapperBuilder {
    schema: Schema,
    keys: BTreeSet<String>,
}

impl Default for MapperBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MapperBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapperBuilder")
            .field("schema", &self.schema)
            .finish()
    }
}

impl MapperBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            schema: Schema {
                expected_name: None,
                attributes: Vec::new(),
                children: Vec::new(),
                text: None,
            },
            keys: BTreeSet::new(),
        }
    }

    fn claim_key(&mut self, key: &str) -> Result<(), MapError> {
        if self.keys.insert(key.to_string()) {
            Ok(())
        } else {
            Err(MapError::BuilderMisuse(format!(
                "output key '{key}' is used by two rules"
            )))
        }
    }

    /// Requires the element's local name to be `name`.
    ///
    /// # Errors
    ///
    /// `BuilderMisuse` if an expected name was already declared.
    pub fn name(mut self, name: impl Into<String>) -> Result<Self, MapError> {
        if let Some(existing) = &self.schema.expected_name {
            return Err(MapError::BuilderMisuse(format!(
                "element name already declared as '{existing}'"
            )));
        }
        self.schema.expected_name = Some(name.into());
        Ok(self)
    }

    /// Declares a rule for the attribute with qualified name `qname`.
    ///
    /// The value is stored under the attribute's local name unless `mode`
    /// is [`AttributeMode::Ignored`].
    ///
    /// # Errors
    ///
    /// `BuilderMisuse` if `qname` already has a rule, names a namespace
    /// declaration, or its local name collides with another output key.
    pub fn attribute<V>(
        mut self,
        qname: &str,
        mode: AttributeMode,
        validator: V,
    ) -> Result<Self, MapError>
    where
        V: Validator + 'static,
    {
        let qname = Name::parse(qname);
        if qname.is_namespace_declaration() {
            return Err(MapError::BuilderMisuse(format!(
                "'{qname}' is a namespace declaration and is never mapped"
            )));
        }
        if self.schema.attributes.iter().any(|rule| rule.qname == qname) {
            return Err(MapError::BuilderMisuse(format!(
                "attribute '{qname}' already has a rule"
            )));
        }
        if mode != AttributeMode::Ignored {
            self.claim_key(&qname.name)?;
        }
        self.schema.attributes.push(AttributeRule {
            qname,
            mode,
            parse: erase(validator),
        });
        Ok(self)
    }

    /// Declares a rule for child elements with local name `name`, each
    /// projected by `mapper`.
    ///
    /// # Errors
    ///
    /// `BuilderMisuse` if `name` already has a rule, a repeated minimum is
    /// not 0 or 1, or the name collides with another output key.
    pub fn child(
        mut self,
        name: impl Into<String>,
        mode: ChildMode,
        mapper: Mapper,
    ) -> Result<Self, MapError> {
        let name = name.into();
        if let ChildMode::Repeated { min } = mode {
            if min > 1 {
                return Err(MapError::BuilderMisuse(format!(
                    "repeated child '{name}' has minimum {min}; only 0 or 1 is supported"
                )));
            }
        }
        if self.schema.children.iter().any(|rule| rule.name == name) {
            return Err(MapError::BuilderMisuse(format!(
                "child '{name}' already has a rule"
            )));
        }
        if mode != ChildMode::Ignored {
            self.claim_key(&name)?;
        }
        self.schema.children.push(ChildRule { name, mode, mapper });
        Ok(self)
    }

    /// Expects text content, stored verbatim under `key`.
    ///
    /// # Errors
    ///
    /// `BuilderMisuse` if a text rule was already declared or `key` is taken.
    pub fn text(self, key: impl Into<String>) -> Result<Self, MapError> {
        self.text_rule(key.into(), None)
    }

    /// Expects text content, parsed by `validator` and stored under `key`.
    ///
    /// # Errors
    ///
    /// `BuilderMisuse` if a text rule was already declared or `key` is taken.
    pub fn text_with<V>(self, key: impl Into<String>, validator: V) -> Result<Self, MapError>
    where
        V: Validator + 'static,
    {
        self.text_rule(key.into(), Some(erase(validator)))
    }

    fn text_rule(mut self, key: String, parse: Option<ParseFn>) -> Result<Self, MapError> {
        if self.schema.text.is_some() {
            return Err(MapError::BuilderMisuse(
                "text content already has a rule".to_string(),
            ));
        }
        self.claim_key(&key)?;
        self.schema.text = Some(TextRule { key, parse });
        Ok(self)
    }

    /// Compiles the schema.
    #[must_use]
    pub fn build(self) -> Mapper {
        debug!(
            name = self.schema.expected_name.as_deref().unwrap_or("*"),
            attributes = self.schema.attributes.len(),
            children = self.schema.children.len(),
            text = self.schema.text.is_some(),
            "compiled mapper"
        );
        Mapper {
            schema: Arc::new(self.schema),
        }
    }
}

/// A compiled schema that validates an element and projects it into a
/// JSON object.
///
/// Cloning is cheap; clones share the compiled schema.
#[derive(Clone)]
pub struct Mapper {
    schema: Arc<Schema>,
}

impl fmt::Debug for Mapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapper")
            .field("schema", &self.schema)
            .finish()
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("expected_name", &self.expected_name)
            .field(
                "attributes",
                &self
                    .attributes
                    .iter()
                    .map(|rule| (rule.qname.to_string(), rule.mode))
                    .collect::<Vec<_>>(),
            )
            .field(
                "children",
                &self
                    .children
                    .iter()
                    .map(|rule| (rule.name.as_str(), rule.mode))
                    .collect::<Vec<_>>(),
            )
            .field("text", &self.text.as_ref().map(|rule| rule.key.as_str()))
            .finish()
    }
}

impl Mapper {
    /// Maps the element `id` into a JSON object.
    ///
    /// `path` prefixes every error location; it defaults to the element's
    /// rendered name.
    ///
    /// # Errors
    ///
    /// `MapError::Tree(NotAnElement)` if `id` is a text node, otherwise the
    /// first schema violation found, in document order.
    pub fn map(&self, doc: &Document, id: NodeId, path: Option<Path>) -> Result<Value, MapError> {
        let name = doc.name(id).ok_or(TreeError::NotAnElement)?;
        let path = path.unwrap_or_else(|| Path::root(name.to_string()));
        self.map_at(doc, id, &path).map_err(|err| {
            debug!(path = %path, error = %err, "mapping failed");
            err
        })
    }

    /// Maps the element `id` and deserializes the record into `T`.
    ///
    /// # Errors
    ///
    /// Any error from [`Mapper::map`], or `MapError::Deserialize` if the
    /// record does not fit `T`.
    pub fn map_into<T: DeserializeOwned>(&self, doc: &Document, id: NodeId) -> Result<T, MapError> {
        let record = self.map(doc, id, None)?;
        Ok(serde_json::from_value(record)?)
    }

    fn map_at(&self, doc: &Document, id: NodeId, path: &Path) -> Result<Value, MapError> {
        let schema = &*self.schema;
        let name = doc.name(id).ok_or(TreeError::NotAnElement)?;

        if let Some(expected) = &schema.expected_name {
            if name.name != *expected {
                return Err(MapError::UnexpectedElementName {
                    path: path.clone(),
                    expected: expected.clone(),
                    found: name.name.clone(),
                });
            }
        }

        let mut record = Map::new();
        self.map_attributes(doc, id, path, &mut record)?;
        self.map_content(doc, id, path, &mut record)?;
        Ok(Value::Object(record))
    }

    fn map_attributes(
        &self,
        doc: &Document,
        id: NodeId,
        path: &Path,
        record: &mut Map<String, Value>,
    ) -> Result<(), MapError> {
        let rules = &self.schema.attributes;
        let mut seen: HashSet<&Name> = HashSet::new();
        let mut present = Vec::new();

        for attr in doc.attributes(id) {
            if attr.name.is_namespace_declaration() {
                continue;
            }
            let rule = rules.iter().find(|rule| rule.qname == attr.name);
            match rule {
                Some(rule) if seen.insert(&attr.name) => present.push((rule, attr)),
                _ => {
                    return Err(MapError::UnexpectedAttribute {
                        path: path.attribute(attr.name.to_string()),
                    })
                }
            }
        }

        let mut missing: Vec<String> = rules
            .iter()
            .filter(|rule| rule.mode == AttributeMode::Required && !seen.contains(&rule.qname))
            .map(|rule| rule.qname.to_string())
            .collect();
        if !missing.is_empty() {
            missing.sort();
            return Err(MapError::MissingAttributes {
                path: path.clone(),
                names: missing,
            });
        }

        for (rule, attr) in present {
            let value = (rule.parse)(&path.attribute(attr.name.to_string()), &attr.value)?;
            if rule.mode != AttributeMode::Ignored {
                record.insert(rule.qname.name.clone(), value);
            }
        }
        Ok(())
    }

    fn map_content(
        &self,
        doc: &Document,
        id: NodeId,
        path: &Path,
        record: &mut Map<String, Value>,
    ) -> Result<(), MapError> {
        let schema = &*self.schema;
        let mut found: Vec<Vec<Value>> = vec![Vec::new(); schema.children.len()];
        let mut counts = vec![0usize; schema.children.len()];
        let mut text: Option<&str> = None;
        let mut index = 0;

        for child in doc.children(id) {
            if let Some(content) = doc.node_text(child) {
                if content.chars().all(is_whitespace) {
                    continue;
                }
                if schema.text.is_none() || text.is_some() {
                    return Err(MapError::UnexpectedText { path: path.text() });
                }
                text = Some(content);
                continue;
            }

            let Some(child_name) = doc.name(child) else {
                continue;
            };
            let child_path = path.child(index, child_name.name.clone());
            index += 1;

            let Some(slot) = schema
                .children
                .iter()
                .position(|rule| rule.name == child_name.name)
            else {
                return Err(MapError::UnexpectedChild { path: child_path });
            };
            let rule = &schema.children[slot];
            if rule.mode.max().is_some_and(|max| counts[slot] >= max) {
                return Err(MapError::UnexpectedChild { path: child_path });
            }
            let value = rule.mapper.map_at(doc, child, &child_path)?;
            counts[slot] += 1;
            if rule.mode != ChildMode::Ignored {
                found[slot].push(value);
            }
        }

        let missing: Vec<MissingChild> = schema
            .children
            .iter()
            .zip(&counts)
            .filter(|(rule, count)| **count < rule.mode.min())
            .map(|(rule, &count)| MissingChild {
                name: rule.name.clone(),
                required: rule.mode.min(),
                found: count,
            })
            .collect();
        if !missing.is_empty() {
            return Err(MapError::MissingChildren {
                path: path.clone(),
                missing,
            });
        }

        if let Some(rule) = &schema.text {
            let Some(content) = text else {
                return Err(MapError::MissingText { path: path.text() });
            };
            let value = match &rule.parse {
                Some(parse) => parse(&path.text(), content)?,
                None => Value::String(content.to_string()),
            };
            record.insert(rule.key.clone(), value);
        }

        for (rule, mut values) in schema.children.iter().zip(found) {
            match rule.mode {
                ChildMode::Required | ChildMode::Optional => {
                    if let Some(value) = values.pop() {
                        record.insert(rule.name.clone(), value);
                    }
                }
                ChildMode::Repeated { .. } => {
                    record.insert(rule.name.clone(), Value::Array(values));
                }
                ChildMode::Ignored => {}
            }
        }
        Ok(())
    }
}
