//! # xmlmapper
//!
//! A small XML toolkit: a parser for a restricted XML dialect, an arena
//! tree with identity/name queries and mutation, a serializer, and a
//! declarative mapper that validates elements against a schema and projects
//! them into JSON records.
//!
//! ## Quick Start
//!
//! ```
//! use xmlmapper::{Document, Query};
//!
//! let doc = Document::parse_str(r#"<root ID="1"><child ID="2">Hello</child></root>"#)?;
//! let root = doc.root_element().unwrap();
//! let child = doc.find_one_child(root, &Query::id("2"))?;
//! assert_eq!(doc.text(child), "Hello");
//! assert_eq!(doc.to_xml_string(root), r#"<root ID="1"><child ID="2">Hello</child></root>"#);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod encoding;
pub mod error;
pub mod mapper;
pub mod parser;
pub mod serial;
pub mod tree;
pub mod util;

// Re-export primary types at the crate root for convenience.
pub use error::{MapError, ParseError, ParseErrorKind, SourceLocation, TreeError};
pub use mapper::{AttributeMode, ChildMode, Mapper, MapperBuilder, Path, Validator};
pub use parser::ParseOptions;
pub use tree::{Attribute, Document, Filter, NodeId, NodeKind, Query};
pub use util::qname::Name;
