//! XML serialization.
//!
//! Renders an element subtree back to XML text. Text and attribute values
//! are escaped with the five predefined entities, so the output always
//! re-parses to the same tree.

pub mod xml;

pub use xml::{escape, serialize, serialize_with_options, SerializeOptions};
