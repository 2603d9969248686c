//! Utility modules for xmlmapper.
//!
//! Contains qualified name handling.

pub mod qname;
