//! # hkbase Model
//!
//! Domain data model for the hkbase knowledge-graph service.
//!
//! This crate provides:
//! - Typed entities (nodes, contexts, links, connectors, references)
//!   matching the JSON representation hkbase exchanges on the wire
//! - Conversion between generic JSON values and typed entities
//! - Content-type constants for RDF import
//!
//! No I/O happens here; the HTTP client lives in `hkbase-client`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod content;
pub mod entity;

pub use content::{ContentType, UnknownContentType};
pub use entity::{Connector, Context, HkEntity, Link, ModelError, Node, Reference};
