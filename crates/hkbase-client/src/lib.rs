//! # hkbase Client
//!
//! Async HTTP client for the hkbase knowledge-graph service.
//!
//! Two layers, mirroring the server's REST namespace:
//! - [`HkBase`]: connection configuration and repository-level operations
//!   (list, connect, create, delete)
//! - [`HkRepository`]: entity CRUD, RDF import, and HyQL queries scoped to
//!   one repository
//!
//! Every operation issues exactly one HTTP request and routes the response
//! through a shared validator. Server-reported failures surface as
//! [`HkError::Server`] with status and body intact; any other failure is
//! wrapped into [`HkError::Client`] with the original cause retained.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod base;
pub mod encoding;
pub mod error;
pub mod repository;
mod response;
pub mod transaction;

pub use base::{HkBase, HkBaseConfig};
pub use error::HkError;
pub use repository::{
    ContextRef, EntityFilter, HkRepository, ImportOptions, ImportSource, IntoEntityIds,
    IntoEntityValues,
};
pub use transaction::HkTransaction;
