//! Client layer for searchfs: the document-store contract and its
//! Elasticsearch implementation.
//!
//! The rest of searchfs only depends on the [`DocumentStore`] trait - four
//! blocking read operations against a remote index → doc-type → document
//! hierarchy. [`EsClient`] implements it over the Elasticsearch REST API,
//! decoding responses through typed structs in [`wire`] so callers never see
//! raw JSON trees.
//!
//! Nothing at this layer caches; every call goes to the network.

mod error;
mod es;
mod store;
pub mod wire;

pub use error::Error;
pub use es::EsClient;
pub use store::DocumentStore;
