//! searchfs core: projects a remote document store onto a read-only,
//! four-level namespace.
//!
//! The namespace is `index / doc-type / page / document`. Pages are virtual
//! directories that slice a doc type's documents into fixed-size buckets so
//! no single directory listing grows unbounded.
//!
//! Two pieces live here:
//!
//! - [`NamespaceCache`] wraps a [`searchfs_client::DocumentStore`] and
//!   memoizes each remote answer once per key for the lifetime of the mount
//!   session. Population is single-flight per key; failures are never cached.
//! - [`Resolver`] maps slash-separated path strings to existence, attributes,
//!   directory listings and file contents, consulting the cache. It owns the
//!   page-boundary arithmetic: page `p` exists iff `p * page_size < count`.
//!
//! Everything here is transport-agnostic and host-protocol-agnostic; the
//! FUSE adapter sits on top and the HTTP client below.

mod cache;
mod error;
mod resolver;

pub use cache::{DocBatch, NamespaceCache};
pub use error::Error;
pub use resolver::{DirEntry, DocPath, NodeAttr, NodeKind, Resolver};
