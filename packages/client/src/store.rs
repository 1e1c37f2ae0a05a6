//! The document store contract consumed by the namespace core.

use std::collections::HashMap;

use bytes::Bytes;

use crate::Error;

/// Read operations against a remote, schema-less document store organized as
/// index → document-type → document.
///
/// Every call is blocking and goes to the network - implementations do not
/// cache. Timeouts and cancellation are the implementation's concern; callers
/// only see success or [`Error`].
///
/// # Object Safety
///
/// This trait is object-safe: the core holds it as `Arc<dyn DocumentStore>`.
pub trait DocumentStore: Send + Sync {
    /// List the names of all indices in the store.
    ///
    /// The result is atomic: either the full list is returned or the call
    /// fails. Partial listings are never produced.
    fn index_names(&self) -> Result<Vec<String>, Error>;

    /// List the document types of one index.
    ///
    /// An index may legitimately have zero types. "Index not found" is
    /// signaled by absence from [`index_names`](Self::index_names), not by
    /// this call.
    fn doc_types(&self, index: &str) -> Result<Vec<String>, Error>;

    /// Count the documents of one type. A snapshot, not a live value.
    fn count_docs(&self, index: &str, doc_type: &str) -> Result<u64, Error>;

    /// Fetch at most `size` documents of one type starting at `from`, in the
    /// store's natural order, keyed by document id.
    ///
    /// The only ordering guarantee is "same query over the same backing data
    /// gives the same result".
    fn fetch_docs(
        &self,
        index: &str,
        doc_type: &str,
        from: u64,
        size: u64,
    ) -> Result<HashMap<String, Bytes>, Error>;
}

impl<T: DocumentStore + ?Sized> DocumentStore for std::sync::Arc<T> {
    fn index_names(&self) -> Result<Vec<String>, Error> {
        self.as_ref().index_names()
    }

    fn doc_types(&self, index: &str) -> Result<Vec<String>, Error> {
        self.as_ref().doc_types(index)
    }

    fn count_docs(&self, index: &str, doc_type: &str) -> Result<u64, Error> {
        self.as_ref().count_docs(index, doc_type)
    }

    fn fetch_docs(
        &self,
        index: &str,
        doc_type: &str,
        from: u64,
        size: u64,
    ) -> Result<HashMap<String, Bytes>, Error> {
        self.as_ref().fetch_docs(index, doc_type, from, size)
    }
}
