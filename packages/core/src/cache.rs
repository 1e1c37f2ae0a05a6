//! Lazy, populate-once-per-key cache over a [`DocumentStore`].

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use searchfs_client::DocumentStore;

use crate::Error;

/// One fetched page of documents, id → raw bytes. Shared read-only between
/// callers; cloning is a refcount bump.
pub type DocBatch = Arc<HashMap<String, Bytes>>;

/// A single cache entry, created empty and filled at most once.
///
/// The slot's own lock is held across the backend call, which is what makes
/// population single-flight: concurrent callers for the same key queue on the
/// slot, and whoever arrives after the winner sees the memoized value.
/// Unrelated keys have unrelated slots and populate in parallel.
type Slot<T> = Arc<Mutex<Option<T>>>;

fn slot_for<K, T>(map: &Mutex<HashMap<K, Slot<T>>>, key: K) -> Slot<T>
where
    K: Eq + Hash,
{
    map.lock().entry(key).or_default().clone()
}

fn populate<T, F>(slot: &Slot<T>, fetch: F) -> Result<T, Error>
where
    T: Clone,
    F: FnOnce() -> Result<T, searchfs_client::Error>,
{
    let mut guard = slot.lock();
    if let Some(value) = guard.as_ref() {
        return Ok(value.clone());
    }
    // A failure leaves the slot empty so the next caller retries.
    let value = fetch()?;
    *guard = Some(value.clone());
    Ok(value)
}

/// Memoizing view of a remote document store.
///
/// Each `ensure_*` performs at most one backend call per previously-unseen
/// key and is cheap once cached. Values are immutable for the lifetime of
/// the cache; there is no invalidation or refresh. The four families
/// (indices, types, counts, document batches) are independent caches -
/// populating one implies nothing about the others.
pub struct NamespaceCache {
    store: Arc<dyn DocumentStore>,
    page_size: u64,
    indices: Slot<Arc<[String]>>,
    types: Mutex<HashMap<String, Slot<Arc<[String]>>>>,
    counts: Mutex<HashMap<(String, String), Slot<u64>>>,
    docs: Mutex<HashMap<(String, String, u64), Slot<DocBatch>>>,
}

impl NamespaceCache {
    /// Create a cache over `store` with the given page size.
    ///
    /// # Panics
    ///
    /// Panics if `page_size` is zero; the boundary arithmetic divides by it.
    pub fn new(store: Arc<dyn DocumentStore>, page_size: u64) -> Self {
        assert!(page_size >= 1, "page size must be at least 1");
        Self {
            store,
            page_size,
            indices: Slot::default(),
            types: Mutex::new(HashMap::new()),
            counts: Mutex::new(HashMap::new()),
            docs: Mutex::new(HashMap::new()),
        }
    }

    /// The fixed number of documents per page bucket.
    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// All index names in the store.
    pub fn ensure_indices(&self) -> Result<Arc<[String]>, Error> {
        populate(&self.indices, || {
            self.store.index_names().map(Arc::from)
        })
    }

    /// The document types of `index`. May be empty; an unknown index is the
    /// caller's concern (membership in [`ensure_indices`](Self::ensure_indices)).
    pub fn ensure_types(&self, index: &str) -> Result<Arc<[String]>, Error> {
        let slot = slot_for(&self.types, index.to_owned());
        populate(&slot, || self.store.doc_types(index).map(Arc::from))
    }

    /// The document count snapshot for `(index, doc_type)`.
    pub fn ensure_count(&self, index: &str, doc_type: &str) -> Result<u64, Error> {
        let slot = slot_for(&self.counts, (index.to_owned(), doc_type.to_owned()));
        populate(&slot, || self.store.count_docs(index, doc_type))
    }

    /// The documents of page `page`: at most `page_size` entries starting at
    /// offset `page * page_size`.
    pub fn ensure_docs(&self, index: &str, doc_type: &str, page: u64) -> Result<DocBatch, Error> {
        let slot = slot_for(
            &self.docs,
            (index.to_owned(), doc_type.to_owned(), page),
        );
        populate(&slot, || {
            let from = page.saturating_mul(self.page_size);
            self.store
                .fetch_docs(index, doc_type, from, self.page_size)
                .map(Arc::new)
        })
    }
}
