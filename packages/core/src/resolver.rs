//! Path classification and namespace resolution.

use bytes::Bytes;

use crate::{Error, NamespaceCache};

/// A classified namespace path.
///
/// The namespace is exactly four levels deep; classification is a fixed-depth
/// match on the non-empty path segments, not ad-hoc string surgery at each
/// call site. Deeper paths and non-numeric page segments are malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocPath {
    /// `/` - the namespace root.
    Root,
    /// `/{index}`
    Index { index: String },
    /// `/{index}/{doc_type}`
    DocType { index: String, doc_type: String },
    /// `/{index}/{doc_type}/{page}`
    Page {
        index: String,
        doc_type: String,
        page: u64,
    },
    /// `/{index}/{doc_type}/{page}/{doc_id}`
    Document {
        index: String,
        doc_type: String,
        page: u64,
        doc_id: String,
    },
}

impl DocPath {
    /// Classify a slash-separated path. Empty segments (doubled or trailing
    /// slashes) are ignored.
    pub fn parse(path: &str) -> Result<Self, Error> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Ok(DocPath::Root),
            [index] => Ok(DocPath::Index {
                index: (*index).to_string(),
            }),
            [index, doc_type] => Ok(DocPath::DocType {
                index: (*index).to_string(),
                doc_type: (*doc_type).to_string(),
            }),
            [index, doc_type, page] => Ok(DocPath::Page {
                index: (*index).to_string(),
                doc_type: (*doc_type).to_string(),
                page: parse_page(page)?,
            }),
            [index, doc_type, page, doc_id] => Ok(DocPath::Document {
                index: (*index).to_string(),
                doc_type: (*doc_type).to_string(),
                page: parse_page(page)?,
                doc_id: (*doc_id).to_string(),
            }),
            _ => Err(Error::MalformedPath {
                segment: path.to_string(),
            }),
        }
    }
}

/// Page segments must be plain non-negative decimal integers; signs,
/// whitespace and overflow are all malformed.
fn parse_page(segment: &str) -> Result<u64, Error> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::MalformedPath {
            segment: segment.to_string(),
        });
    }
    segment.parse().map_err(|_| Error::MalformedPath {
        segment: segment.to_string(),
    })
}

/// What kind of node a path resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Directory,
    File,
}

/// Attributes of a resolved node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeAttr {
    Directory,
    File { size: u64 },
}

impl NodeAttr {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeAttr::Directory => NodeKind::Directory,
            NodeAttr::File { .. } => NodeKind::File,
        }
    }
}

/// One entry in a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: NodeKind,
}

impl DirEntry {
    fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Directory,
        }
    }

    fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::File,
        }
    }
}

/// Maps namespace paths to attributes, listings and contents.
///
/// Pure delegation over the cache; the resolver holds no state of its own.
/// Existence checks run top-down: a child level is never queried until the
/// ancestor's existence is established, so an unknown index yields
/// [`Error::NotFound`] without a doc-type query, and a document batch is
/// never fetched before the page boundary check has passed.
pub struct Resolver {
    cache: NamespaceCache,
}

impl Resolver {
    pub fn new(cache: NamespaceCache) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &NamespaceCache {
        &self.cache
    }

    /// Resolve a path to node attributes, or `NotFound`.
    pub fn stat(&self, path: &str) -> Result<NodeAttr, Error> {
        log::debug!("stat: path={path}");
        match DocPath::parse(path)? {
            DocPath::Root => Ok(NodeAttr::Directory),
            DocPath::Index { index } => {
                self.check_index(&index)?;
                Ok(NodeAttr::Directory)
            }
            DocPath::DocType { index, doc_type } => {
                self.check_doc_type(&index, &doc_type)?;
                Ok(NodeAttr::Directory)
            }
            DocPath::Page {
                index,
                doc_type,
                page,
            } => {
                self.check_page(&index, &doc_type, page)?;
                Ok(NodeAttr::Directory)
            }
            DocPath::Document {
                index,
                doc_type,
                page,
                doc_id,
            } => {
                self.check_page(&index, &doc_type, page)?;
                let docs = self.cache.ensure_docs(&index, &doc_type, page)?;
                match docs.get(&doc_id) {
                    Some(bytes) => Ok(NodeAttr::File {
                        size: bytes.len() as u64,
                    }),
                    None => Err(Error::NotFound),
                }
            }
        }
    }

    /// List the children of a directory path.
    pub fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>, Error> {
        log::debug!("read_dir: path={path}");
        match DocPath::parse(path)? {
            DocPath::Root => {
                let indices = self.cache.ensure_indices()?;
                Ok(indices.iter().map(DirEntry::dir).collect())
            }
            DocPath::Index { index } => {
                self.check_index(&index)?;
                let types = self.cache.ensure_types(&index)?;
                Ok(types.iter().map(DirEntry::dir).collect())
            }
            DocPath::DocType { index, doc_type } => {
                self.check_doc_type(&index, &doc_type)?;
                let count = self.cache.ensure_count(&index, &doc_type)?;
                let pages = count.div_ceil(self.cache.page_size());
                Ok((0..pages).map(|p| DirEntry::dir(p.to_string())).collect())
            }
            DocPath::Page {
                index,
                doc_type,
                page,
            } => {
                self.check_page(&index, &doc_type, page)?;
                let docs = self.cache.ensure_docs(&index, &doc_type, page)?;
                Ok(docs.keys().map(DirEntry::file).collect())
            }
            DocPath::Document { .. } => Err(Error::NotFound),
        }
    }

    /// Read the full contents of a document file.
    ///
    /// The bytes are an immutable snapshot; byte-range reads are the host
    /// adapter's slicing of this value.
    pub fn read(&self, path: &str) -> Result<Bytes, Error> {
        log::debug!("read: path={path}");
        match DocPath::parse(path)? {
            DocPath::Document {
                index,
                doc_type,
                page,
                doc_id,
            } => {
                self.check_page(&index, &doc_type, page)?;
                let docs = self.cache.ensure_docs(&index, &doc_type, page)?;
                docs.get(&doc_id).cloned().ok_or(Error::NotFound)
            }
            _ => Err(Error::NotFound),
        }
    }

    fn check_index(&self, index: &str) -> Result<(), Error> {
        let indices = self.cache.ensure_indices()?;
        if indices.iter().any(|i| i == index) {
            Ok(())
        } else {
            Err(Error::NotFound)
        }
    }

    fn check_doc_type(&self, index: &str, doc_type: &str) -> Result<(), Error> {
        self.check_index(index)?;
        let types = self.cache.ensure_types(index)?;
        if types.iter().any(|t| t == doc_type) {
            Ok(())
        } else {
            Err(Error::NotFound)
        }
    }

    /// The boundary law: page `p` exists iff `p * page_size < count`.
    fn check_page(&self, index: &str, doc_type: &str, page: u64) -> Result<(), Error> {
        self.check_doc_type(index, doc_type)?;
        let count = self.cache.ensure_count(index, doc_type)?;
        let in_range = page
            .checked_mul(self.cache.page_size())
            .is_some_and(|offset| offset < count);
        if in_range {
            Ok(())
        } else {
            Err(Error::NotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use searchfs_client::{DocumentStore, Error as ClientError};

    /// In-memory backing data: index → type → ordered (id, bytes) pairs.
    struct FakeStore {
        data: HashMap<String, HashMap<String, Vec<(String, Bytes)>>>,
        type_calls: AtomicUsize,
        fetch_calls: AtomicUsize,
        fail_counts: bool,
    }

    impl FakeStore {
        fn new() -> Self {
            Self {
                data: HashMap::new(),
                type_calls: AtomicUsize::new(0),
                fetch_calls: AtomicUsize::new(0),
                fail_counts: false,
            }
        }

        fn with_type(mut self, index: &str, doc_type: &str, n: usize) -> Self {
            let docs = (0..n)
                .map(|i| (format!("doc{i:03}"), Bytes::from(format!("body of {i}"))))
                .collect();
            self.data
                .entry(index.to_string())
                .or_default()
                .insert(doc_type.to_string(), docs);
            self
        }

        fn docs_of(&self, index: &str, doc_type: &str) -> &[(String, Bytes)] {
            self.data
                .get(index)
                .and_then(|types| types.get(doc_type))
                .map(Vec::as_slice)
                .unwrap_or(&[])
        }
    }

    impl DocumentStore for FakeStore {
        fn index_names(&self) -> Result<Vec<String>, ClientError> {
            Ok(self.data.keys().cloned().collect())
        }

        fn doc_types(&self, index: &str) -> Result<Vec<String>, ClientError> {
            self.type_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .data
                .get(index)
                .map(|types| types.keys().cloned().collect())
                .unwrap_or_default())
        }

        fn count_docs(&self, index: &str, doc_type: &str) -> Result<u64, ClientError> {
            if self.fail_counts {
                return Err(ClientError::Status {
                    status: 503,
                    body: "unavailable".to_string(),
                });
            }
            Ok(self.docs_of(index, doc_type).len() as u64)
        }

        fn fetch_docs(
            &self,
            index: &str,
            doc_type: &str,
            from: u64,
            size: u64,
        ) -> Result<HashMap<String, Bytes>, ClientError> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .docs_of(index, doc_type)
                .iter()
                .skip(from as usize)
                .take(size as usize)
                .cloned()
                .collect())
        }
    }

    fn resolver(store: FakeStore, page_size: u64) -> (Arc<FakeStore>, Resolver) {
        let store = Arc::new(store);
        let cache = NamespaceCache::new(store.clone(), page_size);
        (store, Resolver::new(cache))
    }

    fn names(entries: &[DirEntry]) -> Vec<&str> {
        let mut names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    #[test]
    fn parse_classifies_each_depth() {
        assert_eq!(DocPath::parse("").unwrap(), DocPath::Root);
        assert_eq!(DocPath::parse("/").unwrap(), DocPath::Root);
        assert_eq!(
            DocPath::parse("logs").unwrap(),
            DocPath::Index {
                index: "logs".to_string()
            }
        );
        assert_eq!(
            DocPath::parse("logs/entry/2/doc001").unwrap(),
            DocPath::Document {
                index: "logs".to_string(),
                doc_type: "entry".to_string(),
                page: 2,
                doc_id: "doc001".to_string(),
            }
        );
        // Doubled and trailing slashes normalize away.
        assert_eq!(
            DocPath::parse("logs//entry/").unwrap(),
            DocPath::parse("logs/entry").unwrap()
        );
    }

    #[test]
    fn parse_rejects_bad_pages_and_deep_paths() {
        for bad in ["logs/entry/abc", "logs/entry/-1", "logs/entry/+1", "logs/entry/1x"] {
            assert!(
                matches!(DocPath::parse(bad), Err(Error::MalformedPath { .. })),
                "{bad} should be malformed"
            );
        }
        assert!(matches!(
            DocPath::parse("a/b/0/d/e"),
            Err(Error::MalformedPath { .. })
        ));
        // Overflowing page numbers cannot address anything.
        assert!(matches!(
            DocPath::parse("logs/entry/99999999999999999999"),
            Err(Error::MalformedPath { .. })
        ));
    }

    #[test]
    fn boundary_law_with_count_23_page_size_10() {
        let (_, resolver) = resolver(FakeStore::new().with_type("logs", "entry", 23), 10);

        let pages = resolver.read_dir("logs/entry").unwrap();
        assert_eq!(names(&pages), ["0", "1", "2"]);
        assert!(pages.iter().all(|e| e.kind == NodeKind::Directory));

        for page in ["0", "1", "2"] {
            assert_eq!(
                resolver.stat(&format!("logs/entry/{page}")).unwrap(),
                NodeAttr::Directory
            );
        }
        assert!(matches!(
            resolver.stat("logs/entry/3"),
            Err(Error::NotFound)
        ));

        // The tail page holds the 3 remaining documents.
        assert_eq!(resolver.read_dir("logs/entry/2").unwrap().len(), 3);
    }

    #[test]
    fn zero_count_type_lists_no_pages() {
        let (_, resolver) = resolver(FakeStore::new().with_type("logs", "entry", 0), 10);
        assert!(resolver.read_dir("logs/entry").unwrap().is_empty());
        assert!(matches!(
            resolver.stat("logs/entry/0"),
            Err(Error::NotFound)
        ));
    }

    #[test]
    fn single_document_gets_page_zero() {
        let (_, resolver) = resolver(FakeStore::new().with_type("logs", "entry", 1), 10);
        assert_eq!(names(&resolver.read_dir("logs/entry").unwrap()), ["0"]);
    }

    #[test]
    fn missing_index_is_not_found_without_type_query() {
        let (store, resolver) = resolver(FakeStore::new().with_type("logs", "entry", 5), 10);

        assert!(matches!(resolver.stat("missing"), Err(Error::NotFound)));
        assert!(matches!(
            resolver.stat("missing/anything"),
            Err(Error::NotFound)
        ));
        assert!(matches!(
            resolver.read_dir("missing/anything"),
            Err(Error::NotFound)
        ));
        assert_eq!(store.type_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn missing_doc_type_is_not_found() {
        let (_, resolver) = resolver(FakeStore::new().with_type("logs", "entry", 5), 10);
        assert!(matches!(resolver.stat("logs/other"), Err(Error::NotFound)));
        assert!(matches!(
            resolver.stat("logs/other/0"),
            Err(Error::NotFound)
        ));
    }

    #[test]
    fn document_stat_and_read_roundtrip() {
        let (_, resolver) = resolver(FakeStore::new().with_type("logs", "entry", 23), 10);

        let attr = resolver.stat("logs/entry/2/doc021").unwrap();
        let body = resolver.read("logs/entry/2/doc021").unwrap();
        assert_eq!(
            attr,
            NodeAttr::File {
                size: body.len() as u64
            }
        );
        assert_eq!(body, Bytes::from_static(b"body of 21"));

        assert!(matches!(
            resolver.stat("logs/entry/2/nope"),
            Err(Error::NotFound)
        ));
        // Reading a directory is not found, not a crash.
        assert!(matches!(resolver.read("logs/entry/2"), Err(Error::NotFound)));
    }

    #[test]
    fn no_batch_fetch_for_out_of_range_page() {
        let (store, resolver) = resolver(FakeStore::new().with_type("logs", "entry", 23), 10);
        assert!(matches!(
            resolver.stat("logs/entry/3/doc000"),
            Err(Error::NotFound)
        ));
        assert_eq!(store.fetch_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn pages_partition_the_documents() {
        let (_, resolver) = resolver(FakeStore::new().with_type("logs", "entry", 23), 10);

        let mut seen = HashSet::new();
        for page in 0..3 {
            for entry in resolver.read_dir(&format!("logs/entry/{page}")).unwrap() {
                assert_eq!(entry.kind, NodeKind::File);
                assert!(seen.insert(entry.name), "duplicate id across pages");
            }
        }
        assert_eq!(seen.len(), 23);
    }

    #[test]
    fn listing_root_and_index_levels() {
        let store = FakeStore::new()
            .with_type("logs", "entry", 3)
            .with_type("logs", "audit", 0)
            .with_type("metrics", "point", 1);
        let (_, resolver) = resolver(store, 10);

        assert_eq!(names(&resolver.read_dir("").unwrap()), ["logs", "metrics"]);
        assert_eq!(
            names(&resolver.read_dir("logs").unwrap()),
            ["audit", "entry"]
        );
        assert_eq!(resolver.stat("").unwrap(), NodeAttr::Directory);
    }

    #[test]
    fn backend_errors_propagate_untouched() {
        let mut store = FakeStore::new().with_type("logs", "entry", 5);
        store.fail_counts = true;
        let (_, resolver) = resolver(store, 10);

        assert!(matches!(
            resolver.stat("logs/entry/0"),
            Err(Error::Backend(_))
        ));
        assert!(matches!(
            resolver.read_dir("logs/entry"),
            Err(Error::Backend(_))
        ));
    }
}
