//! Error taxonomy for namespace resolution.

/// Errors produced while resolving a namespace path.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The path addresses an entity that legitimately does not exist: an
    /// unknown index or type, a page past the boundary, an unknown document
    /// id. Expected during normal traversal.
    #[error("not found")]
    NotFound,

    /// The path cannot address anything: a page segment that is not a
    /// non-negative integer, or more than four segments. The host-facing
    /// contract folds this into "not found", but it is reported distinctly
    /// for diagnostics.
    #[error("malformed path segment '{segment}'")]
    MalformedPath { segment: String },

    /// The remote store call failed. Never cached; the next resolution of
    /// the same key retries the call.
    #[error("backend error: {0}")]
    Backend(#[from] searchfs_client::Error),
}

impl Error {
    /// True for the conditions the host protocol reports as ENOENT.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound | Error::MalformedPath { .. })
    }
}
