//! The storage port: backend-agnostic contract for snippet persistence.

use snip_core::Snippet;

use crate::error::{StoreError, StoreResult};

/// Backend-agnostic snippet persistence.
///
/// Concurrent viewers of one snippet coordinate exclusively through
/// [`increment_view_count`](SnippetStore::increment_view_count); it
/// must be a true atomic read-modify-write in every implementation,
/// because the service may run as several processes with no shared
/// memory.
pub trait SnippetStore: Send + Sync {
    /// Create or unconditionally overwrite a snippet keyed by its ID.
    fn put(&self, snippet: &Snippet) -> StoreResult<()>;

    /// Point lookup by ID.
    fn get(&self, id: &str) -> StoreResult<Option<Snippet>>;

    /// Remove a snippet. Returns `false` if it was already absent;
    /// deleting twice is not an error.
    fn delete(&self, id: &str) -> StoreResult<bool>;

    /// Full overwrite of an existing snippet. Fails with
    /// [`StoreError::NotFound`] if the row does not exist.
    fn update(&self, snippet: &Snippet) -> StoreResult<()>;

    /// Atomically increment the view counter and return the
    /// post-increment value. Fails with [`StoreError::NotFound`] if
    /// the row no longer exists.
    fn increment_view_count(&self, id: &str) -> StoreResult<u64>;

    /// Enumerate all snippet IDs. A backend whose native scan cost
    /// does not fit the request path can leave this unimplemented.
    fn list(&self) -> StoreResult<Vec<String>> {
        Err(StoreError::Unsupported("list"))
    }
}
