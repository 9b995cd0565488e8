//! MemoryStore — in-process snippet persistence.
//!
//! Backs ephemeral deployments and tests. Atomicity comes from the
//! write lock: every mutation holds it for the whole read-modify-write.

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use snip_core::Snippet;

use crate::error::{StoreError, StoreResult};
use crate::store::SnippetStore;

/// Snippet store backed by a process-local map. Contents are lost on
/// restart.
#[derive(Default)]
pub struct MemoryStore {
    snippets: RwLock<HashMap<String, Snippet>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnippetStore for MemoryStore {
    fn put(&self, snippet: &Snippet) -> StoreResult<()> {
        let mut map = self
            .snippets
            .write()
            .map_err(|e| StoreError::Write(e.to_string()))?;
        map.insert(snippet.id.clone(), snippet.clone());
        debug!(id = %snippet.id, "snippet stored");
        Ok(())
    }

    fn get(&self, id: &str) -> StoreResult<Option<Snippet>> {
        let map = self
            .snippets
            .read()
            .map_err(|e| StoreError::Read(e.to_string()))?;
        Ok(map.get(id).cloned())
    }

    fn delete(&self, id: &str) -> StoreResult<bool> {
        let mut map = self
            .snippets
            .write()
            .map_err(|e| StoreError::Write(e.to_string()))?;
        let existed = map.remove(id).is_some();
        debug!(%id, existed, "snippet deleted");
        Ok(existed)
    }

    fn update(&self, snippet: &Snippet) -> StoreResult<()> {
        let mut map = self
            .snippets
            .write()
            .map_err(|e| StoreError::Write(e.to_string()))?;
        match map.get_mut(&snippet.id) {
            Some(existing) => {
                *existing = snippet.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(snippet.id.clone())),
        }
    }

    fn increment_view_count(&self, id: &str) -> StoreResult<u64> {
        let mut map = self
            .snippets
            .write()
            .map_err(|e| StoreError::Write(e.to_string()))?;
        match map.get_mut(id) {
            Some(snippet) => {
                snippet.view_count += 1;
                Ok(snippet.view_count)
            }
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    fn list(&self) -> StoreResult<Vec<String>> {
        let map = self
            .snippets
            .read()
            .map_err(|e| StoreError::Read(e.to_string()))?;
        Ok(map.keys().cloned().collect())
    }
}
