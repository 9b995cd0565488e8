//! RedbStore — embedded snippet persistence backed by redb.
//!
//! Snippets are JSON-serialized into a single `&str → &[u8]` table.
//! The store supports both on-disk and in-memory backends (the latter
//! for ephemeral deployments and testing). redb serializes write
//! transactions, which makes `increment_view_count` a true atomic
//! read-modify-write without any in-process locking.

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable};
use tracing::debug;

use snip_core::Snippet;

use crate::error::{StoreError, StoreResult};
use crate::store::SnippetStore;
use crate::tables::SNIPPETS;

/// Convert any `Display` error into a `StoreError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StoreError::$variant(e.to_string())
    };
}

/// Thread-safe snippet store backed by redb.
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open (or create) a persistent snippet store at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_table()?;
        debug!(?path, "snippet store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory snippet store.
    pub fn open_in_memory() -> StoreResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_table()?;
        debug!("in-memory snippet store opened");
        Ok(store)
    }

    /// Create the snippets table if it doesn't exist yet.
    fn ensure_table(&self) -> StoreResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(SNIPPETS).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }
}

impl SnippetStore for RedbStore {
    fn put(&self, snippet: &Snippet) -> StoreResult<()> {
        let value = serde_json::to_vec(snippet).map_err(map_err!(Serialize))?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(SNIPPETS).map_err(map_err!(Table))?;
            table
                .insert(snippet.id.as_str(), value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(id = %snippet.id, "snippet stored");
        Ok(())
    }

    fn get(&self, id: &str) -> StoreResult<Option<Snippet>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(SNIPPETS).map_err(map_err!(Table))?;
        match table.get(id).map_err(map_err!(Read))? {
            Some(guard) => {
                let snippet: Snippet =
                    serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
                Ok(Some(snippet))
            }
            None => Ok(None),
        }
    }

    fn delete(&self, id: &str) -> StoreResult<bool> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let existed;
        {
            let mut table = txn.open_table(SNIPPETS).map_err(map_err!(Table))?;
            existed = table.remove(id).map_err(map_err!(Write))?.is_some();
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%id, existed, "snippet deleted");
        Ok(existed)
    }

    fn update(&self, snippet: &Snippet) -> StoreResult<()> {
        let value = serde_json::to_vec(snippet).map_err(map_err!(Serialize))?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(SNIPPETS).map_err(map_err!(Table))?;
            if table.get(snippet.id.as_str()).map_err(map_err!(Read))?.is_none() {
                return Err(StoreError::NotFound(snippet.id.clone()));
            }
            table
                .insert(snippet.id.as_str(), value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    fn increment_view_count(&self, id: &str) -> StoreResult<u64> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let count;
        {
            let mut table = txn.open_table(SNIPPETS).map_err(map_err!(Table))?;
            let mut snippet: Snippet = match table.get(id).map_err(map_err!(Read))? {
                Some(guard) => {
                    serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?
                }
                None => return Err(StoreError::NotFound(id.to_string())),
            };
            snippet.view_count += 1;
            count = snippet.view_count;
            let value = serde_json::to_vec(&snippet).map_err(map_err!(Serialize))?;
            table
                .insert(id, value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(count)
    }

    fn list(&self) -> StoreResult<Vec<String>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(SNIPPETS).map_err(map_err!(Table))?;
        let mut ids = Vec::new();
        for entry in table.iter().map_err(map_err!(Read))? {
            let (key, _) = entry.map_err(map_err!(Read))?;
            ids.push(key.value().to_string());
        }
        Ok(ids)
    }
}
