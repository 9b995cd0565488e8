//! snip-store — snippet persistence for snipbin.
//!
//! The [`SnippetStore`] trait is the storage port: the lifecycle
//! engine talks to it and never sees a backend type. Two backends
//! ship here:
//!
//! - [`MemoryStore`] — an in-process map behind a lock, for ephemeral
//!   deployments and tests.
//! - [`RedbStore`] — an embedded [redb](https://docs.rs/redb) database,
//!   on-disk or in-memory. Values are JSON-serialized into redb's
//!   `&[u8]` value column.
//!
//! Both make `increment_view_count` a true atomic read-modify-write,
//! which is what burn-after-read correctness rests on.

pub mod error;
pub mod memory;
pub mod redb_store;
pub mod store;
pub mod tables;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use redb_store::RedbStore;
pub use store::SnippetStore;
