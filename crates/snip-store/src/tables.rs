//! redb table definitions for the snippet store.

use redb::TableDefinition;

/// Snippets keyed by ID; values are JSON-serialized [`snip_core::Snippet`]s.
pub const SNIPPETS: TableDefinition<&str, &[u8]> = TableDefinition::new("snippets");
