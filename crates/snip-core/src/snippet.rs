//! The snippet record and its validation rule.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::expire::resolve_expiration;
use crate::id::generate_id;

/// Maximum accepted content size in bytes (64 KiB).
pub const MAX_CONTENT_SIZE: usize = 64 * 1024;

/// Validation failures for snippet content.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidateError {
    #[error("content cannot be empty")]
    ContentEmpty,

    #[error("content is too large")]
    ContentTooLarge,
}

/// A stored snippet: shareable text plus its policy metadata.
///
/// `id` is assigned once at creation and never recomputed. After
/// creation the only field ever rewritten is `view_count`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snippet {
    pub id: String,
    /// Optional display label; empty means untitled.
    pub title: String,
    pub content: String,
    /// Absolute deadline; the snippet is logically dead once now passes it.
    pub expiration: DateTime<Utc>,
    /// Disclose to exactly one successful reader, then delete.
    pub burn_after_read: bool,
    pub enable_password: bool,
    /// Salted one-way hash; empty when password protection is off.
    pub password_hash: String,
    /// Incremented once per view attempt that reaches disclosure.
    pub view_count: u64,
    pub created_at: DateTime<Utc>,
}

impl Snippet {
    /// Build a new snippet, assigning its ID and absolute expiration.
    pub fn new(
        title: String,
        content: String,
        expiration_selector: &str,
        burn_after_read: bool,
        enable_password: bool,
        password_hash: String,
    ) -> Self {
        let id = generate_id(content.as_bytes());
        Self {
            id,
            title,
            content,
            expiration: resolve_expiration(expiration_selector),
            burn_after_read,
            enable_password,
            password_hash,
            view_count: 0,
            created_at: Utc::now(),
        }
    }

    /// Pure content check: non-empty and within [`MAX_CONTENT_SIZE`].
    ///
    /// The request intake boundary enforces the same bounds before a
    /// snippet reaches the store; this check holds on its own when
    /// invoked directly.
    pub fn validate(&self) -> Result<(), ValidateError> {
        if self.content.is_empty() {
            return Err(ValidateError::ContentEmpty);
        }
        if self.content.len() > MAX_CONTENT_SIZE {
            return Err(ValidateError::ContentTooLarge);
        }
        Ok(())
    }

    /// Whether the snippet's deadline has passed at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiration < now
    }
}
