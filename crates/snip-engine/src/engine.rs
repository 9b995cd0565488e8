//! The lifecycle engine: creation, retrieval, expiration enforcement,
//! and burn-after-read accounting.
//!
//! Every view attempt resolves to exactly one [`ViewOutcome`]. The
//! disclosure decision for burn-after-read snippets rests solely on
//! the storage port's atomic increment result — never on whether the
//! subsequent cleanup delete succeeds.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, warn};

use snip_core::{Snippet, ValidateError};
use snip_store::{SnippetStore, StoreError};

use crate::password::{hash_password, verify_password};

/// Inputs for creating a snippet.
#[derive(Debug, Default)]
pub struct CreateRequest {
    pub title: String,
    pub content: String,
    /// Expiration selector (`"never"`, `"10m"`, `"1h"`, `"1d"`, `"1w"`).
    pub expiration: String,
    pub burn_after_read: bool,
    pub enable_password: bool,
    /// Plaintext credential; only read when `enable_password` is set.
    pub password: String,
}

/// Errors from the create path.
#[derive(Debug, Error)]
pub enum CreateError {
    #[error(transparent)]
    Invalid(#[from] ValidateError),

    #[error("password hashing failed: {0}")]
    PasswordHashing(String),

    #[error(transparent)]
    Backend(#[from] StoreError),
}

/// Storage failures that change disclosure correctness. Never retried:
/// the increment is not idempotent and a retry could double-count.
#[derive(Debug, Error)]
pub enum ViewError {
    #[error(transparent)]
    Backend(#[from] StoreError),
}

/// Content and metadata released to a permitted viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct Disclosure {
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub view_count: u64,
    pub burn_after_read: bool,
}

/// Terminal outcome of a view attempt. Exactly one per request, and no
/// outcome class overlaps another.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewOutcome {
    /// Content may be shown to this request.
    Disclosed(Disclosure),
    /// Protection enabled and no credential was supplied.
    PasswordRequired,
    /// A credential was supplied and failed verification.
    InvalidPassword,
    /// No such record.
    NotFound,
    /// The record's deadline has passed.
    Expired,
    /// Burn-after-read and another request won the single view.
    Consumed,
}

/// The single authority deciding whether a snippet may be disclosed.
pub struct LifecycleEngine {
    store: Arc<dyn SnippetStore>,
}

impl LifecycleEngine {
    pub fn new(store: Arc<dyn SnippetStore>) -> Self {
        Self { store }
    }

    /// Create and persist a new snippet, returning the stored record.
    pub fn create(&self, req: CreateRequest) -> Result<Snippet, CreateError> {
        let password_hash = if req.enable_password {
            hash_password(&req.password)
                .map_err(|e| CreateError::PasswordHashing(e.to_string()))?
        } else {
            String::new()
        };

        let snippet = Snippet::new(
            req.title,
            req.content,
            &req.expiration,
            req.burn_after_read,
            req.enable_password,
            password_hash,
        );
        snippet.validate()?;
        self.store.put(&snippet)?;
        debug!(id = %snippet.id, burn = snippet.burn_after_read, "snippet created");
        Ok(snippet)
    }

    /// Decide whether `id` may be disclosed to this request.
    ///
    /// Storage failures that would change the decision propagate as
    /// [`ViewError`]; cleanup failures after the outcome is determined
    /// are logged and swallowed.
    pub fn view(&self, id: &str, password: Option<&str>) -> Result<ViewOutcome, ViewError> {
        let snippet = match self.store.get(id)? {
            Some(s) => s,
            None => return Ok(ViewOutcome::NotFound),
        };

        if snippet.is_expired_at(Utc::now()) {
            // Lazy deletion: the read-path check is the authority, the
            // physical delete is best-effort.
            if let Err(e) = self.store.delete(id) {
                warn!(%id, error = %e, "failed to delete expired snippet");
            }
            return Ok(ViewOutcome::Expired);
        }

        if snippet.enable_password {
            match password {
                None => return Ok(ViewOutcome::PasswordRequired),
                Some(p) if !verify_password(p, &snippet.password_hash) => {
                    return Ok(ViewOutcome::InvalidPassword);
                }
                Some(_) => {}
            }
        }

        // The atomic increment is the only coordination between
        // concurrent viewers: whoever observes 1 owns the disclosure.
        let count = match self.store.increment_view_count(id) {
            Ok(count) => count,
            Err(StoreError::NotFound(_)) => {
                // The row vanished between lookup and increment: for a
                // burn-after-read snippet the winner already deleted it.
                return Ok(if snippet.burn_after_read {
                    ViewOutcome::Consumed
                } else {
                    ViewOutcome::NotFound
                });
            }
            Err(e) => return Err(e.into()),
        };

        if snippet.burn_after_read {
            if count > 1 {
                return Ok(ViewOutcome::Consumed);
            }
            // This request owns the single view. The delete is cleanup,
            // not part of the decision; a failure here must not show
            // the content to anyone else (it can't — later increments
            // observe a count above 1).
            if let Err(e) = self.store.delete(id) {
                warn!(%id, error = %e, "failed to delete burn-after-read snippet");
            }
        }

        Ok(ViewOutcome::Disclosed(Disclosure {
            title: snippet.title,
            content: snippet.content,
            created_at: snippet.created_at,
            view_count: count,
            burn_after_read: snippet.burn_after_read,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use snip_store::MemoryStore;

    fn test_engine() -> (Arc<MemoryStore>, LifecycleEngine) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), LifecycleEngine::new(store))
    }

    fn create_request(content: &str) -> CreateRequest {
        CreateRequest {
            content: content.to_string(),
            expiration: "1h".to_string(),
            ..CreateRequest::default()
        }
    }

    fn disclosure(outcome: ViewOutcome) -> Disclosure {
        match outcome {
            ViewOutcome::Disclosed(d) => d,
            other => panic!("expected disclosure, got {other:?}"),
        }
    }

    #[test]
    fn repeatable_snippet_discloses_every_view() {
        let (_, engine) = test_engine();
        let snippet = engine.create(create_request("hello")).unwrap();

        let first = disclosure(engine.view(&snippet.id, None).unwrap());
        assert_eq!(first.content, "hello");
        assert_eq!(first.view_count, 1);

        let second = disclosure(engine.view(&snippet.id, None).unwrap());
        assert_eq!(second.content, "hello");
        assert_eq!(second.view_count, 2);
    }

    #[test]
    fn unknown_id_is_not_found() {
        let (_, engine) = test_engine();
        assert_eq!(engine.view("nope1", None).unwrap(), ViewOutcome::NotFound);
    }

    #[test]
    fn empty_content_is_rejected() {
        let (_, engine) = test_engine();
        assert!(matches!(
            engine.create(create_request("")),
            Err(CreateError::Invalid(ValidateError::ContentEmpty))
        ));
    }

    #[test]
    fn oversized_content_is_rejected() {
        let (_, engine) = test_engine();
        let content = "x".repeat(snip_core::MAX_CONTENT_SIZE + 1);
        assert!(matches!(
            engine.create(create_request(&content)),
            Err(CreateError::Invalid(ValidateError::ContentTooLarge))
        ));
    }

    #[test]
    fn password_challenge_invalid_then_disclose() {
        let (_, engine) = test_engine();
        let snippet = engine
            .create(CreateRequest {
                enable_password: true,
                password: "secret".to_string(),
                ..create_request("locked")
            })
            .unwrap();

        assert_eq!(
            engine.view(&snippet.id, None).unwrap(),
            ViewOutcome::PasswordRequired
        );
        assert_eq!(
            engine.view(&snippet.id, Some("wrong")).unwrap(),
            ViewOutcome::InvalidPassword
        );

        let d = disclosure(engine.view(&snippet.id, Some("secret")).unwrap());
        assert_eq!(d.content, "locked");
        // Rejected attempts never reached disclosure, so the counter
        // only moved once.
        assert_eq!(d.view_count, 1);
    }

    #[test]
    fn password_hash_is_never_plaintext() {
        let (store, engine) = test_engine();
        let snippet = engine
            .create(CreateRequest {
                enable_password: true,
                password: "secret".to_string(),
                ..create_request("locked")
            })
            .unwrap();

        let stored = store.get(&snippet.id).unwrap().unwrap();
        assert!(stored.enable_password);
        assert!(!stored.password_hash.is_empty());
        assert!(!stored.password_hash.contains("secret"));
    }

    #[test]
    fn burn_after_read_discloses_once_then_vanishes() {
        let (store, engine) = test_engine();
        let snippet = engine
            .create(CreateRequest {
                burn_after_read: true,
                ..create_request("once")
            })
            .unwrap();

        let d = disclosure(engine.view(&snippet.id, None).unwrap());
        assert_eq!(d.content, "once");
        assert!(d.burn_after_read);

        // The record is gone; a later request sees plain NotFound.
        assert!(store.get(&snippet.id).unwrap().is_none());
        assert_eq!(engine.view(&snippet.id, None).unwrap(), ViewOutcome::NotFound);
    }

    #[test]
    fn burn_after_read_race_has_exactly_one_winner() {
        const READERS: usize = 8;
        let store = Arc::new(MemoryStore::new());
        let engine = Arc::new(LifecycleEngine::new(store));
        let snippet = engine
            .create(CreateRequest {
                burn_after_read: true,
                ..create_request("once")
            })
            .unwrap();

        let handles: Vec<_> = (0..READERS)
            .map(|_| {
                let engine = engine.clone();
                let id = snippet.id.clone();
                std::thread::spawn(move || engine.view(&id, None).unwrap())
            })
            .collect();

        let outcomes: Vec<ViewOutcome> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        let disclosed = outcomes
            .iter()
            .filter(|o| matches!(o, ViewOutcome::Disclosed(_)))
            .count();
        let consumed = outcomes
            .iter()
            .filter(|o| matches!(o, ViewOutcome::Consumed))
            .count();

        assert_eq!(disclosed, 1, "exactly one reader may see the content");
        assert_eq!(consumed, READERS - 1, "all others observe Consumed");
    }

    #[test]
    fn expired_snippet_is_gone_and_lazily_deleted() {
        let (store, engine) = test_engine();
        let snippet = engine.create(create_request("stale")).unwrap();

        // Push the deadline into the past behind the engine's back.
        let mut stale = store.get(&snippet.id).unwrap().unwrap();
        stale.expiration = Utc::now() - Duration::seconds(1);
        store.update(&stale).unwrap();

        assert_eq!(engine.view(&snippet.id, None).unwrap(), ViewOutcome::Expired);
        assert!(store.get(&snippet.id).unwrap().is_none());

        // Once deleted, later requests observe plain NotFound.
        assert_eq!(engine.view(&snippet.id, None).unwrap(), ViewOutcome::NotFound);
    }

    #[test]
    fn expired_password_snippet_never_challenges() {
        // Expiration is checked before the password gate; a dead
        // snippet must not leak that it was protected.
        let (store, engine) = test_engine();
        let snippet = engine
            .create(CreateRequest {
                enable_password: true,
                password: "secret".to_string(),
                ..create_request("stale")
            })
            .unwrap();

        let mut stale = store.get(&snippet.id).unwrap().unwrap();
        stale.expiration = Utc::now() - Duration::seconds(1);
        store.update(&stale).unwrap();

        assert_eq!(engine.view(&snippet.id, None).unwrap(), ViewOutcome::Expired);
    }
}
