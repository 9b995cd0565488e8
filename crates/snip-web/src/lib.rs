//! snip-web — server-rendered web UI for snipbin.
//!
//! Thin axum shims around the lifecycle engine: routing, form parsing,
//! and Askama rendering live here. Every disclosure decision stays in
//! snip-engine; this crate only maps outcomes to pages and status
//! codes.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/` | Paste form |
//! | POST | `/paste` | Create a snippet |
//! | GET/POST | `/view/{id}` | View a snippet (password via form) |
//! | GET | `/_health` | Liveness probe |

pub mod pages;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};

use snip_engine::LifecycleEngine;

/// Shared state for web handlers.
#[derive(Clone)]
pub struct WebState {
    pub engine: Arc<LifecycleEngine>,
    /// Absolute base (scheme + host) for generated view URLs; falls
    /// back to the request's Host header when unset.
    pub base_url: Option<String>,
}

/// Request-body ceiling: URL-encoding can triple the wire size of the
/// content bound, plus headroom for the remaining form fields. The
/// decoded length check in the create handler is the authoritative one.
const BODY_LIMIT: usize = 3 * snip_core::MAX_CONTENT_SIZE + 4 * 1024;

/// Build the web router.
pub fn build_router(state: WebState) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route("/paste", post(pages::create))
        .route("/view/{id}", get(pages::view).post(pages::view))
        .route("/_health", get(pages::health))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(state)
}
