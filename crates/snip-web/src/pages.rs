//! Web page handlers.
//!
//! Each handler calls the lifecycle engine and renders an Askama
//! template. The outcome-to-status mapping lives here and nowhere
//! else.

use askama::Template;
use axum::extract::{Form, Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use chrono::SecondsFormat;
use serde::Deserialize;
use tracing::error;

use snip_core::{MAX_CONTENT_SIZE, ValidateError};
use snip_engine::{CreateError, CreateRequest, ViewOutcome};

use crate::WebState;

fn render<T: Template>(tmpl: T) -> Html<String> {
    Html(tmpl.render().unwrap_or_else(|e| format!("<pre>Template error: {e}</pre>")))
}

/// Render a template as an HTML response with the given status.
fn page<T: Template>(status: StatusCode, tmpl: T) -> Response {
    (
        status,
        [(header::X_CONTENT_TYPE_OPTIONS, "nosniff")],
        render(tmpl),
    )
        .into_response()
}

fn error_page(status: StatusCode, message: &'static str) -> Response {
    page(
        status,
        ErrorTemplate {
            heading: status.canonical_reason().unwrap_or("Error"),
            message,
        },
    )
}

// ── Index ───────────────────────────────────────────────────────

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate;

/// GET /
pub async fn index() -> Response {
    page(StatusCode::OK, IndexTemplate)
}

// ── Create ──────────────────────────────────────────────────────

/// Form fields for `POST /paste`. Checkboxes arrive as `"on"` when
/// ticked and are absent otherwise.
#[derive(Deserialize)]
pub struct PasteForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub expiration: String,
    #[serde(default)]
    pub burn_after_read: Option<String>,
    #[serde(default)]
    pub enable_password: Option<String>,
    #[serde(default)]
    pub password: String,
}

#[derive(Template)]
#[template(path = "created.html")]
struct CreatedTemplate {
    title: String,
    url: String,
    burn_after_read: bool,
    enable_password: bool,
}

/// POST /paste
pub async fn create(
    State(state): State<WebState>,
    headers: HeaderMap,
    Form(form): Form<PasteForm>,
) -> Response {
    // First line of defense at the intake boundary; the entity check
    // inside the engine is the second.
    if form.content.is_empty() {
        return error_page(StatusCode::BAD_REQUEST, "Content cannot be empty");
    }
    if form.content.len() > MAX_CONTENT_SIZE {
        return error_page(StatusCode::PAYLOAD_TOO_LARGE, "Content is too large");
    }

    let req = CreateRequest {
        title: form.title,
        content: form.content,
        expiration: form.expiration,
        burn_after_read: form.burn_after_read.as_deref() == Some("on"),
        enable_password: form.enable_password.as_deref() == Some("on"),
        password: form.password,
    };

    let snippet = match state.engine.create(req) {
        Ok(snippet) => snippet,
        Err(CreateError::Invalid(ValidateError::ContentEmpty)) => {
            return error_page(StatusCode::BAD_REQUEST, "Content cannot be empty");
        }
        Err(CreateError::Invalid(ValidateError::ContentTooLarge)) => {
            return error_page(StatusCode::PAYLOAD_TOO_LARGE, "Content is too large");
        }
        Err(e) => {
            error!(error = %e, "snippet creation failed");
            return error_page(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
        }
    };

    let url = view_url(&state, &headers, &snippet.id);
    page(
        StatusCode::OK,
        CreatedTemplate {
            title: snippet.title,
            url,
            burn_after_read: snippet.burn_after_read,
            enable_password: snippet.enable_password,
        },
    )
}

fn view_url(state: &WebState, headers: &HeaderMap, id: &str) -> String {
    match &state.base_url {
        Some(base) => format!("{}/view/{id}", base.trim_end_matches('/')),
        None => {
            let host = headers
                .get(header::HOST)
                .and_then(|h| h.to_str().ok())
                .unwrap_or("localhost");
            format!("http://{host}/view/{id}")
        }
    }
}

// ── View ────────────────────────────────────────────────────────

/// Optional credential for `/view/{id}`: query string on GET, form
/// body on POST (the password page posts back to the same path).
#[derive(Deserialize)]
pub struct ViewForm {
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Template)]
#[template(path = "view.html")]
struct ViewTemplate {
    title: String,
    content: String,
    created: String,
    burn_after_read: bool,
}

#[derive(Template)]
#[template(path = "password.html")]
struct PasswordTemplate {
    id: String,
    error_message: Option<String>,
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
    heading: &'static str,
    message: &'static str,
}

/// GET/POST /view/{id}
pub async fn view(
    State(state): State<WebState>,
    Path(id): Path<String>,
    Form(form): Form<ViewForm>,
) -> Response {
    // An empty password field means no credential was supplied.
    let password = form.password.as_deref().filter(|p| !p.is_empty());

    let outcome = match state.engine.view(&id, password) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(%id, error = %e, "view failed");
            return error_page(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
        }
    };

    match outcome {
        ViewOutcome::Disclosed(d) => {
            let burn = d.burn_after_read;
            let mut resp = page(
                StatusCode::OK,
                ViewTemplate {
                    title: d.title,
                    content: d.content,
                    created: d.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
                    burn_after_read: burn,
                },
            );
            if burn {
                // The one view there will ever be; keep it out of
                // every cache between here and the reader.
                let headers = resp.headers_mut();
                headers.insert(
                    header::CACHE_CONTROL,
                    HeaderValue::from_static("no-store, no-cache, must-revalidate, private"),
                );
                headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
                headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
            }
            resp
        }
        ViewOutcome::PasswordRequired => page(
            StatusCode::OK,
            PasswordTemplate {
                id,
                error_message: None,
            },
        ),
        ViewOutcome::InvalidPassword => page(
            StatusCode::OK,
            PasswordTemplate {
                id,
                error_message: Some("Invalid password. Please try again.".to_string()),
            },
        ),
        ViewOutcome::NotFound => error_page(StatusCode::NOT_FOUND, "This paste does not exist."),
        ViewOutcome::Expired => error_page(StatusCode::GONE, "This paste has expired."),
        ViewOutcome::Consumed => error_page(
            StatusCode::GONE,
            "This paste has already been viewed and deleted.",
        ),
    }
}

// ── Health ──────────────────────────────────────────────────────

/// GET /_health
pub async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use snip_engine::LifecycleEngine;
    use snip_store::MemoryStore;

    fn test_state() -> WebState {
        WebState {
            engine: Arc::new(LifecycleEngine::new(Arc::new(MemoryStore::new()))),
            base_url: Some("http://snip.test".to_string()),
        }
    }

    fn paste_form(content: &str) -> PasteForm {
        PasteForm {
            title: String::new(),
            content: content.to_string(),
            expiration: "1h".to_string(),
            burn_after_read: None,
            enable_password: None,
            password: String::new(),
        }
    }

    fn created(state: &WebState, req: CreateRequest) -> String {
        state.engine.create(req).unwrap().id
    }

    async fn body_text(resp: Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn create_renders_the_share_url() {
        let state = test_state();
        let resp = create(State(state), HeaderMap::new(), Form(paste_form("hello"))).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_text(resp).await;
        assert!(body.contains("http://snip.test/view/"));
    }

    #[tokio::test]
    async fn create_empty_content_is_bad_request() {
        let state = test_state();
        let resp = create(State(state), HeaderMap::new(), Form(paste_form(""))).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_oversized_content_is_rejected() {
        let state = test_state();
        let content = "x".repeat(MAX_CONTENT_SIZE + 1);
        let resp = create(State(state), HeaderMap::new(), Form(paste_form(&content))).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn view_unknown_id_is_not_found() {
        let state = test_state();
        let resp = view(
            State(state),
            Path("nope1".to_string()),
            Form(ViewForm { password: None }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn view_discloses_content() {
        let state = test_state();
        let id = created(
            &state,
            CreateRequest {
                content: "hello".to_string(),
                expiration: "1h".to_string(),
                ..CreateRequest::default()
            },
        );

        let resp = view(
            State(state),
            Path(id),
            Form(ViewForm { password: None }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_text(resp).await.contains("hello"));
    }

    #[tokio::test]
    async fn burn_view_is_uncacheable_then_gone() {
        let state = test_state();
        let id = created(
            &state,
            CreateRequest {
                content: "once".to_string(),
                expiration: "1h".to_string(),
                burn_after_read: true,
                ..CreateRequest::default()
            },
        );

        let resp = view(
            State(state.clone()),
            Path(id.clone()),
            Form(ViewForm { password: None }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let cache = resp.headers().get(header::CACHE_CONTROL).unwrap();
        assert!(cache.to_str().unwrap().contains("no-store"));

        let resp = view(
            State(state),
            Path(id),
            Form(ViewForm { password: None }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn password_flow_challenges_then_discloses() {
        let state = test_state();
        let id = created(
            &state,
            CreateRequest {
                content: "locked".to_string(),
                expiration: "1h".to_string(),
                enable_password: true,
                password: "secret".to_string(),
                ..CreateRequest::default()
            },
        );

        // No credential: challenge page, no content.
        let resp = view(
            State(state.clone()),
            Path(id.clone()),
            Form(ViewForm { password: None }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_text(resp).await;
        assert!(body.contains("password"));
        assert!(!body.contains("locked"));

        // Wrong credential: challenge again, with the error message.
        let resp = view(
            State(state.clone()),
            Path(id.clone()),
            Form(ViewForm {
                password: Some("wrong".to_string()),
            }),
        )
        .await;
        let body = body_text(resp).await;
        assert!(body.contains("Invalid password"));
        assert!(!body.contains("locked"));

        // Correct credential: content.
        let resp = view(
            State(state),
            Path(id),
            Form(ViewForm {
                password: Some("secret".to_string()),
            }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_text(resp).await.contains("locked"));
    }

    #[tokio::test]
    async fn health_is_ok() {
        let resp = health().await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
