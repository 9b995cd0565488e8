//! snip-core — domain types and policy for snipbin.
//!
//! Holds the [`Snippet`] record plus the pure pieces of the service:
//! ID derivation, expiration resolution, and content validation. No
//! storage or HTTP concern lives here; everything in this crate is
//! side-effect-free apart from reading the wall clock.

pub mod expire;
pub mod id;
pub mod snippet;

pub use expire::{expiration_duration, resolve_expiration};
pub use id::generate_id;
pub use snippet::{MAX_CONTENT_SIZE, Snippet, ValidateError};
